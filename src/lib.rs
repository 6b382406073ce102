#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Crafter
//!
//! The world model of a block-building game: sparse block storage bucketed
//! by sector, face-exposure visibility with incremental show/hide as the
//! player moves, discrete hit-testing for block selection, and walking,
//! flying and falling player kinematics with axis-aligned collision.
//!
//! ## Key Modules
//!
//! * `application_state` - input tracking, input-to-action translation and the tick loop
//! * `config` - tunable constants, loadable from JSON
//! * `core` - shared resource and timing utilities
//! * `engine_state` - the world, the player, visibility and rendering collaborators
//! * `error` - error types
//!
//! ## Usage
//!
//! ```no_run
//! fn main() {
//!     if let Err(err) = crafter::run() {
//!         eprintln!("{}", err);
//!     }
//! }
//! ```
//!
//! Embedding the engine directly:
//!
//! ```
//! use std::sync::Arc;
//! use crafter::{config::GameConfig, engine_state::{rendering::MeshRenderer, EngineState}};
//!
//! let mut config = GameConfig::default();
//! config.world.half_width = 8;
//! let renderer = MeshRenderer::new();
//! let mut engine = EngineState::with_flat_world(config, Arc::new(renderer.clone())).unwrap();
//! engine.tick(1.0 / 60.0).unwrap();
//! assert!(!renderer.is_empty());
//! ```

use std::sync::Arc;

use application_state::ApplicationState;
use config::GameConfig;
use engine_state::{rendering::MeshRenderer, EngineState};
use error::EngineError;
use log::info;
use winit::keyboard::KeyCode;

pub mod application_state;
pub mod config;
pub mod core;
pub mod engine_state;
pub mod error;

/// Seconds of simulated play in the headless demo.
pub const DEMO_SECONDS: u64 = 5;

/// Initializes the `env_logger` backend, writing to stdout and filtered by `RUST_LOG`.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_logging() {
    let mut log_builder = env_logger::Builder::new();
    let _ = log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .try_init();
}

/// Runs a short headless session: generates the flat world and walks the
/// player forward for a few seconds at the configured tick rate.
///
/// The config is read from the file named by `CRAFTER_CONFIG`, if set.
pub fn run() -> Result<(), EngineError> {
    init_logging();
    info!("Logger initialized");

    let config = GameConfig::from_env()?;
    let ticks = config.ticks_per_sec as u64 * DEMO_SECONDS;
    let renderer = MeshRenderer::new();
    let engine_state = EngineState::with_flat_world(config, Arc::new(renderer.clone()))?;

    let mut state = ApplicationState::new(engine_state);
    state.input_manager.set_key(KeyCode::KeyW, true);
    state.run_loop(ticks)?;
    state.engine_state.wait_for_render();

    let player = state.engine_state.player();
    let (hits, misses) = renderer.cache_stats();
    info!(
        "Finished at {:?} in sector {:?} with {} blocks shown ({} vertex bytes, vertex cache {} hits / {} misses)",
        player.position,
        player.sector,
        renderer.len(),
        renderer.vertex_bytes().len(),
        hits,
        misses
    );
    Ok(())
}
