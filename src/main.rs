//! # Crafter Entry Point
//!
//! Runs the headless demo session from the library's `run()` function.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run --release
//! ```

use std::process::ExitCode;

fn main() -> ExitCode {
    match crafter::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{}", err);
            ExitCode::FAILURE
        }
    }
}
