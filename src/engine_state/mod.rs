//! # Engine State Module
//!
//! The simulation core: the world, the player, and everything that keeps the
//! renderer and session peers in step with them.
//!
//! ## Key Components
//!
//! * `EngineState` - owns the Block Store and runs the simulation tick
//! * `voxels` - the block grid, spatial index, raycaster and world generation
//! * `player_state` - the player record and its kinematics
//! * `visibility` - the shown set and sector-based show/hide batching
//! * `rendering` - the renderer collaborator interface and a CPU mesh renderer
//! * `task_management` - the worker pool render requests run on
//! * `session` - outbound world events and inbound change requests
//!
//! ## Architecture
//!
//! `EngineState` is the single writer. Each tick it drains finished render
//! work, moves the player, and, if the player crossed into a new sector,
//! diffs the visible sector disc. Block changes from player actions or
//! session requests go through `add_block` / `remove_block`, which keep the
//! shown set consistent and notify subscribers. Every other component gets a
//! shared borrow of the Block Store for the duration of a call and never
//! keeps it.

pub mod player_state;
pub mod rendering;
pub mod session;
pub mod task_management;
pub mod visibility;
pub mod voxels;

use std::sync::mpsc::Receiver;
use std::sync::Arc;

use cgmath::Point3;
use log::{info, warn};

use crate::config::GameConfig;
use crate::core::timing::timed;
use crate::error::{EngineError, WorldResult};
use player_state::{kinematics::Kinematics, PlayerState};
use rendering::Renderer;
use session::{Session, WorldEvent, WorldRequest};
use visibility::VisibilityTracker;
use voxels::{
    block_store::BlockStore,
    coords::{normalize, Cell, Sector},
    generation::generate_flat_world,
    material::Material,
    raycast::{hit_test, DEFAULT_MAX_DISTANCE},
};

/// Longest frame the simulation will integrate in one tick, in seconds.
pub const MAX_TICK_DT: f32 = 0.2;

/// Kinematics substeps per tick. Smaller steps keep a fast fall from
/// skipping through a one-block floor.
pub const TICK_SUBSTEPS: u32 = 8;

/// What the player wants to do this frame, derived from input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerAction {
    /// `[forward/back, left/right]`, each in {-1, 0, 1}. Forward and left are -1.
    pub strafe: [i8; 2],
    /// Mouse look delta, positive y looking up.
    pub rotate_view: Option<(f64, f64)>,
    pub jump: bool,
    pub toggle_flying: bool,
    /// Inventory slot to select.
    pub select_slot: Option<usize>,
    /// Remove the block under the crosshair.
    pub break_block: bool,
    /// Place the selected material against the block under the crosshair.
    pub place_block: bool,
    /// Give the mouse back to the windowing system.
    pub release_mouse: bool,
}

/// The main state container for the simulation.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use cgmath::Point3;
/// use crafter::config::GameConfig;
/// use crafter::engine_state::{rendering::MeshRenderer, voxels::material::Material, EngineState};
///
/// let renderer = MeshRenderer::new();
/// let mut engine = EngineState::new(GameConfig::default(), Arc::new(renderer.clone())).unwrap();
/// engine.add_block(Point3::new(0, -2, 0), Material::Stone).unwrap();
/// engine.tick(1.0 / 60.0).unwrap();
/// assert_eq!(renderer.len(), 1);
/// ```
pub struct EngineState {
    config: GameConfig,
    store: BlockStore,
    player: PlayerState,
    kinematics: Kinematics,
    visibility: VisibilityTracker,
    session: Session,
}

impl EngineState {
    /// Creates an engine with an empty world and the player at the origin.
    ///
    /// # Errors
    /// Fails if `config` does not validate.
    pub fn new(config: GameConfig, renderer: Arc<dyn Renderer>) -> Result<Self, EngineError> {
        config.validate()?;

        Ok(Self {
            store: BlockStore::with_sector_size(config.view.sector_size),
            player: PlayerState::default(),
            kinematics: Kinematics::new(config.physics.clone()),
            visibility: VisibilityTracker::new(renderer, &config.view),
            session: Session::new(),
            config,
        })
    }

    /// Creates an engine and fills its world with flat terrain.
    pub fn with_flat_world(
        config: GameConfig,
        renderer: Arc<dyn Renderer>,
    ) -> Result<Self, EngineError> {
        let mut engine = Self::new(config, renderer)?;
        let world = engine.config.world.clone();
        timed("world generation", || {
            generate_flat_world(&mut engine.store, &world)
        })?;
        Ok(engine)
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn store(&self) -> &BlockStore {
        &self.store
    }

    pub fn player(&self) -> &PlayerState {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut PlayerState {
        &mut self.player
    }

    pub fn visibility(&self) -> &VisibilityTracker {
        &self.visibility
    }

    /// Subscribes to every [`WorldEvent`] the engine publishes from now on.
    pub fn subscribe(&mut self) -> Receiver<WorldEvent> {
        self.session.subscribe()
    }

    /// Adds a block, shows it if it is exposed and in view, and updates
    /// the neighbors it may have buried.
    ///
    /// # Errors
    /// [`crate::error::WorldError::DuplicateBlock`] if `cell` is occupied;
    /// nothing changes.
    pub fn add_block(&mut self, cell: Cell, material: Material) -> WorldResult<()> {
        self.store.add_block(cell, material)?;

        if self.store.exposed(cell)
            && self.visibility.in_view(&self.store, cell)
            && !self.visibility.is_tracked(cell)
        {
            self.visibility.show_block(&self.store, cell)?;
        }
        self.visibility.check_neighbors(&self.store, cell)?;

        self.session
            .publish(WorldEvent::BlockAdded { cell, material });
        Ok(())
    }

    /// Removes a block, hides it, and shows any neighbors it uncovered.
    ///
    /// # Errors
    /// [`crate::error::WorldError::BlockNotFound`] if `cell` is empty;
    /// nothing changes.
    pub fn remove_block(&mut self, cell: Cell) -> WorldResult<Material> {
        let material = self.store.remove_block(cell)?;

        if self.visibility.is_tracked(cell) {
            self.visibility.hide_block(cell)?;
        }
        self.visibility.check_neighbors(&self.store, cell)?;

        self.session.publish(WorldEvent::BlockRemoved { cell });
        Ok(material)
    }

    /// Applies a change requested by a session peer.
    ///
    /// Rejected requests leave the world untouched and are logged.
    pub fn handle_request(&mut self, request: WorldRequest) -> WorldResult<()> {
        let result = match request {
            WorldRequest::AddBlock { cell, material } => self.add_block(cell, material),
            WorldRequest::RemoveBlock { cell } => self.remove_block(cell).map(|_| ()),
        };
        if let Err(err) = &result {
            warn!("Rejected session request {:?}: {}", request, err);
        }
        result
    }

    /// Applies one frame of player intent.
    ///
    /// Block edits target whatever the player's sight vector hits within
    /// reach. Breaking skips unbreakable materials; placing needs an empty
    /// cell in front of the hit face.
    pub fn apply_action(&mut self, action: &PlayerAction) -> WorldResult<()> {
        self.player.strafe = action.strafe;

        if let Some((dx, dy)) = action.rotate_view {
            self.player.rotate(
                dx as f32,
                dy as f32,
                self.config.controls.mouse_sensitivity,
            );
        }
        if action.toggle_flying {
            self.player.toggle_flying();
        }
        if action.jump {
            self.kinematics.jump(&mut self.player);
        }
        if let Some(slot) = action.select_slot {
            self.player.select_slot(slot);
        }

        if !(action.break_block || action.place_block) {
            return Ok(());
        }

        let Some(hit) = hit_test(
            &self.store,
            self.player.position,
            self.player.sight_vector(),
            DEFAULT_MAX_DISTANCE,
        ) else {
            return Ok(());
        };

        if action.break_block {
            let breakable = self
                .store
                .get(hit.block)
                .is_some_and(Material::is_breakable);
            if breakable {
                self.remove_block(hit.block)?;
            }
        } else if let (Some(previous), Some(material)) =
            (hit.previous, self.player.selected_material())
        {
            if !self.store.contains(previous) {
                self.add_block(previous, material)?;
            }
        }
        Ok(())
    }

    /// Advances the simulation by `dt` seconds.
    ///
    /// Applies finished render work, moves the player in
    /// [`TICK_SUBSTEPS`] steps (with `dt` capped at [`MAX_TICK_DT`]), then
    /// updates visibility if the player entered a new sector. The first tick
    /// always counts as a sector change.
    pub fn tick(&mut self, dt: f32) -> WorldResult<()> {
        self.visibility.process_completed(&self.store);

        let dt = dt.clamp(0.0, MAX_TICK_DT);
        let step = dt / TICK_SUBSTEPS as f32;
        for _ in 0..TICK_SUBSTEPS {
            self.kinematics.tick(&mut self.player, &self.store, step);
        }

        let sector = self.current_sector();
        if self.player.sector != Some(sector) {
            let before = self.player.sector;
            let diff = timed("sector change", || {
                self.visibility
                    .apply_sector_change(&self.store, before, sector)
            })?;
            info!(
                "Player entered sector {:?} from {:?}: showing {} sectors, hiding {}",
                sector,
                before,
                diff.show.len(),
                diff.hide.len()
            );
            self.player.sector = Some(sector);
            self.session.publish(WorldEvent::SectorChanged {
                old: before,
                new: sector,
            });
        }
        Ok(())
    }

    /// Blocks until every outstanding render request has been applied.
    pub fn wait_for_render(&mut self) {
        self.visibility.wait_for_idle(&self.store);
    }

    /// Sector containing the player.
    pub fn current_sector(&self) -> Sector {
        self.store.sector_of(normalize(self.player.position))
    }

    /// Moves the player to `position`, stopping any fall.
    pub fn teleport(&mut self, position: Point3<f32>) {
        self.player.position = position;
        self.player.dy = 0.0;
    }
}
