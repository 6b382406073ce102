//! # Visibility Tracker
//!
//! Decides which blocks are materialized by the renderer and keeps that
//! *shown set* in step with the Block Store and with the player's sector.
//!
//! ## Shown Set
//! Each entry is either `Pending` (a materialize request is in flight) or
//! `Shown` (the renderer returned a handle). Only exposed blocks are ever
//! shown. Entries can go stale briefly after a removal; the next
//! `check_neighbors` or completion pass clears them.
//!
//! ## Ordering
//! Show and hide requests go through a [`TaskManager`] and may complete in
//! any order across cells. For a single cell a hide never overtakes a show:
//! hiding a `Pending` cell only marks it, and the decision is made when the
//! show completes. At that point the cell is kept if it is still present,
//! exposed and inside the current view range; otherwise its handle is
//! released. That check is also what cancels a stale sector-hide plan when
//! the player doubles back before the batch finishes.
//!
//! With zero render workers every request runs inline and completions are
//! applied before the call returns, so the tracker behaves synchronously.

pub mod tasks;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use cgmath::Point3;
use log::{debug, warn};

use crate::config::ViewConfig;
use crate::engine_state::{
    rendering::{RenderHandle, Renderer},
    task_management::TaskManager,
    voxels::{
        block_store::BlockStore,
        coords::{neighbors, Cell, Sector},
        material::Material,
    },
};
use crate::error::{WorldError, WorldResult};
use tasks::{RenderCompletion, RenderJob, RenderTask};

/// Sectors to newly show and newly hide after a sector move.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectorDiff {
    pub show: HashSet<Sector>,
    pub hide: HashSet<Sector>,
}

impl SectorDiff {
    pub fn is_empty(&self) -> bool {
        self.show.is_empty() && self.hide.is_empty()
    }
}

/// Whether `sector` lies in the disc of `radius` sectors around `center`.
pub fn in_range(center: Sector, sector: Sector, radius: i32) -> bool {
    let dx = i64::from(sector.x) - i64::from(center.x);
    let dz = i64::from(sector.z) - i64::from(center.z);
    let radius = i64::from(radius);
    dx * dx + dz * dz <= radius * radius
}

/// Every sector within `radius` of `center`, by squared distance.
///
/// Sectors past the edge of the `i32` grid are left out.
pub fn sectors_in_range(center: Sector, radius: i32) -> HashSet<Sector> {
    let mut sectors = HashSet::new();
    if radius < 0 {
        return sectors;
    }
    for dx in -radius..=radius {
        for dz in -radius..=radius {
            let sector = match (center.x.checked_add(dx), center.z.checked_add(dz)) {
                (Some(x), Some(z)) => Point3::new(x, 0, z),
                _ => continue,
            };
            if in_range(center, sector, radius) {
                sectors.insert(sector);
            }
        }
    }
    sectors
}

/// Computes the sectors entering and leaving view when the player moves
/// from `before` to `after`.
///
/// `None` means "no sector", e.g. before the player's first tick. Moving
/// between equal sectors produces an empty diff without enumerating anything.
pub fn change_sectors(before: Option<Sector>, after: Option<Sector>, radius: i32) -> SectorDiff {
    if before == after {
        return SectorDiff::default();
    }

    let before_set = before.map_or_else(HashSet::new, |s| sectors_in_range(s, radius));
    let after_set = after.map_or_else(HashSet::new, |s| sectors_in_range(s, radius));

    SectorDiff {
        show: after_set.difference(&before_set).copied().collect(),
        hide: before_set.difference(&after_set).copied().collect(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ShowState {
    /// Materialize is in flight. `hide_requested` records a hide that arrived
    /// in the meantime.
    Pending { hide_requested: bool },
    Shown(RenderHandle),
}

/// Tracks the shown set and drives the renderer.
///
/// The tracker never owns the Block Store; every operation that needs it
/// takes a shared borrow.
pub struct VisibilityTracker {
    shown: HashMap<Cell, ShowState>,
    renderer: Arc<dyn Renderer>,
    tasks: TaskManager<RenderTask>,
    view_radius: i32,
    /// Centre of the current view range. `None` until the first sector change,
    /// during which every sector counts as in view.
    target: Option<Sector>,
}

impl VisibilityTracker {
    /// Creates a tracker that renders through `renderer` using the worker
    /// count and view radius from `view`.
    pub fn new(renderer: Arc<dyn Renderer>, view: &ViewConfig) -> Self {
        Self {
            shown: HashMap::new(),
            renderer,
            tasks: TaskManager::new(view.render_workers),
            view_radius: view.view_radius,
            target: None,
        }
    }

    pub fn view_radius(&self) -> i32 {
        self.view_radius
    }

    /// Centre sector of the current view range.
    pub fn target_sector(&self) -> Option<Sector> {
        self.target
    }

    /// Whether `cell` has a live render handle.
    pub fn is_shown(&self, cell: Cell) -> bool {
        matches!(self.shown.get(&cell), Some(ShowState::Shown(_)))
    }

    /// Whether a materialize request for `cell` is still in flight.
    pub fn is_pending(&self, cell: Cell) -> bool {
        matches!(self.shown.get(&cell), Some(ShowState::Pending { .. }))
    }

    /// Whether `cell` is in the shown set, shown or pending.
    pub fn is_tracked(&self, cell: Cell) -> bool {
        self.shown.contains_key(&cell)
    }

    /// Render handle of a shown cell.
    pub fn handle(&self, cell: Cell) -> Option<RenderHandle> {
        match self.shown.get(&cell) {
            Some(ShowState::Shown(handle)) => Some(*handle),
            _ => None,
        }
    }

    /// Cells with a live render handle.
    pub fn shown_cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.shown.iter().filter_map(|(cell, state)| match state {
            ShowState::Shown(_) => Some(*cell),
            ShowState::Pending { .. } => None,
        })
    }

    /// Number of shown-set entries, shown or pending.
    pub fn len(&self) -> usize {
        self.shown.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shown.is_empty()
    }

    /// Number of render requests not yet drained.
    pub fn pending_requests(&self) -> usize {
        self.tasks.pending()
    }

    /// Whether `cell`'s sector is inside the current view range.
    pub fn in_view(&self, store: &BlockStore, cell: Cell) -> bool {
        match self.target {
            Some(center) => in_range(center, store.sector_of(cell), self.view_radius),
            None => true,
        }
    }

    /// Requests geometry for the block at `cell`.
    ///
    /// # Errors
    /// - [`WorldError::BlockNotFound`] if the store has no block at `cell`
    /// - [`WorldError::AlreadyShown`] if `cell` is already shown or pending
    pub fn show_block(&mut self, store: &BlockStore, cell: Cell) -> WorldResult<()> {
        let material = store.get(cell).ok_or(WorldError::BlockNotFound(cell))?;
        if self.shown.contains_key(&cell) {
            return Err(WorldError::AlreadyShown(cell));
        }

        self.shown.insert(cell, ShowState::Pending { hide_requested: false });
        self.publish(RenderJob::Materialize { cell, material });
        self.flush_inline(store);
        Ok(())
    }

    /// Removes `cell` from the shown set and releases its geometry.
    ///
    /// A cell whose show is still in flight is only marked; see the module docs.
    ///
    /// # Errors
    /// [`WorldError::BlockNotFound`] if `cell` is not in the shown set.
    pub fn hide_block(&mut self, cell: Cell) -> WorldResult<()> {
        match self.shown.get_mut(&cell) {
            None => Err(WorldError::BlockNotFound(cell)),
            Some(ShowState::Pending { hide_requested }) => {
                *hide_requested = true;
                Ok(())
            }
            Some(ShowState::Shown(handle)) => {
                let handle = *handle;
                self.shown.remove(&cell);
                self.publish(RenderJob::Release { cell, handle });
                Ok(())
            }
        }
    }

    /// Re-evaluates the six neighbors of `cell` after it was added or removed.
    ///
    /// Present neighbors that became exposed are shown if they are in view;
    /// tracked neighbors that are now buried are hidden.
    pub fn check_neighbors(&mut self, store: &BlockStore, cell: Cell) -> WorldResult<()> {
        for neighbor in neighbors(cell) {
            if !store.contains(neighbor) {
                continue;
            }
            let exposed = store.exposed(neighbor);
            let tracked = self.shown.contains_key(&neighbor);
            if exposed && !tracked && self.in_view(store, neighbor) {
                self.show_block(store, neighbor)?;
            } else if !exposed && tracked {
                self.hide_block(neighbor)?;
            }
        }
        Ok(())
    }

    /// Shows every exposed, untracked block in `sector`.
    pub fn show_sector(&mut self, store: &BlockStore, sector: Sector) -> WorldResult<usize> {
        let mut count = 0;
        for cell in store.blocks_in_sector(sector) {
            if !self.shown.contains_key(&cell) && store.exposed(cell) {
                self.show_block(store, cell)?;
                count += 1;
            }
        }
        Ok(count)
    }

    /// Hides every tracked block in `sector`.
    ///
    /// Sectors back inside the current view range are skipped, so a stale
    /// hide plan never removes blocks the player can see again.
    pub fn hide_sector(&mut self, store: &BlockStore, sector: Sector) -> WorldResult<usize> {
        if let Some(center) = self.target {
            if in_range(center, sector, self.view_radius) {
                return Ok(0);
            }
        }

        let cells: Vec<Cell> = store
            .blocks_in_sector(sector)
            .filter(|cell| self.shown.contains_key(cell))
            .collect();
        for cell in &cells {
            self.hide_block(*cell)?;
        }
        Ok(cells.len())
    }

    /// Moves the view range from `before` to `after` and applies the
    /// resulting show and hide batches.
    ///
    /// Returns the sector diff that was applied. Equal sectors do nothing.
    ///
    /// The first change after construction also hides anything shown while
    /// no view range was set that lies outside the new one.
    pub fn apply_sector_change(
        &mut self,
        store: &BlockStore,
        before: Option<Sector>,
        after: Sector,
    ) -> WorldResult<SectorDiff> {
        let first = self.target.is_none();
        self.target = Some(after);
        if first {
            self.hide_out_of_view(store)?;
        }

        let diff = change_sectors(before, Some(after), self.view_radius);
        if diff.is_empty() {
            return Ok(diff);
        }

        let mut shown = 0;
        for sector in &diff.show {
            shown += self.show_sector(store, *sector)?;
        }
        let mut hidden = 0;
        for sector in &diff.hide {
            hidden += self.hide_sector(store, *sector)?;
        }

        debug!(
            "Sector {:?} -> {:?}: +{} sectors ({} blocks), -{} sectors ({} blocks)",
            before,
            after,
            diff.show.len(),
            shown,
            diff.hide.len(),
            hidden
        );
        Ok(diff)
    }

    /// Applies every render completion that is ready, without blocking.
    ///
    /// Returns the number of completions applied.
    pub fn process_completed(&mut self, store: &BlockStore) -> usize {
        let completions = self.tasks.process_completed_tasks();
        let count = completions.len();
        for completion in completions {
            self.apply_completion(store, completion);
        }
        count
    }

    /// Blocks until every render request, including ones spawned by
    /// completions, has finished and been applied.
    pub fn wait_for_idle(&mut self, store: &BlockStore) {
        loop {
            let completions = self.tasks.wait_for_idle();
            if completions.is_empty() {
                return;
            }
            for completion in completions {
                self.apply_completion(store, completion);
            }
        }
    }

    fn hide_out_of_view(&mut self, store: &BlockStore) -> WorldResult<usize> {
        let stale: Vec<Cell> = self
            .shown
            .keys()
            .copied()
            .filter(|cell| !self.in_view(store, *cell))
            .collect();
        for cell in &stale {
            self.hide_block(*cell)?;
        }
        if !stale.is_empty() {
            debug!("Hid {} blocks outside the first view range", stale.len());
        }
        Ok(stale.len())
    }

    fn publish(&mut self, job: RenderJob) {
        self.tasks
            .publish_task(RenderTask::new(self.renderer.clone(), job));
    }

    fn flush_inline(&mut self, store: &BlockStore) {
        if self.tasks.num_workers() == 0 {
            self.process_completed(store);
        }
    }

    fn apply_completion(&mut self, store: &BlockStore, completion: RenderCompletion) {
        let (cell, material, handle) = match completion {
            RenderCompletion::Materialized {
                cell,
                material,
                handle,
            } => (cell, material, handle),
            RenderCompletion::Released { .. } => return,
        };

        match self.shown.get(&cell).copied() {
            Some(ShowState::Pending {
                hide_requested: false,
            }) => {
                self.shown.insert(cell, ShowState::Shown(handle));
            }
            Some(ShowState::Pending {
                hide_requested: true,
            }) => {
                if self.should_show(store, cell, Some(material)) {
                    // The hide was superseded by a later change.
                    self.shown.insert(cell, ShowState::Shown(handle));
                    return;
                }
                self.shown.remove(&cell);
                self.publish(RenderJob::Release { cell, handle });

                // The block may have been replaced while the show was in flight.
                if store.get(cell).is_some() && self.should_show(store, cell, None) {
                    if let Err(err) = self.show_block(store, cell) {
                        warn!("Failed to re-show replaced block: {}", err);
                    }
                }
            }
            Some(ShowState::Shown(_)) | None => {
                warn!("Unexpected render completion for {:?}; releasing", cell);
                self.publish(RenderJob::Release { cell, handle });
            }
        }
    }

    /// Whether `cell` currently deserves to be shown, optionally requiring a
    /// specific material.
    fn should_show(&self, store: &BlockStore, cell: Cell, material: Option<Material>) -> bool {
        let present = match (store.get(cell), material) {
            (Some(current), Some(expected)) => current == expected,
            (Some(_), None) => true,
            (None, _) => false,
        };
        present && store.exposed(cell) && self.in_view(store, cell)
    }
}
