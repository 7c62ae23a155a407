//! Global tracker state container.
//!
//! Uses `thread_local!` + `RefCell` for safe mutable access in single-threaded
//! WASM. The worker keeps the module alive, so state persists across
//! `handle_request` calls for the whole browser session.

use std::cell::RefCell;

use tracing::{info, warn};

use crate::error::TrackerError;
use crate::tracker::codec;
use crate::tracker::creature::{CreatureField, CreatureId, CreatureTemplate, Direction};
use crate::tracker::history::{HistoryEntry, HistoryLog};
use crate::tracker::roller::{self, Dice, RollPhase};
use crate::tracker::store::CreatureStore;

/// Which persisted values changed since the host last asked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirtyKeys {
    pub creatures: bool,
    pub history: bool,
    pub dark_mode: bool,
}

impl DirtyKeys {
    pub fn any(&self) -> bool {
        self.creatures || self.history || self.dark_mode
    }
}

/// Everything the page needs: creatures, roll history, theme, roll phase.
#[derive(Debug, Clone)]
pub struct Tracker {
    creatures: CreatureStore,
    history: HistoryLog,
    dark_mode: bool,
    roll: RollPhase,
    dirty: DirtyKeys,
}

impl Default for Tracker {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Tracker {
    pub fn new(dark_mode: bool) -> Self {
        Self {
            creatures: CreatureStore::new(),
            history: HistoryLog::new(),
            dark_mode,
            roll: RollPhase::Idle,
            dirty: DirtyKeys::default(),
        }
    }

    /// Rebuild from persisted parts. Nothing is marked dirty.
    pub fn from_parts(creatures: CreatureStore, history: HistoryLog, dark_mode: bool) -> Self {
        Self {
            creatures,
            history,
            dark_mode,
            roll: RollPhase::Idle,
            dirty: DirtyKeys::default(),
        }
    }

    pub fn creatures(&self) -> &CreatureStore {
        &self.creatures
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    pub fn dark_mode(&self) -> bool {
        self.dark_mode
    }

    pub fn roll_phase(&self) -> RollPhase {
        self.roll
    }

    // ── Creature mutations ─────────────────────────────────────────

    pub fn add_creatures(&mut self, template: &CreatureTemplate, amount: usize) -> Vec<CreatureId> {
        let ids = self.creatures.add(template, amount);
        self.dirty.creatures = true;
        ids
    }

    pub fn remove_creature(&mut self, id: CreatureId) -> bool {
        self.touch_creatures(|store| store.remove(id))
    }

    pub fn update_creature(&mut self, id: CreatureId, field: CreatureField) -> bool {
        self.touch_creatures(|store| store.update(id, field))
    }

    /// Nudge a numeric field by `delta`. Ok(false) when the id is absent.
    pub fn adjust_creature(
        &mut self,
        id: CreatureId,
        field: &str,
        delta: &str,
    ) -> Result<bool, TrackerError> {
        let Some(creature) = self.creatures.get(id) else {
            return Ok(false);
        };
        let edit = CreatureField::stepped(creature, field, delta)?;
        Ok(self.update_creature(id, edit))
    }

    pub fn toggle_lock(&mut self, id: CreatureId) -> Option<bool> {
        let locked = self.creatures.toggle_lock(id);
        self.dirty.creatures |= locked.is_some();
        locked
    }

    pub fn move_creature(&mut self, id: CreatureId, direction: Direction) -> bool {
        self.touch_creatures(|store| store.move_creature(id, direction))
    }

    pub fn reset_creatures(&mut self) {
        self.creatures.clear();
        self.dirty.creatures = true;
    }

    fn touch_creatures(&mut self, op: impl FnOnce(&mut CreatureStore) -> bool) -> bool {
        let changed = op(&mut self.creatures);
        self.dirty.creatures |= changed;
        changed
    }

    // ── Rolling ────────────────────────────────────────────────────

    /// Start a roll at `now` (ms). Returns when it becomes due.
    pub fn request_roll(&mut self, now: u64, delay_ms: u64) -> Result<u64, TrackerError> {
        self.roll.begin(now, delay_ms)
    }

    /// Apply the pending roll if its delay has elapsed. `Ok(None)` while it
    /// is still pending.
    pub fn settle_roll(
        &mut self,
        now: u64,
        dice: &mut dyn Dice,
        sides: u32,
    ) -> Result<Option<HistoryEntry>, TrackerError> {
        if !self.roll.is_due(now)? {
            return Ok(None);
        }
        let entry = roller::roll_initiative(&mut self.creatures, dice, sides, now);
        self.history.append(entry);
        self.roll.finish();
        self.dirty.creatures = true;
        self.dirty.history = true;
        Ok(self.history.last().cloned())
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
        self.dirty.history = true;
    }

    // ── Save / import ──────────────────────────────────────────────

    pub fn export_token(&self) -> Result<String, TrackerError> {
        Ok(codec::encode(&self.creatures.snapshot())?)
    }

    /// Replace the whole creature list from a token. On error nothing
    /// changes. Returns the number of imported creatures.
    pub fn import_token(&mut self, token: &str) -> Result<usize, TrackerError> {
        let creatures = codec::decode(token)?;
        let store = CreatureStore::from_creatures(creatures)?;
        let count = store.len();
        self.creatures = store;
        self.dirty.creatures = true;
        info!(count, "imported creatures");
        Ok(count)
    }

    // ── Settings ───────────────────────────────────────────────────

    pub fn toggle_dark_mode(&mut self) -> bool {
        self.dark_mode = !self.dark_mode;
        self.dirty.dark_mode = true;
        self.dark_mode
    }

    /// Return and clear the set of changed persisted values.
    pub fn take_dirty(&mut self) -> DirtyKeys {
        std::mem::take(&mut self.dirty)
    }
}

thread_local! {
    static TRACKER: RefCell<Tracker> = RefCell::new(Tracker::default());
}

/// Execute a closure with read access to the tracker.
pub fn with_tracker<F, R>(f: F) -> R
where
    F: FnOnce(&Tracker) -> R,
{
    TRACKER.with(|t| f(&t.borrow()))
}

/// Execute a closure with mutable access to the tracker.
pub fn with_tracker_mut<F, R>(f: F) -> R
where
    F: FnOnce(&mut Tracker) -> R,
{
    TRACKER.with(|t| f(&mut t.borrow_mut()))
}

/// Replace the entire tracker (startup restore).
pub fn replace_tracker(new_state: Tracker) {
    TRACKER.with(|t| {
        if t.borrow().roll_phase().is_rolling() {
            warn!("tracker replaced while a roll was pending");
        }
        *t.borrow_mut() = new_state;
    });
}

pub fn reset_tracker() {
    replace_tracker(Tracker::default());
}
