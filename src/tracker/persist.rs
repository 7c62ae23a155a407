//! Local-storage persistence. Three independent keys, each holding JSON.
//!
//! ## Lifecycle
//!
//! - **Page load:** the page reads the three keys and posts them to
//!   `/api/storage/restore`; missing or unreadable values fall back to
//!   defaults (empty list, empty history, configured dark mode).
//! - **Every mutation:** the page polls `/api/storage/pending` and writes
//!   back only the keys that changed.

use serde_json::{Map, Value};
use tracing::warn;

use crate::tracker::creature::Creature;
use crate::tracker::history::HistoryLog;
use crate::tracker::state::{DirtyKeys, Tracker};
use crate::tracker::store::CreatureStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKey {
    Creatures,
    History,
    DarkMode,
}

impl StorageKey {
    pub const ALL: [StorageKey; 3] = [StorageKey::Creatures, StorageKey::History, StorageKey::DarkMode];

    /// The local-storage key name.
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKey::Creatures => "initiative_creatures",
            StorageKey::History => "initiative_history",
            StorageKey::DarkMode => "initiative_dark_mode",
        }
    }

    /// Accepts the storage key name or its short form (`creatures`,
    /// `history`, `dark_mode`).
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s || k.as_str().strip_prefix("initiative_") == Some(s))
    }

    fn is_dirty(&self, dirty: &DirtyKeys) -> bool {
        match self {
            StorageKey::Creatures => dirty.creatures,
            StorageKey::History => dirty.history,
            StorageKey::DarkMode => dirty.dark_mode,
        }
    }
}

/// JSON value stored under `key`.
pub fn value_json(tracker: &Tracker, key: StorageKey) -> String {
    let result = match key {
        StorageKey::Creatures => serde_json::to_string(&tracker.creatures().snapshot()),
        StorageKey::History => serde_json::to_string(tracker.history()),
        StorageKey::DarkMode => serde_json::to_string(&tracker.dark_mode()),
    };
    result.unwrap_or_else(|_| "null".to_string())
}

/// Object of `{storage key: JSON text}` for every key that changed since the
/// last call, clearing the change flags.
pub fn take_pending(tracker: &mut Tracker) -> Map<String, Value> {
    let dirty = tracker.take_dirty();
    let tracker = &*tracker;
    StorageKey::ALL
        .into_iter()
        .filter(|k| k.is_dirty(&dirty))
        .map(|k| (k.as_str().to_string(), Value::String(value_json(tracker, k))))
        .collect()
}

/// Rebuild a tracker from the three stored values.
pub fn restore(
    creatures: Option<&str>,
    history: Option<&str>,
    dark_mode: Option<&str>,
    default_dark_mode: bool,
) -> Tracker {
    let store = load_or_default(StorageKey::Creatures, creatures, |json| {
        let list: Vec<Creature> = serde_json::from_str(json).map_err(|e| e.to_string())?;
        CreatureStore::from_creatures(list).map_err(|e| e.to_string())
    });
    let history = load_or_default(StorageKey::History, history, |json| {
        serde_json::from_str::<HistoryLog>(json).map_err(|e| e.to_string())
    });
    let dark_mode = dark_mode
        .filter(|s| !s.trim().is_empty())
        .and_then(|json| match serde_json::from_str::<bool>(json) {
            Ok(b) => Some(b),
            Err(e) => {
                warn!(key = StorageKey::DarkMode.as_str(), error = %e, "ignoring stored value");
                None
            }
        })
        .unwrap_or(default_dark_mode);

    Tracker::from_parts(store, history, dark_mode)
}

fn load_or_default<T: Default>(
    key: StorageKey,
    raw: Option<&str>,
    parse: impl FnOnce(&str) -> Result<T, String>,
) -> T {
    match raw.filter(|s| !s.trim().is_empty()) {
        None => T::default(),
        Some(json) => parse(json).unwrap_or_else(|e| {
            warn!(key = key.as_str(), error = %e, "ignoring stored value");
            T::default()
        }),
    }
}
