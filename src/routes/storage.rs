//! `/api/storage/*` routes: the bridge between the tracker and the page's
//! local storage. See [`crate::tracker::persist`] for the lifecycle.

use serde_json::{Value, json};

use crate::config;
use crate::routes::creatures::list_fields;
use crate::routes::notify::Notice;
use crate::routes::util::{get_param, parse_form_body, parse_query, reply, require_param};
use crate::tracker::persist::{self, StorageKey};
use crate::tracker::state::{replace_tracker, with_tracker, with_tracker_mut};

// ── GET /api/storage?key=... ───────────────────────────────────────

pub fn handle_value_get(query: &str) -> String {
    let params = parse_query(query);
    let result = require_param(&params, "key").and_then(|raw| {
        let key = StorageKey::parse(raw)
            .ok_or_else(|| Notice::error(format!("Unknown storage key: {}", raw)))?;
        let value = with_tracker(|t| persist::value_json(t, key));
        Ok(json!({ "key": key.as_str(), "value": value }))
    });
    reply(result)
}

// ── GET /api/storage/pending ───────────────────────────────────────

/// Changed keys since the last poll, as `{"writes":{key: json text}}`.
pub fn handle_pending_get(_query: &str) -> String {
    let writes = with_tracker_mut(persist::take_pending);
    reply(Ok(json!({ "writes": Value::Object(writes) })))
}

// ── POST /api/storage/restore ──────────────────────────────────────

/// Body: the raw stored values under `creatures`, `history`, `dark_mode`.
/// Absent or unreadable values fall back to defaults.
pub fn handle_restore_post(body: &str) -> String {
    let params = parse_form_body(body);
    let tracker = persist::restore(
        get_param(&params, "creatures"),
        get_param(&params, "history"),
        get_param(&params, "dark_mode"),
        config::current().default_dark_mode,
    );
    replace_tracker(tracker);
    let mut fields = with_tracker(list_fields);
    fields["darkMode"] = json!(with_tracker(|t| t.dark_mode()));
    fields["historyLength"] = json!(with_tracker(|t| t.history().len()));
    reply(Ok(fields))
}
