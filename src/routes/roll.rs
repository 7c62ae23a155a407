//! `/api/roll/*` routes: two-step initiative roll.
//!
//! `POST /api/roll` moves the tracker into `Rolling` and tells the page when
//! the roll becomes due. The page shows its rolling animation, waits, then
//! calls `POST /api/roll/settle`, which applies every draw and the re-sort
//! in one step. A second request while rolling is rejected.

use serde_json::{Value, json};

use crate::config;
use crate::error::TrackerError;
use crate::routes::creatures::list_fields;
use crate::routes::notify::Notice;
use crate::routes::util::{parse_form_body, reply, require_u64};
use crate::tracker::roller::ThreadDice;
use crate::tracker::state::{with_tracker, with_tracker_mut};

// ── GET /api/roll ──────────────────────────────────────────────────

pub fn handle_phase_get(_query: &str) -> String {
    reply(Ok(json!({ "roll": with_tracker(|t| t.roll_phase()) })))
}

// ── POST /api/roll ─────────────────────────────────────────────────

/// Body: `now` (ms since epoch).
pub fn handle_roll_post(body: &str) -> String {
    let params = parse_form_body(body);
    let delay = config::current().roll_delay_ms;
    let result = require_u64(&params, "now").and_then(|now| {
        let ready_at = with_tracker_mut(|t| t.request_roll(now, delay))
            .map_err(|e| Notice::from(&e))?;
        Ok(json!({ "readyAt": ready_at, "delayMs": delay }))
    });
    reply(result)
}

// ── POST /api/roll/settle ──────────────────────────────────────────

/// Body: `now` (ms since epoch). Replies `{"settled":false}` while the roll
/// is still pending, otherwise the new list plus the history entry.
pub fn handle_settle_post(body: &str) -> String {
    let params = parse_form_body(body);
    let sides = config::current().die_sides;
    let result = require_u64(&params, "now").and_then(|now| {
        with_tracker_mut(|t| -> Result<Value, TrackerError> {
            let mut fields = list_fields(t);
            match t.settle_roll(now, &mut ThreadDice, sides)? {
                None => {
                    fields["settled"] = Value::Bool(false);
                }
                Some(entry) => {
                    fields = list_fields(t);
                    fields["settled"] = Value::Bool(true);
                    fields["entry"] = json!(entry);
                }
            }
            Ok(fields)
        })
        .map_err(|e| Notice::from(&e))
    });
    reply(result)
}
