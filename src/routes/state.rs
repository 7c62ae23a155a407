//! `/api/state/*` routes: save tokens, import tokens, clipboard outcome.
//!
//! The page copies the token from `GET /api/state/save` to the clipboard
//! itself and reports how that went to `/api/state/clipboard`, so the
//! notification comes from the same place as every other outcome.

use serde_json::{Value, json};
use tracing::{info, warn};

use crate::error::ClipboardError;
use crate::routes::creatures::list_fields;
use crate::routes::notify::Notice;
use crate::routes::util::{get_param, parse_form_body, reply};
use crate::tracker::state::{with_tracker, with_tracker_mut};

// ── GET /api/state/save ────────────────────────────────────────────

/// The token to copy. No notice here: the outcome is only known once the
/// page reports the clipboard write.
pub fn handle_save_get(_query: &str) -> String {
    let result = with_tracker(|t| -> Result<Value, Notice> {
        let token = t.export_token().map_err(|e| Notice::from(&e))?;
        Ok(json!({ "token": token, "count": t.creatures().len() }))
    });
    reply(result)
}

// ── POST /api/state/import ─────────────────────────────────────────

/// Body: `token=<...>`, or the raw token itself.
pub fn handle_import_post(body: &str) -> String {
    let params = parse_form_body(body);
    let token = match get_param(&params, "token") {
        Some(t) => t.to_string(),
        None => body.trim().to_string(),
    };
    let result = with_tracker_mut(|t| match t.import_token(&token) {
        Ok(count) => {
            let mut fields = list_fields(t);
            fields["count"] = json!(count);
            let noun = if count == 1 { "creature" } else { "creatures" };
            fields["notice"] = json!(Notice::success(format!("Imported {} {}", count, noun)));
            Ok(fields)
        }
        Err(e) => {
            warn!(error = %e, "import rejected");
            Err(Notice::from(&e))
        }
    });
    reply(result)
}

// ── POST /api/state/clipboard ──────────────────────────────────────

/// Body: `ok=true|false`, `reason` (on failure).
pub fn handle_clipboard_post(body: &str) -> String {
    let params = parse_form_body(body);
    if get_param(&params, "ok") == Some("true") {
        info!("save token copied");
        return reply(Ok(json!({
            "notice": Notice::success("Creature list copied to clipboard"),
        })));
    }
    let err = ClipboardError {
        reason: get_param(&params, "reason").unwrap_or("unknown").to_string(),
    };
    warn!(error = %err, "clipboard write failed");
    reply(Err(Notice::from(&err)))
}
