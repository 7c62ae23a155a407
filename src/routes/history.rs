//! `/api/history/*` routes: read and clear past rolls.

use serde_json::json;

use crate::routes::util::reply;
use crate::tracker::state::{with_tracker, with_tracker_mut};

pub fn handle_history_get(_query: &str) -> String {
    reply(Ok(with_tracker(|t| json!({ "history": t.history() }))))
}

pub fn handle_clear_post(_body: &str) -> String {
    with_tracker_mut(|t| t.clear_history());
    reply(Ok(json!({ "history": [] })))
}
