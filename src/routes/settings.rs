//! `/api/settings/dark-mode`: the theme toggle.

use serde_json::json;

use crate::routes::util::reply;
use crate::tracker::state::{with_tracker, with_tracker_mut};

pub fn handle_dark_mode_get(_query: &str) -> String {
    reply(Ok(json!({ "darkMode": with_tracker(|t| t.dark_mode()) })))
}

pub fn handle_dark_mode_post(_body: &str) -> String {
    let dark = with_tracker_mut(|t| t.toggle_dark_mode());
    reply(Ok(json!({ "darkMode": dark })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::state::reset_tracker;
    use serde_json::Value;

    #[test]
    fn toggle_flips_and_reports() {
        reset_tracker();
        let v: Value = serde_json::from_str(&handle_dark_mode_get("")).unwrap();
        assert_eq!(v["darkMode"], true);
        let v: Value = serde_json::from_str(&handle_dark_mode_post("")).unwrap();
        assert_eq!(v["darkMode"], false);
        let v: Value = serde_json::from_str(&handle_dark_mode_post("")).unwrap();
        assert_eq!(v["darkMode"], true);
        reset_tracker();
    }
}
