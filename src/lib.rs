//! Initiative tracker WASM server.
//!
//! Exports `handle_request(method, path, query, body)` for the Service Worker
//! bridge to call. Uses `matchit` for URL routing, the same router engine
//! that powers Axum. Every reply is a JSON string: `{"ok":true,...}` on
//! success, `{"ok":false,"notice":{...}}` otherwise.
//!
//! The page owns the clock, the clipboard and local storage. It passes
//! timestamps in, reports clipboard outcomes back, and mirrors
//! `/api/storage/pending` into local storage after each mutation.

use wasm_bindgen::prelude::*;

pub mod config;
pub mod error;
pub mod logging;
pub mod routes;
pub mod tracker;

use routes::notify::Notice;
use routes::util::err_json;

/// Process an HTTP-like request and return a JSON reply.
///
/// Called from JavaScript (Web Worker) via wasm-bindgen.
///
/// # Arguments
/// * `method`: HTTP method (e.g., "GET", "POST")
/// * `path`: URL path (e.g., "/api/creatures")
/// * `query`: Query string (e.g., "?key=creatures")
/// * `body`: Request body (e.g., POST form data). Empty string for GET requests.
#[wasm_bindgen]
pub fn handle_request(method: &str, path: &str, query: &str, body: &str) -> String {
    // Build the router. matchit compiles route patterns into a radix tree.
    let mut router = matchit::Router::new();

    // Register routes: the value is a &str tag we match on below
    router.insert("/api/creatures", "creatures").ok();
    router.insert("/api/creatures/add", "creatures_add").ok();
    router.insert("/api/creatures/remove", "creatures_remove").ok();
    router.insert("/api/creatures/update", "creatures_update").ok();
    router.insert("/api/creatures/lock", "creatures_lock").ok();
    router.insert("/api/creatures/move", "creatures_move").ok();
    router.insert("/api/creatures/reset", "creatures_reset").ok();

    router.insert("/api/roll", "roll").ok();
    router.insert("/api/roll/settle", "roll_settle").ok();
    router.insert("/api/history", "history").ok();
    router.insert("/api/history/clear", "history_clear").ok();

    router.insert("/api/state/save", "state_save").ok();
    router.insert("/api/state/import", "state_import").ok();
    router.insert("/api/state/clipboard", "state_clipboard").ok();

    router.insert("/api/storage", "storage").ok();
    router.insert("/api/storage/pending", "storage_pending").ok();
    router.insert("/api/storage/restore", "storage_restore").ok();

    router.insert("/api/settings/dark-mode", "dark_mode").ok();

    match router.at(path) {
        Ok(matched) => match (*matched.value, method) {
            // GET routes
            ("creatures", "GET") => routes::creatures::handle_list_get(query),
            ("roll", "GET") => routes::roll::handle_phase_get(query),
            ("history", "GET") => routes::history::handle_history_get(query),
            ("state_save", "GET") => routes::state::handle_save_get(query),
            ("storage", "GET") => routes::storage::handle_value_get(query),
            ("storage_pending", "GET") => routes::storage::handle_pending_get(query),
            ("dark_mode", "GET") => routes::settings::handle_dark_mode_get(query),

            // POST routes
            ("creatures_add", "POST") => routes::creatures::handle_add_post(body),
            ("creatures_remove", "POST") => routes::creatures::handle_remove_post(body),
            ("creatures_update", "POST") => routes::creatures::handle_update_post(body),
            ("creatures_lock", "POST") => routes::creatures::handle_lock_post(body),
            ("creatures_move", "POST") => routes::creatures::handle_move_post(body),
            ("creatures_reset", "POST") => routes::creatures::handle_reset_post(body),
            ("roll", "POST") => routes::roll::handle_roll_post(body),
            ("roll_settle", "POST") => routes::roll::handle_settle_post(body),
            ("history_clear", "POST") => routes::history::handle_clear_post(body),
            ("state_import", "POST") => routes::state::handle_import_post(body),
            ("state_clipboard", "POST") => routes::state::handle_clipboard_post(body),
            ("storage_restore", "POST") => routes::storage::handle_restore_post(body),
            ("dark_mode", "POST") => routes::settings::handle_dark_mode_post(body),

            _ => method_not_allowed(),
        },
        Err(_) => not_found(),
    }
}

/// Install the `tracing` subscriber using the configured filter.
/// Returns `"ok"` or the error text.
#[wasm_bindgen]
pub fn init_logging() -> String {
    match logging::init(&config::current().log_filter) {
        Ok(()) => "ok".to_string(),
        Err(e) => e,
    }
}

/// Replace the tracker configuration from a JSON object. Missing fields take
/// their defaults. Returns `"ok"` or the error text.
#[wasm_bindgen]
pub fn configure(json: &str) -> String {
    match config::apply_json(json) {
        Ok(()) => {
            tracing::info!(config = ?config::current(), "configuration applied");
            "ok".to_string()
        }
        Err(e) => {
            tracing::warn!(error = %e, "configuration rejected");
            e
        }
    }
}

fn not_found() -> String {
    err_json(Notice::error("404: route not found"))
}

fn method_not_allowed() -> String {
    err_json(Notice::error("405: method not allowed"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use tracker::state::reset_tracker;

    fn parse(s: &str) -> Value {
        serde_json::from_str(s).unwrap()
    }

    #[test]
    fn returns_404_for_unknown_route() {
        let json = handle_request("GET", "/api/nonexistent", "", "");
        assert!(json.contains("404"));
        assert_eq!(parse(&json)["ok"], false);
    }

    #[test]
    fn returns_405_for_wrong_method() {
        let json = handle_request("POST", "/api/creatures", "", "");
        assert!(json.contains("405"));
        let json = handle_request("GET", "/api/roll/settle", "", "");
        assert!(json.contains("405"));
    }

    #[test]
    fn routes_creatures_add_and_list() {
        reset_tracker();
        let v = parse(&handle_request(
            "POST",
            "/api/creatures/add",
            "",
            "name=Goblin&hp=7&ac=13&initiativeBonus=2&amount=2",
        ));
        assert_eq!(v["ok"], true);
        let v = parse(&handle_request("GET", "/api/creatures", "", ""));
        assert_eq!(v["creatures"].as_array().unwrap().len(), 2);
        reset_tracker();
    }

    #[test]
    fn routes_full_roll_cycle() {
        reset_tracker();
        config::reset();
        handle_request("POST", "/api/creatures/add", "", "name=Bugbear&hp=27&ac=16&initiativeBonus=2");
        let v = parse(&handle_request("POST", "/api/roll", "", "now=100"));
        let ready_at = v["readyAt"].as_u64().unwrap();
        let v = parse(&handle_request(
            "POST",
            "/api/roll/settle",
            "",
            &format!("now={}", ready_at),
        ));
        assert_eq!(v["settled"], true);
        let v = parse(&handle_request("GET", "/api/history", "", ""));
        assert_eq!(v["history"].as_array().unwrap().len(), 1);
        reset_tracker();
    }

    #[test]
    fn routes_save_and_import() {
        reset_tracker();
        handle_request("POST", "/api/creatures/add", "", "name=Orc&hp=15&ac=13&initiativeBonus=1");
        let token = parse(&handle_request("GET", "/api/state/save", "", ""))["token"]
            .as_str()
            .unwrap()
            .to_string();
        handle_request("POST", "/api/creatures/reset", "", "");
        let v = parse(&handle_request("POST", "/api/state/import", "", &format!("token={}", token)));
        assert_eq!(v["creatures"][0]["name"], "Orc");
        reset_tracker();
    }

    #[test]
    fn routes_storage_and_settings() {
        reset_tracker();
        let v = parse(&handle_request("POST", "/api/settings/dark-mode", "", ""));
        assert_eq!(v["darkMode"], false);
        let v = parse(&handle_request("GET", "/api/storage", "?key=dark_mode", ""));
        assert_eq!(v["value"], "false");
        let v = parse(&handle_request("GET", "/api/storage/pending", "", ""));
        assert!(v["writes"]["initiative_dark_mode"].is_string());
        reset_tracker();
    }

    #[test]
    fn configure_applies_and_rejects() {
        assert_eq!(configure(r#"{"roll_delay_ms": 300}"#), "ok");
        assert_eq!(config::current().roll_delay_ms, 300);
        assert!(configure(r#"{"die_sides": 0}"#).contains("die_sides"));
        assert!(configure(r#"{"volume": 3}"#).starts_with("Invalid tracker config"));
        assert_eq!(config::current().roll_delay_ms, 300);
        config::reset();
    }

    #[test]
    fn init_logging_reports_ok() {
        assert_eq!(init_logging(), "ok");
    }
}
