//! Shared URL/form parsing and JSON reply helpers for route handlers.

use serde_json::{Map, Value, json};

use crate::routes::notify::Notice;

/// Parse URL-encoded form body into key-value pairs.
/// Handles `key=value&key2=value2` format (from worker POST bodies).
pub fn parse_form_body(body: &str) -> Vec<(String, String)> {
    if body.is_empty() {
        return Vec::new();
    }
    body.split('&')
        .filter(|pair| !pair.is_empty())
        .filter_map(|pair| {
            let mut parts = pair.splitn(2, '=');
            let key = parts.next()?;
            let val = parts.next().unwrap_or("");
            Some((percent_decode(key), percent_decode(val)))
        })
        .collect()
}

/// Percent-decode a URL-encoded value. Multi-byte UTF-8 sequences are
/// reassembled; invalid escapes are kept literally.
pub fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' if i + 2 < bytes.len() => {
                match (hex_val(bytes[i + 1]), hex_val(bytes[i + 2])) {
                    (Some(h), Some(l)) => {
                        out.push(h << 4 | l);
                        i += 3;
                    }
                    _ => {
                        out.push(b'%');
                        i += 1;
                    }
                }
            }
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_val(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

/// Parse a query string into key-value pairs.
pub fn parse_query(query: &str) -> Vec<(String, String)> {
    let q = query.strip_prefix('?').unwrap_or(query);
    parse_form_body(q)
}

/// Helper to get a value by key from a list of key-value pairs.
pub fn get_param<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

/// Like [`get_param`], but a missing key becomes an error notice.
pub fn require_param<'a>(params: &'a [(String, String)], key: &str) -> Result<&'a str, Notice> {
    get_param(params, key).ok_or_else(|| Notice::error(format!("Missing {} parameter", key)))
}

/// Parse a required numeric parameter (ids, millisecond clocks).
pub fn require_u64(params: &[(String, String)], key: &str) -> Result<u64, Notice> {
    let raw = require_param(params, key)?;
    raw.trim()
        .parse()
        .map_err(|_| Notice::error(format!("Invalid {} parameter: {}", key, raw)))
}

/// Successful reply: `{"ok":true, ...fields}`.
pub fn ok_json(fields: Value) -> String {
    let mut obj = Map::new();
    obj.insert("ok".to_string(), Value::Bool(true));
    if let Value::Object(extra) = fields {
        obj.extend(extra);
    }
    Value::Object(obj).to_string()
}

/// Failed reply: `{"ok":false,"notice":{...}}`.
pub fn err_json(notice: Notice) -> String {
    json!({ "ok": false, "notice": notice }).to_string()
}

/// Collapse a handler result into its reply string.
pub fn reply(result: Result<Value, Notice>) -> String {
    match result {
        Ok(fields) => ok_json(fields),
        Err(notice) => err_json(notice),
    }
}

/// Escape text for inclusion in an HTML fragment.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
