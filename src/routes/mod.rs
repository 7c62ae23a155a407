//! Route handlers. Each takes the query string (GET) or form body (POST)
//! and returns the JSON reply string.

pub mod creatures;
pub mod history;
pub mod notify;
pub mod roll;
pub mod settings;
pub mod state;
pub mod storage;
pub mod util;
