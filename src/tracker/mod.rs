//! Tracker core: creature store, initiative roller, roll history, the
//! save/import codec, and local-storage persistence. State lives in WASM
//! memory (thread_local) for the lifetime of the worker.

pub mod codec;
pub mod creature;
pub mod history;
pub mod persist;
pub mod roller;
pub mod state;
pub mod store;
