//! Data access layer: persisted entities, the store abstraction, and
//! the available backends.

pub mod match_store;
pub mod models;
pub mod storage;
