//! RocksDB-backed storage implementation.
//!
//! See `engine.rs` for lock semantics and `schema.rs` for column families and key layout.

pub mod engine;
pub mod schema;
pub mod util;

pub use engine::RocksStorage;
