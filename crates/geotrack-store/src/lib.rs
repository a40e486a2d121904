//! GeoTrack Store - Location store port and adapters
//!
//! This crate defines the append-only location and alert store used by the
//! tracking loop, with an in-memory adapter for tests and an SQLite adapter
//! for durable history.

pub mod memory;
pub mod ports;
pub mod sqlite;

pub use memory::MemoryStore;
pub use ports::{LocationStore, StoreStats};
pub use sqlite::{SqliteConfig, SqliteStore};
