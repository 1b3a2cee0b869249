#![forbid(unsafe_code)]

pub mod kv;
pub mod repository;
pub mod sqlite;

pub use kv::{KeyValueStore, MemoryStore, UnavailableStore};
pub use repository::{InMemoryRepository, SessionRepository, Storage, StorageError};
