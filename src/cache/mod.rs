//! Compiled page cache.
//!
//! The builder writes every artifact here; request handlers only read.

mod key;
mod store;

pub use key::{CacheKey, ERROR_CODES};
pub use store::{CacheStore, MemoryStore};
