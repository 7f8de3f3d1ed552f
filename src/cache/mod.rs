//! On-disk response cache.
//!
//! Responses are keyed by a [`Fingerprint`] of `(model, messages)` and stored
//! one JSON file per entry in a flat directory. Entries expire lazily: a read
//! past the TTL deletes the file and reports a miss. [`CacheStore::clear`]
//! removes everything, or only entries older than a given age.
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`CacheStore`] | Lookup, store and eviction with TTL and statistics |
//! | [`CacheConfig`] | Enabled flag, TTL and directory |
//! | [`CacheLookup`] | Hit, or a miss tagged with its [`MissReason`] |
//! | [`CacheBackend`] | Raw byte storage trait |
//! | [`FileCache`] | One file per entry, atomic replace on write |
//! | [`NullCache`] | No-op backend for a disabled cache |
//! | [`Fingerprint`] | Deterministic request key |
//!
//! ## Example
//!
//! ```rust,no_run
//! use llm_api_interface::cache::{CacheConfig, CacheStore};
//! use llm_api_interface::Message;
//! use std::time::Duration;
//!
//! # async fn demo() -> llm_api_interface::Result<()> {
//! let config = CacheConfig::new()
//!     .with_directory(".cache")
//!     .with_ttl(Duration::from_secs(3600));
//! let cache = CacheStore::open(config).await?;
//!
//! let messages = vec![Message::user("Hello")];
//! if let Some(response) = cache.get("gpt-4o", &messages).await?.into_hit() {
//!     println!("cached: {response}");
//! }
//! # Ok(())
//! # }
//! ```

mod backend;
mod entry;
mod key;
mod store;

pub use backend::{CacheBackend, FileCache, NullCache};
pub use entry::CacheEntry;
pub use key::{fingerprint, Fingerprint, ENTRY_EXTENSION};
pub use store::{CacheConfig, CacheLookup, CacheStats, CacheStore, MissReason};
