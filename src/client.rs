//! Cache-aware client.
//!
//! Wires the request path together: fingerprint the request, look it up in
//! the [`CacheStore`](crate::cache::CacheStore), and on a miss call the
//! [`Transport`](crate::transport::Transport) and store the response.
//! Streaming calls bypass the cache.

mod core;

pub use self::core::{CachedClient, Completion};
