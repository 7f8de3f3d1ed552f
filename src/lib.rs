//! # llm-api-interface
//!
//! A thin client for the Anthropic Messages and OpenAI Chat Completions APIs,
//! with an on-disk response cache and a heuristic model selector.
//!
//! ## Overview
//!
//! A request `(model, messages)` is reduced to a SHA-256 [`Fingerprint`]. The
//! [`CacheStore`] keeps one JSON file per fingerprint; entries expire lazily
//! once older than the configured TTL and can be evicted in bulk by age. On a
//! miss the [`CachedClient`] calls the provider through a
//! [`transport::Transport`] and stores the response.
//!
//! Model metadata, cost estimation and selection are pure and independent of
//! the cache; see [`models`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use llm_api_interface::{CachedClient, GenerationOptions, Message, ModelId, Settings};
//!
//! #[tokio::main]
//! async fn main() -> llm_api_interface::Result<()> {
//!     let settings = Settings::from_env()?;
//!     let client = CachedClient::from_settings(&settings).await?;
//!
//!     let messages = vec![Message::user("Hello, how are you?")];
//!     let completion = client
//!         .complete(ModelId::Gpt4o, &messages, &GenerationOptions::default())
//!         .await?;
//!     println!("{} (cached: {})", completion.text()?, completion.cached);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`cache`] | Fingerprints, cache entries and the file-backed store |
//! | [`client`] | Cache-aware client |
//! | [`config`] | Settings from defaults, YAML and environment |
//! | [`models`] | Catalog, pricing, selection, usage accounting |
//! | [`transport`] | HTTP transport and streaming decoder |
//! | [`types`] | Messages, generation options, stream events |

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod error_code;
pub mod models;
pub mod transport;
pub mod types;
pub mod utils;

pub use cache::{CacheConfig, CacheLookup, CacheStore, Fingerprint, MissReason};
pub use client::{CachedClient, Completion};
pub use config::Settings;
pub use error::{Error, ErrorContext};
pub use models::{calculate_cost, select_model, ModelCatalog, ModelId, ModelSelector};
pub use types::{GenerationOptions, Message, MessageRole, StreamEvent};

use futures::Stream;
use std::pin::Pin;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// A unified pinned, boxed stream that emits `Result<T>`
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = Result<T>> + Send + 'a>>;
