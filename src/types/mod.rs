//! Core data types shared by the cache, the transport and the CLI.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Message`] | Chat message with role and text content |
//! | [`MessageRole`] | Message role (system, user, assistant) |
//! | [`StreamEvent`] | One item of a streamed completion |
//! | [`GenerationOptions`] | Sampling parameters for a request |
//!
//! ## Example
//!
//! ```rust
//! use llm_api_interface::types::{Message, MessageRole};
//!
//! let system = Message::system("You are a helpful assistant");
//! let user = Message::user("What's the weather?");
//! assert_eq!(user.role, MessageRole::User);
//! ```

pub mod events;
pub mod message;

pub use events::StreamEvent;
pub use message::{GenerationOptions, Message, MessageRole};
