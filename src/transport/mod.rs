//! Provider transport.
//!
//! [`Transport`] is the seam between the cache-aware client and the network.
//! [`HttpTransport`] implements it over `reqwest` for both providers, mapping
//! HTTP failures onto the error kinds in [`Error`](crate::Error):
//!
//! | Condition | Error |
//! |-----------|-------|
//! | HTTP 429 | `RateLimited` |
//! | HTTP 413, or 400 reporting a token/context limit | `TokenLimitExceeded` |
//! | any other non-2xx | `UpstreamApi` |
//! | connect / timeout / body read failure | `Network` |
//! | undecodable body or missing fields | `MalformedResponse` |

mod http;
mod provider;
mod sse;

pub use http::{HttpTransport, HttpTransportBuilder, KEYRING_SERVICE};
pub use provider::{
    error_details, Provider, StreamFrame, ANTHROPIC_DEFAULT_MAX_TOKENS, ANTHROPIC_VERSION,
};
pub use sse::decode_events;

use crate::models::ModelId;
use crate::types::{GenerationOptions, Message, StreamEvent};
use crate::{BoxStream, Result};
use async_trait::async_trait;
use serde_json::Value;

#[async_trait]
pub trait Transport: Send + Sync {
    /// One complete response body, passed through without reshaping.
    async fn send(
        &self,
        model: ModelId,
        messages: &[Message],
        options: &GenerationOptions,
    ) -> Result<Value>;

    /// Text deltas followed by [`StreamEvent::Done`]. The stream cannot be
    /// restarted; dropping it abandons the request.
    async fn send_stream(
        &self,
        model: ModelId,
        messages: &[Message],
        options: &GenerationOptions,
    ) -> Result<BoxStream<'static, StreamEvent>>;
}
