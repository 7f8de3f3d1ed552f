//! Streaming events

use serde::{Deserialize, Serialize};

/// One item of a streamed completion.
///
/// A well-formed stream is zero or more `TextDelta` items followed by exactly one
/// `Done`, after which the stream yields nothing further.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event_type")]
pub enum StreamEvent {
    /// Partial content delta (text streaming)
    TextDelta { text: String },

    /// End-of-stream marker
    Done,
}

impl StreamEvent {
    pub fn text(text: impl Into<String>) -> Self {
        StreamEvent::TextDelta { text: text.into() }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            StreamEvent::TextDelta { text } => Some(text),
            StreamEvent::Done => None,
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, StreamEvent::Done)
    }
}
