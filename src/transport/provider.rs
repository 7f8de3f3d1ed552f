//! Provider-specific request and response shapes.
//!
//! The two providers differ in auth headers, request body layout, where the
//! completion text lives in a response, and how streaming deltas are framed.
//! Each difference is one `match` on [`Provider`].

use crate::error_code::StandardErrorCode;
use crate::types::{GenerationOptions, Message, MessageRole, StreamEvent};
use crate::utils::PathMapper;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;

/// Anthropic requires `max_tokens`; used when the caller leaves it unset.
pub const ANTHROPIC_DEFAULT_MAX_TOKENS: u32 = 4096;
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Provider {
    #[serde(rename = "anthropic")]
    Anthropic,
    #[serde(rename = "openai")]
    OpenAi,
}

/// What one decoded stream payload means.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamFrame {
    Event(StreamEvent),
    /// Keep-alives, role announcements, usage frames and the like.
    Skip,
}

impl Provider {
    pub const ALL: [Provider; 2] = [Provider::Anthropic, Provider::OpenAi];

    pub fn name(&self) -> &'static str {
        match self {
            Provider::Anthropic => "anthropic",
            Provider::OpenAi => "openai",
        }
    }

    pub fn default_endpoint(&self) -> &'static str {
        match self {
            Provider::Anthropic => "https://api.anthropic.com/v1/messages",
            Provider::OpenAi => "https://api.openai.com/v1/chat/completions",
        }
    }

    pub fn api_key_env(&self) -> &'static str {
        match self {
            Provider::Anthropic => "ANTHROPIC_API_KEY",
            Provider::OpenAi => "OPENAI_API_KEY",
        }
    }

    /// Header name/value pairs carrying the credential and API version.
    pub fn auth_headers(&self, api_key: &str) -> Vec<(&'static str, String)> {
        match self {
            Provider::Anthropic => vec![
                ("x-api-key", api_key.to_string()),
                ("anthropic-version", ANTHROPIC_VERSION.to_string()),
            ],
            Provider::OpenAi => vec![("authorization", format!("Bearer {}", api_key))],
        }
    }

    pub fn build_body(
        &self,
        model: &str,
        messages: &[Message],
        options: &GenerationOptions,
        stream: bool,
    ) -> Value {
        match self {
            Provider::Anthropic => {
                // System prompts go in a top-level field, not in `messages`.
                let system: Vec<&str> = messages
                    .iter()
                    .filter(|m| m.role == MessageRole::System)
                    .map(|m| m.content.as_str())
                    .collect();
                let turns: Vec<&Message> = messages
                    .iter()
                    .filter(|m| m.role != MessageRole::System)
                    .collect();
                let mut body = json!({
                    "model": model,
                    "messages": turns,
                    "max_tokens": options.max_tokens.unwrap_or(ANTHROPIC_DEFAULT_MAX_TOKENS),
                    "temperature": options.temperature,
                    "stream": stream,
                });
                if !system.is_empty() {
                    body["system"] = Value::String(system.join("\n\n"));
                }
                body
            }
            Provider::OpenAi => {
                let mut body = json!({
                    "model": model,
                    "messages": messages,
                    "temperature": options.temperature,
                    "top_p": options.top_p,
                    "stream": stream,
                });
                if let Some(max_tokens) = options.max_tokens {
                    body["max_tokens"] = json!(max_tokens);
                }
                body
            }
        }
    }

    /// Path of the completion text in a non-streaming response.
    pub fn text_path(&self) -> &'static str {
        match self {
            Provider::Anthropic => "content[0].text",
            Provider::OpenAi => "choices[0].message.content",
        }
    }

    pub fn extract_text(&self, response: &Value) -> Result<String> {
        PathMapper::get_str(response, self.text_path())
            .map(str::to_string)
            .ok_or_else(|| {
                Error::MalformedResponse(format!(
                    "{} response has no text at `{}`",
                    self.name(),
                    self.text_path()
                ))
            })
    }

    /// `(input_tokens, output_tokens)` reported by the provider, if any.
    pub fn usage(&self, response: &Value) -> Option<(u64, u64)> {
        let (input, output) = match self {
            Provider::Anthropic => ("usage.input_tokens", "usage.output_tokens"),
            Provider::OpenAi => ("usage.prompt_tokens", "usage.completion_tokens"),
        };
        Some((
            PathMapper::get_path(response, input)?.as_u64()?,
            PathMapper::get_path(response, output)?.as_u64()?,
        ))
    }

    /// Interpret one decoded `data:` payload of a streaming response.
    pub fn parse_stream_payload(&self, payload: &Value) -> Result<StreamFrame> {
        match self {
            Provider::OpenAi => Ok(PathMapper::get_str(payload, "choices[0].delta.content")
                .map(|text| StreamFrame::Event(StreamEvent::text(text)))
                .unwrap_or(StreamFrame::Skip)),
            Provider::Anthropic => match payload["type"].as_str() {
                Some("content_block_delta") => Ok(PathMapper::get_str(payload, "delta.text")
                    .map(|text| StreamFrame::Event(StreamEvent::text(text)))
                    .unwrap_or(StreamFrame::Skip)),
                Some("message_stop") => Ok(StreamFrame::Event(StreamEvent::Done)),
                Some("error") => {
                    let (code, message) = error_details(payload);
                    let code = code
                        .as_deref()
                        .and_then(StandardErrorCode::from_provider_code)
                        .unwrap_or(StandardErrorCode::Unknown);
                    Err(code.into_error(200, message))
                }
                _ => Ok(StreamFrame::Skip),
            },
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// `(provider error code, message)` from an error body of either provider.
///
/// OpenAI: `{"error": {"message", "type", "code"}}`.
/// Anthropic: `{"type": "error", "error": {"type", "message"}}`.
pub fn error_details(body: &Value) -> (Option<String>, String) {
    let err = &body["error"];
    let code = err["code"]
        .as_str()
        .or_else(|| err["type"].as_str())
        .map(str::to_string);
    let message = err["message"]
        .as_str()
        .or_else(|| body["message"].as_str())
        .map(str::to_string)
        .unwrap_or_else(|| body.to_string());
    (code, message)
}
