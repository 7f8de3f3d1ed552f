//! Standard error codes for provider failures.
//!
//! Both providers report failures as an HTTP status plus a JSON error body
//! carrying a provider-specific `type`/`code` string. This module normalizes
//! those into a small canonical code table, which the transport then maps to
//! the library's [`Error`](crate::Error) kinds.
//!
//! ## Error Code Categories
//!
//! | Prefix | Category | Description                 |
//! |--------|----------|-----------------------------|
//! | E1xxx  | client   | Request-side errors         |
//! | E2xxx  | rate     | Rate limit and quota errors |
//! | E3xxx  | server   | Provider-side errors        |
//! | E9xxx  | unknown  | Catch-all / unclassified    |
//!
//! ## Example
//!
//! ```rust
//! use llm_api_interface::error_code::StandardErrorCode;
//!
//! let code = StandardErrorCode::from_provider_code("rate_limit_exceeded").unwrap();
//! assert_eq!(code.code(), "E2001");
//! assert_eq!(code.category(), "rate");
//! ```

use crate::Error;
use std::fmt;

/// Canonical error code for a failed provider call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StandardErrorCode {
    /// E1001: Malformed request, invalid parameters, or missing required fields
    InvalidRequest,
    /// E1002: Invalid, expired, or missing API key
    Authentication,
    /// E1003: Valid credentials but insufficient permissions
    PermissionDenied,
    /// E1004: Requested model or endpoint does not exist
    NotFound,
    /// E1005: Input exceeds context window or token limit
    RequestTooLarge,
    /// E2001: Request rate limit exceeded
    RateLimited,
    /// E2002: Account usage quota or billing limit reached
    QuotaExhausted,
    /// E3001: Internal server error on provider side
    ServerError,
    /// E3002: Provider service temporarily overloaded
    Overloaded,
    /// E3003: Request timed out before response received
    Timeout,
    /// E9999: Error could not be classified
    Unknown,
}

impl StandardErrorCode {
    /// Returns the canonical code string (e.g., `"E1001"`).
    #[inline]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "E1001",
            Self::Authentication => "E1002",
            Self::PermissionDenied => "E1003",
            Self::NotFound => "E1004",
            Self::RequestTooLarge => "E1005",
            Self::RateLimited => "E2001",
            Self::QuotaExhausted => "E2002",
            Self::ServerError => "E3001",
            Self::Overloaded => "E3002",
            Self::Timeout => "E3003",
            Self::Unknown => "E9999",
        }
    }

    /// Returns the standard name (e.g., `"invalid_request"`).
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "invalid_request",
            Self::Authentication => "authentication",
            Self::PermissionDenied => "permission_denied",
            Self::NotFound => "not_found",
            Self::RequestTooLarge => "request_too_large",
            Self::RateLimited => "rate_limited",
            Self::QuotaExhausted => "quota_exhausted",
            Self::ServerError => "server_error",
            Self::Overloaded => "overloaded",
            Self::Timeout => "timeout",
            Self::Unknown => "unknown",
        }
    }

    /// Returns the category: `"client"`, `"rate"`, `"server"`, or `"unknown"`.
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidRequest
            | Self::Authentication
            | Self::PermissionDenied
            | Self::NotFound
            | Self::RequestTooLarge => "client",
            Self::RateLimited | Self::QuotaExhausted => "rate",
            Self::ServerError | Self::Overloaded | Self::Timeout => "server",
            Self::Unknown => "unknown",
        }
    }

    /// Maps a provider error `type`/`code` string to a standard code.
    ///
    /// Covers the Anthropic (`rate_limit_error`, `overloaded_error`, ...) and
    /// OpenAI (`rate_limit_exceeded`, `context_length_exceeded`, ...) vocabularies.
    pub fn from_provider_code(provider_code: &str) -> Option<Self> {
        let code = match provider_code {
            "invalid_request" | "invalid_request_error" => Self::InvalidRequest,
            "authentication" | "invalid_api_key" | "authentication_error" => Self::Authentication,
            "permission_denied" | "permission_error" => Self::PermissionDenied,
            "not_found" | "not_found_error" | "model_not_found" => Self::NotFound,
            "request_too_large" | "context_length_exceeded" | "string_above_max_length" => {
                Self::RequestTooLarge
            }
            "rate_limited" | "rate_limit_exceeded" | "rate_limit_error" => Self::RateLimited,
            "quota_exhausted" | "insufficient_quota" => Self::QuotaExhausted,
            "server_error" | "api_error" => Self::ServerError,
            "overloaded" | "overloaded_error" => Self::Overloaded,
            "timeout" => Self::Timeout,
            _ => return None,
        };
        Some(code)
    }

    /// Maps an HTTP status code to the most likely standard code.
    pub fn from_http_status(status: u16) -> Self {
        match status {
            400 => Self::InvalidRequest,
            401 => Self::Authentication,
            403 => Self::PermissionDenied,
            404 => Self::NotFound,
            408 => Self::Timeout,
            413 => Self::RequestTooLarge,
            429 => Self::RateLimited,
            500 => Self::ServerError,
            503 => Self::Overloaded,
            504 => Self::Timeout,
            529 => Self::Overloaded, // Anthropic overloaded
            _ => Self::Unknown,
        }
    }

    /// Classify a failed response.
    ///
    /// The status decides first; a 400 is refined by the provider code and by
    /// the message text, since providers report token-limit violations as plain
    /// bad requests.
    pub fn classify(status: u16, provider_code: Option<&str>, message: &str) -> Self {
        let by_status = Self::from_http_status(status);
        if by_status != Self::InvalidRequest {
            return by_status;
        }
        if let Some(code) = provider_code.and_then(Self::from_provider_code) {
            if code == Self::RequestTooLarge {
                return code;
            }
        }
        if mentions_token_limit(message) {
            return Self::RequestTooLarge;
        }
        by_status
    }

    /// Convert into the library error surfaced to callers.
    pub fn into_error(self, status: u16, message: String) -> Error {
        match self {
            Self::RateLimited => Error::RateLimited(message),
            Self::RequestTooLarge => Error::TokenLimitExceeded(message),
            _ => Error::UpstreamApi { status, message },
        }
    }
}

fn mentions_token_limit(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("token limit")
        || lower.contains("maximum context length")
        || lower.contains("context window")
        || lower.contains("too many tokens")
}

impl fmt::Display for StandardErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
