use std::path::PathBuf;
use thiserror::Error;

/// Structured error context for better error handling and debugging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// Field path or configuration key that caused the error (e.g., "settings.cache_ttl")
    pub field_path: Option<String>,
    /// Additional context about the error (e.g., expected type, actual value)
    pub details: Option<String>,
    /// Source of the error (e.g., "settings", "model_selector")
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self {
            field_path: None,
            details: None,
            source: None,
        }
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Unified error type for the library.
///
/// A corrupt cache entry is not an error: it is reported as
/// [`MissReason::Corrupt`](crate::cache::MissReason::Corrupt) and never surfaces here.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Cache storage failure at {}: {source}", .path.display())]
    CacheStorage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unknown model: {0}")]
    UnknownModel(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("Token limit exceeded: {0}")]
    TokenLimitExceeded(String),

    #[error("Upstream API error: HTTP {status}: {message}")]
    UpstreamApi { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("Malformed upstream response: {0}")]
    MalformedResponse(String),

    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    #[error("Validation error: {message}{}", format_context(.context))]
    Validation {
        message: String,
        context: ErrorContext,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

// Helper function to format error context for display
fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

impl Error {
    /// Wrap an I/O failure on a cache path.
    pub fn cache_storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::CacheStorage {
            path: path.into(),
            source,
        }
    }

    /// Create a new validation error with structured context
    pub fn validation_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Validation {
            message: msg.into(),
            context,
        }
    }

    /// Create a new configuration error with structured context
    pub fn configuration_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    /// Extract error context if available
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Configuration { context, .. } | Error::Validation { context, .. } => {
                Some(context)
            }
            _ => None,
        }
    }

    /// True for errors raised at the provider boundary.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            Error::RateLimited(_)
                | Error::TokenLimitExceeded(_)
                | Error::UpstreamApi { .. }
                | Error::Network(_)
                | Error::MalformedResponse(_)
        )
    }
}
