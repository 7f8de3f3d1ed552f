//! Runtime settings.
//!
//! Settings come from built-in defaults, optionally a YAML file, and then the
//! process environment (environment wins). Recognized variables:
//!
//! | Variable | Field | Default |
//! |----------|-------|---------|
//! | `ANTHROPIC_API_KEY` | `anthropic_api_key` | unset |
//! | `OPENAI_API_KEY` | `openai_api_key` | unset |
//! | `ANTHROPIC_BASE_URL` | `anthropic_base_url` | Anthropic messages endpoint |
//! | `OPENAI_BASE_URL` | `openai_base_url` | OpenAI chat completions endpoint |
//! | `CACHE_DIR` | `cache_dir` | `.cache` |
//! | `CACHE_ENABLED` | `cache_enabled` | `true` |
//! | `CACHE_TTL` | `cache_ttl_secs` | `3600` |
//! | `API_TIMEOUT` | `api_timeout_secs` | `30` |
//! | `LOG_LEVEL` | `log_level` | `info` |
//! | `DEBUG` | `debug` | `false` |

use crate::cache::CacheConfig;
use crate::transport::Provider;
use crate::{Error, ErrorContext, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub project_name: String,
    pub debug: bool,
    pub anthropic_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub anthropic_base_url: String,
    pub openai_base_url: String,
    pub cache_dir: PathBuf,
    pub cache_enabled: bool,
    pub cache_ttl_secs: u64,
    pub api_timeout_secs: u64,
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            project_name: "llm-api-interface".to_string(),
            debug: false,
            anthropic_api_key: None,
            openai_api_key: None,
            anthropic_base_url: Provider::Anthropic.default_endpoint().to_string(),
            openai_base_url: Provider::OpenAi.default_endpoint().to_string(),
            cache_dir: PathBuf::from(".cache"),
            cache_enabled: true,
            cache_ttl_secs: 3600,
            api_timeout_secs: 30,
            log_level: "info".to_string(),
        }
    }
}

impl Settings {
    /// Defaults overlaid with the process environment.
    pub fn from_env() -> Result<Self> {
        let mut settings = Self::default();
        settings.apply_overrides(|name| std::env::var(name).ok())?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::configuration_with_context(
                format!("failed to read settings file: {}", e),
                ErrorContext::new().with_source(path.display().to_string()),
            )
        })?;
        serde_yaml::from_str(&content).map_err(|e| {
            Error::configuration_with_context(
                format!("invalid settings file: {}", e),
                ErrorContext::new().with_source(path.display().to_string()),
            )
        })
    }

    /// File (if given) overlaid with the process environment, then validated.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = match path {
            Some(p) => Self::from_yaml_file(p)?,
            None => Self::default(),
        };
        settings.apply_overrides(|name| std::env::var(name).ok())?;
        settings.validate()?;
        Ok(settings)
    }

    /// Overlay values from `lookup` (usually the environment). Empty values
    /// are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("ANTHROPIC_API_KEY") {
            self.anthropic_api_key = Some(v);
        }
        if let Some(v) = get("OPENAI_API_KEY") {
            self.openai_api_key = Some(v);
        }
        if let Some(v) = get("ANTHROPIC_BASE_URL") {
            self.anthropic_base_url = v;
        }
        if let Some(v) = get("OPENAI_BASE_URL") {
            self.openai_base_url = v;
        }
        if let Some(v) = get("CACHE_DIR") {
            self.cache_dir = PathBuf::from(v);
        }
        if let Some(v) = get("CACHE_ENABLED") {
            self.cache_enabled = parse_bool("CACHE_ENABLED", &v)?;
        }
        if let Some(v) = get("CACHE_TTL") {
            self.cache_ttl_secs = parse_number("CACHE_TTL", &v)?;
        }
        if let Some(v) = get("API_TIMEOUT") {
            self.api_timeout_secs = parse_number("API_TIMEOUT", &v)?;
        }
        if let Some(v) = get("LOG_LEVEL") {
            self.log_level = v.trim().to_ascii_lowercase();
        }
        if let Some(v) = get("DEBUG") {
            self.debug = parse_bool("DEBUG", &v)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("anthropic_base_url", &self.anthropic_base_url),
            ("openai_base_url", &self.openai_base_url),
        ] {
            let url = Url::parse(value).map_err(|e| {
                Error::configuration_with_context(
                    format!("invalid URL `{}`: {}", value, e),
                    ErrorContext::new().with_field_path(field),
                )
            })?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(Error::configuration_with_context(
                    format!("unsupported URL scheme `{}`", url.scheme()),
                    ErrorContext::new().with_field_path(field),
                ));
            }
        }
        if self.api_timeout_secs == 0 {
            return Err(Error::configuration_with_context(
                "timeout must be at least one second",
                ErrorContext::new().with_field_path("api_timeout_secs"),
            ));
        }
        if !matches!(
            self.log_level.as_str(),
            "trace" | "debug" | "info" | "warn" | "error" | "off"
        ) {
            return Err(Error::configuration_with_context(
                format!("unknown log level `{}`", self.log_level),
                ErrorContext::new().with_field_path("log_level"),
            ));
        }
        Ok(())
    }

    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig::new()
            .with_enabled(self.cache_enabled)
            .with_ttl(Duration::from_secs(self.cache_ttl_secs))
            .with_directory(self.cache_dir.clone())
    }

    pub fn api_timeout(&self) -> Duration {
        Duration::from_secs(self.api_timeout_secs)
    }

    /// Filter directive for `tracing_subscriber::EnvFilter`; `debug` forces
    /// debug level.
    pub fn log_filter(&self) -> &str {
        if self.debug {
            "debug"
        } else {
            &self.log_level
        }
    }
}

fn parse_bool(var: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(Error::configuration_with_context(
            format!("expected a boolean, got `{}`", other),
            ErrorContext::new().with_field_path(var),
        )),
    }
}

fn parse_number<T: FromStr>(var: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        Error::configuration_with_context(
            format!("expected a non-negative integer, got `{}`", value.trim()),
            ErrorContext::new().with_field_path(var),
        )
    })
}
