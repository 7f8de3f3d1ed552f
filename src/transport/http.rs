use super::provider::{error_details, Provider};
use super::sse::decode_events;
use super::Transport;
use crate::config::Settings;
use crate::error_code::StandardErrorCode;
use crate::models::ModelId;
use crate::types::{GenerationOptions, Message, StreamEvent};
use crate::{BoxStream, Error, ErrorContext, Result};
use async_trait::async_trait;
use futures::TryStreamExt;
use keyring::Entry;
use serde_json::Value;
use std::collections::HashMap;
use std::env;
use std::time::Duration;
use tracing::{debug, warn};

/// Keyring service under which provider API keys are looked up.
pub const KEYRING_SERVICE: &str = "llm-api-interface";

/// HTTP transport for both providers.
pub struct HttpTransport {
    client: reqwest::Client,
    endpoints: HashMap<Provider, String>,
    api_keys: HashMap<Provider, String>,
}

pub struct HttpTransportBuilder {
    timeout: Duration,
    endpoints: HashMap<Provider, String>,
    api_keys: HashMap<Provider, String>,
}

impl HttpTransportBuilder {
    pub fn new() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            endpoints: HashMap::new(),
            api_keys: HashMap::new(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        let mut builder = Self::new()
            .timeout(settings.api_timeout())
            .endpoint(Provider::Anthropic, &settings.anthropic_base_url)
            .endpoint(Provider::OpenAi, &settings.openai_base_url);
        if let Some(key) = &settings.anthropic_api_key {
            builder = builder.api_key(Provider::Anthropic, key);
        }
        if let Some(key) = &settings.openai_api_key {
            builder = builder.api_key(Provider::OpenAi, key);
        }
        builder
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Full URL requests for `provider` are POSTed to.
    pub fn endpoint(mut self, provider: Provider, url: impl Into<String>) -> Self {
        self.endpoints.insert(provider, url.into());
        self
    }

    pub fn api_key(mut self, provider: Provider, key: impl Into<String>) -> Self {
        let key = key.into();
        if !key.is_empty() {
            self.api_keys.insert(provider, key);
        }
        self
    }

    /// Keys not given explicitly are resolved from the OS keyring, then from
    /// the provider's environment variable. A provider without a key can still
    /// be built; calls to it fail with a configuration error.
    pub fn build(self) -> Result<HttpTransport> {
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| {
                Error::configuration_with_context(
                    format!("failed to build HTTP client: {}", e),
                    ErrorContext::new().with_source("transport"),
                )
            })?;

        let mut api_keys = self.api_keys;
        for provider in Provider::ALL {
            if !api_keys.contains_key(&provider) {
                if let Some(key) = lookup_api_key(provider) {
                    api_keys.insert(provider, key);
                }
            }
        }

        let mut endpoints = self.endpoints;
        for provider in Provider::ALL {
            endpoints
                .entry(provider)
                .or_insert_with(|| provider.default_endpoint().to_string());
        }

        Ok(HttpTransport {
            client,
            endpoints,
            api_keys,
        })
    }
}

impl Default for HttpTransportBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn lookup_api_key(provider: Provider) -> Option<String> {
    // 1. Try Keyring
    if let Ok(entry) = Entry::new(KEYRING_SERVICE, provider.name()) {
        if let Ok(key) = entry.get_password() {
            return Some(key);
        }
    }

    // 2. Try Environment Variable
    env::var(provider.api_key_env())
        .ok()
        .filter(|k| !k.is_empty())
}

impl HttpTransport {
    pub fn builder() -> HttpTransportBuilder {
        HttpTransportBuilder::new()
    }

    pub fn endpoint(&self, provider: Provider) -> &str {
        self.endpoints
            .get(&provider)
            .map(String::as_str)
            .unwrap_or_else(|| provider.default_endpoint())
    }

    async fn post(&self, model: ModelId, body: &Value, stream: bool) -> Result<reqwest::Response> {
        let provider = model.provider();
        let api_key = self.api_keys.get(&provider).ok_or_else(|| {
            Error::configuration_with_context(
                format!("API key not found for provider {}", provider),
                ErrorContext::new()
                    .with_field_path(provider.api_key_env())
                    .with_source("transport"),
            )
        })?;

        let mut req = self
            .client
            .post(self.endpoint(provider))
            .header("content-type", "application/json")
            .json(body);
        for (name, value) in provider.auth_headers(api_key) {
            req = req.header(name, value);
        }
        if stream {
            req = req.header("accept", "text/event-stream");
        }

        debug!(%model, %provider, stream, "sending request");
        let resp = req.send().await.map_err(Error::Network)?;
        check_status(resp).await
    }
}

async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let status = status.as_u16();
    let text = resp.text().await.unwrap_or_default();
    let (code, message) = match serde_json::from_str::<Value>(&text) {
        Ok(body) => error_details(&body),
        Err(_) if text.is_empty() => (None, format!("API returned status code: {}", status)),
        Err(_) => (None, text),
    };
    let class = StandardErrorCode::classify(status, code.as_deref(), &message);
    warn!(
        status,
        code = class.code(),
        class = class.name(),
        "provider returned an error"
    );
    Err(class.into_error(status, message))
}

fn invalid_json(e: serde_json::Error) -> Error {
    Error::MalformedResponse(format!("invalid JSON response: {}", e))
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        model: ModelId,
        messages: &[Message],
        options: &GenerationOptions,
    ) -> Result<Value> {
        let body = model
            .provider()
            .build_body(model.as_str(), messages, options, false);
        let resp = self.post(model, &body, false).await?;
        let bytes = resp.bytes().await.map_err(Error::Network)?;
        serde_json::from_slice(&bytes).map_err(invalid_json)
    }

    async fn send_stream(
        &self,
        model: ModelId,
        messages: &[Message],
        options: &GenerationOptions,
    ) -> Result<BoxStream<'static, StreamEvent>> {
        let provider = model.provider();
        let body = provider.build_body(model.as_str(), messages, options, true);
        let resp = self.post(model, &body, true).await?;
        let bytes = resp.bytes_stream().map_err(Error::Network);
        Ok(decode_events(provider, Box::pin(bytes)))
    }
}
