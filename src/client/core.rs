use crate::cache::{CacheLookup, CacheStore};
use crate::config::Settings;
use crate::models::{ModelId, UsageTracker};
use crate::transport::{HttpTransportBuilder, Transport};
use crate::types::{GenerationOptions, Message, StreamEvent};
use crate::{BoxStream, Result};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

/// A response plus where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub model: ModelId,
    pub response: Value,
    pub cached: bool,
}

impl Completion {
    /// Completion text in the provider's response shape.
    pub fn text(&self) -> Result<String> {
        self.model.provider().extract_text(&self.response)
    }
}

pub struct CachedClient {
    transport: Arc<dyn Transport>,
    cache: CacheStore,
    usage: UsageTracker,
}

impl CachedClient {
    pub fn new(transport: Arc<dyn Transport>, cache: CacheStore) -> Self {
        Self {
            transport,
            cache,
            usage: UsageTracker::new(),
        }
    }

    /// HTTP transport and file cache, both configured from `settings`.
    pub async fn from_settings(settings: &Settings) -> Result<Self> {
        let transport = HttpTransportBuilder::from_settings(settings).build()?;
        let cache = CacheStore::open(settings.cache_config()).await?;
        Ok(Self::new(Arc::new(transport), cache))
    }

    /// Serve from cache when possible, otherwise call the provider and cache
    /// the response. Generation options do not take part in the cache key.
    pub async fn complete(
        &self,
        model: ModelId,
        messages: &[Message],
        options: &GenerationOptions,
    ) -> Result<Completion> {
        let lookup = self.cache.get(model.as_str(), messages).await?;
        if let CacheLookup::Hit(response) = lookup {
            return Ok(Completion {
                model,
                response,
                cached: true,
            });
        }

        let response = self.transport.send(model, messages, options).await?;
        self.cache.set(model.as_str(), messages, &response).await?;

        if let Some((input, output)) = model.provider().usage(&response) {
            let cost = self.usage.log_usage(model, input, output);
            info!(%model, input_tokens = input, output_tokens = output, cost, "provider call");
        } else {
            debug!(%model, "response carried no usage block");
        }

        Ok(Completion {
            model,
            response,
            cached: false,
        })
    }

    pub async fn complete_text(
        &self,
        model: ModelId,
        messages: &[Message],
        options: &GenerationOptions,
    ) -> Result<String> {
        self.complete(model, messages, options).await?.text()
    }

    pub async fn stream(
        &self,
        model: ModelId,
        messages: &[Message],
        options: &GenerationOptions,
    ) -> Result<BoxStream<'static, StreamEvent>> {
        self.transport.send_stream(model, messages, options).await
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    pub fn usage(&self) -> &UsageTracker {
        &self.usage
    }
}
