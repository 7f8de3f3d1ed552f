//! Built-in model registry.

use super::pricing::{CostEstimate, ModelPricing};
use crate::transport::Provider;
use crate::{Error, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Identifier of a supported model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ModelId {
    #[serde(rename = "gpt-4o")]
    Gpt4o,
    #[serde(rename = "o1-preview")]
    O1Preview,
    #[serde(rename = "claude-3-5-sonnet-20241022")]
    Claude35Sonnet,
}

impl ModelId {
    pub const ALL: [ModelId; 3] = [ModelId::Gpt4o, ModelId::O1Preview, ModelId::Claude35Sonnet];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelId::Gpt4o => "gpt-4o",
            ModelId::O1Preview => "o1-preview",
            ModelId::Claude35Sonnet => "claude-3-5-sonnet-20241022",
        }
    }

    pub fn provider(&self) -> Provider {
        match self {
            ModelId::Gpt4o | ModelId::O1Preview => Provider::OpenAi,
            ModelId::Claude35Sonnet => Provider::Anthropic,
        }
    }

    /// Registry entry for this model.
    pub fn spec(&self) -> &'static ModelSpec {
        ModelCatalog::builtin().get(*self)
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ModelId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| Error::UnknownModel(s.to_string()))
    }
}

/// Static metadata for one model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSpec {
    pub id: ModelId,
    pub provider: Provider,
    /// Upper bound on response tokens.
    pub max_tokens: u32,
    pub context_window: u32,
    pub pricing: ModelPricing,
    pub capabilities: Vec<String>,
    pub typical_latency: Duration,
}

impl ModelSpec {
    fn new(id: ModelId, max_tokens: u32, context_window: u32, pricing: ModelPricing) -> Self {
        Self {
            id,
            provider: id.provider(),
            max_tokens,
            context_window,
            pricing,
            capabilities: Vec::new(),
            typical_latency: Duration::from_secs(2),
        }
    }

    fn with_capabilities(mut self, caps: &[&str]) -> Self {
        self.capabilities = caps.iter().map(|c| c.to_string()).collect();
        self
    }

    fn with_typical_latency(mut self, latency: Duration) -> Self {
        self.typical_latency = latency;
        self
    }

    pub fn supports(&self, capability: &str) -> bool {
        self.capabilities.iter().any(|c| c == capability)
    }

    pub fn calculate_cost(&self, input_tokens: u64, output_tokens: u64) -> CostEstimate {
        let model = self.id.as_str();
        self.pricing.calculate_cost(model, input_tokens, output_tokens)
    }
}

static BUILTIN: Lazy<ModelCatalog> = Lazy::new(|| {
    const CAPS: &[&str] = &["complex_reasoning", "code", "analysis"];
    ModelCatalog {
        models: vec![
            ModelSpec::new(
                ModelId::Gpt4o,
                128_000,
                128_000,
                ModelPricing::new(0.01, 0.03),
            )
            .with_capabilities(CAPS)
            .with_typical_latency(Duration::from_millis(2000)),
            ModelSpec::new(
                ModelId::O1Preview,
                128_000,
                128_000,
                ModelPricing::new(0.01, 0.03),
            )
            .with_capabilities(CAPS)
            .with_typical_latency(Duration::from_millis(1500)),
            ModelSpec::new(
                ModelId::Claude35Sonnet,
                200_000,
                200_000,
                ModelPricing::new(0.015, 0.075),
            )
            .with_capabilities(CAPS)
            .with_typical_latency(Duration::from_millis(3000)),
        ],
    }
});

/// Registry of every [`ModelId`], in declaration order.
#[derive(Debug)]
pub struct ModelCatalog {
    models: Vec<ModelSpec>,
}

impl ModelCatalog {
    pub fn builtin() -> &'static ModelCatalog {
        &BUILTIN
    }

    pub fn get(&self, id: ModelId) -> &ModelSpec {
        // Every ModelId has exactly one entry, in ALL order.
        &self.models[id as usize]
    }

    /// Look up a model by its string identifier.
    pub fn lookup(&self, id: &str) -> Result<&ModelSpec> {
        Ok(self.get(id.parse()?))
    }

    pub fn list(&self) -> &[ModelSpec] {
        &self.models
    }

    /// `(input_tokens/1000) * input_rate + (output_tokens/1000) * output_rate`.
    pub fn calculate_cost(
        &self,
        model: &str,
        input_tokens: u64,
        output_tokens: u64,
    ) -> Result<f64> {
        let estimate = self.estimate(model, input_tokens, output_tokens)?;
        Ok(estimate.total_cost)
    }

    pub fn estimate(
        &self,
        model: &str,
        input_tokens: u64,
        output_tokens: u64,
    ) -> Result<CostEstimate> {
        let spec = self.lookup(model)?;
        Ok(spec.calculate_cost(input_tokens, output_tokens))
    }

    pub fn largest_context(&self) -> &ModelSpec {
        self.models
            .iter()
            .max_by_key(|m| m.context_window)
            .unwrap_or(&self.models[0])
    }
}

/// Cost of a run against the built-in catalog. Fails with
/// [`Error::UnknownModel`] for unregistered identifiers.
pub fn calculate_cost(model: &str, input_tokens: u64, output_tokens: u64) -> Result<f64> {
    ModelCatalog::builtin().calculate_cost(model, input_tokens, output_tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_order_matches_model_ids() {
        let catalog = ModelCatalog::builtin();
        for id in ModelId::ALL {
            assert_eq!(catalog.get(id).id, id);
        }
    }

    #[test]
    fn ids_round_trip_through_strings() {
        for id in ModelId::ALL {
            assert_eq!(id.as_str().parse::<ModelId>().unwrap(), id);
            assert_eq!(serde_json::to_value(id).unwrap(), id.as_str());
        }
    }
}
