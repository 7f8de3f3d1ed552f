//! Per-model usage accounting.

use super::catalog::ModelId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::RwLock;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageMetrics {
    pub total_input_tokens: u64,
    pub total_output_tokens: u64,
    pub total_cost: f64,
    pub calls: u64,
}

/// Running totals of tokens, cost and calls per model.
#[derive(Debug, Default)]
pub struct UsageTracker {
    metrics: RwLock<BTreeMap<ModelId, UsageMetrics>>,
}

impl UsageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one call and return its cost.
    pub fn log_usage(&self, model: ModelId, input_tokens: u64, output_tokens: u64) -> f64 {
        let cost = model
            .spec()
            .calculate_cost(input_tokens, output_tokens)
            .total_cost;
        let mut metrics = self.metrics.write().unwrap_or_else(|e| e.into_inner());
        let entry = metrics.entry(model).or_default();
        entry.total_input_tokens += input_tokens;
        entry.total_output_tokens += output_tokens;
        entry.total_cost += cost;
        entry.calls += 1;
        cost
    }

    pub fn get(&self, model: ModelId) -> Option<UsageMetrics> {
        self.metrics
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&model)
            .cloned()
    }

    /// Snapshot of all models seen so far.
    pub fn metrics(&self) -> BTreeMap<ModelId, UsageMetrics> {
        self.metrics
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn total_cost(&self) -> f64 {
        self.metrics
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .map(|m| m.total_cost)
            .sum()
    }
}
