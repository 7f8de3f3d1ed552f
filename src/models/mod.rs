//! Model registry, cost estimation and selection.
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`ModelId`] | Closed set of supported models |
//! | [`ModelCatalog`] | Static metadata: limits, pricing, capabilities, latency |
//! | [`ModelPricing`] / [`CostEstimate`] | Per-1000-token rates and cost breakdowns |
//! | [`ModelSelector`] | Ordered heuristic mapping a task to a model |
//! | [`UsageTracker`] | Running token and cost totals per model |
//!
//! ## Example
//!
//! ```rust
//! use llm_api_interface::models::{calculate_cost, select_model, ModelId};
//!
//! let model = select_model("analysis", 1000, "balanced", Some(0.1));
//! assert_eq!(model, ModelId::O1Preview);
//!
//! let cost = calculate_cost("gpt-4o", 1000, 500).unwrap();
//! assert!((cost - 0.025).abs() < 1e-12);
//! ```

mod catalog;
mod pricing;
mod selector;
mod usage;

pub use catalog::{calculate_cost, ModelCatalog, ModelId, ModelSpec};
pub use pricing::{CostEstimate, ModelPricing};
pub use selector::{select_model, ModelSelector, Priority, SelectionRequest, TaskType};
pub use usage::{UsageMetrics, UsageTracker};
