//! Heuristic model selection.
//!
//! Pure logic: no network calls, no state. The rules form an ordered decision
//! list and the first matching rule wins.
//!
//! **Fallback policy:** [`ModelSelector::select`] never fails. If the inputs
//! cannot be evaluated (for example a NaN budget), it logs a warning and
//! returns [`ModelSelector::DEFAULT`]. Callers that want to see the error use
//! [`ModelSelector::try_select`].

use super::catalog::ModelId;
use crate::{Error, ErrorContext, Result};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::str::FromStr;
use tracing::{debug, warn};

/// Kind of work the caller wants done.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskType {
    Cot,
    ComplexReasoning,
    Analysis,
    Code,
    Creative,
    Writing,
    Other(String),
}

impl TaskType {
    /// Tasks that need extended deliberation.
    pub fn is_reasoning(&self) -> bool {
        matches!(self, TaskType::Cot | TaskType::ComplexReasoning | TaskType::Analysis)
    }

    pub fn is_creative(&self) -> bool {
        matches!(self, TaskType::Creative | TaskType::Writing)
    }
}

impl From<&str> for TaskType {
    fn from(s: &str) -> Self {
        match s {
            "cot" => TaskType::Cot,
            "complex_reasoning" => TaskType::ComplexReasoning,
            "analysis" => TaskType::Analysis,
            "code" => TaskType::Code,
            "creative" => TaskType::Creative,
            "writing" => TaskType::Writing,
            other => TaskType::Other(other.to_string()),
        }
    }
}

impl FromStr for TaskType {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Infallible> {
        Ok(Self::from(s))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Priority {
    Speed,
    #[default]
    Balanced,
    Other(String),
}

impl From<&str> for Priority {
    fn from(s: &str) -> Self {
        match s {
            "speed" => Priority::Speed,
            "balanced" => Priority::Balanced,
            other => Priority::Other(other.to_string()),
        }
    }
}

impl FromStr for Priority {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Infallible> {
        Ok(Self::from(s))
    }
}

/// Inputs to a selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionRequest {
    pub task_type: TaskType,
    /// Input size, in the caller's unit (characters or tokens).
    pub input_length: usize,
    pub priority: Priority,
    /// Spend ceiling for the request, in USD.
    pub budget: Option<f64>,
}

impl SelectionRequest {
    pub fn new(task_type: &str, input_length: usize) -> Self {
        Self {
            task_type: TaskType::from(task_type),
            input_length,
            priority: Priority::default(),
            budget: None,
        }
    }

    pub fn with_priority(mut self, priority: &str) -> Self {
        self.priority = Priority::from(priority);
        self
    }

    pub fn with_budget(mut self, budget: f64) -> Self {
        self.budget = Some(budget);
        self
    }
}

pub struct ModelSelector;

impl ModelSelector {
    /// Cheapest fast model; also the general-purpose default.
    pub const FAST_GENERAL: ModelId = ModelId::Gpt4o;
    pub const MID_TIER: ModelId = ModelId::Claude35Sonnet;
    pub const REASONING: ModelId = ModelId::O1Preview;
    pub const LARGE_CONTEXT: ModelId = ModelId::Claude35Sonnet;
    pub const CREATIVE: ModelId = ModelId::Claude35Sonnet;
    pub const DEFAULT: ModelId = Self::FAST_GENERAL;

    /// Inputs above this length go to the largest context window.
    pub const LONG_INPUT_THRESHOLD: usize = 100_000;
    pub const LOW_BUDGET: f64 = 0.02;
    pub const MEDIUM_BUDGET: f64 = 0.05;

    /// Best-effort selection; see the module docs for the fallback policy.
    pub fn select(request: &SelectionRequest) -> ModelId {
        match Self::try_select(request) {
            Ok(model) => model,
            Err(e) => {
                warn!(error = %e, "model selection failed, using default model");
                Self::DEFAULT
            }
        }
    }

    pub fn try_select(request: &SelectionRequest) -> Result<ModelId> {
        if let Some(budget) = request.budget {
            if !budget.is_finite() {
                return Err(Error::validation_with_context(
                    "budget must be a finite number",
                    ErrorContext::new()
                        .with_field_path("budget")
                        .with_details(budget.to_string())
                        .with_source("model_selector"),
                ));
            }
        }

        let model = Self::evaluate(request);
        debug!(
            task = ?request.task_type,
            input_length = request.input_length,
            priority = ?request.priority,
            budget = ?request.budget,
            %model,
            "selected model"
        );
        Ok(model)
    }

    // Rule order is significant.
    fn evaluate(req: &SelectionRequest) -> ModelId {
        if let Some(budget) = req.budget {
            if budget < Self::LOW_BUDGET {
                return Self::FAST_GENERAL;
            }
            if budget < Self::MEDIUM_BUDGET {
                return Self::MID_TIER;
            }
            if req.task_type.is_reasoning() {
                return Self::REASONING;
            }
        }
        if req.task_type.is_reasoning() {
            return Self::REASONING;
        }
        if req.input_length > Self::LONG_INPUT_THRESHOLD {
            return Self::LARGE_CONTEXT;
        }
        if req.task_type == TaskType::Code {
            return Self::FAST_GENERAL;
        }
        if req.task_type.is_creative() {
            return Self::CREATIVE;
        }
        if req.priority == Priority::Speed {
            return Self::FAST_GENERAL;
        }
        Self::DEFAULT
    }
}

/// Convenience wrapper over [`ModelSelector::select`] taking plain strings.
pub fn select_model(
    task_type: &str,
    input_length: usize,
    priority: &str,
    budget: Option<f64>,
) -> ModelId {
    let mut request = SelectionRequest::new(task_type, input_length).with_priority(priority);
    request.budget = budget;
    ModelSelector::select(&request)
}
