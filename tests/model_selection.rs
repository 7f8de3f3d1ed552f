//! Selector decision list.

use llm_api_interface::models::{
    select_model, ModelCatalog, ModelId, ModelSelector, SelectionRequest,
};

#[test]
fn reference_scenarios() {
    assert_eq!(
        select_model("analysis", 1000, "balanced", Some(0.1)),
        ModelId::O1Preview
    );
    assert_eq!(
        select_model("analysis", 1000, "balanced", Some(0.01)),
        ModelId::Gpt4o
    );
    assert_eq!(
        select_model("chat", 150_000, "balanced", None),
        ModelCatalog::builtin().largest_context().id
    );
    assert_eq!(select_model("code", 1000, "balanced", None), ModelId::Gpt4o);
}

#[test]
fn budget_rules_come_first() {
    // Tight budgets win over the task type and input length.
    assert_eq!(
        select_model("cot", 500_000, "balanced", Some(0.0)),
        ModelId::Gpt4o
    );
    assert_eq!(
        select_model("creative", 10, "speed", Some(0.03)),
        ModelSelector::MID_TIER
    );
    // 0.02 and 0.05 are not "below" their thresholds.
    assert_eq!(
        select_model("code", 10, "balanced", Some(0.02)),
        ModelSelector::MID_TIER
    );
    assert_eq!(
        select_model("code", 10, "balanced", Some(0.05)),
        ModelId::Gpt4o
    );
}

#[test]
fn reasoning_tasks_beat_long_inputs() {
    for task in ["cot", "complex_reasoning", "analysis"] {
        assert_eq!(
            select_model(task, 200_000, "speed", None),
            ModelId::O1Preview
        );
        assert_eq!(
            select_model(task, 10, "balanced", Some(1.0)),
            ModelId::O1Preview
        );
    }
}

#[test]
fn input_length_threshold_is_exclusive() {
    assert_eq!(
        select_model("chat", 100_000, "balanced", None),
        ModelId::Gpt4o
    );
    assert_eq!(
        select_model("chat", 100_001, "balanced", None),
        ModelId::Claude35Sonnet
    );
    // Long input beats the code and creative rules.
    assert_eq!(
        select_model("code", 100_001, "balanced", None),
        ModelId::Claude35Sonnet
    );
}

#[test]
fn creative_and_fallback_rules() {
    assert_eq!(
        select_model("creative", 1000, "speed", None),
        ModelId::Claude35Sonnet
    );
    assert_eq!(
        select_model("writing", 1000, "balanced", None),
        ModelId::Claude35Sonnet
    );
    assert_eq!(select_model("chat", 1000, "speed", None), ModelId::Gpt4o);
    assert_eq!(select_model("", 0, "", None), ModelSelector::DEFAULT);
}

#[test]
fn non_finite_budget_falls_back_to_default() {
    let request = SelectionRequest::new("analysis", 1000).with_budget(f64::NAN);
    assert!(ModelSelector::try_select(&request).is_err());
    assert_eq!(ModelSelector::select(&request), ModelSelector::DEFAULT);
    assert_eq!(
        select_model("cot", 10, "balanced", Some(f64::INFINITY)),
        ModelSelector::DEFAULT
    );
}
