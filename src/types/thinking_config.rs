use serde::{Deserialize, Serialize};

/// Configuration for the model's internal reasoning ("thinking").
///
/// The budget is expressed in tokens.  A budget of `0` disables thinking and
/// `-1` lets the model decide how much to think.
#[derive(Debug, Copy, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ThinkingConfig {
    /// Number of tokens the model may spend reasoning before it answers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thinking_budget: Option<i32>,

    /// Whether thought summaries are returned alongside the answer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_thoughts: Option<bool>,
}

impl ThinkingConfig {
    /// Create a thinking configuration with the given token budget.
    pub fn with_budget(budget: u32) -> Self {
        Self {
            thinking_budget: Some(i32::try_from(budget).unwrap_or(i32::MAX)),
            include_thoughts: None,
        }
    }

    /// Create a configuration that disables thinking.
    pub fn disabled() -> Self {
        Self {
            thinking_budget: Some(0),
            include_thoughts: None,
        }
    }

    /// Create a configuration that lets the model size its own budget.
    pub fn dynamic() -> Self {
        Self {
            thinking_budget: Some(-1),
            include_thoughts: None,
        }
    }

    /// Returns the number of budget tokens configured for thinking.
    ///
    /// Returns 0 if thinking is disabled or dynamic.
    pub fn num_tokens(&self) -> u32 {
        self.thinking_budget
            .and_then(|budget| u32::try_from(budget).ok())
            .unwrap_or(0)
    }
}
