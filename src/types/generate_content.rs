use serde::{Deserialize, Serialize};

use crate::types::{Content, ThinkingConfig};

/// Generation parameters sent with every request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Reasoning configuration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thinking_config: Option<ThinkingConfig>,

    /// Sampling temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Upper bound on the number of tokens in the reply.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
}

impl GenerationConfig {
    /// Sets the thinking configuration.
    pub fn with_thinking(mut self, thinking: ThinkingConfig) -> Self {
        self.thinking_config = Some(thinking);
        self
    }

    /// Returns true when no field is set.
    pub fn is_empty(&self) -> bool {
        self.thinking_config.is_none()
            && self.temperature.is_none()
            && self.max_output_tokens.is_none()
    }
}

/// Body of a `models/{model}:generateContent` request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    /// The conversation so far, ending with the new user content.
    pub contents: Vec<Content>,

    /// System instruction steering the model.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,

    /// Generation parameters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

impl GenerateContentRequest {
    /// Create a request for the given contents.
    pub fn new(contents: Vec<Content>) -> Self {
        Self {
            contents,
            system_instruction: None,
            generation_config: None,
        }
    }

    /// Sets the system instruction.
    pub fn with_system_instruction(mut self, instruction: Content) -> Self {
        self.system_instruction = Some(instruction);
        self
    }

    /// Sets the generation config, dropping it if it is empty.
    pub fn with_generation_config(mut self, config: GenerationConfig) -> Self {
        self.generation_config = if config.is_empty() {
            None
        } else {
            Some(config)
        };
        self
    }
}

/// One candidate reply.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// The generated content, absent when the candidate was blocked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,

    /// Why generation stopped (`STOP`, `MAX_TOKENS`, `SAFETY`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

/// Feedback on the prompt itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    /// Set when the prompt was blocked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_reason: Option<String>,
}

/// Token accounting for a single request.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    /// Tokens in the prompt (history, system instruction and new content).
    #[serde(default)]
    pub prompt_token_count: u64,

    /// Tokens across all candidates.
    #[serde(default)]
    pub candidates_token_count: u64,

    /// Tokens spent thinking.
    #[serde(default)]
    pub thoughts_token_count: u64,

    /// Total tokens billed.
    #[serde(default)]
    pub total_token_count: u64,
}

impl std::ops::Add for UsageMetadata {
    type Output = UsageMetadata;

    fn add(self, rhs: UsageMetadata) -> UsageMetadata {
        UsageMetadata {
            prompt_token_count: self.prompt_token_count + rhs.prompt_token_count,
            candidates_token_count: self.candidates_token_count + rhs.candidates_token_count,
            thoughts_token_count: self.thoughts_token_count + rhs.thoughts_token_count,
            total_token_count: self.total_token_count + rhs.total_token_count,
        }
    }
}

/// Response of a `generateContent` request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    /// Candidate replies; the first is the one shown to the user.
    #[serde(default)]
    pub candidates: Vec<Candidate>,

    /// Feedback on the prompt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_feedback: Option<PromptFeedback>,

    /// Token accounting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_metadata: Option<UsageMetadata>,

    /// Exact model version that served the request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_version: Option<String>,
}

impl GenerateContentResponse {
    /// Create a response holding a single model reply with the given text.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            candidates: vec![Candidate {
                content: Some(Content::model(vec![crate::types::Part::text(text)])),
                finish_reason: Some("STOP".to_string()),
            }],
            ..Self::default()
        }
    }

    /// The content of the first candidate, if any.
    pub fn first_content(&self) -> Option<&Content> {
        self.candidates.first().and_then(|c| c.content.as_ref())
    }

    /// Concatenated answer text of the first candidate, or `None` if there is none.
    pub fn text(&self) -> Option<String> {
        self.first_content().and_then(Content::text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Part;
    use serde_json::{json, to_value};

    #[test]
    fn request_serialization() {
        let request = GenerateContentRequest::new(vec![Content::user(vec![Part::text("hi")])])
            .with_system_instruction(Content::system("be kind"))
            .with_generation_config(
                GenerationConfig::default().with_thinking(ThinkingConfig::with_budget(10240)),
            );
        assert_eq!(
            to_value(&request).unwrap(),
            json!({
                "contents": [{ "role": "user", "parts": [{ "text": "hi" }] }],
                "systemInstruction": { "parts": [{ "text": "be kind" }] },
                "generationConfig": { "thinkingConfig": { "thinkingBudget": 10240 } }
            })
        );
    }

    #[test]
    fn empty_generation_config_is_omitted() {
        let request = GenerateContentRequest::new(vec![])
            .with_generation_config(GenerationConfig::default());
        assert_eq!(to_value(&request).unwrap(), json!({ "contents": [] }));
    }

    #[test]
    fn response_deserialization() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        { "text": "pondering", "thought": true },
                        { "text": "**Analisis Gejala**" }
                    ]
                },
                "finishReason": "STOP",
                "index": 0
            }],
            "usageMetadata": {
                "promptTokenCount": 12,
                "candidatesTokenCount": 5,
                "thoughtsTokenCount": 40,
                "totalTokenCount": 57
            },
            "modelVersion": "gemini-3-pro-preview"
        }))
        .unwrap();
        assert_eq!(response.text(), Some("**Analisis Gejala**".to_string()));
        let usage = response.usage_metadata.unwrap();
        assert_eq!(usage.prompt_token_count, 12);
        assert_eq!(usage.total_token_count, 57);
    }

    #[test]
    fn blocked_response_has_no_text() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "promptFeedback": { "blockReason": "SAFETY" }
        }))
        .unwrap();
        assert!(response.candidates.is_empty());
        assert_eq!(response.text(), None);
        assert_eq!(
            response.prompt_feedback.and_then(|f| f.block_reason),
            Some("SAFETY".to_string())
        );
    }

    #[test]
    fn usage_addition() {
        let a = UsageMetadata {
            prompt_token_count: 1,
            candidates_token_count: 2,
            thoughts_token_count: 3,
            total_token_count: 6,
        };
        let sum = a + a;
        assert_eq!(sum.total_token_count, 12);
        assert_eq!(sum.thoughts_token_count, 6);
    }
}
