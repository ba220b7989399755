//! Configuration types for the chat application.
//!
//! This module provides CLI argument parsing via `arrrg` and configuration
//! structures for controlling chat behavior.

use std::time::Duration;

use arrrg_derive::CommandLine;

use crate::client::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use crate::session::DEFAULT_THINKING_BUDGET;
use crate::specialist::{self, Specialist};
use crate::types::{Model, ThinkingConfig};

/// Command-line arguments for the asclepius-chat tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Model to use for chat.
    #[arrrg(optional, "Model to use (default: gemini-3-pro-preview)", "MODEL")]
    pub model: Option<String>,

    /// Specialist to consult first.
    #[arrrg(optional, "Specialist id to start with (default: general)", "ID")]
    pub specialist: Option<String>,

    /// Thinking budget in tokens.
    #[arrrg(optional, "Thinking budget in tokens; 0 disables (default: 10240)", "TOKENS")]
    pub thinking_budget: Option<u32>,

    /// API key; overrides the environment.
    #[arrrg(optional, "API key (default: $GEMINI_API_KEY or $API_KEY)", "KEY")]
    pub api_key: Option<String>,

    /// Base URL of the API.
    #[arrrg(optional, "API base URL", "URL")]
    pub base_url: Option<String>,

    /// Request timeout in seconds.
    #[arrrg(optional, "Request timeout in seconds (default: 120)", "SECONDS")]
    pub timeout: Option<u64>,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,
}

/// Configuration for a chat session.
///
/// This struct holds the resolved configuration values after processing
/// command-line arguments with appropriate defaults.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// The model conversations are started with.
    pub model: Model,

    /// The specialist selected at start.
    pub specialist: &'static Specialist,

    /// Thinking budget sent with every conversation.
    pub thinking_budget: u32,

    /// Explicit API key; `None` falls back to the environment.
    pub api_key: Option<String>,

    /// Base URL of the API.
    pub base_url: String,

    /// Request timeout.
    pub timeout: Duration,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,
}

impl ChatConfig {
    /// Creates a new ChatConfig with default values.
    ///
    /// Defaults:
    /// - Model: gemini-3-pro-preview
    /// - Specialist: general
    /// - Thinking budget: 10240 tokens
    /// - Color: enabled
    pub fn new() -> Self {
        Self {
            model: Model::default(),
            specialist: specialist::default_specialist(),
            thinking_budget: DEFAULT_THINKING_BUDGET,
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            use_color: true,
        }
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: Model) -> Self {
        self.model = model;
        self
    }

    /// Sets the starting specialist.
    pub fn with_specialist(mut self, specialist: &'static Specialist) -> Self {
        self.specialist = specialist;
        self
    }

    /// Sets the thinking budget.  Zero disables thinking.
    pub fn with_thinking_budget(mut self, budget: u32) -> Self {
        self.thinking_budget = budget;
        self
    }

    /// Sets the API key.
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }

    /// The thinking configuration sent with every conversation.
    pub fn thinking(&self) -> ThinkingConfig {
        if self.thinking_budget == 0 {
            ThinkingConfig::disabled()
        } else {
            ThinkingConfig::with_budget(self.thinking_budget)
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl TryFrom<ChatArgs> for ChatConfig {
    type Error = String;

    fn try_from(args: ChatArgs) -> Result<Self, Self::Error> {
        let mut config = ChatConfig::new();
        if let Some(model) = args.model {
            config.model = model.parse().unwrap_or(Model::Custom(model));
        }
        if let Some(id) = args.specialist {
            config.specialist =
                specialist::find(&id).ok_or_else(|| format!("unknown specialist: {id}"))?;
        }
        if let Some(budget) = args.thinking_budget {
            config.thinking_budget = budget;
        }
        if let Some(base_url) = args.base_url {
            config.base_url = base_url;
        }
        if let Some(timeout) = args.timeout {
            if timeout == 0 {
                return Err("--timeout must be positive".to_string());
            }
            config.timeout = Duration::from_secs(timeout);
        }
        config.api_key = args.api_key;
        config.use_color = !args.no_color;
        Ok(config)
    }
}
