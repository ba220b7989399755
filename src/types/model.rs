use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Represents a Gemini model identifier.
///
/// This can be a predefined model version or a custom string value
/// for models that may be added in the future.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Model {
    /// Known model versions
    Known(KnownModel),

    /// Custom model identifier (for future or tuned models)
    Custom(String),
}

/// Known Gemini model versions
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KnownModel {
    /// Gemini 3 Pro (preview)
    #[serde(rename = "gemini-3-pro-preview")]
    Gemini3ProPreview,

    /// Gemini 2.5 Pro
    #[serde(rename = "gemini-2.5-pro")]
    Gemini25Pro,

    /// Gemini 2.5 Flash
    #[serde(rename = "gemini-2.5-flash")]
    Gemini25Flash,

    /// Gemini 2.5 Flash-Lite
    #[serde(rename = "gemini-2.5-flash-lite")]
    Gemini25FlashLite,
}

impl KnownModel {
    /// All known models, in order of preference.
    pub const ALL: [KnownModel; 4] = [
        KnownModel::Gemini3ProPreview,
        KnownModel::Gemini25Pro,
        KnownModel::Gemini25Flash,
        KnownModel::Gemini25FlashLite,
    ];

    /// The wire identifier of this model.
    pub fn as_str(&self) -> &'static str {
        match self {
            KnownModel::Gemini3ProPreview => "gemini-3-pro-preview",
            KnownModel::Gemini25Pro => "gemini-2.5-pro",
            KnownModel::Gemini25Flash => "gemini-2.5-flash",
            KnownModel::Gemini25FlashLite => "gemini-2.5-flash-lite",
        }
    }
}

impl Default for Model {
    fn default() -> Self {
        Model::Known(KnownModel::Gemini3ProPreview)
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Model::Known(known_model) => write!(f, "{}", known_model),
            Model::Custom(custom) => write!(f, "{}", custom),
        }
    }
}

impl fmt::Display for KnownModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Model {
    type Err = Infallible;

    /// Parse a model identifier, accepting an optional `models/` prefix.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let bare = s.strip_prefix("models/").unwrap_or(s);
        Ok(KnownModel::ALL
            .iter()
            .find(|known| known.as_str() == bare)
            .cloned()
            .map(Model::Known)
            .unwrap_or_else(|| Model::Custom(bare.to_string())))
    }
}

impl From<KnownModel> for Model {
    fn from(model: KnownModel) -> Self {
        Model::Known(model)
    }
}

impl From<String> for Model {
    fn from(model: String) -> Self {
        Model::Custom(model)
    }
}

impl From<&str> for Model {
    fn from(model: &str) -> Self {
        Model::Custom(model.to_string())
    }
}
