// Public modules
pub mod content;
pub mod generate_content;
pub mod model;
pub mod thinking_config;

// Re-exports
pub use content::{Blob, Content, Part, Role};
pub use generate_content::{
    Candidate, GenerateContentRequest, GenerateContentResponse, GenerationConfig, PromptFeedback,
    UsageMetadata,
};
pub use model::{KnownModel, Model};
pub use thinking_config::ThinkingConfig;
