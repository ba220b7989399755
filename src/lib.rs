// Public modules
pub mod attachments;
pub mod chat;
pub mod client;
pub mod codec;
pub mod controller;
pub mod conversation;
pub mod error;
pub mod observability;
pub mod render;
pub mod session;
pub mod specialist;
pub mod types;
pub mod utils;

// Re-exports
pub use attachments::{MAX_ATTACHMENTS, PendingAttachments};
pub use client::{Gemini, GeminiChat};
pub use codec::Payload;
pub use controller::{ControllerState, InteractionController, Outgoing, SessionStats};
pub use conversation::{ConversationLog, Turn, TurnId};
pub use error::{Error, Result};
pub use observability::register_biometrics;
pub use session::{ChatService, ChatSetup, Conversation, SessionManager};
pub use specialist::Specialist;
pub use types::*;
