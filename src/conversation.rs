//! The ordered, append-only log of turns shown to the user.

use std::fmt;

use time::OffsetDateTime;

use crate::types::Role;

/// Identifies a turn.  Ids increase strictly in append order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TurnId(u64);

impl TurnId {
    /// The numeric value of the id.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TurnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One entry of the conversation.
#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    /// Unique id within the log.
    pub id: TurnId,
    /// Who authored the turn.
    pub role: Role,
    /// The text of the turn.
    pub text: String,
    /// Images attached to a user turn, as data URLs.
    pub images: Vec<String>,
    /// When the turn was created.
    pub created_at: OffsetDateTime,
    /// Set only on the transient indicator shown while a reply is awaited.
    pub is_pending: bool,
}

impl Turn {
    /// Returns true for turns authored by the user.
    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }
}

/// Append-only sequence of turns.
///
/// Existing turns are never modified; the only way to shrink the log is
/// [`ConversationLog::clear`].
#[derive(Debug, Clone, Default)]
pub struct ConversationLog {
    turns: Vec<Turn>,
    next_id: u64,
}

impl ConversationLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a user turn.
    pub fn push_user(&mut self, text: impl Into<String>, images: Vec<String>) -> &Turn {
        self.push(Role::User, text.into(), images)
    }

    /// Appends a model turn.
    pub fn push_model(&mut self, text: impl Into<String>) -> &Turn {
        self.push(Role::Model, text.into(), Vec::new())
    }

    /// Builds the transient "thinking" turn.  It is not stored.
    pub fn pending_turn(&self) -> Turn {
        Turn {
            id: TurnId(self.next_id),
            role: Role::Model,
            text: "...".to_string(),
            images: Vec::new(),
            created_at: OffsetDateTime::now_utc(),
            is_pending: true,
        }
    }

    /// All turns in append order.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// The most recent turn.
    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// Number of turns.
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// True when the log has no turns.
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Removes every turn.  Ids keep increasing afterwards.
    pub fn clear(&mut self) {
        self.turns.clear();
    }

    fn push(&mut self, role: Role, text: String, images: Vec<String>) -> &Turn {
        let id = TurnId(self.next_id);
        self.next_id += 1;
        self.turns.push(Turn {
            id,
            role,
            text,
            images,
            created_at: OffsetDateTime::now_utc(),
            is_pending: false,
        });
        &self.turns[self.turns.len() - 1]
    }
}
