//! Orchestration of one consultation: input, attachments, sends and the log.
//!
//! The controller is a two-state machine.  A send moves it from
//! [`ControllerState::Idle`] to [`ControllerState::Sending`]; the reply (or
//! failure) moves it back.  Only one send can be outstanding at a time.

use crate::attachments::PendingAttachments;
use crate::codec;
use crate::conversation::{ConversationLog, Turn};
use crate::error::{Error, Result};
use crate::observability::{CONTROLLER_REJECTED_SENDS, CONTROLLER_SEND_FAILURES, CONTROLLER_SENDS};
use crate::session::{ChatService, Conversation, SessionManager};
use crate::specialist::{self, Specialist};
use crate::types::{GenerateContentResponse, Model, UsageMetadata};

/// Appended in place of a reply when a send fails.
pub const APOLOGY_REPLY: &str = "Terjadi gangguan koneksi. Mohon ulangi pertanyaan Anda.";

/// Sent as the text of a turn that carries images but no text.
pub const DEFAULT_IMAGE_PROMPT: &str = "Lakukan analisis pada gambar yang dilampirkan.";

/// Whether a send is outstanding.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum ControllerState {
    /// Ready to send.
    #[default]
    Idle,
    /// Exactly one send is outstanding.
    Sending,
}

/// A user turn that has been logged and is ready to be dispatched.
#[derive(Debug, Clone, PartialEq)]
pub struct Outgoing {
    /// The specialist selected when the turn was sent.
    pub specialist: &'static Specialist,
    /// Text to send to the model.
    pub text: String,
    /// Attached images, as data URLs.
    pub images: Vec<String>,
}

/// Snapshot of the controller's counters.
#[derive(Debug, Clone)]
pub struct SessionStats {
    /// Id of the selected specialist.
    pub specialist_id: &'static str,
    /// Display name of the selected specialist.
    pub specialist_name: &'static str,
    /// Model conversations are started with.
    pub model: Model,
    /// Thinking budget, if thinking is configured with a fixed budget.
    pub thinking_budget: Option<u32>,
    /// Whether a conversation handle is live.
    pub session_active: bool,
    /// Turns in the log.
    pub turn_count: usize,
    /// Images waiting to be sent.
    pub pending_attachments: usize,
    /// Sends dispatched since start.
    pub total_sends: u64,
    /// Sends that failed.
    pub failed_sends: u64,
    /// Token totals reported by the model.
    pub usage: UsageMetadata,
}

/// Drives a consultation with a single specialist at a time.
pub struct InteractionController<S: ChatService> {
    sessions: SessionManager<S>,
    specialist: &'static Specialist,
    log: ConversationLog,
    attachments: PendingAttachments,
    input: String,
    state: ControllerState,
    usage: UsageMetadata,
    total_sends: u64,
    failed_sends: u64,
    // Set when the specialist changes while a send is outstanding.
    abandoned: bool,
}

impl<S: ChatService> InteractionController<S> {
    /// Creates a controller talking to the default specialist.
    pub fn new(sessions: SessionManager<S>) -> Self {
        Self::with_specialist(sessions, specialist::default_specialist())
    }

    /// Creates a controller talking to `specialist`.
    pub fn with_specialist(sessions: SessionManager<S>, specialist: &'static Specialist) -> Self {
        Self {
            sessions,
            specialist,
            log: ConversationLog::new(),
            attachments: PendingAttachments::new(),
            input: String::new(),
            state: ControllerState::Idle,
            usage: UsageMetadata::default(),
            total_sends: 0,
            failed_sends: 0,
            abandoned: false,
        }
    }

    /// The selected specialist.
    pub fn specialist(&self) -> &'static Specialist {
        self.specialist
    }

    /// Current state.
    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// The conversation log.
    pub fn log(&self) -> &ConversationLog {
        &self.log
    }

    /// Turns in append order.
    pub fn turns(&self) -> &[Turn] {
        self.log.turns()
    }

    /// The transient indicator shown while a send is outstanding.
    pub fn pending_turn(&self) -> Option<Turn> {
        match self.state {
            ControllerState::Sending => Some(self.log.pending_turn()),
            ControllerState::Idle => None,
        }
    }

    /// The session manager.
    pub fn sessions(&self) -> &SessionManager<S> {
        &self.sessions
    }

    /// Replaces the text waiting to be sent.
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// The text waiting to be sent.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Pending images, in attachment order.
    pub fn attachments(&self) -> &[String] {
        self.attachments.as_slice()
    }

    /// Attaches an image data URL.  Returns false if it was dropped.
    pub fn attach_data_url(&mut self, data_url: impl Into<String>) -> bool {
        self.attachments.add(data_url)
    }

    /// Attaches one image file.  Returns false if it was dropped.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the image file cannot be read.
    pub fn attach_path(&mut self, path: impl AsRef<std::path::Path>) -> Result<bool> {
        self.attachments.add_path(path)
    }

    /// Attaches image files in order.  Returns how many were attached.
    ///
    /// Non-image files and files beyond the cap are dropped.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if an image file cannot be read; images attached
    /// before the failing one stay attached.
    pub fn attach_paths<I, P>(&mut self, paths: I) -> Result<usize>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<std::path::Path>,
    {
        let mut attached = 0;
        for path in paths {
            if self.attachments.add_path(path)? {
                attached += 1;
            }
        }
        Ok(attached)
    }

    /// Removes the attachment at `index`, keeping the order of the rest.
    ///
    /// # Errors
    ///
    /// Returns a validation error when nothing is attached at `index`.
    pub fn detach(&mut self, index: usize) -> Result<String> {
        let attached = self.attachments.len();
        self.attachments.remove(index).ok_or_else(|| {
            Error::validation(
                format!("no attachment at position {} of {attached}", index + 1),
                Some("position".to_string()),
            )
        })
    }

    /// True when a send would go out now.
    pub fn can_send(&self) -> bool {
        self.state == ControllerState::Idle
            && (!self.input.trim().is_empty() || !self.attachments.is_empty())
    }

    /// Starts a send: logs the user turn and clears the input surface.
    ///
    /// Returns `None`, changing nothing, when a send is already outstanding or
    /// there is nothing to send.
    pub fn begin_send(&mut self) -> Option<Outgoing> {
        if !self.can_send() {
            CONTROLLER_REJECTED_SENDS.click();
            return None;
        }
        self.state = ControllerState::Sending;
        let text = std::mem::take(&mut self.input);
        let images = self.attachments.take();
        self.log.push_user(text.clone(), images.clone());
        let text = if text.trim().is_empty() {
            DEFAULT_IMAGE_PROMPT.to_string()
        } else {
            text
        };
        Some(Outgoing {
            specialist: self.specialist,
            text,
            images,
        })
    }

    /// Sends `outgoing` to the model and returns the reply text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionUnavailable`] without contacting the model when
    /// the specialist changed after `outgoing` was started.
    pub async fn dispatch(&mut self, outgoing: &Outgoing) -> Result<String> {
        if outgoing.specialist.id != self.specialist.id {
            return Err(Error::session_unavailable(
                format!(
                    "specialist changed from {} to {} before the message was sent",
                    outgoing.specialist.id, self.specialist.id
                ),
                None,
            ));
        }
        let payload = codec::encode(&outgoing.text, &outgoing.images);
        let chat = self.sessions.get_or_create(self.specialist)?;
        let response = chat.send_message(payload).await?;
        self.record_usage(&response);
        Ok(codec::decode(&response))
    }

    /// Completes a send, appending the reply or the apology notice.
    ///
    /// A send started before a specialist change appends nothing.
    pub fn finish_send(&mut self, outcome: Result<String>) {
        self.state = ControllerState::Idle;
        if std::mem::take(&mut self.abandoned) {
            tracing::debug!(
                specialist = self.specialist.id,
                "dropping reply for a previous specialist"
            );
            return;
        }
        self.total_sends += 1;
        CONTROLLER_SENDS.click();
        match outcome {
            Ok(text) => {
                self.log.push_model(text);
            }
            Err(err) => {
                self.failed_sends += 1;
                CONTROLLER_SEND_FAILURES.click();
                tracing::error!(specialist = self.specialist.id, error = %err, "send failed");
                self.log.push_model(APOLOGY_REPLY);
            }
        }
    }

    /// Sends the pending input and attachments and waits for the reply.
    ///
    /// Returns false if nothing was sent.
    pub async fn send(&mut self) -> bool {
        let Some(outgoing) = self.begin_send() else {
            return false;
        };
        let outcome = self.dispatch(&outgoing).await;
        self.finish_send(outcome);
        true
    }

    /// True when [`reset`](Self::reset) would discard something the user typed or received.
    pub fn needs_confirmation(&self) -> bool {
        !self.log.is_empty() || !self.attachments.is_empty() || !self.input.trim().is_empty()
    }

    /// Clears the log, attachments and input, and discards the session.
    ///
    /// An outstanding send is not cancelled.
    pub fn reset(&mut self) {
        self.log.clear();
        self.attachments.clear();
        self.input.clear();
        self.sessions.invalidate();
    }

    /// Switches to `specialist`, starting over with an empty conversation.
    ///
    /// No request is made; the next send starts the new conversation.
    pub fn change_specialist(&mut self, specialist: &'static Specialist) {
        tracing::debug!(from = self.specialist.id, to = specialist.id, "changing specialist");
        if self.state == ControllerState::Sending && self.specialist.id != specialist.id {
            self.abandoned = true;
        }
        self.specialist = specialist;
        self.reset();
    }

    /// Returns the current statistics snapshot.
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            specialist_id: self.specialist.id,
            specialist_name: self.specialist.name,
            model: self.sessions.model().clone(),
            thinking_budget: self
                .sessions
                .thinking()
                .map(|thinking| thinking.num_tokens())
                .filter(|budget| *budget > 0),
            session_active: self.sessions.active_specialist().is_some(),
            turn_count: self.log.len(),
            pending_attachments: self.attachments.len(),
            total_sends: self.total_sends,
            failed_sends: self.failed_sends,
            usage: self.usage,
        }
    }

    fn record_usage(&mut self, response: &GenerateContentResponse) {
        if let Some(usage) = response.usage_metadata {
            self.usage = self.usage + usage;
        }
    }
}
