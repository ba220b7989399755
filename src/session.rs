//! Conversation session management.
//!
//! A [`SessionManager`] owns at most one live conversation handle, bound to a
//! single specialist.  Asking for a handle for a different specialist discards
//! the old one and starts a new conversation in its place.

use crate::codec::Payload;
use crate::error::{Error, Result};
use crate::observability::{SESSION_INITIALIZATIONS, SESSION_INITIALIZATION_FAILURES};
use crate::specialist::Specialist;
use crate::types::{Content, GenerateContentResponse, GenerationConfig, Model, ThinkingConfig};

/// Thinking budget used unless configured otherwise.
pub const DEFAULT_THINKING_BUDGET: u32 = 10240;

/// Closing sentence every reply must end with.
pub const CLOSING_DISCLAIMER: &str =
    "Analisis ini berdasarkan algoritma klinis AI. Diagnosis final wajib dilakukan oleh dokter secara fisik.";

const MULTIMODAL_DIRECTIVE: &str = "KEMAMPUAN VISUAL (MULTIMODAL):
Analisis gambar medis (kulit, mata, radiologi, hasil lab) dengan presisi tinggi. Deskripsikan lesi, warna, bentuk, dan anomali secara detail klinis sebelum menyimpulkan.";

const REASONING_DIRECTIVE: &str = "FORMAT DIAGNOSIS (GENIUS MODE):
Jangan langsung menebak. Ikuti alur pikir ini:
1. **Analisis Gejala**: Bedah keluhan pasien, hubungkan gejala satu dengan lainnya.
2. **Differential Diagnosis (Diagnosis Banding)**: Berikan 2-3 kemungkinan penyakit, dari yang paling mungkin hingga yang jarang tapi berbahaya.
3. **Saran Tindakan**: Langkah konkret medis dan non-medis.";

const TONE_DIRECTIVE: &str = "TONE OF VOICE:
Profesional, berwibawa, namun tetap empatik dan menenangkan. Gunakan istilah medis yang tepat tetapi jelaskan artinya kepada pasien awam.";

const SAFETY_DIRECTIVE: &str = "SAFETY PROTOCOL:
Jika indikasi gawat darurat (Jantung, Stroke, Sepsis), berikan peringatan keras dan jelas untuk segera ke IGD.";

/// Builds the system instruction for a conversation with `specialist`.
pub fn system_instruction(specialist: &Specialist) -> String {
    let preamble = format!(
        "ROLE & PERSONA:
Anda adalah {} dengan level KONSULTAN SENIOR (PROFESSOR).
Kecerdasan diagnostik Anda berada di level tertinggi. Anda tidak hanya menjawab, tapi melakukan \"Clinical Reasoning\" mendalam.",
        specialist.name
    );
    let disclaimer = format!("DISCLAIMER:\nAkhiri dengan: \"{CLOSING_DISCLAIMER}\"");
    [
        preamble.as_str(),
        specialist.instruction,
        MULTIMODAL_DIRECTIVE,
        REASONING_DIRECTIVE,
        TONE_DIRECTIVE,
        SAFETY_DIRECTIVE,
        disclaimer.as_str(),
    ]
    .join("\n\n")
}

/// Everything a new conversation is configured with.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatSetup {
    /// The model serving the conversation.
    pub model: Model,
    /// The full system instruction.
    pub system_instruction: String,
    /// Generation parameters sent with every request.
    pub generation_config: GenerationConfig,
}

/// A live conversation with the remote model.
#[async_trait::async_trait]
pub trait Conversation: Send {
    /// Sends one user turn and returns the model's reply.
    ///
    /// On success both the user content and the reply become part of the
    /// conversation history; on failure the history is left unchanged.
    async fn send_message(&mut self, payload: Payload) -> Result<GenerateContentResponse>;

    /// The contents exchanged so far.
    fn history(&self) -> &[Content];
}

/// Something that can start conversations.
pub trait ChatService: Send + Sync {
    /// The handle type of a started conversation.
    type Chat: Conversation;

    /// Starts a new conversation.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the service has no usable credential.
    fn create_chat(&self, setup: ChatSetup) -> Result<Self::Chat>;
}

struct ActiveSession<C> {
    specialist_id: &'static str,
    chat: C,
}

/// Owns the single active conversation handle.
pub struct SessionManager<S: ChatService> {
    service: S,
    model: Model,
    thinking: Option<ThinkingConfig>,
    active: Option<ActiveSession<S::Chat>>,
}

impl<S: ChatService> SessionManager<S> {
    /// Creates a session manager using the default model and thinking budget.
    pub fn new(service: S) -> Self {
        Self {
            service,
            model: Model::default(),
            thinking: Some(ThinkingConfig::with_budget(DEFAULT_THINKING_BUDGET)),
            active: None,
        }
    }

    /// Sets the model used by conversations started from now on.
    pub fn with_model(mut self, model: Model) -> Self {
        self.model = model;
        self
    }

    /// Sets the thinking configuration used by conversations started from now on.
    pub fn with_thinking(mut self, thinking: Option<ThinkingConfig>) -> Self {
        self.thinking = thinking;
        self
    }

    /// The model conversations are started with.
    pub fn model(&self) -> &Model {
        &self.model
    }

    /// The thinking configuration conversations are started with.
    pub fn thinking(&self) -> Option<ThinkingConfig> {
        self.thinking
    }

    /// The underlying chat service.
    pub fn service(&self) -> &S {
        &self.service
    }

    /// The setup a conversation with `specialist` is started with.
    pub fn setup_for(&self, specialist: &Specialist) -> ChatSetup {
        let mut generation_config = GenerationConfig::default();
        if let Some(thinking) = self.thinking {
            generation_config = generation_config.with_thinking(thinking);
        }
        ChatSetup {
            model: self.model.clone(),
            system_instruction: system_instruction(specialist),
            generation_config,
        }
    }

    /// Starts a fresh conversation for `specialist`, replacing any current one.
    ///
    /// The previous handle is discarded even when starting the new one fails.
    pub fn initialize(&mut self, specialist: &Specialist) -> Result<&mut S::Chat> {
        self.active = None;
        let setup = self.setup_for(specialist);
        match self.service.create_chat(setup) {
            Ok(chat) => {
                SESSION_INITIALIZATIONS.click();
                tracing::info!(specialist = specialist.id, model = %self.model, "started chat session");
                let active = self.active.insert(ActiveSession {
                    specialist_id: specialist.id,
                    chat,
                });
                Ok(&mut active.chat)
            }
            Err(err) => {
                SESSION_INITIALIZATION_FAILURES.click();
                tracing::error!(specialist = specialist.id, error = %err, "failed to start chat session");
                Err(err)
            }
        }
    }

    /// Returns the handle for `specialist`, starting a conversation if needed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionUnavailable`] if a conversation could not be started.
    pub fn get_or_create(&mut self, specialist: &Specialist) -> Result<&mut S::Chat> {
        let bound = self
            .active
            .as_ref()
            .is_some_and(|active| active.specialist_id == specialist.id);
        if !bound {
            self.initialize(specialist).map_err(|err| {
                Error::session_unavailable(
                    format!("no conversation for {}", specialist.id),
                    Some(err),
                )
            })?;
        }
        match self.active.as_mut() {
            Some(active) => Ok(&mut active.chat),
            None => Err(Error::session_unavailable(
                format!("no conversation for {}", specialist.id),
                None,
            )),
        }
    }

    /// Discards the current handle.  The next send starts a new conversation.
    pub fn invalidate(&mut self) {
        if let Some(active) = self.active.take() {
            tracing::debug!(specialist = active.specialist_id, "discarded chat session");
        }
    }

    /// Id of the specialist the current handle is bound to.
    pub fn active_specialist(&self) -> Option<&'static str> {
        self.active.as_ref().map(|active| active.specialist_id)
    }

    /// The current handle, if any.
    pub fn active_chat(&self) -> Option<&S::Chat> {
        self.active.as_ref().map(|active| &active.chat)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory chat service used by unit tests.

    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use super::*;

    /// Shared script and record of what the fake service saw.
    #[derive(Default)]
    pub struct Script {
        pub replies: VecDeque<Result<GenerateContentResponse>>,
        pub setups: Vec<ChatSetup>,
        pub sent: Vec<(usize, Payload)>,
        pub missing_credential: bool,
    }

    #[derive(Clone, Default)]
    pub struct FakeService {
        pub script: Arc<Mutex<Script>>,
    }

    impl FakeService {
        pub fn reply(&self, reply: Result<GenerateContentResponse>) {
            self.script.lock().unwrap().replies.push_back(reply);
        }

        pub fn setups(&self) -> Vec<ChatSetup> {
            self.script.lock().unwrap().setups.clone()
        }

        pub fn sent(&self) -> Vec<(usize, Payload)> {
            self.script.lock().unwrap().sent.clone()
        }

        pub fn set_missing_credential(&self, missing: bool) {
            self.script.lock().unwrap().missing_credential = missing;
        }
    }

    pub struct FakeChat {
        pub index: usize,
        script: Arc<Mutex<Script>>,
        history: Vec<Content>,
    }

    #[async_trait::async_trait]
    impl Conversation for FakeChat {
        async fn send_message(&mut self, payload: Payload) -> Result<GenerateContentResponse> {
            let reply = {
                let mut script = self.script.lock().unwrap();
                script.sent.push((self.index, payload.clone()));
                script
                    .replies
                    .pop_front()
                    .unwrap_or_else(|| Ok(GenerateContentResponse::from_text("ok")))
            };
            if let Ok(response) = &reply {
                self.history.push(payload.into_content());
                if let Some(content) = response.first_content() {
                    self.history.push(content.clone());
                }
            }
            reply
        }

        fn history(&self) -> &[Content] {
            &self.history
        }
    }

    impl ChatService for FakeService {
        type Chat = FakeChat;

        fn create_chat(&self, setup: ChatSetup) -> Result<FakeChat> {
            let mut script = self.script.lock().unwrap();
            if script.missing_credential {
                return Err(Error::configuration("GEMINI_API_KEY is not set"));
            }
            script.setups.push(setup);
            Ok(FakeChat {
                index: script.setups.len() - 1,
                script: Arc::clone(&self.script),
                history: Vec::new(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::FakeService;
    use super::*;
    use crate::specialist;

    fn cardio() -> &'static Specialist {
        specialist::find("cardio").unwrap()
    }

    #[test]
    fn system_instruction_sections() {
        let text = system_instruction(cardio());
        assert!(text.starts_with("ROLE & PERSONA:\nAnda adalah Spesialis Jantung (Sp.JP)"));
        assert!(text.contains("KONSULTAN SENIOR (PROFESSOR)"));
        assert!(text.contains(cardio().instruction));
        assert!(text.contains("KEMAMPUAN VISUAL (MULTIMODAL)"));
        assert!(text.contains("1. **Analisis Gejala**"));
        assert!(text.contains("2. **Differential Diagnosis"));
        assert!(text.contains("3. **Saran Tindakan**"));
        assert!(text.contains("TONE OF VOICE"));
        assert!(text.contains("SAFETY PROTOCOL"));
        assert!(text.trim_end().ends_with(&format!("\"{CLOSING_DISCLAIMER}\"")));
    }

    #[test]
    fn setup_carries_model_and_thinking_budget() {
        let manager = SessionManager::new(FakeService::default());
        let setup = manager.setup_for(cardio());
        assert_eq!(setup.model, Model::default());
        assert_eq!(
            setup.generation_config.thinking_config,
            Some(ThinkingConfig::with_budget(10240))
        );

        let manager = SessionManager::new(FakeService::default())
            .with_model("gemini-2.5-flash".parse().unwrap())
            .with_thinking(None);
        let setup = manager.setup_for(cardio());
        assert_eq!(setup.model.to_string(), "gemini-2.5-flash");
        assert!(setup.generation_config.thinking_config.is_none());
    }

    #[test]
    fn get_or_create_reuses_matching_handle() {
        let service = FakeService::default();
        let mut manager = SessionManager::new(service.clone());
        let first = manager.get_or_create(cardio()).unwrap().index;
        let second = manager.get_or_create(cardio()).unwrap().index;
        assert_eq!(first, second);
        assert_eq!(service.setups().len(), 1);
        assert_eq!(manager.active_specialist(), Some("cardio"));
    }

    #[test]
    fn get_or_create_replaces_handle_for_other_specialist() {
        let service = FakeService::default();
        let mut manager = SessionManager::new(service.clone());
        manager.get_or_create(cardio()).unwrap();
        let derma = specialist::find("derma").unwrap();
        let index = manager.get_or_create(derma).unwrap().index;
        assert_eq!(index, 1);
        assert_eq!(manager.active_specialist(), Some("derma"));
        let setups = service.setups();
        assert!(setups[1].system_instruction.contains(derma.instruction));
    }

    #[test]
    fn invalidate_forces_new_handle() {
        let service = FakeService::default();
        let mut manager = SessionManager::new(service.clone());
        manager.get_or_create(cardio()).unwrap();
        manager.invalidate();
        assert!(manager.active_specialist().is_none());
        assert_eq!(manager.get_or_create(cardio()).unwrap().index, 1);
    }

    #[test]
    fn missing_credential_is_not_fatal() {
        let service = FakeService::default();
        service.set_missing_credential(true);
        let mut manager = SessionManager::new(service.clone());
        let err = manager.initialize(cardio()).err().unwrap();
        assert!(err.is_configuration());
        assert!(manager.active_chat().is_none());

        let err = manager.get_or_create(cardio()).err().unwrap();
        assert!(err.is_session_unavailable());
    }

    #[test]
    fn failed_reinitialization_drops_stale_handle() {
        let service = FakeService::default();
        let mut manager = SessionManager::new(service.clone());
        manager.get_or_create(cardio()).unwrap();
        service.set_missing_credential(true);
        let derma = specialist::find("derma").unwrap();
        assert!(manager.get_or_create(derma).is_err());
        assert!(manager.active_specialist().is_none());
        assert!(manager.get_or_create(cardio()).is_err());
    }
}
