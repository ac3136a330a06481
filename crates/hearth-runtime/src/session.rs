//! [`Session`] – one conversation with the household assistant.
//!
//! A session owns its [`FactStore`] and drives each turn through the same
//! fixed pipeline:
//!
//! 1. **Extract** – run the utterance through
//!    [`extract`][hearth_memory::extract].
//! 2. **Remember** – append a newly extracted fact to the store, which saves
//!    immediately. A failed save is logged and reported but does not end the
//!    turn.
//! 3. **Compose** – build the grounded prompt from the stored facts, the
//!    current [`PerceptualContext`], and the raw utterance.
//! 4. **Complete** – hand the prompt and the system instruction to the
//!    [`Completion`] collaborator.
//!
//! Front ends (terminal loop, camera loop, web form) are just callers: they
//! collect the utterance and context, call [`Session::turn`], and render the
//! reply.
//!
//! # Example
//!
//! ```rust,no_run
//! use hearth_memory::FactStore;
//! use hearth_runtime::{LlmDriver, Session};
//! use hearth_types::PerceptualContext;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let store = FactStore::load("memory.json")?;
//! let driver = LlmDriver::new("http://localhost:11434", "llama3");
//! let mut session = Session::new(store, Box::new(driver));
//!
//! let outcome = session
//!     .turn("I like coffee", &PerceptualContext::objects(["cup"]))
//!     .await?;
//! println!("AI: {}", outcome.reply);
//! # Ok(())
//! # }
//! ```

use hearth_memory::{FactStore, extract};
use hearth_types::{HearthError, PerceptualContext};
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::llm_driver::{Completion, DEFAULT_SYSTEM_PROMPT};
use crate::prompt::compose;

/// What a turn did to the fact store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemoryUpdate {
    /// The utterance did not state a fact.
    NotAFact,
    /// The extracted fact was already stored.
    AlreadyKnown(String),
    /// A new fact was stored and saved.
    Remembered(String),
    /// A new fact was added for this session but could not be saved.
    PersistFailed { fact: String, reason: String },
}

impl MemoryUpdate {
    /// Returns `true` when a new fact was added this turn, saved or not.
    pub fn is_new(&self) -> bool {
        matches!(
            self,
            MemoryUpdate::Remembered(_) | MemoryUpdate::PersistFailed { .. }
        )
    }
}

/// Everything up to, but not including, the completion call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedTurn {
    pub memory: MemoryUpdate,
    pub prompt: String,
}

/// Result of a full turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    pub memory: MemoryUpdate,
    pub prompt: String,
    pub reply: String,
}

/// A single assistant session.
pub struct Session {
    id: Uuid,
    store: FactStore,
    completion: Box<dyn Completion>,
    system_prompt: String,
}

impl Session {
    /// Start a session over `store` using the default persona.
    pub fn new(store: FactStore, completion: Box<dyn Completion>) -> Self {
        let id = Uuid::new_v4();
        info!(session = %id, facts = store.len(), "session started");
        Self {
            id,
            store,
            completion,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }

    /// Replace the system instruction sent with every prompt.
    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn store(&self) -> &FactStore {
        &self.store
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Remember any fact in `utterance` and compose the prompt, without
    /// calling the completion collaborator.
    ///
    /// # Errors
    ///
    /// Returns [`HearthError::EmptyUtterance`] for blank input.
    pub fn prepare(
        &mut self,
        utterance: &str,
        context: &PerceptualContext,
    ) -> Result<PreparedTurn, HearthError> {
        if utterance.trim().is_empty() {
            return Err(HearthError::EmptyUtterance);
        }

        let memory = self.remember(utterance);
        let prompt = compose(self.store.facts(), context, utterance);
        Ok(PreparedTurn { memory, prompt })
    }

    /// Run a full turn: remember, compose, and complete.
    ///
    /// # Errors
    ///
    /// Returns [`HearthError::EmptyUtterance`] for blank input, or
    /// [`HearthError::LlmInferenceFailed`] if the completion call fails. A
    /// fact extracted before a failed completion stays remembered.
    #[instrument(skip_all, fields(session = %self.id))]
    pub async fn turn(
        &mut self,
        utterance: &str,
        context: &PerceptualContext,
    ) -> Result<TurnOutcome, HearthError> {
        let PreparedTurn { memory, prompt } = self.prepare(utterance, context)?;

        let reply = self
            .completion
            .complete(&self.system_prompt, &prompt)
            .await
            .map_err(|e| {
                error!(error = %e, "completion failed");
                HearthError::LlmInferenceFailed(e.to_string())
            })?;

        Ok(TurnOutcome {
            memory,
            prompt,
            reply,
        })
    }

    fn remember(&mut self, utterance: &str) -> MemoryUpdate {
        let Some(fact) = extract(utterance) else {
            return MemoryUpdate::NotAFact;
        };

        match self.store.append_if_new(fact.clone()) {
            Ok(true) => {
                info!(session = %self.id, fact = %fact, "fact remembered");
                MemoryUpdate::Remembered(fact)
            }
            Ok(false) => MemoryUpdate::AlreadyKnown(fact),
            Err(e) => {
                error!(
                    session = %self.id,
                    fact = %fact,
                    error = %e,
                    "fact could not be saved; it will be lost on restart"
                );
                MemoryUpdate::PersistFailed {
                    fact,
                    reason: e.to_string(),
                }
            }
        }
    }
}
