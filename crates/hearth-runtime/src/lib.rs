//! `hearth-runtime` – The Conversation Engine.
//!
//! Turns one utterance plus the current perceptual context into one grounded
//! language-model reply, remembering preference facts along the way.
//!
//! # Modules
//!
//! - [`prompt`] – [`compose`][prompt::compose]: the pure function that joins
//!   stored facts, perceptual context, and the utterance into the prompt
//!   `"You currently remember: … User said: …"`.
//! - [`session`] – [`Session`][session::Session]: owns a
//!   [`FactStore`][hearth_memory::FactStore] and runs the
//!   extract → remember → compose → complete pipeline for each turn.
//! - [`llm_driver`] – [`LlmDriver`][llm_driver::LlmDriver]: an
//!   OpenAI-compatible async HTTP client (Ollama or OpenAI) behind the
//!   [`Completion`][llm_driver::Completion] trait.
//! - [`telemetry`] – [`init_tracing`][telemetry::init_tracing]: installs the
//!   global `tracing` subscriber with an optional OTLP span exporter.

pub mod llm_driver;
pub mod prompt;
pub mod session;
pub mod telemetry;

pub use llm_driver::{
    ChatMessage, Completion, DEFAULT_SYSTEM_PROMPT, DEFAULT_TEMPERATURE, LlmDriver, LlmError, Role,
};
pub use prompt::compose;
pub use session::{MemoryUpdate, PreparedTurn, Session, TurnOutcome};
pub use telemetry::{LogFormat, TracerProviderGuard, init_tracing};
