//! `hearth-memory` – The Fact Memory.
//!
//! Gives the assistant a small, persistent recollection of what the household
//! has told it, stored as a plain JSON list of sentences.
//!
//! # Modules
//!
//! - [`fact_store`] – [`FactStore`][fact_store::FactStore]: an append-only,
//!   deduplicated list of facts persisted to `memory.json` after every new
//!   entry.
//! - [`extractor`] – [`extract`][extractor::extract]: the substring heuristic
//!   that turns an utterance such as `"I like coffee"` into the storable fact
//!   `"I like coffee."`.

pub mod extractor;
pub mod fact_store;

pub use extractor::extract;
pub use fact_store::{DEFAULT_MEMORY_FILE, FactStore, MemoryError};
