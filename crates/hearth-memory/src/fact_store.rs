//! Fact Store.
//!
//! Persists the ordered list of remembered facts to a small JSON document so
//! the assistant can recall them across restarts.
//!
//! # Storage layout
//!
//! A single object with one field, written pretty-printed with two-space
//! indentation so the file stays human-diffable:
//!
//! ```text
//! {
//!   "facts": [
//!     "I like coffee.",
//!     "My wife likes jazz."
//!   ]
//! }
//! ```
//!
//! # Example
//!
//! ```rust
//! use hearth_memory::fact_store::FactStore;
//!
//! let dir = std::env::temp_dir().join("hearth-doc-example");
//! let path = dir.join("memory.json");
//! # let _ = std::fs::remove_file(&path);
//! # std::fs::create_dir_all(&dir).unwrap();
//! let mut store = FactStore::load(&path).unwrap();
//! assert!(store.is_empty());
//!
//! assert!(store.append_if_new("I like coffee.").unwrap());
//! assert!(!store.append_if_new("I like coffee.").unwrap());
//!
//! let reloaded = FactStore::load(&path).unwrap();
//! assert_eq!(reloaded.facts(), ["I like coffee."]);
//! ```
//!
//! # Concurrency
//!
//! A store is owned by exactly one session. Two processes writing the same
//! file is unsupported: the last `save` wins.

use std::collections::HashSet;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Default file name for the fact store, relative to the working directory.
pub const DEFAULT_MEMORY_FILE: &str = "memory.json";

// ─────────────────────────────────────────────────────────────────────────────
// Error type
// ─────────────────────────────────────────────────────────────────────────────

/// Errors that can arise from fact store operations.
///
/// A missing backing file is not an error: [`FactStore::load`] recovers it
/// into an empty store.
#[derive(Error, Debug)]
pub enum MemoryError {
    /// The backing file exists but could not be read or parsed.
    #[error("failed to load facts from {path}: {reason}")]
    Load { path: PathBuf, reason: String },
    /// The facts could not be written back to the backing file.
    #[error("failed to persist facts to {path}: {reason}")]
    Persist { path: PathBuf, reason: String },
}

// ─────────────────────────────────────────────────────────────────────────────
// On-disk document
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Serialize, Deserialize)]
struct MemoryDocument {
    facts: Vec<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// FactStore
// ─────────────────────────────────────────────────────────────────────────────

/// Append-only, deduplicated list of facts backed by a JSON file.
#[derive(Debug)]
pub struct FactStore {
    path: PathBuf,
    facts: Vec<String>,
}

impl FactStore {
    /// Load the store from `path`.
    ///
    /// A missing file yields an empty store; nothing is written until the
    /// first successful [`append_if_new`][Self::append_if_new].
    ///
    /// # Errors
    ///
    /// Returns [`MemoryError::Load`] if the file exists but cannot be read
    /// (e.g. permission denied) or does not contain a valid facts document.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, MemoryError> {
        let path = path.as_ref().to_path_buf();

        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!(path = %path.display(), "no fact store found; starting empty");
                return Ok(Self::empty(path));
            }
            Err(e) => {
                return Err(MemoryError::Load {
                    path,
                    reason: e.to_string(),
                });
            }
        };

        let doc: MemoryDocument = serde_json::from_str(&raw).map_err(|e| MemoryError::Load {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        let loaded = doc.facts.len();
        let facts = dedupe_in_order(doc.facts);
        if facts.len() != loaded {
            warn!(
                path = %path.display(),
                dropped = loaded - facts.len(),
                "fact store contained duplicate entries; keeping first occurrences"
            );
        }

        info!(path = %path.display(), facts = facts.len(), "fact store loaded");
        Ok(Self { path, facts })
    }

    /// An empty store that will persist to `path`.
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            facts: Vec::new(),
        }
    }

    /// Write every fact to the backing file, replacing its previous content.
    ///
    /// The document is written to a temporary file next to the target and
    /// renamed over it, so a failed write leaves the previous file intact.
    ///
    /// # Errors
    ///
    /// Returns [`MemoryError::Persist`] if serialisation or the write fails.
    pub fn save(&self) -> Result<(), MemoryError> {
        let persist_err = |reason: String| MemoryError::Persist {
            path: self.path.clone(),
            reason,
        };

        let doc = MemoryDocument {
            facts: self.facts.clone(),
        };
        // serde_json's pretty printer indents with two spaces.
        let mut raw = serde_json::to_string_pretty(&doc).map_err(|e| persist_err(e.to_string()))?;
        raw.push('\n');

        replace_file(&self.path, |f| f.write_all(raw.as_bytes()))
            .map_err(|e| persist_err(e.to_string()))?;

        debug!(path = %self.path.display(), facts = self.facts.len(), "fact store saved");
        Ok(())
    }

    /// Append `fact` unless an identical string is already stored.
    ///
    /// Returns `Ok(true)` when the fact was appended and saved, `Ok(false)`
    /// when it was already known (nothing is written in that case).
    ///
    /// # Errors
    ///
    /// Returns [`MemoryError::Persist`] if the save after appending fails.
    /// The fact stays in memory, so a later identical append is a no-op and
    /// the fact is only durable once some subsequent save succeeds.
    pub fn append_if_new(&mut self, fact: impl Into<String>) -> Result<bool, MemoryError> {
        let fact = fact.into();
        if self.contains(&fact) {
            debug!(fact = %fact, "fact already known");
            return Ok(false);
        }
        self.facts.push(fact);
        self.save()?;
        Ok(true)
    }

    /// All stored facts in insertion order.
    pub fn facts(&self) -> &[String] {
        &self.facts
    }

    /// Returns `true` if `fact` is stored (exact match).
    pub fn contains(&self, fact: &str) -> bool {
        self.facts.iter().any(|f| f == fact)
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of stored facts.
    pub fn len(&self) -> usize {
        self.facts.len()
    }

    /// Returns `true` if no facts are stored.
    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }
}

/// Replace `path` with whatever `write` produces, via a sibling temp file.
///
/// The temp file is removed if `write` or the rename fails.
fn replace_file(
    path: &Path,
    write: impl FnOnce(&mut NamedTempFile) -> io::Result<()>,
) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    write(&mut tmp)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

fn dedupe_in_order(facts: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    facts
        .into_iter()
        .filter(|f| seen.insert(f.clone()))
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn store_path(dir: &tempfile::TempDir) -> PathBuf {
        dir.path().join(DEFAULT_MEMORY_FILE)
    }

    // ── load ─────────────────────────────────────────────────────────────────

    #[test]
    fn load_missing_file_returns_empty_store() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let store = FactStore::load(store_path(&dir)).expect("missing file is not an error");
        assert!(store.is_empty());
        // Loading alone must not create the file.
        assert!(!store_path(&dir).exists());
    }

    #[test]
    fn load_corrupt_file_is_load_error() {
        let dir = tempfile::tempdir().expect("tmp dir");
        fs::write(store_path(&dir), "{ this is not json").unwrap();
        let err = FactStore::load(store_path(&dir)).unwrap_err();
        assert!(matches!(err, MemoryError::Load { .. }), "got {err:?}");
    }

    #[test]
    fn load_document_without_facts_field_is_load_error() {
        let dir = tempfile::tempdir().expect("tmp dir");
        fs::write(store_path(&dir), r#"{"notes": []}"#).unwrap();
        let err = FactStore::load(store_path(&dir)).unwrap_err();
        assert!(matches!(err, MemoryError::Load { .. }));
    }

    #[test]
    fn load_directory_is_load_error() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let err = FactStore::load(dir.path()).unwrap_err();
        assert!(matches!(err, MemoryError::Load { .. }));
    }

    #[test]
    fn load_reads_existing_document() {
        let dir = tempfile::tempdir().expect("tmp dir");
        fs::write(
            store_path(&dir),
            r#"{"facts": ["I like coffee.", "My wife likes jazz."]}"#,
        )
        .unwrap();
        let store = FactStore::load(store_path(&dir)).unwrap();
        assert_eq!(store.facts(), ["I like coffee.", "My wife likes jazz."]);
    }

    #[test]
    fn load_drops_duplicate_entries_keeping_first() {
        let dir = tempfile::tempdir().expect("tmp dir");
        fs::write(store_path(&dir), r#"{"facts": ["a.", "b.", "a."]}"#).unwrap();
        let store = FactStore::load(store_path(&dir)).unwrap();
        assert_eq!(store.facts(), ["a.", "b."]);
    }

    // ── save ─────────────────────────────────────────────────────────────────

    #[test]
    fn save_writes_pretty_two_space_json() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let mut store = FactStore::empty(store_path(&dir));
        store.append_if_new("I like coffee.").unwrap();

        let raw = fs::read_to_string(store_path(&dir)).unwrap();
        assert_eq!(raw, "{\n  \"facts\": [\n    \"I like coffee.\"\n  ]\n}\n");
    }

    #[test]
    fn save_empty_store_writes_empty_array() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let store = FactStore::empty(store_path(&dir));
        store.save().unwrap();
        let raw = fs::read_to_string(store_path(&dir)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value, serde_json::json!({ "facts": [] }));
    }

    #[test]
    fn save_into_missing_directory_is_persist_error() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let mut store = FactStore::empty(dir.path().join("nope").join("memory.json"));
        let err = store.append_if_new("I like tea.").unwrap_err();
        assert!(matches!(err, MemoryError::Persist { .. }));
        // The fact is still held for the rest of the session.
        assert!(store.contains("I like tea."));
    }

    #[test]
    fn failed_write_keeps_previous_file() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let mut store = FactStore::empty(store_path(&dir));
        store.append_if_new("I like coffee.").unwrap();
        let before = fs::read_to_string(store_path(&dir)).unwrap();

        // Half a document, then the disk fills up.
        let err = replace_file(&store_path(&dir), |f| {
            f.write_all(b"{\n  \"facts\": [")?;
            Err(io::Error::other("no space left on device"))
        })
        .unwrap_err();
        assert_eq!(err.to_string(), "no space left on device");

        assert_eq!(fs::read_to_string(store_path(&dir)).unwrap(), before);
        let reloaded = FactStore::load(store_path(&dir)).unwrap();
        assert_eq!(reloaded.facts(), ["I like coffee."]);
        // The temp file is cleaned up.
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn save_leaves_no_temp_files_behind() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let mut store = FactStore::empty(store_path(&dir));
        store.append_if_new("a.").unwrap();
        store.append_if_new("b.").unwrap();
        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, [DEFAULT_MEMORY_FILE]);
    }

    // ── round trip ───────────────────────────────────────────────────────────

    fn roundtrip(dir: &tempfile::TempDir, facts: &[&str]) -> Vec<String> {
        let mut store = FactStore::empty(store_path(dir));
        for f in facts {
            store.append_if_new(*f).unwrap();
        }
        store.save().unwrap();
        FactStore::load(store_path(dir)).unwrap().facts().to_vec()
    }

    #[test]
    fn roundtrip_empty_store() {
        let dir = tempfile::tempdir().expect("tmp dir");
        assert!(roundtrip(&dir, &[]).is_empty());
    }

    #[test]
    fn roundtrip_single_fact() {
        let dir = tempfile::tempdir().expect("tmp dir");
        assert_eq!(roundtrip(&dir, &["I like coffee."]), ["I like coffee."]);
    }

    #[test]
    fn roundtrip_awkward_strings() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let facts = [
            "I like coffee.",
            "My wife likes \"jazz\".",
            "I like a | b.",
            "I like ünïcode ☕.",
            "I like back\\slashes and\ttabs.",
            "",
        ];
        assert_eq!(roundtrip(&dir, &facts), facts);
    }

    // ── append_if_new ────────────────────────────────────────────────────────

    #[test]
    fn append_if_new_reports_whether_it_appended() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let mut store = FactStore::empty(store_path(&dir));
        assert!(store.append_if_new("I like coffee.").unwrap());
        assert!(!store.append_if_new("I like coffee.").unwrap());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn append_if_new_duplicate_does_not_save() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let mut store = FactStore::empty(store_path(&dir));
        store.append_if_new("I like coffee.").unwrap();

        // If the duplicate append saved, the file would reappear.
        fs::remove_file(store_path(&dir)).unwrap();
        store.append_if_new("I like coffee.").unwrap();
        assert!(!store_path(&dir).exists());
    }

    #[test]
    fn append_if_new_is_case_sensitive() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let mut store = FactStore::empty(store_path(&dir));
        store.append_if_new("I like coffee.").unwrap();
        assert!(store.append_if_new("I like Coffee.").unwrap());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn insertion_order_survives_reload() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let mut store = FactStore::load(store_path(&dir)).unwrap();
        for f in ["c.", "a.", "b."] {
            store.append_if_new(f).unwrap();
        }
        drop(store);

        let mut reloaded = FactStore::load(store_path(&dir)).unwrap();
        assert_eq!(reloaded.facts(), ["c.", "a.", "b."]);
        reloaded.append_if_new("d.").unwrap();
        let again = FactStore::load(store_path(&dir)).unwrap();
        assert_eq!(again.facts(), ["c.", "a.", "b.", "d."]);
    }
}
