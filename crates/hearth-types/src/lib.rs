use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Utterances that end an interactive session (compared case-insensitively).
pub const QUIT_COMMANDS: [&str; 3] = ["quit", "exit", "stop"];

/// Returns `true` if `utterance` is one of the [`QUIT_COMMANDS`].
///
/// Surrounding whitespace is ignored so that a trailing newline from a
/// terminal read does not keep the session alive.
pub fn is_quit_command(utterance: &str) -> bool {
    let lowered = utterance.trim().to_lowercase();
    QUIT_COMMANDS.iter().any(|q| *q == lowered)
}

/// What the assistant can currently perceive, recomputed every turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload")]
pub enum PerceptualContext {
    /// Labels reported by an object detector for the current frame.
    /// May be empty and may contain repeats (one entry per detection).
    Objects(Vec<String>),
    /// Form-based front ends only know whether an image was attached.
    Image { provided: bool },
}

impl PerceptualContext {
    /// A detector context with nothing detected.
    pub fn nothing_seen() -> Self {
        PerceptualContext::Objects(Vec::new())
    }

    /// Build a detector context from any iterator of labels.
    pub fn objects<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        PerceptualContext::Objects(labels.into_iter().map(Into::into).collect())
    }
}

impl Default for PerceptualContext {
    fn default() -> Self {
        Self::nothing_seen()
    }
}

/// Top-level error type for a household assistant session.
///
/// Fact store failures keep their own `MemoryError` type: load failures abort
/// start-up and persist failures are reported per turn, never through here.
#[derive(Error, Debug, Serialize, Deserialize)]
pub enum HearthError {
    #[error("LLM Driver Error: {0}")]
    LlmInferenceFailed(String),

    #[error("Perception Fault on {component}: {details}")]
    Perception { component: String, details: String },

    #[error("Empty utterance")]
    EmptyUtterance,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quit_commands_are_case_insensitive() {
        assert!(is_quit_command("quit"));
        assert!(is_quit_command("EXIT"));
        assert!(is_quit_command("  Stop\n"));
    }

    #[test]
    fn quit_command_must_be_whole_utterance() {
        assert!(!is_quit_command("please stop talking"));
        assert!(!is_quit_command("quitting"));
        assert!(!is_quit_command(""));
    }

    #[test]
    fn objects_constructor_keeps_repeats() {
        let ctx = PerceptualContext::objects(["cat", "cat", "dog"]);
        assert_eq!(
            ctx,
            PerceptualContext::Objects(vec!["cat".into(), "cat".into(), "dog".into()])
        );
    }

    #[test]
    fn default_context_sees_nothing() {
        assert_eq!(PerceptualContext::default(), PerceptualContext::Objects(vec![]));
    }

    #[test]
    fn perceptual_context_image_roundtrip() {
        let ctx = PerceptualContext::Image { provided: true };
        let json = serde_json::to_string(&ctx).unwrap();
        let back: PerceptualContext = serde_json::from_str(&json).unwrap();
        assert_eq!(ctx, back);
    }

    #[test]
    fn hearth_error_display() {
        let err = HearthError::Perception {
            component: "front_rgb".to_string(),
            details: "device busy".to_string(),
        };
        assert!(err.to_string().contains("front_rgb"));
        assert_eq!(HearthError::EmptyUtterance.to_string(), "Empty utterance");
    }
}
