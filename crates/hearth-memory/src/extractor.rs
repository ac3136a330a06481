//! Fact Extractor.
//!
//! Decides whether an utterance states a household preference worth
//! remembering. The rule is a literal substring match on the lowercased
//! utterance, so it also fires on phrases such as
//! `"I really dislike it but I like pie"`. That breadth is a known
//! limitation and is kept deliberately stable: stored memories from earlier
//! sessions were produced by exactly this rule.

/// Lowercased substrings that mark an utterance as a preference fact.
pub const FACT_TRIGGERS: [&str; 2] = ["i like", "my wife likes"];

/// Extract a storable fact from `utterance`.
///
/// Returns `None` when no trigger phrase occurs. Otherwise returns the
/// original-case utterance with surrounding whitespace and `.` characters
/// removed and exactly one `.` appended.
///
/// ```rust
/// use hearth_memory::extractor::extract;
///
/// assert_eq!(extract("I like coffee").as_deref(), Some("I like coffee."));
/// assert_eq!(extract("I dislike mornings"), None);
/// ```
pub fn extract(utterance: &str) -> Option<String> {
    let lowered = utterance.to_lowercase();
    if !FACT_TRIGGERS.iter().any(|t| lowered.contains(t)) {
        return None;
    }
    let core = utterance.trim_matches(|c: char| c == '.' || c.is_whitespace());
    Some(format!("{core}."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_preference_gets_trailing_period() {
        assert_eq!(extract("I like coffee").as_deref(), Some("I like coffee."));
    }

    #[test]
    fn existing_period_is_not_doubled() {
        assert_eq!(
            extract("My wife likes jazz.").as_deref(),
            Some("My wife likes jazz.")
        );
    }

    #[test]
    fn trigger_may_appear_mid_sentence() {
        assert_eq!(
            extract("I really like pizza").as_deref(),
            Some("I really like pizza.")
        );
        assert_eq!(
            extract("Honestly, I like rainy days").as_deref(),
            Some("Honestly, I like rainy days.")
        );
    }

    #[test]
    fn matching_ignores_case_but_storage_keeps_it() {
        assert_eq!(
            extract("MY WIFE LIKES Tulips").as_deref(),
            Some("MY WIFE LIKES Tulips.")
        );
    }

    #[test]
    fn surrounding_dots_and_whitespace_are_trimmed() {
        assert_eq!(
            extract("  I like tea...  \n").as_deref(),
            Some("I like tea.")
        );
        assert_eq!(extract(". I like tea . ").as_deref(), Some("I like tea."));
    }

    #[test]
    fn non_matching_utterances_yield_nothing() {
        assert_eq!(extract("I dislike mornings"), None);
        assert_eq!(extract("What do you like?"), None);
        assert_eq!(extract("My husband likes golf"), None);
        assert_eq!(extract(""), None);
    }

    #[test]
    fn broad_substring_match_is_preserved() {
        // Known limitation: "dislike" alone does not match, but any later
        // "i like" in the sentence does.
        assert_eq!(
            extract("I really dislike it but I like pie").as_deref(),
            Some("I really dislike it but I like pie.")
        );
        assert_eq!(extract("Wi likely").as_deref(), Some("Wi likely."));
    }
}
