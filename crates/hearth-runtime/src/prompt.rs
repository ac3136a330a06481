//! Prompt composition.
//!
//! Every turn is grounded in one user-role prompt of the fixed shape
//!
//! ```text
//! You currently remember: {facts}. {context} User said: {utterance}
//! ```
//!
//! where `{facts}` is the stored facts joined with `" | "` and `{context}`
//! describes what is currently perceived and ends in `.`. The exact
//! bytes matter: downstream prompt regressions are diffed against this
//! format.
//!
//! # Example
//!
//! ```rust
//! use hearth_runtime::prompt::compose;
//! use hearth_types::PerceptualContext;
//!
//! let facts = vec!["I like coffee.".to_string()];
//! let prompt = compose(&facts, &PerceptualContext::objects(["cup", "cup"]), "Any ideas?");
//! assert_eq!(
//!     prompt,
//!     "You currently remember: I like coffee.. cup. User said: Any ideas?"
//! );
//! ```

use std::collections::HashSet;

use hearth_types::PerceptualContext;

/// Substituted for the fact list when nothing has been remembered.
pub const NO_MEMORIES: &str = "no stored memories yet";
/// Substituted for the label list when the detector found nothing.
pub const NOTHING_SEEN: &str = "nothing obvious";
/// Context sentence when a form submission carried an image.
pub const IMAGE_PROVIDED: &str = "The user has shared an image.";
/// Context sentence when a form submission carried no image.
pub const NO_IMAGE: &str = "No image was shared.";

const FACT_SEPARATOR: &str = " | ";
const LABEL_SEPARATOR: &str = ", ";

/// Build the prompt for one turn. Pure; performs no I/O.
pub fn compose(facts: &[String], context: &PerceptualContext, utterance: &str) -> String {
    format!(
        "You currently remember: {}. {} User said: {}",
        render_facts(facts),
        render_context(context),
        utterance
    )
}

/// Join `facts` in stored order, or [`NO_MEMORIES`] if there are none.
pub fn render_facts(facts: &[String]) -> String {
    if facts.is_empty() {
        NO_MEMORIES.to_string()
    } else {
        facts.join(FACT_SEPARATOR)
    }
}

/// Describe `context` as a phrase ending in `.`.
///
/// Labels render bare (`"cat, dog."`); image flags render as a sentence.
///
/// Detector labels are de-duplicated keeping the order in which each label
/// was first reported, so the same frame always renders the same prompt.
pub fn render_context(context: &PerceptualContext) -> String {
    match context {
        PerceptualContext::Objects(labels) => {
            let mut seen = HashSet::new();
            let unique: Vec<&str> = labels
                .iter()
                .map(String::as_str)
                .filter(|l| seen.insert(*l))
                .collect();
            if unique.is_empty() {
                format!("{NOTHING_SEEN}.")
            } else {
                format!("{}.", unique.join(LABEL_SEPARATOR))
            }
        }
        PerceptualContext::Image { provided: true } => IMAGE_PROVIDED.to_string(),
        PerceptualContext::Image { provided: false } => NO_IMAGE.to_string(),
    }
}
