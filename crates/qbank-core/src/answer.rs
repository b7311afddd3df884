//! Correct-answer derivation.

use serde::{Deserialize, Serialize};

use crate::model::RawQuestion;
use crate::options::{label_index, CanonicalOption};

/// The answer shown for a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum DerivedAnswer {
    /// The record's own `correct_answer`, verbatim.
    Explicit(String),
    /// Letters of the options flagged correct, in order. Never empty.
    Labels(Vec<String>),
    /// Multiple choice with nothing flagged. Rendered as a warning.
    NoneSelected,
    /// Non-choice question without an explicit answer.
    NotApplicable,
}

impl DerivedAnswer {
    /// Text for the "Correct Answer" badge, if there is one.
    pub fn display(&self) -> Option<String> {
        match self {
            DerivedAnswer::Explicit(answer) => Some(answer.clone()),
            DerivedAnswer::Labels(labels) => Some(labels.join(", ")),
            DerivedAnswer::NoneSelected | DerivedAnswer::NotApplicable => None,
        }
    }

    pub fn is_warning(&self) -> bool {
        matches!(self, DerivedAnswer::NoneSelected)
    }
}

/// Derive the answer for a question from its explicit field or option flags.
///
/// A non-empty explicit `correct_answer` always wins, even when it
/// disagrees with the option flags.
pub fn derive_answer(question: &RawQuestion, options: &[CanonicalOption]) -> DerivedAnswer {
    if let Some(answer) = explicit_answer(question) {
        return DerivedAnswer::Explicit(answer.to_string());
    }

    if !question.question_type.is_multiple_choice() {
        return DerivedAnswer::NotApplicable;
    }

    let labels: Vec<String> = options
        .iter()
        .filter(|o| o.is_correct)
        .map(CanonicalOption::label)
        .collect();

    if labels.is_empty() {
        DerivedAnswer::NoneSelected
    } else {
        DerivedAnswer::Labels(labels)
    }
}

fn explicit_answer(question: &RawQuestion) -> Option<&str> {
    question
        .correct_answer
        .as_deref()
        .filter(|a| !a.is_empty())
}

/// Whether the option at `index` is shown as correct.
///
/// Flagged options always are; otherwise a single-letter explicit answer
/// naming this position marks it.
pub fn is_option_marked(question: &RawQuestion, option: &CanonicalOption) -> bool {
    if option.is_correct {
        return true;
    }
    explicit_answer(question)
        .and_then(label_index)
        .is_some_and(|i| i == option.index)
}

/// Describes an explicit letter answer that disagrees with option flags.
///
/// Only multiple-choice questions with at least one flagged option and a
/// single-letter explicit answer are checked. The explicit answer still
/// wins for display; this is reported, not reconciled.
pub fn answer_conflict(question: &RawQuestion, options: &[CanonicalOption]) -> Option<String> {
    if !question.question_type.is_multiple_choice() {
        return None;
    }
    let explicit = explicit_answer(question)?;
    let explicit_index = label_index(explicit)?;

    let flagged: Vec<&CanonicalOption> = options.iter().filter(|o| o.is_correct).collect();
    if flagged.is_empty() || flagged.iter().any(|o| o.index == explicit_index) {
        return None;
    }

    let flagged_labels: Vec<String> = flagged.iter().map(|o| o.label()).collect();
    Some(format!(
        "correct_answer is {} but options flag {}",
        explicit.trim(),
        flagged_labels.join(", ")
    ))
}
