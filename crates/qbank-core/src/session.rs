//! Edit session state machine.
//!
//! A session is either browsing the list or editing exactly one draft.
//! Defaults are applied once, when the draft is created; validation runs
//! once, when the draft is submitted. Tab changes never validate.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::answer::{derive_answer, DerivedAnswer};
use crate::error::ValidationError;
use crate::model::{Language, OptionsField, QuestionType, RawOptionEntry, RawQuestion};
use crate::options::{blank_options, clean_entry, normalize, option_label, CanonicalOption};

/// Editor tabs. Focus only; no tab carries its own validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditorTab {
    #[default]
    Question,
    Options,
    Solution,
    Settings,
}

/// A working copy of a question being edited.
#[derive(Debug, Clone, PartialEq)]
pub struct EditDraft {
    question: RawQuestion,
    pub active_tab: EditorTab,
}

impl EditDraft {
    /// Copy `question` into a new draft and seed its defaults.
    pub fn new(question: &RawQuestion) -> Self {
        let mut question = question.clone();
        ensure_defaults(&mut question);
        Self {
            question,
            active_tab: EditorTab::default(),
        }
    }

    pub fn question(&self) -> &RawQuestion {
        &self.question
    }

    pub fn id(&self) -> &str {
        &self.question.id
    }

    pub fn set_question_text(&mut self, text: impl Into<String>) {
        self.question.question_text = text.into();
    }

    pub fn set_question_type(&mut self, question_type: QuestionType) {
        self.question.question_type = question_type;
    }

    /// Any value is accepted here; non-positive marks are rejected at save.
    pub fn set_marks(&mut self, marks: i64) {
        self.question.marks = marks;
    }

    pub fn set_language(&mut self, language: Language) {
        self.question.language = language;
    }

    pub fn set_correct_answer(&mut self, answer: impl Into<String>) {
        self.question.correct_answer = Some(answer.into());
    }

    pub fn set_solution(&mut self, solution: impl Into<String>) {
        self.question.solution = Some(solution.into());
    }

    pub fn set_image_path(&mut self, path: Option<String>) {
        self.question.image_path = path;
    }

    pub fn set_solution_image_path(&mut self, path: Option<String>) {
        self.question.solution_image_path = path;
    }

    pub fn remove_question_image(&mut self) {
        self.question.image_path = None;
    }

    pub fn remove_solution_image(&mut self) {
        self.question.solution_image_path = None;
    }

    /// Current options in canonical form.
    pub fn options(&self) -> Vec<CanonicalOption> {
        normalize(&self.question.options)
    }

    pub fn option_count(&self) -> usize {
        self.entries().len()
    }

    pub fn set_option_text(
        &mut self,
        index: usize,
        text: impl Into<String>,
    ) -> Result<(), ValidationError> {
        let object = self.option_object_mut(index)?;
        object.insert("text".into(), Value::String(text.into()));
        Ok(())
    }

    pub fn set_option_correct(&mut self, index: usize, correct: bool) -> Result<(), ValidationError> {
        let object = self.option_object_mut(index)?;
        object.insert("is_correct".into(), Value::Bool(correct));
        Ok(())
    }

    /// Flag exactly the options at `indices` as correct and clear the rest.
    pub fn set_correct_options(&mut self, indices: &[usize]) -> Result<(), ValidationError> {
        if let Some(&bad) = indices.iter().find(|&&i| i >= self.option_count()) {
            return Err(ValidationError::UnknownOption(option_label(bad)));
        }
        for index in 0..self.option_count() {
            self.set_option_correct(index, indices.contains(&index))?;
        }
        Ok(())
    }

    pub fn set_option_image(
        &mut self,
        index: usize,
        path: Option<String>,
    ) -> Result<(), ValidationError> {
        let object = self.option_object_mut(index)?;
        object.insert(
            "image_path".into(),
            path.map(Value::String).unwrap_or(Value::Null),
        );
        Ok(())
    }

    /// Append a blank option and return its position.
    pub fn add_option(&mut self) -> usize {
        let entries = self.entries_mut();
        let index = entries.len();
        entries.push(CanonicalOption::blank(index).to_entry());
        index
    }

    /// Remove the option at `index`. The last remaining option stays.
    pub fn remove_option(&mut self, index: usize) -> Result<(), ValidationError> {
        let entries = self.entries_mut();
        if index >= entries.len() {
            return Err(ValidationError::UnknownOption(option_label(index)));
        }
        if entries.len() == 1 {
            return Err(ValidationError::LastOption);
        }
        entries.remove(index);
        Ok(())
    }

    /// Live answer preview; backs the "no correct answer selected" warning.
    pub fn answer_preview(&self) -> DerivedAnswer {
        derive_answer(&self.question, &self.options())
    }

    /// Validate and flatten the draft into a record for the collaborator.
    ///
    /// Marks must be positive. Multiple-choice options are cleaned into the
    /// structured object shape. Empty optional strings become absent.
    pub fn to_submission(&self) -> Result<RawQuestion, ValidationError> {
        if self.question.marks <= 0 {
            return Err(ValidationError::NonPositiveMarks(self.question.marks));
        }

        let mut submission = self.question.clone();
        for field in [
            &mut submission.correct_answer,
            &mut submission.solution,
            &mut submission.image_path,
            &mut submission.solution_image_path,
        ] {
            if field.as_deref().is_some_and(str::is_empty) {
                *field = None;
            }
        }

        if submission.question_type.is_multiple_choice() {
            let cleaned = submission
                .options
                .entries()
                .into_iter()
                .enumerate()
                .map(|(index, entry)| clean_entry(index, entry).to_entry())
                .collect();
            submission.options = OptionsField::Sequence(cleaned);
        }

        Ok(submission)
    }

    fn entries(&self) -> Vec<&RawOptionEntry> {
        self.question.options.entries()
    }

    // ensure_defaults leaves a non-empty sequence; this keeps it one.
    fn entries_mut(&mut self) -> &mut Vec<RawOptionEntry> {
        if !matches!(self.question.options, OptionsField::Sequence(_)) {
            ensure_options(&mut self.question.options);
        }
        match &mut self.question.options {
            OptionsField::Sequence(entries) => entries,
            _ => unreachable!("ensure_options always produces a sequence"),
        }
    }

    // Upgrade a plain or scalar entry to an object so it can carry flags.
    fn option_object_mut(&mut self, index: usize) -> Result<&mut Map<String, Value>, ValidationError> {
        let entry = self
            .entries_mut()
            .get_mut(index)
            .ok_or_else(|| ValidationError::UnknownOption(option_label(index)))?;
        if !matches!(entry, RawOptionEntry::Object(_)) {
            *entry = clean_entry(index, entry).to_entry();
        }
        match entry {
            RawOptionEntry::Object(map) => Ok(map),
            _ => unreachable!("entry was just converted to an object"),
        }
    }
}

/// Seed canonical defaults on a fresh draft.
///
/// Missing, empty or unrecognized options become four blank structured
/// options and a keyed mapping becomes an ordered list. Zero marks become 1;
/// negative marks are kept so the save gate can report them.
pub fn ensure_defaults(question: &mut RawQuestion) {
    ensure_options(&mut question.options);
    if question.marks == 0 {
        question.marks = 1;
    }
}

fn ensure_options(options: &mut OptionsField) {
    let seeded = match std::mem::take(options) {
        OptionsField::Sequence(entries) if !entries.is_empty() => entries,
        OptionsField::Keyed(pairs) if !pairs.is_empty() => {
            pairs.into_iter().map(|(_, entry)| entry).collect()
        }
        _ => blank_options()
            .iter()
            .map(CanonicalOption::to_entry)
            .collect(),
    };
    *options = OptionsField::Sequence(seeded);
}

/// Browsing or editing one draft.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum EditSession {
    #[default]
    Browsing,
    Editing(EditDraft),
}

impl EditSession {
    /// Enter editing for `question`. Any active draft is discarded.
    pub fn begin(&mut self, question: &RawQuestion) -> &mut EditDraft {
        if let EditSession::Editing(previous) = self {
            tracing::debug!(
                previous = %previous.id(),
                next = %question.id,
                "replacing active draft"
            );
        }
        *self = EditSession::Editing(EditDraft::new(question));
        match self {
            EditSession::Editing(draft) => draft,
            EditSession::Browsing => unreachable!("session was just set to editing"),
        }
    }

    /// Discard the draft unconditionally. Returns it, if there was one.
    pub fn cancel(&mut self) -> Option<EditDraft> {
        match std::mem::take(self) {
            EditSession::Editing(draft) => Some(draft),
            EditSession::Browsing => None,
        }
    }

    pub fn is_editing(&self) -> bool {
        matches!(self, EditSession::Editing(_))
    }

    pub fn draft(&self) -> Option<&EditDraft> {
        match self {
            EditSession::Editing(draft) => Some(draft),
            EditSession::Browsing => None,
        }
    }

    pub fn draft_mut(&mut self) -> Option<&mut EditDraft> {
        match self {
            EditSession::Editing(draft) => Some(draft),
            EditSession::Browsing => None,
        }
    }

    /// Validate the active draft. The session is left unchanged.
    pub fn prepare_save(&self) -> Result<RawQuestion, ValidationError> {
        self.draft()
            .ok_or(ValidationError::NotEditing)?
            .to_submission()
    }

    /// Return to browsing after the collaborator accepted the save.
    pub fn finish_save(&mut self) {
        *self = EditSession::Browsing;
    }
}
