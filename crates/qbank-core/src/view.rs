//! Question view-model builder.
//!
//! Composes image resolution, option normalization and answer derivation
//! into one render-ready projection of a raw record. Views are rebuilt on
//! every refresh and never stored.

use serde::{Deserialize, Serialize};

use crate::answer::{answer_conflict, derive_answer, is_option_marked, DerivedAnswer};
use crate::image::{ImageRef, ImageResolver};
use crate::model::RawQuestion;
use crate::options::{normalize, CanonicalOption};

/// Media presence flags for one question.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaSummary {
    pub has_question_image: bool,
    pub has_solution_image: bool,
    pub has_any_option_image: bool,
    pub has_any_image: bool,
}

impl MediaSummary {
    fn new(question: bool, solution: bool, any_option: bool) -> Self {
        Self {
            has_question_image: question,
            has_solution_image: solution,
            has_any_option_image: any_option,
            has_any_image: question || solution || any_option,
        }
    }
}

/// Compute only the media flags, without building a full view.
pub fn media_summary(raw: &RawQuestion, resolver: &ImageResolver) -> MediaSummary {
    let any_option = normalize(&raw.options)
        .iter()
        .any(|o| resolver.resolve(o.image_path.as_deref()).is_some());
    MediaSummary::new(
        resolver.resolve(raw.image_path.as_deref()).is_some(),
        resolver.resolve(raw.solution_image_path.as_deref()).is_some(),
        any_option,
    )
}

/// One option as rendered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionView {
    pub option: CanonicalOption,
    pub label: String,
    pub image: ImageRef,
    /// Shown as correct: flagged, or named by a single-letter explicit answer.
    pub highlighted: bool,
}

impl OptionView {
    /// Option text, or an `Option X` placeholder when it is empty.
    pub fn display_text(&self) -> String {
        if self.option.text.is_empty() {
            format!("Option {}", self.label)
        } else {
            self.option.text.clone()
        }
    }
}

/// Render-ready projection of a `RawQuestion`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionViewModel {
    pub question: RawQuestion,
    pub options: Vec<OptionView>,
    pub answer: DerivedAnswer,
    pub question_image: ImageRef,
    pub solution_image: ImageRef,
    #[serde(flatten)]
    pub media: MediaSummary,
    /// Set when the explicit answer disagrees with the option flags.
    pub answer_conflict: Option<String>,
}

impl QuestionViewModel {
    pub fn id(&self) -> &str {
        &self.question.id
    }

    pub fn language_badge(&self) -> &'static str {
        self.question.language.badge()
    }

    pub fn type_badge(&self) -> &'static str {
        self.question.question_type.badge()
    }

    pub fn marks_label(&self) -> String {
        let marks = self.question.marks;
        if marks == 1 {
            "1 mark".to_string()
        } else {
            format!("{marks} marks")
        }
    }

    /// Whether the "no correct answer selected" warning applies.
    pub fn needs_answer_warning(&self) -> bool {
        self.answer.is_warning()
    }

    /// Mark the image at `slot` as failed to load, leaving the rest alone.
    pub fn mark_image_failed(&mut self, slot: ImageSlot) {
        match slot {
            ImageSlot::Question => self.question_image.mark_failed(),
            ImageSlot::Solution => self.solution_image.mark_failed(),
            ImageSlot::Option(index) => {
                if let Some(view) = self.options.get_mut(index) {
                    view.image.mark_failed();
                }
            }
        }
    }
}

/// Identifies one image slot of a view model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSlot {
    Question,
    Solution,
    Option(usize),
}

/// Build the view model for a raw question. The input is not modified.
pub fn build(raw: &RawQuestion, resolver: &ImageResolver) -> QuestionViewModel {
    let canonical = normalize(&raw.options);
    let answer = derive_answer(raw, &canonical);
    let conflict = answer_conflict(raw, &canonical);
    if let Some(conflict) = &conflict {
        tracing::warn!(question = %raw.id, "{conflict}");
    }

    let options: Vec<OptionView> = canonical
        .into_iter()
        .map(|option| OptionView {
            label: option.label(),
            image: resolver.image_ref(option.image_path.as_deref()),
            highlighted: is_option_marked(raw, &option),
            option,
        })
        .collect();

    let question_image = resolver.image_ref(raw.image_path.as_deref());
    let solution_image = resolver.image_ref(raw.solution_image_path.as_deref());
    let media = MediaSummary::new(
        question_image.is_present(),
        solution_image.is_present(),
        options.iter().any(|o| o.image.is_present()),
    );

    QuestionViewModel {
        question: raw.clone(),
        options,
        answer,
        question_image,
        solution_image,
        media,
        answer_conflict: conflict,
    }
}

/// Build views for every question in order.
pub fn build_all(raws: &[RawQuestion], resolver: &ImageResolver) -> Vec<QuestionViewModel> {
    raws.iter().map(|raw| build(raw, resolver)).collect()
}
