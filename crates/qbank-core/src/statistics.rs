//! Client-side filtering and summary statistics.
//!
//! Filters narrow a borrowed collection and never modify it. Statistics are
//! always computed over the full collection so headline counters stay put
//! while the visible subset changes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::image::ImageResolver;
use crate::model::{Language, QuestionType, RawQuestion, StatsResponse};
use crate::view::media_summary;

/// Conjunctive filter criteria. `None` means "not applied".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub language: Option<Language>,
    pub question_type: Option<QuestionType>,
    /// Tri-state: match questions with (`true`) or without (`false`) images.
    pub has_images: Option<bool>,
}

impl FilterCriteria {
    pub fn is_empty(&self) -> bool {
        self.language.is_none() && self.question_type.is_none() && self.has_images.is_none()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn matches(&self, question: &RawQuestion, resolver: &ImageResolver) -> bool {
        if self.language.is_some_and(|l| l != question.language) {
            return false;
        }
        if self.question_type.is_some_and(|t| t != question.question_type) {
            return false;
        }
        match self.has_images {
            Some(wanted) => media_summary(question, resolver).has_any_image == wanted,
            None => true,
        }
    }

    /// Query parameters for server-side filtering, in a stable order.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(language) = self.language {
            pairs.push(("language", language.to_string()));
        }
        if let Some(question_type) = self.question_type {
            pairs.push(("type", question_type.to_string()));
        }
        if let Some(has_images) = self.has_images {
            pairs.push(("has_images", has_images.to_string()));
        }
        pairs
    }
}

/// Questions matching `criteria`, in collection order.
pub fn filter<'a>(
    collection: &'a [RawQuestion],
    criteria: &FilterCriteria,
    resolver: &ImageResolver,
) -> Vec<&'a RawQuestion> {
    collection
        .iter()
        .filter(|q| criteria.matches(q, resolver))
        .collect()
}

/// Summary counters for a question collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionStats {
    pub total: usize,
    pub per_language: BTreeMap<Language, usize>,
    pub with_question_images: usize,
    pub with_solution_images: usize,
    pub with_option_images: usize,
}

impl QuestionStats {
    pub fn language_count(&self, language: Language) -> usize {
        self.per_language.get(&language).copied().unwrap_or(0)
    }
}

/// Aggregate counters over the whole collection.
pub fn aggregate(collection: &[RawQuestion], resolver: &ImageResolver) -> QuestionStats {
    let mut stats = QuestionStats {
        total: collection.len(),
        ..Default::default()
    };
    for language in Language::ALL {
        stats.per_language.insert(language, 0);
    }

    for question in collection {
        *stats.per_language.entry(question.language).or_default() += 1;
        let media = media_summary(question, resolver);
        if media.has_question_image {
            stats.with_question_images += 1;
        }
        if media.has_solution_image {
            stats.with_solution_images += 1;
        }
        if media.has_any_option_image {
            stats.with_option_images += 1;
        }
    }

    stats
}

impl From<StatsResponse> for QuestionStats {
    fn from(response: StatsResponse) -> Self {
        let mut per_language: BTreeMap<Language, usize> =
            Language::ALL.iter().map(|l| (*l, 0)).collect();
        for row in response.language_distribution {
            match row.language.parse::<Language>() {
                Ok(language) => *per_language.entry(language).or_default() += row.count,
                Err(e) => tracing::debug!("skipping stats row: {e}"),
            }
        }

        Self {
            total: response.summary.total_questions,
            per_language,
            with_question_images: response.image_stats.with_question_images,
            with_solution_images: response.image_stats.with_solution_images,
            with_option_images: response.image_stats.with_option_images,
        }
    }
}
