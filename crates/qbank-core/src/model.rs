//! Core data model types for qbank.
//!
//! These types mirror what the persistence collaborator sends and accepts.
//! Nothing here is trusted: the options field in particular arrives in
//! several shapes and is kept as a tagged union until it is normalized.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// A question record as stored by the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawQuestion {
    /// Record identifier. The server emits integers; kept as text.
    #[serde(default, deserialize_with = "id_from_string_or_number")]
    pub id: String,
    /// Question body (rich text markup).
    #[serde(default, deserialize_with = "null_as_default")]
    pub question_text: String,
    /// Rendered HTML produced by the document parser, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_html: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub question_type: QuestionType,
    /// Marks awarded. Only positive values can be saved.
    #[serde(default = "default_marks", deserialize_with = "marks_or_default")]
    pub marks: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub language: Language,
    /// Explicit answer, authoritative when present and non-empty.
    #[serde(default)]
    pub correct_answer: Option<String>,
    /// Worked solution (rich text markup).
    #[serde(default)]
    pub solution: Option<String>,
    /// Question image reference; may be a path, a filename or a sentinel.
    #[serde(default)]
    pub image_path: Option<String>,
    /// Solution image reference; same conventions as `image_path`.
    #[serde(default)]
    pub solution_image_path: Option<String>,
    /// Options in whatever shape the collaborator stored them.
    #[serde(default)]
    pub options: OptionsField,
}

fn default_marks() -> i64 {
    1
}

// Nullable columns come back as `null`; treat that like a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn marks_or_default<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<i64>::deserialize(deserializer)?.unwrap_or_else(default_marks))
}

impl RawQuestion {
    /// A blank multiple-choice question with the given identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            question_text: String::new(),
            question_html: None,
            question_type: QuestionType::default(),
            marks: default_marks(),
            language: Language::default(),
            correct_answer: None,
            solution: None,
            image_path: None,
            solution_image_path: None,
            options: OptionsField::Absent,
        }
    }
}

// Accepts `"17"` as well as `17`; a missing or null id becomes "".
fn id_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(String::new()),
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a string or integer id, got {other}"
        ))),
    }
}

/// Supported question types.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    #[default]
    MultipleChoice,
    Integer,
    FillUps,
    TrueFalse,
    Comprehension,
}

impl QuestionType {
    /// Every question type, in form order.
    pub const ALL: [QuestionType; 5] = [
        QuestionType::MultipleChoice,
        QuestionType::Integer,
        QuestionType::FillUps,
        QuestionType::TrueFalse,
        QuestionType::Comprehension,
    ];

    /// Short label shown on list badges.
    pub fn badge(self) -> &'static str {
        match self {
            QuestionType::MultipleChoice => "MCQ",
            QuestionType::Integer => "Integer",
            QuestionType::FillUps => "Fill Ups",
            QuestionType::TrueFalse => "True/False",
            QuestionType::Comprehension => "Comprehension",
        }
    }

    pub fn is_multiple_choice(self) -> bool {
        self == QuestionType::MultipleChoice
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionType::MultipleChoice => write!(f, "multiple_choice"),
            QuestionType::Integer => write!(f, "integer"),
            QuestionType::FillUps => write!(f, "fill_ups"),
            QuestionType::TrueFalse => write!(f, "true_false"),
            QuestionType::Comprehension => write!(f, "comprehension"),
        }
    }
}

impl FromStr for QuestionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "multiple_choice" | "mcq" => Ok(QuestionType::MultipleChoice),
            "integer" => Ok(QuestionType::Integer),
            "fill_ups" | "fill" => Ok(QuestionType::FillUps),
            "true_false" | "tf" => Ok(QuestionType::TrueFalse),
            "comprehension" => Ok(QuestionType::Comprehension),
            other => Err(format!("unknown question type: {other}")),
        }
    }
}

/// Question language tag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    Hindi,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::English, Language::Hindi];

    pub fn badge(self) -> &'static str {
        match self {
            Language::English => "EN",
            Language::Hindi => "HI",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::English => write!(f, "english"),
            Language::Hindi => write!(f, "hindi"),
        }
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "english" | "en" => Ok(Language::English),
            "hindi" | "hi" => Ok(Language::Hindi),
            other => Err(format!("unknown language: {other}")),
        }
    }
}

/// The options field exactly as it arrived, tagged by shape.
///
/// Deserialized from any JSON value; a keyed mapping keeps the order its
/// keys were sent in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum OptionsField {
    /// Missing or `null`.
    #[default]
    Absent,
    /// A JSON array.
    Sequence(Vec<RawOptionEntry>),
    /// A JSON object; values are options in key order.
    Keyed(Vec<(String, RawOptionEntry)>),
    /// Anything else (a bare string, number, ...).
    Other(Value),
}

impl OptionsField {
    /// Entries in presentation order; empty for `Absent` and `Other`.
    pub fn entries(&self) -> Vec<&RawOptionEntry> {
        match self {
            OptionsField::Sequence(entries) => entries.iter().collect(),
            OptionsField::Keyed(pairs) => pairs.iter().map(|(_, e)| e).collect(),
            OptionsField::Absent | OptionsField::Other(_) => Vec::new(),
        }
    }

    /// True when no usable entries are present.
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}

impl From<Value> for OptionsField {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => OptionsField::Absent,
            Value::Array(items) => {
                OptionsField::Sequence(items.into_iter().map(RawOptionEntry::from).collect())
            }
            Value::Object(map) => OptionsField::Keyed(
                map.into_iter()
                    .map(|(k, v)| (k, RawOptionEntry::from(v)))
                    .collect(),
            ),
            other => OptionsField::Other(other),
        }
    }
}

impl From<OptionsField> for Value {
    fn from(field: OptionsField) -> Self {
        match field {
            OptionsField::Absent => Value::Null,
            OptionsField::Sequence(entries) => {
                Value::Array(entries.into_iter().map(Value::from).collect())
            }
            OptionsField::Keyed(pairs) => Value::Object(
                pairs
                    .into_iter()
                    .map(|(k, e)| (k, Value::from(e)))
                    .collect::<Map<String, Value>>(),
            ),
            OptionsField::Other(value) => value,
        }
    }
}

/// One entry of a sequence or mapping of options.
#[derive(Debug, Clone, PartialEq)]
pub enum RawOptionEntry {
    /// A plain string option.
    Text(String),
    /// A structured option object.
    Object(Map<String, Value>),
    /// Anything else: number, bool, null, nested array.
    Scalar(Value),
}

impl RawOptionEntry {
    /// A structured option with the given text and flag.
    pub fn object(text: impl Into<String>, is_correct: bool) -> Self {
        let mut map = Map::new();
        map.insert("text".into(), Value::String(text.into()));
        map.insert("is_correct".into(), Value::Bool(is_correct));
        RawOptionEntry::Object(map)
    }
}

impl From<Value> for RawOptionEntry {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) => RawOptionEntry::Text(s),
            Value::Object(map) => RawOptionEntry::Object(map),
            other => RawOptionEntry::Scalar(other),
        }
    }
}

impl From<RawOptionEntry> for Value {
    fn from(entry: RawOptionEntry) -> Self {
        match entry {
            RawOptionEntry::Text(s) => Value::String(s),
            RawOptionEntry::Object(map) => Value::Object(map),
            RawOptionEntry::Scalar(v) => v,
        }
    }
}

/// Stats payload returned by the collaborator's stats endpoint.
///
/// Every section is optional on the wire and defaults to zeros.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub summary: StatsSummary,
    #[serde(default, deserialize_with = "null_as_default")]
    pub language_distribution: Vec<LanguageCount>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub image_stats: ImageStats,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsSummary {
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_questions: usize,
}

/// One row of the language distribution. The language is kept as text
/// because the server may report values this client does not know.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageCount {
    pub language: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageStats {
    #[serde(default, deserialize_with = "null_as_default")]
    pub with_question_images: usize,
    #[serde(default, deserialize_with = "null_as_default")]
    pub with_solution_images: usize,
    #[serde(default, deserialize_with = "null_as_default")]
    pub with_option_images: usize,
}

/// Result of a successful document upload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UploadReceipt {
    /// Identifiers of the records the parser created.
    #[serde(default, deserialize_with = "ids_from_strings_or_numbers")]
    pub question_ids: Vec<String>,
}

impl UploadReceipt {
    pub fn created(&self) -> usize {
        self.question_ids.len()
    }
}

fn ids_from_strings_or_numbers<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(values
        .into_iter()
        .map(|v| match v {
            Value::String(s) => s,
            other => other.to_string(),
        })
        .collect())
}
