//! Option normalization.
//!
//! Coerces every accepted option representation into one ordered list of
//! `CanonicalOption`. Normalization is entry-local: a malformed entry never
//! changes how its siblings are read, and the original order is kept.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::model::{OptionsField, RawOptionEntry};

/// Number of blank slots used when no options are available.
pub const DEFAULT_OPTION_COUNT: usize = 4;

/// Keys checked, in order, for an option object's text.
pub const TEXT_KEYS: [&str; 3] = ["text", "option_text", "content"];

/// The normalized option shape used everywhere past ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalOption {
    /// 0-based rank in presentation order.
    pub index: usize,
    pub text: String,
    pub is_correct: bool,
    pub image_path: Option<String>,
}

impl CanonicalOption {
    pub fn blank(index: usize) -> Self {
        Self {
            index,
            text: String::new(),
            is_correct: false,
            image_path: None,
        }
    }

    pub fn label(&self) -> String {
        option_label(self.index)
    }

    /// Flatten to the structured object shape the collaborator stores.
    pub fn to_entry(&self) -> RawOptionEntry {
        let mut map = Map::new();
        map.insert("text".into(), Value::String(self.text.clone()));
        map.insert("is_correct".into(), Value::Bool(self.is_correct));
        map.insert(
            "image_path".into(),
            self.image_path
                .clone()
                .map(Value::String)
                .unwrap_or(Value::Null),
        );
        RawOptionEntry::Object(map)
    }
}

/// Letter label for a position: `A` for 0, `B` for 1, ...
///
/// Positions past `Z` fall back to a 1-based number.
pub fn option_label(index: usize) -> String {
    if index < 26 {
        char::from(b'A' + index as u8).to_string()
    } else {
        format!("#{}", index + 1)
    }
}

/// Inverse of `option_label` for single letters (case-insensitive).
pub fn label_index(label: &str) -> Option<usize> {
    let mut chars = label.trim().chars();
    let c = chars.next()?.to_ascii_uppercase();
    if chars.next().is_some() || !c.is_ascii_uppercase() {
        return None;
    }
    Some((c as u8 - b'A') as usize)
}

/// Normalize an options field into canonical options.
///
/// Absent, unrecognized or empty fields yield `DEFAULT_OPTION_COUNT` blank
/// options so a question never renders with zero option slots.
pub fn normalize(field: &OptionsField) -> Vec<CanonicalOption> {
    let entries = field.entries();
    if entries.is_empty() {
        if let OptionsField::Other(value) = field {
            tracing::debug!("options field has unsupported shape, using blanks: {value}");
        }
        return blank_options();
    }

    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| clean_entry(index, entry))
        .collect()
}

/// `DEFAULT_OPTION_COUNT` blank options.
pub fn blank_options() -> Vec<CanonicalOption> {
    (0..DEFAULT_OPTION_COUNT).map(CanonicalOption::blank).collect()
}

/// Clean a single raw entry at the given position.
pub fn clean_entry(index: usize, entry: &RawOptionEntry) -> CanonicalOption {
    match entry {
        RawOptionEntry::Text(text) => CanonicalOption {
            index,
            text: text.clone(),
            is_correct: false,
            image_path: None,
        },
        RawOptionEntry::Object(map) => CanonicalOption {
            index,
            text: object_text(map),
            is_correct: map.get("is_correct").map(truthy).unwrap_or(false),
            image_path: map
                .get("image_path")
                .and_then(Value::as_str)
                .map(str::to_string),
        },
        RawOptionEntry::Scalar(value) => {
            tracing::debug!("option {} is not an object, coercing to text", option_label(index));
            CanonicalOption {
                index,
                text: scalar_text(value),
                is_correct: false,
                image_path: None,
            }
        }
    }
}

// First of TEXT_KEYS holding a non-empty value wins.
fn object_text(map: &Map<String, Value>) -> String {
    TEXT_KEYS
        .iter()
        .filter_map(|key| map.get(*key))
        .map(scalar_text)
        .find(|text| !text.is_empty())
        .unwrap_or_default()
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => s.eq_ignore_ascii_case("true"),
        _ => false,
    }
}
