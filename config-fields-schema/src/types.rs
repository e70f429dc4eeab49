//! Field descriptor model.
//!
//! A [`FieldDescriptor`] is one config field as the form builder edits it.
//! The variant-specific attributes live in [`FieldKind`], a closed sum type,
//! so every match over field kinds is checked for exhaustiveness.
//!
//! Descriptors serialize to the flat JSON shape the editor works with:
//! `{"name": "...", "type": "number", "required": true, "minimum": 1}`.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::error::{Result, TranscodeError};

/// The tag identifying one of the nine field kinds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Number,
    Boolean,
    Array,
    Enumeration,
    Item,
    Country,
    Duration,
    Role,
}

impl FieldType {
    /// All field kinds, in declaration order.
    pub const ALL: [FieldType; 9] = [
        FieldType::Text,
        FieldType::Number,
        FieldType::Boolean,
        FieldType::Array,
        FieldType::Enumeration,
        FieldType::Item,
        FieldType::Country,
        FieldType::Duration,
        FieldType::Role,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::Array => "array",
            FieldType::Enumeration => "enumeration",
            FieldType::Item => "item",
            FieldType::Country => "country",
            FieldType::Duration => "duration",
            FieldType::Role => "role",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Default value of a selection-style field: one value, or several when the
/// field allows multiple selections.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Selection {
    One(String),
    Many(Vec<String>),
}

impl From<&str> for Selection {
    fn from(value: &str) -> Self {
        Selection::One(value.to_string())
    }
}

impl From<Vec<String>> for Selection {
    fn from(values: Vec<String>) -> Self {
        Selection::Many(values)
    }
}

impl From<Selection> for Value {
    fn from(selection: Selection) -> Self {
        match selection {
            Selection::One(v) => Value::String(v),
            Selection::Many(vs) => Value::Array(vs.into_iter().map(Value::String).collect()),
        }
    }
}

/// Variant-specific attributes of a field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum FieldKind {
    Text {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min_length: Option<u64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_length: Option<u64>,
    },
    Number {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<Number>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        minimum: Option<Number>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        maximum: Option<Number>,
    },
    Boolean {
        #[serde(default)]
        default: bool,
    },
    Array {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<Vec<String>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min_items: Option<u64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_items: Option<u64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        unique_items: Option<bool>,
    },
    Enumeration {
        values: Vec<String>,
        #[serde(default)]
        multiple: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<Selection>,
    },
    /// Game item picker. The default is object-shaped (or a list of objects
    /// when `multiple`) and is passed through untouched.
    Item {
        #[serde(default)]
        multiple: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<Value>,
    },
    Country {
        #[serde(default)]
        multiple: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<Selection>,
    },
    /// Duration in milliseconds.
    Duration {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<Number>,
    },
    Role {
        #[serde(default)]
        multiple: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<Selection>,
    },
}

impl FieldKind {
    pub fn field_type(&self) -> FieldType {
        match self {
            FieldKind::Text { .. } => FieldType::Text,
            FieldKind::Number { .. } => FieldType::Number,
            FieldKind::Boolean { .. } => FieldType::Boolean,
            FieldKind::Array { .. } => FieldType::Array,
            FieldKind::Enumeration { .. } => FieldType::Enumeration,
            FieldKind::Item { .. } => FieldType::Item,
            FieldKind::Country { .. } => FieldType::Country,
            FieldKind::Duration { .. } => FieldType::Duration,
            FieldKind::Role { .. } => FieldType::Role,
        }
    }

    /// Whether the field holds a list of selections. Always false for kinds
    /// without a `multiple` attribute.
    pub fn is_multiple(&self) -> bool {
        match self {
            FieldKind::Enumeration { multiple, .. }
            | FieldKind::Item { multiple, .. }
            | FieldKind::Country { multiple, .. }
            | FieldKind::Role { multiple, .. } => *multiple,
            FieldKind::Text { .. }
            | FieldKind::Number { .. }
            | FieldKind::Boolean { .. }
            | FieldKind::Array { .. }
            | FieldKind::Duration { .. } => false,
        }
    }

    /// Plain text field with no constraints.
    pub fn text() -> Self {
        FieldKind::Text {
            default: None,
            min_length: None,
            max_length: None,
        }
    }

    /// Plain number field with no constraints.
    pub fn number() -> Self {
        FieldKind::Number {
            default: None,
            minimum: None,
            maximum: None,
        }
    }
}

/// A config field definition.
///
/// `name` must be unique within a collection; the caller maintains that, the
/// encoder only detects violations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldDescriptor {
    pub name: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub kind: FieldKind,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            required: false,
            description: None,
            kind,
        }
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn field_type(&self) -> FieldType {
        self.kind.field_type()
    }
}

/// Parse an editor's descriptor list from JSON.
///
/// Unknown `type` tags and malformed attributes are rejected with
/// [`TranscodeError::InvalidDescriptor`].
pub fn parse_descriptors(json: &str) -> Result<Vec<FieldDescriptor>> {
    serde_json::from_str(json).map_err(TranscodeError::InvalidDescriptor)
}
