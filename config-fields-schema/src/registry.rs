//! Extension registry.
//!
//! Several field kinds share a base JSON type (a duration is a `number`, a
//! country is a `string`). The `x-component` keyword disambiguates them. This
//! module owns the fixed table from (base type, component) to field kind, the
//! base-type heuristics used when no component applies, and the inverse
//! mapping the encoder uses.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::document::Widget;
use crate::error::ClassificationError;
use crate::types::FieldType;

/// `type` keyword values accepted on the wire, legacy ones included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonType {
    String,
    Number,
    /// Legacy spelling of [`JsonType::Number`]; see [`normalize_legacy_type`].
    Integer,
    Boolean,
    Array,
    Object,
}

impl JsonType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "string" => Some(JsonType::String),
            "number" => Some(JsonType::Number),
            "integer" => Some(JsonType::Integer),
            "boolean" => Some(JsonType::Boolean),
            "array" => Some(JsonType::Array),
            "object" => Some(JsonType::Object),
            _ => None,
        }
    }
}

/// Base JSON type used for classification. Has no legacy spellings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseType {
    String,
    Number,
    Boolean,
    Array,
    Object,
}

impl BaseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BaseType::String => "string",
            BaseType::Number => "number",
            BaseType::Boolean => "boolean",
            BaseType::Array => "array",
            BaseType::Object => "object",
        }
    }
}

impl fmt::Display for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Legacy compatibility shim: early module schemas used `integer` for number
/// fields, which rules out fractional values. They are read as `number` and
/// are written back as `number`; `integer` never round-trips.
pub fn normalize_legacy_type(json_type: JsonType) -> BaseType {
    match json_type {
        JsonType::Integer | JsonType::Number => BaseType::Number,
        JsonType::String => BaseType::String,
        JsonType::Boolean => BaseType::Boolean,
        JsonType::Array => BaseType::Array,
        JsonType::Object => BaseType::Object,
    }
}

/// Recognized `x-component` values.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Component {
    Item,
    Country,
    Enumeration,
    Duration,
    Role,
}

impl Component {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "item" => Some(Component::Item),
            "country" => Some(Component::Country),
            "enumeration" => Some(Component::Enumeration),
            "duration" => Some(Component::Duration),
            "role" => Some(Component::Role),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Component::Item => "item",
            Component::Country => "country",
            Component::Enumeration => "enumeration",
            Component::Duration => "duration",
            Component::Role => "role",
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of classifying one property fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub field_type: FieldType,
    pub multiple: bool,
}

impl Classification {
    const fn new(field_type: FieldType, multiple: bool) -> Self {
        Self {
            field_type,
            multiple,
        }
    }
}

struct ExtensionRule {
    base: BaseType,
    component: Component,
    classification: Classification,
}

const fn rule(base: BaseType, component: Component, field_type: FieldType, multiple: bool) -> ExtensionRule {
    ExtensionRule {
        base,
        component,
        classification: Classification::new(field_type, multiple),
    }
}

/// (base type, component) pairs that select a field kind. Pairs not listed
/// fall back to the base-type heuristics in [`classify`].
static EXTENSION_RULES: &[ExtensionRule] = &[
    rule(BaseType::String, Component::Item, FieldType::Item, false),
    rule(BaseType::Object, Component::Item, FieldType::Item, false),
    rule(BaseType::String, Component::Country, FieldType::Country, false),
    rule(BaseType::String, Component::Role, FieldType::Role, false),
    rule(BaseType::Number, Component::Duration, FieldType::Duration, false),
    rule(BaseType::Array, Component::Item, FieldType::Item, true),
    rule(BaseType::Array, Component::Country, FieldType::Country, true),
    rule(BaseType::Array, Component::Enumeration, FieldType::Enumeration, true),
    rule(BaseType::Array, Component::Role, FieldType::Role, true),
];

/// Look up an explicit extension rule.
pub fn rule_for(base: BaseType, component: Component) -> Option<Classification> {
    EXTENSION_RULES
        .iter()
        .find(|r| r.base == base && r.component == component)
        .map(|r| r.classification)
}

/// Classify a property fragment from its (normalized) base type and optional
/// component hint. A keyword set to `null` counts as absent.
pub fn classify(
    base: BaseType,
    component: Option<Component>,
    fragment: &Map<String, Value>,
) -> Result<Classification, ClassificationError> {
    if let Some(component) = component {
        if let Some(classification) = rule_for(base, component) {
            return Ok(classification);
        }
        debug!(%base, %component, "x-component does not apply to base type");
    }

    let keyword = |name: &str| fragment.get(name).filter(|v| !v.is_null());

    match base {
        BaseType::String if keyword("enum").is_some() => {
            Ok(Classification::new(FieldType::Enumeration, false))
        }
        BaseType::String => Ok(Classification::new(FieldType::Text, false)),
        BaseType::Number => Ok(Classification::new(FieldType::Number, false)),
        BaseType::Boolean => Ok(Classification::new(FieldType::Boolean, false)),
        BaseType::Array => match keyword("items") {
            None => Ok(Classification::new(FieldType::Array, false)),
            Some(items) => match items.get("type") {
                Some(Value::String(t)) if t == "string" => {
                    Ok(Classification::new(FieldType::Array, false))
                }
                Some(other) => Err(ClassificationError::NonStringArrayItems {
                    found: other.to_string(),
                }),
                None => Err(ClassificationError::NonStringArrayItems {
                    found: "no type".to_string(),
                }),
            },
        },
        BaseType::Object => Err(ClassificationError::UnsupportedShape {
            base: BaseType::Object.as_str(),
        }),
    }
}

/// Base type the encoder writes for a field kind.
pub fn base_type_for(field_type: FieldType, multiple: bool) -> BaseType {
    match field_type {
        FieldType::Text => BaseType::String,
        FieldType::Number | FieldType::Duration => BaseType::Number,
        FieldType::Boolean => BaseType::Boolean,
        FieldType::Array => BaseType::Array,
        FieldType::Item if !multiple => BaseType::Object,
        FieldType::Enumeration | FieldType::Country | FieldType::Role if !multiple => {
            BaseType::String
        }
        FieldType::Enumeration | FieldType::Item | FieldType::Country | FieldType::Role => {
            BaseType::Array
        }
    }
}

/// `x-component` value the encoder writes for a field kind, if any.
///
/// Single-select enumerations are recognized by their `enum` keyword and carry
/// no component.
pub fn extension_for(field_type: FieldType, multiple: bool) -> Option<Component> {
    match field_type {
        FieldType::Text | FieldType::Number | FieldType::Boolean | FieldType::Array => None,
        FieldType::Enumeration => multiple.then_some(Component::Enumeration),
        FieldType::Item => Some(Component::Item),
        FieldType::Country => Some(Component::Country),
        FieldType::Duration => Some(Component::Duration),
        FieldType::Role => Some(Component::Role),
    }
}

/// UI widget hint for kinds whose JSON shape is ambiguous to a renderer.
pub fn widget_for(field_type: FieldType) -> Option<Widget> {
    match field_type {
        FieldType::Item => Some(Widget::Item),
        FieldType::Duration => Some(Widget::Duration),
        FieldType::Text
        | FieldType::Number
        | FieldType::Boolean
        | FieldType::Array
        | FieldType::Enumeration
        | FieldType::Country
        | FieldType::Role => None,
    }
}
