//! Decoder: JSON Schema → field descriptors + diagnostics.
//!
//! The input is untyped JSON, usually a stored `configSchema` string or a
//! hand-written schema. Every property is parsed into a known shape behind
//! its own `Result`; a property that fails becomes a [`Diagnostic`] and the
//! remaining properties are still decoded. Only a root that is not an object
//! schema rejects the whole document.

use serde::Serialize;
use serde_json::{Map, Number, Value};
use tracing::{debug, trace, warn};

use crate::diagnostic::Diagnostic;
use crate::document::UiSchemaDocument;
use crate::error::{ClassificationError, Result};
use crate::registry::{self, Classification, Component, JsonType};
use crate::types::{FieldDescriptor, FieldKind, FieldType, Selection};

/// Decoder settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecoderConfig {
    ui_schema: Option<UiSchemaDocument>,
}

impl DecoderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consult a companion UI-schema for properties without `x-component`.
    ///
    /// Some older schemas only carried the duration or item hint as a
    /// `ui:widget`. The fragment's own `x-component` always takes precedence.
    pub fn with_ui_schema(mut self, ui_schema: UiSchemaDocument) -> Self {
        self.ui_schema = Some(ui_schema);
        self
    }

    pub fn ui_schema(&self) -> Option<&UiSchemaDocument> {
        self.ui_schema.as_ref()
    }
}

/// Everything one decode call produced.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct DecodeOutcome {
    pub descriptors: Vec<FieldDescriptor>,
    pub diagnostics: Vec<Diagnostic>,
}

impl DecodeOutcome {
    fn rejected(diagnostic: Diagnostic) -> Self {
        Self {
            descriptors: Vec::new(),
            diagnostics: vec![diagnostic],
        }
    }

    /// True when every property was decoded.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// True when the document as a whole could not be parsed.
    pub fn is_fatal(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_fatal)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Decoder {
    config: DecoderConfig,
}

impl Decoder {
    pub fn new(config: DecoderConfig) -> Self {
        Self { config }
    }

    /// Decode a schema value. Never fails; problems are returned as diagnostics.
    pub fn decode(&self, schema: &Value) -> DecodeOutcome {
        // No fields defined yet
        if schema.as_object().is_some_and(Map::is_empty) {
            return DecodeOutcome::default();
        }

        let root = match schema.as_object() {
            Some(root) if root.get("type").and_then(Value::as_str) == Some("object") => root,
            _ => return reject_root("Schema should be of type object", schema),
        };

        let properties = match root.get("properties") {
            None => return DecodeOutcome::default(),
            Some(Value::Object(properties)) => properties,
            Some(_) => return reject_root("Schema properties should be an object", schema),
        };

        let required: Vec<&str> = match root.get("required") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(names)) => names.iter().filter_map(Value::as_str).collect(),
            Some(_) => return reject_root("Schema required should be an array", schema),
        };

        let mut outcome = DecodeOutcome::default();
        for (name, fragment) in properties {
            let is_required = required.contains(&name.as_str());
            match self.decode_property(name, fragment, is_required) {
                Ok(descriptor) => {
                    trace!(field = %name, kind = %descriptor.field_type(), "decoded config field");
                    outcome.descriptors.push(descriptor);
                }
                Err(error) => {
                    warn!(field = %name, %error, "config field could not be processed");
                    outcome
                        .diagnostics
                        .push(Diagnostic::field_classification(name, &error, fragment));
                }
            }
        }

        debug!(
            descriptors = outcome.descriptors.len(),
            diagnostics = outcome.diagnostics.len(),
            "decoded config schema"
        );
        outcome
    }

    /// Decode a persisted schema string.
    ///
    /// # Errors
    /// [`crate::TranscodeError::Json`] when the text is not JSON.
    pub fn decode_str(&self, schema: &str) -> Result<DecodeOutcome> {
        let value: Value = serde_json::from_str(schema)?;
        Ok(self.decode(&value))
    }

    fn decode_property(
        &self,
        name: &str,
        fragment: &Value,
        required: bool,
    ) -> std::result::Result<FieldDescriptor, ClassificationError> {
        let fragment = fragment
            .as_object()
            .ok_or(ClassificationError::NotAnObject)?;

        let json_type = wire_type(fragment)?;
        // Legacy: `integer` is read as `number` before anything else looks at the type
        let base = registry::normalize_legacy_type(json_type);

        let component = self.component_hint(name, fragment);
        let classification = registry::classify(base, component, fragment)?;

        let attrs = Attributes(fragment);
        let kind = build_kind(classification, &attrs)?;
        let description = attrs.string("description")?;

        Ok(FieldDescriptor {
            name: name.to_string(),
            required,
            description,
            kind,
        })
    }

    fn component_hint(&self, name: &str, fragment: &Map<String, Value>) -> Option<Component> {
        match fragment.get("x-component").filter(|v| !v.is_null()) {
            Some(Value::String(tag)) => {
                let component = Component::parse(tag);
                if component.is_none() {
                    debug!(field = %name, component = %tag, "ignoring unknown x-component");
                }
                component
            }
            Some(other) => {
                debug!(field = %name, component = %other, "ignoring non-string x-component");
                None
            }
            None => self
                .config
                .ui_schema()
                .and_then(|ui| ui.widget(name))
                .map(|widget| widget.component()),
        }
    }
}

/// Decode with the default configuration.
pub fn decode(schema: &Value) -> DecodeOutcome {
    Decoder::default().decode(schema)
}

/// Decode a persisted schema string with the default configuration.
pub fn decode_str(schema: &str) -> Result<DecodeOutcome> {
    Decoder::default().decode_str(schema)
}

fn reject_root(detail: &str, schema: &Value) -> DecodeOutcome {
    warn!(detail, "config schema rejected");
    DecodeOutcome::rejected(Diagnostic::root_shape(detail, schema))
}

fn wire_type(fragment: &Map<String, Value>) -> std::result::Result<JsonType, ClassificationError> {
    match fragment.get("type") {
        None => Err(ClassificationError::MissingType),
        Some(Value::String(t)) => {
            JsonType::parse(t).ok_or_else(|| ClassificationError::UnknownType { found: t.clone() })
        }
        Some(other) => Err(ClassificationError::UnknownType {
            found: other.to_string(),
        }),
    }
}

fn build_kind(
    classification: Classification,
    attrs: &Attributes<'_>,
) -> std::result::Result<FieldKind, ClassificationError> {
    let multiple = classification.multiple;
    let kind = match classification.field_type {
        FieldType::Text => FieldKind::Text {
            default: attrs.string("default")?,
            min_length: attrs.count("minLength")?,
            max_length: attrs.count("maxLength")?,
        },
        FieldType::Number => FieldKind::Number {
            default: attrs.number("default")?,
            minimum: attrs.number("minimum")?,
            maximum: attrs.number("maximum")?,
        },
        FieldType::Boolean => FieldKind::Boolean {
            default: attrs.boolean("default")?.unwrap_or(false),
        },
        FieldType::Array => FieldKind::Array {
            default: attrs.strings("default")?,
            min_items: attrs.count("minItems")?,
            max_items: attrs.count("maxItems")?,
            unique_items: attrs.boolean("uniqueItems")?,
        },
        FieldType::Enumeration => {
            let values = if multiple {
                match attrs.nested("items")? {
                    Some(items) => items.strings("enum")?,
                    None => None,
                }
            } else {
                attrs.strings("enum")?
            };
            let values = values.unwrap_or_default();
            if values.is_empty() {
                return Err(ClassificationError::EmptyEnumeration);
            }
            FieldKind::Enumeration {
                values,
                multiple,
                default: attrs.selection("default")?,
            }
        }
        FieldType::Item => FieldKind::Item {
            multiple,
            default: attrs.object_default("default")?,
        },
        FieldType::Country => FieldKind::Country {
            multiple,
            default: attrs.selection("default")?,
        },
        FieldType::Duration => FieldKind::Duration {
            default: attrs.number("default")?,
        },
        FieldType::Role => FieldKind::Role {
            multiple,
            default: attrs.selection("default")?,
        },
    };
    Ok(kind)
}

/// Typed reads from a property fragment. `null` counts as absent.
struct Attributes<'a>(&'a Map<String, Value>);

impl<'a> Attributes<'a> {
    fn get(&self, keyword: &str) -> Option<&'a Value> {
        self.0.get(keyword).filter(|v| !v.is_null())
    }

    fn invalid(keyword: &'static str, expected: &'static str) -> ClassificationError {
        ClassificationError::InvalidAttribute { keyword, expected }
    }

    fn string(&self, keyword: &'static str) -> std::result::Result<Option<String>, ClassificationError> {
        match self.get(keyword) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(Self::invalid(keyword, "a string")),
        }
    }

    fn number(&self, keyword: &'static str) -> std::result::Result<Option<Number>, ClassificationError> {
        match self.get(keyword) {
            None => Ok(None),
            Some(Value::Number(n)) => Ok(Some(n.clone())),
            Some(_) => Err(Self::invalid(keyword, "a number")),
        }
    }

    fn count(&self, keyword: &'static str) -> std::result::Result<Option<u64>, ClassificationError> {
        match self.get(keyword) {
            None => Ok(None),
            Some(v) => v
                .as_u64()
                .map(Some)
                .ok_or_else(|| Self::invalid(keyword, "a non-negative integer")),
        }
    }

    fn boolean(&self, keyword: &'static str) -> std::result::Result<Option<bool>, ClassificationError> {
        match self.get(keyword) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(_) => Err(Self::invalid(keyword, "a boolean")),
        }
    }

    fn strings(
        &self,
        keyword: &'static str,
    ) -> std::result::Result<Option<Vec<String>>, ClassificationError> {
        match self.get(keyword) {
            None => Ok(None),
            Some(v) => string_list(v)
                .map(Some)
                .ok_or_else(|| Self::invalid(keyword, "an array of strings")),
        }
    }

    fn selection(
        &self,
        keyword: &'static str,
    ) -> std::result::Result<Option<Selection>, ClassificationError> {
        match self.get(keyword) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(Selection::One(s.clone()))),
            Some(v) => string_list(v)
                .map(|values| Some(Selection::Many(values)))
                .ok_or_else(|| Self::invalid(keyword, "a string or an array of strings")),
        }
    }

    fn object_default(
        &self,
        keyword: &'static str,
    ) -> std::result::Result<Option<Value>, ClassificationError> {
        match self.get(keyword) {
            None => Ok(None),
            Some(v @ Value::Object(_)) => Ok(Some(v.clone())),
            Some(Value::Array(items)) if items.iter().all(Value::is_object) => {
                Ok(Some(Value::Array(items.clone())))
            }
            Some(_) => Err(Self::invalid(keyword, "an object or an array of objects")),
        }
    }

    fn nested(
        &self,
        keyword: &'static str,
    ) -> std::result::Result<Option<Attributes<'a>>, ClassificationError> {
        match self.get(keyword) {
            None => Ok(None),
            Some(Value::Object(map)) => Ok(Some(Attributes(map))),
            Some(_) => Err(Self::invalid(keyword, "an object")),
        }
    }
}

fn string_list(value: &Value) -> Option<Vec<String>> {
    value
        .as_array()?
        .iter()
        .map(|v| v.as_str().map(str::to_string))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::DiagnosticKind;
    use crate::document::Widget;
    use serde_json::json;

    fn object_schema(properties: Value, required: Value) -> Value {
        json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "type": "object",
            "properties": properties,
            "required": required,
            "additionalProperties": false
        })
    }

    #[test]
    fn empty_object_is_no_op() {
        let outcome = decode(&json!({}));
        assert!(outcome.descriptors.is_empty());
        assert!(outcome.is_clean());
    }

    #[test]
    fn wrong_root_type_rejects_document() {
        let outcome = decode(&json!({"type": "string"}));
        assert!(outcome.descriptors.is_empty());
        assert_eq!(outcome.diagnostics.len(), 1);
        assert_eq!(outcome.diagnostics[0].kind, DiagnosticKind::RootShape);
        assert!(outcome.is_fatal());
    }

    #[test]
    fn non_object_value_rejects_document() {
        for value in [json!(null), json!([]), json!("schema"), json!({"properties": {}})] {
            let outcome = decode(&value);
            assert_eq!(outcome.diagnostics.len(), 1, "{value}");
            assert!(outcome.is_fatal());
        }
    }

    #[test]
    fn missing_properties_is_valid() {
        let outcome = decode(&json!({"type": "object", "required": []}));
        assert!(outcome.descriptors.is_empty());
        assert!(outcome.is_clean());
    }

    #[test]
    fn malformed_root_members_reject_document() {
        let outcome = decode(&json!({"type": "object", "properties": []}));
        assert!(outcome.is_fatal());
        let outcome = decode(&json!({"type": "object", "properties": {}, "required": "x"}));
        assert!(outcome.is_fatal());
    }

    #[test]
    fn required_membership() {
        let outcome = decode(&object_schema(
            json!({
                "a": {"type": "string"},
                "b": {"type": "string"}
            }),
            json!(["b", 7]),
        ));
        assert!(!outcome.descriptors[0].required);
        assert!(outcome.descriptors[1].required);

        let outcome = decode(&json!({
            "type": "object",
            "properties": {"a": {"type": "boolean"}},
            "required": null
        }));
        assert!(!outcome.descriptors[0].required);
    }

    #[test]
    fn legacy_integer_reads_as_number() {
        let outcome = decode(&object_schema(
            json!({"count": {"type": "integer", "minimum": 1, "maximum": 10, "default": 5}}),
            json!([]),
        ));
        assert_eq!(
            outcome.descriptors[0].kind,
            FieldKind::Number {
                default: Some(5.into()),
                minimum: Some(1.into()),
                maximum: Some(10.into()),
            }
        );
    }

    #[test]
    fn zero_bounds_are_kept() {
        let outcome = decode(&object_schema(
            json!({"n": {"type": "number", "minimum": 0}}),
            json!([]),
        ));
        assert_eq!(
            outcome.descriptors[0].kind,
            FieldKind::Number {
                default: None,
                minimum: Some(0.into()),
                maximum: None,
            }
        );
    }

    #[test]
    fn bad_field_does_not_abort_document() {
        let outcome = decode(&object_schema(
            json!({
                "first": {"type": "boolean", "default": true},
                "broken": {"type": "array", "items": {"type": "number"}},
                "weird": {"type": "null"},
                "last": {"type": "string"}
            }),
            json!([]),
        ));
        let names: Vec<&str> = outcome.descriptors.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["first", "last"]);
        let failed: Vec<Option<&str>> = outcome
            .diagnostics
            .iter()
            .map(|d| d.field.as_deref())
            .collect();
        assert_eq!(failed, vec![Some("broken"), Some("weird")]);
        assert_eq!(
            outcome.diagnostics[0].data,
            json!({"type": "array", "items": {"type": "number"}})
        );
        assert!(!outcome.is_fatal());
    }

    #[test]
    fn wrong_attribute_type_is_field_error() {
        let outcome = decode(&object_schema(
            json!({
                "n": {"type": "number", "default": "0"},
                "t": {"type": "string", "maxLength": -1},
                "ok": {"type": "number", "default": 0}
            }),
            json!([]),
        ));
        assert_eq!(outcome.descriptors.len(), 1);
        assert_eq!(outcome.diagnostics.len(), 2);
        assert!(outcome.diagnostics[0].detail.contains("'default' must be a number"));
        assert!(outcome.diagnostics[1].detail.contains("'maxLength'"));
    }

    #[test]
    fn non_object_fragment_is_field_error() {
        let outcome = decode(&object_schema(json!({"flag": true}), json!([])));
        assert_eq!(outcome.diagnostics.len(), 1);
        assert_eq!(outcome.diagnostics[0].data, json!(true));
    }

    #[test]
    fn null_default_is_absent() {
        let outcome = decode(&object_schema(
            json!({"t": {"type": "string", "default": null}}),
            json!([]),
        ));
        assert_eq!(outcome.descriptors[0].kind, FieldKind::text());
    }

    #[test]
    fn string_extensions() {
        let outcome = decode(&object_schema(
            json!({
                "reward": {"type": "string", "x-component": "item"},
                "home": {"type": "string", "x-component": "country", "default": "BE"},
                "role": {"type": "string", "x-component": "role"},
                "mode": {"type": "string", "enum": ["a", "b"], "default": "a"},
                "free": {"type": "string", "x-component": "sparkles"}
            }),
            json!([]),
        ));
        assert!(outcome.is_clean());
        let kinds: Vec<FieldKind> = outcome.descriptors.into_iter().map(|d| d.kind).collect();
        assert_eq!(
            kinds,
            vec![
                FieldKind::Item {
                    multiple: false,
                    default: None
                },
                FieldKind::Country {
                    multiple: false,
                    default: Some(Selection::from("BE"))
                },
                FieldKind::Role {
                    multiple: false,
                    default: None
                },
                FieldKind::Enumeration {
                    values: vec!["a".into(), "b".into()],
                    multiple: false,
                    default: Some(Selection::from("a"))
                },
                FieldKind::text(),
            ]
        );
    }

    #[test]
    fn array_extensions() {
        let outcome = decode(&object_schema(
            json!({
                "rewards": {"type": "array", "x-component": "item", "items": {"type": "object"}},
                "blocked": {"type": "array", "x-component": "country", "uniqueItems": true, "items": {"type": "string"}},
                "modes": {"type": "array", "x-component": "enumeration", "items": {"type": "string", "enum": ["x"]}},
                "roles": {"type": "array", "x-component": "role", "items": {"type": "string"}, "default": ["admin"]}
            }),
            json!([]),
        ));
        assert!(outcome.is_clean());
        assert!(outcome.descriptors.iter().all(|d| d.kind.is_multiple()));
        assert_eq!(
            outcome.descriptors[2].kind,
            FieldKind::Enumeration {
                values: vec!["x".into()],
                multiple: true,
                default: None
            }
        );
        assert_eq!(
            outcome.descriptors[3].kind,
            FieldKind::Role {
                multiple: true,
                default: Some(Selection::Many(vec!["admin".into()]))
            }
        );
    }

    #[test]
    fn enumeration_without_values_is_field_error() {
        let outcome = decode(&object_schema(
            json!({
                "a": {"type": "string", "enum": []},
                "b": {"type": "array", "x-component": "enumeration", "items": {"type": "string"}}
            }),
            json!([]),
        ));
        assert!(outcome.descriptors.is_empty());
        assert_eq!(outcome.diagnostics.len(), 2);
    }

    #[test]
    fn item_default_must_be_object_shaped() {
        let outcome = decode(&object_schema(
            json!({
                "good": {"type": "object", "x-component": "item", "default": {"item": "wood", "amount": 5}},
                "bad": {"type": "object", "x-component": "item", "default": "wood"}
            }),
            json!([]),
        ));
        assert_eq!(outcome.descriptors.len(), 1);
        assert_eq!(
            outcome.descriptors[0].kind,
            FieldKind::Item {
                multiple: false,
                default: Some(json!({"item": "wood", "amount": 5}))
            }
        );
        assert_eq!(outcome.diagnostics[0].field.as_deref(), Some("bad"));
    }

    #[test]
    fn ui_schema_hint_classifies_duration() {
        let schema = object_schema(
            json!({"timeout": {"type": "number", "minimum": 0, "default": 1000}}),
            json!([]),
        );
        assert_eq!(decode(&schema).descriptors[0].field_type(), FieldType::Number);

        let mut ui = UiSchemaDocument::new();
        ui.insert("timeout", Widget::Duration);
        let decoder = Decoder::new(DecoderConfig::new().with_ui_schema(ui));
        let outcome = decoder.decode(&schema);
        assert_eq!(
            outcome.descriptors[0].kind,
            FieldKind::Duration {
                default: Some(1000.into())
            }
        );
    }

    #[test]
    fn x_component_beats_ui_schema() {
        let schema = object_schema(
            json!({"reward": {"type": "string", "x-component": "country"}}),
            json!([]),
        );
        let mut ui = UiSchemaDocument::new();
        ui.insert("reward", Widget::Item);
        let outcome = Decoder::new(DecoderConfig::new().with_ui_schema(ui)).decode(&schema);
        assert_eq!(outcome.descriptors[0].field_type(), FieldType::Country);
    }

    #[test]
    fn null_enum_and_items_are_absent() {
        let outcome = decode(&object_schema(
            json!({
                "t": {"type": "string", "enum": null},
                "a": {"type": "array", "items": null}
            }),
            json!([]),
        ));
        assert!(outcome.is_clean(), "{:?}", outcome.diagnostics);
        let kinds: Vec<FieldKind> = outcome.descriptors.into_iter().map(|d| d.kind).collect();
        assert_eq!(
            kinds,
            vec![
                FieldKind::text(),
                FieldKind::Array {
                    default: None,
                    min_items: None,
                    max_items: None,
                    unique_items: None,
                },
            ]
        );
    }

    #[test]
    fn null_x_component_uses_ui_schema_hint() {
        let schema = object_schema(
            json!({"timeout": {"type": "number", "x-component": null, "default": 500}}),
            json!([]),
        );
        let mut ui = UiSchemaDocument::new();
        ui.insert("timeout", Widget::Duration);
        let decoder = Decoder::new(DecoderConfig::new().with_ui_schema(ui));
        let outcome = decoder.decode(&schema);
        assert_eq!(
            outcome.descriptors[0].kind,
            FieldKind::Duration {
                default: Some(500.into())
            }
        );
    }

    #[test]
    fn decode_str_reports_invalid_json() {
        assert!(decode_str("{not json").is_err());
        let outcome = decode_str(r#"{"type":"object","properties":{"x":{"type":"boolean"}}}"#).unwrap();
        assert_eq!(outcome.descriptors.len(), 1);
    }
}
