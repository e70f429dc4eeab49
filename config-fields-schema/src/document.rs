//! Wire documents produced by the encoder.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::trace;

use crate::error::Result;
use crate::registry::Component;

/// Root `type` of a config schema. Only `object` is valid.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RootType {
    Object,
}

/// A JSON Schema document describing a module's config fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SchemaDocument {
    #[serde(rename = "$schema")]
    pub schema_uri: String,
    #[serde(rename = "type")]
    pub root_type: RootType,
    /// One fragment per field, in field order. Omitted from the output when empty.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub properties: Map<String, Value>,
    #[serde(default)]
    pub required: Vec<String>,
    #[serde(rename = "additionalProperties")]
    pub additional_properties: bool,
}

impl SchemaDocument {
    pub fn to_json(&self) -> Value {
        let mut root = Map::new();
        root.insert("$schema".into(), Value::String(self.schema_uri.clone()));
        root.insert("type".into(), Value::String("object".into()));
        if !self.properties.is_empty() {
            root.insert("properties".into(), Value::Object(self.properties.clone()));
        }
        root.insert(
            "required".into(),
            Value::Array(self.required.iter().cloned().map(Value::String).collect()),
        );
        root.insert(
            "additionalProperties".into(),
            Value::Bool(self.additional_properties),
        );
        Value::Object(root)
    }

    /// Serialize to the string persisted as a module version's `configSchema`.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Widget tags a form renderer needs to draw ambiguous fields.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Widget {
    Item,
    Duration,
}

impl Widget {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "item" => Some(Widget::Item),
            "duration" => Some(Widget::Duration),
            _ => None,
        }
    }

    /// The `x-component` value this widget stands in for.
    pub fn component(&self) -> Component {
        match self {
            Widget::Item => Component::Item,
            Widget::Duration => Component::Duration,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct UiHint {
    #[serde(rename = "ui:widget")]
    pub widget: Widget,
}

/// Sparse map of field name to UI hint.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct UiSchemaDocument(IndexMap<String, UiHint>);

impl UiSchemaDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, widget: Widget) {
        self.0.insert(name.into(), UiHint { widget });
    }

    pub fn widget(&self, name: &str) -> Option<Widget> {
        self.0.get(name).map(|hint| hint.widget)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Widget)> {
        self.0.iter().map(|(name, hint)| (name.as_str(), hint.widget))
    }

    /// Read a stored UI-schema, keeping only entries with a known `ui:widget`.
    ///
    /// Hand-written UI-schemas carry other renderer options (`ui:options`,
    /// unrelated widgets); those are not field-kind hints and are skipped.
    pub fn from_json(value: &Value) -> Self {
        let mut doc = Self::new();
        let Some(entries) = value.as_object() else {
            return doc;
        };
        for (name, entry) in entries {
            match entry.get("ui:widget").and_then(Value::as_str).and_then(Widget::parse) {
                Some(widget) => doc.insert(name.clone(), widget),
                None => trace!(field = %name, "ignoring ui-schema entry without a field widget"),
            }
        }
        doc
    }

    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .iter()
            .map(|(name, widget)| {
                let tag = widget.component().as_str();
                (name.to_string(), serde_json::json!({ "ui:widget": tag }))
            })
            .collect();
        Value::Object(map)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Output of one encode call.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EncodedSchema {
    #[serde(rename = "configSchema")]
    pub schema: SchemaDocument,
    #[serde(rename = "uiSchema")]
    pub ui_schema: UiSchemaDocument,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn empty_document() -> SchemaDocument {
        SchemaDocument {
            schema_uri: "http://json-schema.org/draft-07/schema#".into(),
            root_type: RootType::Object,
            properties: Map::new(),
            required: Vec::new(),
            additional_properties: false,
        }
    }

    #[test]
    fn empty_properties_are_omitted() {
        let doc = empty_document();
        let expected = json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "type": "object",
            "required": [],
            "additionalProperties": false
        });
        assert_eq!(doc.to_json(), expected);

        let serialized: Value = serde_json::from_str(&doc.to_json_string().unwrap()).unwrap();
        assert_eq!(serialized, expected);
    }

    #[test]
    fn serde_and_to_json_agree() {
        let mut doc = empty_document();
        doc.properties
            .insert("enabled".into(), json!({"type": "boolean", "default": true}));
        doc.required.push("enabled".into());
        assert_eq!(serde_json::to_value(&doc).unwrap(), doc.to_json());
    }

    #[test]
    fn ui_schema_serializes_widget_tags() {
        let mut ui = UiSchemaDocument::new();
        ui.insert("timeout", Widget::Duration);
        ui.insert("reward", Widget::Item);
        let expected = json!({
            "timeout": {"ui:widget": "duration"},
            "reward": {"ui:widget": "item"}
        });
        assert_eq!(ui.to_json(), expected);
        assert_eq!(serde_json::to_value(&ui).unwrap(), expected);
    }

    #[test]
    fn ui_schema_persists_as_string_in_field_order() {
        let mut ui = UiSchemaDocument::new();
        ui.insert("timeout", Widget::Duration);
        ui.insert("reward", Widget::Item);
        assert_eq!(
            ui.to_json_string().unwrap(),
            r#"{"timeout":{"ui:widget":"duration"},"reward":{"ui:widget":"item"}}"#
        );
        assert_eq!(UiSchemaDocument::new().to_json_string().unwrap(), "{}");

        let stored: Value = serde_json::from_str(&ui.to_json_string().unwrap()).unwrap();
        assert_eq!(UiSchemaDocument::from_json(&stored), ui);
    }

    #[test]
    fn ui_schema_from_json_skips_unrelated_entries() {
        let ui = UiSchemaDocument::from_json(&json!({
            "timeout": {"ui:widget": "duration"},
            "message": {"ui:widget": "textarea"},
            "other": {"ui:options": {"inline": true}}
        }));
        assert_eq!(ui.len(), 1);
        assert_eq!(ui.widget("timeout"), Some(Widget::Duration));
        assert_eq!(ui.widget("message"), None);

        assert!(UiSchemaDocument::from_json(&json!("nope")).is_empty());
    }
}
