//! Encoder: field descriptors → JSON Schema + UI-schema.
//!
//! Encoding is pure and deterministic. Property order and `required` order
//! follow the input order. Caller-supplied constraints (e.g. `minimum` ≤
//! `maximum`) are written as given.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::countries::COUNTRIES;
use crate::document::{EncodedSchema, RootType, SchemaDocument, UiSchemaDocument};
use crate::error::{Result, TranscodeError};
use crate::registry;
use crate::types::{FieldDescriptor, FieldKind};

/// `$schema` written by default.
pub const DRAFT_07_SCHEMA_URI: &str = "http://json-schema.org/draft-07/schema#";

/// What to do when two descriptors share a name.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicateNamePolicy {
    /// Fail with [`TranscodeError::DuplicateFieldName`]
    #[default]
    Reject,
    /// Keep the first position, take the last descriptor. Matches how older
    /// editors wrote schemas, for data that was persisted that way.
    LastWriteWins,
}

/// Encoder settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderConfig {
    pub schema_uri: String,
    pub duplicate_names: DuplicateNamePolicy,
}

impl EncoderConfig {
    pub fn new() -> Self {
        Self {
            schema_uri: DRAFT_07_SCHEMA_URI.to_string(),
            duplicate_names: DuplicateNamePolicy::default(),
        }
    }

    pub fn with_schema_uri(mut self, uri: impl Into<String>) -> Self {
        self.schema_uri = uri.into();
        self
    }

    pub fn with_duplicate_names(mut self, policy: DuplicateNamePolicy) -> Self {
        self.duplicate_names = policy;
        self
    }
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Encoder {
    config: EncoderConfig,
}

impl Encoder {
    pub fn new(config: EncoderConfig) -> Self {
        Self { config }
    }

    /// Encode descriptors into a schema document and its UI-schema.
    ///
    /// # Errors
    /// [`TranscodeError::DuplicateFieldName`] under [`DuplicateNamePolicy::Reject`],
    /// [`TranscodeError::EmptyEnumeration`] for an enumeration without values,
    /// [`TranscodeError::InvalidItemDefault`] for an item default that is not
    /// object-shaped.
    pub fn encode(&self, descriptors: &[FieldDescriptor]) -> Result<EncodedSchema> {
        let fields = self.resolve_names(descriptors)?;

        let mut properties = Map::new();
        let mut required = Vec::new();
        let mut ui_schema = UiSchemaDocument::new();

        for field in fields {
            properties.insert(field.name.clone(), property_schema(field)?);
            if field.required {
                required.push(field.name.clone());
            }
            if let Some(widget) = registry::widget_for(field.field_type()) {
                ui_schema.insert(field.name.clone(), widget);
            }
        }

        debug!(
            fields = properties.len(),
            required = required.len(),
            ui_hints = ui_schema.len(),
            "encoded config schema"
        );

        Ok(EncodedSchema {
            schema: SchemaDocument {
                schema_uri: self.config.schema_uri.clone(),
                root_type: RootType::Object,
                properties,
                required,
                additional_properties: false,
            },
            ui_schema,
        })
    }

    /// Apply the duplicate-name policy, returning the descriptors to encode in
    /// output order.
    fn resolve_names<'a>(
        &self,
        descriptors: &'a [FieldDescriptor],
    ) -> Result<Vec<&'a FieldDescriptor>> {
        match self.config.duplicate_names {
            DuplicateNamePolicy::Reject => {
                let mut seen = HashSet::new();
                for field in descriptors {
                    if !seen.insert(field.name.as_str()) {
                        return Err(TranscodeError::DuplicateFieldName {
                            name: field.name.clone(),
                        });
                    }
                }
                Ok(descriptors.iter().collect())
            }
            DuplicateNamePolicy::LastWriteWins => {
                let mut winners: IndexMap<&str, &FieldDescriptor> = IndexMap::new();
                for field in descriptors {
                    if winners.insert(field.name.as_str(), field).is_some() {
                        debug!(field = %field.name, "duplicate field name overwritten");
                    }
                }
                Ok(winners.into_values().collect())
            }
        }
    }
}

/// Encode with the default configuration.
pub fn encode(descriptors: &[FieldDescriptor]) -> Result<EncodedSchema> {
    Encoder::default().encode(descriptors)
}

fn insert_opt<T: Into<Value>>(map: &mut Map<String, Value>, key: &str, value: Option<T>) {
    if let Some(value) = value {
        map.insert(key.to_string(), value.into());
    }
}

fn string_items() -> Value {
    json!({ "type": "string" })
}

fn item_properties() -> Value {
    json!({
        "item": { "type": "string" },
        "amount": { "type": "number" },
        "quality": { "type": "string" }
    })
}

/// Item defaults are an object, or a list of objects.
fn is_item_shaped(value: &Value) -> bool {
    match value {
        Value::Object(_) => true,
        Value::Array(items) => items.iter().all(Value::is_object),
        _ => false,
    }
}

fn country_options() -> Value {
    COUNTRIES
        .iter()
        .map(|c| json!({ "const": c.code, "title": c.name }))
        .collect()
}

/// Build the JSON Schema fragment for one descriptor.
fn property_schema(field: &FieldDescriptor) -> Result<Value> {
    let field_type = field.field_type();
    let multiple = field.kind.is_multiple();

    let mut fragment = Map::new();
    fragment.insert(
        "type".into(),
        registry::base_type_for(field_type, multiple).as_str().into(),
    );
    if let Some(component) = registry::extension_for(field_type, multiple) {
        fragment.insert("x-component".into(), component.as_str().into());
    }

    match &field.kind {
        FieldKind::Text {
            default,
            min_length,
            max_length,
        } => {
            insert_opt(&mut fragment, "minLength", *min_length);
            insert_opt(&mut fragment, "maxLength", *max_length);
            insert_opt(&mut fragment, "default", default.clone());
        }
        FieldKind::Number {
            default,
            minimum,
            maximum,
        } => {
            insert_opt(&mut fragment, "minimum", minimum.clone());
            insert_opt(&mut fragment, "maximum", maximum.clone());
            insert_opt(&mut fragment, "default", default.clone());
        }
        FieldKind::Boolean { default } => {
            fragment.insert("default".into(), Value::Bool(*default));
        }
        FieldKind::Array {
            default,
            min_items,
            max_items,
            unique_items,
        } => {
            fragment.insert("items".into(), string_items());
            insert_opt(&mut fragment, "minItems", *min_items);
            insert_opt(&mut fragment, "maxItems", *max_items);
            insert_opt(&mut fragment, "uniqueItems", *unique_items);
            insert_opt(&mut fragment, "default", default.clone());
        }
        FieldKind::Enumeration {
            values,
            multiple,
            default,
        } => {
            if values.is_empty() {
                return Err(TranscodeError::EmptyEnumeration {
                    name: field.name.clone(),
                });
            }
            if *multiple {
                fragment.insert("uniqueItems".into(), Value::Bool(true));
                fragment.insert(
                    "items".into(),
                    json!({ "type": "string", "enum": values }),
                );
            } else {
                fragment.insert("enum".into(), json!(values));
            }
            insert_opt(&mut fragment, "default", default.clone());
        }
        FieldKind::Item { multiple, default } => {
            if default.as_ref().is_some_and(|d| !is_item_shaped(d)) {
                return Err(TranscodeError::InvalidItemDefault {
                    name: field.name.clone(),
                });
            }
            if *multiple {
                fragment.insert(
                    "items".into(),
                    json!({ "type": "object", "properties": item_properties() }),
                );
            } else {
                fragment.insert("properties".into(), item_properties());
            }
            insert_opt(&mut fragment, "default", default.clone());
        }
        FieldKind::Country { multiple, default } => {
            if *multiple {
                fragment.insert("uniqueItems".into(), Value::Bool(true));
                fragment.insert(
                    "items".into(),
                    json!({ "type": "string", "anyOf": country_options() }),
                );
            } else {
                fragment.insert("oneOf".into(), country_options());
            }
            insert_opt(&mut fragment, "default", default.clone());
        }
        FieldKind::Duration { default } => {
            insert_opt(&mut fragment, "default", default.clone());
        }
        FieldKind::Role { multiple, default } => {
            if *multiple {
                fragment.insert("uniqueItems".into(), Value::Bool(true));
                fragment.insert("items".into(), string_items());
            }
            insert_opt(&mut fragment, "default", default.clone());
        }
    }

    fragment.insert("title".into(), Value::String(field.name.clone()));
    insert_opt(&mut fragment, "description", field.description.clone());

    Ok(Value::Object(fragment))
}
