//! Decode diagnostics.
//!
//! Decoding reports problems as data so the form builder can still render the
//! fields it understood. A diagnostic is either document-level (the root is
//! not an object schema) or scoped to a single property.

use serde::Serialize;
use serde_json::Value;

use crate::error::ClassificationError;

/// Severity of a diagnostic.
///
/// - **Error**: one field could not be loaded; the rest of the document is usable
/// - **Critical**: the document could not be parsed at all
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    Error,
    Critical,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticKind {
    /// Root `type` missing or not `object`, or malformed root members
    RootShape,
    /// One property matched no known field kind
    FieldClassification,
}

/// A problem found while decoding, with the raw schema it refers to.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// Property name for field diagnostics
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub message: String,
    pub detail: String,
    /// The offending fragment: the whole document for root failures, the
    /// property schema for field failures
    pub data: Value,
}

impl Diagnostic {
    pub(crate) fn root_shape(detail: impl Into<String>, data: &Value) -> Self {
        Self {
            kind: DiagnosticKind::RootShape,
            field: None,
            message: "Failed to parse config fields".to_string(),
            detail: detail.into(),
            data: data.clone(),
        }
    }

    pub(crate) fn field_classification(
        name: &str,
        error: &ClassificationError,
        data: &Value,
    ) -> Self {
        Self {
            kind: DiagnosticKind::FieldClassification,
            field: Some(name.to_string()),
            message: format!(
                "Error processing config field: '{}'. Please try to recreate the field using the config details.",
                name
            ),
            detail: format!("The following config field could not be processed: {}", error),
            data: data.clone(),
        }
    }

    pub fn severity(&self) -> DiagnosticSeverity {
        match self.kind {
            DiagnosticKind::RootShape => DiagnosticSeverity::Critical,
            DiagnosticKind::FieldClassification => DiagnosticSeverity::Error,
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.severity() == DiagnosticSeverity::Critical
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn field_diagnostic_names_the_field() {
        let fragment = json!({"type": "array", "items": {"type": "number"}});
        let diag = Diagnostic::field_classification(
            "x",
            &ClassificationError::NonStringArrayItems {
                found: "\"number\"".into(),
            },
            &fragment,
        );
        assert_eq!(diag.field.as_deref(), Some("x"));
        assert!(diag.message.contains("'x'"));
        assert!(diag.detail.contains("must be of type string"));
        assert_eq!(diag.data, fragment);
        assert_eq!(diag.severity(), DiagnosticSeverity::Error);
        assert!(!diag.is_fatal());
    }

    #[test]
    fn root_diagnostic_is_critical() {
        let diag = Diagnostic::root_shape("Schema should be of type object", &json!({"type": "string"}));
        assert!(diag.is_fatal());
        let value = serde_json::to_value(&diag).unwrap();
        assert_eq!(value["kind"], json!("root-shape"));
        assert!(value.get("field").is_none());
    }
}
