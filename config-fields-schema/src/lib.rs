//! Config field schema transcoder
//!
//! `config-fields-schema` converts between the normalized field model used by
//! the module config form builder and the JSON Schema (plus UI-schema) that a
//! generic form renderer consumes.
//!
//! # Architecture
//!
//! - **Descriptors**: [`FieldDescriptor`] is one typed config field; [`FieldKind`]
//!   is a closed sum type over the nine field kinds
//! - **Registry**: [`registry`] resolves kinds that share a base JSON type via the
//!   `x-component` extension keyword
//! - **Encode**: descriptors → [`SchemaDocument`] + [`UiSchemaDocument`], deterministic
//!   and order-preserving
//! - **Decode**: untyped schema → descriptors + [`Diagnostic`]s. A malformed
//!   property never aborts the document; only a non-object root does
//!
//! ```
//! use config_fields_schema::{decode, encode, FieldDescriptor, FieldKind};
//!
//! let fields = vec![FieldDescriptor::new("enabled", FieldKind::Boolean { default: true })];
//! let encoded = encode(&fields)?;
//! let decoded = decode(&encoded.schema.to_json());
//! assert_eq!(decoded.descriptors, fields);
//! assert!(decoded.diagnostics.is_empty());
//! # Ok::<(), config_fields_schema::TranscodeError>(())
//! ```

pub mod countries;
pub mod decode;
pub mod diagnostic;
pub mod document;
pub mod encode;
pub mod error;
pub mod registry;
pub mod types;

pub use decode::{decode, decode_str, DecodeOutcome, Decoder, DecoderConfig};
pub use diagnostic::{Diagnostic, DiagnosticKind, DiagnosticSeverity};
pub use document::{EncodedSchema, SchemaDocument, UiHint, UiSchemaDocument, Widget};
pub use encode::{encode, DuplicateNamePolicy, Encoder, EncoderConfig, DRAFT_07_SCHEMA_URI};
pub use error::{ClassificationError, Result, TranscodeError};
pub use types::{parse_descriptors, FieldDescriptor, FieldKind, FieldType, Selection};
