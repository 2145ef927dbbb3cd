//! # cardform
//!
//! A JSON Schema driven form engine for model card documents.
//!
//! `cardform` turns a schema into a default document, walks schema and
//! document together to describe an editable form, and applies edits back
//! to the document without disturbing anything off the edited path.
//!
//! ## Features
//!
//! - Default documents synthesized from any schema (`type`, `properties`,
//!   `items`, `enum`, `format`, `default`)
//! - Field trees for strings, numbers, booleans, enums, arrays and objects
//! - Immutable documents with structural sharing between versions
//! - Bundled model card templates and template inference for old records
//! - File and in-memory card stores
//!
//! ## Quick Start
//!
//! ```rust
//! use cardform::data::{Edit, EditSession};
//!
//! let schema = r#"{
//!     "type": "object",
//!     "properties": {
//!         "name": {"type": "string"},
//!         "tags": {"type": "array", "items": {"type": "string"}}
//!     }
//! }"#;
//!
//! let mut session = EditSession::from_custom("tags.json", schema).unwrap();
//! session.apply(&Edit::Append { path: "tags".into() }).unwrap();
//! session.input(&"tags.0".into(), "alpha").unwrap();
//!
//! assert_eq!(
//!     session.document.to_json(),
//!     serde_json::json!({"name": "", "tags": ["alpha"]})
//! );
//! ```
//!
//! ## Modules
//!
//! - [`data`] - Schema, document, path, mutation and walker
//! - [`templates`] - Bundled model card schemas
//! - [`store`] - Card persistence
//! - [`library`] - Listing, search and export
//! - [`error`] - Error types

#[macro_use]
extern crate log;

/// Schema-driven document engine.
pub mod data;

/// Error types and result definitions.
pub mod error;

/// Listing, searching and exporting saved cards.
pub mod library;

/// Card persistence.
pub mod store;

/// Bundled, versioned model card schemas.
pub mod templates;

pub use error::{FormError, Result};
pub use serde_json::Value;
