//! Schema-driven document engine.
//!
//! This module holds everything needed to turn a JSON Schema into an editable
//! form and to apply edits back to the document:
//!
//! - [`schema`] - Schema parsing into [`schema::SchemaNode`] trees
//! - [`doc`] - Document values with shared containers
//! - [`synth`] - Default document synthesis
//! - [`path`] - Dotted path addressing with copy-on-write writes
//! - [`mutation`] - Set, append and remove operations
//! - [`field`] - Field descriptions consumed by a presentation layer
//! - [`walker`] - Field tree construction
//! - [`session`] - Editing state for one card

/// Document values.
pub mod doc;

/// Field descriptions and input coercion.
pub mod field;

/// Path-addressed mutations.
pub mod mutation;

/// Dotted path addressing.
pub mod path;

/// Editing state for one card.
pub mod session;

/// JSON Schema parsing utilities.
pub mod schema;

/// Default document synthesis.
pub mod synth;

/// Schema walker.
pub mod walker;

pub use doc::Doc;
pub use mutation::Edit;
pub use path::Path;
pub use schema::SchemaNode;
pub use session::EditSession;
