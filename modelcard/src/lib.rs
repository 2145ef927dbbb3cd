//! # modelcard
//!
//! Command-line front end for schema-driven model cards.
//!
//! Cards are created from bundled templates or uploaded JSON schemas,
//! edited field by field in a line-oriented editor, kept in a JSON file
//! store and exported as pretty-printed JSON. The form logic itself lives in
//! the [`cardform`] crate; this crate renders it and wires up commands.
//!
//! ## Modules
//!
//! - [`commands`] - Handlers behind the subcommands
//! - [`config`] - `.modelcard.toml` settings
//! - [`ctx`] - Application context and state management
//! - [`editor`] - Line-oriented card editor
//! - [`render`] - Terminal rendering of forms, cards and listings

/// Handlers behind the `modelcard` subcommands.
pub mod commands;

/// Settings file handling.
pub mod config;

/// Application context and state management.
pub mod ctx;

/// Line-oriented card editor.
///
/// Turns typed commands into edits on an edit session and prints the form
/// after each change.
pub mod editor;

/// Terminal rendering.
pub mod render;

#[macro_use]
extern crate log;
#[macro_use]
extern crate anyhow;
