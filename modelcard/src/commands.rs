//! Handlers behind the `modelcard` subcommands.
//!
//! Each handler takes the application context plus the input and output
//! streams, so the binary passes stdin/stdout and tests pass buffers.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::Context;
use cardform::{
    data::{Doc, EditSession},
    library,
    store::{DocumentStore, MemoryStore},
    templates,
};
use colored::Colorize;

use crate::{
    config::CliConfig,
    ctx::AppContext,
    editor::{Editor, read_schema_file},
    render::{CardView, SummaryTable, TemplateList},
};

/// Handler for card commands.
pub struct CardHandler;

impl CardHandler {
    /// Lists the bundled templates.
    pub fn templates(out: &mut impl Write) -> anyhow::Result<()> {
        write!(out, "{}", TemplateList(templates::templates()))?;
        Ok(())
    }

    /// Lists saved cards, optionally filtered by model name.
    pub fn list(ctx: &AppContext, search: Option<&str>, out: &mut impl Write) -> anyhow::Result<()> {
        let records = ctx.store().read_all()?;
        let rows = match search {
            Some(term) => library::search(&records, term),
            None => library::summaries(&records),
        };
        write!(out, "{}", SummaryTable(&rows))?;
        Ok(())
    }

    /// Prints one card section by section.
    pub fn show(ctx: &AppContext, index: usize, out: &mut impl Write) -> anyhow::Result<()> {
        let record = ctx.store().get(index)?;
        let title = library::model_name(&record.card).unwrap_or("Unnamed Model");
        writeln!(out, "{}\n", title.bold())?;
        write!(out, "{}", CardView(&record.card))?;
        Ok(())
    }

    /// Creates a card from a template or a schema file and opens the editor.
    ///
    /// Without either, the configured default template is used.
    pub fn new_card(
        ctx: &AppContext,
        template: Option<&str>,
        schema: Option<PathBuf>,
        input: impl BufRead,
        out: &mut impl Write,
    ) -> anyhow::Result<()> {
        let session = match schema {
            Some(path) => {
                let (name, text) = read_schema_file(&path)?;
                EditSession::from_custom(&name, &text)
                    .with_context(|| format!("Invalid schema {}", path.display()))?
            }
            None => {
                let name = template.unwrap_or(ctx.config.default_template.as_str());
                EditSession::from_template(templates::find_template(name)?)?
            }
        };
        info!("new card with schema {:?}", session.source);
        let mut store = ctx.store();
        Editor::new(session, input, out).run(&mut store)?;
        Ok(())
    }

    /// Opens a saved card in the editor.
    pub fn edit(
        ctx: &AppContext,
        index: usize,
        input: impl BufRead,
        out: &mut impl Write,
    ) -> anyhow::Result<()> {
        let mut store = ctx.store();
        let session = EditSession::open(&store, index)?;
        Editor::new(session, input, out).run(&mut store)?;
        Ok(())
    }

    /// Removes a card. Later cards move up by one position.
    pub fn delete(ctx: &AppContext, index: usize, out: &mut impl Write) -> anyhow::Result<()> {
        let mut store = ctx.store();
        let removed = store.delete(index)?;
        let title = library::model_name(&removed.card).unwrap_or("Unnamed Model");
        writeln!(out, "{}", format!("Deleted card {index} ({title}).").green())?;
        Ok(())
    }

    /// Writes a card as pretty JSON.
    ///
    /// Without `dest` the file goes to the export directory, named after the
    /// model.
    pub fn export(
        ctx: &AppContext,
        index: usize,
        dest: Option<PathBuf>,
        out: &mut impl Write,
    ) -> anyhow::Result<PathBuf> {
        let record = ctx.store().get(index)?;
        let dest = match dest {
            Some(dest) => dest,
            None => ctx.export_dir().join(library::export_file_name(&record.card)),
        };
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&dest, library::export_json(&record.card)?)
            .with_context(|| format!("Failed to write {}", dest.display()))?;
        writeln!(out, "{}", format!("Exported card {index} to {}", dest.display()).green())?;
        Ok(dest)
    }
}

/// Handler for the settings editor.
pub struct SettingsHandler;

impl SettingsHandler {
    /// Edits `.modelcard.toml` with the form editor.
    ///
    /// The form is generated from the settings schema and starts from the
    /// current settings. `save` writes the file; quitting without saving
    /// leaves it untouched.
    pub fn handle(
        ctx: &mut AppContext,
        input: impl BufRead,
        out: &mut impl Write,
    ) -> anyhow::Result<()> {
        info!("configuring {}", ctx.config_path.display());
        let mut session = EditSession::from_custom("settings", &CliConfig::schema_json()?)?;
        session.document = Doc::from(serde_json::to_value(&ctx.config)?);

        let mut staged = MemoryStore::new();
        let title = format!("settings ({})", ctx.config_path.display());
        Editor::new(session, input, &mut *out)
            .with_title(title)
            .run(&mut staged)?;

        let Some(last) = staged.read_all()?.pop() else {
            writeln!(out, "\nSettings unchanged")?;
            return Ok(());
        };
        ctx.config = serde_json::from_value(last.card.to_json())
            .context("Saved settings do not match the settings format")?;
        ctx.save_config()?;
        writeln!(out, "\nSettings saved to {}", ctx.config_path.display())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CONFIG_FILE_NAME;
    use std::io::Cursor;

    fn context() -> (tempfile::TempDir, AppContext) {
        colored::control::set_override(false);
        let dir = tempfile::tempdir().unwrap();
        let ctx = AppContext::load(dir.path().to_path_buf(), None).unwrap();
        (dir, ctx)
    }

    fn text(out: Vec<u8>) -> String {
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_new_list_show_export_delete() {
        let (dir, ctx) = context();
        let script = "set identity_and_basic_information.model_name Fraud Scorer\n\
                      set identity_and_basic_information.overview Flags risky payments\n\
                      save\nquit\n";
        let mut out = Vec::new();
        CardHandler::new_card(&ctx, Some("v3"), None, Cursor::new(script), &mut out).unwrap();
        assert!(text(out).contains("Saved card 0."));

        let mut out = Vec::new();
        CardHandler::list(&ctx, Some("fraud"), &mut out).unwrap();
        let listing = text(out);
        assert!(listing.contains("   0  Fraud Scorer  Flags risky payments"), "{listing}");

        let mut out = Vec::new();
        CardHandler::show(&ctx, 0, &mut out).unwrap();
        let shown = text(out);
        assert!(shown.starts_with("Fraud Scorer\n"));
        assert!(shown.contains("Card Metadata"));

        let mut out = Vec::new();
        let path = CardHandler::export(&ctx, 0, None, &mut out).unwrap();
        assert_eq!(path, dir.path().join(".").join("Fraud Scorer.json"));
        let exported: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(
            exported["identity_and_basic_information"]["model_name"],
            "Fraud Scorer"
        );
        assert_eq!(exported["card_metadata"]["schema_version"], "3");

        let mut out = Vec::new();
        CardHandler::delete(&ctx, 0, &mut out).unwrap();
        assert!(text(out).contains("Deleted card 0 (Fraud Scorer)."));
        assert!(CardHandler::show(&ctx, 0, &mut Vec::new()).is_err());
    }

    #[test]
    fn test_edit_keeps_position() {
        let (_dir, ctx) = context();
        for name in ["first", "second"] {
            let script = format!("set identity_and_basic_information.model_name {name}\nsave\nquit\n");
            CardHandler::new_card(&ctx, None, None, Cursor::new(script), &mut Vec::new()).unwrap();
        }
        let script = "set identity_and_basic_information.model_name renamed\nsave\nquit\n";
        CardHandler::edit(&ctx, 1, Cursor::new(script), &mut Vec::new()).unwrap();

        let records = ctx.store().read_all().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(library::model_name(&records[0].card), Some("first"));
        assert_eq!(library::model_name(&records[1].card), Some("renamed"));
    }

    #[test]
    fn test_new_from_schema_file() {
        let (dir, ctx) = context();
        let schema = dir.path().join("tiny.json");
        std::fs::write(&schema, r#"{"type":"object","properties":{"note":{"type":"string"}}}"#)
            .unwrap();
        CardHandler::new_card(
            &ctx,
            None,
            Some(schema),
            Cursor::new("set note hello\nsave\nquit\n"),
            &mut Vec::new(),
        )
        .unwrap();

        // Reopening uses the schema stored with the card.
        let session = EditSession::open(&ctx.store(), 0).unwrap();
        assert_eq!(session.fields()[0].key, "note");
    }

    #[test]
    fn test_unknown_template_is_an_error() {
        let (_dir, ctx) = context();
        let err = CardHandler::new_card(&ctx, Some("v9"), None, Cursor::new(""), &mut Vec::new())
            .unwrap_err();
        assert!(err.to_string().contains("v9"));
    }

    #[test]
    fn test_templates_listing() {
        colored::control::set_override(false);
        let mut out = Vec::new();
        CardHandler::templates(&mut out).unwrap();
        assert_eq!(text(out).lines().count(), templates::templates().len());
    }

    #[test]
    fn test_settings_saved() {
        let (dir, mut ctx) = context();
        let script = "set backup on\nset default_template v2\nsave\nquit\n";
        let mut out = Vec::new();
        SettingsHandler::handle(&mut ctx, Cursor::new(script), &mut out).unwrap();
        assert!(text(out).contains("Settings saved"));

        let saved = CliConfig::load(&dir.path().join(CONFIG_FILE_NAME)).unwrap();
        assert!(saved.backup);
        assert_eq!(saved.default_template, "v2");
        assert_eq!(saved.store_path, CliConfig::default().store_path);
    }

    #[test]
    fn test_settings_unchanged_without_save() {
        let (dir, mut ctx) = context();
        let mut out = Vec::new();
        SettingsHandler::handle(&mut ctx, Cursor::new("set backup on\nquit\ny\n"), &mut out)
            .unwrap();
        assert!(text(out).contains("Settings unchanged"));
        assert!(!dir.path().join(CONFIG_FILE_NAME).exists());
        assert!(!ctx.config.backup);
    }
}
