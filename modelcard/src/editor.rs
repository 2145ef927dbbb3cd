//! Line-oriented card editor.
//!
//! Reads one command per line, turns it into an edit on the
//! [`EditSession`] and prints the result. Errors are reported and the
//! editor keeps running with the previous document.

use std::io::{BufRead, Write};
use std::path::Path as FsPath;

use anyhow::Context;
use cardform::{
    data::{
        EditSession, Path,
        field::{Field, find_field},
        path::read,
    },
    store::DocumentStore,
    templates,
};
use colored::Colorize;

use crate::render::{CardView, FieldTree};

const PROMPT: &str = "modelcard> ";

const HELP: &str = "\
Commands:
  fields [path]         show the form, or the part below `path`
  set <path> <value>    set a text, number, boolean or choice field
  choose <path> <n>     select option `n` of a choice field
  add <path>            append an element to a list
  rm <path> <index>     remove element `index` of a list
  show                  show the card as it will be saved
  json                  print the card as JSON
  template <name>       start over from a bundled template (new cards only)
  schema <file>         start over from a JSON schema file (new cards only)
  save                  write the card to the store
  quit                  leave the editor
  help                  show this help

Paths are dot separated, list elements are addressed by index:
  training_data.sources.0.url";

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

/// Interactive editor over any line source and output sink.
pub struct Editor<R, W> {
    session: EditSession,
    title: Option<String>,
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Editor<R, W> {
    pub fn new(session: EditSession, input: R, output: W) -> Self {
        Self {
            session,
            title: None,
            input,
            output,
        }
    }

    /// Name shown when the editor starts, instead of the card position.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Runs until `quit` or end of input and returns the final session.
    pub fn run(mut self, store: &mut dyn DocumentStore) -> anyhow::Result<EditSession> {
        writeln!(
            self.output,
            "Editing {}. Type `help` for commands.",
            self.title.clone().unwrap_or_else(|| describe(&self.session))
        )?;
        self.print_fields(None)?;

        loop {
            write!(self.output, "{PROMPT}")?;
            self.output.flush()?;
            let Some(line) = self.read_line()? else {
                if self.session.needs_save {
                    warn!("input closed with unsaved changes");
                    writeln!(self.output, "{}", "Unsaved changes discarded.".yellow())?;
                }
                break;
            };
            match self.execute(line.trim(), store) {
                Ok(Flow::Continue) => {}
                Ok(Flow::Exit) => break,
                Err(e) => {
                    writeln!(self.output, "{}", format!("error: {e:#}").red())?;
                }
            }
        }
        Ok(self.session)
    }

    fn read_line(&mut self) -> anyhow::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }

    fn execute(&mut self, line: &str, store: &mut dyn DocumentStore) -> anyhow::Result<Flow> {
        let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();
        debug!("editor command `{command}` `{rest}`");

        match command {
            "" => {}
            "help" | "?" => writeln!(self.output, "{HELP}")?,
            "fields" | "ls" => {
                let at = (!rest.is_empty()).then(|| Path::parse(rest));
                self.print_fields(at.as_ref())?;
            }
            "set" => {
                let (path, value) = rest.split_once(' ').unwrap_or((rest, ""));
                if path.is_empty() {
                    bail!("usage: set <path> <value>");
                }
                self.session.input(&Path::parse(path), value.trim())?;
                self.print_value(path)?;
            }
            "choose" => {
                let mut args = rest.split_whitespace();
                let (Some(path), Some(n)) = (args.next(), args.next()) else {
                    bail!("usage: choose <path> <n>");
                };
                let n: usize = n.parse().with_context(|| format!("`{n}` is not an option number"))?;
                let edit = self.with_field(path, |field| Ok(field.select(n)?))?;
                self.session.apply(&edit)?;
                self.print_value(path)?;
            }
            "add" => {
                if rest.is_empty() {
                    bail!("usage: add <path>");
                }
                let edit = self.with_field(rest, |field| {
                    field.append().ok_or_else(|| anyhow!("`{rest}` is not a list"))
                })?;
                self.session.apply(&edit)?;
                self.print_fields(Some(&Path::parse(rest)))?;
            }
            "rm" => {
                let mut args = rest.split_whitespace();
                let (Some(path), Some(index)) = (args.next(), args.next()) else {
                    bail!("usage: rm <path> <index>");
                };
                let index: usize = index
                    .parse()
                    .with_context(|| format!("`{index}` is not an index"))?;
                let edit = self.with_field(path, |field| {
                    field
                        .remove(index)
                        .ok_or_else(|| anyhow!("`{path}` is not a list"))
                })?;
                self.session.apply(&edit)?;
                self.print_fields(Some(&Path::parse(path)))?;
            }
            "show" => write!(self.output, "{}", CardView(&self.session.document))?,
            "json" => writeln!(self.output, "{}", self.session.export()?)?,
            "template" => {
                self.ensure_new_card()?;
                let template = templates::find_template(rest)?;
                self.session.select_template(template)?;
                writeln!(self.output, "Switched to {}.", template.label)?;
                self.print_fields(None)?;
            }
            "schema" => {
                self.ensure_new_card()?;
                if rest.is_empty() {
                    bail!("usage: schema <file>");
                }
                let (name, text) = read_schema_file(FsPath::new(rest))?;
                self.session.load_custom_schema(&name, &text)?;
                writeln!(self.output, "Switched to schema {name}.")?;
                self.print_fields(None)?;
            }
            "save" => {
                let index = self.session.save(store)?;
                writeln!(self.output, "{}", format!("Saved card {index}.").green())?;
            }
            "quit" | "exit" | "q" => {
                if self.session.needs_save && !self.confirm("Discard unsaved changes? [y/N] ")? {
                    return Ok(Flow::Continue);
                }
                return Ok(Flow::Exit);
            }
            other => bail!("unknown command `{other}`, type `help` for a list"),
        }
        Ok(Flow::Continue)
    }

    fn with_field<T>(
        &self,
        path: &str,
        f: impl FnOnce(&Field<'_>) -> anyhow::Result<T>,
    ) -> anyhow::Result<T> {
        let fields = self.session.fields();
        let field = find_field(&fields, &Path::parse(path))
            .ok_or_else(|| anyhow!("no field at `{path}`"))?;
        f(field)
    }

    fn ensure_new_card(&self) -> anyhow::Result<()> {
        if self.session.origin.is_some() {
            bail!("the schema of a saved card cannot be changed");
        }
        if self.session.needs_save {
            warn!("discarding unsaved edits for a new schema");
        }
        Ok(())
    }

    fn confirm(&mut self, question: &str) -> anyhow::Result<bool> {
        write!(self.output, "{}", question.yellow())?;
        self.output.flush()?;
        let answer = self.read_line()?.unwrap_or_default();
        Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
    }

    fn print_fields(&mut self, at: Option<&Path>) -> anyhow::Result<()> {
        let fields = self.session.fields();
        match at {
            None => write!(self.output, "{}", FieldTree(&fields))?,
            Some(path) => {
                let field = find_field(&fields, path).ok_or_else(|| anyhow!("no field at `{path}`"))?;
                write!(self.output, "{}", FieldTree(std::slice::from_ref(field)))?;
            }
        }
        Ok(())
    }

    /// Echoes an assigned value, as a field line when the form renders one.
    fn print_value(&mut self, path: &str) -> anyhow::Result<()> {
        let path = Path::parse(path);
        let fields = self.session.fields();
        match find_field(&fields, &path) {
            Some(field) => write!(self.output, "{}", FieldTree(std::slice::from_ref(field)))?,
            None => {
                let value = read(&self.session.document, &path)
                    .map(ToString::to_string)
                    .unwrap_or_default();
                writeln!(self.output, "{} {}", format!("({path})").dimmed(), value.cyan())?;
            }
        }
        Ok(())
    }
}

fn describe(session: &EditSession) -> String {
    match session.origin {
        Some(index) => format!("card {index}"),
        None => "a new card".to_string(),
    }
}

/// Reads a schema file, returning its file name and content.
pub fn read_schema_file(path: &FsPath) -> anyhow::Result<(String, String)> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read schema {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());
    Ok((name, text))
}
