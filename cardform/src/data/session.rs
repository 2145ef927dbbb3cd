use crate::{
    data::{
        doc::Doc,
        field::{Field, find_field},
        mutation::Edit,
        path::{self, Path},
        schema::SchemaNode,
        synth::synthesize,
        walker::{build_field, build_field_tree},
    },
    error::{FormError, Result},
    library::export_json,
    store::{CardRecord, DocumentStore, SchemaSource},
    templates::{self, Template, TemplateMatch},
};

/// State of one card being created or edited.
///
/// A session owns its document value; edits replace it with the next
/// version produced by the mutation engine.
#[derive(Debug, Clone)]
pub struct EditSession {
    /// Schema driving the form.
    pub schema: SchemaNode,
    /// Where [`EditSession::schema`] came from, persisted with the card.
    pub source: SchemaSource,
    /// Current document version.
    pub document: Doc,
    /// Store position the card was opened from. `None` for new cards.
    pub origin: Option<usize>,
    /// Whether there are edits not yet written to the store.
    pub needs_save: bool,
}

impl EditSession {
    /// Starts a new card from a bundled template.
    pub fn from_template(template: &Template) -> Result<Self> {
        let schema = template.schema()?;
        Ok(Self::fresh(
            schema,
            SchemaSource::Bundled {
                version: template.version,
            },
        ))
    }

    /// Starts a new card from schema text uploaded by the user.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::SchemaParse`] when `text` is not valid JSON.
    pub fn from_custom(name: &str, text: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(text).map_err(FormError::SchemaParse)?;
        Ok(Self::fresh(
            SchemaNode::from_value(&value),
            SchemaSource::Custom {
                name: name.to_string(),
                schema: value,
            },
        ))
    }

    fn fresh(schema: SchemaNode, source: SchemaSource) -> Self {
        let document = synthesize(&schema);
        Self {
            schema,
            source,
            document,
            origin: None,
            needs_save: false,
        }
    }

    /// Opens the card stored at `index` for editing.
    ///
    /// The recorded schema is used when present. Records without one fall
    /// back to guessing among the bundled templates, then to the default
    /// template.
    pub fn open(store: &dyn DocumentStore, index: usize) -> Result<Self> {
        let record = store.get(index)?;
        let (schema, source) = resolve_schema(&record)?;
        info!("opened card {index} with schema {source:?}");
        Ok(Self {
            schema,
            source,
            document: record.card,
            origin: Some(index),
            needs_save: false,
        })
    }

    /// Switches to a bundled template, discarding the current document.
    pub fn select_template(&mut self, template: &Template) -> Result<()> {
        let schema = template.schema()?;
        *self = Self {
            origin: self.origin,
            ..Self::fresh(
                schema,
                SchemaSource::Bundled {
                    version: template.version,
                },
            )
        };
        Ok(())
    }

    /// Switches to an uploaded schema, discarding the current document.
    ///
    /// On a parse error the session keeps its previous schema and document.
    pub fn load_custom_schema(&mut self, name: &str, text: &str) -> Result<()> {
        let next = Self::from_custom(name, text)?;
        *self = Self {
            origin: self.origin,
            ..next
        };
        Ok(())
    }

    /// Field tree for the current document.
    pub fn fields(&self) -> Vec<Field<'_>> {
        build_field_tree(&self.schema, Some(&self.document), &Path::root())
    }

    /// Applies one edit and marks the session dirty.
    ///
    /// On error the document is left unchanged.
    pub fn apply(&mut self, edit: &Edit) -> Result<()> {
        let next = edit.apply(&self.document)?;
        debug!("applied {edit:?}");
        self.document = next;
        self.needs_save = true;
        Ok(())
    }

    /// Coerces raw text for the field at `path` and applies it.
    ///
    /// Paths the form does not render, such as properties below a list
    /// element that is not an object yet, are coerced with the schema node
    /// found along the path.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::InvalidInput`] when the schema has no node at
    /// `path` or the text does not fit the field.
    pub fn input(&mut self, path: &Path, raw: &str) -> Result<()> {
        let edit = {
            let fields = self.fields();
            match find_field(&fields, path) {
                Some(field) => field.input(raw)?,
                None => self.input_by_schema(path, raw)?,
            }
        };
        self.apply(&edit)
    }

    fn input_by_schema(&self, path: &Path, raw: &str) -> Result<Edit> {
        let no_field = || FormError::invalid_input(path, "no field at this path");
        let node = self.schema.resolve(path).ok_or_else(no_field)?;
        let key = path
            .segments()
            .last()
            .map(ToString::to_string)
            .unwrap_or_default();
        debug!("`{path}` is not rendered, coercing with its schema node");
        build_field(&key, node, path::read(&self.document, path), path.clone())
            .ok_or_else(no_field)?
            .input(raw)
    }

    /// The record that [`EditSession::save`] would write.
    pub fn record(&self) -> CardRecord {
        CardRecord {
            schema: self.source.clone(),
            card: self.document.clone(),
        }
    }

    /// Writes the card back: replaces the opened card, or appends a new one.
    ///
    /// Returns the card's store position.
    pub fn save(&mut self, store: &mut dyn DocumentStore) -> Result<usize> {
        let index = match self.origin {
            Some(index) => {
                store.replace(index, self.record())?;
                index
            }
            None => {
                let index = store.append(self.record())?;
                self.origin = Some(index);
                index
            }
        };
        self.needs_save = false;
        info!("saved card {index}");
        Ok(index)
    }

    /// Pretty JSON of the current document.
    pub fn export(&self) -> Result<String> {
        export_json(&self.document)
    }
}

fn resolve_schema(record: &CardRecord) -> Result<(SchemaNode, SchemaSource)> {
    match &record.schema {
        SchemaSource::Custom { schema, .. } => {
            return Ok((SchemaNode::from_value(schema), record.schema.clone()));
        }
        SchemaSource::Bundled { version } => match templates::by_version(*version) {
            Some(template) => return Ok((template.schema()?, record.schema.clone())),
            None => warn!("card refers to unknown template version {version}"),
        },
        SchemaSource::Unknown => {}
    }

    let template = match templates::infer_template(&record.card) {
        TemplateMatch::Unique(template) => template,
        TemplateMatch::Ambiguous(found) => {
            let labels: Vec<_> = found.iter().map(|t| t.label).collect();
            warn!("card matches several templates {labels:?}, using the default");
            templates::default_template()
        }
        TemplateMatch::NoMatch => {
            warn!("card matches no bundled template, using the default");
            templates::default_template()
        }
    };
    Ok((
        template.schema()?,
        SchemaSource::Bundled {
            version: template.version,
        },
    ))
}
