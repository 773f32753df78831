pub mod field;

use std::collections::BTreeSet;
use std::io::Read;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use field::{FieldKind, FieldSpec, OptionSpec};

/// Errors raised while loading a form schema document.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("failed to parse form schema: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read form schema: {0}")]
    Io(#[from] std::io::Error),
    #[error("field id '{id}' is declared more than once")]
    DuplicateField { id: String },
    #[error("section '{section}' contains a field without an id")]
    EmptyFieldId { section: String },
}

/// One step of the questionnaire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SectionSpec {
    #[serde(rename = "formSection")]
    pub title: String,
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
}

impl SectionSpec {
    pub fn new(title: impl Into<String>, fields: Vec<FieldSpec>) -> Self {
        Self {
            title: title.into(),
            fields,
        }
    }
}

/// Top-level questionnaire definition, loaded once per session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FormSchema {
    #[serde(rename = "formTitle", default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "formSections")]
    pub sections: Vec<SectionSpec>,
}

impl FormSchema {
    pub fn new(sections: Vec<SectionSpec>) -> Self {
        Self {
            title: None,
            sections,
        }
    }

    pub fn from_json_str(raw: &str) -> Result<Self, SchemaError> {
        let schema: FormSchema = serde_json::from_str(raw)?;
        schema.check_identifiers()?;
        Ok(schema)
    }

    pub fn from_reader(mut reader: impl Read) -> Result<Self, SchemaError> {
        let mut raw = String::new();
        reader.read_to_string(&mut raw)?;
        Self::from_json_str(&raw)
    }

    /// JSON Schema describing the schema document itself.
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(FormSchema)
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn section(&self, index: usize) -> Option<&SectionSpec> {
        self.sections.get(index)
    }

    /// Depth-first lookup of a field anywhere in the schema.
    pub fn field(&self, id: &str) -> Option<&FieldSpec> {
        self.sections
            .iter()
            .find_map(|section| find_in(&section.fields, id))
    }

    /// Every field at every nesting level, depth-first in schema order.
    pub fn all_fields(&self) -> Vec<&FieldSpec> {
        let mut out = Vec::new();
        for section in &self.sections {
            push_all(&section.fields, &mut out);
        }
        out
    }

    /// Identifiers must be non-empty and unique across sections and nesting levels,
    /// because the answer store is flat.
    pub fn check_identifiers(&self) -> Result<(), SchemaError> {
        let mut seen = BTreeSet::new();
        for section in &self.sections {
            check_fields(&section.fields, &section.title, &mut seen)?;
        }
        Ok(())
    }
}

fn find_in<'a>(fields: &'a [FieldSpec], id: &str) -> Option<&'a FieldSpec> {
    fields.iter().find_map(|field| {
        if field.id == id {
            Some(field)
        } else {
            find_in(&field.sub_fields, id)
        }
    })
}

fn push_all<'a>(fields: &'a [FieldSpec], out: &mut Vec<&'a FieldSpec>) {
    for field in fields {
        out.push(field);
        push_all(&field.sub_fields, out);
    }
}

fn check_fields<'a>(
    fields: &'a [FieldSpec],
    section: &str,
    seen: &mut BTreeSet<&'a str>,
) -> Result<(), SchemaError> {
    for field in fields {
        if field.id.trim().is_empty() {
            return Err(SchemaError::EmptyFieldId {
                section: section.to_string(),
            });
        }
        if !seen.insert(field.id.as_str()) {
            return Err(SchemaError::DuplicateField {
                id: field.id.clone(),
            });
        }
        check_fields(&field.sub_fields, section, seen)?;
    }
    Ok(())
}
