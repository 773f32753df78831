//! Subcommand implementations and the argument groups they share.

pub mod answer;
pub mod check;
pub mod draft;
pub mod export;
pub mod interpolate;
pub mod preview;
pub mod schema;

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use clap::Args;
use willform_spec::{AnswerStore, FormSchema};

use crate::config::Config;
use crate::draft::DraftStore;

#[derive(Args, Debug, Clone, Default)]
pub struct SchemaSource {
    /// Form schema document; defaults to `schema` in willform.toml
    #[arg(long = "schema", value_name = "form.json")]
    pub schema: Option<PathBuf>,
}

impl SchemaSource {
    pub fn load(&self, config: &Config) -> Result<Arc<FormSchema>> {
        let path = self
            .schema
            .clone()
            .or_else(|| config.schema.clone())
            .ok_or_else(|| anyhow!("no form schema given; pass --schema or set `schema` in willform.toml"))?;
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("failed to read form schema {}", path.display()))?;
        let schema = FormSchema::from_json_str(&raw)
            .with_context(|| format!("failed to load form schema {}", path.display()))?;
        tracing::debug!(path = %path.display(), sections = schema.len(), "loaded form schema");
        Ok(Arc::new(schema))
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct AnswersSource {
    /// Answer store as a JSON object; defaults to the saved draft
    #[arg(long = "answers", value_name = "answers.json")]
    pub answers: Option<PathBuf>,
}

impl AnswersSource {
    pub fn load(&self, config: &Config) -> Result<AnswerStore> {
        if let Some(path) = &self.answers {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read answers {}", path.display()))?;
            return AnswerStore::from_json_str(&raw)
                .with_context(|| format!("answers {} are not a JSON object", path.display()));
        }
        let store = config.draft_store()?;
        match store.load()? {
            Some(envelope) => Ok(envelope.answers),
            None => {
                tracing::info!(path = %store.path().display(), "no draft saved, starting empty");
                Ok(AnswerStore::new())
            }
        }
    }
}
