//! Document exporters: the boundary where a prepared will leaves the engine.

mod json;
mod text;

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use willform_spec::ExportDocument;

pub use json::JsonExporter;
pub use text::{PageLayout, TextExporter};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to encode document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to register page template '{name}': {message}")]
    Template { name: String, message: String },
    #[error("failed to render page: {0}")]
    Render(#[from] handlebars::RenderError),
    #[error("invalid page layout: {0}")]
    Layout(String),
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    #[default]
    Text,
    Json,
}

/// What an exporter produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportArtifact {
    pub path: PathBuf,
    pub format: ExportFormat,
    pub bytes: usize,
    /// Page count for paginated formats.
    pub pages: Option<usize>,
}

#[async_trait]
pub trait DocumentExporter: Send + Sync {
    fn format(&self) -> ExportFormat;

    async fn export(&self, document: &ExportDocument) -> Result<ExportArtifact, ExportError>;
}

/// Builds the exporter for `format` writing to `out`.
pub fn exporter_for(
    format: ExportFormat,
    out: impl Into<PathBuf>,
    layout: PageLayout,
) -> Box<dyn DocumentExporter> {
    match format {
        ExportFormat::Text => Box::new(TextExporter::new(out, layout)),
        ExportFormat::Json => Box::new(JsonExporter::new(out)),
    }
}

pub(crate) async fn write_output(path: &Path, contents: &[u8]) -> Result<(), ExportError> {
    let io_error = |source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await.map_err(io_error)?;
    }
    tokio::fs::write(path, contents).await.map_err(io_error)
}
