use std::path::PathBuf;

use async_trait::async_trait;
use willform_spec::ExportDocument;

use super::{DocumentExporter, ExportArtifact, ExportError, ExportFormat, write_output};

/// Writes the prepared document as pretty JSON for external renderers.
#[derive(Debug, Clone)]
pub struct JsonExporter {
    out: PathBuf,
}

impl JsonExporter {
    pub fn new(out: impl Into<PathBuf>) -> Self {
        Self { out: out.into() }
    }
}

#[async_trait]
impl DocumentExporter for JsonExporter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Json
    }

    async fn export(&self, document: &ExportDocument) -> Result<ExportArtifact, ExportError> {
        let mut payload = serde_json::to_vec_pretty(document)?;
        payload.push(b'\n');
        write_output(&self.out, &payload).await?;
        tracing::info!(path = %self.out.display(), bytes = payload.len(), "wrote json export");
        Ok(ExportArtifact {
            path: self.out.clone(),
            format: ExportFormat::Json,
            bytes: payload.len(),
            pages: None,
        })
    }
}
