//! Questionnaire sessions, draft storage, document export and the
//! `willform` command line, built on `willform-spec`.

pub mod cli;
pub mod cmd;
pub mod config;
pub mod draft;
pub mod exporter;
pub mod logging;
pub mod session;

pub use config::{Config, ConfigError};
pub use draft::{DraftEnvelope, DraftError, DraftStore, FileDraftStore, MemoryDraftStore};
pub use exporter::{
    DocumentExporter, ExportArtifact, ExportError, ExportFormat, JsonExporter, PageLayout,
    TextExporter, exporter_for,
};
pub use session::{Advance, ExportFailure, MissingField, Progress, Session, SessionError};
