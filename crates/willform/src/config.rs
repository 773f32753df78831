//! `willform.toml` handling.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use willform_spec::FailurePolicy;

use crate::draft::{DEFAULT_DRAFT_KEY, DraftError, FileDraftStore};
use crate::exporter::{ExportError, PageLayout};

pub const CONFIG_FILE: &str = "willform.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("config file {0} does not exist")]
    NotFound(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Form schema used when a command gets no `--schema`.
    pub schema: Option<PathBuf>,
    pub draft: DraftConfig,
    pub export: ExportConfig,
    pub log: LogConfig,
    /// File the values were read from.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DraftConfig {
    pub dir: Option<PathBuf>,
    pub key: String,
}

impl Default for DraftConfig {
    fn default() -> Self {
        Self {
            dir: None,
            key: DEFAULT_DRAFT_KEY.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub page_width: usize,
    pub page_height: usize,
    /// Treat an internal completion-check failure as "incomplete".
    pub fail_closed: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        let layout = PageLayout::default();
        Self {
            page_width: layout.width,
            page_height: layout.height,
            fail_closed: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

impl Config {
    /// Loads `explicit` when given (it must exist), otherwise the first of
    /// `./willform.toml` and the user config directory. Defaults apply when
    /// nothing is found.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            return Self::from_file(path);
        }
        let candidates = [
            Some(PathBuf::from(CONFIG_FILE)),
            project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE)),
        ];
        for path in candidates.into_iter().flatten() {
            if path.is_file() {
                return Self::from_file(&path);
            }
        }
        tracing::debug!("no config file found, using defaults");
        Ok(Self::default())
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        config.schema = config.schema.map(|schema| base.join(schema));
        config.draft.dir = config.draft.dir.map(|dir| base.join(dir));
        config.source = Some(path.to_path_buf());
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    /// Configured directory, else the platform data directory, else `./.willform`.
    pub fn draft_dir(&self) -> PathBuf {
        self.draft
            .dir
            .clone()
            .or_else(|| project_dirs().map(|dirs| dirs.data_dir().join("drafts")))
            .unwrap_or_else(|| PathBuf::from(".willform"))
    }

    pub fn draft_store(&self) -> Result<FileDraftStore, DraftError> {
        FileDraftStore::new(self.draft_dir(), self.draft.key.clone())
    }

    pub fn failure_policy(&self) -> FailurePolicy {
        if self.export.fail_closed {
            FailurePolicy::Closed
        } else {
            FailurePolicy::Open
        }
    }

    pub fn layout(&self) -> Result<PageLayout, ExportError> {
        PageLayout::new(self.export.page_width, self.export.page_height)
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("org", "willform", "willform")
}
