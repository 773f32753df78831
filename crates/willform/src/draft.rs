//! Work-in-progress answer storage, one slot per key.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use willform_spec::AnswerStore;

pub const DEFAULT_DRAFT_KEY: &str = "willForm";

#[derive(Debug, Error)]
pub enum DraftError {
    #[error("failed to access draft {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("draft {path} is not valid JSON: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid draft key '{0}'")]
    InvalidKey(String),
    #[error("failed to timestamp draft: {0}")]
    Timestamp(#[from] time::error::Format),
}

/// A saved answer set with the slot it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftEnvelope {
    pub key: String,
    /// RFC 3339 timestamp of the save.
    pub saved_at: String,
    pub answers: AnswerStore,
}

impl DraftEnvelope {
    pub fn new(key: impl Into<String>, answers: AnswerStore) -> Result<Self, DraftError> {
        Ok(Self {
            key: key.into(),
            saved_at: OffsetDateTime::now_utc().format(&Rfc3339)?,
            answers,
        })
    }
}

pub trait DraftStore: Send + Sync {
    fn key(&self) -> &str;
    fn load(&self) -> Result<Option<DraftEnvelope>, DraftError>;
    fn save(&self, answers: &AnswerStore) -> Result<DraftEnvelope, DraftError>;
    /// Returns whether a draft existed.
    fn clear(&self) -> Result<bool, DraftError>;
}

/// Stores each draft as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileDraftStore {
    dir: PathBuf,
    key: String,
}

impl FileDraftStore {
    pub fn new(dir: impl Into<PathBuf>, key: impl Into<String>) -> Result<Self, DraftError> {
        let key = key.into();
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.'))
            && !key.starts_with('.');
        if !valid {
            return Err(DraftError::InvalidKey(key));
        }
        Ok(Self {
            dir: dir.into(),
            key,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(format!("{}.json", self.key))
    }

    fn io_error(&self, source: io::Error) -> DraftError {
        DraftError::Io {
            path: self.path(),
            source,
        }
    }
}

impl DraftStore for FileDraftStore {
    fn key(&self) -> &str {
        &self.key
    }

    fn load(&self) -> Result<Option<DraftEnvelope>, DraftError> {
        let path = self.path();
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(self.io_error(err)),
        };
        let envelope = serde_json::from_str(&raw).map_err(|source| DraftError::Json {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loaded draft");
        Ok(Some(envelope))
    }

    fn save(&self, answers: &AnswerStore) -> Result<DraftEnvelope, DraftError> {
        let envelope = DraftEnvelope::new(self.key.clone(), answers.clone())?;
        fs::create_dir_all(&self.dir).map_err(|err| self.io_error(err))?;
        let payload = serde_json::to_string_pretty(&envelope).map_err(|source| DraftError::Json {
            path: self.path(),
            source,
        })?;
        fs::write(self.path(), payload).map_err(|err| self.io_error(err))?;
        tracing::info!(path = %self.path().display(), answers = answers.len(), "saved draft");
        Ok(envelope)
    }

    fn clear(&self) -> Result<bool, DraftError> {
        match fs::remove_file(self.path()) {
            Ok(()) => {
                tracing::info!(path = %self.path().display(), "cleared draft");
                Ok(true)
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(self.io_error(err)),
        }
    }
}

/// Process-local store for embedding and tests.
#[derive(Debug, Default)]
pub struct MemoryDraftStore {
    key: String,
    slot: Mutex<Option<DraftEnvelope>>,
}

impl MemoryDraftStore {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            slot: Mutex::new(None),
        }
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<DraftEnvelope>> {
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl DraftStore for MemoryDraftStore {
    fn key(&self) -> &str {
        &self.key
    }

    fn load(&self) -> Result<Option<DraftEnvelope>, DraftError> {
        Ok(self.slot().clone())
    }

    fn save(&self, answers: &AnswerStore) -> Result<DraftEnvelope, DraftError> {
        let envelope = DraftEnvelope::new(self.key.clone(), answers.clone())?;
        *self.slot() = Some(envelope.clone());
        Ok(envelope)
    }

    fn clear(&self) -> Result<bool, DraftError> {
        Ok(self.slot().take().is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_store_round_trip() {
        let temp = tempfile::TempDir::new().unwrap();
        let store = FileDraftStore::new(temp.path().join("drafts"), DEFAULT_DRAFT_KEY).unwrap();
        assert!(store.load().unwrap().is_none());

        let answers = AnswerStore::new().with("firstName", "Ada");
        let saved = store.save(&answers).unwrap();
        assert_eq!(saved.key, "willForm");
        assert!(OffsetDateTime::parse(&saved.saved_at, &Rfc3339).is_ok());
        assert!(store.path().ends_with("willForm.json"));

        let loaded = store.load().unwrap().expect("draft");
        assert_eq!(loaded.answers, answers);
        assert!(store.clear().unwrap());
        assert!(!store.clear().unwrap());
    }

    #[test]
    fn corrupt_draft_is_reported() {
        let temp = tempfile::TempDir::new().unwrap();
        let store = FileDraftStore::new(temp.path(), "broken").unwrap();
        fs::write(store.path(), "{not json").unwrap();
        assert!(matches!(store.load(), Err(DraftError::Json { .. })));
    }

    #[test]
    fn rejects_path_like_keys() {
        assert!(FileDraftStore::new("/tmp", "../escape").is_err());
        assert!(FileDraftStore::new("/tmp", "").is_err());
    }

    #[test]
    fn memory_store() {
        let store = MemoryDraftStore::new(DEFAULT_DRAFT_KEY);
        store.save(&AnswerStore::new().with("a", "b")).unwrap();
        assert_eq!(store.load().unwrap().unwrap().answers.len(), 1);
        assert!(store.clear().unwrap());
        assert!(store.load().unwrap().is_none());
    }
}
