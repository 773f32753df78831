//! A respondent's pass through the questionnaire.
//!
//! The session owns the answer store and the navigation position. Every
//! view (preview, completion, missing answers) is recomputed from the
//! schema and the current answers on demand, so nothing can go stale.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use willform_spec::interpolate::fallback_alias;
use willform_spec::{
    AnswerStore, AnswerValue, FailurePolicy, FieldKind, FormSchema, ResolvedClause, Scalar,
    SectionSpec, collect_clauses, is_form_complete_with, is_section_complete, prepare_export,
    unsatisfied_fields,
};

use crate::draft::{DraftError, DraftStore};
use crate::exporter::{DocumentExporter, ExportArtifact};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("unknown field '{0}'")]
    UnknownField(String),
    #[error("field '{0}' is not a checkbox group")]
    NotACheckboxGroup(String),
    #[error("section {index} does not exist (form has {len} sections)")]
    NoSuchSection { index: usize, len: usize },
    #[error("section '{section}' is missing required answers: {}", missing.join(", "))]
    Incomplete {
        section: String,
        missing: Vec<String>,
    },
    #[error(transparent)]
    Draft(#[from] DraftError),
}

/// Human-readable reason an export did not happen. The session and its
/// answers are unchanged when this is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ExportFailure {
    pub message: String,
}

impl ExportFailure {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Moved(usize),
    Submitted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    /// One-based position.
    pub step: usize,
    pub total: usize,
}

impl std::fmt::Display for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Step {} of {}", self.step, self.total)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MissingField {
    pub section_index: usize,
    pub section: String,
    pub field_id: String,
}

pub struct Session {
    schema: Arc<FormSchema>,
    answers: AnswerStore,
    current: usize,
    submitted: bool,
    policy: FailurePolicy,
    draft: Option<Box<dyn DraftStore>>,
}

impl Session {
    pub fn new(schema: Arc<FormSchema>) -> Self {
        Self {
            schema,
            answers: AnswerStore::new(),
            current: 0,
            submitted: false,
            policy: FailurePolicy::default(),
            draft: None,
        }
    }

    pub fn with_answers(mut self, answers: AnswerStore) -> Self {
        self.answers = answers;
        self
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Attaches a draft store; every later mutation is saved to it.
    pub fn with_draft(mut self, draft: Box<dyn DraftStore>) -> Self {
        self.draft = Some(draft);
        self
    }

    /// Replaces the answers with the stored draft, if there is one.
    pub fn restore_draft(&mut self) -> Result<bool, SessionError> {
        let Some(draft) = &self.draft else {
            return Ok(false);
        };
        match draft.load()? {
            Some(envelope) => {
                tracing::info!(key = %envelope.key, saved_at = %envelope.saved_at, "restored draft");
                self.answers = envelope.answers;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    pub fn answers(&self) -> &AnswerStore {
        &self.answers
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    pub fn set_answer(
        &mut self,
        field: &str,
        value: impl Into<AnswerValue>,
    ) -> Result<(), SessionError> {
        self.check_writable(field)?;
        self.answers.set(field, value);
        tracing::debug!(field, "answer updated");
        self.autosave()
    }

    pub fn toggle_option(
        &mut self,
        field: &str,
        option: impl Into<Scalar>,
        checked: bool,
    ) -> Result<(), SessionError> {
        match self.schema.field(field) {
            Some(spec) if spec.kind == FieldKind::CheckboxGroup => {}
            Some(_) => return Err(SessionError::NotACheckboxGroup(field.to_string())),
            None => return Err(SessionError::UnknownField(field.to_string())),
        }
        self.answers.toggle_option(field, option.into(), checked);
        tracing::debug!(field, checked, "option toggled");
        self.autosave()
    }

    pub fn clear_answer(&mut self, field: &str) -> Result<(), SessionError> {
        self.check_writable(field)?;
        self.answers.clear(field);
        self.autosave()
    }

    pub fn save_draft(&self) -> Result<bool, SessionError> {
        match &self.draft {
            Some(draft) => {
                draft.save(&self.answers)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_section(&self) -> Option<&SectionSpec> {
        self.schema.section(self.current)
    }

    pub fn progress(&self) -> Progress {
        Progress {
            step: self.current + 1,
            total: self.schema.len(),
        }
    }

    /// Moves forward when the current section is complete. Leaving the last
    /// section submits the form and discards the draft.
    pub fn next(&mut self) -> Result<Advance, SessionError> {
        let len = self.schema.len();
        let section = self
            .schema
            .section(self.current)
            .ok_or(SessionError::NoSuchSection {
                index: self.current,
                len,
            })?;
        let missing = unsatisfied_fields(section, &self.answers);
        if !missing.is_empty() {
            return Err(SessionError::Incomplete {
                section: section.title.clone(),
                missing,
            });
        }
        if self.current + 1 < len {
            self.current += 1;
            tracing::debug!(section = self.current, "moved to next section");
            return Ok(Advance::Moved(self.current));
        }
        self.submitted = true;
        if let Some(draft) = &self.draft
            && let Err(err) = draft.clear()
        {
            tracing::warn!(error = %err, "failed to clear draft after submit");
        }
        tracing::info!(sections = len, "form submitted");
        Ok(Advance::Submitted)
    }

    /// Steps back one section; stays put on the first.
    pub fn back(&mut self) -> usize {
        self.current = self.current.saturating_sub(1);
        self.current
    }

    /// Jumps to any section, as the sidebar allows.
    pub fn jump_to(&mut self, index: usize) -> Result<(), SessionError> {
        let len = self.schema.len();
        if index >= len {
            return Err(SessionError::NoSuchSection { index, len });
        }
        self.current = index;
        Ok(())
    }

    /// Clauses from the first section through the current one.
    pub fn preview(&self) -> Vec<ResolvedClause> {
        collect_clauses(&self.schema, &self.answers, self.current)
    }

    pub fn missing_required(&self) -> Vec<MissingField> {
        self.schema
            .sections
            .iter()
            .enumerate()
            .flat_map(|(index, section)| {
                unsatisfied_fields(section, &self.answers)
                    .into_iter()
                    .map(move |field_id| MissingField {
                        section_index: index,
                        section: section.title.clone(),
                        field_id,
                    })
            })
            .collect()
    }

    pub fn is_section_complete(&self, index: usize) -> bool {
        self.schema
            .section(index)
            .is_some_and(|section| is_section_complete(section, &self.answers))
    }

    pub fn can_export(&self) -> bool {
        is_form_complete_with(&self.schema, &self.answers, self.policy)
    }

    /// Hands a frozen snapshot to `exporter`. Incomplete forms are refused
    /// unless `force` is set.
    pub async fn export(
        &self,
        exporter: &dyn DocumentExporter,
        force: bool,
    ) -> Result<ExportArtifact, ExportFailure> {
        if !force && !self.can_export() {
            let missing = self.missing_required().len();
            return Err(ExportFailure::new(format!(
                "The will cannot be exported yet: {missing} required answer(s) are missing."
            )));
        }
        let document = prepare_export(&self.schema, &self.answers);
        tracing::info!(
            format = ?exporter.format(),
            clauses = document.clauses.len(),
            force,
            "exporting document"
        );
        exporter.export(&document).await.map_err(|err| {
            tracing::error!(error = %err, "export failed");
            ExportFailure::new(format!(
                "Export failed: {err}. Your answers have been kept, please try again."
            ))
        })
    }

    fn check_writable(&self, key: &str) -> Result<(), SessionError> {
        if self.schema.field(key).is_some() || self.is_section_storage_key(key) {
            Ok(())
        } else {
            Err(SessionError::UnknownField(key.to_string()))
        }
    }

    /// Repeatable sections may store their rows under an alias such as
    /// `guardianData` rather than the section id.
    fn is_section_storage_key(&self, key: &str) -> bool {
        self.schema
            .all_fields()
            .into_iter()
            .filter(|field| field.kind == FieldKind::Section)
            .any(|field| fallback_alias(&field.id) == key)
    }

    fn autosave(&self) -> Result<(), SessionError> {
        self.save_draft().map(|_| ())
    }
}
