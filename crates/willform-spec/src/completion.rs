use std::panic::{self, AssertUnwindSafe};

use crate::answers::{AnswerStore, AnswerValue};
use crate::schema::{FieldKind, FieldSpec, FormSchema, SectionSpec};
use crate::walk::{is_active, is_participating};

/// Outcome of a whole-form completion check that failed internally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Treat the form as complete so a defect never blocks export.
    #[default]
    Open,
    /// Treat the form as incomplete.
    Closed,
}

/// Identifiers of the top-level fields of `section` that block progression.
pub fn unsatisfied_fields(section: &SectionSpec, answers: &AnswerStore) -> Vec<String> {
    section
        .fields
        .iter()
        .filter(|field| !is_satisfied(field, answers))
        .map(|field| field.id.clone())
        .collect()
}

pub fn is_section_complete(section: &SectionSpec, answers: &AnswerStore) -> bool {
    section
        .fields
        .iter()
        .all(|field| is_satisfied(field, answers))
}

/// Checks every section regardless of how far the respondent has navigated.
pub fn is_form_complete(schema: &FormSchema, answers: &AnswerStore) -> bool {
    is_form_complete_with(schema, answers, FailurePolicy::Open)
}

pub fn is_form_complete_with(
    schema: &FormSchema,
    answers: &AnswerStore,
    policy: FailurePolicy,
) -> bool {
    guarded(policy, || {
        schema
            .sections
            .iter()
            .all(|section| is_section_complete(section, answers))
    })
}

/// Runs a completion check, resolving an internal panic through `policy`.
fn guarded(policy: FailurePolicy, check: impl FnOnce() -> bool) -> bool {
    match panic::catch_unwind(AssertUnwindSafe(check)) {
        Ok(complete) => complete,
        Err(_) => {
            let complete = policy == FailurePolicy::Open;
            tracing::warn!(
                ?policy,
                complete,
                "completion check failed internally; applying failure policy"
            );
            complete
        }
    }
}

fn is_satisfied(field: &FieldSpec, answers: &AnswerStore) -> bool {
    if !field.required || !is_participating(field) || !is_active(field, answers) {
        return true;
    }
    has_required_answer(field, answers)
}

fn has_required_answer(field: &FieldSpec, answers: &AnswerStore) -> bool {
    match field.kind {
        FieldKind::CheckboxGroup => {
            matches!(answers.get(&field.id), AnswerValue::List(items) if !items.is_empty())
        }
        FieldKind::Section if !field.sub_fields.is_empty() => {
            let mut mandatory = field
                .sub_fields
                .iter()
                .filter(|sub| sub.required && is_participating(sub) && is_active(sub, answers))
                .peekable();
            if mandatory.peek().is_none() {
                return true;
            }
            mandatory.any(|sub| has_required_answer(sub, answers))
        }
        _ => !answers.get(&field.id).is_blank(),
    }
}
