use serde::{Deserialize, Serialize};

use crate::answers::AnswerStore;
use crate::interpolate::{contains_placeholder, interpolate};
use crate::schema::{FormSchema, SectionSpec};
use crate::walk::{ActiveField, active_section_fields};

/// A clause template resolved against the current answers, ready to display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedClause {
    pub field_id: String,
    pub section_label: String,
    /// Field label, suffixed with the selected option or prefixed with the
    /// enclosing section field as `"<parent>: <child>"`.
    pub field_label: String,
    pub text: String,
}

/// Clauses of sections `0..=visited_up_to`, in schema order.
pub fn collect_clauses(
    schema: &FormSchema,
    answers: &AnswerStore,
    visited_up_to: usize,
) -> Vec<ResolvedClause> {
    let mut clauses = Vec::new();
    for section in schema.sections.iter().take(visited_up_to.saturating_add(1)) {
        collect_section(section, answers, &mut clauses);
    }
    clauses
}

/// Clauses of every section regardless of navigation, used for export.
pub fn collect_all_clauses(schema: &FormSchema, answers: &AnswerStore) -> Vec<ResolvedClause> {
    collect_clauses(schema, answers, usize::MAX)
}

pub fn collect_section(section: &SectionSpec, answers: &AnswerStore, out: &mut Vec<ResolvedClause>) {
    for node in active_section_fields(section, answers) {
        collect_node(&node, &section.title, None, answers, out);
    }
}

fn collect_node(
    node: &ActiveField<'_>,
    section_label: &str,
    parent_label: Option<&str>,
    answers: &AnswerStore,
    out: &mut Vec<ResolvedClause>,
) {
    let field = node.field;
    let label = match parent_label {
        Some(parent) => format!("{parent}: {}", field.label),
        None => field.label.clone(),
    };

    if let Some(template) = &field.clause_text {
        push_resolved(out, field.id.as_str(), section_label, label.clone(), template, answers);
    }

    if field.kind.is_choice()
        && let Some(option) = field.selected_option(answers.get(&field.id))
        && let Some(template) = &option.clause_text
    {
        let option_label = if option.label.is_empty() {
            option.value.as_str().map(str::to_string).unwrap_or_else(|| option.value.to_string())
        } else {
            option.label.clone()
        };
        push_resolved(
            out,
            field.id.as_str(),
            section_label,
            format!("{label}: {option_label}"),
            template,
            answers,
        );
    }

    for child in &node.children {
        collect_node(child, section_label, Some(&label), answers, out);
    }
}

fn push_resolved(
    out: &mut Vec<ResolvedClause>,
    field_id: &str,
    section_label: &str,
    field_label: String,
    template: &str,
    answers: &AnswerStore,
) {
    let text = interpolate(template, answers);
    if text.trim().is_empty() || contains_placeholder(&text) {
        return;
    }
    out.push(ResolvedClause {
        field_id: field_id.to_string(),
        section_label: section_label.to_string(),
        field_label,
        text,
    });
}
