//! Frozen, scrubbed snapshot handed to document exporters.

use serde::{Deserialize, Serialize};

use crate::answers::{AnswerStore, AnswerValue, Record, Scalar};
use crate::collect::{ResolvedClause, collect_all_clauses};
use crate::sanitize::{is_binary_payload, sanitize_text};
use crate::schema::{FieldKind, FieldSpec, FormSchema};
use crate::uk;
use crate::walk::{ActiveField, active_section_fields};

pub const DEFAULT_TITLE: &str = "Last Will and Testament";

/// Answer holding the drawn signature image.
pub const SIGNATURE_FIELD: &str = "testatorSignature";

const NAME_FIELDS: [&str; 4] = ["title", "firstName", "middleName", "lastName"];
const MIN_SIGNATURE_LEN: usize = 100;
const MAX_SIGNATURE_LEN: usize = 1_000_000;

/// Everything an exporter needs, with payloads already removed from printable text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub title: String,
    pub testator_name: Option<String>,
    pub answers: AnswerStore,
    pub clauses: Vec<ResolvedClause>,
    pub summary: Vec<SummaryEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

impl ExportDocument {
    pub fn testator_or_placeholder(&self) -> &str {
        self.testator_name.as_deref().unwrap_or("[Full Name]")
    }
}

/// One answered field as it appears in the document's answer listing.
/// Section fields appear as headings with no lines, followed by their children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryEntry {
    pub section_label: String,
    pub field_id: String,
    pub label: String,
    pub depth: usize,
    pub lines: Vec<String>,
}

pub fn prepare_export(schema: &FormSchema, answers: &AnswerStore) -> ExportDocument {
    let clauses = collect_all_clauses(schema, answers)
        .into_iter()
        .filter_map(|clause| {
            let text = sanitize_text(&clause.text);
            (!text.trim().is_empty()).then_some(ResolvedClause { text, ..clause })
        })
        .collect();

    ExportDocument {
        title: schema
            .title
            .clone()
            .filter(|title| !title.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        testator_name: testator_name(answers),
        answers: scrub_answers(answers),
        clauses,
        summary: summarize(schema, answers),
        signature: signature(answers),
    }
}

/// `title firstName middleName lastName`, skipping blanks.
pub fn testator_name(answers: &AnswerStore) -> Option<String> {
    let parts = NAME_FIELDS
        .iter()
        .filter_map(|field| answers.get(field).printable())
        .map(|part| part.trim().to_string())
        .filter(|part| !part.is_empty() && !is_binary_payload(part))
        .collect::<Vec<_>>();
    (!parts.is_empty()).then(|| parts.join(" "))
}

pub fn signature(answers: &AnswerStore) -> Option<String> {
    let AnswerValue::Scalar(Scalar::Text(image)) = answers.get(SIGNATURE_FIELD) else {
        return None;
    };
    let len = image.len();
    (image.starts_with("data:image") && len > MIN_SIGNATURE_LEN && len < MAX_SIGNATURE_LEN)
        .then(|| image.clone())
}

/// Copy of the answers with every data URI and oversized string removed.
pub fn scrub_answers(answers: &AnswerStore) -> AnswerStore {
    answers
        .iter()
        .map(|(field, value)| (field, scrub_value(value)))
        .collect()
}

fn scrub_value(value: &AnswerValue) -> AnswerValue {
    match value {
        AnswerValue::Empty => AnswerValue::Empty,
        AnswerValue::Scalar(scalar) if is_payload(scalar) => AnswerValue::Empty,
        AnswerValue::Scalar(scalar) => AnswerValue::Scalar(scalar.clone()),
        AnswerValue::List(items) => {
            AnswerValue::List(items.iter().filter(|item| !is_payload(item)).cloned().collect())
        }
        AnswerValue::RecordList(records) => {
            AnswerValue::RecordList(records.iter().map(scrub_record).collect())
        }
        AnswerValue::Record(record) => AnswerValue::Record(scrub_record(record)),
    }
}

fn scrub_record(record: &Record) -> Record {
    record
        .iter()
        .filter(|(_, value)| !is_payload(value))
        .map(|(key, value)| (key, value.clone()))
        .collect()
}

fn is_payload(scalar: &Scalar) -> bool {
    matches!(scalar, Scalar::Text(text) if is_binary_payload(text))
}

/// Answered, active fields in schema order.
pub fn summarize(schema: &FormSchema, answers: &AnswerStore) -> Vec<SummaryEntry> {
    let mut entries = Vec::new();
    for section in &schema.sections {
        for node in active_section_fields(section, answers) {
            summarize_node(&node, &section.title, answers, &mut entries);
        }
    }
    entries
}

fn summarize_node(
    node: &ActiveField<'_>,
    section_label: &str,
    answers: &AnswerStore,
    out: &mut Vec<SummaryEntry>,
) {
    let field = node.field;
    let entry = |lines| SummaryEntry {
        section_label: section_label.to_string(),
        field_id: field.id.clone(),
        label: field.label.clone(),
        depth: node.depth,
        lines,
    };
    match field.kind {
        FieldKind::Signature => {}
        FieldKind::Section => {
            if !node.has_answered_subfield {
                return;
            }
            out.push(entry(Vec::new()));
            for child in &node.children {
                summarize_node(child, section_label, answers, out);
            }
        }
        _ => {
            let lines = render_answer(field, answers.get(&field.id));
            if !lines.is_empty() {
                out.push(entry(lines));
            }
        }
    }
}

fn render_answer(field: &FieldSpec, value: &AnswerValue) -> Vec<String> {
    let lines = match value {
        AnswerValue::Empty => Vec::new(),
        AnswerValue::Scalar(scalar) => render_scalar(field, scalar).into_iter().collect(),
        AnswerValue::List(items) => {
            let joined = items
                .iter()
                .filter_map(|item| render_scalar(field, item))
                .collect::<Vec<_>>()
                .join(", ");
            vec![joined]
        }
        AnswerValue::RecordList(records) => records.iter().flat_map(render_record).collect(),
        AnswerValue::Record(record) => render_record(record),
    };
    lines
        .into_iter()
        .map(|line| sanitize_text(&line))
        .filter(|line| !line.trim().is_empty())
        .collect()
}

fn render_scalar(field: &FieldSpec, scalar: &Scalar) -> Option<String> {
    if scalar.is_blank() || is_payload(scalar) {
        return None;
    }
    if let Some(option) = field.options.iter().find(|option| scalar.matches(&option.value)) {
        return Some(option.label.clone());
    }
    match (field.kind, scalar) {
        (FieldKind::Date, Scalar::Text(date)) => Some(uk::format_date(date)),
        (_, Scalar::Bool(true)) => Some("Yes".to_string()),
        (_, Scalar::Bool(false)) => Some("No".to_string()),
        _ => scalar.printable(),
    }
}

fn render_record(record: &Record) -> Vec<String> {
    record
        .iter()
        .filter(|(_, value)| !value.is_blank() && !is_payload(value))
        .map(|(key, value)| format!("{}: {value}", humanize_key(key)))
        .collect()
}

/// `firstName` -> `First Name`.
pub fn humanize_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for (index, ch) in key.chars().enumerate() {
        if index == 0 {
            out.extend(ch.to_uppercase());
        } else {
            if ch.is_uppercase() {
                out.push(' ');
            }
            out.push(ch);
        }
    }
    out
}
