//! Resolution of `{{field:<section>[:<sub>]}}` placeholders in clause templates.
//!
//! Answers for the same logical value are stored under different keys
//! depending on the widget that wrote them, so every placeholder walks a
//! fixed chain of candidate locations and takes the first usable value.
//! Interpolation is total: anything that cannot be resolved becomes the
//! empty string and no placeholder syntax survives in the output.

pub mod alias;
pub mod keys;

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::answers::{AnswerStore, AnswerValue, Record, Scalar};
use crate::sanitize::is_binary_payload;

pub use alias::{FALLBACK_ALIASES, fallback_alias};
pub use keys::{KEY_CASINGS, KeyCasing};

pub static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{field:([^}]+)\}\}").expect("valid placeholder pattern"));

const RECORD_SEPARATOR: &str = ", ";
const ENTRY_SEPARATOR: &str = "; ";

/// Sub-field names that render a whole list section instead of one value.
const LIST_SELECTORS: [&str; 2] = ["fullDetails", "fullList"];

/// A parsed placeholder body such as `guardiansSection:fullDetails`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placeholder<'t> {
    pub full_key: &'t str,
    pub section_id: &'t str,
    pub sub_field: Option<&'t str>,
}

impl<'t> Placeholder<'t> {
    pub fn parse(full_key: &'t str) -> Self {
        let mut segments = full_key.split(':');
        let section_id = segments.next().unwrap_or_default();
        let sub_field = segments.next().filter(|segment| !segment.is_empty());
        Self {
            full_key,
            section_id,
            sub_field,
        }
    }

    /// Walks the resolution chain; `None` means the placeholder renders empty.
    pub fn resolve(&self, answers: &AnswerStore) -> Option<String> {
        if let Some(sub_field) = self.sub_field {
            if LIST_SELECTORS.contains(&sub_field) {
                return Some(render_full_list(self.section_id, answers));
            }
            if let Some(value) = resolve_from_section(self.section_id, sub_field, answers) {
                return Some(value);
            }
            if let Some(value) = composite_keys(self.section_id, sub_field)
                .iter()
                .find_map(|key| scalar_answer(answers, key))
            {
                return Some(value);
            }
        }
        scalar_answer(answers, self.full_key).or_else(|| scalar_answer(answers, self.section_id))
    }
}

/// Placeholders of `template` in order of appearance.
pub fn placeholders(template: &str) -> impl Iterator<Item = Placeholder<'_>> {
    PLACEHOLDER
        .captures_iter(template)
        .filter_map(|caps| caps.get(1))
        .map(|body| Placeholder::parse(body.as_str()))
}

pub fn contains_placeholder(text: &str) -> bool {
    PLACEHOLDER.is_match(text)
}

/// Substitutes every placeholder of `template` against `answers`.
pub fn interpolate(template: &str, answers: &AnswerStore) -> String {
    let substituted = PLACEHOLDER.replace_all(template, |caps: &Captures| {
        Placeholder::parse(&caps[1])
            .resolve(answers)
            .unwrap_or_default()
    });
    strip_placeholders(&substituted)
}

/// Removes placeholder syntax until none is left; removing one occurrence
/// can splice together a new one from the surrounding text.
pub fn strip_placeholders(text: &str) -> String {
    let mut current = text.to_string();
    loop {
        match PLACEHOLDER.replace_all(&current, "") {
            Cow::Borrowed(_) => return current,
            Cow::Owned(next) => current = next,
        }
    }
}

fn section_source<'a>(section_id: &str, answers: &'a AnswerStore) -> Option<&'a AnswerValue> {
    let alias = fallback_alias(section_id);
    [alias.as_ref(), section_id]
        .into_iter()
        .map(|key| answers.get(key))
        .find(|value| !value.is_blank())
}

fn render_full_list(section_id: &str, answers: &AnswerStore) -> String {
    let entries: Vec<String> = match section_source(section_id, answers) {
        Some(AnswerValue::RecordList(records)) => records.iter().map(render_record).collect(),
        Some(AnswerValue::List(items)) => items.iter().filter_map(printable).collect(),
        _ => Vec::new(),
    };
    entries
        .into_iter()
        .filter(|entry| !entry.is_empty())
        .collect::<Vec<_>>()
        .join(ENTRY_SEPARATOR)
}

fn render_record(record: &Record) -> String {
    record
        .values()
        .filter_map(printable)
        .collect::<Vec<_>>()
        .join(RECORD_SEPARATOR)
}

fn resolve_from_section(section_id: &str, sub_field: &str, answers: &AnswerStore) -> Option<String> {
    let record = match section_source(section_id, answers)? {
        AnswerValue::RecordList(records) => records.first()?,
        AnswerValue::Record(record) => record,
        _ => return None,
    };
    keys::lookup(record, sub_field).and_then(printable)
}

fn composite_keys(section_id: &str, sub_field: &str) -> [String; 4] {
    [
        format!("{section_id}:{sub_field}"),
        format!("{section_id}{sub_field}"),
        format!("{section_id}_{sub_field}"),
        format!("{section_id}.{sub_field}"),
    ]
}

fn scalar_answer(answers: &AnswerStore, key: &str) -> Option<String> {
    answers
        .get(key)
        .printable()
        .filter(|text| !is_binary_payload(text))
}

fn printable(scalar: &Scalar) -> Option<String> {
    scalar
        .printable()
        .filter(|text| !text.is_empty() && !is_binary_payload(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_placeholder_segments() {
        let placeholder = Placeholder::parse("partnerSection:relationship");
        assert_eq!(placeholder.section_id, "partnerSection");
        assert_eq!(placeholder.sub_field, Some("relationship"));
        let bare = Placeholder::parse("firstName");
        assert_eq!(bare.sub_field, None);
        let extra = Placeholder::parse("a:b:c");
        assert_eq!(extra.sub_field, Some("b"));
        assert_eq!(extra.full_key, "a:b:c");
    }

    #[test]
    fn composite_keys_are_tried_in_order() {
        let answers = AnswerStore::new()
            .with("petCarer.name", "dotted")
            .with("petCarer_name", "underscored");
        assert_eq!(interpolate("{{field:petCarer:name}}", &answers), "underscored");
        let answers = answers.with("petCarername", "concatenated");
        assert_eq!(interpolate("{{field:petCarer:name}}", &answers), "concatenated");
    }

    #[test]
    fn falls_back_to_section_scalar() {
        let answers = AnswerStore::new().with("firstName", "Ada");
        assert_eq!(interpolate("I, {{field:firstName}},", &answers), "I, Ada,");
        assert_eq!(interpolate("{{field:firstName:unknown}}", &answers), "Ada");
    }

    #[test]
    fn literal_section_id_used_when_alias_is_blank() {
        let answers = AnswerStore::from_value(serde_json::json!({
            "guardianData": [],
            "guardiansSection": [{"name": "Sam"}]
        }))
        .expect("answers");
        assert_eq!(interpolate("{{field:guardiansSection:name}}", &answers), "Sam");
    }

    #[test]
    fn single_record_answers_are_addressed_directly() {
        let answers = AnswerStore::new().with(
            "partnerData",
            Record::new().with("Relationship", "Civil partner"),
        );
        assert_eq!(
            interpolate("{{field:partnerSection:relationship}}", &answers),
            "Civil partner"
        );
    }

    #[test]
    fn full_list_joins_scalars_and_skips_payloads() {
        let answers = AnswerStore::new().with(
            "debtorsData",
            vec![
                Record::new()
                    .with("name", "Jo")
                    .with("signature", "data:image/png;base64,AAAA")
                    .with("amount", 150),
                Record::new().with("name", ""),
                Record::new().with("name", "Kim"),
            ],
        );
        assert_eq!(
            interpolate("{{field:debtorsSection:fullList}}", &answers),
            "Jo, 150; Kim"
        );
    }

    #[test]
    fn full_details_needs_a_list() {
        let answers = AnswerStore::new().with(
            "partnerData",
            Record::new().with("fullName", "Sam").with("relationship", "Spouse"),
        );
        assert_eq!(interpolate("{{field:partnerSection:fullDetails}}", &answers), "");
        assert_eq!(interpolate("{{field:partnerSection:fullName}}", &answers), "Sam");
    }

    #[test]
    fn strips_spliced_placeholders() {
        assert_eq!(strip_placeholders("a{{field:{{field:x}}}}b"), "a}}b");
        assert_eq!(strip_placeholders("{{fi{{field:x}}eld:y}}"), "");
        assert!(!contains_placeholder(&strip_placeholders(
            "{{field:{{field:{{field:x}}}}}}"
        )));
    }

    #[test]
    fn lists_placeholders_in_order() {
        let found = placeholders("{{field:a}} and {{field:b:c}}")
            .map(|placeholder| placeholder.full_key)
            .collect::<Vec<_>>();
        assert_eq!(found, vec!["a", "b:c"]);
    }
}
