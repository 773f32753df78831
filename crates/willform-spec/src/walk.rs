//! Traversal of the nested field tree, filtered by visibility and participation.

use crate::answers::AnswerStore;
use crate::condition;
use crate::schema::{FieldKind, FieldSpec, SectionSpec};

/// A field that is visible under the current answers and carries answer semantics.
#[derive(Debug, Clone)]
pub struct ActiveField<'a> {
    pub field: &'a FieldSpec,
    pub depth: usize,
    /// Active, participating sub-fields of a section-type field.
    pub children: Vec<ActiveField<'a>>,
    /// True when any active descendant holds a non-blank answer.
    pub has_answered_subfield: bool,
}

impl<'a> ActiveField<'a> {
    /// Stable key of the node: the globally unique field identifier.
    pub fn key(&self) -> &'a str {
        &self.field.id
    }

    /// Pre-order traversal starting with this node.
    pub fn iter(&self) -> Preorder<'_, 'a> {
        Preorder { stack: vec![self] }
    }
}

/// Pre-order iterator over an active field subtree.
pub struct Preorder<'s, 'a> {
    stack: Vec<&'s ActiveField<'a>>,
}

impl<'s, 'a> Iterator for Preorder<'s, 'a> {
    type Item = &'s ActiveField<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

pub fn is_active(field: &FieldSpec, answers: &AnswerStore) -> bool {
    condition::evaluate(field.conditions.as_ref(), answers)
}

pub fn is_participating(field: &FieldSpec) -> bool {
    field.kind.is_participating()
}

/// Ordered tree of the active, participating fields of `fields`.
pub fn active_fields<'a>(fields: &'a [FieldSpec], answers: &AnswerStore) -> Vec<ActiveField<'a>> {
    walk_level(fields, answers, 0)
}

pub fn active_section_fields<'a>(
    section: &'a SectionSpec,
    answers: &AnswerStore,
) -> Vec<ActiveField<'a>> {
    active_fields(&section.fields, answers)
}

/// Flattens a forest of active fields in pre-order.
pub fn flatten<'s, 'a>(nodes: &'s [ActiveField<'a>]) -> impl Iterator<Item = &'s ActiveField<'a>> {
    nodes.iter().flat_map(ActiveField::iter)
}

fn walk_level<'a>(
    fields: &'a [FieldSpec],
    answers: &AnswerStore,
    depth: usize,
) -> Vec<ActiveField<'a>> {
    fields
        .iter()
        .filter(|field| is_participating(field) && is_active(field, answers))
        .map(|field| {
            let children = if field.kind == FieldKind::Section {
                walk_level(&field.sub_fields, answers, depth + 1)
            } else {
                Vec::new()
            };
            let has_answered_subfield = children
                .iter()
                .any(|child| answers.is_answered(child.key()) || child.has_answered_subfield);
            ActiveField {
                field,
                depth,
                children,
                has_answered_subfield,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::Condition;

    fn fields() -> Vec<FieldSpec> {
        vec![
            FieldSpec::new("intro", FieldKind::Display, "Intro"),
            FieldSpec::new("maritalStatus", FieldKind::Radio, "Status"),
            FieldSpec::new("partnerSection", FieldKind::Section, "Partner")
                .with_conditions(Condition::eq("maritalStatus", "married").into())
                .with_sub_fields(vec![
                    FieldSpec::new("partnerName", FieldKind::Text, "Name"),
                    FieldSpec::new("addPartner", FieldKind::Button, "Add"),
                ]),
            FieldSpec::new("notes", FieldKind::Hidden, "Notes"),
        ]
    }

    #[test]
    fn skips_presentational_and_inactive_fields() {
        let fields = fields();
        let answers = AnswerStore::new().with("maritalStatus", "single");
        let keys = flatten(&active_fields(&fields, &answers))
            .map(ActiveField::key)
            .collect::<Vec<_>>();
        assert_eq!(keys, vec!["maritalStatus"]);
    }

    #[test]
    fn recurses_into_active_sections() {
        let fields = fields();
        let answers = AnswerStore::new().with("maritalStatus", "married");
        let tree = active_fields(&fields, &answers);
        let keys = flatten(&tree).map(ActiveField::key).collect::<Vec<_>>();
        assert_eq!(keys, vec!["maritalStatus", "partnerSection", "partnerName"]);
        assert_eq!(tree[1].children[0].depth, 1);
        assert!(!tree[1].has_answered_subfield);
    }

    #[test]
    fn reports_answered_subfields() {
        let fields = fields();
        let answers = AnswerStore::new()
            .with("maritalStatus", "married")
            .with("partnerName", "Sam");
        let tree = active_fields(&fields, &answers);
        assert!(tree[1].has_answered_subfield);
    }
}
