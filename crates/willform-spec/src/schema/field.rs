use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::condition::Conditions;

/// Widget/field type tags understood by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum FieldKind {
    Text,
    Number,
    Textarea,
    Date,
    Radio,
    Select,
    CheckboxGroup,
    Section,
    Display,
    Button,
    Signature,
    Hidden,
}

impl FieldKind {
    /// Display, button and hidden fields are presentational and never carry an answer.
    pub fn is_participating(self) -> bool {
        !matches!(self, FieldKind::Display | FieldKind::Button | FieldKind::Hidden)
    }

    /// Single-choice fields whose selected option may carry its own clause.
    pub fn is_choice(self) -> bool {
        matches!(self, FieldKind::Radio | FieldKind::Select)
    }
}

/// One selectable option of a radio, select or checkbox group field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct OptionSpec {
    pub value: Value,
    #[serde(default)]
    pub label: String,
    #[serde(
        default,
        rename = "willClauseText",
        alias = "clauseText",
        skip_serializing_if = "Option::is_none"
    )]
    pub clause_text: Option<String>,
}

/// Definition of a single field; identifiers are unique across the whole schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldSpec {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: FieldKind,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<OptionSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_fields: Vec<FieldSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<Value>")]
    pub conditions: Option<Conditions>,
    #[serde(
        default,
        rename = "willClauseText",
        alias = "clauseText",
        skip_serializing_if = "Option::is_none"
    )]
    pub clause_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_label: Option<String>,
}

impl FieldSpec {
    /// Minimal field used by builders and tests.
    pub fn new(id: impl Into<String>, kind: FieldKind, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            label: label.into(),
            required: false,
            options: Vec::new(),
            sub_fields: Vec::new(),
            conditions: None,
            clause_text: None,
            text: None,
            placeholder: None,
            info_text: None,
            sub_label: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_options(mut self, options: Vec<OptionSpec>) -> Self {
        self.options = options;
        self
    }

    pub fn with_sub_fields(mut self, sub_fields: Vec<FieldSpec>) -> Self {
        self.sub_fields = sub_fields;
        self
    }

    pub fn with_conditions(mut self, conditions: Conditions) -> Self {
        self.conditions = Some(conditions);
        self
    }

    pub fn with_clause(mut self, clause: impl Into<String>) -> Self {
        self.clause_text = Some(clause.into());
        self
    }

    /// The option whose value strictly equals the stored answer.
    pub fn selected_option(&self, answer: &crate::answers::AnswerValue) -> Option<&OptionSpec> {
        let scalar = answer.as_scalar().filter(|scalar| !scalar.is_blank())?;
        self.options
            .iter()
            .find(|option| scalar.matches(&option.value))
    }
}

impl OptionSpec {
    pub fn new(value: impl Into<Value>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            clause_text: None,
        }
    }

    pub fn with_clause(mut self, clause: impl Into<String>) -> Self {
        self.clause_text = Some(clause.into());
        self
    }
}
