use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::answers::AnswerStore;

/// Comparison applied by a single clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClauseOp {
    Eq,
    In,
}

/// Boolean junction of a composite condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Junction {
    And,
    Or,
}

/// Visibility predicate attached to a field.
///
/// Anything that is not a well-formed clause or composite is kept verbatim as
/// `Invalid` and evaluates to `false`, so unknown operators hide the field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum Condition {
    Clause {
        field: String,
        op: ClauseOp,
        value: Value,
    },
    Composite {
        junction: Junction,
        clauses: Vec<Condition>,
    },
    Invalid(Value),
}

/// Either a single condition or the bare-list form, which is implicitly AND-ed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum Conditions {
    One(Condition),
    All(Vec<Condition>),
}

impl Condition {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Condition::Clause {
            field: field.into(),
            op: ClauseOp::Eq,
            value: value.into(),
        }
    }

    pub fn one_of(field: impl Into<String>, values: impl Into<Value>) -> Self {
        Condition::Clause {
            field: field.into(),
            op: ClauseOp::In,
            value: values.into(),
        }
    }

    pub fn and(clauses: Vec<Condition>) -> Self {
        Condition::Composite {
            junction: Junction::And,
            clauses,
        }
    }

    pub fn or(clauses: Vec<Condition>) -> Self {
        Condition::Composite {
            junction: Junction::Or,
            clauses,
        }
    }

    pub fn evaluate(&self, answers: &AnswerStore) -> bool {
        match self {
            Condition::Clause { field, op, value } => {
                let Some(answer) = answers.get(field).as_scalar() else {
                    return false;
                };
                match (op, value) {
                    (ClauseOp::In, Value::Array(candidates)) => {
                        candidates.iter().any(|candidate| answer.matches(candidate))
                    }
                    (ClauseOp::Eq | ClauseOp::In, single) => answer.matches(single),
                }
            }
            Condition::Composite { junction, clauses } => {
                let results = clauses
                    .iter()
                    .map(|clause| clause.evaluate(answers))
                    .collect::<Vec<_>>();
                match junction {
                    Junction::And => results.iter().all(|result| *result),
                    Junction::Or => results.iter().any(|result| *result),
                }
            }
            Condition::Invalid(_) => false,
        }
    }

    fn parse(value: Value) -> Self {
        let Value::Object(map) = value else {
            return Condition::Invalid(value);
        };
        let operator = map.get("operator").and_then(Value::as_str);
        match operator {
            Some(op @ ("eq" | "in")) => {
                let Some(field) = map.get("field").and_then(Value::as_str) else {
                    return Condition::Invalid(Value::Object(map));
                };
                Condition::Clause {
                    field: field.to_string(),
                    op: if op == "eq" { ClauseOp::Eq } else { ClauseOp::In },
                    value: map.get("value").cloned().unwrap_or(Value::Null),
                }
            }
            Some(op @ ("AND" | "OR")) => {
                let Some(Value::Array(clauses)) = map.get("clauses") else {
                    return Condition::Invalid(Value::Object(map));
                };
                Condition::Composite {
                    junction: if op == "AND" { Junction::And } else { Junction::Or },
                    clauses: clauses.iter().cloned().map(Condition::parse).collect(),
                }
            }
            _ => Condition::Invalid(Value::Object(map)),
        }
    }

    fn to_json(&self) -> Value {
        match self {
            Condition::Clause { field, op, value } => {
                let mut map = Map::new();
                map.insert("field".into(), Value::String(field.clone()));
                let op = match op {
                    ClauseOp::Eq => "eq",
                    ClauseOp::In => "in",
                };
                map.insert("operator".into(), Value::String(op.into()));
                map.insert("value".into(), value.clone());
                Value::Object(map)
            }
            Condition::Composite { junction, clauses } => {
                let mut map = Map::new();
                let op = match junction {
                    Junction::And => "AND",
                    Junction::Or => "OR",
                };
                map.insert("operator".into(), Value::String(op.into()));
                map.insert(
                    "clauses".into(),
                    Value::Array(clauses.iter().map(Condition::to_json).collect()),
                );
                Value::Object(map)
            }
            Condition::Invalid(raw) => raw.clone(),
        }
    }
}

impl Conditions {
    pub fn evaluate(&self, answers: &AnswerStore) -> bool {
        match self {
            Conditions::One(condition) => condition.evaluate(answers),
            Conditions::All(conditions) => conditions
                .iter()
                .map(|condition| condition.evaluate(answers))
                .fold(true, |acc, result| acc && result),
        }
    }
}

/// Absent conditions make a field unconditionally visible.
pub fn evaluate(conditions: Option<&Conditions>, answers: &AnswerStore) -> bool {
    conditions.is_none_or(|conditions| conditions.evaluate(answers))
}

impl From<Value> for Condition {
    fn from(value: Value) -> Self {
        Condition::parse(value)
    }
}

impl From<Condition> for Value {
    fn from(condition: Condition) -> Self {
        condition.to_json()
    }
}

impl From<Value> for Conditions {
    fn from(value: Value) -> Self {
        match value {
            Value::Array(items) => {
                Conditions::All(items.into_iter().map(Condition::parse).collect())
            }
            other => Conditions::One(Condition::parse(other)),
        }
    }
}

impl From<Conditions> for Value {
    fn from(conditions: Conditions) -> Self {
        match conditions {
            Conditions::One(condition) => condition.to_json(),
            Conditions::All(items) => Value::Array(items.iter().map(Condition::to_json).collect()),
        }
    }
}

impl From<Condition> for Conditions {
    fn from(condition: Condition) -> Self {
        Conditions::One(condition)
    }
}
