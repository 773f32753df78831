use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// A single answer scalar as written by a text, number, date or radio widget.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Text(String),
    Number(Number),
    Bool(bool),
}

impl Scalar {
    /// Converts a JSON scalar; `null`, arrays and objects have no scalar form.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(text) => Some(Scalar::Text(text.clone())),
            Value::Number(number) => Some(Scalar::Number(number.clone())),
            Value::Bool(flag) => Some(Scalar::Bool(*flag)),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Scalar::Text(text) => Value::String(text.clone()),
            Scalar::Number(number) => Value::Number(number.clone()),
            Scalar::Bool(flag) => Value::Bool(*flag),
        }
    }

    /// Only empty text is blank; numbers and booleans always count as an answer.
    pub fn is_blank(&self) -> bool {
        matches!(self, Scalar::Text(text) if text.is_empty())
    }

    /// Text for string-or-number scalars, the only shapes printed into clauses.
    pub fn printable(&self) -> Option<String> {
        match self {
            Scalar::Text(text) => Some(text.clone()),
            Scalar::Number(_) => Some(self.to_string()),
            Scalar::Bool(_) => None,
        }
    }

    /// Strict equality against a JSON value: no coercion between strings and
    /// numbers, numbers compared by magnitude.
    pub fn matches(&self, value: &Value) -> bool {
        match (self, value) {
            (Scalar::Text(left), Value::String(right)) => left == right,
            (Scalar::Number(left), Value::Number(right)) => {
                match (left.as_f64(), right.as_f64()) {
                    (Some(left), Some(right)) => left == right,
                    _ => false,
                }
            }
            (Scalar::Bool(left), Value::Bool(right)) => left == right,
            _ => false,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Text(text) => f.write_str(text),
            Scalar::Number(number) => {
                if let Some(value) = number.as_i64() {
                    write!(f, "{value}")
                } else if let Some(value) = number.as_u64() {
                    write!(f, "{value}")
                } else {
                    write!(f, "{}", number.as_f64().unwrap_or_default())
                }
            }
            Scalar::Bool(flag) => write!(f, "{flag}"),
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Text(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Number(Number::from(value))
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Scalar::Number(Number::from(value))
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

/// One entry of a repeatable person/gift list, keyed by sub-field name.
///
/// Keys keep the order in which the widget wrote them so that joined
/// renderings read the way the respondent entered them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    entries: Vec<(String, Scalar)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a record from a JSON object, dropping values that are not scalars.
    pub fn from_map(map: &Map<String, Value>) -> Self {
        map.iter()
            .filter_map(|(key, value)| Scalar::from_json(value).map(|scalar| (key.clone(), scalar)))
            .collect()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Scalar>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Scalar> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Scalar)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn values(&self) -> impl Iterator<Item = &Scalar> {
        self.entries.iter().map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_blank(&self) -> bool {
        self.values().all(Scalar::is_blank)
    }

    pub fn to_json(&self) -> Value {
        let map = self
            .entries
            .iter()
            .map(|(key, value)| (key.clone(), value.to_json()))
            .collect::<Map<_, _>>();
        Value::Object(map)
    }
}

impl<K: Into<String>> FromIterator<(K, Scalar)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, Scalar)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (key, value) in iter {
            record.insert(key, value);
        }
        record
    }
}

/// Shape of a stored answer. Which variant appears is decided by the widget
/// that wrote it, so every consumer matches on all of them.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum AnswerValue {
    #[default]
    Empty,
    Scalar(Scalar),
    List(Vec<Scalar>),
    RecordList(Vec<Record>),
    Record(Record),
}

static EMPTY: AnswerValue = AnswerValue::Empty;

impl AnswerValue {
    pub fn text(value: impl Into<String>) -> Self {
        AnswerValue::Scalar(Scalar::Text(value.into()))
    }

    pub fn is_blank(&self) -> bool {
        match self {
            AnswerValue::Empty => true,
            AnswerValue::Scalar(scalar) => scalar.is_blank(),
            AnswerValue::List(items) => items.is_empty(),
            AnswerValue::RecordList(records) => records.is_empty(),
            AnswerValue::Record(record) => record.is_blank(),
        }
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            AnswerValue::Scalar(scalar) => Some(scalar),
            _ => None,
        }
    }

    /// The printable text of a non-blank string-or-number answer.
    pub fn printable(&self) -> Option<String> {
        self.as_scalar()
            .filter(|scalar| !scalar.is_blank())
            .and_then(Scalar::printable)
    }
}

impl From<Value> for AnswerValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => AnswerValue::Empty,
            Value::Array(items) => {
                if matches!(items.first(), Some(Value::Object(_))) {
                    AnswerValue::RecordList(
                        items
                            .iter()
                            .filter_map(Value::as_object)
                            .map(Record::from_map)
                            .collect(),
                    )
                } else {
                    AnswerValue::List(items.iter().filter_map(Scalar::from_json).collect())
                }
            }
            Value::Object(map) => AnswerValue::Record(Record::from_map(&map)),
            scalar => Scalar::from_json(&scalar)
                .map(AnswerValue::Scalar)
                .unwrap_or_default(),
        }
    }
}

impl From<AnswerValue> for Value {
    fn from(value: AnswerValue) -> Self {
        match value {
            AnswerValue::Empty => Value::Null,
            AnswerValue::Scalar(scalar) => scalar.to_json(),
            AnswerValue::List(items) => Value::Array(items.iter().map(Scalar::to_json).collect()),
            AnswerValue::RecordList(records) => {
                Value::Array(records.iter().map(Record::to_json).collect())
            }
            AnswerValue::Record(record) => record.to_json(),
        }
    }
}

impl From<Scalar> for AnswerValue {
    fn from(value: Scalar) -> Self {
        AnswerValue::Scalar(value)
    }
}

impl From<&str> for AnswerValue {
    fn from(value: &str) -> Self {
        AnswerValue::text(value)
    }
}

impl From<String> for AnswerValue {
    fn from(value: String) -> Self {
        AnswerValue::text(value)
    }
}

impl From<i64> for AnswerValue {
    fn from(value: i64) -> Self {
        AnswerValue::Scalar(Scalar::from(value))
    }
}

impl From<i32> for AnswerValue {
    fn from(value: i32) -> Self {
        AnswerValue::Scalar(Scalar::from(value))
    }
}

impl From<Vec<Scalar>> for AnswerValue {
    fn from(value: Vec<Scalar>) -> Self {
        AnswerValue::List(value)
    }
}

impl From<Vec<Record>> for AnswerValue {
    fn from(value: Vec<Record>) -> Self {
        AnswerValue::RecordList(value)
    }
}

impl From<Record> for AnswerValue {
    fn from(value: Record) -> Self {
        AnswerValue::Record(value)
    }
}

/// Flat map from globally unique field identifier to answer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerStore {
    values: BTreeMap<String, AnswerValue>,
}

impl AnswerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a stored answer set; any JSON object is accepted.
    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    pub fn to_value(&self) -> Value {
        Value::Object(
            self.values
                .iter()
                .map(|(key, value)| (key.clone(), Value::from(value.clone())))
                .collect(),
        )
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Returns the stored value, `Empty` when the field was never answered.
    pub fn get(&self, field: &str) -> &AnswerValue {
        self.values.get(field).unwrap_or(&EMPTY)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.values.contains_key(field)
    }

    /// Stores a value; writing `Empty` removes the slot.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<AnswerValue>) {
        let field = field.into();
        match value.into() {
            AnswerValue::Empty => {
                self.values.remove(&field);
            }
            value => {
                self.values.insert(field, value);
            }
        }
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<AnswerValue>) -> Self {
        self.set(field, value);
        self
    }

    pub fn clear(&mut self, field: &str) -> Option<AnswerValue> {
        self.values.remove(field)
    }

    /// Checks or unchecks one option of a checkbox group. The slot always
    /// holds a list afterwards, even when the last option is unchecked.
    pub fn toggle_option(&mut self, field: &str, option: Scalar, checked: bool) {
        let mut selected = match self.values.get(field) {
            Some(AnswerValue::List(items)) => items.clone(),
            _ => Vec::new(),
        };
        let position = selected.iter().position(|item| *item == option);
        match (checked, position) {
            (true, None) => selected.push(option),
            (false, Some(index)) => {
                selected.remove(index);
            }
            _ => {}
        }
        self.values
            .insert(field.to_string(), AnswerValue::List(selected));
    }

    pub fn is_answered(&self, field: &str) -> bool {
        !self.get(field).is_blank()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AnswerValue)> {
        self.values.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, AnswerValue)> for AnswerStore {
    fn from_iter<I: IntoIterator<Item = (K, AnswerValue)>>(iter: I) -> Self {
        let mut store = AnswerStore::new();
        for (key, value) in iter {
            store.set(key, value);
        }
        store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_shapes_map_to_variants() {
        let store = AnswerStore::from_value(json!({
            "firstName": "Ada",
            "children": 2,
            "pets": ["dog", "cat"],
            "guardianData": [{"name": "Alex", "relation": "Friend"}],
            "partnerData": {"relationship": "Spouse"},
            "nothing": null
        }))
        .unwrap();

        assert_eq!(store.get("firstName"), &AnswerValue::text("Ada"));
        assert_eq!(store.get("children"), &AnswerValue::from(2));
        assert!(matches!(store.get("pets"), AnswerValue::List(items) if items.len() == 2));
        assert!(matches!(store.get("guardianData"), AnswerValue::RecordList(records) if records.len() == 1));
        assert!(matches!(store.get("partnerData"), AnswerValue::Record(_)));
        assert_eq!(store.get("nothing"), &AnswerValue::Empty);
        assert_eq!(store.get("missing"), &AnswerValue::Empty);
    }

    #[test]
    fn record_keeps_entry_order() {
        let store = AnswerStore::from_json_str(
            r#"{"guardianData": [{"relation": "Friend", "name": "Alex"}]}"#,
        )
        .unwrap();
        let AnswerValue::RecordList(records) = store.get("guardianData") else {
            panic!("expected record list");
        };
        let keys = records[0].iter().map(|(key, _)| key).collect::<Vec<_>>();
        assert_eq!(keys, vec!["relation", "name"]);
    }

    #[test]
    fn numbers_print_without_trailing_fraction() {
        let whole = Scalar::from_json(&json!(5.0)).unwrap();
        let fraction = Scalar::from_json(&json!(2.5)).unwrap();
        assert_eq!(whole.to_string(), "5");
        assert_eq!(fraction.to_string(), "2.5");
    }

    #[test]
    fn strict_matching_does_not_coerce() {
        let text = Scalar::from("1");
        let number = Scalar::from(1);
        assert!(text.matches(&json!("1")));
        assert!(!text.matches(&json!(1)));
        assert!(number.matches(&json!(1.0)));
        assert!(!number.matches(&json!("1")));
    }

    #[test]
    fn toggle_keeps_a_list() {
        let mut store = AnswerStore::new().with("wishes", "burial");
        store.toggle_option("wishes", Scalar::from("cremation"), true);
        assert_eq!(
            store.get("wishes"),
            &AnswerValue::List(vec![Scalar::from("cremation")])
        );
        store.toggle_option("wishes", Scalar::from("cremation"), false);
        assert_eq!(store.get("wishes"), &AnswerValue::List(vec![]));
        assert!(!store.is_answered("wishes"));
    }

    #[test]
    fn setting_empty_removes_slot() {
        let mut store = AnswerStore::new().with("a", "x");
        store.set("a", AnswerValue::Empty);
        assert!(!store.contains("a"));
    }

    #[test]
    fn blank_rules() {
        assert!(AnswerValue::text("").is_blank());
        assert!(!AnswerValue::from(0).is_blank());
        assert!(AnswerValue::Record(Record::new().with("name", "")).is_blank());
        assert!(!AnswerValue::Scalar(Scalar::Bool(false)).is_blank());
    }
}
