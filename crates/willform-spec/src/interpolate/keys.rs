use crate::answers::{Record, Scalar};
use crate::sanitize::is_binary_payload;

/// Key spelling tried when a placeholder addresses a record sub-key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCasing {
    Exact,
    LowerFirst,
    UpperFirst,
    Lowercase,
    Uppercase,
}

/// Order in which spellings are tried; the first usable value wins.
pub const KEY_CASINGS: [KeyCasing; 5] = [
    KeyCasing::Exact,
    KeyCasing::LowerFirst,
    KeyCasing::UpperFirst,
    KeyCasing::Lowercase,
    KeyCasing::Uppercase,
];

impl KeyCasing {
    pub fn apply(self, key: &str) -> String {
        match self {
            KeyCasing::Exact => key.to_string(),
            KeyCasing::LowerFirst => map_first(key, char::to_lowercase),
            KeyCasing::UpperFirst => map_first(key, char::to_uppercase),
            KeyCasing::Lowercase => key.to_lowercase(),
            KeyCasing::Uppercase => key.to_uppercase(),
        }
    }
}

fn map_first<I>(key: &str, convert: impl Fn(char) -> I) -> String
where
    I: Iterator<Item = char>,
{
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => convert(first).chain(chars).collect(),
        None => String::new(),
    }
}

/// Finds the first non-blank string-or-number value under any spelling of `key`.
pub fn lookup<'r>(record: &'r Record, key: &str) -> Option<&'r Scalar> {
    lookup_with(record, key, &KEY_CASINGS)
}

pub fn lookup_with<'r>(record: &'r Record, key: &str, casings: &[KeyCasing]) -> Option<&'r Scalar> {
    casings.iter().find_map(|casing| {
        record
            .get(&casing.apply(key))
            .filter(|value| {
                !value.is_blank()
                    && value
                        .printable()
                        .is_some_and(|text| !is_binary_payload(&text))
            })
    })
}
