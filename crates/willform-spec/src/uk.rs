//! UK postcode, phone number, date and address helpers.

use once_cell::sync::Lazy;
use regex::Regex;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

pub const ADDRESS_EXAMPLE: &str = "e.g., Flat 5, 123 High Street, London";

const MIN_ADDRESS_LEN: usize = 5;

static POSTCODE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Z]{1,2}[0-9][A-Z0-9]?[0-9][ABD-HJLNP-UW-Z]{2}$").expect("valid postcode pattern")
});
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));
static PHONE_NOISE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s\-()]").expect("valid phone pattern"));
static INTERNATIONAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+44[1-9]\d{8,9}$").expect("valid international pattern"));
static MOBILE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^07\d{9}$").expect("valid mobile pattern"));
static LANDLINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^0[12]\d{8,9}$").expect("valid landline pattern"));
static NATIONAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^03\d{9}$").expect("valid national pattern"));
static NON_GEOGRAPHIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^0[58]\d{9}$").expect("valid non-geographic pattern"));
static UK_DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{2}/\d{2}/\d{4}$").expect("valid date pattern"));
static ISO_DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid date pattern"));

fn compact_postcode(postcode: &str) -> String {
    WHITESPACE.replace_all(postcode, "").to_uppercase()
}

fn compact_phone(phone: &str) -> String {
    PHONE_NOISE.replace_all(phone, "").into_owned()
}

pub fn validate_postcode(postcode: &str) -> bool {
    POSTCODE.is_match(&compact_postcode(postcode))
}

/// Upper-cases and puts a single space before the inward code (`sw1a1aa` -> `SW1A 1AA`).
pub fn format_postcode(postcode: &str) -> String {
    let compact = compact_postcode(postcode);
    if compact.len() > 3 && compact.is_ascii() {
        let (outward, inward) = compact.split_at(compact.len() - 3);
        format!("{outward} {inward}")
    } else {
        compact
    }
}

pub fn validate_phone(phone: &str) -> bool {
    let compact = compact_phone(phone);
    if let Some(rest) = compact.strip_prefix("+44") {
        if rest.starts_with('0') {
            return validate_phone(rest);
        }
        return INTERNATIONAL.is_match(&compact);
    }
    if compact.starts_with("07") {
        MOBILE.is_match(&compact)
    } else if compact.starts_with("01") || compact.starts_with("02") {
        LANDLINE.is_match(&compact)
    } else if compact.starts_with("03") {
        NATIONAL.is_match(&compact)
    } else if compact.starts_with("05") || compact.starts_with("08") {
        NON_GEOGRAPHIC.is_match(&compact)
    } else {
        false
    }
}

/// Groups mobile and landline numbers for display; anything else is returned unchanged.
pub fn format_phone(phone: &str) -> String {
    let mut compact = compact_phone(phone);
    if let Some(rest) = compact.strip_prefix("+44") {
        compact = format!("0{rest}");
    }
    if compact.len() != 11 || !compact.is_ascii() {
        return phone.to_string();
    }
    if compact.starts_with("07") || compact.starts_with("01") {
        format!("{} {}", &compact[..5], &compact[5..])
    } else if compact.starts_with("02") {
        format!("{} {} {}", &compact[..3], &compact[3..7], &compact[7..])
    } else {
        phone.to_string()
    }
}

/// Renders a date as `DD/MM/YYYY`. Accepts ISO dates and RFC 3339 timestamps;
/// unrecognised input is returned unchanged.
pub fn format_date(date: &str) -> String {
    if date.is_empty() || UK_DATE.is_match(date) {
        return date.to_string();
    }
    let uk = format_description!("[day]/[month]/[year]");
    let parsed = if ISO_DATE.is_match(date) {
        Date::parse(date, format_description!("[year]-[month]-[day]")).ok()
    } else {
        OffsetDateTime::parse(date, &Rfc3339)
            .ok()
            .map(OffsetDateTime::date)
    };
    parsed
        .and_then(|date| date.format(uk).ok())
        .unwrap_or_else(|| iso_to_uk_digits(date).unwrap_or_else(|| date.to_string()))
}

// Keeps the digit swap for ISO-shaped strings that are not real calendar dates.
fn iso_to_uk_digits(date: &str) -> Option<String> {
    if !ISO_DATE.is_match(date) {
        return None;
    }
    let mut parts = date.split('-');
    let (year, month, day) = (parts.next()?, parts.next()?, parts.next()?);
    Some(format!("{day}/{month}/{year}"))
}

/// Converts `DD/MM/YYYY` to `YYYY-MM-DD`; other input is returned unchanged.
pub fn date_to_iso(date: &str) -> String {
    if !UK_DATE.is_match(date) {
        return date.to_string();
    }
    let mut parts = date.split('/');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(day), Some(month), Some(year)) => format!("{year}-{month}-{day}"),
        _ => date.to_string(),
    }
}

pub fn validate_address(address: &str) -> bool {
    address.trim().chars().count() >= MIN_ADDRESS_LEN
}
