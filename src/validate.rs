//! Front matter checks run before a note is imported
//!
//! Skip markers are checked first and short-circuit validation; a skipped
//! note is not an error. Validation collects every issue so the diagnostic
//! names all broken fields at once.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};

use crate::constants as C;
use crate::frontmatter::{Frontmatter, Value};

/// Why a note is left out of the import
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// `can_skip: true`
    CanSkip,
    /// `is_draft: true`
    Draft,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::CanSkip => write!(f, "can_skip property is set to true"),
            SkipReason::Draft => write!(f, "post is marked as draft"),
        }
    }
}

/// A single front matter problem
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldIssue {
    MissingDescription,
    DescriptionNotString,
    MissingDate,
    /// Date present but matching none of the accepted patterns
    InvalidDate(String),
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldIssue::MissingDescription => write!(f, "description (missing)"),
            FieldIssue::DescriptionNotString => {
                write!(f, "description (invalid type, expected string)")
            }
            FieldIssue::MissingDate => write!(f, "date (missing)"),
            FieldIssue::InvalidDate(raw) => write!(f, "date (invalid: \"{}\")", raw),
        }
    }
}

/// Return the skip reason, if the note carries a skip marker
pub fn check_skip(frontmatter: &Frontmatter) -> Option<SkipReason> {
    if flag_is_set(frontmatter.get(C::FIELD_CAN_SKIP)) {
        return Some(SkipReason::CanSkip);
    }
    if flag_is_set(frontmatter.get(C::FIELD_IS_DRAFT)) {
        return Some(SkipReason::Draft);
    }
    None
}

/// `true`, or a string spelling "true" in any case
fn flag_is_set(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
        _ => false,
    }
}

/// Validate required fields; an empty list means the front matter is valid
pub fn validate(frontmatter: &Frontmatter) -> Vec<FieldIssue> {
    let mut issues = Vec::new();

    match frontmatter.get(C::FIELD_DESCRIPTION) {
        Some(v) if !v.is_truthy() => issues.push(FieldIssue::MissingDescription),
        None => issues.push(FieldIssue::MissingDescription),
        Some(Value::String(_)) => {}
        Some(_) => issues.push(FieldIssue::DescriptionNotString),
    }

    match frontmatter.get(C::FIELD_DATE) {
        Some(v) if v.is_truthy() => {
            if parse_date(v).is_none() {
                issues.push(FieldIssue::InvalidDate(v.to_string()));
            }
        }
        _ => issues.push(FieldIssue::MissingDate),
    }

    issues
}

/// Parse a date-like value with the accepted patterns.
///
/// Fractional seconds, a `+hh:mm` offset and a trailing `Z` are dropped
/// before matching.
pub fn parse_date(value: &Value) -> Option<NaiveDate> {
    let raw = value.to_string();
    let head = raw.split('.').next().unwrap_or_default();
    let head = head.split('+').next().unwrap_or_default().trim();
    let head = head.strip_suffix('Z').unwrap_or(head);

    if let Ok(date) = NaiveDate::parse_from_str(head, C::DATE_FORMAT) {
        return Some(date);
    }
    C::DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(head, fmt).ok())
        .map(|dt| dt.date())
}

/// Canonical date-only text for `value`, or `None` if it is not a date
pub fn format_date(value: &Value) -> Option<String> {
    parse_date(value).map(|d| d.format(C::DATE_FORMAT).to_string())
}
