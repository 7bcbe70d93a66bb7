//! Form rules applied to payloads before they are sent anywhere.
//!
//! The rules mirror what the console's forms enforce: a well-formed email,
//! names of at most [`MAX_NAME_LEN`] letters and spaces, and an absolute
//! http(s) avatar link.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;
use url::Url;

/// Longest first or last name accepted, in characters.
pub const MAX_NAME_LEN: usize = 50;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles")
});

static NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z\s]*$").expect("name pattern compiles")
});

/// A single rule violation on one field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("{field} is required")]
    Required { field: &'static str },

    #[error("Invalid email address")]
    InvalidEmail,

    #[error("{field} cannot be more than {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("{field} should not contain special characters or numbers")]
    InvalidCharacters { field: &'static str },

    #[error("Invalid URL")]
    InvalidUrl,
}

/// Every rule violation found on a payload, in field order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationError {
    errors: Vec<FieldError>,
}

impl ValidationError {
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn contains(&self, error: &FieldError) -> bool {
        self.errors.contains(error)
    }

    pub(crate) fn push(&mut self, error: FieldError) {
        self.errors.push(error);
    }

    pub(crate) fn into_result(self) -> Result<(), ValidationError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for error in &self.errors {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{error}")?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

impl From<FieldError> for ValidationError {
    fn from(error: FieldError) -> Self {
        ValidationError {
            errors: vec![error],
        }
    }
}

pub(crate) fn check_email(value: &str, report: &mut ValidationError) {
    let value = value.trim();
    if value.is_empty() {
        report.push(FieldError::Required { field: "Email" });
    } else if !EMAIL_RE.is_match(value) {
        report.push(FieldError::InvalidEmail);
    }
}

pub(crate) fn check_name(
    field: &'static str,
    value: &str,
    report: &mut ValidationError,
) {
    if value.trim().is_empty() {
        report.push(FieldError::Required { field });
        return;
    }
    if value.chars().count() > MAX_NAME_LEN {
        report.push(FieldError::TooLong {
            field,
            max: MAX_NAME_LEN,
        });
    }
    if !NAME_RE.is_match(value) {
        report.push(FieldError::InvalidCharacters { field });
    }
}

pub(crate) fn check_avatar(value: &str, report: &mut ValidationError) {
    let value = value.trim();
    if value.is_empty() {
        report.push(FieldError::Required { field: "Avatar" });
        return;
    }
    match Url::parse(value) {
        Ok(url)
            if matches!(url.scheme(), "http" | "https")
                && url.host_str().is_some_and(|h| !h.is_empty()) => {}
        _ => report.push(FieldError::InvalidUrl),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name_errors(value: &str) -> Vec<FieldError> {
        let mut report = ValidationError::default();
        check_name("First name", value, &mut report);
        report.errors().to_vec()
    }

    #[test]
    fn names_accept_letters_and_spaces() {
        assert!(name_errors("Mary Ann").is_empty());
    }

    #[test]
    fn names_reject_digits_and_symbols() {
        assert_eq!(
            name_errors("R2-D2"),
            vec![FieldError::InvalidCharacters {
                field: "First name"
            }]
        );
    }

    #[test]
    fn name_length_counts_characters() {
        assert!(name_errors(&"a".repeat(MAX_NAME_LEN)).is_empty());
        assert_eq!(
            name_errors(&"a".repeat(MAX_NAME_LEN + 1)),
            vec![FieldError::TooLong {
                field: "First name",
                max: MAX_NAME_LEN
            }]
        );
    }

    #[test]
    fn blank_name_is_missing() {
        assert_eq!(
            name_errors("   "),
            vec![FieldError::Required {
                field: "First name"
            }]
        );
    }

    #[test]
    fn email_shape() {
        let mut report = ValidationError::default();
        check_email("eve.holt@reqres.in", &mut report);
        assert!(report.is_empty());

        check_email("eve.holt", &mut report);
        assert_eq!(report.errors(), &[FieldError::InvalidEmail]);
    }

    #[test]
    fn avatar_must_be_absolute_http_url() {
        for bad in ["not a url", "ftp://files.example/a.png", "/img/a.png"] {
            let mut report = ValidationError::default();
            check_avatar(bad, &mut report);
            assert_eq!(report.errors(), &[FieldError::InvalidUrl], "{bad}");
        }

        let mut report = ValidationError::default();
        check_avatar("https://reqres.in/img/faces/7-image.jpg", &mut report);
        assert!(report.is_empty());
    }

    #[test]
    fn display_joins_all_violations() {
        let mut report = ValidationError::default();
        report.push(FieldError::InvalidEmail);
        report.push(FieldError::InvalidUrl);
        assert_eq!(report.to_string(), "Invalid email address; Invalid URL");
    }
}
