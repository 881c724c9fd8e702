//! Boundary parsing of the raw `POST /scrape` body.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use url::Url;

lazy_static! {
    // local@domain.tld: one @, no whitespace, a dot in the domain part
    static ref EMAIL_REGEX: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
}

/// One problem with one input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Result of checking the body field by field. Either part may be missing.
#[derive(Debug, Default)]
pub struct CheckedFields {
    /// The url exactly as submitted, kept for the queue message
    pub raw_url: Option<String>,
    pub url: Option<Url>,
    pub email: Option<String>,
    pub errors: Vec<FieldError>,
}

/// Parse the body and validate `url` and `email`, collecting every problem.
pub fn check_fields(body: &[u8]) -> CheckedFields {
    let value: serde_json::Value = match serde_json::from_slice(body) {
        Ok(value) => value,
        Err(_) => {
            return CheckedFields {
                errors: vec![FieldError::new("body", "must be a JSON object")],
                ..Default::default()
            }
        }
    };

    let Some(object) = value.as_object() else {
        return CheckedFields {
            errors: vec![FieldError::new("body", "must be a JSON object")],
            ..Default::default()
        };
    };

    let mut checked = CheckedFields::default();

    match string_field(object, "url") {
        Ok(raw) => match validate_url(raw) {
            Ok(url) => {
                checked.raw_url = Some(raw.to_string());
                checked.url = Some(url);
            }
            Err(e) => checked.errors.push(e),
        },
        Err(e) => checked.errors.push(e),
    }

    match string_field(object, "email") {
        Ok(raw) => match validate_email(raw) {
            Ok(email) => checked.email = Some(email),
            Err(e) => checked.errors.push(e),
        },
        Err(e) => checked.errors.push(e),
    }

    checked
}

fn string_field<'a>(
    object: &'a serde_json::Map<String, serde_json::Value>,
    field: &str,
) -> Result<&'a str, FieldError> {
    match object.get(field) {
        None | Some(serde_json::Value::Null) => Err(FieldError::new(field, "is required")),
        Some(serde_json::Value::String(s)) if s.trim().is_empty() => {
            Err(FieldError::new(field, "is required"))
        }
        Some(serde_json::Value::String(s)) => Ok(s.as_str()),
        Some(_) => Err(FieldError::new(field, "must be a string")),
    }
}

/// Absolute http(s) URL with a host.
pub fn validate_url(raw: &str) -> Result<Url, FieldError> {
    let url = Url::parse(raw.trim())
        .map_err(|_| FieldError::new("url", "must be a valid absolute URL"))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(FieldError::new("url", "must use http or https"));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(FieldError::new("url", "must include a host"));
    }
    Ok(url)
}

/// Checked as submitted: surrounding whitespace makes the address invalid.
pub fn validate_email(raw: &str) -> Result<String, FieldError> {
    if EMAIL_REGEX.is_match(raw) {
        Ok(raw.to_string())
    } else {
        Err(FieldError::new("email", "must be a valid email address"))
    }
}
