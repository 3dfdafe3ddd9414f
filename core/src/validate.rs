//! Field-level validation of a draft before it is sent anywhere.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::types::Draft;

/// `local@domain.tld` with no whitespace and exactly one `@` per side.
static EMAIL_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

/// An editable field of the user form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Name,
    Email,
    Role,
}

impl Field {
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Role => "role",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown field `{0}`")]
pub struct UnknownField(pub String);

impl FromStr for Field {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(Field::Name),
            "email" => Ok(Field::Email),
            "role" => Ok(Field::Role),
            _ => Err(UnknownField(s.to_string())),
        }
    }
}

/// Field to message. Empty means the draft may be submitted.
pub type ValidationErrors = BTreeMap<Field, String>;

/// Check a draft. Email is neither required nor checked in edit mode since
/// it is write-once and never transmitted on update.
pub fn validate(draft: &Draft, is_edit_mode: bool) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    if draft.name.trim().is_empty() {
        errors.insert(Field::Name, "Name is required".to_string());
    }

    if !is_edit_mode {
        if draft.email.trim().is_empty() {
            errors.insert(Field::Email, "Email is required".to_string());
        } else if !is_valid_email(&draft.email) {
            errors.insert(Field::Email, "Please enter a valid email address".to_string());
        }
    }

    if draft.role.is_none() {
        errors.insert(Field::Role, "Role is required".to_string());
    }

    errors
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_SHAPE.is_match(email)
}
