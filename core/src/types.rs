//! Domain DTOs for the user API.
//!
//! # Design
//! These types mirror the mock-server's schema but are defined independently.
//! Integration tests catch any schema drift between the two crates.
//!
//! The list endpoint answers in more than one shape, so its body is decoded
//! into `ListPayload` explicitly instead of being deserialized straight into
//! `Vec<Record>`. Anything that is neither an envelope nor an array keeps its
//! own variant so the caller decides how loudly to complain.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Access level of a user record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[default]
    Viewer,
    Editor,
    Admin,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Viewer, Role::Editor, Role::Admin];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Viewer => "Viewer",
            Role::Editor => "Editor",
            Role::Admin => "Admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown role `{0}` (expected Viewer, Editor or Admin)")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

/// A single user record returned by the API.
///
/// `id` is assigned by the server. Some backends emit numeric ids, so both
/// JSON strings and numbers are accepted and normalized to a string.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Record {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, found {other}"
        ))),
    }
}

/// Request payload for creating a new user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub role: Role,
}

/// Request payload for updating an existing user. Email is write-once and
/// therefore has no field here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserChanges {
    pub name: String,
    pub role: Role,
}

/// In-progress form contents. Has no id until a create call succeeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    pub name: String,
    pub email: String,
    pub role: Option<Role>,
}

impl Default for Draft {
    fn default() -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            role: Some(Role::Viewer),
        }
    }
}

impl Draft {
    pub fn from_record(record: &Record) -> Self {
        Self {
            name: record.name.clone(),
            email: record.email.clone(),
            role: Some(record.role),
        }
    }
}

/// Identifies one notification so a stale dismiss timer can be told apart
/// from the one currently armed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NotificationId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
    Info,
}

impl NotificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationKind::Success => "success",
            NotificationKind::Error => "error",
            NotificationKind::Info => "info",
        }
    }
}

/// A transient status message. At most one is live at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: NotificationId,
    pub message: String,
    pub kind: NotificationKind,
}

/// Decoded body of a list response.
#[derive(Debug, Clone, PartialEq)]
pub enum ListPayload {
    /// `{ "success": true, "data": [...] }`, optionally with a `count`.
    Envelope { data: Vec<Record>, count: Option<u64> },
    /// A bare JSON array of records.
    Bare(Vec<Record>),
    /// Any other JSON value, kept for logging.
    Unrecognized(Value),
}

impl ListPayload {
    /// Classify a parsed JSON body. Fails only when a recognized shape holds
    /// entries that are not valid records.
    pub fn decode(value: Value) -> Result<Self, serde_json::Error> {
        match value {
            Value::Array(items) => {
                let records = serde_json::from_value(Value::Array(items))?;
                Ok(ListPayload::Bare(records))
            }
            Value::Object(mut map)
                if map.get("success") == Some(&Value::Bool(true))
                    && map.get("data").is_some_and(Value::is_array) =>
            {
                let data = serde_json::from_value(map.remove("data").unwrap_or_default())?;
                let count = map.get("count").and_then(Value::as_u64);
                Ok(ListPayload::Envelope { data, count })
            }
            other => Ok(ListPayload::Unrecognized(other)),
        }
    }

    /// The records carried by a recognized shape, or `None`.
    pub fn into_records(self) -> Option<Vec<Record>> {
        match self {
            ListPayload::Envelope { data, .. } => Some(data),
            ListPayload::Bare(records) => Some(records),
            ListPayload::Unrecognized(_) => None,
        }
    }
}

/// Body of a create or update response: either the record itself or the
/// record wrapped in the same `data` envelope the list endpoint uses.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum RecordPayload {
    Envelope { data: Record },
    Bare(Record),
}

impl RecordPayload {
    pub(crate) fn into_record(self) -> Record {
        match self {
            RecordPayload::Envelope { data } => data,
            RecordPayload::Bare(record) => record,
        }
    }
}
