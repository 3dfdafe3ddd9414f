//! Stateless HTTP request builder and response parser for the user API.
//!
//! # Design
//! `UserClient` holds only a `base_url` and carries no mutable state between
//! calls. Each CRUD operation is split into a `build_*` method that produces
//! an `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! The caller executes the actual HTTP round-trip, exactly once per call.
//!
//! The backend exposes a single resource URL and selects the operation with
//! the `api` query parameter; record ids travel in the `id` parameter.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{ListPayload, NewUser, Record, RecordPayload, UserChanges};

const JSON: &str = "application/json";

/// Synchronous, stateless client for the user API.
#[derive(Debug, Clone)]
pub struct UserClient {
    base_url: String,
}

impl UserClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_list(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: format!("{}?api=read", self.base_url),
            headers: read_headers(),
            body: None,
        }
    }

    pub fn build_create(&self, input: &NewUser) -> Result<HttpRequest, ApiError> {
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: format!("{}?api=create", self.base_url),
            headers: write_headers(),
            body: Some(to_json(input)?),
        })
    }

    pub fn build_update(&self, id: &str, input: &UserChanges) -> Result<HttpRequest, ApiError> {
        Ok(HttpRequest {
            method: HttpMethod::Put,
            path: format!("{}?api=update&id={}", self.base_url, encode_id(id)),
            headers: write_headers(),
            body: Some(to_json(input)?),
        })
    }

    pub fn build_delete(&self, id: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            path: format!("{}?api=delete&id={}", self.base_url, encode_id(id)),
            headers: read_headers(),
            body: None,
        }
    }

    /// Classify a list response. An unrecognized shape is not an error at
    /// this layer; see `ListPayload::Unrecognized`.
    pub fn parse_list(&self, response: HttpResponse) -> Result<ListPayload, ApiError> {
        check_status(&response)?;
        let value: Value = from_json(&response.body)?;
        ListPayload::decode(value).map_err(|e| ApiError::Deserialization(e.to_string()))
    }

    pub fn parse_create(&self, response: HttpResponse) -> Result<Record, ApiError> {
        check_status(&response)?;
        from_json::<RecordPayload>(&response.body).map(RecordPayload::into_record)
    }

    pub fn parse_update(&self, response: HttpResponse) -> Result<Record, ApiError> {
        check_status(&response)?;
        from_json::<RecordPayload>(&response.body).map(RecordPayload::into_record)
    }

    /// The confirmation payload is returned as-is. An empty body (e.g. 204)
    /// yields `Value::Null`.
    pub fn parse_delete(&self, response: HttpResponse) -> Result<Value, ApiError> {
        check_status(&response)?;
        if response.body.trim().is_empty() {
            return Ok(Value::Null);
        }
        from_json(&response.body)
    }
}

fn read_headers() -> Vec<(String, String)> {
    vec![("accept".to_string(), JSON.to_string())]
}

fn write_headers() -> Vec<(String, String)> {
    vec![
        ("content-type".to_string(), JSON.to_string()),
        ("accept".to_string(), JSON.to_string()),
    ]
}

fn encode_id(id: &str) -> String {
    url::form_urlencoded::byte_serialize(id.as_bytes()).collect()
}

fn to_json<T: Serialize>(input: &T) -> Result<String, ApiError> {
    serde_json::to_string(input).map_err(|e| ApiError::Serialization(e.to_string()))
}

fn from_json<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Deserialization(e.to_string()))
}

/// Map any non-2xx status to `ApiError::HttpStatus` with a readable reason.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    let reason = http::StatusCode::from_u16(response.status)
        .ok()
        .and_then(|status| status.canonical_reason())
        .map(str::to_string)
        .or_else(|| {
            let body = response.body.trim();
            (!body.is_empty()).then(|| body.to_string())
        })
        .unwrap_or_else(|| "Unknown Status".to_string());
    Err(ApiError::HttpStatus {
        status: response.status,
        reason,
    })
}
