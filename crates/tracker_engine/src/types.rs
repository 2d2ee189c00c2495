use std::fmt;

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracker_core::{JobId, Origin, StatusReport, StatusTag};

/// Accepted submission: the backend job id plus what was submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobHandle {
    pub job_id: JobId,
    pub origin: Origin,
    pub source_label: String,
}

/// Body of `POST /upload`.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct CreateJobResponse {
    #[serde(default)]
    pub success: Value,
    #[serde(default, deserialize_with = "optional_id")]
    pub process_id: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl CreateJobResponse {
    /// Whether `success` is set to anything but a JSON falsy value.
    pub fn succeeded(&self) -> bool {
        match &self.success {
            Value::Null => false,
            Value::Bool(flag) => *flag,
            Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
            Value::String(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) => true,
        }
    }
}

/// Body of `GET /api/status/{process_id}`.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct StatusResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub progress: Option<f64>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "optional_id")]
    pub document_id: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl StatusResponse {
    pub fn into_report(self) -> StatusReport {
        StatusReport {
            status: StatusTag::parse(&self.status),
            progress: self.progress.map(|p| p.round() as i64),
            message: self.message,
            document_id: self.document_id,
            error: self.error,
        }
    }
}

/// Ids arrive as strings or integers depending on the backend table.
fn optional_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct BackendError {
    pub kind: FailureKind,
    pub message: String,
}

impl BackendError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Network,
    InvalidResponse,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::InvalidResponse => write!(f, "invalid response"),
        }
    }
}
