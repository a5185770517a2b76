//! Inbound webhook events and their decoder.
//!
//! Decoding is deliberately lenient: unknown fields are ignored, missing or
//! `null` fields take their zero value, and unrecognized build statuses are
//! preserved as [`BuildStatus::Other`]. Only malformed JSON, bodies that are
//! not a JSON object and mistyped fields are rejected.

use serde::de::{self, Unexpected};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::DecodeError;

/// Which inbound schema a route expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Monitoring incident notification
    Incident,
    /// CI/CD build status change
    Build,
}

impl EventKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Incident => "incident",
            Self::Build => "build",
        }
    }
}

/// A decoded inbound event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Incident(IncidentNotification),
    Build(BuildEvent),
}

impl Event {
    /// Decode a request body as the given event kind.
    pub fn decode(kind: EventKind, body: &[u8]) -> Result<Self, DecodeError> {
        match kind {
            EventKind::Incident => IncidentNotification::decode(body).map(Self::Incident),
            EventKind::Build => BuildEvent::decode(body).map(Self::Build),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::Incident(_) => EventKind::Incident,
            Self::Build(_) => EventKind::Build,
        }
    }
}

// =============================================================================
// Monitoring incidents
// =============================================================================

/// Envelope the monitoring service wraps around every incident.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentNotification {
    #[serde(default, deserialize_with = "null_as_default")]
    pub incident: IncidentEvent,
    #[serde(default, deserialize_with = "null_as_default")]
    pub version: String,
}

impl IncidentNotification {
    /// Decode either the full envelope or a bare incident object.
    pub fn decode(body: &[u8]) -> Result<Self, DecodeError> {
        let value = object_body(body)?;

        if value.get("incident").is_some() {
            return Ok(serde_json::from_value(value)?);
        }

        Ok(Self {
            incident: serde_json::from_value(value)?,
            version: String::new(),
        })
    }
}

/// A monitoring alert lifecycle transition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IncidentEvent {
    #[serde(deserialize_with = "null_as_default")]
    pub incident_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub resource_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub resource_name: String,
    /// `open` or `closed`; anything other than `open` is treated as closed
    #[serde(deserialize_with = "null_as_default")]
    pub state: String,
    /// Unix seconds, zero when the incident has not started
    #[serde(deserialize_with = "null_as_default")]
    pub started_at: i64,
    /// Unix seconds, only meaningful when `started_at` is set
    #[serde(deserialize_with = "null_as_default")]
    pub ended_at: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub policy_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub condition_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(deserialize_with = "null_as_default")]
    pub summary: String,
}

impl IncidentEvent {
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state == "open"
    }
}

// =============================================================================
// CI/CD builds
// =============================================================================

/// A CI/CD pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BuildEvent {
    #[serde(alias = "log_url", deserialize_with = "null_as_default")]
    pub log_url: String,
    #[serde(alias = "repo_name", deserialize_with = "null_as_default")]
    pub repo_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub status: BuildStatus,
    #[serde(deserialize_with = "null_as_default")]
    pub tag: String,
    #[serde(alias = "trigger_name", deserialize_with = "null_as_default")]
    pub trigger_name: String,
}

impl BuildEvent {
    /// Decode a build event body.
    pub fn decode(body: &[u8]) -> Result<Self, DecodeError> {
        Ok(serde_json::from_value(object_body(body)?)?)
    }
}

/// Build pipeline status. Matching is case-sensitive; anything else is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BuildStatus {
    Queued,
    Working,
    Success,
    Failure,
    Cancelled,
    Other(String),
}

impl BuildStatus {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Queued => "QUEUED",
            Self::Working => "WORKING",
            Self::Success => "SUCCESS",
            Self::Failure => "FAILURE",
            Self::Cancelled => "CANCELLED",
            Self::Other(raw) => raw,
        }
    }
}

impl Default for BuildStatus {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

impl From<String> for BuildStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "QUEUED" => Self::Queued,
            "WORKING" => Self::Working,
            "SUCCESS" => Self::Success,
            "FAILURE" => Self::Failure,
            "CANCELLED" => Self::Cancelled,
            _ => Self::Other(raw),
        }
    }
}

impl From<BuildStatus> for String {
    fn from(status: BuildStatus) -> Self {
        match status {
            BuildStatus::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse a body that must be a JSON object. Derived struct deserializers
/// would otherwise fill fields from a top-level array by position.
fn object_body(body: &[u8]) -> Result<Value, DecodeError> {
    let value: Value = serde_json::from_slice(body)?;
    if value.is_object() {
        return Ok(value);
    }

    let unexpected = match &value {
        Value::Object(_) | Value::Array(_) => Unexpected::Seq,
        Value::Null => Unexpected::Unit,
        Value::Bool(b) => Unexpected::Bool(*b),
        Value::Number(_) => Unexpected::Other("number"),
        Value::String(s) => Unexpected::Str(s),
    };
    Err(DecodeError::TypeMismatch(de::Error::invalid_type(
        unexpected,
        &"a JSON object",
    )))
}

/// Treat an explicit JSON `null` the same as an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
