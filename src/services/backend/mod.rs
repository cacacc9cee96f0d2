/// Blend service abstraction
///
/// The scoring itself runs remotely. A backend only moves bytes: it returns
/// the status and body it received, or a transport failure. Turning that
/// outcome into a result set or a failure kind is done by [`classify`], which
/// is the single place where HTTP semantics are interpreted.
use chrono::Utc;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::{
    error::{BlendError, BlendResult},
    models::{BlendRequest, RankedResultSet, RecommendationItem},
};

pub mod http;

pub use http::HttpBackend;

/// Status and body of a response that did arrive
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// No response was received
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("{0}")]
pub struct TransportError(pub String);

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        TransportError(e.to_string())
    }
}

pub type TransportOutcome = Result<RawResponse, TransportError>;

/// Body of the blend endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BlendPayload {
    pub user1_url: String,
    pub user2_url: String,
}

impl From<&BlendRequest> for BlendPayload {
    fn from(request: &BlendRequest) -> Self {
        Self {
            user1_url: request.first().to_string(),
            user2_url: request.second().to_string(),
        }
    }
}

/// Body of the saved-data blend endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TestBlendRequest {
    pub user1_name: String,
    pub user2_name: String,
}

impl Default for TestBlendRequest {
    fn default() -> Self {
        Self {
            user1_name: "rbaveje".to_string(),
            user2_name: "vihaanbinges".to_string(),
        }
    }
}

/// Answer of the health endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub version: Option<String>,
}

/// Trait for blend service transports
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait BlendBackend: Send + Sync {
    /// POST /blend with both canonical profile locators
    async fn post_blend(&self, payload: &BlendPayload) -> TransportOutcome;

    /// GET /mock, the argument-less preview endpoint
    async fn get_mock(&self) -> TransportOutcome;

    /// POST /blend/test, blending pre-saved user data
    async fn post_test_blend(&self, request: &TestBlendRequest) -> TransportOutcome;

    /// GET /health
    async fn get_health(&self) -> TransportOutcome;

    /// Backend name for logging
    fn name(&self) -> &'static str;
}

/// Error body the service sends with non-success statuses
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<serde_json::Value>,
    #[serde(default)]
    errors: Vec<FieldError>,
}

#[derive(Debug, Deserialize)]
struct FieldError {
    #[serde(default)]
    field: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Maps a transport outcome onto a ranked result set or exactly one failure kind
pub fn classify(outcome: TransportOutcome) -> BlendResult<RankedResultSet> {
    let response = outcome.map_err(|e| BlendError::Network(e.0))?;
    let body = success_body(response)?;

    let items: Vec<RecommendationItem> = serde_json::from_str(&body).map_err(|e| {
        tracing::error!(error = %e, body_len = body.len(), "Failed to parse blend response");
        BlendError::MalformedResponse(e.to_string())
    })?;

    Ok(RankedResultSet::new(items))
}

/// Same taxonomy as [`classify`], for the health endpoint
pub fn classify_health(outcome: TransportOutcome) -> BlendResult<HealthStatus> {
    let response = outcome.map_err(|e| BlendError::Network(e.0))?;
    let body = success_body(response)?;

    serde_json::from_str(&body).map_err(|e| BlendError::MalformedResponse(e.to_string()))
}

fn success_body(response: RawResponse) -> BlendResult<String> {
    let RawResponse { status, body } = response;

    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(BlendError::budget_exhausted(Utc::now()));
    }

    if !status.is_success() {
        return Err(BlendError::RequestFailed {
            status: status.as_u16(),
            message: failure_message(status, &body),
        });
    }

    Ok(body)
}

fn failure_message(status: StatusCode, body: &str) -> String {
    let generic = format!("Request failed with status {}", status);

    let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) else {
        return generic;
    };

    let detail = match parsed.detail {
        Some(serde_json::Value::String(detail)) if !detail.trim().is_empty() => detail,
        _ => return generic,
    };

    let field_messages: Vec<String> = parsed
        .errors
        .into_iter()
        .filter_map(|e| match (e.field, e.message) {
            (Some(field), Some(message)) => Some(format!("{}: {}", field, message)),
            (None, Some(message)) => Some(message),
            _ => None,
        })
        .collect();

    if field_messages.is_empty() {
        detail
    } else {
        format!("{} ({})", detail, field_messages.join("; "))
    }
}
