//! Per-request gate decisions and how denials become HTTP responses.

use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Serialize, Serializer};

use crate::{error::GateError, models::response_format::ResponseFormat};

/// Outcome of evaluating one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Forward the request to the next handler untouched.
    Allow,

    /// Short-circuit with the given denial.
    Deny(Denial),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

/// Payload of a denied request.
///
/// Field order matters: it is the key order of the
/// `application/problem+json` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Denial {
    #[serde(serialize_with = "serialize_status")]
    pub status: StatusCode,

    pub title: &'static str,

    pub detail: String,
}

fn serialize_status<S: Serializer>(status: &StatusCode, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u16(status.as_u16())
}

impl From<GateError> for Denial {
    fn from(err: GateError) -> Self {
        Denial {
            status: err.status(),
            title: err.title(),
            detail: err.to_string(),
        }
    }
}

impl Denial {
    /// Build the HTTP response for this denial.
    ///
    /// # Format Mapping
    ///
    /// - `ProblemJson` → `Content-Type: application/problem+json`, body
    ///   `{"status":..,"title":..,"detail":..}`
    /// - `Json` → `Content-Type: application/json`, body is the JSON-encoded detail string
    /// - `Suppressed` → no `Content-Type`, empty body
    /// - `PlainText` → `Content-Type: text/plain`, body is the raw detail
    ///
    /// The status code is applied in every case.
    pub fn render(&self, format: ResponseFormat) -> Response {
        match format {
            ResponseFormat::ProblemJson => match serde_json::to_string(self) {
                Ok(body) => self.with_body(ResponseFormat::PROBLEM_JSON, body),
                Err(err) => {
                    tracing::error!(error = %err, "Failed to encode problem body");
                    self.render(ResponseFormat::PlainText)
                }
            },
            ResponseFormat::Json => match serde_json::to_string(&self.detail) {
                Ok(body) => self.with_body(ResponseFormat::JSON, body),
                Err(err) => {
                    tracing::error!(error = %err, "Failed to encode JSON body");
                    self.render(ResponseFormat::PlainText)
                }
            },
            ResponseFormat::Suppressed => self.status.into_response(),
            ResponseFormat::PlainText => {
                self.with_body(ResponseFormat::PLAIN_TEXT, self.detail.clone())
            }
        }
    }

    fn with_body(&self, content_type: &'static str, body: String) -> Response {
        (self.status, [(header::CONTENT_TYPE, content_type)], body).into_response()
    }
}
