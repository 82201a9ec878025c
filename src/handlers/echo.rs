//! Gated echo endpoints.
//!
//! These stand in for the routes an application would put behind the gate:
//! - GET /api/v1/echo - Confirm access
//! - POST /api/v1/echo - Confirm access and list the submitted form fields

use std::collections::BTreeMap;

use axum::{Form, Json, http::Method};
use serde::Serialize;

/// Echo response.
#[derive(Debug, Serialize)]
pub struct EchoResponse {
    pub status: String,

    /// Request method
    pub method: String,

    /// Names of submitted form fields, sorted
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
}

/// Confirm that the request got past the gate.
///
/// # Response (200 OK)
///
/// ```json
/// { "status": "ok", "method": "GET" }
/// ```
pub async fn echo(method: Method) -> Json<EchoResponse> {
    Json(EchoResponse {
        status: "ok".to_string(),
        method: method.to_string(),
        fields: Vec::new(),
    })
}

/// Confirm access for a form submission.
///
/// The gate buffers url-encoded bodies to look for the key and hands them
/// on, so the full form (key included) is still readable here.
///
/// # Response (200 OK)
///
/// ```json
/// { "status": "ok", "method": "POST", "fields": ["api_key", "name"] }
/// ```
pub async fn echo_form(
    method: Method,
    Form(fields): Form<BTreeMap<String, String>>,
) -> Json<EchoResponse> {
    Json(EchoResponse {
        status: "ok".to_string(),
        method: method.to_string(),
        fields: fields.into_keys().collect(),
    })
}
