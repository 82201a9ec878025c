//! Gate error types and their HTTP mapping.
//!
//! Every way the gate can refuse a request is a variant here, including a
//! form body it could not buffer while looking for the key. None of them
//! are faults: each one maps to a fixed status code, title and detail that
//! are handed back to the client.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::models::{decision::Denial, response_format::ResponseFormat};

/// Reasons the gate denies a request.
///
/// The `Display` text of each variant is the `detail` sent to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GateError {
    /// The gate was configured with an empty parameter name.
    ///
    /// Returns HTTP 500 Internal Server Error. This is a server-side
    /// configuration problem, reported even when the request carries no key.
    #[error("No valid name provided for API key parameter.")]
    MissingParameterName,

    /// The request does not carry the key parameter, or carries it empty.
    ///
    /// Returns HTTP 403 Forbidden.
    #[error("API key is not provided.")]
    KeyNotProvided,

    /// The presented key is not in the configured allow-list.
    ///
    /// Returns HTTP 403 Forbidden.
    #[error("API key is not authorized.")]
    KeyNotAuthorized,

    /// A form body grew past the body limit while being buffered.
    ///
    /// Returns HTTP 413 Payload Too Large. Bodies that declare an oversized
    /// `Content-Length` up front are never buffered and never hit this.
    #[error("Request body is too large.")]
    BodyTooLarge,

    /// A form body failed to arrive in full.
    ///
    /// Returns HTTP 400 Bad Request.
    #[error("Request body could not be read.")]
    BodyUnreadable,
}

impl GateError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            GateError::MissingParameterName => StatusCode::INTERNAL_SERVER_ERROR,
            GateError::KeyNotProvided | GateError::KeyNotAuthorized => StatusCode::FORBIDDEN,
            GateError::BodyTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            GateError::BodyUnreadable => StatusCode::BAD_REQUEST,
        }
    }

    /// Short human-readable title, the canonical reason phrase of the status.
    pub fn title(&self) -> &'static str {
        match self {
            GateError::MissingParameterName => "Internal Server Error",
            GateError::KeyNotProvided | GateError::KeyNotAuthorized => "Forbidden",
            GateError::BodyTooLarge => "Payload Too Large",
            GateError::BodyUnreadable => "Bad Request",
        }
    }
}

/// Render with the default text/plain format.
///
/// Handlers that want another format go through [`Denial::render`].
impl IntoResponse for GateError {
    fn into_response(self) -> Response {
        Denial::from(self).render(ResponseFormat::default())
    }
}
