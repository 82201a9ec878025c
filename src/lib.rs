//! API key gate for axum.
//!
//! Gates routes behind a static allow-list of API keys read from a named
//! request parameter (query string or url-encoded form body). Requests with a
//! listed key pass through untouched; everything else is answered with a 403
//! (or a 500 when the gate itself is misconfigured) rendered as plain text,
//! JSON, problem+JSON or an empty body.
//!
//! # Usage
//!
//! ```ignore
//! let gate = Arc::new(KeyGate::new(["abc123"]).with_content_type("application/problem+json"));
//! let app = Router::new()
//!     .route("/reports", get(reports))
//!     .route_layer(axum::middleware::from_fn_with_state(gate, api_key_middleware));
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use std::sync::Arc;

use axum::{Router, middleware as axum_middleware, routing::get};

pub use error::GateError;
pub use middleware::api_key::api_key_middleware;
pub use models::{
    decision::{Decision, Denial},
    params::{RequestParamMap, RequestParams},
    response_format::ResponseFormat,
};
pub use services::key_gate::KeyGate;

/// Build the demo router: a public health check plus gated echo routes.
pub fn router(gate: KeyGate) -> Router {
    let gated_routes = Router::new()
        .route(
            "/api/v1/echo",
            get(handlers::echo::echo).post(handlers::echo::echo_form),
        )
        // Apply the gate to every route in this group
        .route_layer(axum_middleware::from_fn_with_state(
            Arc::new(gate),
            api_key_middleware,
        ));

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .merge(gated_routes)
}
