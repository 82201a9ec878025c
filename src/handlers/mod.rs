//! HTTP request handlers for the demo server.

/// Gated endpoints
pub mod echo;
/// Public health check
pub mod health;
