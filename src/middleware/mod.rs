//! HTTP middleware components.
//!
//! Middleware run before route handlers and can short-circuit a request by
//! producing their own response.

/// API key gate middleware
pub mod api_key;
