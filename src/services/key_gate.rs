//! Key gate - the allow-list check behind the API key middleware.
//!
//! The gate is configured once at startup and never mutated afterwards, so a
//! single instance can be shared across every request behind an `Arc`.
//!
//! # Evaluation Order
//!
//! 1. Parameter name configured? Otherwise 500.
//! 2. Key present and non-empty? Otherwise 403 "not provided".
//! 3. Key in the allow-list? Otherwise 403 "not authorized".
//!
//! The configuration check comes first so a misconfigured gate reports a
//! server error even for requests that carry no key at all.

use std::collections::HashSet;

use crate::{
    error::GateError,
    models::{
        decision::{Decision, Denial},
        params::RequestParams,
        response_format::ResponseFormat,
    },
};

/// Static API key allow-list.
///
/// Keys are compared by exact string equality: no trimming, no case
/// folding, no prefix matching. An empty allow-list is valid and simply
/// denies every request.
#[derive(Debug, Clone)]
pub struct KeyGate {
    valid_keys: HashSet<String>,
    parameter_name: String,
    content_type: ResponseFormat,
    body_limit: usize,
}

impl KeyGate {
    /// Parameter read when none is configured.
    pub const DEFAULT_PARAMETER_NAME: &'static str = "api_key";

    /// Largest url-encoded form body buffered while looking for the key.
    pub const DEFAULT_BODY_LIMIT: usize = 64 * 1024;

    /// Create a gate accepting exactly `valid_keys`.
    ///
    /// Reads the `api_key` parameter and denies with `text/plain` until
    /// overridden with [`with_parameter_name`](Self::with_parameter_name) and
    /// [`with_content_type`](Self::with_content_type).
    pub fn new<I, K>(valid_keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        Self {
            valid_keys: valid_keys.into_iter().map(Into::into).collect(),
            parameter_name: Self::DEFAULT_PARAMETER_NAME.to_string(),
            content_type: ResponseFormat::default(),
            body_limit: Self::DEFAULT_BODY_LIMIT,
        }
    }

    pub fn with_parameter_name(mut self, parameter_name: impl Into<String>) -> Self {
        self.parameter_name = parameter_name.into();
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<ResponseFormat>) -> Self {
        self.content_type = content_type.into();
        self
    }

    pub fn with_body_limit(mut self, body_limit: usize) -> Self {
        self.body_limit = body_limit;
        self
    }

    pub fn parameter_name(&self) -> &str {
        &self.parameter_name
    }

    pub fn content_type(&self) -> ResponseFormat {
        self.content_type
    }

    pub fn body_limit(&self) -> usize {
        self.body_limit
    }

    pub fn key_count(&self) -> usize {
        self.valid_keys.len()
    }

    /// Check a request's parameters against the allow-list.
    ///
    /// # Errors
    ///
    /// - `MissingParameterName`: the gate was built with an empty parameter name
    /// - `KeyNotProvided`: the parameter is absent or empty
    /// - `KeyNotAuthorized`: the value is not in the allow-list
    pub fn check<P>(&self, params: &P) -> Result<(), GateError>
    where
        P: RequestParams + ?Sized,
    {
        if self.parameter_name.is_empty() {
            return Err(GateError::MissingParameterName);
        }

        let incoming_key = params
            .param(&self.parameter_name)
            .filter(|key| !key.is_empty())
            .ok_or(GateError::KeyNotProvided)?;

        if !self.valid_keys.contains(incoming_key) {
            return Err(GateError::KeyNotAuthorized);
        }

        Ok(())
    }

    /// Evaluate a request into an allow/deny decision.
    pub fn evaluate<P>(&self, params: &P) -> Decision
    where
        P: RequestParams + ?Sized,
    {
        match self.check(params) {
            Ok(()) => Decision::Allow,
            Err(err) => Decision::Deny(Denial::from(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use std::collections::HashMap;

    fn request(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults() {
        let gate = KeyGate::new(["abc123"]);

        assert_eq!(gate.parameter_name(), "api_key");
        assert_eq!(gate.content_type(), ResponseFormat::PlainText);
        assert_eq!(gate.body_limit(), KeyGate::DEFAULT_BODY_LIMIT);
        assert_eq!(gate.key_count(), 1);
    }

    #[test]
    fn allows_configured_key() {
        let gate = KeyGate::new(["abc123"]);

        assert_eq!(gate.evaluate(&request(&[("api_key", "abc123")])), Decision::Allow);
    }

    #[test]
    fn denies_unknown_key() {
        let gate = KeyGate::new(["abc123"]);

        assert_eq!(
            gate.check(&request(&[("api_key", "wrong")])),
            Err(GateError::KeyNotAuthorized)
        );
    }

    #[test]
    fn comparison_is_exact() {
        let gate = KeyGate::new(["7", "abc"]);

        for key in ["007", "07", "ABC", " abc", "abc ", "ab", "abcd"] {
            assert_eq!(
                gate.check(&request(&[("api_key", key)])),
                Err(GateError::KeyNotAuthorized),
                "key {key:?} should not match"
            );
        }
    }

    #[test]
    fn missing_or_empty_key_is_not_provided() {
        let gate = KeyGate::new(["abc123"]);

        assert_eq!(gate.check(&request(&[])), Err(GateError::KeyNotProvided));
        assert_eq!(
            gate.check(&request(&[("api_key", "")])),
            Err(GateError::KeyNotProvided)
        );
        assert_eq!(
            gate.check(&request(&[("other", "abc123")])),
            Err(GateError::KeyNotProvided)
        );
    }

    #[test]
    fn empty_allow_list_denies_everything() {
        let gate = KeyGate::new(Vec::<String>::new());

        assert_eq!(gate.check(&request(&[])), Err(GateError::KeyNotProvided));
        assert_eq!(
            gate.check(&request(&[("api_key", "anything")])),
            Err(GateError::KeyNotAuthorized)
        );
    }

    #[test]
    fn empty_parameter_name_is_server_error_first() {
        let gate = KeyGate::new(["abc123"]).with_parameter_name("");

        for params in [request(&[]), request(&[("", "abc123")]), request(&[("api_key", "abc123")])] {
            let Decision::Deny(denial) = gate.evaluate(&params) else {
                panic!("expected denial");
            };
            assert_eq!(denial.status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(denial.title, "Internal Server Error");
            assert_eq!(denial.detail, "No valid name provided for API key parameter.");
        }
    }

    #[test]
    fn custom_parameter_name() {
        let gate = KeyGate::new(["abc123"]).with_parameter_name("token");

        assert!(gate.evaluate(&request(&[("token", "abc123")])).is_allowed());
        assert_eq!(
            gate.check(&request(&[("api_key", "abc123")])),
            Err(GateError::KeyNotProvided)
        );
    }

    #[test]
    fn denial_carries_status_title_detail() {
        let gate = KeyGate::new(["abc123"]);

        assert_eq!(
            gate.evaluate(&request(&[])),
            Decision::Deny(Denial {
                status: StatusCode::FORBIDDEN,
                title: "Forbidden",
                detail: "API key is not provided.".to_string(),
            })
        );
    }

    #[test]
    fn content_type_accepts_strings() {
        let gate = KeyGate::new(["abc123"]).with_content_type("application/problem+json");
        assert_eq!(gate.content_type(), ResponseFormat::ProblemJson);

        let gate = KeyGate::new(["abc123"]).with_content_type("text/xml");
        assert_eq!(gate.content_type(), ResponseFormat::PlainText);
    }
}
