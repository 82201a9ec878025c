//! Demo server configuration.
//!
//! Loaded from environment variables with the `envy` crate. The gate itself
//! never reads the environment; this is only how the bundled server builds
//! its [`KeyGate`].

use serde::Deserialize;

use crate::{models::response_format::ResponseFormat, services::key_gate::KeyGate};

/// Server configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `VALID_API_KEYS` (optional): comma-separated allow-list, defaults to empty
/// - `API_KEY_PARAMETER` (optional): parameter holding the key, defaults to `api_key`
/// - `API_KEY_CONTENT_TYPE` (optional): `text/plain`, `application/json`,
///   `application/problem+json` or `none`; defaults to `text/plain`
/// - `SERVER_PORT` (optional): HTTP server port, defaults to 3000
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub valid_api_keys: Vec<String>,

    #[serde(default = "default_parameter")]
    pub api_key_parameter: String,

    #[serde(default)]
    pub api_key_content_type: ResponseFormat,

    #[serde(default = "default_port")]
    pub server_port: u16,
}

fn default_parameter() -> String {
    KeyGate::DEFAULT_PARAMETER_NAME.to_string()
}

/// Default port if SERVER_PORT environment variable is not set.
fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file is loaded first if one exists.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable cannot be parsed into its field type
    /// (e.g. a non-numeric `SERVER_PORT`).
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();

        envy::from_env::<Config>()
    }

    /// Load configuration from explicit name/value pairs.
    pub fn from_vars<I>(vars: I) -> Result<Self, envy::Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter(vars)
    }

    /// Build the gate described by this configuration.
    ///
    /// Empty entries in `VALID_API_KEYS` (e.g. from a trailing comma) are
    /// dropped; they could never match since an empty key counts as missing.
    pub fn key_gate(&self) -> KeyGate {
        KeyGate::new(self.valid_api_keys.iter().filter(|key| !key.is_empty()).cloned())
            .with_parameter_name(self.api_key_parameter.clone())
            .with_content_type(self.api_key_content_type)
    }
}
