//! Content type used when rendering a denial.

use std::{convert::Infallible, fmt, str::FromStr};

use serde::Deserialize;

/// How a denied request's body is rendered.
///
/// Parsed from the configured content-type string. Anything that is not one
/// of the recognised values falls back to [`ResponseFormat::PlainText`]
/// rather than failing, so a typo in configuration still produces a readable
/// response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "String")]
pub enum ResponseFormat {
    /// `text/plain`: the detail string as-is.
    #[default]
    PlainText,

    /// `application/json`: the detail as a JSON string literal.
    Json,

    /// `application/problem+json`: an object with `status`, `title`, `detail`.
    ProblemJson,

    /// `none`: status code only, no `Content-Type` and an empty body.
    Suppressed,
}

impl ResponseFormat {
    pub const PLAIN_TEXT: &'static str = "text/plain";
    pub const JSON: &'static str = "application/json";
    pub const PROBLEM_JSON: &'static str = "application/problem+json";
    pub const NONE: &'static str = "none";

    /// Configuration string for this format.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseFormat::PlainText => Self::PLAIN_TEXT,
            ResponseFormat::Json => Self::JSON,
            ResponseFormat::ProblemJson => Self::PROBLEM_JSON,
            ResponseFormat::Suppressed => Self::NONE,
        }
    }
}

impl FromStr for ResponseFormat {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            Self::PROBLEM_JSON => ResponseFormat::ProblemJson,
            Self::JSON => ResponseFormat::Json,
            Self::NONE => ResponseFormat::Suppressed,
            _ => ResponseFormat::PlainText,
        })
    }
}

impl From<&str> for ResponseFormat {
    fn from(s: &str) -> Self {
        match s.parse::<ResponseFormat>() {
            Ok(format) => format,
            Err(never) => match never {},
        }
    }
}

impl From<String> for ResponseFormat {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl fmt::Display for ResponseFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
