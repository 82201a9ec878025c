//! Read-only view of a request's named parameters.

use std::{collections::HashMap, hash::BuildHasher};

/// Accessor for request parameters, keyed by name.
///
/// The gate only ever reads through this trait, so it can be evaluated
/// against anything that can answer "what value does this name have".
pub trait RequestParams {
    /// Value of `name`, or `None` when the request does not carry it.
    fn param(&self, name: &str) -> Option<&str>;
}

impl<S: BuildHasher> RequestParams for HashMap<String, String, S> {
    fn param(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

/// Parameters gathered from the query string and a form body.
///
/// Form values are merged over query values, so a name present in both
/// resolves to the form value. Within one source the last occurrence wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestParamMap {
    values: HashMap<String, String>,
}

impl RequestParamMap {
    /// Decode the pairs of a raw (still percent-encoded) query string.
    pub fn from_query(query: Option<&str>) -> Self {
        let mut params = Self::default();
        if let Some(query) = query {
            params.extend_encoded(query.as_bytes());
        }
        params
    }

    /// Merge the pairs of an `application/x-www-form-urlencoded` body.
    pub fn merge_form(&mut self, body: &[u8]) {
        self.extend_encoded(body);
    }

    /// Merge already-decoded name/value pairs, such as multipart text fields.
    pub fn merge_pairs<I>(&mut self, pairs: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        self.values.extend(pairs);
    }

    fn extend_encoded(&mut self, input: &[u8]) {
        self.values.extend(
            url::form_urlencoded::parse(input).map(|(k, v)| (k.into_owned(), v.into_owned())),
        );
    }
}

impl RequestParams for RequestParamMap {
    fn param(&self, name: &str) -> Option<&str> {
        self.values.param(name)
    }
}
