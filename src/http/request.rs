//! Request source handed to the dispatcher.
//!
//! # Responsibilities
//! - Carry the verb, the raw URI and the decoded query/form parameters
//! - Produce the matchable path (query stripped, percent-decoded)
//!
//! # Design Decisions
//! - Transport-agnostic: the axum adapter and tests build it the same way
//! - `+` in the path stays a literal plus; only `%XX` escapes are decoded

use std::collections::HashMap;

/// One incoming request, as seen by the dispatch core.
#[derive(Debug, Clone, Default)]
pub struct Request {
    method: String,
    uri: String,
    query: HashMap<String, String>,
    form: HashMap<String, String>,
}

impl Request {
    /// Build from a verb and a raw URI (`/items/42?sort=asc`).
    pub fn new(method: impl Into<String>, uri: impl Into<String>) -> Self {
        let uri = uri.into();
        let query = uri
            .split_once('?')
            .map(|(_, q)| parse_urlencoded(q))
            .unwrap_or_default();
        Self {
            method: method.into(),
            uri,
            query,
            form: HashMap::new(),
        }
    }

    /// Attach an `application/x-www-form-urlencoded` body.
    pub fn with_form_body(mut self, body: &str) -> Self {
        self.form = parse_urlencoded(body);
        self
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Query-string parameters.
    pub fn query(&self) -> &HashMap<String, String> {
        &self.query
    }

    /// Form body parameters.
    pub fn form(&self) -> &HashMap<String, String> {
        &self.form
    }

    /// Path ready for matching.
    pub fn path(&self) -> String {
        decode_path(&self.uri)
    }
}

/// Strip the query string and percent-decode what is left.
pub fn decode_path(uri: &str) -> String {
    let raw = match uri.find('?') {
        Some(pos) => &uri[..pos],
        None => uri,
    };
    String::from_utf8_lossy(&urlencoding::decode_binary(raw.as_bytes())).into_owned()
}

fn parse_urlencoded(input: &str) -> HashMap<String, String> {
    url::form_urlencoded::parse(input.as_bytes())
        .into_owned()
        .collect()
}
