//! Response sink filled during a dispatch.
//!
//! # Responsibilities
//! - Hold status, headers and body until the transport writes them
//! - Restrict status codes to the known table
//! - Build redirects (`Location` plus 3xx status)

use crate::http::status;

/// Response being assembled for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: u16,
    headers: Vec<(String, String)>,
    body: String,
}

impl Default for Response {
    fn default() -> Self {
        Self {
            status: 200,
            headers: Vec::new(),
            body: String::new(),
        }
    }
}

impl Response {
    pub fn new() -> Self {
        Self::default()
    }

    /// Plain-text response with the given status.
    pub fn text(code: u16, body: impl Into<String>) -> Self {
        let mut response = Self::new();
        response.set_status_code(code);
        response.set_header("Content-Type", "text/plain; charset=utf-8");
        response.body = body.into();
        response
    }

    /// Set the status; returns `false` and leaves it unchanged for unknown codes.
    pub fn set_status_code(&mut self, code: u16) -> bool {
        if status::reason_phrase(code).is_none() {
            tracing::warn!(code, "Ignoring unknown status code");
            return false;
        }
        self.status = code;
        true
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    /// Set a header, replacing any previous value (names compare case-insensitively).
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self
            .headers
            .iter_mut()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
        {
            Some(slot) => slot.1 = value,
            None => self.headers.push((name.to_string(), value)),
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Point the client elsewhere.
    pub fn redirect(&mut self, location: &str, code: u16) {
        self.set_status_code(code);
        self.set_header("Location", location);
    }

    /// Append to the body.
    pub fn write(&mut self, content: &str) {
        self.body.push_str(content);
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn into_parts(self) -> (u16, Vec<(String, String)>, String) {
        (self.status, self.headers, self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_status_is_ignored() {
        let mut response = Response::new();
        assert!(!response.set_status_code(299));
        assert_eq!(response.status(), 200);
        assert!(response.set_status_code(418));
        assert_eq!(response.status(), 418);
    }

    #[test]
    fn test_redirect_sets_location() {
        let mut response = Response::new();
        response.redirect("/login", 302);
        assert_eq!(response.status(), 302);
        assert_eq!(response.header("location"), Some("/login"));
    }

    #[test]
    fn test_set_header_replaces() {
        let mut response = Response::new();
        response.set_header("Content-Type", "text/html");
        response.set_header("content-type", "application/json");
        assert_eq!(response.headers().len(), 1);
        assert_eq!(response.header("Content-Type"), Some("application/json"));
    }
}
