//! Route matching logic.
//!
//! # Responsibilities
//! - Match a method and a decoded path against every registered route
//! - Extract parameters in pattern declaration order
//! - Tell a path mismatch apart from a method mismatch
//!
//! # Design Decisions
//! - First registered, first matched
//! - A path that matches some route under another verb is `MethodNotAllowed`
//! - `HEAD` falls back to the `GET` route when no `HEAD` route matches
//! - Values stay strings; constraints only gate matching

use crate::routing::method::HttpMethod;
use crate::routing::router::{HandlerDescriptor, Route};

/// Parameters captured from the path, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteParams(Vec<(String, String)>);

impl RouteParams {
    pub fn new(pairs: Vec<(String, String)>) -> Self {
        Self(pairs)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Values only, for positional handler arguments.
    pub fn values(&self) -> Vec<&str> {
        self.0.iter().map(|(_, v)| v.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Outcome of resolving one request.
#[derive(Debug)]
pub enum MatchResult<'a> {
    Found {
        route: &'a Route,
        params: RouteParams,
    },
    NotFound,
    /// The path matched, but only under the listed verbs.
    MethodNotAllowed { allowed: Vec<HttpMethod> },
}

impl MatchResult<'_> {
    /// Short label for logs and metrics.
    pub fn outcome(&self) -> &'static str {
        match self {
            MatchResult::Found { .. } => "found",
            MatchResult::NotFound => "not_found",
            MatchResult::MethodNotAllowed { .. } => "method_not_allowed",
        }
    }

    pub fn handler(&self) -> Option<&HandlerDescriptor> {
        match self {
            MatchResult::Found { route, .. } => Some(&route.handler),
            _ => None,
        }
    }
}

/// Matcher compiled from the complete route list.
#[derive(Debug, Default)]
pub struct PathMatcher {
    routes: Vec<Route>,
}

impl PathMatcher {
    /// Compile from the full list; there is no incremental insert.
    pub fn compile(routes: Vec<Route>) -> Self {
        Self { routes }
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Resolve `method` (any case) and `path`.
    pub fn match_route(&self, method: &str, path: &str) -> MatchResult<'_> {
        let method = method.parse::<HttpMethod>().ok();
        let mut allowed = Vec::new();

        for route in &self.routes {
            let Some(captures) = route.pattern.captures(path) else {
                continue;
            };
            if Some(route.method) == method {
                return MatchResult::Found {
                    route,
                    params: RouteParams::new(captures),
                };
            }
            if !allowed.contains(&route.method) {
                allowed.push(route.method);
            }
        }

        if method == Some(HttpMethod::Head) && allowed.contains(&HttpMethod::Get) {
            return self.match_route(HttpMethod::Get.as_str(), path);
        }

        if allowed.is_empty() {
            MatchResult::NotFound
        } else {
            MatchResult::MethodNotAllowed { allowed }
        }
    }
}
