//! Route table and one-shot registration.
//!
//! # Responsibilities
//! - Expand each `RouteSpec` into one `Route` per listed verb
//! - Parse patterns, callbacks and access checks once, at registration
//! - Refuse a second registration on the same table
//! - Hand the complete route list to the matcher
//!
//! # Design Decisions
//! - Immutable after registration (shareable across requests without locks)
//! - Registration is all-or-nothing: a bad entry leaves the table untouched
//! - Same verb and same pattern twice is rejected

use std::collections::HashSet;

use crate::dispatch::Callback;
use crate::error::{DispatchError, DispatchResult};
use crate::routing::matcher::{MatchResult, PathMatcher};
use crate::routing::method::HttpMethod;
use crate::routing::pattern::PathPattern;
use crate::security::CheckChain;

/// Verb list used when a spec does not name one.
pub const DEFAULT_METHODS: &str = "get";

/// One entry of the registration list:
/// `(pattern, access_checks, callback, methods = "get")`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteSpec {
    pub pattern: String,
    pub access_checks: Option<String>,
    pub callback: String,
    /// Pipe-delimited verbs, e.g. `"get|post"`.
    pub methods: String,
}

impl RouteSpec {
    pub fn new(pattern: &str, access_checks: Option<&str>, callback: &str) -> Self {
        Self {
            pattern: pattern.to_string(),
            access_checks: access_checks.map(str::to_string),
            callback: callback.to_string(),
            methods: DEFAULT_METHODS.to_string(),
        }
    }

    /// Replace the verb list.
    pub fn methods(mut self, methods: &str) -> Self {
        self.methods = methods.to_string();
        self
    }
}

impl From<(&str, Option<&str>, &str)> for RouteSpec {
    fn from((pattern, checks, callback): (&str, Option<&str>, &str)) -> Self {
        RouteSpec::new(pattern, checks, callback)
    }
}

impl From<(&str, Option<&str>, &str, &str)> for RouteSpec {
    fn from((pattern, checks, callback, methods): (&str, Option<&str>, &str, &str)) -> Self {
        RouteSpec::new(pattern, checks, callback).methods(methods)
    }
}

/// What a matched route resolves to.
#[derive(Debug, Clone)]
pub struct HandlerDescriptor {
    pub callback: Callback,
    pub access_checks: CheckChain,
}

/// A registered route, immutable once built.
#[derive(Debug, Clone)]
pub struct Route {
    pub method: HttpMethod,
    pub pattern: PathPattern,
    pub handler: HandlerDescriptor,
}

/// Registered routes plus the matcher compiled from them.
#[derive(Debug, Default)]
pub struct RouteTable {
    registered: bool,
    matcher: PathMatcher,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the full route list.
    ///
    /// Fails with `AlreadyRegistered` on a second call.
    pub fn register<I, S>(&mut self, specs: I) -> DispatchResult<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<RouteSpec>,
    {
        if self.registered {
            return Err(DispatchError::AlreadyRegistered);
        }

        let routes = build_routes(specs)?;
        tracing::debug!(routes = routes.len(), "Route table compiled");

        self.matcher = PathMatcher::compile(routes);
        self.registered = true;
        Ok(())
    }

    pub fn is_registered(&self) -> bool {
        self.registered
    }

    pub fn is_empty(&self) -> bool {
        self.matcher.routes().is_empty()
    }

    pub fn routes(&self) -> &[Route] {
        self.matcher.routes()
    }

    /// Resolve a decoded, query-free path.
    pub fn match_route(&self, method: &str, path: &str) -> MatchResult<'_> {
        self.matcher.match_route(method, path)
    }
}

fn build_routes<I, S>(specs: I) -> DispatchResult<Vec<Route>>
where
    I: IntoIterator<Item = S>,
    S: Into<RouteSpec>,
{
    let mut routes = Vec::new();
    let mut seen = HashSet::new();

    for spec in specs {
        let spec = spec.into();
        let pattern = PathPattern::parse(&spec.pattern)?;
        let handler = HandlerDescriptor {
            callback: Callback::parse(&spec.callback),
            access_checks: CheckChain::parse(spec.access_checks.as_deref()),
        };

        for verb in spec.methods.split('|') {
            let method: HttpMethod = verb.parse()?;
            if !seen.insert((method, spec.pattern.clone())) {
                return Err(DispatchError::DuplicateRoute {
                    method,
                    pattern: spec.pattern.clone(),
                });
            }
            routes.push(Route {
                method,
                pattern: pattern.clone(),
                handler: handler.clone(),
            });
        }
    }

    Ok(routes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_methods_expand_to_one_route_each() {
        let mut table = RouteTable::new();
        table
            .register([RouteSpec::new("/save", None, "save").methods("get|post")])
            .unwrap();

        let methods: Vec<HttpMethod> = table.routes().iter().map(|r| r.method).collect();
        assert_eq!(methods, vec![HttpMethod::Get, HttpMethod::Post]);
        assert!(table.routes().iter().all(|r| r.pattern.as_str() == "/save"));
    }

    #[test]
    fn test_default_method_is_get() {
        let mut table = RouteTable::new();
        table.register([("/", None, "home")]).unwrap();
        assert_eq!(table.routes().len(), 1);
        assert_eq!(table.routes()[0].method, HttpMethod::Get);
    }

    #[test]
    fn test_uppercases_verbs() {
        let mut table = RouteTable::new();
        table.register([("/x", None, "x", "PoSt")]).unwrap();
        assert_eq!(table.routes()[0].method, HttpMethod::Post);
    }

    #[test]
    fn test_descriptor_carries_checks() {
        let mut table = RouteTable::new();
        table
            .register([("/admin", Some("loginRequired:1|admin"), "Admin::index")])
            .unwrap();
        let handler = &table.routes()[0].handler;
        assert_eq!(handler.access_checks.len(), 2);
        assert_eq!(
            handler.callback,
            Callback::Controller {
                controller: "Admin".into(),
                action: "index".into()
            }
        );
    }

    #[test]
    fn test_second_registration_fails() {
        let mut table = RouteTable::new();
        table.register([("/", None, "home")]).unwrap();
        let err = table.register([("/other", None, "other")]).unwrap_err();
        assert!(matches!(err, DispatchError::AlreadyRegistered));
        assert_eq!(table.routes().len(), 1);
    }

    #[test]
    fn test_failed_registration_leaves_table_open() {
        let mut table = RouteTable::new();
        let err = table
            .register([("/", None, "home"), ("/bad[", None, "bad")])
            .unwrap_err();
        assert!(matches!(err, DispatchError::InvalidPattern { .. }));
        assert!(table.is_empty());
        table.register([("/", None, "home")]).unwrap();
    }

    #[test]
    fn test_rejects_unknown_method() {
        let mut table = RouteTable::new();
        let err = table.register([("/", None, "home", "get|fetch")]).unwrap_err();
        assert!(matches!(err, DispatchError::InvalidMethod(_)));
    }

    #[test]
    fn test_rejects_duplicate_route() {
        let mut table = RouteTable::new();
        let err = table
            .register([("/a", None, "a", "get"), ("/a", None, "b", "post|get")])
            .unwrap_err();
        assert!(matches!(
            err,
            DispatchError::DuplicateRoute { method: HttpMethod::Get, .. }
        ));
    }
}
