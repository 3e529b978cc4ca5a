//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Registration (at startup, once):
//!     RouteSpec[]  (pattern, access checks, callback, "get|post")
//!     → router.rs (one Route per verb, checks and callback parsed)
//!     → pattern.rs (compile each pattern to anchored regexes)
//!     → matcher.rs (frozen, immutable PathMatcher)
//!
//! Incoming Request (method, decoded path):
//!     → matcher.rs (scan in registration order)
//!     → Found { route, params } | NotFound | MethodNotAllowed
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Deterministic: same input always matches same route

pub mod matcher;
pub mod method;
pub mod pattern;
pub mod router;

pub use matcher::{MatchResult, PathMatcher, RouteParams};
pub use method::HttpMethod;
pub use pattern::PathPattern;
pub use router::{HandlerDescriptor, Route, RouteSpec, RouteTable};
