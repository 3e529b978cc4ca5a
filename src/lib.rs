//! Page runner: a small request-dispatch core for server-rendered sites.
//!
//! An application registers handlers, controllers and named access checks
//! on a [`Runner`], hands it one route list, and then dispatches requests.
//! Each request is matched against the routes, passed through the route's
//! access checks, handed to its handler, and the handler's output is wrapped
//! in the page template and then the layout template.

// Core subsystems
pub mod config;
pub mod dispatch;
pub mod error;
pub mod http;
pub mod render;
pub mod routing;
pub mod session;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;
pub mod security;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::RunnerConfig;
pub use dispatch::{Controller, HandlerContext, Runner, Services};
pub use error::{DispatchError, DispatchResult};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::{HttpMethod, RouteSpec};
pub use security::Access;
