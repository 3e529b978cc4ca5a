//! Error types shared by the dispatch pipeline.
//!
//! # Design Decisions
//! - Programming and configuration faults are `Err` values that abort the request
//! - Not-found, method-not-allowed and access denial are responses, not errors
//! - Collaborator errors (templates) convert via `#[from]`

use thiserror::Error;

use crate::render::TemplateError;
use crate::routing::HttpMethod;

/// Failure of route registration or of a single dispatch.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// `register_routes` was called a second time on the same runner.
    #[error("routes have already been registered")]
    AlreadyRegistered,

    /// A request was dispatched before any route was registered.
    #[error("no routes registered")]
    NoRoutesRegistered,

    /// A route names an access check that was never registered.
    #[error("unknown access check `{0}`")]
    UnknownAccessCheck(String),

    /// A route resolves to a callback with no handler for its method.
    #[error("no handler `{handler}` for {method} (callback `{callback}`)")]
    HandlerNotFound {
        callback: String,
        handler: String,
        method: HttpMethod,
    },

    /// A route pattern could not be compiled.
    #[error("invalid route pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// A route spec lists a verb outside the supported set.
    #[error("unsupported HTTP method `{0}`")]
    InvalidMethod(String),

    /// The same method and pattern were registered twice.
    #[error("route {method} {pattern} is already registered")]
    DuplicateRoute { method: HttpMethod, pattern: String },

    #[error(transparent)]
    Template(#[from] TemplateError),

    /// A handler or access check failed on its own terms.
    #[error("handler failed: {0}")]
    Handler(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl DispatchError {
    /// Wrap an application error raised inside a handler.
    pub fn handler<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::Handler(err.into())
    }
}

pub type DispatchResult<T> = Result<T, DispatchError>;
