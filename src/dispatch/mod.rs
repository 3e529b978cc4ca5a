//! Request dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! runner.rs (routes, handlers, checks, services, defaults)
//!     → dispatcher.rs (one request: match, check, invoke, render)
//!     → context.rs (per-request state handed to checks and handlers)
//!     → handler.rs (callback → handler, controller construction)
//! ```

pub mod context;
pub mod dispatcher;
pub mod handler;
pub mod runner;

pub use context::{HandlerContext, RequestContext, Services, TemplateState};
pub use dispatcher::Dispatch;
pub use handler::{invoke, Callback, Controller, ControllerRegistration, Handler, HandlerRegistry};
pub use runner::{MethodNotAllowedResponder, NotFoundResponder, Runner};
