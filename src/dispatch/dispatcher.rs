//! One request through the pipeline.
//!
//! # Data Flow
//! ```text
//! Request
//!     → match route (method, decoded path)
//!     → NotFound / MethodNotAllowed → responder
//!     → Found → access checks (first denial stops)
//!            → handler(route params in pattern order)
//!            → renderer (page, then layout)
//!     → Response
//! ```
//!
//! # Design Decisions
//! - `run` consumes the dispatch, so a dispatch runs at most once
//! - Denial without a status set by the check becomes 403
//! - A body written by a denying check is kept as is

use std::time::Instant;

use crate::dispatch::context::{HandlerContext, RequestContext};
use crate::dispatch::handler::invoke;
use crate::dispatch::runner::Runner;
use crate::error::{DispatchError, DispatchResult};
use crate::http::{status_text, Request, Response};
use crate::observability::metrics;
use crate::render::Renderer;
use crate::routing::MatchResult;
use crate::security::Access;
use crate::session::Session;

/// A single, not yet started dispatch.
pub struct Dispatch<'r, 's> {
    runner: &'r Runner,
    request: Request,
    session: &'s mut dyn Session,
}

impl<'r, 's> Dispatch<'r, 's> {
    pub fn new(runner: &'r Runner, request: Request, session: &'s mut dyn Session) -> Self {
        Self {
            runner,
            request,
            session,
        }
    }

    pub fn run(self) -> DispatchResult<Response> {
        let started = Instant::now();
        let Self {
            runner,
            request,
            session,
        } = self;

        if runner.routes.is_empty() {
            return Err(DispatchError::NoRoutesRegistered);
        }

        let method = request.method().to_string();
        let path = request.path();
        let mut request_ctx = RequestContext::new(request, path);
        let result = runner.routes.match_route(&method, request_ctx.path());
        tracing::debug!(
            method = %method,
            path = request_ctx.path(),
            outcome = result.outcome(),
            "Route resolved"
        );

        let (outcome, response) = match result {
            MatchResult::Found { route, params } => {
                request_ctx.set_params(params);
                let mut response = Response::new();
                let mut ctx = HandlerContext::new(
                    &request_ctx,
                    session,
                    &mut response,
                    &runner.services,
                    runner.defaults.clone(),
                );

                match runner.checks.run(&route.handler.access_checks, &mut ctx)? {
                    Access::Deny => {
                        drop(ctx);
                        if response.status() == 200 {
                            response.set_status_code(403);
                            if response.body().is_empty() {
                                response.write(&status_text(403).unwrap_or_default());
                            }
                        }
                        ("denied", response)
                    }
                    Access::Allow => {
                        let args = request_ctx.params().values();
                        let rendered = invoke(
                            &runner.handlers,
                            &route.handler.callback,
                            route.method,
                            &args,
                            ctx,
                        )?;
                        Renderer::new(runner.services.templates()).render(rendered, &mut response)?;
                        ("ok", response)
                    }
                }
            }
            MatchResult::NotFound => ("not_found", (runner.not_found)(&request_ctx)),
            MatchResult::MethodNotAllowed { allowed } => {
                let response = match &runner.method_not_allowed {
                    Some(responder) => responder(&request_ctx, &allowed),
                    None => (runner.not_found)(&request_ctx),
                };
                ("method_not_allowed", response)
            }
        };

        let elapsed = started.elapsed();
        metrics::record_dispatch(&method, outcome, elapsed);
        tracing::info!(
            method = %method,
            path = request_ctx.path(),
            status = response.status(),
            outcome,
            elapsed_ms = elapsed.as_millis() as u64,
            "Request dispatched"
        );
        Ok(response)
    }
}
