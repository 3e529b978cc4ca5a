//! Access-check registry and evaluation.
//!
//! # Responsibilities
//! - Hold the application's named checks
//! - Evaluate a route's chain in declaration order, stopping at the first denial
//!
//! # Design Decisions
//! - A check may set a status or redirect on the response before denying;
//!   the dispatcher keeps whatever the check wrote
//! - Checks are sync and shared across requests, so they must be `Send + Sync`

use std::collections::HashMap;
use std::sync::Arc;

use crate::dispatch::HandlerContext;
use crate::error::{DispatchError, DispatchResult};
use crate::security::chain::CheckChain;

/// Verdict of a single check or of a whole chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allow,
    Deny,
}

/// A named predicate evaluated before the handler.
pub trait AccessCheck: Send + Sync {
    fn evaluate(&self, ctx: &mut HandlerContext<'_>, params: &[String]) -> DispatchResult<Access>;
}

/// Adapts a closure into an [`AccessCheck`].
pub struct FnCheck<F>(pub F);

impl<F> AccessCheck for FnCheck<F>
where
    F: Fn(&mut HandlerContext<'_>, &[String]) -> DispatchResult<Access> + Send + Sync,
{
    fn evaluate(&self, ctx: &mut HandlerContext<'_>, params: &[String]) -> DispatchResult<Access> {
        (self.0)(ctx, params)
    }
}

/// Checks registered by name.
#[derive(Default, Clone)]
pub struct AccessChecks {
    checks: HashMap<String, Arc<dyn AccessCheck>>,
}

impl AccessChecks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the check called `name`.
    pub fn register(&mut self, name: &str, check: impl AccessCheck + 'static) {
        self.checks.insert(name.to_string(), Arc::new(check));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.checks.contains_key(name)
    }

    /// Every check in `chain` must be registered.
    pub fn validate(&self, chain: &CheckChain) -> DispatchResult<()> {
        match chain.names().find(|name| !self.contains(name)) {
            Some(name) => Err(DispatchError::UnknownAccessCheck(name.to_string())),
            None => Ok(()),
        }
    }

    /// Evaluate `chain` in order. An empty chain allows.
    pub fn run(&self, chain: &CheckChain, ctx: &mut HandlerContext<'_>) -> DispatchResult<Access> {
        for spec in chain.iter() {
            let check = self
                .checks
                .get(&spec.name)
                .ok_or_else(|| DispatchError::UnknownAccessCheck(spec.name.clone()))?;

            if check.evaluate(ctx, &spec.params)? == Access::Deny {
                tracing::debug!(check = %spec, path = ctx.request().path(), "Access denied");
                return Ok(Access::Deny);
            }
            tracing::trace!(check = %spec, "Access check passed");
        }
        Ok(Access::Allow)
    }
}
