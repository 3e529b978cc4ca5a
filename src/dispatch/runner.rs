//! Application runner: everything a site registers before serving.
//!
//! # Responsibilities
//! - Own the route table, handler registry, access checks and services
//! - Hold default page/layout templates applied to each request
//! - Validate the route list eagerly against handlers and checks
//! - Hand each request to a one-shot [`Dispatch`]
//!
//! # Design Decisions
//! - Configured through `&mut self`, then shared read-only (`Arc<Runner>`)
//! - Not-found and method-not-allowed are application-replaceable responders

use std::sync::Arc;

use crate::config::{AppConfig, RunnerConfig};
use crate::dispatch::context::{HandlerContext, RequestContext, Services, TemplateState};
use crate::dispatch::dispatcher::Dispatch;
use crate::dispatch::handler::{Controller, ControllerRegistration, Handler, HandlerRegistry};
use crate::error::{DispatchError, DispatchResult};
use crate::http::{Request, Response};
use crate::render::{JinjaTemplates, Template};
use crate::routing::{HttpMethod, RouteSpec, RouteTable};
use crate::security::{Access, AccessCheck, AccessChecks, FnCheck};
use crate::session::Session;

/// Builds the response for a path no route matches.
pub type NotFoundResponder = Arc<dyn Fn(&RequestContext) -> Response + Send + Sync>;

/// Builds the response for a path matched only under other verbs.
pub type MethodNotAllowedResponder =
    Arc<dyn Fn(&RequestContext, &[HttpMethod]) -> Response + Send + Sync>;

pub struct Runner {
    pub(crate) routes: RouteTable,
    pub(crate) handlers: HandlerRegistry,
    pub(crate) checks: AccessChecks,
    pub(crate) services: Services,
    pub(crate) defaults: TemplateState,
    pub(crate) not_found: NotFoundResponder,
    pub(crate) method_not_allowed: Option<MethodNotAllowedResponder>,
}

impl Runner {
    pub fn new(templates: Arc<dyn Template>, config: Arc<AppConfig>) -> Self {
        Self {
            routes: RouteTable::new(),
            handlers: HandlerRegistry::new(),
            checks: AccessChecks::new(),
            services: Services::new(templates, config),
            defaults: TemplateState::default(),
            not_found: Arc::new(|_: &RequestContext| Response::text(404, "Page Not Found")),
            method_not_allowed: None,
        }
    }

    /// MiniJinja templates and default page/layout from the `[templates]` section.
    pub fn from_config(config: &RunnerConfig, app_config: AppConfig) -> Self {
        let templates = JinjaTemplates::new(&config.templates.dir, &config.templates.writable_dir)
            .with_caching(config.templates.cache);
        let mut runner = Self::new(Arc::new(templates), Arc::new(app_config));
        if let Some(page) = &config.templates.page {
            runner.set_page_template(page);
        }
        if let Some(layout) = &config.templates.layout {
            runner.set_layout_template(layout);
        }
        runner
    }

    /// Serve root callback `name` for `method`.
    pub fn handler<F>(&mut self, name: &str, method: HttpMethod, f: F) -> &mut Self
    where
        F: Fn(&mut HandlerContext<'_>, &[&str]) -> DispatchResult<String> + Send + Sync + 'static,
    {
        let handler: Handler = Arc::new(f);
        self.handlers.insert(name, method, handler);
        self
    }

    /// Register actions of controller `C` under `name`.
    pub fn controller<C: Controller>(&mut self, name: &str) -> ControllerRegistration<'_, C> {
        self.handlers.controller::<C>(name)
    }

    pub fn access_check(&mut self, name: &str, check: impl AccessCheck + 'static) -> &mut Self {
        self.checks.register(name, check);
        self
    }

    pub fn access_check_fn<F>(&mut self, name: &str, f: F) -> &mut Self
    where
        F: Fn(&mut HandlerContext<'_>, &[String]) -> DispatchResult<Access> + Send + Sync + 'static,
    {
        self.checks.register(name, FnCheck(f));
        self
    }

    /// Default page template for every request; empty clears it.
    pub fn set_page_template(&mut self, template: &str) -> &mut Self {
        self.defaults.page = Some(template.to_string()).filter(|t| !t.is_empty());
        self
    }

    /// Default layout template for every request; empty clears it.
    pub fn set_layout_template(&mut self, template: &str) -> &mut Self {
        self.defaults.layout = Some(template.to_string()).filter(|t| !t.is_empty());
        self
    }

    pub fn on_not_found<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&RequestContext) -> Response + Send + Sync + 'static,
    {
        self.not_found = Arc::new(f);
        self
    }

    /// Without one, method mismatches are answered by the not-found responder.
    pub fn on_method_not_allowed<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&RequestContext, &[HttpMethod]) -> Response + Send + Sync + 'static,
    {
        self.method_not_allowed = Some(Arc::new(f));
        self
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    pub fn services_mut(&mut self) -> &mut Services {
        &mut self.services
    }

    pub fn templates(&self) -> &dyn Template {
        self.services.templates()
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Register the complete route list. One call per runner.
    ///
    /// Every route must resolve to a registered handler for its verb and
    /// name only registered access checks; otherwise nothing is installed.
    pub fn register_routes<I, S>(&mut self, specs: I) -> DispatchResult<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<RouteSpec>,
    {
        if self.routes.is_registered() {
            return Err(DispatchError::AlreadyRegistered);
        }

        let mut table = RouteTable::new();
        table.register(specs)?;

        for route in table.routes() {
            self.handlers.resolve(&route.handler.callback, route.method)?;
            self.checks.validate(&route.handler.access_checks)?;
        }

        tracing::info!(
            routes = table.routes().len(),
            handlers = self.handlers.len(),
            "Routes registered"
        );
        self.routes = table;
        Ok(())
    }

    /// Dispatch one request.
    pub fn run(&self, request: Request, session: &mut dyn Session) -> DispatchResult<Response> {
        Dispatch::new(self, request, session).run()
    }
}
