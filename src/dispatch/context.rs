//! Per-request state passed through access checks and handlers.
//!
//! # Responsibilities
//! - `RequestContext`: verb, decoded path, route params, query and form values
//! - `HandlerContext`: request plus the capabilities a handler may use
//!   (session, response, shared services, page/layout template state)
//! - `Services`: objects shared with every handler and controller
//!
//! # Design Decisions
//! - Lives for exactly one dispatch; nothing here is global
//! - Template state starts from the runner defaults and is captured
//!   after the handler returns

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::config::AppConfig;
use crate::http::{Request, Response};
use crate::render::{RenderContext, Template};
use crate::routing::RouteParams;
use crate::session::Session;

/// Shared objects handed to handlers and controller constructors.
pub struct Services {
    templates: Arc<dyn Template>,
    config: Arc<AppConfig>,
    objects: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl Services {
    pub fn new(templates: Arc<dyn Template>, config: Arc<AppConfig>) -> Self {
        Self {
            templates,
            config,
            objects: HashMap::new(),
        }
    }

    pub fn templates(&self) -> &dyn Template {
        self.templates.as_ref()
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Share an application object; one instance per type.
    pub fn insert<T: Send + Sync + 'static>(&mut self, object: T) {
        self.objects.insert(TypeId::of::<T>(), Arc::new(object));
    }

    pub fn get<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.objects
            .get(&TypeId::of::<T>())
            .and_then(|object| Arc::clone(object).downcast::<T>().ok())
    }
}

/// Page and layout template ids in effect.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateState {
    pub page: Option<String>,
    pub layout: Option<String>,
}

/// What the dispatcher knows about the current request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    request: Request,
    path: String,
    params: RouteParams,
}

impl RequestContext {
    pub fn new(request: Request, path: String) -> Self {
        Self {
            request,
            path,
            params: RouteParams::default(),
        }
    }

    /// Verb as received.
    pub fn method(&self) -> &str {
        self.request.method()
    }

    /// Decoded path without query string.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn params(&self) -> &RouteParams {
        &self.params
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    pub(crate) fn set_params(&mut self, params: RouteParams) {
        self.params = params;
    }
}

/// Capabilities available to access checks and handlers for one request.
pub struct HandlerContext<'a> {
    request: &'a RequestContext,
    session: &'a mut dyn Session,
    response: &'a mut Response,
    services: &'a Services,
    templates: TemplateState,
}

impl<'a> HandlerContext<'a> {
    pub fn new(
        request: &'a RequestContext,
        session: &'a mut dyn Session,
        response: &'a mut Response,
        services: &'a Services,
        templates: TemplateState,
    ) -> Self {
        Self {
            request,
            session,
            response,
            services,
            templates,
        }
    }

    pub fn request(&self) -> &RequestContext {
        self.request
    }

    /// Active route parameters.
    pub fn route_params(&self) -> &RouteParams {
        self.request.params()
    }

    pub fn services(&self) -> &'a Services {
        self.services
    }

    /// Query-string value, or `default`.
    pub fn get_value(&self, name: &str, default: &str) -> String {
        self.request
            .request()
            .query()
            .get(name)
            .cloned()
            .unwrap_or_else(|| default.to_string())
    }

    /// Form body value, or `default`.
    pub fn post_value(&self, name: &str, default: &str) -> String {
        self.request
            .request()
            .form()
            .get(name)
            .cloned()
            .unwrap_or_else(|| default.to_string())
    }

    pub fn session_value(&self, name: &str, default: Value) -> Value {
        self.session.get(name, default)
    }

    pub fn set_session_value(&mut self, name: &str, value: Value) {
        self.session.set(name, value);
    }

    pub fn unset_session_value(&mut self, name: &str) {
        self.session.unset(name);
    }

    pub fn response(&self) -> &Response {
        self.response
    }

    pub fn response_mut(&mut self) -> &mut Response {
        self.response
    }

    /// Returns `false` if the code is not in the status table.
    pub fn set_status_code(&mut self, code: u16) -> bool {
        self.response.set_status_code(code)
    }

    /// 302 redirect.
    pub fn redirect(&mut self, location: &str) {
        self.redirect_with(location, 302);
    }

    pub fn redirect_with(&mut self, location: &str, code: u16) {
        tracing::debug!(location, code, "Redirecting");
        self.response.redirect(location, code);
    }

    pub fn set_page_template(&mut self, template: &str) {
        self.templates.page = Some(template.to_string());
    }

    pub fn set_layout_template(&mut self, template: &str) {
        self.templates.layout = Some(template.to_string());
    }

    /// Raw output: no page, no layout.
    pub fn set_ajax_response(&mut self) {
        self.templates = TemplateState::default();
    }

    pub fn template_state(&self) -> &TemplateState {
        &self.templates
    }

    /// Package handler output with the template ids in effect right now.
    pub fn into_render_context(self, content: String) -> RenderContext {
        RenderContext {
            content,
            page_template: self.templates.page,
            layout_template: self.templates.layout,
        }
    }
}
