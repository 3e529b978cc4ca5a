//! Fixtures shared by unit tests.

use std::path::Path;
use std::sync::Arc;

use serde_json::Value;

use crate::config::AppConfig;
use crate::dispatch::{HandlerContext, RequestContext, Services, TemplateState};
use crate::http::{Request, Response};
use crate::render::{Template, TemplateError, TemplateVars};
use crate::session::SessionData;

/// Template engine that knows no templates.
pub(crate) struct NullTemplates;

impl Template for NullTemplates {
    fn render(&self, template: &str, _: &TemplateVars, _: &str) -> Result<String, TemplateError> {
        Err(TemplateError::NotFound(template.to_string()))
    }
    fn exists(&self, _: &str) -> bool {
        false
    }
    fn persist_var(&self, _: &str, _: Value) {}
    fn set_template_dir(&self, _: &Path) {}
}

/// Owns everything a `HandlerContext` borrows.
pub(crate) struct Fixture {
    pub request: RequestContext,
    pub session: SessionData,
    pub response: Response,
    pub services: Services,
}

impl Fixture {
    pub fn new(method: &str, uri: &str) -> Self {
        let request = Request::new(method, uri);
        let path = request.path();
        Self {
            request: RequestContext::new(request, path),
            session: SessionData::default(),
            response: Response::new(),
            services: Services::new(Arc::new(NullTemplates), Arc::new(AppConfig::default())),
        }
    }

    pub fn ctx(&mut self) -> HandlerContext<'_> {
        HandlerContext::new(
            &self.request,
            &mut self.session,
            &mut self.response,
            &self.services,
            TemplateState::default(),
        )
    }
}
