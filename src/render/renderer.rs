//! Page-inside-layout composition.
//!
//! # Responsibilities
//! - Wrap handler output in the page template, then in the layout template
//! - Pass content through untouched when neither is set (raw/ajax mode)
//! - Emit the result into the response body

use crate::error::DispatchResult;
use crate::http::Response;
use crate::render::template::{content_vars, Template};

/// Output of one handler invocation, consumed once by the renderer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderContext {
    pub content: String,
    pub page_template: Option<String>,
    pub layout_template: Option<String>,
}

/// Composes content with the template collaborator.
pub struct Renderer<'a> {
    templates: &'a dyn Template,
}

impl<'a> Renderer<'a> {
    pub fn new(templates: &'a dyn Template) -> Self {
        Self { templates }
    }

    /// `Layout(Page(content))`; empty template ids count as unset.
    pub fn compose(&self, ctx: RenderContext) -> DispatchResult<String> {
        let mut content = ctx.content;

        if let Some(page) = non_empty(ctx.page_template.as_deref()) {
            content = self.templates.render(page, &content_vars(&content), "")?;
        }
        if let Some(layout) = non_empty(ctx.layout_template.as_deref()) {
            content = self.templates.render(layout, &content_vars(&content), "")?;
        }

        Ok(content)
    }

    /// Compose and write into the response.
    pub fn render(&self, ctx: RenderContext, response: &mut Response) -> DispatchResult<()> {
        let wrapped = ctx.page_template.is_some() || ctx.layout_template.is_some();
        let output = self.compose(ctx)?;
        if wrapped && response.header("Content-Type").is_none() {
            response.set_header("Content-Type", "text/html; charset=utf-8");
        }
        tracing::trace!(bytes = output.len(), wrapped, "Render done");
        response.write(&output);
        Ok(())
    }
}

fn non_empty(id: Option<&str>) -> Option<&str> {
    id.filter(|id| !id.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::template::{TemplateError, TemplateVars};
    use serde_json::Value;
    use std::path::Path;

    /// Renders `id(content)` so composition order is visible.
    struct Bracket;

    impl Template for Bracket {
        fn render(&self, id: &str, vars: &TemplateVars, _: &str) -> Result<String, TemplateError> {
            let content = vars.get("content").and_then(Value::as_str).unwrap_or_default();
            Ok(format!("{id}({content})"))
        }
        fn exists(&self, _: &str) -> bool {
            true
        }
        fn persist_var(&self, _: &str, _: Value) {}
        fn set_template_dir(&self, _: &Path) {}
    }

    fn ctx(page: Option<&str>, layout: Option<&str>) -> RenderContext {
        RenderContext {
            content: "X".into(),
            page_template: page.map(str::to_string),
            layout_template: layout.map(str::to_string),
        }
    }

    #[test]
    fn test_layout_wraps_page() {
        let out = Renderer::new(&Bracket).compose(ctx(Some("P"), Some("L"))).unwrap();
        assert_eq!(out, "L(P(X))");
    }

    #[test]
    fn test_passthrough_without_templates() {
        let mut response = Response::new();
        Renderer::new(&Bracket)
            .render(ctx(None, None), &mut response)
            .unwrap();
        assert_eq!(response.body(), "X");
        assert_eq!(response.header("Content-Type"), None);
    }

    #[test]
    fn test_single_level() {
        let renderer = Renderer::new(&Bracket);
        assert_eq!(renderer.compose(ctx(Some("P"), None)).unwrap(), "P(X)");
        assert_eq!(renderer.compose(ctx(None, Some("L"))).unwrap(), "L(X)");
    }

    #[test]
    fn test_empty_ids_are_unset() {
        let out = Renderer::new(&Bracket).compose(ctx(Some(""), Some(""))).unwrap();
        assert_eq!(out, "X");
    }
}
