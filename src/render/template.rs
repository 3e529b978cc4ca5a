//! Template collaborator contract.

use std::path::Path;

use serde_json::{Map, Value};
use thiserror::Error;

/// Variables passed to a template.
pub type TemplateVars = Map<String, Value>;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("template `{0}` not found")]
    NotFound(String),

    #[error("failed to render template `{template}`: {reason}")]
    Render { template: String, reason: String },

    #[error("template cache I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A template engine the renderer can delegate to.
///
/// Implementations use interior mutability for `persist_var` and
/// `set_template_dir`; the engine is shared by every request.
pub trait Template: Send + Sync {
    /// Render `template` with `vars`. A non-empty `cache_id` may be used to
    /// reuse previously rendered output.
    fn render(&self, template: &str, vars: &TemplateVars, cache_id: &str)
        -> Result<String, TemplateError>;

    fn exists(&self, template: &str) -> bool;

    /// Make `name` available to every later render.
    fn persist_var(&self, name: &str, value: Value);

    fn set_template_dir(&self, dir: &Path);
}

/// `{content: ...}`, the variables used for page and layout wrapping.
pub fn content_vars(content: &str) -> TemplateVars {
    let mut vars = TemplateVars::new();
    vars.insert("content".to_string(), Value::String(content.to_string()));
    vars
}
