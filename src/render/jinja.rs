//! MiniJinja-backed template collaborator.
//!
//! # Responsibilities
//! - Load templates by name from a directory on disk
//! - Keep persisted variables as environment globals
//! - Optionally cache rendered output under the writable folder, keyed by cache id
//!
//! # Design Decisions
//! - Output is not auto-escaped; wrapped content is already markup
//! - Changing the template directory drops every loaded template
//! - Cache file names hex-encode the template and cache id

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use minijinja::{path_loader, AutoEscape, Environment, ErrorKind};
use serde_json::Value;

use crate::render::template::{Template, TemplateError, TemplateVars};

/// Template engine over a MiniJinja environment.
pub struct JinjaTemplates {
    env: RwLock<Environment<'static>>,
    cache_dir: PathBuf,
    caching: bool,
}

impl JinjaTemplates {
    /// `template_dir` holds the sources; `writable_dir` receives cached output.
    pub fn new(template_dir: &Path, writable_dir: &Path) -> Self {
        Self {
            env: RwLock::new(build_env(template_dir)),
            cache_dir: writable_dir.join("template_cache"),
            caching: false,
        }
    }

    /// Turn the rendered-output cache on or off.
    pub fn with_caching(mut self, caching: bool) -> Self {
        self.caching = caching;
        self
    }

    fn cache_path(&self, template: &str, cache_id: &str) -> PathBuf {
        self.cache_dir
            .join(format!("{}.{}.html", hex::encode(template), hex::encode(cache_id)))
    }

    fn render_uncached(&self, template: &str, vars: &TemplateVars) -> Result<String, TemplateError> {
        let env = self.env.read().unwrap_or_else(PoisonError::into_inner);
        let tmpl = env.get_template(template).map_err(|e| {
            if e.kind() == ErrorKind::TemplateNotFound {
                TemplateError::NotFound(template.to_string())
            } else {
                render_error(template, &e)
            }
        })?;
        tmpl.render(vars).map_err(|e| render_error(template, &e))
    }
}

impl Template for JinjaTemplates {
    fn render(
        &self,
        template: &str,
        vars: &TemplateVars,
        cache_id: &str,
    ) -> Result<String, TemplateError> {
        if !self.caching || cache_id.is_empty() {
            return self.render_uncached(template, vars);
        }

        let path = self.cache_path(template, cache_id);
        if let Ok(cached) = fs::read_to_string(&path) {
            tracing::trace!(template, cache_id, "Template cache hit");
            return Ok(cached);
        }

        let output = self.render_uncached(template, vars)?;
        fs::create_dir_all(&self.cache_dir)?;
        fs::write(&path, &output)?;
        Ok(output)
    }

    fn exists(&self, template: &str) -> bool {
        let env = self.env.read().unwrap_or_else(PoisonError::into_inner);
        env.get_template(template).is_ok()
    }

    fn persist_var(&self, name: &str, value: Value) {
        let mut env = self.env.write().unwrap_or_else(PoisonError::into_inner);
        env.add_global(name.to_string(), minijinja::Value::from_serialize(&value));
    }

    fn set_template_dir(&self, dir: &Path) {
        let mut env = self.env.write().unwrap_or_else(PoisonError::into_inner);
        env.clear_templates();
        env.set_loader(path_loader(dir));
        tracing::debug!(dir = %dir.display(), "Template directory changed");
    }
}

fn build_env(template_dir: &Path) -> Environment<'static> {
    let mut env = Environment::new();
    env.set_loader(path_loader(template_dir));
    env.set_auto_escape_callback(|_| AutoEscape::None);
    env
}

fn render_error(template: &str, err: &minijinja::Error) -> TemplateError {
    TemplateError::Render {
        template: template.to_string(),
        reason: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::template::content_vars;
    use serde_json::json;

    fn engine(dir: &Path) -> JinjaTemplates {
        fs::write(dir.join("page.html"), "<main>{{ content }}</main>").unwrap();
        fs::write(dir.join("hello.html"), "Hello {{ site }}").unwrap();
        JinjaTemplates::new(dir, dir)
    }

    #[test]
    fn test_render_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        let templates = engine(dir.path());
        let out = templates
            .render("page.html", &content_vars("<p>x</p>"), "")
            .unwrap();
        assert_eq!(out, "<main><p>x</p></main>");
    }

    #[test]
    fn test_exists() {
        let dir = tempfile::tempdir().unwrap();
        let templates = engine(dir.path());
        assert!(templates.exists("page.html"));
        assert!(!templates.exists("missing.html"));
    }

    #[test]
    fn test_missing_template_error() {
        let dir = tempfile::tempdir().unwrap();
        let templates = engine(dir.path());
        let err = templates
            .render("missing.html", &TemplateVars::new(), "")
            .unwrap_err();
        assert!(matches!(err, TemplateError::NotFound(name) if name == "missing.html"));
    }

    #[test]
    fn test_persisted_var_is_global() {
        let dir = tempfile::tempdir().unwrap();
        let templates = engine(dir.path());
        templates.persist_var("site", json!("Clipart"));
        let out = templates.render("hello.html", &TemplateVars::new(), "").unwrap();
        assert_eq!(out, "Hello Clipart");
    }

    #[test]
    fn test_cache_id_reuses_output() {
        let dir = tempfile::tempdir().unwrap();
        let templates = engine(dir.path()).with_caching(true);

        let first = templates.render("page.html", &content_vars("one"), "home").unwrap();
        let second = templates.render("page.html", &content_vars("two"), "home").unwrap();
        let uncached = templates.render("page.html", &content_vars("two"), "").unwrap();

        assert_eq!(first, "<main>one</main>");
        assert_eq!(second, "<main>one</main>");
        assert_eq!(uncached, "<main>two</main>");
    }

    #[test]
    fn test_similar_cache_ids_do_not_collide() {
        let dir = tempfile::tempdir().unwrap();
        let templates = engine(dir.path()).with_caching(true);

        let slashed = templates.render("page.html", &content_vars("slash"), "a/b").unwrap();
        let underscored = templates.render("page.html", &content_vars("under"), "a_b").unwrap();

        assert_eq!(slashed, "<main>slash</main>");
        assert_eq!(underscored, "<main>under</main>");
        assert_ne!(
            templates.cache_path("page.html", "a/b"),
            templates.cache_path("page.html", "a_b")
        );
    }

    #[test]
    fn test_set_template_dir_switches_sources() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        let templates = engine(first.path());
        fs::write(second.path().join("page.html"), "[{{ content }}]").unwrap();

        templates.set_template_dir(second.path());
        let out = templates.render("page.html", &content_vars("x"), "").unwrap();
        assert_eq!(out, "[x]");
    }
}
