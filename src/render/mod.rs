//! Rendering subsystem.
//!
//! # Data Flow
//! ```text
//! RenderContext { content, page, layout }
//!     → renderer.rs (page wraps content, layout wraps page)
//!     → template.rs (collaborator contract)
//!     → jinja.rs (MiniJinja engine over a template directory)
//!     → Response body
//! ```

pub mod jinja;
pub mod renderer;
pub mod template;

pub use jinja::JinjaTemplates;
pub use renderer::{RenderContext, Renderer};
pub use template::{content_vars, Template, TemplateError, TemplateVars};
