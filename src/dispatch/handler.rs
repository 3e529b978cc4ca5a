//! Callback resolution and handler invocation.
//!
//! # Responsibilities
//! - Classify a route's callback string as a root handler or `Controller::action`
//! - Map (callback, method) to a registered handler
//! - Build a fresh controller per invocation and run its `init` hook
//! - Capture handler output together with the template state it left
//!
//! # Design Decisions
//! - Handlers are registered explicitly; a name like `show_get` is only
//!   used for error messages
//! - The handler for a route is looked up with the route's method, so a
//!   HEAD request served by a GET route runs the GET handler

use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::dispatch::context::{HandlerContext, Services};
use crate::error::{DispatchError, DispatchResult};
use crate::render::RenderContext;
use crate::routing::HttpMethod;

/// A callable route target.
pub type Handler = Arc<dyn Fn(&mut HandlerContext<'_>, &[&str]) -> DispatchResult<String> + Send + Sync>;

/// Route target named in a route declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Callback {
    /// Free-standing handler, e.g. `home`.
    Root(String),
    /// Method on a controller, e.g. `Clipart::search`.
    Controller { controller: String, action: String },
}

impl Callback {
    /// `Name::action` where `Name` starts uppercase and both parts have at
    /// least two word characters; anything else is a root callback.
    pub fn parse(callback: &str) -> Self {
        match callback.split_once("::") {
            Some((controller, action)) if is_controller_name(controller) && is_action_name(action) => {
                Self::Controller {
                    controller: controller.to_string(),
                    action: action.to_string(),
                }
            }
            _ => Self::Root(callback.to_string()),
        }
    }

    /// Action part (the whole name for root callbacks).
    pub fn action(&self) -> &str {
        match self {
            Self::Root(name) => name,
            Self::Controller { action, .. } => action,
        }
    }

    /// Conventional handler name, `<action>_<method>`.
    pub fn handler_name(&self, method: HttpMethod) -> String {
        format!("{}_{}", self.action(), method.suffix())
    }
}

impl fmt::Display for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Root(name) => f.write_str(name),
            Self::Controller { controller, action } => write!(f, "{controller}::{action}"),
        }
    }
}

fn is_word(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn is_controller_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_uppercase())
        && name.chars().count() >= 2
        && chars.all(is_word)
}

fn is_action_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && name.chars().count() >= 2
        && chars.all(is_word)
}

/// Request-scoped controller; a new instance serves every invocation.
pub trait Controller: Sized + 'static {
    fn new(services: &Services) -> Self;

    /// Runs after construction, before the action.
    fn init(&mut self, _ctx: &mut HandlerContext<'_>) {}
}

/// Handlers keyed by callback and method.
#[derive(Default, Clone)]
pub struct HandlerRegistry {
    handlers: HashMap<(String, HttpMethod), Handler>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the handler for `callback` under `method`.
    pub fn insert(&mut self, callback: &str, method: HttpMethod, handler: Handler) {
        self.handlers.insert((callback.to_string(), method), handler);
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn resolve(&self, callback: &Callback, method: HttpMethod) -> DispatchResult<&Handler> {
        self.handlers
            .get(&(callback.to_string(), method))
            .ok_or_else(|| DispatchError::HandlerNotFound {
                callback: callback.to_string(),
                handler: callback.handler_name(method),
                method,
            })
    }

    /// Start registering actions of controller `C` under `name`.
    pub fn controller<C: Controller>(&mut self, name: &str) -> ControllerRegistration<'_, C> {
        ControllerRegistration {
            name: name.to_string(),
            registry: self,
            _controller: PhantomData,
        }
    }
}

/// Builder returned by [`HandlerRegistry::controller`].
pub struct ControllerRegistration<'r, C> {
    name: String,
    registry: &'r mut HandlerRegistry,
    _controller: PhantomData<fn() -> C>,
}

impl<C: Controller> ControllerRegistration<'_, C> {
    /// Serve `Name::action` for `method` with `f`.
    pub fn action<F>(self, action: &str, method: HttpMethod, f: F) -> Self
    where
        F: Fn(&mut C, &mut HandlerContext<'_>, &[&str]) -> DispatchResult<String> + Send + Sync + 'static,
    {
        let handler: Handler = Arc::new(move |ctx: &mut HandlerContext<'_>, args: &[&str]| {
            let mut controller = C::new(ctx.services());
            controller.init(ctx);
            f(&mut controller, ctx, args)
        });
        let callback = format!("{}::{}", self.name, action);
        self.registry.insert(&callback, method, handler);
        self
    }
}

/// Run the handler for `callback` and capture its output with the
/// template state it left behind.
pub fn invoke(
    handlers: &HandlerRegistry,
    callback: &Callback,
    method: HttpMethod,
    args: &[&str],
    mut ctx: HandlerContext<'_>,
) -> DispatchResult<RenderContext> {
    let handler = handlers.resolve(callback, method)?;
    tracing::trace!(callback = %callback, %method, args = args.len(), "Invoking handler");
    let content = handler(&mut ctx, args)?;
    Ok(ctx.into_render_context(content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::Fixture;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_parse_root_and_controller() {
        assert_eq!(Callback::parse("home"), Callback::Root("home".into()));
        assert_eq!(
            Callback::parse("Clipart::search"),
            Callback::Controller {
                controller: "Clipart".into(),
                action: "search".into()
            }
        );
        assert_eq!(Callback::parse("Admin::_list").action(), "_list");
    }

    #[test]
    fn test_parse_rejects_malformed_controller_form() {
        for raw in ["clipart::search", "A::search", "Clipart::s", "Clipart::1st", "Clip-art::x2", "Clipart::"] {
            assert_eq!(Callback::parse(raw), Callback::Root(raw.into()), "{raw}");
        }
    }

    #[test]
    fn test_handler_name_and_display() {
        let callback = Callback::parse("Clipart::search");
        assert_eq!(callback.handler_name(HttpMethod::Post), "search_post");
        assert_eq!(callback.to_string(), "Clipart::search");
        assert_eq!(Callback::parse("show").handler_name(HttpMethod::Get), "show_get");
    }

    #[test]
    fn test_resolve_missing_handler() {
        let registry = HandlerRegistry::new();
        let err = registry
            .resolve(&Callback::parse("show"), HttpMethod::Delete)
            .err()
            .unwrap();
        match err {
            DispatchError::HandlerNotFound { callback, handler, method } => {
                assert_eq!(callback, "show");
                assert_eq!(handler, "show_delete");
                assert_eq!(method, HttpMethod::Delete);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invoke_captures_template_state() {
        let mut registry = HandlerRegistry::new();
        registry.insert(
            "show",
            HttpMethod::Get,
            Arc::new(|ctx: &mut HandlerContext<'_>, args: &[&str]| -> DispatchResult<String> {
                ctx.set_page_template("item.html");
                Ok(format!("item {}", args.join("/")))
            }),
        );

        let mut fixture = Fixture::new("GET", "/items/42");
        let out = invoke(&registry, &Callback::parse("show"), HttpMethod::Get, &["42"], fixture.ctx()).unwrap();
        assert_eq!(out.content, "item 42");
        assert_eq!(out.page_template.as_deref(), Some("item.html"));
        assert_eq!(out.layout_template, None);
    }

    static CONSTRUCTED: AtomicUsize = AtomicUsize::new(0);

    struct Counter {
        hits: usize,
        initialized: bool,
    }

    impl Controller for Counter {
        fn new(_: &Services) -> Self {
            CONSTRUCTED.fetch_add(1, Ordering::SeqCst);
            Self { hits: 0, initialized: false }
        }

        fn init(&mut self, _: &mut HandlerContext<'_>) {
            self.initialized = true;
        }
    }

    #[test]
    fn test_controller_instance_per_invocation() {
        let mut registry = HandlerRegistry::new();
        registry
            .controller::<Counter>("Counter")
            .action("hit", HttpMethod::Get, |c, _, _| {
                c.hits += 1;
                Ok(format!("{} {}", c.hits, c.initialized))
            });

        let callback = Callback::parse("Counter::hit");
        let before = CONSTRUCTED.load(Ordering::SeqCst);
        for _ in 0..2 {
            let mut fixture = Fixture::new("GET", "/");
            let out = invoke(&registry, &callback, HttpMethod::Get, &[], fixture.ctx()).unwrap();
            assert_eq!(out.content, "1 true");
        }
        assert_eq!(CONSTRUCTED.load(Ordering::SeqCst) - before, 2);
    }
}
