//! Page runner demo site.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http server ──▶ runner ──▶ route table ──▶ access checks
//!                     (axum, tower      (blocking pool)               │
//!                      middleware)                                    ▼
//!     Client Response                                             handler /
//!     ◀────────────── response ◀──── renderer (page, layout) ◀── controller
//! ```
//!
//! Routes:
//! - `GET /` home page
//! - `GET|POST /login`, `GET /logout`
//! - `GET /items`, `GET /items/{id}` (login required)

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use serde_json::{json, Value};
use tokio::net::TcpListener;

use page_runner::config::load_or_default;
use page_runner::dispatch::Services;
use page_runner::lifecycle::{shutdown_on_signal, Shutdown};
use page_runner::observability::{logging, metrics};
use page_runner::session::{MemorySessionStore, SessionSweeper};
use page_runner::{
    Access, Controller, DispatchResult, HandlerContext, HttpMethod, HttpServer, Runner, RouteSpec,
};

#[derive(Debug, Parser)]
#[command(name = "page-runner", version, about = "Page runner demo site")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,
}

/// Item listing controller.
struct Items {
    per_page: usize,
    user: String,
}

impl Controller for Items {
    fn new(services: &Services) -> Self {
        Self {
            per_page: services.config().get("site", "per_page", 10),
            user: String::new(),
        }
    }

    fn init(&mut self, ctx: &mut HandlerContext<'_>) {
        if let Value::String(user) = ctx.session_value("user", Value::Null) {
            self.user = user;
        }
        ctx.set_page_template("items.html");
    }
}

impl Items {
    fn list(&mut self, _ctx: &mut HandlerContext<'_>, _args: &[&str]) -> DispatchResult<String> {
        let items: String = (1..=self.per_page)
            .map(|id| format!("<li><a href=\"/items/{id}\">Item {id}</a></li>"))
            .collect();
        Ok(format!("<p>Signed in as {}</p><ul>{items}</ul>", self.user))
    }

    fn show(&mut self, ctx: &mut HandlerContext<'_>, args: &[&str]) -> DispatchResult<String> {
        let id = args.first().copied().unwrap_or_default();
        if ctx.get_value("format", "html") == "json" {
            ctx.set_ajax_response();
            ctx.response_mut().set_header("Content-Type", "application/json");
            return Ok(json!({ "id": id }).to_string());
        }
        Ok(format!("<h2>Item {id}</h2>"))
    }
}

fn build_runner(runner: &mut Runner) -> DispatchResult<()> {
    runner
        .access_check_fn("loginRequired", |ctx, _params| {
            if ctx.session_value("user", Value::Null).is_null() {
                ctx.redirect("/login");
                return Ok(Access::Deny);
            }
            Ok(Access::Allow)
        })
        .handler("home", HttpMethod::Get, |_ctx, _args| {
            Ok("<h1>Welcome</h1><p><a href=\"/items\">Browse items</a></p>".to_string())
        })
        .handler("login", HttpMethod::Get, |_ctx, _args| {
            Ok(concat!(
                "<form method=\"post\" action=\"/login\">",
                "<input name=\"user\"><button>Sign in</button></form>"
            )
            .to_string())
        })
        .handler("login", HttpMethod::Post, |ctx, _args| {
            let user = ctx.post_value("user", "");
            if user.is_empty() {
                ctx.set_status_code(422);
                return Ok("<p>Name required</p>".to_string());
            }
            ctx.set_session_value("user", Value::String(user));
            ctx.redirect("/items");
            Ok(String::new())
        })
        .handler("logout", HttpMethod::Get, |ctx, _args| {
            ctx.unset_session_value("user");
            ctx.redirect("/");
            Ok(String::new())
        });

    runner
        .controller::<Items>("Items")
        .action("list", HttpMethod::Get, Items::list)
        .action("show", HttpMethod::Get, Items::show);

    runner.register_routes([
        RouteSpec::new("/", None, "home"),
        RouteSpec::new("/login", None, "login").methods("get|post"),
        RouteSpec::new("/logout", None, "logout"),
        RouteSpec::new("/items", Some("loginRequired"), "Items::list"),
        RouteSpec::new(r"/items/{id:\d+}", Some("loginRequired"), "Items::show"),
    ])
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let loaded = load_or_default(&cli.config)?;
    let config = loaded.runner;

    logging::init(&config.observability);
    tracing::info!("page-runner v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        template_dir = %config.templates.dir.display(),
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let mut runner = Runner::from_config(&config, loaded.app);
    let site_name: String = runner
        .services()
        .config()
        .get("site", "name", "Page Runner".to_string());
    runner.templates().persist_var("site_name", json!(site_name));
    build_runner(&mut runner)?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    tokio::spawn(shutdown_on_signal(shutdown.clone()));

    let sessions = MemorySessionStore::new();
    let sweeper = SessionSweeper::new(sessions.clone(), &config.session);
    tokio::spawn(sweeper.run(shutdown.subscribe()));

    let server = HttpServer::with_sessions(config, Arc::new(runner), sessions);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
