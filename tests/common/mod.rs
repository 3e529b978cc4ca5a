//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::Path;
use std::sync::{Arc, Mutex};

use serde_json::Value;
use tokio::net::TcpListener;

use page_runner::config::{AppConfig, RunnerConfig};
use page_runner::lifecycle::Shutdown;
use page_runner::session::MemorySessionStore;
use page_runner::render::{Template, TemplateError, TemplateVars};
use page_runner::{HttpServer, Runner};

/// Template double that renders `id(content)` and records every call.
#[derive(Default)]
pub struct RecordingTemplates {
    pub calls: Mutex<Vec<String>>,
}

impl Template for RecordingTemplates {
    fn render(&self, template: &str, vars: &TemplateVars, _: &str) -> Result<String, TemplateError> {
        self.calls.lock().unwrap().push(template.to_string());
        let content = vars.get("content").and_then(Value::as_str).unwrap_or_default();
        Ok(format!("{template}({content})"))
    }

    fn exists(&self, _: &str) -> bool {
        true
    }

    fn persist_var(&self, _: &str, _: Value) {}

    fn set_template_dir(&self, _: &Path) {}
}

/// Runner backed by [`RecordingTemplates`]; also returns the templates.
pub fn runner() -> (Runner, Arc<RecordingTemplates>) {
    let templates = Arc::new(RecordingTemplates::default());
    let runner = Runner::new(templates.clone(), Arc::new(AppConfig::default()));
    (runner, templates)
}

/// Shared log for recording check and handler order.
pub type Log = Arc<Mutex<Vec<String>>>;

pub fn log() -> Log {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn entries(log: &Log) -> Vec<String> {
    log.lock().unwrap().clone()
}

/// Serve `runner` on an ephemeral port. Returns the address and the
/// coordinator that stops the server.
pub async fn start_server(runner: Runner) -> (SocketAddr, Shutdown) {
    start_server_with_sessions(runner, MemorySessionStore::new()).await
}

/// Like [`start_server`], over a session store the test keeps a handle to.
pub async fn start_server_with_sessions(
    runner: Runner,
    sessions: MemorySessionStore,
) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::with_sessions(RunnerConfig::default(), Arc::new(runner), sessions);
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        server.run(listener, rx).await.unwrap();
    });

    (addr, shutdown)
}

/// Client that keeps cookies but never follows redirects.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .cookie_store(true)
        .build()
        .unwrap()
}
