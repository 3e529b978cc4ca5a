//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → RunnerConfig (validated, immutable) → runner + HTTP server
//!     → AppConfig (same file) → handlers and controllers via Services
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod app;
pub mod loader;
pub mod schema;
pub mod validation;

pub use app::AppConfig;
pub use loader::{load_config, load_or_default, ConfigError, LoadedConfig};
pub use schema::{
    ListenerConfig, ObservabilityConfig, RunnerConfig, SessionConfig, TemplatesConfig,
    TimeoutConfig,
};
