//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, session cookie)
//!     → request.rs (method, URI, query and form values)
//!     → [dispatch runner] (blocking pool)
//!     → response.rs (status, headers, body)
//!     → status.rs (reason phrases)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;
pub mod status;

pub use request::{decode_path, Request};
pub use response::Response;
pub use server::{AppState, HttpServer};
pub use status::{reason_phrase, status_text};
