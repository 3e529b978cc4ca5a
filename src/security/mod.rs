//! Access-check subsystem.
//!
//! # Data Flow
//! ```text
//! Route declaration "loginRequired|hasRole:admin"
//!     → chain.rs (parsed once into an ordered CheckChain at registration)
//!     → access_control.rs (registry lookup, evaluate in order)
//!     → Allow: invoke handler / Deny: stop dispatch
//! ```
//!
//! # Design Decisions
//! - Fail closed: the first denial ends the chain
//! - Unknown check names are rejected when routes are registered

pub mod access_control;
pub mod chain;

pub use access_control::{Access, AccessCheck, AccessChecks, FnCheck};
pub use chain::{CheckChain, CheckSpec};
