//! # AppLink-Verify Runtime
//!
//! Wires the verification proxy to concrete collaborators and runs the
//! message pump that drives deferred handling.
//!
//! ## Modular Structure
//!
//! - `config` - Runtime configuration with environment overrides
//! - `adapters` - Port implementations (store, transport, connection)
//! - `wiring` - The message pump task

pub mod adapters;
pub mod config;
pub mod wiring;

pub use config::RuntimeConfig;
