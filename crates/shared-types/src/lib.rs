//! # Shared Types Crate
//!
//! Domain vocabulary shared between the verification proxy and the runtime.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: Cross-crate types are defined here, once.
//! - **Opaque Identifiers**: `VerificationSetId` is a version stamp owned by
//!   the verification store; nothing outside the store may mint or interpret
//!   one.
//! - **No I/O**: This crate is pure data; all behavior lives in the proxy and
//!   runtime crates.

pub mod entities;
pub mod errors;
pub mod state;

pub use entities::*;
pub use errors::*;
pub use state::*;
