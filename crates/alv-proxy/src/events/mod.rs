//! Events and error types for the verification proxy.

use thiserror::Error;

pub mod ipc;

pub use ipc::*;

/// Verification proxy errors.
///
/// Deliberately small: protocol no-ops (unknown tokens, duplicate replies,
/// stale set ids) and per-half store failures are swallowed by design and
/// never surface as errors. The only hard failure the proxy raises is a
/// capability violation at the transport boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProxyError {
    /// A verification result was submitted by a uid that is not the
    /// registered verification agent. Security fault, not a protocol no-op.
    #[error("Untrusted caller: uid {uid} is not the verification agent")]
    UntrustedCaller { uid: u32 },
}
