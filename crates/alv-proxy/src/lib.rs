//! # AppLink Verification Proxy
//!
//! Issues fire-and-forget verification request broadcasts to an external
//! agent, correlates the agent's later out-of-band reply with the original
//! request by token, and applies the verified result to the verification
//! store exactly once.
//!
//! ## Architecture Role
//!
//! ```text
//! [Host] ──request_verification──→ [Verification Proxy]
//!                                         │
//!                                         ↓ one broadcast per subject
//!                                  [Verification Agent]
//!                                         │
//!                                         ↓ (time passes, async reply)
//!                            [AgentResponseIntake] ──ON_HOSTS_VERIFIED──→
//!                                  [Verification Proxy] ──→ [Store]
//! ```
//!
//! ## Security
//!
//! A response is only accepted if:
//! 1. The sending uid is the registered verification agent
//!    (checked by [`ipc::AgentResponseIntake`] before scheduling)
//! 2. Its token is still pending (unknown/duplicate tokens are no-ops)
//! 3. The set id captured at request time is still the subject's current one
//!    (stale replies are silently dropped)

pub mod domain;
pub mod events;
pub mod ipc;
pub mod ports;
pub mod service;

pub use domain::*;
pub use events::ProxyError;
pub use ports::inbound::VerificationProxyApi;
pub use service::VerificationProxyService;
