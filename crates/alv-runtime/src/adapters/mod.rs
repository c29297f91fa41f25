//! # Adapter Implementations
//!
//! Concrete implementations of the proxy's outbound ports:
//!
//! - [`store::InMemoryVerificationStore`] - verification-state store and
//!   host collector backed by an in-process map
//! - [`transport::ChannelAgentTransport`] - one-way broadcast delivery over
//!   a tokio channel
//! - [`connection::TokioProxyConnection`] - message scheduling into the pump
//!   plus the uid capability check

pub mod connection;
pub mod store;
pub mod transport;

pub use connection::{TokioProxyConnection, UidRegistry};
pub use store::InMemoryVerificationStore;
pub use transport::ChannelAgentTransport;
