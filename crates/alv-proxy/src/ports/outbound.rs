//! Outbound ports (SPI) for the verification proxy.
//!
//! One trait per collaborator. The proxy calls into these; it owns none of
//! them. All are synchronous and `Send + Sync` so the service can be shared
//! across tasks behind an `Arc`.

use crate::events::{ProxyMessage, VerificationRequest};
use shared_types::{DeclaredSet, HostName, StoreError, VerificationSetId, VerificationState};
use std::collections::BTreeSet;
use std::time::Duration;

/// The verification-state store. Persists per-subject verification status;
/// the proxy only calls into it, never owns it.
pub trait VerificationStore: Send + Sync {
    /// The subject's current declaration version stamp, or `None` if the
    /// subject is unknown or has no declared verification requirements.
    fn current_set_id(&self, subject: &str) -> Option<VerificationSetId>;

    /// The subject's current declared set (id plus hosts).
    ///
    /// # Errors
    ///
    /// `StoreError::SubjectNotFound` if the subject no longer exists.
    fn declared_set(&self, subject: &str) -> Result<DeclaredSet, StoreError>;

    /// Mark `hosts` with `state`, keyed by `set_id` and audited under
    /// `origin_uid`.
    ///
    /// # Errors
    ///
    /// `StoreError::InvalidSet` if `set_id` is no longer the subject's
    /// current declaration; `StoreError::SubjectNotFound` if the subject is
    /// gone. Both indicate the update raced a redeclaration or removal.
    fn apply_status(
        &self,
        origin_uid: u32,
        set_id: VerificationSetId,
        hosts: BTreeSet<HostName>,
        state: VerificationState,
    ) -> Result<(), StoreError>;
}

/// Computes the set of hosts to put on a subject's broadcast, derived from
/// the subject's declared intent filters.
pub trait HostCollector: Send + Sync {
    /// Hosts to carry on the broadcast for `subject`. May be empty; an
    /// empty-host broadcast is still sent.
    fn collect_hosts(&self, subject: &str) -> BTreeSet<HostName>;
}

/// The environment's one-way broadcast delivery primitive.
///
/// Sends are fire-and-forget: no delivery acknowledgement is awaited and
/// failures are not retried here. Retry, if wanted, is a higher-level
/// re-request that supersedes the pending entry.
pub trait AgentTransport: Send + Sync {
    /// Grant the agent's process a bounded foreground allowance so it is not
    /// killed before it can reply. Requested once per dispatch batch.
    fn grant_foreground_allowance(&self, package: &str, duration: Duration);

    /// Send one verification request broadcast to the agent component.
    fn send_request(&self, request: VerificationRequest);
}

/// The host environment's scheduling and capability surface.
pub trait ProxyConnection: Send + Sync {
    /// Enqueue a message for asynchronous handling by `run_message`.
    fn schedule(&self, message: ProxyMessage);

    /// Whether `uid` belongs to `package`. Capability check used to gate
    /// agent responses at the transport boundary.
    fn is_caller_package(&self, uid: u32, package: &str) -> bool;
}
