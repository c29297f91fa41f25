//! # Verification Proxy Service
//!
//! The main service implementation for the asynchronous verification
//! protocol: broadcast dispatch on one side, response correlation and the
//! two-outcome status update on the other.
//!
//! ## Architecture
//!
//! This service implements the inbound port:
//! - [`VerificationProxyApi`]: request dispatch, withdrawal, and message
//!   handling
//!
//! It depends on four outbound ports (implemented by adapters in
//! alv-runtime):
//! - [`VerificationStore`]: set-id resolution and status persistence
//! - [`HostCollector`]: per-subject broadcast host sets
//! - [`AgentTransport`]: one-way broadcast delivery plus the foreground
//!   allowance grant
//! - [`ProxyConnection`]: deferred message scheduling and the caller
//!   capability check
//!
//! ## Protocol
//!
//! A reply is applied at most once: `take` is the only success-path exit
//! from the pending index, and a reply whose captured set id no longer
//! matches the subject's current one is dropped without touching the store.
//! Each half of the two-outcome update is applied independently; a store
//! failure on one half never aborts the other.
//!
//! ## Thread Safety
//!
//! The service is shared across tasks via `Arc`. All pending-index mutation
//! goes through its single mutex, and the lock is released before any
//! transport send or store update.

use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;

use crate::domain::{join_hosts, AllocatedRequest, PendingRequestIndex, ProxyConfig};
use crate::events::{codes, AgentResponse, MessagePayload, ProxyMessage, VerificationRequest};
use crate::ports::inbound::VerificationProxyApi;
use crate::ports::outbound::{AgentTransport, HostCollector, ProxyConnection, VerificationStore};
use shared_types::{HostName, SubjectName, VerificationState};

/// Verification proxy service.
///
/// Owns the pending-request index for its lifetime; the verification store
/// is only ever mutated through calls into the [`VerificationStore`] port.
pub struct VerificationProxyService<S, H, T, N>
where
    S: VerificationStore,
    H: HostCollector,
    T: AgentTransport,
    N: ProxyConnection,
{
    /// Service configuration.
    config: ProxyConfig,
    /// Verification-state store.
    store: Arc<S>,
    /// Broadcast host collector.
    collector: Arc<H>,
    /// One-way broadcast delivery.
    transport: Arc<T>,
    /// Scheduling and capability surface.
    connection: Arc<N>,
    /// Requests still awaiting a reply.
    index: PendingRequestIndex,
}

impl<S, H, T, N> VerificationProxyService<S, H, T, N>
where
    S: VerificationStore,
    H: HostCollector,
    T: AgentTransport,
    N: ProxyConnection,
{
    pub fn new(
        config: ProxyConfig,
        store: Arc<S>,
        collector: Arc<H>,
        transport: Arc<T>,
        connection: Arc<N>,
    ) -> Self {
        Self {
            config,
            store,
            collector,
            transport,
            connection,
            index: PendingRequestIndex::new(),
        }
    }

    /// The pending-request index (observability and tests).
    #[must_use]
    pub fn index(&self) -> &PendingRequestIndex {
        &self.index
    }

    /// Resolve set ids, record the batch as pending, then broadcast.
    ///
    /// Subjects without a current declaration are skipped: no token is
    /// allocated and no broadcast is sent for them. Allocation and insertion
    /// happen under one lock acquisition; the lock is released before the
    /// first send.
    fn dispatch_batch(&self, subjects: BTreeSet<SubjectName>) {
        let mut entries = Vec::with_capacity(subjects.len());
        for subject in subjects {
            match self.store.current_set_id(&subject) {
                Some(set_id) => entries.push((set_id, subject)),
                None => {
                    debug!(subject = %subject, "No declared verification set; skipping subject");
                }
            }
        }
        if entries.is_empty() {
            return;
        }

        let batch = self.index.insert_batch(entries);
        self.send_broadcasts(batch);
    }

    /// Send one broadcast per allocated request.
    ///
    /// The foreground allowance is granted once for the whole batch, not per
    /// subject.
    fn send_broadcasts(&self, batch: Vec<AllocatedRequest>) {
        self.transport.grant_foreground_allowance(
            &self.config.verifier_package,
            self.config.allowlist_duration,
        );

        for allocated in batch {
            let hosts = self.collector.collect_hosts(&allocated.subject);
            let request =
                VerificationRequest::new(allocated.token, allocated.subject, join_hosts(&hosts));
            debug!(
                token = %request.token,
                subject = %request.subject,
                hosts = %request.hosts,
                "Sending verification request"
            );
            self.transport.send_request(request);
        }
    }

    /// Correlate one agent response and apply the two-outcome update.
    fn handle_response(&self, response: AgentResponse) {
        debug!(
            token = %response.token,
            result_code = response.result_code,
            "Handling verification response"
        );

        // Unknown token: duplicate reply, withdrawn subject, or a token this
        // proxy never issued. A no-op, not an error.
        let Some(pending) = self.index.take(response.token) else {
            return;
        };

        // The declared set may have changed since the request was issued; a
        // reply to an obsolete request must not mutate current state.
        let declared = match self.store.declared_set(&pending.subject) {
            Ok(declared) => declared,
            Err(err) => {
                debug!(subject = %pending.subject, %err, "Dropping response");
                return;
            }
        };
        if declared.id != pending.set_id {
            debug!(
                subject = %pending.subject,
                captured = %pending.set_id,
                current = %declared.id,
                "Set id changed since request; dropping response"
            );
            return;
        }

        let failed: BTreeSet<HostName> = response.failed_hosts.iter().cloned().collect();
        let accepted: BTreeSet<HostName> = declared.hosts.difference(&failed).cloned().collect();

        // Two independent half-updates. Either may race a redeclaration and
        // fail; the sibling still proceeds so as much of the outcome as
        // remains valid reaches the store.
        if let Err(err) = self.store.apply_status(
            response.origin_uid,
            pending.set_id,
            accepted,
            VerificationState::Success,
        ) {
            debug!(subject = %pending.subject, %err, "Accepted-set update dropped");
        }
        if let Err(err) = self.store.apply_status(
            response.origin_uid,
            pending.set_id,
            failed,
            VerificationState::LegacyFailure,
        ) {
            debug!(subject = %pending.subject, %err, "Rejected-set update dropped");
        }
    }
}

impl<S, H, T, N> VerificationProxyApi for VerificationProxyService<S, H, T, N>
where
    S: VerificationStore,
    H: HostCollector,
    T: AgentTransport,
    N: ProxyConnection,
{
    fn request_verification(&self, subjects: BTreeSet<SubjectName>) {
        if subjects.is_empty() {
            return;
        }
        // A fresh request supersedes anything still pending for the same
        // subjects; only the newest outstanding request per subject is
        // honored.
        self.index.remove_all_for_subjects(&subjects);
        self.connection.schedule(ProxyMessage::send_request(subjects));
    }

    fn subjects_withdrawn(&self, subjects: &BTreeSet<SubjectName>) {
        self.index.remove_all_for_subjects(subjects);
    }

    fn run_message(&self, message: ProxyMessage) -> bool {
        match (message.code, message.payload) {
            (codes::SEND_REQUEST, MessagePayload::Subjects(subjects)) => {
                debug!(count = subjects.len(), "Dispatching verification batch");
                self.dispatch_batch(subjects);
                true
            }
            (codes::ON_HOSTS_VERIFIED, MessagePayload::Response(response)) => {
                self.handle_response(response);
                true
            }
            (code, _) => {
                debug!(code, "Message code not owned by this proxy");
                false
            }
        }
    }

    fn is_caller_verifier(&self, uid: u32) -> bool {
        self.connection
            .is_caller_package(uid, &self.config.verifier_package)
    }
}
