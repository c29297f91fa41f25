//! In-memory verification-state store.
//!
//! Backs both the [`VerificationStore`] and [`HostCollector`] ports. Every
//! redeclaration of a subject's hosts mints a fresh set id, which is what
//! invalidates replies to requests issued against the old declaration.

use alv_proxy::ports::outbound::{HostCollector, VerificationStore};
use parking_lot::RwLock;
use shared_types::{
    DeclaredSet, HostName, StoreError, SubjectName, VerificationSetId, VerificationState,
};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::debug;

/// One subject's declaration and per-host status.
struct SubjectRecord {
    set_id: VerificationSetId,
    host_states: BTreeMap<HostName, VerificationState>,
}

/// Map-backed verification store.
///
/// `apply_status` enforces the set-id handshake: an update keyed by a stale
/// id is rejected with `InvalidSet`, exactly as a persistent store would
/// reject an update that raced a redeclaration.
#[derive(Default)]
pub struct InMemoryVerificationStore {
    subjects: RwLock<HashMap<SubjectName, SubjectRecord>>,
}

impl InMemoryVerificationStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare (or redeclare) a subject's verification hosts.
    ///
    /// Rotates the subject's set id and resets every host to `NoResponse`.
    pub fn declare<I, S>(&self, subject: &str, hosts: I) -> VerificationSetId
    where
        I: IntoIterator<Item = S>,
        S: Into<HostName>,
    {
        let set_id = VerificationSetId::new();
        let host_states = hosts
            .into_iter()
            .map(|host| (host.into(), VerificationState::NoResponse))
            .collect();
        self.subjects.write().insert(
            subject.to_string(),
            SubjectRecord {
                set_id,
                host_states,
            },
        );
        set_id
    }

    /// Forget a subject entirely (e.g. uninstalled).
    pub fn remove(&self, subject: &str) {
        self.subjects.write().remove(subject);
    }

    /// Current state of one declared host.
    #[must_use]
    pub fn host_state(&self, subject: &str, host: &str) -> Option<VerificationState> {
        self.subjects
            .read()
            .get(subject)
            .and_then(|record| record.host_states.get(host))
            .copied()
    }
}

impl VerificationStore for InMemoryVerificationStore {
    fn current_set_id(&self, subject: &str) -> Option<VerificationSetId> {
        self.subjects.read().get(subject).map(|record| record.set_id)
    }

    fn declared_set(&self, subject: &str) -> Result<DeclaredSet, StoreError> {
        let subjects = self.subjects.read();
        let record = subjects
            .get(subject)
            .ok_or_else(|| StoreError::SubjectNotFound {
                subject: subject.to_string(),
            })?;
        Ok(DeclaredSet {
            id: record.set_id,
            hosts: record.host_states.keys().cloned().collect(),
        })
    }

    fn apply_status(
        &self,
        origin_uid: u32,
        set_id: VerificationSetId,
        hosts: BTreeSet<HostName>,
        state: VerificationState,
    ) -> Result<(), StoreError> {
        let mut subjects = self.subjects.write();
        let record = subjects
            .values_mut()
            .find(|record| record.set_id == set_id)
            .ok_or(StoreError::InvalidSet { set_id })?;

        for host in hosts {
            match record.host_states.get_mut(&host) {
                Some(slot) => *slot = state,
                // The agent may report names the subject never declared.
                None => debug!(host = %host, "Status for undeclared host ignored"),
            }
        }
        debug!(uid = origin_uid, %set_id, %state, "Applied verification status");
        Ok(())
    }
}

impl HostCollector for InMemoryVerificationStore {
    fn collect_hosts(&self, subject: &str) -> BTreeSet<HostName> {
        self.subjects
            .read()
            .get(subject)
            .map(|record| record.host_states.keys().cloned().collect())
            .unwrap_or_default()
    }
}
