//! Pending Request Index - the single source of truth for outstanding
//! verification requests.
//!
//! Maps correlation tokens to the `(set id, subject)` captured when the
//! request batch was assembled. A token is present if and only if a broadcast
//! for it has been sent and no matching (or superseding) response has been
//! processed yet.

use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use super::{AllocatedRequest, PendingVerification, TokenAllocator, VerificationToken};
use shared_types::{SubjectName, VerificationSetId};

/// Everything guarded by the index lock.
///
/// The allocator lives inside the locked state so token allocation and map
/// insertion are one atomic step (spurious collisions are structurally
/// impossible).
struct IndexInner {
    allocator: TokenAllocator,
    requests: BTreeMap<VerificationToken, PendingVerification>,
}

/// Thread-safe index of requests still awaiting a reply.
///
/// Flow:
/// 1. Dispatcher calls `insert_batch()` with the resolved `(set id, subject)`
///    pairs of one dispatch batch
/// 2. Dispatcher sends one broadcast per returned [`AllocatedRequest`]
///    (after the lock is released)
/// 3. Response handler calls `take()` with the reply's token
/// 4. Withdrawal or supersession calls `remove_all_for_subjects()`
///
/// All mutation is serialized through one mutex; no operation performs I/O
/// while holding it.
pub struct PendingRequestIndex {
    inner: Mutex<IndexInner>,
}

impl PendingRequestIndex {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(IndexInner {
                allocator: TokenAllocator::new(),
                requests: BTreeMap::new(),
            }),
        }
    }

    /// Allocate one token per entry and record all entries as pending, under
    /// a single lock acquisition.
    ///
    /// Batching keeps a concurrently arriving response from observing a
    /// partially inserted batch.
    pub fn insert_batch(
        &self,
        entries: Vec<(VerificationSetId, SubjectName)>,
    ) -> Vec<AllocatedRequest> {
        let mut inner = self.inner.lock();
        entries
            .into_iter()
            .map(|(set_id, subject)| {
                let token = inner.allocator.next();
                let displaced = inner.requests.insert(
                    token,
                    PendingVerification {
                        set_id,
                        subject: subject.clone(),
                    },
                );
                debug_assert!(displaced.is_none(), "token {token} allocated twice");
                AllocatedRequest {
                    token,
                    set_id,
                    subject,
                }
            })
            .collect()
    }

    /// Atomically remove and return the entry for `token`.
    ///
    /// Returns `None` for tokens that are unknown, already consumed, or
    /// withdrawn. This is the only success-path exit from the index.
    pub fn take(&self, token: VerificationToken) -> Option<PendingVerification> {
        let taken = self.inner.lock().requests.remove(&token);
        if taken.is_none() {
            debug!(%token, "No pending request for token");
        }
        taken
    }

    /// Remove every pending entry whose subject is in `subjects`, regardless
    /// of token.
    ///
    /// Used when a subject is withdrawn before a response arrives, and to
    /// supersede stale requests when a fresh batch is dispatched.
    pub fn remove_all_for_subjects(&self, subjects: &BTreeSet<SubjectName>) {
        if subjects.is_empty() {
            return;
        }
        let mut inner = self.inner.lock();
        inner
            .requests
            .retain(|_, pending| !subjects.contains(&pending.subject));
    }

    /// Number of requests currently awaiting a reply.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.inner.lock().requests.len()
    }

    /// Whether `token` is currently awaiting a reply.
    #[must_use]
    pub fn is_pending(&self, token: VerificationToken) -> bool {
        self.inner.lock().requests.contains_key(&token)
    }

    /// Tokens currently pending for `subject`, in allocation order.
    #[must_use]
    pub fn tokens_for_subject(&self, subject: &str) -> Vec<VerificationToken> {
        self.inner
            .lock()
            .requests
            .iter()
            .filter(|(_, pending)| pending.subject == subject)
            .map(|(token, _)| *token)
            .collect()
    }
}

impl Default for PendingRequestIndex {
    fn default() -> Self {
        Self::new()
    }
}
