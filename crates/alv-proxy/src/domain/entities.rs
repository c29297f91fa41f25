//! # Core Domain Entities
//!
//! Defines the data carried through the request/response protocol.
//!
//! ## Entities
//!
//! - [`VerificationToken`]: correlation id linking a broadcast to its reply
//! - [`PendingVerification`]: what the index remembers per outstanding token
//! - [`AllocatedRequest`]: one batch entry handed back by the index for
//!   broadcast assembly

use serde::{Deserialize, Serialize};
use shared_types::{SubjectName, VerificationSetId};
use std::fmt;

/// Correlation id linking an outbound verification request to its eventual
/// inbound response.
///
/// Tokens are allocated by a monotonically increasing counter owned by the
/// pending-request index, so a token is unique among all simultaneously
/// pending requests for the lifetime of the proxy. Exhausting the counter
/// would take 2^64 allocations in one process lifetime; overflow is
/// deliberately unchecked.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VerificationToken(pub u64);

impl fmt::Display for VerificationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A request awaiting the agent's reply.
///
/// The set id is captured at request time; the response handler honors the
/// reply only if it still equals the subject's current id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingVerification {
    /// Version stamp of the subject's declaration when the request was sent.
    pub set_id: VerificationSetId,
    /// The subject the request was sent for.
    pub subject: SubjectName,
}

/// One entry of a freshly allocated dispatch batch.
///
/// Produced by [`super::PendingRequestIndex::insert_batch`]: by the time the
/// caller sees this, the token is already recorded as pending.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AllocatedRequest {
    /// The token under which the broadcast will be answered.
    pub token: VerificationToken,
    /// Version stamp captured at allocation time.
    pub set_id: VerificationSetId,
    /// The subject the broadcast is addressed for.
    pub subject: SubjectName,
}
