//! # Core Domain Entities
//!
//! Names and identifiers used across the verification pipeline.
//!
//! ## Entities
//!
//! - [`SubjectName`] / [`HostName`]: plain-string identities
//! - [`VerificationSetId`]: opaque version stamp for a subject's declared set
//! - [`DeclaredSet`]: the store's view of a subject's declared hosts

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use uuid::Uuid;

/// The entity whose verification status is being established
/// (e.g. an installed application's package name).
pub type SubjectName = String;

/// A single host a subject has declared as requiring verification.
pub type HostName = String;

/// Opaque version stamp for a subject's current declared verification set.
///
/// Owned by the verification store: every redeclaration of a subject's hosts
/// mints a fresh id. A response captured against an old id no longer
/// corresponds to the subject's requirements and must be discarded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VerificationSetId(Uuid);

impl VerificationSetId {
    /// Mint a fresh identifier. Only the store should call this.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for VerificationSetId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for VerificationSetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A subject's declared verification set as recorded by the store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeclaredSet {
    /// Version stamp of this declaration.
    pub id: VerificationSetId,
    /// Hosts declared as requiring verification. May be empty.
    pub hosts: BTreeSet<HostName>,
}
