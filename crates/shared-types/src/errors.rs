//! # Error Types
//!
//! Failures the verification store may raise when the proxy calls into it.

use crate::entities::{SubjectName, VerificationSetId};
use thiserror::Error;

/// Errors from verification-store operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The supplied set id does not match the subject's current declaration.
    /// Raised when a status update races a redeclaration.
    #[error("Invalid verification set: {set_id} is not current")]
    InvalidSet { set_id: VerificationSetId },

    /// The subject is not known to the store (never declared, or removed).
    #[error("Subject not found: {subject}")]
    SubjectNotFound { subject: SubjectName },
}
