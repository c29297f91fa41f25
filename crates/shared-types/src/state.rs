//! Per-host verification states.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Verification status of a single declared host.
///
/// `LegacyFailure` is a degraded-success class reported by the legacy agent
/// protocol. It is terminal and distinct from `NoResponse`: downstream
/// consumers can tell "the agent rejected this host" apart from "the agent
/// never answered".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerificationState {
    /// No verification attempt has completed for this host.
    NoResponse,
    /// The agent verified this host.
    Success,
    /// The agent reported this host as failed.
    LegacyFailure,
}

impl VerificationState {
    /// Whether this state was produced by a processed agent response.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !matches!(self, VerificationState::NoResponse)
    }
}

impl fmt::Display for VerificationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VerificationState::NoResponse => "no-response",
            VerificationState::Success => "success",
            VerificationState::LegacyFailure => "legacy-failure",
        };
        f.write_str(s)
    }
}
