//! Message types for the verification proxy's protocol.
//!
//! Inbound messages carry a numeric code so the host's dispatcher can route
//! codes this proxy does not own elsewhere; `run_message` answers `false`
//! for those.

use serde::{Deserialize, Serialize};
use shared_types::{HostName, SubjectName};
use std::collections::BTreeSet;

use crate::domain::{VerificationToken, SCHEME_HTTPS};

/// Message codes owned by the verification proxy.
pub mod codes {
    /// Assemble and send one verification broadcast per subject.
    pub const SEND_REQUEST: i32 = 1;
    /// Apply a verification result received from the agent.
    pub const ON_HOSTS_VERIFIED: i32 = 2;
}

/// Payload of an inbound proxy message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MessagePayload {
    /// Subjects to dispatch verification broadcasts for.
    Subjects(BTreeSet<SubjectName>),
    /// A verification result from the agent.
    Response(AgentResponse),
}

/// An inbound message as delivered by the environment's scheduler.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProxyMessage {
    /// Routing code; see [`codes`].
    pub code: i32,
    pub payload: MessagePayload,
}

impl ProxyMessage {
    /// Build a `SEND_REQUEST` message for a batch of subjects.
    #[must_use]
    pub fn send_request(subjects: BTreeSet<SubjectName>) -> Self {
        Self {
            code: codes::SEND_REQUEST,
            payload: MessagePayload::Subjects(subjects),
        }
    }

    /// Build an `ON_HOSTS_VERIFIED` message for an agent response.
    #[must_use]
    pub fn verified(response: AgentResponse) -> Self {
        Self {
            code: codes::ON_HOSTS_VERIFIED,
            payload: MessagePayload::Response(response),
        }
    }
}

/// The agent's asynchronous reply to one verification broadcast.
///
/// Transient; exists only while one inbound message is handled.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentResponse {
    /// Uid the result was submitted under; carried through to the store for
    /// auditing. The transport boundary has already checked it against the
    /// registered agent.
    pub origin_uid: u32,
    /// Token from the original broadcast.
    pub token: VerificationToken,
    /// Agent-protocol result code. Carried for protocol parity and logging;
    /// the outcome is determined by `failed_hosts` alone.
    pub result_code: i32,
    /// Hosts the agent could not verify, in the agent's reported order.
    /// Every declared host not listed here is treated as verified.
    pub failed_hosts: Vec<HostName>,
}

/// One outbound verification request broadcast.
///
/// Addressed to the fixed verification agent component; sent fire-and-forget
/// through the environment's one-way delivery primitive.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationRequest {
    /// Correlation token the agent must echo in its response.
    pub token: VerificationToken,
    /// Subject the request is for.
    pub subject: SubjectName,
    /// URI scheme the hosts should be verified against.
    pub scheme: String,
    /// The subject's collected hosts, space-joined. May be empty.
    pub hosts: String,
    /// Deliver with foreground priority so the broadcast is not batched
    /// behind background traffic.
    pub foreground: bool,
}

impl VerificationRequest {
    #[must_use]
    pub fn new(token: VerificationToken, subject: SubjectName, hosts: String) -> Self {
        Self {
            token,
            subject,
            scheme: SCHEME_HTTPS.to_string(),
            hosts,
            foreground: true,
        }
    }
}
