//! Intake for verification results submitted by the agent.
//!
//! The capability check lives here, *before* the response is scheduled: the
//! protocol is unsafe without it, since anyone could otherwise complete
//! anyone else's pending token.

use std::sync::Arc;
use tracing::warn;

use crate::domain::VerificationToken;
use crate::events::{AgentResponse, ProxyError, ProxyMessage};
use crate::ports::outbound::ProxyConnection;
use shared_types::HostName;

/// Accepts verification results from the transport layer and defers them to
/// the proxy's message handler.
///
/// SECURITY: Only the registered verification agent may submit results. The
/// uid check happens here, synchronously on the submitting caller, so an
/// untrusted caller is rejected before anything is enqueued.
pub struct AgentResponseIntake<N: ProxyConnection> {
    connection: Arc<N>,
    verifier_package: String,
}

impl<N: ProxyConnection> AgentResponseIntake<N> {
    pub fn new(connection: Arc<N>, verifier_package: String) -> Self {
        Self {
            connection,
            verifier_package,
        }
    }

    /// Queue one verification result for asynchronous handling.
    ///
    /// # Errors
    ///
    /// `ProxyError::UntrustedCaller` if `origin_uid` is not the registered
    /// verification agent. Nothing is scheduled in that case.
    pub fn queue_verify_result(
        &self,
        origin_uid: u32,
        token: VerificationToken,
        result_code: i32,
        failed_hosts: Vec<HostName>,
    ) -> Result<(), ProxyError> {
        if !self
            .connection
            .is_caller_package(origin_uid, &self.verifier_package)
        {
            warn!(uid = origin_uid, "Rejected verification result from untrusted caller");
            return Err(ProxyError::UntrustedCaller { uid: origin_uid });
        }

        self.connection.schedule(ProxyMessage::verified(AgentResponse {
            origin_uid,
            token,
            result_code,
            failed_hosts,
        }));
        Ok(())
    }
}
