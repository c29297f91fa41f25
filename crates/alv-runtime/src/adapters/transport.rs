//! Channel-backed broadcast transport.
//!
//! Models the environment's one-way delivery primitive: a send either lands
//! on the agent's queue or is dropped, and the proxy never waits on it.

use alv_proxy::events::VerificationRequest;
use alv_proxy::ports::outbound::AgentTransport;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Delivers verification request broadcasts over an unbounded channel.
pub struct ChannelAgentTransport {
    outbound: mpsc::UnboundedSender<VerificationRequest>,
    grants: AtomicUsize,
}

impl ChannelAgentTransport {
    /// Create the transport and the receiving end the agent listens on.
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<VerificationRequest>) {
        let (outbound, inbound) = mpsc::unbounded_channel();
        (
            Self {
                outbound,
                grants: AtomicUsize::new(0),
            },
            inbound,
        )
    }

    /// Number of foreground allowance grants issued so far.
    #[must_use]
    pub fn grant_count(&self) -> usize {
        self.grants.load(Ordering::SeqCst)
    }
}

impl AgentTransport for ChannelAgentTransport {
    fn grant_foreground_allowance(&self, package: &str, duration: Duration) {
        self.grants.fetch_add(1, Ordering::SeqCst);
        debug!(
            package,
            duration_secs = duration.as_secs(),
            "Granted foreground allowance to verification agent"
        );
    }

    fn send_request(&self, request: VerificationRequest) {
        // Fire-and-forget: a closed agent queue means the broadcast is lost,
        // which is the same contract as an undeliverable platform broadcast.
        if self.outbound.send(request).is_err() {
            warn!("Agent queue closed; broadcast dropped");
        }
    }
}
