//! Message pump wiring.
//!
//! Deferred messages (dispatch batches and agent responses) are drained by a
//! dedicated task, so neither the requesting caller nor the agent's reply
//! path ever blocks on handling.

use alv_proxy::events::ProxyMessage;
use alv_proxy::VerificationProxyApi;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Spawn the task that drains scheduled messages into the proxy.
///
/// The task ends when every sender for `receiver` has been dropped.
pub fn spawn_message_pump<P>(
    service: Arc<P>,
    mut receiver: mpsc::UnboundedReceiver<ProxyMessage>,
) -> JoinHandle<()>
where
    P: VerificationProxyApi + 'static,
{
    tokio::spawn(async move {
        while let Some(message) = receiver.recv().await {
            let code = message.code;
            if !service.run_message(message) {
                warn!(code, "Dropping message with unrecognized code");
            }
        }
        debug!("Message pump stopped");
    })
}
