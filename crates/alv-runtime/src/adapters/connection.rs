//! Scheduling and capability adapter.
//!
//! `schedule` posts messages onto the pump channel drained by
//! [`crate::wiring::spawn_message_pump`]; `is_caller_package` consults a
//! uid-to-package registry, the runtime's stand-in for the platform's
//! package-identity lookup.

use alv_proxy::events::ProxyMessage;
use alv_proxy::ports::outbound::ProxyConnection;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::warn;

/// Uid to package-name registry.
#[derive(Default)]
pub struct UidRegistry {
    entries: RwLock<HashMap<u32, String>>,
}

impl UidRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `uid` belongs to `package`.
    pub fn register(&self, uid: u32, package: &str) {
        self.entries.write().insert(uid, package.to_string());
    }

    /// Whether `uid` is registered for `package`.
    #[must_use]
    pub fn is_registered(&self, uid: u32, package: &str) -> bool {
        self.entries
            .read()
            .get(&uid)
            .is_some_and(|registered| registered == package)
    }
}

/// Connection backed by the tokio message pump.
pub struct TokioProxyConnection {
    queue: mpsc::UnboundedSender<ProxyMessage>,
    registry: Arc<UidRegistry>,
}

impl TokioProxyConnection {
    #[must_use]
    pub fn new(queue: mpsc::UnboundedSender<ProxyMessage>, registry: Arc<UidRegistry>) -> Self {
        Self { queue, registry }
    }
}

impl ProxyConnection for TokioProxyConnection {
    fn schedule(&self, message: ProxyMessage) {
        if self.queue.send(message).is_err() {
            warn!("Message pump stopped; scheduled message dropped");
        }
    }

    fn is_caller_package(&self, uid: u32, package: &str) -> bool {
        self.registry.is_registered(uid, package)
    }
}
