//! Value objects for proxy configuration and broadcast assembly.

use shared_types::HostName;
use std::collections::BTreeSet;
use std::time::Duration;

/// URI scheme the agent is asked to verify hosts against.
pub const SCHEME_HTTPS: &str = "https";

/// Separator used when joining a subject's hosts for transport.
pub const HOSTS_SEPARATOR: &str = " ";

/// Verification proxy configuration.
#[derive(Clone, Debug)]
pub struct ProxyConfig {
    /// Package name of the registered verification agent. Responses from any
    /// other caller are rejected at the transport boundary.
    pub verifier_package: String,
    /// How long the agent's process is granted foreground allowance per
    /// dispatch batch, so a slow agent is not killed before it can reply.
    pub allowlist_duration: Duration,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            verifier_package: "com.applink.verifier".to_string(),
            allowlist_duration: Duration::from_secs(5 * 60),
        }
    }
}

/// Join a subject's collected hosts into the delimited transport form.
///
/// `BTreeSet` iteration keeps the joined string deterministic. An empty set
/// yields an empty string; the agent is expected to handle that gracefully.
#[must_use]
pub fn join_hosts(hosts: &BTreeSet<HostName>) -> String {
    hosts
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(HOSTS_SEPARATOR)
}
