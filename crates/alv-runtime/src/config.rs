//! # Runtime Configuration
//!
//! Configuration for the verification runtime. All fields have sane defaults
//! with environment-variable overrides:
//!
//! - `ALV_VERIFIER_PACKAGE` - package name of the verification agent
//! - `ALV_VERIFIER_UID` - uid the agent submits results under
//! - `ALV_ALLOWLIST_SECS` - foreground allowance duration per dispatch batch

use alv_proxy::ProxyConfig;
use std::time::Duration;

/// Complete runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Verification agent identity.
    pub verifier: VerifierConfig,
    /// Broadcast dispatch parameters.
    pub broadcast: BroadcastConfig,
}

impl RuntimeConfig {
    /// Defaults, with any environment overrides applied.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(package) = std::env::var("ALV_VERIFIER_PACKAGE") {
            config.verifier.package = package;
        }
        if let Some(uid) = env_parse("ALV_VERIFIER_UID") {
            config.verifier.uid = uid;
        }
        if let Some(secs) = env_parse("ALV_ALLOWLIST_SECS") {
            config.broadcast.allowlist_duration_secs = secs;
        }
        config
    }

    /// The proxy-facing view of this configuration.
    #[must_use]
    pub fn proxy_config(&self) -> ProxyConfig {
        ProxyConfig {
            verifier_package: self.verifier.package.clone(),
            allowlist_duration: Duration::from_secs(self.broadcast.allowlist_duration_secs),
        }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            verifier: VerifierConfig::default(),
            broadcast: BroadcastConfig::default(),
        }
    }
}

/// Identity of the registered verification agent.
#[derive(Debug, Clone)]
pub struct VerifierConfig {
    /// Package name responses are authorized against.
    pub package: String,
    /// Uid the agent's process runs as.
    pub uid: u32,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            package: "com.applink.verifier".to_string(),
            uid: 10_100,
        }
    }
}

/// Broadcast dispatch parameters.
#[derive(Debug, Clone)]
pub struct BroadcastConfig {
    /// Foreground allowance granted to the agent per dispatch batch, in
    /// seconds.
    pub allowlist_duration_secs: u64,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            // Matches the platform default for temporary allow-list grants.
            allowlist_duration_secs: 5 * 60,
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|raw| raw.parse().ok())
}
