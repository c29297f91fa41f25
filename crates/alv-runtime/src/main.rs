//! # AppLink-Verify Runtime
//!
//! Development harness for the verification proxy: wires the proxy to the
//! in-memory store, the channel transport, and the message pump, then runs a
//! loopback agent that answers every broadcast. Hosts under the
//! `invalid.` prefix are reported as failed so both halves of the
//! two-outcome update are exercised.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use alv_proxy::events::VerificationRequest;
use alv_proxy::ipc::AgentResponseIntake;
use alv_proxy::ports::outbound::{HostCollector, ProxyConnection};
use alv_proxy::{VerificationProxyApi, VerificationProxyService};
use alv_runtime::adapters::{
    ChannelAgentTransport, InMemoryVerificationStore, TokioProxyConnection, UidRegistry,
};
use alv_runtime::{wiring, RuntimeConfig};
use shared_types::{HostName, SubjectName};

/// Answers every verification broadcast, failing hosts under `invalid.`.
async fn loopback_agent<N: ProxyConnection + 'static>(
    mut broadcasts: mpsc::UnboundedReceiver<VerificationRequest>,
    intake: AgentResponseIntake<N>,
    agent_uid: u32,
) {
    while let Some(request) = broadcasts.recv().await {
        let failed: Vec<HostName> = request
            .hosts
            .split_whitespace()
            .filter(|host| host.starts_with("invalid."))
            .map(str::to_string)
            .collect();
        info!(
            token = %request.token,
            subject = %request.subject,
            failed = failed.len(),
            "Agent answering verification request"
        );
        if let Err(err) = intake.queue_verify_result(agent_uid, request.token, 1, failed) {
            warn!(%err, "Verification result rejected");
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::DEBUG)
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Load configuration
    let config = RuntimeConfig::from_env();
    info!(
        verifier = %config.verifier.package,
        uid = config.verifier.uid,
        "Starting AppLink-Verify runtime"
    );

    // Seed the store with a few declared subjects.
    let store = Arc::new(InMemoryVerificationStore::new());
    store.declare(
        "com.example.browser",
        ["example.com", "www.example.com"],
    );
    store.declare(
        "com.example.shop",
        ["shop.example.com", "invalid.example.org"],
    );

    let registry = Arc::new(UidRegistry::new());
    registry.register(config.verifier.uid, &config.verifier.package);

    let (transport, broadcasts) = ChannelAgentTransport::new();
    let transport = Arc::new(transport);

    let (pump_tx, pump_rx) = mpsc::unbounded_channel();
    let connection = Arc::new(TokioProxyConnection::new(pump_tx, Arc::clone(&registry)));

    let service = Arc::new(VerificationProxyService::new(
        config.proxy_config(),
        Arc::clone(&store),
        Arc::clone(&store),
        Arc::clone(&transport),
        Arc::clone(&connection),
    ));

    let pump = wiring::spawn_message_pump(Arc::clone(&service), pump_rx);
    let intake = AgentResponseIntake::new(Arc::clone(&connection), config.verifier.package.clone());
    let agent = tokio::spawn(loopback_agent(broadcasts, intake, config.verifier.uid));

    // Kick off verification for everything we declared.
    let subjects: BTreeSet<SubjectName> = [
        "com.example.browser".to_string(),
        "com.example.shop".to_string(),
    ]
    .into();
    service.request_verification(subjects.clone());

    // Wait for the agent's replies to drain. Dispatch happens on the pump
    // task, so watch the store for terminal states rather than the index.
    let settled = |store: &InMemoryVerificationStore| {
        ["com.example.browser", "com.example.shop"].iter().all(|subject| {
            store
                .collect_hosts(subject)
                .iter()
                .all(|host| store.host_state(subject, host).is_some_and(|s| s.is_terminal()))
        })
    };
    for _ in 0..100 {
        tokio::time::sleep(Duration::from_millis(20)).await;
        if settled(&store) {
            break;
        }
    }

    for subject in &subjects {
        for host in store.collect_hosts(subject) {
            let state = store.host_state(subject, &host);
            info!(subject = %subject, host = %host, state = ?state, "Final verification state");
        }
    }

    agent.abort();
    pump.abort();
    Ok(())
}
