//! # Verification Protocol Flows
//!
//! End-to-end tests of the request/response protocol through the real
//! runtime adapters: in-memory store, channel transport, tokio connection,
//! and the message pump.
//!
//! ## Flows Tested
//!
//! 1. **Dispatch**: declared subjects get one broadcast each, undeclared
//!    subjects are skipped
//! 2. **Correlation**: replies are honored once, against the captured set id
//! 3. **Supersession and withdrawal**: only the newest outstanding request
//!    per subject is honored
//! 4. **Two-outcome update**: accepted and rejected host sets land
//!    independently
//! 5. **Capability boundary**: results from untrusted uids never reach the
//!    handler

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::mpsc;
    use tokio::time::timeout;

    use alv_proxy::events::{ProxyMessage, VerificationRequest};
    use alv_proxy::ipc::AgentResponseIntake;
    use alv_proxy::ports::outbound::VerificationStore;
    use alv_proxy::{ProxyError, VerificationProxyApi, VerificationProxyService};
    use alv_runtime::adapters::{
        ChannelAgentTransport, InMemoryVerificationStore, TokioProxyConnection, UidRegistry,
    };
    use alv_runtime::{wiring, RuntimeConfig};
    use shared_types::{
        DeclaredSet, HostName, StoreError, SubjectName, VerificationSetId, VerificationState,
    };

    type Service = VerificationProxyService<
        InMemoryVerificationStore,
        InMemoryVerificationStore,
        ChannelAgentTransport,
        TokioProxyConnection,
    >;

    // =========================================================================
    // TEST FIXTURES
    // =========================================================================

    /// Full wiring with the pump driven manually for deterministic ordering.
    struct Harness {
        config: RuntimeConfig,
        store: Arc<InMemoryVerificationStore>,
        service: Arc<Service>,
        intake: AgentResponseIntake<TokioProxyConnection>,
        broadcasts: mpsc::UnboundedReceiver<VerificationRequest>,
        pump_rx: mpsc::UnboundedReceiver<ProxyMessage>,
    }

    impl Harness {
        fn new() -> Self {
            let config = RuntimeConfig::default();
            let store = Arc::new(InMemoryVerificationStore::new());

            let registry = Arc::new(UidRegistry::new());
            registry.register(config.verifier.uid, &config.verifier.package);

            let (transport, broadcasts) = ChannelAgentTransport::new();
            let transport = Arc::new(transport);

            let (pump_tx, pump_rx) = mpsc::unbounded_channel();
            let connection = Arc::new(TokioProxyConnection::new(pump_tx, registry));

            let service = Arc::new(VerificationProxyService::new(
                config.proxy_config(),
                Arc::clone(&store),
                Arc::clone(&store),
                transport,
                Arc::clone(&connection),
            ));
            let intake = AgentResponseIntake::new(connection, config.verifier.package.clone());

            Self {
                config,
                store,
                service,
                intake,
                broadcasts,
                pump_rx,
            }
        }

        /// Drain every scheduled message into the proxy, as the pump would.
        fn pump_all(&mut self) {
            while let Ok(message) = self.pump_rx.try_recv() {
                assert!(self.service.run_message(message));
            }
        }

        fn request(&mut self, subjects: &[&str]) {
            self.service
                .request_verification(subjects.iter().map(|s| s.to_string()).collect());
            self.pump_all();
        }

        async fn next_broadcast(&mut self) -> VerificationRequest {
            timeout(Duration::from_millis(100), self.broadcasts.recv())
                .await
                .expect("timeout waiting for broadcast")
                .expect("broadcast channel closed")
        }

        fn no_more_broadcasts(&mut self) -> bool {
            self.broadcasts.try_recv().is_err()
        }

        fn reply(&mut self, request: &VerificationRequest, failed: &[&str]) {
            self.intake
                .queue_verify_result(
                    self.config.verifier.uid,
                    request.token,
                    1,
                    failed.iter().map(|h| h.to_string()).collect(),
                )
                .expect("verifier reply rejected");
            self.pump_all();
        }
    }

    // =========================================================================
    // DISPATCH
    // =========================================================================

    #[tokio::test]
    async fn test_request_dispatches_only_declared_subjects() {
        let mut hx = Harness::new();
        hx.store.declare("com.example.a", ["a.com", "b.a.com"]);
        // "com.example.b" has no declared verification set.

        hx.request(&["com.example.a", "com.example.b"]);

        let broadcast = hx.next_broadcast().await;
        assert_eq!(broadcast.subject, "com.example.a");
        assert_eq!(broadcast.hosts, "a.com b.a.com");
        assert_eq!(broadcast.scheme, "https");
        assert!(hx.no_more_broadcasts());
        assert_eq!(hx.service.index().pending_count(), 1);
    }

    #[tokio::test]
    async fn test_empty_declaration_still_broadcast() {
        let mut hx = Harness::new();
        hx.store.declare("com.example.bare", Vec::<String>::new());

        hx.request(&["com.example.bare"]);

        let broadcast = hx.next_broadcast().await;
        assert_eq!(broadcast.hosts, "");
        assert_eq!(hx.service.index().pending_count(), 1);
    }

    // =========================================================================
    // CORRELATION AND THE TWO-OUTCOME UPDATE
    // =========================================================================

    #[tokio::test]
    async fn test_round_trip_applies_two_outcome_update() {
        let mut hx = Harness::new();
        hx.store.declare("com.example.a", ["a.com", "b.com"]);

        hx.request(&["com.example.a"]);
        let broadcast = hx.next_broadcast().await;

        hx.reply(&broadcast, &["b.com"]);

        assert_eq!(
            hx.store.host_state("com.example.a", "a.com"),
            Some(VerificationState::Success)
        );
        assert_eq!(
            hx.store.host_state("com.example.a", "b.com"),
            Some(VerificationState::LegacyFailure)
        );
        assert_eq!(hx.service.index().pending_count(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_reply_is_noop() {
        let mut hx = Harness::new();
        hx.store.declare("com.example.a", ["a.com"]);

        hx.request(&["com.example.a"]);
        let broadcast = hx.next_broadcast().await;

        hx.reply(&broadcast, &[]);
        assert_eq!(
            hx.store.host_state("com.example.a", "a.com"),
            Some(VerificationState::Success)
        );

        // Same token again, now claiming the host failed. The token was
        // consumed by the first delivery, so nothing may change.
        hx.reply(&broadcast, &["a.com"]);
        assert_eq!(
            hx.store.host_state("com.example.a", "a.com"),
            Some(VerificationState::Success)
        );
    }

    #[tokio::test]
    async fn test_stale_set_id_drops_reply() {
        let mut hx = Harness::new();
        hx.store.declare("com.example.a", ["a.com"]);

        hx.request(&["com.example.a"]);
        let broadcast = hx.next_broadcast().await;

        // Redeclaration between request and reply rotates the set id.
        hx.store.declare("com.example.a", ["a.com"]);

        hx.reply(&broadcast, &[]);

        assert_eq!(
            hx.store.host_state("com.example.a", "a.com"),
            Some(VerificationState::NoResponse)
        );
        assert_eq!(hx.service.index().pending_count(), 0);
    }

    // =========================================================================
    // SUPERSESSION AND WITHDRAWAL
    // =========================================================================

    #[tokio::test]
    async fn test_supersession_honors_newest_token_only() {
        let mut hx = Harness::new();
        hx.store.declare("com.example.a", ["a.com"]);

        hx.request(&["com.example.a"]);
        let first = hx.next_broadcast().await;

        hx.request(&["com.example.a"]);
        let second = hx.next_broadcast().await;

        assert_ne!(first.token, second.token);
        assert_eq!(hx.service.index().pending_count(), 1);

        // The superseded token was purged; its reply is a no-op.
        hx.reply(&first, &[]);
        assert_eq!(
            hx.store.host_state("com.example.a", "a.com"),
            Some(VerificationState::NoResponse)
        );

        hx.reply(&second, &[]);
        assert_eq!(
            hx.store.host_state("com.example.a", "a.com"),
            Some(VerificationState::Success)
        );
    }

    #[tokio::test]
    async fn test_withdrawn_subject_reply_is_noop() {
        let mut hx = Harness::new();
        hx.store.declare("com.example.a", ["a.com"]);

        hx.request(&["com.example.a"]);
        let broadcast = hx.next_broadcast().await;

        let withdrawn: BTreeSet<SubjectName> = ["com.example.a".to_string()].into();
        hx.service.subjects_withdrawn(&withdrawn);
        hx.store.remove("com.example.a");
        assert_eq!(hx.service.index().pending_count(), 0);

        // Reply already in flight when the subject was withdrawn.
        hx.reply(&broadcast, &[]);
        assert_eq!(hx.store.host_state("com.example.a", "a.com"), None);
    }

    // =========================================================================
    // CAPABILITY BOUNDARY
    // =========================================================================

    #[tokio::test]
    async fn test_untrusted_uid_rejected_before_handling() {
        let mut hx = Harness::new();
        hx.store.declare("com.example.a", ["a.com"]);

        hx.request(&["com.example.a"]);
        let broadcast = hx.next_broadcast().await;

        let result =
            hx.intake
                .queue_verify_result(4242, broadcast.token, 1, vec!["a.com".to_string()]);
        assert_eq!(result, Err(ProxyError::UntrustedCaller { uid: 4242 }));

        // Nothing was scheduled; the token is still pending and the store
        // untouched.
        assert!(hx.pump_rx.try_recv().is_err());
        assert!(hx.service.index().is_pending(broadcast.token));
        assert_eq!(
            hx.store.host_state("com.example.a", "a.com"),
            Some(VerificationState::NoResponse)
        );
    }

    // =========================================================================
    // HALF-UPDATE RESILIENCE
    // =========================================================================

    /// Store wrapper that fails `apply_status` for one outcome state.
    struct FailingStore {
        inner: Arc<InMemoryVerificationStore>,
        fail_state: VerificationState,
    }

    impl VerificationStore for FailingStore {
        fn current_set_id(&self, subject: &str) -> Option<VerificationSetId> {
            self.inner.current_set_id(subject)
        }

        fn declared_set(&self, subject: &str) -> Result<DeclaredSet, StoreError> {
            self.inner.declared_set(subject)
        }

        fn apply_status(
            &self,
            origin_uid: u32,
            set_id: VerificationSetId,
            hosts: BTreeSet<HostName>,
            state: VerificationState,
        ) -> Result<(), StoreError> {
            if state == self.fail_state {
                return Err(StoreError::InvalidSet { set_id });
            }
            self.inner.apply_status(origin_uid, set_id, hosts, state)
        }
    }

    #[tokio::test]
    async fn test_accepted_half_failure_does_not_block_rejected_half() {
        let config = RuntimeConfig::default();
        let inner = Arc::new(InMemoryVerificationStore::new());
        inner.declare("com.example.a", ["a.com", "b.com"]);
        let store = Arc::new(FailingStore {
            inner: Arc::clone(&inner),
            fail_state: VerificationState::Success,
        });

        let registry = Arc::new(UidRegistry::new());
        registry.register(config.verifier.uid, &config.verifier.package);
        let (transport, mut broadcasts) = ChannelAgentTransport::new();
        let (pump_tx, mut pump_rx) = mpsc::unbounded_channel();
        let connection = Arc::new(TokioProxyConnection::new(pump_tx, registry));

        let service = VerificationProxyService::new(
            config.proxy_config(),
            store,
            Arc::clone(&inner),
            Arc::new(transport),
            Arc::clone(&connection),
        );
        let intake = AgentResponseIntake::new(connection, config.verifier.package.clone());

        service.request_verification(["com.example.a".to_string()].into());
        while let Ok(message) = pump_rx.try_recv() {
            assert!(service.run_message(message));
        }
        let broadcast = broadcasts.try_recv().expect("broadcast not sent");

        intake
            .queue_verify_result(
                config.verifier.uid,
                broadcast.token,
                1,
                vec!["b.com".to_string()],
            )
            .unwrap();
        while let Ok(message) = pump_rx.try_recv() {
            assert!(service.run_message(message));
        }

        // The accepted half (Success) failed; the rejected half still landed.
        assert_eq!(
            inner.host_state("com.example.a", "a.com"),
            Some(VerificationState::NoResponse)
        );
        assert_eq!(
            inner.host_state("com.example.a", "b.com"),
            Some(VerificationState::LegacyFailure)
        );
    }

    // =========================================================================
    // LIVE PUMP
    // =========================================================================

    #[tokio::test]
    async fn test_live_pump_with_loopback_agent() {
        let config = RuntimeConfig::default();
        let store = Arc::new(InMemoryVerificationStore::new());
        store.declare("com.example.a", ["a.com", "b.a.com"]);
        store.declare("com.example.b", ["b.com"]);

        let registry = Arc::new(UidRegistry::new());
        registry.register(config.verifier.uid, &config.verifier.package);
        let (transport, mut broadcasts) = ChannelAgentTransport::new();
        let (pump_tx, pump_rx) = mpsc::unbounded_channel();
        let connection = Arc::new(TokioProxyConnection::new(pump_tx, registry));

        let service = Arc::new(VerificationProxyService::new(
            config.proxy_config(),
            Arc::clone(&store),
            Arc::clone(&store),
            Arc::new(transport),
            Arc::clone(&connection),
        ));
        let pump = wiring::spawn_message_pump(Arc::clone(&service), pump_rx);

        let intake =
            AgentResponseIntake::new(Arc::clone(&connection), config.verifier.package.clone());
        let agent_uid = config.verifier.uid;
        let agent = tokio::spawn(async move {
            while let Some(request) = broadcasts.recv().await {
                intake
                    .queue_verify_result(agent_uid, request.token, 1, vec![])
                    .unwrap();
            }
        });

        service.request_verification(
            ["com.example.a".to_string(), "com.example.b".to_string()].into(),
        );

        // Wait for both replies to drain through the pump. The dispatch
        // itself is asynchronous, so watch the store rather than the index.
        let all_verified = |store: &InMemoryVerificationStore| {
            [
                ("com.example.a", "a.com"),
                ("com.example.a", "b.a.com"),
                ("com.example.b", "b.com"),
            ]
            .iter()
            .all(|(subject, host)| {
                store.host_state(subject, host) == Some(VerificationState::Success)
            })
        };
        for _ in 0..100 {
            tokio::time::sleep(Duration::from_millis(10)).await;
            if all_verified(&store) {
                break;
            }
        }

        assert_eq!(
            store.host_state("com.example.a", "a.com"),
            Some(VerificationState::Success)
        );
        assert_eq!(
            store.host_state("com.example.a", "b.a.com"),
            Some(VerificationState::Success)
        );
        assert_eq!(
            store.host_state("com.example.b", "b.com"),
            Some(VerificationState::Success)
        );

        agent.abort();
        pump.abort();
    }
}
