// Copyright 2025 Contributors to the Trustchain project.
// SPDX-License-Identifier: Apache-2.0

//! The orchestrator composes the attestation checks, the advisory
//! probes and the zero-trust evidence into one verification pass.
//!
//! A pass moves through: JWT + policy resolved (synchronous, blocking
//! for the caller), then the two probes settle independently in the
//! background, each writing into the verdict at most once.  Terminal
//! failure of JWT or policy verification never suppresses probing; the
//! hardware-trust and code-auditability axes are reported side by side.
//!
//! Consumers observe the verdict through a watch channel: every write is
//! a whole-value swap, so readers only ever see consistent snapshots,
//! and a change notification fires each time a pending field settles.
//! When the owning view is torn down, [`Orchestrator::cancel`] turns any
//! in-flight probe completion into a no-op.

use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::attestation::container::ContainerIdentity;
use crate::attestation::{container, jwt, policy, AttestationBundle};
use crate::crypto::CryptoProvider;
use crate::evidence::{self, AccessContext, BroadcastSnapshot, NetworkCallRecord, ZeroTrustEvidence};
use crate::probes::ghcr::{RegistryProbe, DEFAULT_GHCR_BASE};
use crate::probes::rekor::{TransparencyLogProbe, DEFAULT_REKOR_BASE};
use crate::verdict::VerificationVerdict;

pub struct Orchestrator {
    crypto: Arc<dyn CryptoProvider>,
    client: reqwest::Client,
    ghcr_base: String,
    rekor_base: String,
    cancel: CancellationToken,
    verdict: Arc<watch::Sender<VerificationVerdict>>,
    probes: Mutex<Vec<JoinHandle<()>>>,
}

impl Orchestrator {
    pub fn new(crypto: Arc<dyn CryptoProvider>, client: reqwest::Client) -> Self {
        let (tx, _) = watch::channel(VerificationVerdict::default());

        Self {
            crypto,
            client,
            ghcr_base: DEFAULT_GHCR_BASE.to_string(),
            rekor_base: DEFAULT_REKOR_BASE.to_string(),
            cancel: CancellationToken::new(),
            verdict: Arc::new(tx),
            probes: Mutex::new(Vec::new()),
        }
    }

    /// Override the probe endpoints (regional registries, tests).
    pub fn with_endpoints(
        mut self,
        ghcr_base: impl Into<String>,
        rekor_base: impl Into<String>,
    ) -> Self {
        self.ghcr_base = ghcr_base.into();
        self.rekor_base = rekor_base.into();
        self
    }

    /// Read-only snapshots plus a notification each time a pending field
    /// settles.
    pub fn subscribe(&self) -> watch::Receiver<VerificationVerdict> {
        self.verdict.subscribe()
    }

    pub fn snapshot(&self) -> VerificationVerdict {
        self.verdict.borrow().clone()
    }

    /// Invalidate this pass: probes not yet launched are never started,
    /// and in-flight probe completions become no-ops.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Run the synchronous phase (JWT, policy hash, container identity)
    /// and launch the background probes.  Returns the first verdict
    /// snapshot; probe results arrive through [`Orchestrator::subscribe`].
    pub async fn verify(&self, bundle: &AttestationBundle) -> VerificationVerdict {
        let jwt = jwt::check(&self.client, &bundle.token, &bundle.verify_at).await;
        let policy = policy::check(
            self.crypto.as_ref(),
            &bundle.policy.base64,
            bundle.summary.host_data.as_deref(),
        );
        let container = container::extract(&bundle.policy.decoded);

        self.verdict.send_modify(|v| {
            v.jwt = jwt.clone();
            v.policy = policy.clone();
            v.container = container.clone();
        });

        match container {
            Some(id) if !self.cancel.is_cancelled() => {
                self.spawn_registry_probe(id.clone());
                self.spawn_tlog_probe(id.digest_hex().to_string());
            }
            Some(_) => {
                debug!("pass cancelled; probes not started");
            }
            None => {
                // no identity to probe; both fields stay Pending rather
                // than being conflated with a negative answer
                debug!("no container identity in policy; probes not started");
            }
        }

        self.snapshot()
    }

    /// Build the zero-trust evidence bundle for the current access
    /// context.  Purely local.
    pub fn zero_trust(
        &self,
        ctx: &AccessContext,
        broadcast: Option<&BroadcastSnapshot>,
        records: &[NetworkCallRecord],
    ) -> ZeroTrustEvidence {
        evidence::build(self.crypto.as_ref(), ctx, broadcast, records)
    }

    /// Wait for any launched probes to settle (or be cancelled).
    pub async fn join_probes(&self) {
        let handles: Vec<JoinHandle<()>> = self
            .probes
            .lock()
            .expect("probe registry poisoned")
            .drain(..)
            .collect();

        for h in handles {
            let _ = h.await;
        }
    }

    fn spawn_registry_probe(&self, id: ContainerIdentity) {
        let probe = RegistryProbe::with_base_url(self.client.clone(), self.ghcr_base.clone());
        let tx = Arc::clone(&self.verdict);
        let cancel = self.cancel.clone();

        self.track(tokio::spawn(async move {
            let status = tokio::select! {
                _ = cancel.cancelled() => return,
                s = probe.probe(&id) => s,
            };

            if cancel.is_cancelled() {
                return;
            }

            tx.send_modify(|v| {
                if v.ghcr.is_pending() {
                    v.ghcr = status;
                }
            });
        }));
    }

    fn spawn_tlog_probe(&self, digest_hex: String) {
        let probe = TransparencyLogProbe::with_base_url(self.client.clone(), self.rekor_base.clone());
        let tx = Arc::clone(&self.verdict);
        let cancel = self.cancel.clone();

        self.track(tokio::spawn(async move {
            let status = tokio::select! {
                _ = cancel.cancelled() => return,
                s = probe.probe(&digest_hex) => s,
            };

            if cancel.is_cancelled() {
                return;
            }

            tx.send_modify(|v| {
                if v.sigstore.is_pending() {
                    v.sigstore = status;
                }
            });
        }));
    }

    fn track(&self, handle: JoinHandle<()>) {
        self.probes
            .lock()
            .expect("probe registry poisoned")
            .push(handle);
    }
}
