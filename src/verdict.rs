// Copyright 2025 Contributors to the Trustchain project.
// SPDX-License-Identifier: Apache-2.0

//! The aggregate verification verdict.
//!
//! Sub-results are tagged variants rather than nullable-field bags so
//! "pending", "failed" and "succeeded" stay exhaustively distinguishable:
//! a consumer can never mistake an unanswered probe for a negative one.

use serde::Serialize;

use crate::attestation::container::ContainerIdentity;
use crate::attestation::jwt::JwtCheck;
use crate::attestation::policy::PolicyCheck;

/// Outcome of the registry probe.  `Pending` is the initial state and is
/// never re-entered once a probe settles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ProbeStatus {
    Pending,
    Verified,
    Failed { error: String },
}

impl ProbeStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, ProbeStatus::Pending)
    }

    /// `None` while pending, `Some(bool)` once settled.
    pub fn verified(&self) -> Option<bool> {
        match self {
            ProbeStatus::Pending => None,
            ProbeStatus::Verified => Some(true),
            ProbeStatus::Failed { .. } => Some(false),
        }
    }
}

/// Outcome of the transparency-log probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TlogStatus {
    Pending,
    Verified {
        /// Number of log entries found for the digest
        entries: usize,
        /// Deep link for manual inspection
        rekor_url: String,
        /// Entry type, lifted best-effort from the first entry body
        #[serde(skip_serializing_if = "Option::is_none")]
        kind: Option<String>,
    },
    Failed {
        error: String,
    },
}

impl TlogStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, TlogStatus::Pending)
    }

    pub fn verified(&self) -> Option<bool> {
        match self {
            TlogStatus::Pending => None,
            TlogStatus::Verified { .. } => Some(true),
            TlogStatus::Failed { .. } => Some(false),
        }
    }
}

/// One verification pass's result.  Written synchronously once (JWT,
/// policy, container) and then at most once more by each background
/// probe; consumers only ever see whole-object snapshots.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerificationVerdict {
    pub jwt: JwtCheck,
    pub policy: PolicyCheck,
    pub container: Option<ContainerIdentity>,
    pub ghcr: ProbeStatus,
    pub sigstore: TlogStatus,
}

impl Default for VerificationVerdict {
    fn default() -> Self {
        Self {
            jwt: JwtCheck::default(),
            policy: PolicyCheck::default(),
            container: None,
            ghcr: ProbeStatus::Pending,
            sigstore: TlogStatus::Pending,
        }
    }
}
