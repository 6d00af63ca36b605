// Copyright 2025 Contributors to the Trustchain project.
// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

/// The evidence blob fetched from the verifier's attestation endpoint.
/// Immutable once fetched; owned by the orchestrator for the duration of
/// one verification pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttestationBundle {
    /// Compact JWT issued by the attestation service
    pub token: String,

    /// JWKS endpoint the bundle claims the token is verifiable at
    pub verify_at: String,

    pub policy: PolicyDocument,

    pub summary: HardwareSummary,
}

/// The deployed policy, both as the raw bytes the hardware measured
/// (base64) and as inspectable text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyDocument {
    pub base64: String,
    pub decoded: String,
}

/// Hardware-reported facts about the attested environment.  Only
/// `host_data` is trust-bearing for this engine; the rest is carried for
/// display.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HardwareSummary {
    #[serde(default)]
    pub attestation_type: Option<String>,

    #[serde(default)]
    pub debug_disabled: bool,

    #[serde(default)]
    pub compliance_status: Option<String>,

    /// Hex digest the hardware measured over the policy document
    #[serde(default)]
    pub host_data: Option<String>,

    #[serde(default)]
    pub issuer: Option<String>,

    #[serde(default)]
    pub cce_policy_hash: Option<String>,

    #[serde(default)]
    pub tls_pubkey_hash: Option<String>,
}
