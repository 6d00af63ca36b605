// Copyright 2025 Contributors to the Trustchain project.
// SPDX-License-Identifier: Apache-2.0

//! Zero-trust evidence: proof artifacts the client can reconstruct
//! locally (key fingerprints, broadcast lookups, the station's Ed25519
//! signature, submit-key ownership records) so that no claim made by the
//! verifier service has to be taken at face value.

pub use self::broadcast::{BannedStation, BroadcastSnapshot, VerifiedStation};
pub use self::ownership::{
    NetworkCallRecord, OwnershipContext, OwnershipOutcome, SubmitKeyProof, KEY_HASH_PREFIX_LEN,
};
pub use self::station::StationSignature;

pub mod broadcast;
pub mod ownership;
pub mod station;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::crypto::CryptoProvider;

/// Read-only snapshot of the session's access credentials, taken once
/// per verification pass.  Staleness is acceptable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessContext {
    pub station_id: String,
    pub api_key: String,
    pub expires_at_unix: i64,
    /// Hex Ed25519 signature over `stationId|apiKey|expiresAtUnix`
    pub station_signature: String,
    #[serde(default)]
    pub org_signature: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub submit_key_proof: Option<SubmitKeyProof>,
}

/// Derived, read-only evidence bundle handed to the UI alongside the
/// verdict.
#[derive(Debug, Clone, Serialize)]
pub struct ZeroTrustEvidence {
    /// First [`KEY_HASH_PREFIX_LEN`] hex chars of SHA-256 of the raw key
    pub key_hash_prefix: String,
    pub station_verified_in_broadcast: bool,
    pub station_banned_in_broadcast: bool,
    pub matched_record: Option<VerifiedStation>,
    pub local_station_signature: StationSignature,
    pub submit_key_ownership: OwnershipOutcome,
}

/// Build the evidence bundle from the access context, the latest
/// broadcast snapshot and the session's network-call history.  Purely
/// local; never errors, never writes.
pub fn build(
    provider: &dyn CryptoProvider,
    ctx: &AccessContext,
    broadcast: Option<&BroadcastSnapshot>,
    records: &[NetworkCallRecord],
) -> ZeroTrustEvidence {
    let key_hash_prefix = provider
        .sha256_hex(ctx.api_key.as_bytes())
        .map(|h| h[..KEY_HASH_PREFIX_LEN].to_string())
        .unwrap_or_default();

    let lookup = broadcast.map(|b| b.lookup(&ctx.station_id));
    let matched_record = lookup.and_then(|l| l.verified).cloned();
    let station_banned_in_broadcast = lookup.and_then(|l| l.banned).is_some();

    let local_station_signature = match &matched_record {
        Some(rec) => station::verify(
            provider,
            &ctx.station_id,
            &ctx.api_key,
            ctx.expires_at_unix,
            &ctx.station_signature,
            &rec.public_key,
        )
        .unwrap_or_else(|e| {
            warn!(station = %ctx.station_id, "station signature input rejected: {e:?}");
            StationSignature {
                supported: provider.ed25519_supported(),
                verified: None,
                error: Some(format!("{e:?}")),
            }
        }),
        None => StationSignature {
            supported: provider.ed25519_supported(),
            verified: None,
            error: Some("No broadcast public key for station".to_string()),
        },
    };

    let submit_key_ownership = ownership::correlate(
        records,
        ctx.submit_key_proof.as_ref(),
        &OwnershipContext {
            station_id: &ctx.station_id,
            session_id: ctx.session_id.as_deref(),
            key_hash_prefix: &key_hash_prefix,
        },
    );

    ZeroTrustEvidence {
        key_hash_prefix,
        station_verified_in_broadcast: matched_record.is_some(),
        station_banned_in_broadcast,
        matched_record,
        local_station_signature,
        submit_key_ownership,
    }
}
