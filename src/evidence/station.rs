// Copyright 2025 Contributors to the Trustchain project.
// SPDX-License-Identifier: Apache-2.0

//! Station signature verification.
//!
//! The station signs the canonical message `stationId|apiKey|expiresAt`
//! with its Ed25519 key; we verify against the public key published in
//! the broadcast registry.  Once broadcast data is cached this runs
//! entirely offline, so it introduces no additional network trust.

use serde::Serialize;

use crate::crypto::{CryptoError, CryptoProvider, SignatureVerdict};
use crate::errors::Error;

/// Three-way outcome: `supported=false` means the runtime cannot check
/// (not a verification failure); `verified` stays `None` until the
/// primitive actually ran.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StationSignature {
    pub supported: bool,
    pub verified: Option<bool>,
    pub error: Option<String>,
}

/// The exact byte string the station signed.
pub fn canonical_message(station_id: &str, api_key: &str, expires_at_unix: i64) -> String {
    format!("{station_id}|{api_key}|{expires_at_unix}")
}

/// Verify the station's signature over the locally-reconstructed
/// message.  Non-hex or odd-length signature/key input is a format
/// error; a signature the primitive rejects is a mismatch, not an error.
pub fn verify(
    provider: &dyn CryptoProvider,
    station_id: &str,
    api_key: &str,
    expires_at_unix: i64,
    signature_hex: &str,
    public_key_hex: &str,
) -> Result<StationSignature, Error> {
    let signature = hex::decode(signature_hex)
        .map_err(|e| Error::Format(format!("Invalid signature hex: {e}")))?;
    let public_key = hex::decode(public_key_hex)
        .map_err(|e| Error::Format(format!("Invalid public key hex: {e}")))?;

    if !provider.ed25519_supported() {
        return Ok(StationSignature {
            supported: false,
            verified: None,
            error: None,
        });
    }

    let message = canonical_message(station_id, api_key, expires_at_unix);

    match provider.verify_ed25519(&public_key, message.as_bytes(), &signature) {
        Ok(SignatureVerdict::Valid) => Ok(StationSignature {
            supported: true,
            verified: Some(true),
            error: None,
        }),
        Ok(SignatureVerdict::Invalid { reason }) => Ok(StationSignature {
            supported: true,
            verified: Some(false),
            error: Some(format!("Signature mismatch: {reason}")),
        }),
        Err(CryptoError::UnsupportedAlgorithm(_)) => Ok(StationSignature {
            supported: false,
            verified: None,
            error: None,
        }),
        Err(e) => Err(Error::Format(format!("{e}"))),
    }
}
