// Copyright 2025 Contributors to the Trustchain project.
// SPDX-License-Identifier: Apache-2.0

//! Capability-less provider: hashes work, Ed25519 does not.  Used to
//! exercise the "cannot check" paths without patching the runtime.

use openssl::hash::{hash, MessageDigest};

use super::errors::CryptoError;
use super::{CryptoProvider, SignatureVerdict};

pub struct StubProvider;

impl CryptoProvider for StubProvider {
    fn sha256(&self, data: &[u8]) -> Result<Vec<u8>, CryptoError> {
        hash(MessageDigest::sha256(), data)
            .map(|d| d.to_vec())
            .map_err(|e| CryptoError::HashCalculateFail(format!("{e:?}")))
    }

    fn ed25519_supported(&self) -> bool {
        false
    }

    fn verify_ed25519(
        &self,
        _public_key: &[u8],
        _message: &[u8],
        _signature: &[u8],
    ) -> Result<SignatureVerdict, CryptoError> {
        Err(CryptoError::UnsupportedAlgorithm("ed25519".to_string()))
    }
}
