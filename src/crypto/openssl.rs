// Copyright 2025 Contributors to the Trustchain project.
// SPDX-License-Identifier: Apache-2.0

//! Production [`CryptoProvider`] backed by `openssl`.

use openssl::hash::{hash, MessageDigest};
use openssl::pkey::{Id, PKey};
use openssl::sign::Verifier;

use super::errors::CryptoError;
use super::{CryptoProvider, SignatureVerdict};

pub struct OpensslProvider;

impl CryptoProvider for OpensslProvider {
    fn sha256(&self, data: &[u8]) -> Result<Vec<u8>, CryptoError> {
        hash(MessageDigest::sha256(), data)
            .map(|d| d.to_vec())
            .map_err(|e| CryptoError::HashCalculateFail(format!("{e:?}")))
    }

    fn ed25519_supported(&self) -> bool {
        // openssl >= 1.1.1 always carries Ed25519
        true
    }

    fn verify_ed25519(
        &self,
        public_key: &[u8],
        message: &[u8],
        signature: &[u8],
    ) -> Result<SignatureVerdict, CryptoError> {
        if public_key.len() != 32 {
            return Err(CryptoError::InvalidKeyMaterial(format!(
                "Ed25519 public key must be 32 bytes, got {}",
                public_key.len()
            )));
        }

        let pkey = PKey::public_key_from_raw_bytes(public_key, Id::ED25519)
            .map_err(|e| CryptoError::InvalidKeyMaterial(format!("{e:?}")))?;

        let mut verifier = Verifier::new_without_digest(&pkey)
            .map_err(|e| CryptoError::UnsupportedAlgorithm(format!("ed25519: {e:?}")))?;

        // a malformed signature (e.g. wrong length) surfaces as an openssl
        // error; treat it as a rejection, not a thrown failure
        match verifier.verify_oneshot(signature, message) {
            Ok(true) => Ok(SignatureVerdict::Valid),
            Ok(false) => Ok(SignatureVerdict::Invalid {
                reason: "Ed25519 signature verification failed".to_string(),
            }),
            Err(e) => Ok(SignatureVerdict::Invalid {
                reason: format!("malformed signature: {e:?}"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn sha256_hex_is_lowercase() {
        let p = OpensslProvider;

        let sum = p.sha256_hex(b"abc").unwrap();

        assert_eq!(
            sum,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn sha256_known_vector() {
        let p = OpensslProvider;

        let sum = p.sha256(b"").unwrap();

        assert_eq!(
            sum,
            hex!("e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855")
        );
    }

    #[test]
    fn verify_valid_ed25519_signature() {
        let p = OpensslProvider;
        let key = openssl::pkey::PKey::generate_ed25519().unwrap();
        let msg = b"station-1|tk-abc|1735689600";

        let mut signer = openssl::sign::Signer::new_without_digest(&key).unwrap();
        let sig = signer.sign_oneshot_to_vec(msg).unwrap();

        let pk = key.raw_public_key().unwrap();
        let r = p.verify_ed25519(&pk, msg, &sig).unwrap();

        assert!(r.is_valid());
    }

    #[test]
    fn reject_wrong_key() {
        let p = OpensslProvider;
        let key = openssl::pkey::PKey::generate_ed25519().unwrap();
        let other = openssl::pkey::PKey::generate_ed25519().unwrap();
        let msg = b"station-1|tk-abc|1735689600";

        let mut signer = openssl::sign::Signer::new_without_digest(&key).unwrap();
        let sig = signer.sign_oneshot_to_vec(msg).unwrap();

        let pk = other.raw_public_key().unwrap();
        let r = p.verify_ed25519(&pk, msg, &sig).unwrap();

        assert!(!r.is_valid());
    }

    #[test]
    fn reject_truncated_signature_without_error() {
        let p = OpensslProvider;
        let key = openssl::pkey::PKey::generate_ed25519().unwrap();
        let pk = key.raw_public_key().unwrap();

        let r = p.verify_ed25519(&pk, b"msg", &[0u8; 10]).unwrap();

        assert!(!r.is_valid());
    }

    #[test]
    fn reject_bad_key_length() {
        let p = OpensslProvider;

        let r = p.verify_ed25519(&[0u8; 31], b"msg", &[0u8; 64]);

        assert!(r.is_err());
    }
}
