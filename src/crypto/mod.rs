// Copyright 2025 Contributors to the Trustchain project.
// SPDX-License-Identifier: Apache-2.0

//! Injected cryptographic capability provider.
//!
//! The engine never reaches into an ambient crypto runtime: hashing and
//! Ed25519 verification go through the [`CryptoProvider`] trait so tests
//! can substitute a stub, and so a runtime without Ed25519 support is
//! reported as "cannot check" rather than "check failed".
//!
//! RSA-SHA256 JWT verification is not part of this trait; it stays on
//! `jsonwebtoken` in [`crate::attestation::jwt`].

pub use self::errors::CryptoError;
pub use self::openssl::OpensslProvider;
pub use self::stub::StubProvider;

mod errors;
mod openssl;
mod stub;

/// Outcome of running a signature primitive.  `Invalid` means the
/// primitive ran and rejected the signature; errors are reserved for
/// malformed key material or a missing capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureVerdict {
    Valid,
    Invalid { reason: String },
}

impl SignatureVerdict {
    pub fn is_valid(&self) -> bool {
        matches!(self, SignatureVerdict::Valid)
    }
}

/// The set of primitives the engine needs from its host.
pub trait CryptoProvider: Send + Sync {
    /// SHA-256 digest of `data`.
    fn sha256(&self, data: &[u8]) -> Result<Vec<u8>, CryptoError>;

    /// SHA-256 digest of `data`, hex-encoded lowercase.
    fn sha256_hex(&self, data: &[u8]) -> Result<String, CryptoError> {
        Ok(hex::encode(self.sha256(data)?))
    }

    /// Whether Ed25519 verification is available.  Feature detection,
    /// not a verification result.
    fn ed25519_supported(&self) -> bool;

    /// Verify an Ed25519 signature over `message` with a raw 32-byte
    /// public key.
    fn verify_ed25519(
        &self,
        public_key: &[u8],
        message: &[u8],
        signature: &[u8],
    ) -> Result<SignatureVerdict, CryptoError>;
}
