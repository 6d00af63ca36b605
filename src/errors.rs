// Copyright 2025 Contributors to the Trustchain project.
// SPDX-License-Identifier: Apache-2.0

/// Engine-wide error taxonomy.  Every verification function records its
/// own failure in its result object; these variants classify what kind of
/// failure it was so callers can distinguish "cannot check" from "check
/// failed".
#[derive(thiserror::Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// Malformed JWT, base64 or hex input.  Terminal for the sub-check it
    /// occurred in, never propagated past the check boundary.
    #[error("Format error: {0}")]
    Format(String),
    /// Wrong JKU host, unknown key id, signature or hash mismatch.
    /// Security-relevant and surfaced verbatim to the verdict.
    #[error("Trust anchor mismatch: {0}")]
    TrustAnchor(String),
    /// Fetch failure or non-2xx from an advisory service.  Recorded on
    /// the relevant sub-result, not retried, not propagated to siblings.
    #[error("Network error: {0}")]
    Network(String),
    /// The runtime's crypto provider lacks a required primitive.
    #[error("Capability unsupported: {0}")]
    Unsupported(String),
}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Format(e) | Error::TrustAnchor(e) | Error::Network(e) | Error::Unsupported(e) => {
                write!(f, "{}", e)
            }
        }
    }
}
