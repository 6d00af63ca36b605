// Copyright 2025 Contributors to the Trustchain project.
// SPDX-License-Identifier: Apache-2.0

//! Policy-hash binding: SHA-256 of the raw policy document must equal
//! the `host_data` digest the hardware reported.  Exact digest equality
//! is the cryptographic link between "what the hardware measured" and
//! "what we can inspect"; everything downstream hinges on it.

use serde::Serialize;

use super::base64;
use crate::crypto::CryptoProvider;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PolicyCheck {
    pub verified: bool,
    /// Lowercase hex SHA-256 of the decoded policy
    pub computed_hash: Option<String>,
    pub error: Option<String>,
}

/// Decode `policy_base64`, hash it, and compare byte-for-byte against the
/// hardware-reported digest.  A missing `host_data` is reported as
/// "unknown" (unverified, no error), not as a mismatch.  Callers must
/// normalize case; the comparison here is exact.
pub fn check(
    provider: &dyn CryptoProvider,
    policy_base64: &str,
    host_data: Option<&str>,
) -> PolicyCheck {
    let mut result = PolicyCheck::default();

    let raw = match base64::decode_standard(policy_base64) {
        Ok(b) => b,
        Err(e) => {
            result.error = Some(format!("Failed to decode policy: {e:?}"));
            return result;
        }
    };

    let computed = match provider.sha256_hex(&raw) {
        Ok(h) => h,
        Err(e) => {
            result.error = Some(format!("Failed to hash policy: {e}"));
            return result;
        }
    };
    result.computed_hash = Some(computed.clone());

    match host_data {
        None => { /* unknown, not a mismatch */ }
        Some(reported) => {
            if computed == reported {
                result.verified = true;
            } else {
                result.error = Some(format!(
                    "Policy hash mismatch: computed {computed}, hardware reported {reported}"
                ));
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::OpensslProvider;
    use ::base64::engine::general_purpose::STANDARD;
    use ::base64::Engine as _;

    const TEST_POLICY: &str = "package policy\n\ndefault allow := true\n";

    fn policy_b64() -> String {
        STANDARD.encode(TEST_POLICY)
    }

    fn policy_hash() -> String {
        OpensslProvider.sha256_hex(TEST_POLICY.as_bytes()).unwrap()
    }

    #[test]
    fn matching_host_data_verifies() {
        let r = check(&OpensslProvider, &policy_b64(), Some(&policy_hash()));

        assert!(r.verified);
        assert!(r.error.is_none());
        assert_eq!(r.computed_hash, Some(policy_hash()));
    }

    #[test]
    fn single_flipped_byte_flips_verdict() {
        let mut altered = TEST_POLICY.as_bytes().to_vec();
        altered[0] ^= 0x01;
        let altered_b64 = STANDARD.encode(&altered);

        let r = check(&OpensslProvider, &altered_b64, Some(&policy_hash()));

        assert!(!r.verified);
        assert!(r.error.is_some());
        assert_ne!(r.computed_hash, Some(policy_hash()));
    }

    #[test]
    fn missing_host_data_is_unknown_not_mismatch() {
        let r = check(&OpensslProvider, &policy_b64(), None);

        assert!(!r.verified);
        assert!(r.error.is_none());
        assert!(r.computed_hash.is_some());
    }

    #[test]
    fn comparison_is_case_sensitive() {
        let upper = policy_hash().to_uppercase();

        let r = check(&OpensslProvider, &policy_b64(), Some(&upper));

        assert!(!r.verified);
        assert!(r.error.is_some());
    }

    #[test]
    fn undecodable_policy_is_a_format_error() {
        let r = check(&OpensslProvider, "!!not-base64!!", Some(&policy_hash()));

        assert!(!r.verified);
        assert!(r.computed_hash.is_none());
        assert!(r.error.unwrap().starts_with("Failed to decode policy"));
    }
}
