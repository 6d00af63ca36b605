// Copyright 2025 Contributors to the Trustchain project.
// SPDX-License-Identifier: Apache-2.0

//! JWT verification against the attestation service's JWKS.
//!
//! The trust anchor is pinned *before* any network traffic: the token's
//! `jku` must point into the Azure Attestation Service certs namespace,
//! otherwise an attacker holding a valid signing key could direct us at a
//! JWKS they control.  The verification algorithm is likewise pinned to
//! RSA-SHA256 regardless of the token's `alg` claim.

use jsonwebtoken::{decode, decode_header, jwk, Algorithm, DecodingKey, Validation};
use serde::Serialize;
use tracing::debug;

use super::base64;
use crate::errors::Error;

/// Required substring of the `jku` header.  Hardcoded trust anchor,
/// isolated here for future configurability.
pub const ATTEST_JKU_FRAGMENT: &str = ".attest.azure.net/certs";

const ERR_MISSING_INPUT: &str = "Missing JWT token or verify_at URL";
const ERR_JKU_NOT_AZURE: &str = "JKU is not from Azure Attestation Service";
const ERR_KID_NOT_FOUND: &str = "Key ID not found in Azure JWKS";

/// Outcome of one JWT verification.  `error` holds the first failure
/// encountered; the steps short-circuit.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct JwtCheck {
    pub verified: bool,
    pub key_id: Option<String>,
    /// `iss` claim, decoded for display only; not itself trust-bearing
    pub issuer: Option<String>,
    pub jku: Option<String>,
    pub keys_loaded: bool,
    pub error: Option<String>,
}

/// Run the full JWT check: header pinning, JWKS fetch, signature
/// verification.  Never returns an error; failures land in the result.
pub async fn check(client: &reqwest::Client, token: &str, verify_at: &str) -> JwtCheck {
    let mut result = JwtCheck::default();

    if token.is_empty() || verify_at.is_empty() {
        result.error = Some(ERR_MISSING_INPUT.to_string());
        return result;
    }

    let header = match decode_header(token) {
        Ok(h) => h,
        Err(e) => {
            result.error = Some(format!("Malformed JWT header: {e}"));
            return result;
        }
    };

    let jku = header.jku.clone().unwrap_or_else(|| verify_at.to_string());
    result.jku = Some(jku.clone());
    result.key_id = header.kid.clone();
    result.issuer = extract_issuer(token);

    if !jku.contains(ATTEST_JKU_FRAGMENT) {
        result.error = Some(ERR_JKU_NOT_AZURE.to_string());
        return result;
    }

    let jwks = match fetch_jwks(client, &jku).await {
        Ok(s) => {
            result.keys_loaded = true;
            s
        }
        Err(e) => {
            result.error = Some(format!("{e:?}"));
            return result;
        }
    };

    match verify_with_jwks(token, header.kid.as_deref(), &jwks) {
        Ok(()) => {
            debug!(kid = ?result.key_id, "JWT signature verified");
            result.verified = true;
        }
        Err(e) => result.error = Some(format!("{e:?}")),
    }

    result
}

/// Fetch and parse the JWKS published at `jku`.
pub async fn fetch_jwks(client: &reqwest::Client, jku: &str) -> Result<jwk::JwkSet, Error> {
    let resp = client
        .get(jku)
        .send()
        .await
        .map_err(|e| Error::Network(format!("Failed to fetch Azure keys: {e}")))?;

    if !resp.status().is_success() {
        return Err(Error::Network(format!(
            "Failed to fetch Azure keys: {}",
            resp.status().as_u16()
        )));
    }

    resp.json::<jwk::JwkSet>()
        .await
        .map_err(|e| Error::Format(format!("Malformed JWKS document: {e}")))
}

/// Verify the token signature against a key selected by `kid` from an
/// already-fetched JWKS.  Pure apart from the crypto; unit-testable
/// offline.
pub fn verify_with_jwks(
    token: &str,
    kid: Option<&str>,
    jwks: &jwk::JwkSet,
) -> Result<(), Error> {
    let kid = kid.ok_or_else(|| Error::TrustAnchor(ERR_KID_NOT_FOUND.to_string()))?;

    let key = jwks
        .find(kid)
        .ok_or_else(|| Error::TrustAnchor(ERR_KID_NOT_FOUND.to_string()))?;

    let decoding_key = DecodingKey::from_jwk(key)
        .map_err(|e| Error::Format(format!("Failed to import JWKS key: {e}")))?;

    // RS256 pinned regardless of the token's alg claim
    let mut validation = Validation::new(Algorithm::RS256);
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims = Default::default();

    decode::<serde_json::Value>(token, &decoding_key, &validation)
        .map(|_| ())
        .map_err(|e| Error::TrustAnchor(format!("JWT signature verification failed: {e}")))
}

fn extract_issuer(token: &str) -> Option<String> {
    let payload = token.split('.').nth(1)?;
    let claims = base64::decode_segment_json(payload).ok()?;
    claims.get("iss")?.as_str().map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use ::base64::Engine as _;
    use openssl::hash::MessageDigest;
    use openssl::pkey::{PKey, Private};
    use openssl::rsa::Rsa;
    use serde_json::json;

    const TEST_KID: &str = "test-key-0";
    const TEST_JKU: &str = "https://shared.eus.attest.azure.net/certs";

    fn test_keypair() -> (Rsa<Private>, PKey<Private>) {
        let rsa = Rsa::generate(2048).unwrap();
        let pkey = PKey::from_rsa(rsa.clone()).unwrap();
        (rsa, pkey)
    }

    fn sign_token(header: &serde_json::Value, payload: &serde_json::Value, key: &PKey<Private>) -> String {
        let h = URL_SAFE_NO_PAD.encode(header.to_string());
        let p = URL_SAFE_NO_PAD.encode(payload.to_string());
        let signing_input = format!("{h}.{p}");

        let mut signer = openssl::sign::Signer::new(MessageDigest::sha256(), key).unwrap();
        signer.update(signing_input.as_bytes()).unwrap();
        let sig = signer.sign_to_vec().unwrap();

        format!("{signing_input}.{}", URL_SAFE_NO_PAD.encode(sig))
    }

    fn jwks_for(rsa: &Rsa<Private>, kid: &str) -> jwk::JwkSet {
        let n = URL_SAFE_NO_PAD.encode(rsa.n().to_vec());
        let e = URL_SAFE_NO_PAD.encode(rsa.e().to_vec());

        serde_json::from_value(json!({
            "keys": [{ "kty": "RSA", "kid": kid, "use": "sig", "alg": "RS256", "n": n, "e": e }]
        }))
        .unwrap()
    }

    fn good_token(key: &PKey<Private>) -> String {
        sign_token(
            &json!({ "alg": "RS256", "typ": "JWT", "kid": TEST_KID, "jku": TEST_JKU }),
            &json!({ "iss": "https://shared.eus.attest.azure.net" }),
            key,
        )
    }

    #[test]
    fn verify_ok_with_matching_key() {
        let (rsa, pkey) = test_keypair();
        let token = good_token(&pkey);
        let jwks = jwks_for(&rsa, TEST_KID);

        let r = verify_with_jwks(&token, Some(TEST_KID), &jwks);

        assert!(r.is_ok());
    }

    #[test]
    fn verify_fails_on_tampered_payload() {
        let (rsa, pkey) = test_keypair();
        let token = good_token(&pkey);
        let jwks = jwks_for(&rsa, TEST_KID);

        let mut parts: Vec<&str> = token.split('.').collect();
        let forged = URL_SAFE_NO_PAD.encode(json!({ "iss": "attacker" }).to_string());
        parts[1] = &forged;
        let tampered = parts.join(".");

        let r = verify_with_jwks(&tampered, Some(TEST_KID), &jwks);

        assert!(matches!(r, Err(Error::TrustAnchor(_))));
    }

    #[test]
    fn unknown_kid_reports_specific_error() {
        let (rsa, pkey) = test_keypair();
        let token = good_token(&pkey);
        let jwks = jwks_for(&rsa, TEST_KID);

        let r = verify_with_jwks(&token, Some("other-key"), &jwks);

        assert_eq!(r, Err(Error::TrustAnchor(ERR_KID_NOT_FOUND.to_string())));
    }

    #[test]
    fn alg_claim_cannot_downgrade_verification() {
        // token claims HS256; verification stays pinned to RS256 and the
        // token must be rejected rather than re-interpreted
        let (rsa, pkey) = test_keypair();
        let token = sign_token(
            &json!({ "alg": "HS256", "typ": "JWT", "kid": TEST_KID, "jku": TEST_JKU }),
            &json!({ "iss": "x" }),
            &pkey,
        );
        let jwks = jwks_for(&rsa, TEST_KID);

        let r = verify_with_jwks(&token, Some(TEST_KID), &jwks);

        assert!(r.is_err());
    }

    #[tokio::test]
    async fn foreign_jku_fails_before_any_fetch() {
        let (_, pkey) = test_keypair();
        let token = sign_token(
            &json!({ "alg": "RS256", "kid": TEST_KID, "jku": "https://evil.example.com/certs" }),
            &json!({ "iss": "x" }),
            &pkey,
        );

        let client = reqwest::Client::new();
        let r = check(&client, &token, "https://evil.example.com/certs").await;

        assert!(!r.verified);
        assert!(!r.keys_loaded);
        assert_eq!(r.error.as_deref(), Some(ERR_JKU_NOT_AZURE));
    }

    #[tokio::test]
    async fn missing_token_reports_missing_input() {
        let client = reqwest::Client::new();

        let r = check(&client, "", TEST_JKU).await;

        assert_eq!(r.error.as_deref(), Some(ERR_MISSING_INPUT));
    }

    #[test]
    fn issuer_is_extracted_for_display() {
        let (_, pkey) = test_keypair();
        let token = good_token(&pkey);

        assert_eq!(
            extract_issuer(&token).as_deref(),
            Some("https://shared.eus.attest.azure.net")
        );
    }
}
