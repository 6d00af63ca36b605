// Copyright 2025 Contributors to the Trustchain project.
// SPDX-License-Identifier: Apache-2.0

//! Ownership evidence correlation.
//!
//! An ephemeral key could have been minted against a shadow account on
//! the station's upstream provider; the verifier's `/submit_key` check
//! guards against that, but the UI must not trust a "verified" flag
//! baked into the key itself.  Instead we reconstruct the answer from
//! locally observable evidence: the session's network-call history and,
//! after a page reload loses transient logs, a persisted submit-key
//! proof carried with the session.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Verifier-reported key hashes are compared against the first 16 hex
/// chars of SHA-256 of the raw key.
pub const KEY_HASH_PREFIX_LEN: usize = 16;

const SUBMIT_KEY_PATH: &str = "/submit_key";

/// One recorded network call from the session log.  Read-only input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkCallRecord {
    #[serde(rename = "type")]
    pub call_type: String,
    pub url: String,
    #[serde(default)]
    pub status_code: Option<u16>,
    #[serde(default)]
    pub station_id: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub response: Option<Value>,
}

/// Persisted proof of the submit-key exchange, carried with the session
/// so the evidence survives page reloads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmitKeyProof {
    #[serde(default)]
    pub status_code: Option<u16>,
    #[serde(default)]
    pub response: Option<Value>,
}

/// Scoping for candidate selection.
#[derive(Debug, Clone, Copy)]
pub struct OwnershipContext<'a> {
    pub station_id: &'a str,
    pub session_id: Option<&'a str>,
    /// First [`KEY_HASH_PREFIX_LEN`] hex chars of SHA-256 of the raw key
    pub key_hash_prefix: &'a str,
}

/// Exactly one of these holds at any time.  `NotFound` (no matching
/// record at all) is distinct from `Rejected`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OwnershipOutcome {
    NotFound,
    Passed {
        #[serde(skip_serializing_if = "Option::is_none")]
        response: Option<Value>,
    },
    Pending {
        reason: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        response: Option<Value>,
    },
    Rejected {
        reason: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        response: Option<Value>,
    },
}

impl OwnershipOutcome {
    pub fn found(&self) -> bool {
        !matches!(self, OwnershipOutcome::NotFound)
    }

    pub fn passed(&self) -> bool {
        matches!(self, OwnershipOutcome::Passed { .. })
    }

    pub fn pending(&self) -> bool {
        matches!(self, OwnershipOutcome::Pending { .. })
    }

    pub fn rejected(&self) -> bool {
        matches!(self, OwnershipOutcome::Rejected { .. })
    }
}

/// Decide whether the held key's ownership was confirmed, is pending, or
/// was rejected, from network history and the persisted proof.
pub fn correlate(
    records: &[NetworkCallRecord],
    proof: Option<&SubmitKeyProof>,
    ctx: &OwnershipContext,
) -> OwnershipOutcome {
    let candidates: Vec<&NetworkCallRecord> = records
        .iter()
        .filter(|r| {
            r.call_type == "verification"
                && r.url.contains(SUBMIT_KEY_PATH)
                && r.station_id.as_deref().map_or(true, |s| s == ctx.station_id)
                && match (r.session_id.as_deref(), ctx.session_id) {
                    (Some(rec), Some(cur)) => rec == cur,
                    _ => true,
                }
        })
        .collect();

    // a "verified" record with a matching key hash wins over recency
    let chosen = candidates
        .iter()
        .find(|r| {
            response_status(r.response.as_ref()) == Some("verified")
                && reported_hash_matches(r.response.as_ref(), ctx.key_hash_prefix)
        })
        .or_else(|| candidates.first());

    if let Some(record) = chosen {
        return classify(record.status_code, record.response.as_ref(), ctx);
    }

    match proof {
        Some(p) => classify(p.status_code, p.response.as_ref(), ctx),
        None => OwnershipOutcome::NotFound,
    }
}

fn classify(
    status_code: Option<u16>,
    response: Option<&Value>,
    ctx: &OwnershipContext,
) -> OwnershipOutcome {
    let status = response_status(response);
    let response = response.cloned();

    if status == Some("banned") {
        return OwnershipOutcome::Rejected {
            reason: "Station banned by verifier".to_string(),
            response,
        };
    }

    // explicit in-flight states stay pending even when the transport
    // answered with an error code (rate limits come back as 429)
    if let Some(s @ ("pending" | "rate_limited" | "ownership_check_error")) = status {
        return OwnershipOutcome::Pending {
            reason: s.to_string(),
            response,
        };
    }

    if let Some(code) = status_code {
        if code >= 400 {
            return OwnershipOutcome::Rejected {
                reason: format!("Verifier returned HTTP {code}"),
                response,
            };
        }
    }

    let hash_reported = response
        .as_ref()
        .and_then(|r| r.get("key_hash"))
        .and_then(Value::as_str)
        .is_some();
    if hash_reported && !reported_hash_matches(response.as_ref(), ctx.key_hash_prefix) {
        return OwnershipOutcome::Rejected {
            reason: "Verifier-reported key hash does not match the held key".to_string(),
            response,
        };
    }

    let http_ok = matches!(status_code, Some(200..=299));
    if http_ok && status == Some("verified") {
        return OwnershipOutcome::Passed { response };
    }

    let reason = match status {
        Some(other) => format!("Verifier status {other:?}"),
        None => "Ownership check result indeterminate".to_string(),
    };

    OwnershipOutcome::Pending { reason, response }
}

fn response_status(response: Option<&Value>) -> Option<&str> {
    response?.get("status")?.as_str()
}

fn reported_hash_matches(response: Option<&Value>, local_prefix: &str) -> bool {
    let Some(reported) = response.and_then(|r| r.get("key_hash")).and_then(Value::as_str) else {
        return false;
    };

    if reported.is_empty() || local_prefix.is_empty() {
        return false;
    }

    // either side may be truncated
    reported.starts_with(local_prefix) || local_prefix.starts_with(reported)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const TEST_PREFIX: &str = "0123456789abcdef";

    fn ctx() -> OwnershipContext<'static> {
        OwnershipContext {
            station_id: "station-1",
            session_id: Some("sess-1"),
            key_hash_prefix: TEST_PREFIX,
        }
    }

    fn record(status_code: u16, response: Value) -> NetworkCallRecord {
        NetworkCallRecord {
            call_type: "verification".to_string(),
            url: "https://verifier.example/api/submit_key".to_string(),
            status_code: Some(status_code),
            station_id: Some("station-1".to_string()),
            session_id: Some("sess-1".to_string()),
            response: Some(response),
        }
    }

    #[test]
    fn no_evidence_is_not_found() {
        let r = correlate(&[], None, &ctx());

        assert_eq!(r, OwnershipOutcome::NotFound);
        assert!(!r.found());
        assert!(!r.rejected());
    }

    #[test]
    fn verified_record_with_matching_hash_passes() {
        let recs = vec![record(
            200,
            json!({ "status": "verified", "key_hash": format!("{TEST_PREFIX}aabbcc") }),
        )];

        assert!(correlate(&recs, None, &ctx()).passed());
    }

    #[test]
    fn verified_match_preferred_over_earlier_unmatched_record() {
        // the earlier record is indeterminate; the later verified+matching
        // record must win even though selection is not chronological
        let recs = vec![
            record(200, json!({ "status": "ownership_check_error" })),
            record(200, json!({ "status": "verified", "key_hash": TEST_PREFIX })),
        ];

        assert!(correlate(&recs, None, &ctx()).passed());
    }

    #[test]
    fn first_candidate_taken_when_none_verified() {
        let recs = vec![
            record(200, json!({ "status": "rate_limited" })),
            record(200, json!({ "status": "pending" })),
        ];

        let r = correlate(&recs, None, &ctx());

        assert_eq!(
            r,
            OwnershipOutcome::Pending {
                reason: "rate_limited".to_string(),
                response: Some(json!({ "status": "rate_limited" })),
            }
        );
    }

    #[test]
    fn http_error_rejects() {
        let recs = vec![record(403, json!({ "status": "error" }))];

        let r = correlate(&recs, None, &ctx());

        assert!(r.rejected());
    }

    #[test]
    fn banned_status_rejects_despite_http_success() {
        let recs = vec![record(200, json!({ "status": "banned" }))];

        assert!(correlate(&recs, None, &ctx()).rejected());
    }

    #[test]
    fn key_hash_mismatch_rejects() {
        let recs = vec![record(
            200,
            json!({ "status": "verified", "key_hash": "ffffffffffffffff" }),
        )];

        let r = correlate(&recs, None, &ctx());

        assert!(r.rejected());
    }

    #[test]
    fn records_for_other_stations_are_out_of_scope() {
        let mut rec = record(200, json!({ "status": "verified", "key_hash": TEST_PREFIX }));
        rec.station_id = Some("station-2".to_string());

        assert_eq!(correlate(&[rec], None, &ctx()), OwnershipOutcome::NotFound);
    }

    #[test]
    fn non_submit_key_calls_are_ignored() {
        let mut rec = record(200, json!({ "status": "verified", "key_hash": TEST_PREFIX }));
        rec.url = "https://verifier.example/api/attestation".to_string();

        assert_eq!(correlate(&[rec], None, &ctx()), OwnershipOutcome::NotFound);
    }

    #[test]
    fn persisted_proof_covers_reload() {
        let proof = SubmitKeyProof {
            status_code: Some(200),
            response: Some(json!({ "status": "verified", "key_hash": TEST_PREFIX })),
        };

        assert!(correlate(&[], Some(&proof), &ctx()).passed());
    }

    #[test]
    fn network_record_preferred_over_proof() {
        let proof = SubmitKeyProof {
            status_code: Some(200),
            response: Some(json!({ "status": "verified", "key_hash": TEST_PREFIX })),
        };
        let recs = vec![record(429, json!({ "status": "rate_limited" }))];

        let r = correlate(&recs, Some(&proof), &ctx());

        // the live record scopes the decision; rate limiting stays pending
        assert!(r.pending());
    }

    #[test]
    fn exactly_one_classification_holds() {
        let outcomes = [
            correlate(&[], None, &ctx()),
            correlate(&[record(200, json!({ "status": "verified", "key_hash": TEST_PREFIX }))], None, &ctx()),
            correlate(&[record(200, json!({ "status": "pending" }))], None, &ctx()),
            correlate(&[record(500, json!({}))], None, &ctx()),
        ];

        for o in outcomes {
            let flags = [o.passed(), o.pending(), o.rejected(), !o.found()];
            assert_eq!(flags.iter().filter(|f| **f).count(), 1, "{o:?}");
        }
    }
}
