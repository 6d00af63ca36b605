// Copyright 2025 Contributors to the Trustchain project.
// SPDX-License-Identifier: Apache-2.0

//! Sigstore/Rekor transparency-log probe.
//!
//! Presence of at least one log entry for the image digest proves the
//! artifact went through a publicly-auditable build pipeline, independent
//! of registry availability.

use serde_json::{json, Value};
use tracing::debug;

use crate::attestation::base64;
use crate::verdict::TlogStatus;

/// Default transparency-log endpoint.  Hardcoded trust anchor, isolated
/// for future configurability.
pub const DEFAULT_REKOR_BASE: &str = "https://rekor.sigstore.dev";

/// Public search frontend used for the manual-inspection deep link.
pub const REKOR_SEARCH_BASE: &str = "https://search.sigstore.dev";

pub struct TransparencyLogProbe {
    client: reqwest::Client,
    base_url: String,
}

impl TransparencyLogProbe {
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_base_url(client, DEFAULT_REKOR_BASE)
    }

    pub fn with_base_url(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Look up the digest in the log.  `digest` may carry the `sha256:`
    /// prefix or not.  Always settles; never returns `Pending`.
    pub async fn probe(&self, digest: &str) -> TlogStatus {
        let hex = digest.strip_prefix("sha256:").unwrap_or(digest);
        let hash = format!("sha256:{hex}");

        let ids = match self.retrieve_index(&hash).await {
            Ok(ids) => ids,
            Err(e) => {
                return TlogStatus::Failed {
                    error: format!("Rekor query failed: {e}"),
                }
            }
        };

        if ids.is_empty() {
            return self.probe_fallback(&hash).await;
        }

        debug!(entries = ids.len(), "Rekor index hit");

        // entry detail for the first id; the kind is best-effort
        let kind = match self.fetch_entry(&ids[0]).await {
            Ok(entry) => entry_kind(&entry),
            Err(e) => {
                return TlogStatus::Failed {
                    error: format!("Failed to fetch Rekor entry: {e}"),
                }
            }
        };

        TlogStatus::Verified {
            entries: ids.len(),
            rekor_url: search_url(&hash),
            kind,
        }
    }

    // older deployments answer the log-entry search where the hash index
    // comes back empty
    async fn probe_fallback(&self, hash: &str) -> TlogStatus {
        let entries = match self.retrieve_entries(hash).await {
            Ok(e) => e,
            // the log answered but holds nothing under this hash
            Err(e) if e.is_status() => {
                return TlogStatus::Failed {
                    error: "No Sigstore entry found".to_string(),
                }
            }
            // a transport failure is not evidence of absence
            Err(e) => {
                return TlogStatus::Failed {
                    error: format!("Rekor query failed: {e}"),
                }
            }
        };

        if entries.is_empty() {
            return TlogStatus::Failed {
                error: "No transparency log entries found".to_string(),
            };
        }

        let kind = entries.first().and_then(|e| e.values().next()).and_then(entry_kind);

        TlogStatus::Verified {
            entries: entries.len(),
            rekor_url: search_url(hash),
            kind,
        }
    }

    async fn retrieve_index(&self, hash: &str) -> Result<Vec<String>, reqwest::Error> {
        self.client
            .post(format!("{}/api/v1/index/retrieve", self.base_url))
            .json(&json!({ "hash": hash }))
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<String>>()
            .await
    }

    async fn retrieve_entries(
        &self,
        hash: &str,
    ) -> Result<Vec<serde_json::Map<String, Value>>, reqwest::Error> {
        self.client
            .post(format!("{}/api/v1/log/entries/retrieve", self.base_url))
            .json(&json!({ "hash": hash }))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }

    async fn fetch_entry(&self, uuid: &str) -> Result<Value, reqwest::Error> {
        let map = self
            .client
            .get(format!("{}/api/v1/log/entries/{uuid}", self.base_url))
            .send()
            .await?
            .error_for_status()?
            .json::<serde_json::Map<String, Value>>()
            .await?;

        Ok(map.into_iter().next().map(|(_, v)| v).unwrap_or(Value::Null))
    }
}

/// Deep link for manual inspection of all entries matching `hash`.
pub fn search_url(hash: &str) -> String {
    format!("{REKOR_SEARCH_BASE}/?hash={hash}")
}

/// Lift the entry type from a log-entry body (itself base64-encoded
/// JSON).  All failures are swallowed; the kind is informational only.
pub fn entry_kind(entry: &Value) -> Option<String> {
    let body = entry.get("body")?.as_str()?;
    let decoded = base64::decode_standard(body).ok()?;
    let parsed: Value = serde_json::from_slice(&decoded).ok()?;
    parsed.get("kind")?.as_str().map(str::to_string)
}
