// Copyright 2025 Contributors to the Trustchain project.
// SPDX-License-Identifier: Apache-2.0

//! GHCR registry probe: anonymous pull-token flow, then a manifest
//! lookup by exact digest.

use reqwest::header::ACCEPT;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::attestation::container::ContainerIdentity;
use crate::errors::Error;
use crate::verdict::ProbeStatus;

/// Default registry endpoint.  Hardcoded trust anchor, isolated for
/// future configurability.
pub const DEFAULT_GHCR_BASE: &str = "https://ghcr.io";

const MANIFEST_ACCEPT: &str =
    "application/vnd.docker.distribution.manifest.v2+json, application/vnd.oci.image.manifest.v1+json";

const ERR_NO_TOKEN: &str = "Could not get GHCR token (may be private)";

#[derive(Deserialize)]
struct TokenResponse {
    token: String,
}

pub struct RegistryProbe {
    client: reqwest::Client,
    base_url: String,
}

impl RegistryProbe {
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_base_url(client, DEFAULT_GHCR_BASE)
    }

    pub fn with_base_url(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Check whether the manifest referenced by the policy's digest is
    /// resolvable.  Always settles; never returns `Pending`.
    pub async fn probe(&self, id: &ContainerIdentity) -> ProbeStatus {
        let token = match self.fetch_pull_token(id).await {
            Ok(t) => t,
            Err(e) => {
                warn!(repository = %id.repository(), "GHCR token fetch failed: {e:?}");
                return ProbeStatus::Failed {
                    error: ERR_NO_TOKEN.to_string(),
                };
            }
        };

        let url = format!(
            "{}/v2/{}/manifests/{}",
            self.base_url,
            id.repository(),
            id.digest
        );

        match self
            .client
            .get(&url)
            .bearer_auth(&token)
            .header(ACCEPT, MANIFEST_ACCEPT)
            .send()
            .await
        {
            Ok(resp) => {
                let status = resp.status().as_u16();
                debug!(repository = %id.repository(), status, "GHCR manifest lookup");
                classify_manifest_status(status)
            }
            Err(e) => ProbeStatus::Failed {
                error: format!("GHCR request failed: {e}"),
            },
        }
    }

    async fn fetch_pull_token(&self, id: &ContainerIdentity) -> Result<String, Error> {
        let url = format!(
            "{}/token?scope=repository:{}:pull",
            self.base_url,
            id.repository()
        );

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(Error::Network(format!(
                "token endpoint returned {}",
                resp.status().as_u16()
            )));
        }

        let t: TokenResponse = resp
            .json()
            .await
            .map_err(|e| Error::Format(e.to_string()))?;

        Ok(t.token)
    }
}

/// Map a manifest HTTP status to a probe outcome.
pub fn classify_manifest_status(status: u16) -> ProbeStatus {
    match status {
        200..=299 => ProbeStatus::Verified,
        404 => ProbeStatus::Failed {
            error: "Digest not found in GHCR".to_string(),
        },
        401 | 403 => ProbeStatus::Failed {
            error: "Private repo - manual verification needed".to_string(),
        },
        other => ProbeStatus::Failed {
            error: format!("GHCR returned {other}"),
        },
    }
}
