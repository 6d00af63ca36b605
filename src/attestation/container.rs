// Copyright 2025 Contributors to the Trustchain project.
// SPDX-License-Identifier: Apache-2.0

//! Container identity extraction from the decoded policy text.
//!
//! A confidential-container policy pins the workload image by digest in a
//! field shaped like `"id":"ghcr.io/<owner>/<image>@sha256:<hex>"`.  This
//! is a pure parse with no network I/O: when the policy is well-formed
//! JSON it is walked structurally; otherwise (Rego text with embedded
//! JSON fragments) a tolerant substring scan is used.  A policy without a
//! recognizable container id is valid, so absence yields `None`, never an
//! error.

use serde::Serialize;
use serde_json::Value;

/// The registry host this engine knows how to probe.  Hardcoded trust
/// anchor, isolated here for future configurability.
pub const GHCR_HOST: &str = "ghcr.io";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerIdentity {
    pub registry: String,
    pub owner: String,
    pub image: String,
    /// `sha256:<hex>`
    pub digest: String,
    pub command: Option<String>,
    pub working_dir: Option<String>,
}

impl ContainerIdentity {
    /// Digest without the `sha256:` prefix.
    pub fn digest_hex(&self) -> &str {
        self.digest.strip_prefix("sha256:").unwrap_or(&self.digest)
    }

    /// `<owner>/<image>`, the registry repository path.
    pub fn repository(&self) -> String {
        format!("{}/{}", self.owner, self.image)
    }
}

/// Extract the container identity pinned by the policy, if any.
pub fn extract(decoded: &str) -> Option<ContainerIdentity> {
    if let Ok(doc) = serde_json::from_str::<Value>(decoded) {
        if let Some(ident) = find_in_value(&doc) {
            return Some(ident);
        }
    }

    scan_text(decoded)
}

fn find_in_value(value: &Value) -> Option<ContainerIdentity> {
    match value {
        Value::Object(map) => {
            if let Some(id) = map.get("id").and_then(Value::as_str) {
                if let Some(mut ident) = parse_image_ref(id) {
                    ident.command = map
                        .get("command")
                        .and_then(Value::as_array)
                        .map(|items| {
                            items
                                .iter()
                                .filter_map(Value::as_str)
                                .collect::<Vec<_>>()
                                .join(" ")
                        })
                        .filter(|c| !c.is_empty());
                    ident.working_dir = map
                        .get("working_dir")
                        .and_then(Value::as_str)
                        .map(str::to_string);
                    return Some(ident);
                }
            }
            map.values().find_map(find_in_value)
        }
        Value::Array(items) => items.iter().find_map(find_in_value),
        _ => None,
    }
}

// fallback for policies that are not themselves JSON documents
fn scan_text(decoded: &str) -> Option<ContainerIdentity> {
    let id = scan_string_field(decoded, "\"id\":\"")?;
    let mut ident = parse_image_ref(&id)?;
    ident.command = scan_command(decoded);
    ident.working_dir = scan_string_field(decoded, "\"working_dir\":\"");
    Some(ident)
}

fn scan_string_field(decoded: &str, marker: &str) -> Option<String> {
    let start = decoded.find(marker)? + marker.len();
    let rest = &decoded[start..];
    let end = rest.find('"')?;
    Some(rest[..end].to_string())
}

fn scan_command(decoded: &str) -> Option<String> {
    let marker = "\"command\":[";
    let start = decoded.find(marker)? + marker.len();
    let rest = &decoded[start..];
    let end = rest.find(']')?;

    let parts: Vec<&str> = rest[..end]
        .split(',')
        .map(|p| p.trim().trim_matches('"'))
        .filter(|p| !p.is_empty())
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" "))
    }
}

fn parse_image_ref(id: &str) -> Option<ContainerIdentity> {
    let (path, digest) = id.split_once('@')?;

    let hex_part = digest.strip_prefix("sha256:")?;
    if hex_part.is_empty() || !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    let mut segments = path.splitn(3, '/');
    let registry = segments.next()?;
    let owner = segments.next()?;
    let image = segments.next()?;

    if registry != GHCR_HOST || owner.is_empty() || image.is_empty() {
        return None;
    }

    Some(ContainerIdentity {
        registry: registry.to_string(),
        owner: owner.to_string(),
        image: image.to_string(),
        digest: digest.to_string(),
        command: None,
        working_dir: None,
    })
}
