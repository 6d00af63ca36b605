// Copyright 2025 Contributors to the Trustchain project.
// SPDX-License-Identifier: Apache-2.0

//! Read-only view of the peer-broadcast station registry.  Stations are
//! looked up by their station id; this engine never writes broadcast
//! data.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifiedStation {
    pub station_id: String,
    /// Hex-encoded Ed25519 public key
    pub public_key: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BannedStation {
    pub station_id: String,
    #[serde(default)]
    pub public_key: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub banned_at: Option<i64>,
}

/// One broadcast snapshot as published by the registry service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BroadcastSnapshot {
    #[serde(default)]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub verified_stations: Vec<VerifiedStation>,
    #[serde(default)]
    pub banned_stations: Vec<BannedStation>,
}

/// Result of looking a station up in the snapshot.  A station can appear
/// in both lists; callers treat a ban as overriding.
#[derive(Debug, Clone, Copy)]
pub struct BroadcastLookup<'a> {
    pub verified: Option<&'a VerifiedStation>,
    pub banned: Option<&'a BannedStation>,
}

impl BroadcastSnapshot {
    pub fn lookup(&self, station_id: &str) -> BroadcastLookup<'_> {
        BroadcastLookup {
            verified: self
                .verified_stations
                .iter()
                .find(|s| s.station_id == station_id),
            banned: self
                .banned_stations
                .iter()
                .find(|s| s.station_id == station_id),
        }
    }
}
