// Copyright 2025 Contributors to the Trustchain project.
// SPDX-License-Identifier: Apache-2.0

//! The attestation module holds the hardware-trust chain: JWT signature
//! verification against the attestation service's JWKS, the policy-hash
//! binding between the measured `host_data` and the inspectable policy
//! document, and extraction of the container identity the policy pins.
//!
//! These checks gate the headline "hardware verified" status and run
//! synchronously; the advisory network probes live in [`crate::probes`].

pub use self::bundle::{AttestationBundle, HardwareSummary, PolicyDocument};
pub use self::container::ContainerIdentity;

pub mod base64;
pub mod bundle;
pub mod container;
pub mod jwt;
pub mod policy;
