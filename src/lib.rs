// Copyright 2025 Contributors to the Trustchain project.
// SPDX-License-Identifier: Apache-2.0

//! Verifier trust-chain engine.
//!
//! This crate independently proves that a remote confidential-computing
//! "Verifier" service is running authentic code, and that an ephemeral
//! API key held by the client was legitimately issued by that service,
//! without trusting the service's own claims.
//!
//! The API allows:
//! * Verifying the attestation JWT against the attestation service's
//!   JWKS, with the key-distribution authority pinned
//! * Checking the SHA-256 binding between the hardware-measured
//!   `host_data` and the deployed policy document
//! * Extracting the container identity the policy pins and probing the
//!   container registry and the Sigstore transparency log for it
//! * Reconstructing zero-trust evidence (station Ed25519 signature,
//!   broadcast registry lookups, submit-key ownership records) locally
//!
//! Evidence sources are mutually distrustful and partially unreachable
//! by design: the [`orchestrator::Orchestrator`] combines whatever is
//! available into a [`verdict::VerificationVerdict`] in which a missing
//! answer is always representable and never conflated with a negative
//! one.

pub mod attestation;
pub mod crypto;
pub mod errors;
pub mod evidence;
pub mod orchestrator;
pub mod probes;
pub mod verdict;
