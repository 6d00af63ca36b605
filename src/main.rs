// Copyright 2025 Contributors to the Trustchain project.
// SPDX-License-Identifier: Apache-2.0

use clap::Parser;
use std::error::Error;
use std::fs;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use trustchain::attestation::{container, AttestationBundle};
use trustchain::crypto::OpensslProvider;
use trustchain::evidence::{AccessContext, BroadcastSnapshot, NetworkCallRecord};
use trustchain::orchestrator::Orchestrator;

#[derive(Parser)]
enum TrustchainCli {
    Verify(VerifyArgs),
    Extract(ExtractArgs),
    Evidence(EvidenceArgs),
}

#[derive(Debug, clap::Args)]
#[command(author, version, long_about = None,
    about = "Run a full verification pass over the supplied attestation \
    bundle and print the verdict (and zero-trust evidence, when an access \
    context is supplied)")]
struct VerifyArgs {
    #[arg(short, long, default_value = "bundle.json")]
    bundle: String,

    #[arg(short, long)]
    context: Option<String>,

    #[arg(long)]
    broadcast: Option<String>,

    #[arg(long)]
    netlog: Option<String>,

    /// Skip the registry and transparency-log probes
    #[arg(long)]
    offline: bool,
}

#[derive(Debug, clap::Args)]
#[command(author, version, long_about = None,
    about = "Extract the container identity pinned by the bundle's policy")]
struct ExtractArgs {
    #[arg(short, long, default_value = "bundle.json")]
    bundle: String,
}

#[derive(Debug, clap::Args)]
#[command(author, version, long_about = None,
    about = "Build the zero-trust evidence for an access context from \
    broadcast and network-log data")]
struct EvidenceArgs {
    #[arg(short, long, default_value = "context.json")]
    context: String,

    #[arg(long)]
    broadcast: Option<String>,

    #[arg(long)]
    netlog: Option<String>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    match TrustchainCli::parse() {
        TrustchainCli::Verify(args) => match verify(&args).await {
            Ok(()) => println!("verification pass complete"),
            Err(e) => eprintln!("verification failed: {e}"),
        },

        TrustchainCli::Extract(args) => match extract(&args) {
            Ok(()) => (),
            Err(e) => eprintln!("extraction failed: {e}"),
        },

        TrustchainCli::Evidence(args) => match evidence(&args) {
            Ok(()) => (),
            Err(e) => eprintln!("evidence build failed: {e}"),
        },
    }
}

async fn verify(args: &VerifyArgs) -> Result<(), Box<dyn Error>> {
    let j = fs::read_to_string(&args.bundle)?;
    let bundle: AttestationBundle = serde_json::from_str(&j)?;

    let orchestrator = Orchestrator::new(Arc::new(OpensslProvider), reqwest::Client::new());

    // cancelling up front keeps the probes from ever being launched
    if args.offline {
        orchestrator.cancel();
    }

    orchestrator.verify(&bundle).await;
    orchestrator.join_probes().await;

    let verdict = orchestrator.snapshot();
    println!("{}", serde_json::to_string_pretty(&verdict)?);

    if let Some(path) = &args.context {
        let ctx: AccessContext = serde_json::from_str(&fs::read_to_string(path)?)?;
        let broadcast = load_broadcast(args.broadcast.as_deref())?;
        let records = load_netlog(args.netlog.as_deref())?;

        let evidence = orchestrator.zero_trust(&ctx, broadcast.as_ref(), &records);
        println!("{}", serde_json::to_string_pretty(&evidence)?);
    }

    Ok(())
}

fn extract(args: &ExtractArgs) -> Result<(), Box<dyn Error>> {
    let j = fs::read_to_string(&args.bundle)?;
    let bundle: AttestationBundle = serde_json::from_str(&j)?;

    match container::extract(&bundle.policy.decoded) {
        Some(id) => println!("{}", serde_json::to_string_pretty(&id)?),
        None => println!("no container identity in policy"),
    }

    Ok(())
}

fn evidence(args: &EvidenceArgs) -> Result<(), Box<dyn Error>> {
    let ctx: AccessContext = serde_json::from_str(&fs::read_to_string(&args.context)?)?;
    let broadcast = load_broadcast(args.broadcast.as_deref())?;
    let records = load_netlog(args.netlog.as_deref())?;

    let e = trustchain::evidence::build(&OpensslProvider, &ctx, broadcast.as_ref(), &records);
    println!("{}", serde_json::to_string_pretty(&e)?);

    Ok(())
}

fn load_broadcast(path: Option<&str>) -> Result<Option<BroadcastSnapshot>, Box<dyn Error>> {
    match path {
        Some(p) => Ok(Some(serde_json::from_str(&fs::read_to_string(p)?)?)),
        None => Ok(None),
    }
}

fn load_netlog(path: Option<&str>) -> Result<Vec<NetworkCallRecord>, Box<dyn Error>> {
    match path {
        Some(p) => Ok(serde_json::from_str(&fs::read_to_string(p)?)?),
        None => Ok(Vec::new()),
    }
}
