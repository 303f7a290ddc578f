//! x402-claim-agent CLI entry point.

mod cli;

use clap::Parser;
use cli::Cli;
use std::error::Error;
use std::process;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use x402_claim_agent::{
    ClaimAgent, PaymentResolver, StaticSigner, UnresolvedChallengePolicy, start_monitoring,
};
use x402_claim_types::AttestationProof;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn Error>> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init()?;

    let proof = load_proof(&cli)?;
    let policy = if cli.acknowledge_unresolved {
        UnresolvedChallengePolicy::Acknowledge
    } else {
        UnresolvedChallengePolicy::Fail
    };
    let agent = ClaimAgent::try_new(cli.url.clone())?
        .with_timeout(Duration::from_secs(cli.timeout_secs))
        .with_policy(policy);

    let mut resolver = PaymentResolver::new();
    if let Some(credential) = cli.credential.clone() {
        resolver = resolver.with_signer(StaticSigner::new(credential));
    }

    let print = |line: &str| eprintln!("{line}");
    start_monitoring(&print);
    let report = agent.claim(&proof, &resolver, &print).await;

    println!("{}", serde_json::to_string_pretty(&report.outcome)?);
    if !report.outcome.success {
        process::exit(1);
    }
    Ok(())
}

fn load_proof(cli: &Cli) -> Result<AttestationProof, Box<dyn Error>> {
    if let Some(path) = cli.proof_file.as_ref() {
        let data = std::fs::read_to_string(path)?;
        return Ok(serde_json::from_str(&data)?);
    }
    let mut proof = AttestationProof {
        verified: Some(!cli.unverified),
        ..AttestationProof::default()
    };
    proof.proof_id = cli.proof_id.clone();
    proof.classification = cli.classification.clone();
    Ok(proof)
}
