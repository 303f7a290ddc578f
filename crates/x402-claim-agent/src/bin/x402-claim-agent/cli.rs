//! CLI definition for x402-claim-agent.

use clap::Parser;
use std::path::PathBuf;
use url::Url;
use x402_claim_agent::DEFAULT_CLAIM_URL;

/// Claims a reward for an attestation proof, paying the 402 challenge if needed.
#[derive(Parser, Debug)]
#[command(name = "x402-claim-agent")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Claim endpoint.
    #[arg(long, env = "CLAIM_REWARD_URL", default_value = DEFAULT_CLAIM_URL)]
    pub url: Url,

    /// Proof JSON file. Overrides the individual proof flags.
    #[arg(long)]
    pub proof_file: Option<PathBuf>,

    /// Proof identifier.
    #[arg(long)]
    pub proof_id: Option<String>,

    /// Classification the proof attests to.
    #[arg(long)]
    pub classification: Option<String>,

    /// Submit the proof as not verified.
    #[arg(long)]
    pub unverified: bool,

    /// Preconfigured payment credential presented for any challenge.
    #[arg(long, env = "X402_CREDENTIAL", hide_env_values = true)]
    pub credential: Option<String>,

    /// Timeout for the whole claim attempt (seconds).
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,

    /// Report an unpaid challenge as acknowledged instead of failing.
    #[arg(long)]
    pub acknowledge_unresolved: bool,

    /// Log level for the agent process.
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}
