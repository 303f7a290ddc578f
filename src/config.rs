//! Configuration module for the claim server.
//!
//! Values come from an optional JSON file (`--config <path>` or `$CONFIG`). Fields missing
//! from the file fall back to environment variables, then to hardcoded defaults.
//!
//! ```json
//! {
//!   "port": 5000,
//!   "challenge": { "mode": "ledger", "ttlSecs": 300 },
//!   "reward": { "amount": "1.0", "unit": "PRP" },
//!   "cors": { "fallbackOrigin": "http://localhost:5173" }
//! }
//! ```

use axum::http::HeaderValue;
use clap::Parser;
use serde::Deserialize;
use std::fs;
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;
use x402_claim_types::{ChallengeToken, Reward};

use crate::challenge::{ChallengeIssuer, ChallengeLedger};
use crate::handlers::ClaimServer;

/// CLI arguments for the claim server.
#[derive(Parser, Debug)]
#[command(name = "x402-claim")]
#[command(about = "x402 reward claim HTTP server")]
struct CliArgs {
    /// Path to the JSON configuration file
    #[arg(long, short, env = "CONFIG")]
    config: Option<PathBuf>,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "config_defaults::default_port")]
    port: u16,
    #[serde(default = "config_defaults::default_host")]
    host: IpAddr,
    #[serde(default)]
    challenge: ChallengeConfig,
    #[serde(default)]
    reward: Reward,
    #[serde(default)]
    cors: CorsConfig,
}

/// How challenge tokens are issued.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum ChallengeConfig {
    /// One fixed token, no server-side state.
    #[serde(rename_all = "camelCase")]
    Static {
        #[serde(default = "config_defaults::default_challenge_token")]
        token: String,
    },
    /// Random single-use tokens bound to the proof, valid for `ttl_secs`.
    #[serde(rename_all = "camelCase")]
    Ledger {
        #[serde(default = "config_defaults::default_challenge_ttl_secs")]
        ttl_secs: u64,
    },
}

impl Default for ChallengeConfig {
    fn default() -> Self {
        ChallengeConfig::Static {
            token: config_defaults::default_challenge_token(),
        }
    }
}

impl ChallengeConfig {
    pub fn issuer(&self) -> ChallengeIssuer {
        match self {
            ChallengeConfig::Static { token } => {
                ChallengeIssuer::Static(ChallengeToken::new(token.clone()))
            }
            ChallengeConfig::Ledger { ttl_secs } => {
                ChallengeIssuer::Ledger(ChallengeLedger::new(Duration::from_secs(*ttl_secs)))
            }
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorsConfig {
    /// Origin echoed on claim preflights that carry no `Origin` header.
    #[serde(default = "config_defaults::default_cors_origin")]
    fallback_origin: String,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            fallback_origin: config_defaults::default_cors_origin(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: config_defaults::default_port(),
            host: config_defaults::default_host(),
            challenge: ChallengeConfig::default(),
            reward: Reward::default(),
            cors: CorsConfig::default(),
        }
    }
}

pub mod config_defaults {
    use std::env;
    use std::net::{IpAddr, Ipv4Addr};

    use crate::challenge::DEFAULT_CHALLENGE_TOKEN;
    use crate::handlers::DEFAULT_CORS_ORIGIN;

    pub const DEFAULT_PORT: u16 = 5000;
    pub const DEFAULT_HOST: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);
    pub const DEFAULT_CHALLENGE_TTL_SECS: u64 = 300;

    /// $PORT -> 5000
    pub fn default_port() -> u16 {
        env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_PORT)
    }

    /// $HOST -> 0.0.0.0
    pub fn default_host() -> IpAddr {
        env::var("HOST")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_HOST)
    }

    /// $X402_CHALLENGE_TOKEN -> "monad-testnet-0x123"
    pub fn default_challenge_token() -> String {
        env::var("X402_CHALLENGE_TOKEN")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_CHALLENGE_TOKEN.to_string())
    }

    pub fn default_challenge_ttl_secs() -> u64 {
        DEFAULT_CHALLENGE_TTL_SECS
    }

    /// $CORS_FALLBACK_ORIGIN -> "http://localhost:5173"
    pub fn default_cors_origin() -> String {
        env::var("CORS_FALLBACK_ORIGIN").unwrap_or_else(|_| DEFAULT_CORS_ORIGIN.to_string())
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {0}: {1}")]
    FileRead(PathBuf, std::io::Error),
    #[error("Failed to parse config file: {0}")]
    JsonParse(#[from] serde_json::Error),
    #[error("Invalid CORS fallback origin {0:?}")]
    InvalidOrigin(String),
    #[error("Invalid static challenge token {0:?}: must be a non-empty header value")]
    InvalidChallengeToken(String),
}

impl Config {
    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn host(&self) -> IpAddr {
        self.host
    }

    pub fn challenge(&self) -> &ChallengeConfig {
        &self.challenge
    }

    pub fn reward(&self) -> &Reward {
        &self.reward
    }

    /// Load configuration from CLI arguments and, if given, a JSON file.
    pub fn load() -> Result<Self, ConfigError> {
        let cli_args = CliArgs::parse();
        match cli_args.config {
            Some(path) => Self::load_from_path(path),
            None => Ok(Self::default()),
        }
    }

    fn load_from_path(path: PathBuf) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(&path).map_err(|e| ConfigError::FileRead(path, e))?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Builds the claim endpoint state described by this configuration.
    ///
    /// A static challenge token must be sendable in the `x402-payment-request` header.
    pub fn claim_server(&self) -> Result<ClaimServer, ConfigError> {
        if let ChallengeConfig::Static { token } = &self.challenge {
            if token.is_empty() || HeaderValue::from_str(token).is_err() {
                return Err(ConfigError::InvalidChallengeToken(token.clone()));
            }
        }
        let origin = HeaderValue::from_str(&self.cors.fallback_origin)
            .map_err(|_| ConfigError::InvalidOrigin(self.cors.fallback_origin.clone()))?;
        Ok(
            ClaimServer::new(self.challenge.issuer(), self.reward.clone())
                .with_cors_fallback_origin(origin),
        )
    }
}
