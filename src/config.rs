use anyhow::{Context, Result, bail};
use clap::Parser;
use std::env;
use std::time::Duration;

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bucket: String,
    pub local_root: String,
    pub interval: Duration,
    pub endpoint: Option<String>,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug)]
#[command(author, version, about = "Periodic S3 bucket mirroring daemon")]
pub struct Args {
    /// Bucket to mirror (overrides AWS_S3_BUCKET)
    #[arg(long)]
    pub bucket: Option<String>,

    /// Directory the bucket is mirrored into (overrides MIRROR_LOCAL_ROOT)
    #[arg(long)]
    pub local_root: Option<String>,

    /// Seconds between sync cycles (overrides MIRROR_INTERVAL_SECS)
    #[arg(long)]
    pub interval_secs: Option<u64>,

    /// Custom S3 endpoint, e.g. MinIO (overrides MIRROR_S3_ENDPOINT)
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Run a single sync cycle and exit
    #[arg(long)]
    pub once: bool,
}

const DEFAULT_INTERVAL_SECS: u64 = 600;

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig and once flag.
    pub fn from_env_and_args() -> Result<(Self, bool)> {
        // Parse CLI once
        let args = Args::parse();

        // --- Environment fallback ---
        let env_bucket = env::var("AWS_S3_BUCKET").ok();
        let env_root = env::var("MIRROR_LOCAL_ROOT").ok();
        let env_interval = match env::var("MIRROR_INTERVAL_SECS") {
            Ok(value) => Some(
                value
                    .parse::<u64>()
                    .with_context(|| format!("parsing MIRROR_INTERVAL_SECS value `{}`", value))?,
            ),
            Err(env::VarError::NotPresent) => None,
            Err(err) => return Err(err).context("reading MIRROR_INTERVAL_SECS"),
        };
        let env_endpoint = env::var("MIRROR_S3_ENDPOINT").ok();

        // --- Merge ---
        let bucket = match args.bucket.or(env_bucket) {
            Some(bucket) if !bucket.trim().is_empty() => bucket,
            _ => bail!("AWS_S3_BUCKET environment variable must be set"),
        };
        let local_root = args
            .local_root
            .or(env_root)
            .unwrap_or_else(|| format!("./{}", bucket));
        let interval_secs = args
            .interval_secs
            .or(env_interval)
            .unwrap_or(DEFAULT_INTERVAL_SECS);

        let cfg = Self {
            bucket,
            local_root,
            interval: Duration::from_secs(interval_secs),
            endpoint: args.endpoint.or(env_endpoint),
        };

        Ok((cfg, args.once))
    }
}
