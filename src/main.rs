use anyhow::Result;
use bucket_mirror::config::AppConfig;
use bucket_mirror::services::{remote::S3RemoteStore, scheduler, sync_service::SyncService};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // --- Logging setup ---
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // --- Parse config + once flag ---
    let (cfg, once) = AppConfig::from_env_and_args()?;

    tracing::info!("Starting bucket-mirror with config: {:?}", cfg);

    // --- Initialize S3 client ---
    let store = Arc::new(S3RemoteStore::from_env(cfg.endpoint.as_deref()).await);

    // --- Initialize core service ---
    let service = SyncService::new(store, cfg.bucket.clone(), cfg.local_root.clone());

    // --- Handle one-shot mode ---
    if once {
        tracing::info!("starting sync cycle");
        service.run_cycle().await?;
        tracing::info!("One-shot cycle complete.");
        return Ok(()); // exit after a single pass
    }

    // --- Wire shutdown signal ---
    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signal_token.cancel();
        }
    });

    // --- Run scheduler ---
    scheduler::run(service, cfg.interval, shutdown).await;

    Ok(())
}
