mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use vpndir_core::{Directory, ProviderId, UpdaterConfig};
use vpndir_extract::build_http_client;
use vpndir_resolver::{HickoryLookup, ParallelResolver};
use vpndir_updater::{Orchestrator, ProviderRegistry};

use crate::cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,vpndir=debug"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .init();
}

/// Update the requested providers. Returns false when any provider failed.
async fn run(cli: Cli) -> Result<bool> {
    let config = match &cli.config {
        Some(path) => UpdaterConfig::load_from(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => UpdaterConfig::load().context("loading config")?,
    }
    .with_env_overrides();
    config.validate().context("validating config")?;

    let snapshot_path = match cli.output {
        Some(path) => path,
        None => config.snapshot_path()?,
    };
    let mut directory = Directory::load(&snapshot_path)
        .with_context(|| format!("reading directory {}", snapshot_path.display()))?;

    let registry = ProviderRegistry::with_defaults();
    let providers = select_providers(cli.providers, &registry);

    let orchestrator = Orchestrator::new(
        build_http_client(&config.http)?,
        ParallelResolver::new(Arc::new(HickoryLookup::new())),
        config.resolver.clone(),
    );

    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_ctrl_c(cancel.clone()));

    info!(count = providers.len(), "updating providers");
    let updates = orchestrator
        .update_all(&registry, &providers, &config.updates, &cancel)
        .await;

    let timestamp = chrono::Utc::now().timestamp();
    let mut all_succeeded = true;
    let mut updated = 0;

    for update in updates {
        let provider = update.provider;
        match update.result {
            Ok(outcome) => {
                for warning in &outcome.warnings {
                    warn!(provider = %provider, "{warning}");
                }
                let previous = directory.get(provider).map_or(0, |s| s.servers.len());
                info!(
                    provider = %provider,
                    servers = outcome.servers.len(),
                    previous,
                    "provider updated"
                );
                directory.replace(provider, outcome.servers, timestamp);
                updated += 1;
            }
            Err(err) => {
                all_succeeded = false;
                if err.is_cancelled() {
                    warn!(provider = %provider, "update cancelled, keeping previous servers");
                } else {
                    error!(provider = %provider, error = %err, "update failed, keeping previous servers");
                }
            }
        }
    }

    if cli.dry_run {
        info!(updated, "dry run, directory not written");
    } else if updated > 0 {
        directory
            .save(&snapshot_path)
            .with_context(|| format!("writing directory {}", snapshot_path.display()))?;
        info!(updated, path = %snapshot_path.display(), "directory written");
    }

    Ok(all_succeeded)
}

/// Requested providers in name order without repeats, or every registered one.
fn select_providers(mut requested: Vec<ProviderId>, registry: &ProviderRegistry) -> Vec<ProviderId> {
    if requested.is_empty() {
        return registry.providers();
    }
    requested.sort_unstable();
    requested.dedup();
    requested
}

async fn cancel_on_ctrl_c(cancel: CancellationToken) {
    if tokio::signal::ctrl_c().await.is_ok() {
        warn!("interrupted, cancelling updates");
        cancel.cancel();
    }
}
