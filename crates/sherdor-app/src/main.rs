//! Sherdor - report statistics from the command line
//!
//! Loads the config (first argument, or the default location), counts the
//! four report collections once and prints them as cards.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use sherdor_app::StatsAggregator;
use sherdor_core::{init_logging, LogConfig, SherdorConfig};
use sherdor_net::DataStoreClient;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(SherdorConfig::default_path);

    let mut config = SherdorConfig::load_or_default(&path)
        .with_context(|| format!("loading {}", path.display()))?;
    config.apply_env_overrides();

    init_logging(LogConfig::from_settings(&config.logging))?;
    info!(data_store = %config.data_store.url, "Starting Sherdor stats");

    let client = DataStoreClient::new(&config.data_store)?;
    let stats = StatsAggregator::new(Arc::new(client));

    let result = stats.refresh().await;
    let view = stats.view().await;

    println!("{}", config.pwa.app_name);
    for card in view.snapshot.cards() {
        println!("  {card}");
    }

    if let Err(e) = result {
        warn!("Counts above are stale");
        return Err(e).context("refreshing stats");
    }
    Ok(())
}
