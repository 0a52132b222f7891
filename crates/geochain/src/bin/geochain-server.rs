//! `geochain-server`: runs a Geochain server configured from the
//! environment. See [`ServerConfig::from_env`] for the variables.

use std::sync::Arc;

use geochain::prelude::*;

#[tokio::main]
async fn main() -> Result<(), GeochainError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = ServerConfig::from_env()?;

    let dictionary = PlaceDictionary::load(&config.dictionary_path)?;

    let stats: Arc<dyn StatsRecorder> = match &config.stats_path {
        Some(path) => {
            tracing::info!(path = %path.display(), "recording stats to file");
            Arc::new(JsonStatsStore::open(path)?)
        }
        None => {
            tracing::info!("GEOCHAIN_STATS not set, keeping stats in memory");
            Arc::new(InMemoryStats::new())
        }
    };

    let server = GeochainServer::builder()
        .config(config)
        .build(Arc::new(dictionary), stats)
        .await?;
    tracing::info!(addr = %server.local_addr()?, "listening");

    server.run().await
}
