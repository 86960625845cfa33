use anyhow::{Context, Result};
use profile_stats::{AppConfig, GithubClient, StatsAggregator, snapshot};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "profile_stats=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    // Fatal before any request is made.
    let config = AppConfig::from_env().inspect_err(|e| tracing::error!("{e}"))?;
    let path = snapshot::output_path(&config);

    tracing::info!("Updating GitHub stats for user: {}", config.username);

    let client = GithubClient::new(&config).context("Failed to build HTTP client")?;
    let mut aggregator = StatsAggregator::new(client, &config);
    let record = aggregator.assemble_record().await;

    snapshot::write_snapshot(&record, &path).inspect_err(|e| tracing::error!("{e}"))?;
    tracing::info!("Data: {}", serde_json::to_string(&record)?);

    if let Some(diagnostic) = &record.error_fetching {
        tracing::warn!(
            "Finished with {} fetch error(s); first: {diagnostic}",
            aggregator.diagnostics().count()
        );
    } else {
        tracing::info!("Finished");
    }

    Ok(())
}
