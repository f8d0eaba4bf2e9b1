use clap::Parser;
use metrics_exporter_statsd::StatsdBuilder;
use rotor::config::{Config, Overrides};
use std::error::Error;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// User agent rotation server: serves one catalog entry per request,
/// persisting the rotation cursor in a Redis-over-REST store.
#[derive(Parser)]
struct Cli {
    /// Path to the YAML configuration file
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = Config::from_file(&cli.config)?;
    config.validate()?;

    if let Some(metrics_config) = &config.metrics {
        let recorder =
            StatsdBuilder::from(metrics_config.statsd_host.as_str(), metrics_config.statsd_port)
                .build(Some("rotor"))?;
        metrics::set_global_recorder(recorder)
            .map_err(|e| format!("failed to install metrics recorder: {e}"))?;
    }

    let overrides = Overrides::from_env();
    tracing::info!(?overrides, "starting rotation server");

    rotor::run(config, overrides).await?;
    Ok(())
}
