use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use feed_digest::{Config, Delivery, Dialect, DigestPipeline, RunOutcome};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Post a translated digest of recently announced products to Slack.
#[derive(Parser, Debug)]
#[command(name = "feed-digest", version)]
struct Cli {
    /// Feed layout: atom or rss (overrides FEED_DIALECT)
    #[arg(long)]
    dialect: Option<Dialect>,

    /// Delivery mode: digest or per-entry (overrides DELIVERY_MODE)
    #[arg(long)]
    mode: Option<Delivery>,

    /// Recency window in hours (overrides RECENCY_WINDOW_HOURS)
    #[arg(long)]
    window_hours: Option<i64>,

    /// Print the Slack payloads instead of posting them
    #[arg(long)]
    dry_run: bool,
}

impl Cli {
    fn apply(&self, config: &mut Config) {
        if let Some(dialect) = self.dialect {
            config.dialect = dialect;
        }
        if let Some(mode) = self.mode {
            config.delivery = mode;
        }
        if let Some(hours) = self.window_hours {
            config.window_hours = hours;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env().context("Failed to load configuration")?;
    cli.apply(&mut config);
    config.validate().context("Invalid command line override")?;

    info!("Starting feed digest with {:?}", config);

    let pipeline = DigestPipeline::from_config(&config, cli.dry_run)
        .context("Failed to set up HTTP clients")?;

    match pipeline.run(Utc::now()).await {
        RunOutcome::FeedUnavailable => error!("Run ended: feed could not be fetched"),
        RunOutcome::NoEntries => warn!("Run ended: feed had no usable entries"),
        RunOutcome::NothingRecent => info!("Run ended: nothing new in the last {}h", config.window_hours),
        RunOutcome::NothingTranslated => error!("Run ended: no entry could be translated"),
        RunOutcome::Delivered(report) if report.messages_failed > 0 => error!(
            "Run finished with {} undelivered message(s): {:?}",
            report.messages_failed, report
        ),
        RunOutcome::Delivered(report) => info!("Run finished: {:?}", report),
    }

    Ok(())
}
