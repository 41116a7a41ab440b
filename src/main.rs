use anyhow::{bail, Context, Result};
use clap::Parser;
use stock_alerter::cli::{commands, Cli, Commands};
use stock_alerter::config::{AppConfig, LoggingConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load_from(&cli.config)
        .with_context(|| format!("loading configuration from {}", cli.config))?;
    if let Err(errors) = config.validate() {
        bail!("invalid configuration:\n  - {}", errors.join("\n  - "));
    }

    match cli.command() {
        Commands::Scan { tickers, dry_run } => {
            init_logging(&config.logging);
            let report = commands::scan(&config, &tickers, dry_run).await?;
            info!(
                "Done: {} analyzed, {} BUY signals, {} alerts sent, {} dry-run alerts",
                report.analyzed, report.buy_signals, report.alerts_sent, report.dry_run_alerts
            );
        }
        Commands::Analyze { ticker, json } => {
            init_logging_simple();
            commands::analyze(&config, &ticker, json).await?;
        }
        Commands::Spy {
            start,
            backtest_start,
            seed,
            json,
        } => {
            init_logging_simple();
            commands::spy(&config, start, backtest_start, seed, json).await?;
        }
        Commands::Plan => {
            init_logging_simple();
            commands::plan(&config);
        }
    }

    Ok(())
}

fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},hyper=warn,reqwest=warn", logging.level)));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn init_logging_simple() {
    // Minimal logging for read-only commands
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .try_init();
}
