mod cli;
mod output;

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::time::{MissedTickBehavior, interval};

use aha_config::{AppConfig, ChannelSecrets, channel_report, load_config};
use aha_server::{AwsClients, LogFormat, Poller, observability};

use cli::{Cli, Commands};
use output::{print_channels, print_error, print_success, summary_line};

#[tokio::main]
async fn main() {
    // .env is optional
    if let Err(e) = dotenvy::dotenv() {
        if !matches!(e, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound)
        {
            eprintln!("Warning: Failed to load .env file: {e}");
        }
    }

    if let Err(e) = run().await {
        print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref()).context("Failed to load configuration")?;
    let format = if config.json_logs() {
        LogFormat::Json
    } else {
        LogFormat::Text
    };
    observability::init_tracing_with(None, format);
    observability::apply_logging_level(cli.log_level.as_deref().unwrap_or(&config.log_level));

    let sdk_config = aha_server::load_sdk_config(&config).await;
    let secrets = aha_server::resolve_secrets(&sdk_config, &config).await;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Channels => {
            print_channels(&channel_report(&config, &secrets));
        }
        Commands::Run => {
            let poller = poller(&sdk_config, &config, &secrets).await;
            let summary = poller.run_once().await.context("Poll pass failed")?;
            print_success(&summary_line(&summary));
        }
        Commands::Watch(args) => {
            let poller = poller(&sdk_config, &config, &secrets).await;
            watch(&poller, Duration::from_secs(args.interval.max(1))).await;
        }
    }
    Ok(())
}

async fn poller(
    sdk_config: &aws_config::SdkConfig,
    config: &AppConfig,
    secrets: &ChannelSecrets,
) -> Poller {
    let clients = AwsClients::build(sdk_config, config, secrets.assume_role.as_deref()).await;
    aha_server::build_poller(config, secrets, &clients)
}

/// Runs passes until the process is stopped. A slow pass delays the next
/// tick instead of overlapping it.
async fn watch(poller: &Poller, period: Duration) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tracing::info!(interval_secs = period.as_secs(), "Watching for health events");

    loop {
        ticker.tick().await;
        if let Err(e) = poller.run_once().await {
            tracing::error!(error = %e, "Poll pass failed");
        }
    }
}
