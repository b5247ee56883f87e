use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "aha")]
#[command(about = "AWS Health Aware: poll AWS Health and fan out notifications")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Config file path (defaults to aha.toml when present)
    #[arg(short, long, global = true, env = "AHA_CONFIG")]
    pub config: Option<String>,

    /// Log level (overrides LOG_LEVEL)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Run one poll pass (default)
    Run,
    /// Run poll passes on a fixed interval
    Watch(WatchArgs),
    /// Show which notification channels are enabled
    Channels,
}

#[derive(clap::Args, Clone)]
pub struct WatchArgs {
    /// Seconds between pass starts
    #[arg(short, long, env = "AHA_POLL_INTERVAL", default_value_t = 60)]
    pub interval: u64,
}
