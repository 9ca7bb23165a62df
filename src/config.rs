//! Configuration and CLI argument handling

use std::path::PathBuf;

use clap::Parser;

use crate::state::Durations;

/// CLI argument parsing structure
#[derive(Debug, Parser)]
#[command(name = "twenty-twenty")]
#[command(about = "A 20-20-20 eye-strain reminder daemon")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20020")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Where to persist timer and schedule state
    #[arg(long)]
    pub state_file: Option<PathBuf>,

    /// Keep state in memory only
    #[arg(long, conflicts_with = "state_file")]
    pub ephemeral: bool,

    /// Work interval in minutes
    #[arg(short, long, default_value = "20", value_parser = clap::value_parser!(u64).range(1..))]
    pub work_minutes: u64,

    /// Break length in seconds
    #[arg(short, long, default_value = "20", value_parser = clap::value_parser!(u64).range(1..))]
    pub break_seconds: u64,

    /// Seconds between schedule checks
    #[arg(long, default_value = "60", value_parser = clap::value_parser!(u64).range(1..))]
    pub schedule_poll_seconds: u64,

    /// Program run as `<program> <title> <message>` for each alert, e.g. notify-send
    #[arg(long)]
    pub notify_command: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    pub fn durations(&self) -> Durations {
        Durations::new(self.work_minutes * 60 * 1000, self.break_seconds * 1000)
    }

    /// State file path, defaulting to `<config dir>/twenty-twenty/state.json`
    pub fn state_path(&self) -> PathBuf {
        self.state_file.clone().unwrap_or_else(|| {
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("twenty-twenty")
                .join("state.json")
        })
    }
}
