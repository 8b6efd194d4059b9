use std::path::PathBuf;

use clap::Parser;

/// Tripy: a conversational trip-planning assistant for the terminal.
#[derive(Parser, Debug)]
#[command(name = "tripy", version, about)]
pub struct Args {
    /// Config file path override.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level or filter directive (e.g. `debug`, `tripy_ai=trace`).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Resume a stored session by id or unique id prefix.
    #[arg(short, long)]
    pub session: Option<String>,

    /// Print replies only once they are complete.
    #[arg(long)]
    pub no_stream: bool,

    /// Conversation database path override.
    #[arg(long, conflicts_with = "ephemeral")]
    pub database: Option<PathBuf>,

    /// Keep conversations in memory only.
    #[arg(long)]
    pub ephemeral: bool,

    /// Print the effective configuration as TOML and exit.
    #[arg(long)]
    pub print_config: bool,
}

pub fn parse() -> Args {
    Args::parse()
}
