mod boot;
mod cli;
mod commands;
mod repl;

use std::process::ExitCode;

use tracing::{error, info, warn};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;
use tripy_common::TripyError;
use tripy_config::{Credentials, LoggingConfig, TripyConfig};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Turn `--log-level` or `[logging] level` into filter directives. A bare
/// level applies to the Tripy crates only.
fn log_directive(level: &str) -> String {
    let level = level.trim();
    if LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
        LoggingConfig {
            level: level.to_ascii_lowercase(),
        }
        .directive()
    } else {
        level.to_string()
    }
}

/// Logs go to stderr so the conversation on stdout stays clean.
fn init_logging(directive: &str) {
    let mut filter = EnvFilter::from_default_env();
    if std::env::var_os("RUST_LOG").is_none() {
        filter = filter.add_directive(LevelFilter::WARN.into());
    }
    for part in directive.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        match part.parse() {
            Ok(d) => filter = filter.add_directive(d),
            Err(e) => eprintln!("ignoring invalid log directive '{part}': {e}"),
        }
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(args: cli::Args, config: TripyConfig) -> Result<(), TripyError> {
    let credentials = Credentials::from_env();
    let app = boot::build(&args, &config, &credentials)?;
    info!(session = %app.sessions.current_id().short(), stream = app.stream, "ready");
    repl::Repl::new(app).run().await
}

#[tokio::main]
async fn main() -> ExitCode {
    tripy_config::load_env_files();
    let args = cli::parse();

    // An explicit --config must load; the default file falls back to defaults.
    let (config, fallback) = match tripy_config::load_config(args.config.as_deref()) {
        Ok(config) => (config, None),
        Err(e) if args.config.is_some() => {
            eprintln!("tripy: {e}");
            return ExitCode::FAILURE;
        }
        Err(e) => (TripyConfig::default(), Some(e)),
    };

    if args.print_config {
        print!("{}", tripy_config::config_to_toml(&config));
        return ExitCode::SUCCESS;
    }

    let level = args
        .log_level
        .clone()
        .unwrap_or_else(|| config.logging.level.clone());
    init_logging(&log_directive(&level));

    info!("Tripy v{} starting...", env!("CARGO_PKG_VERSION"));
    if let Some(e) = fallback {
        warn!("Config load failed, using defaults: {e}");
    }

    match run(args, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("fatal: {e}");
            eprintln!("tripy: {e}");
            ExitCode::FAILURE
        }
    }
}
