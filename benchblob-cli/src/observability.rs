//! Tracing bootstrap for the CLI.

use std::env;
use std::io::IsTerminal;

use tracing::Level;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, prelude::*};

use crate::config::{Config, LogFormat};

/// Initializes the global tracing subscriber from the configuration.
pub fn init_tracing(config: &Config) {
    let (level, env_filter) = parse_rust_log(config.logging.level);

    let format = match config.logging.format {
        LogFormat::Auto if std::io::stderr().is_terminal() => LogFormat::Pretty,
        LogFormat::Auto => LogFormat::Simplified,
        other => other,
    };

    let fmt = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true);

    let registry = tracing_subscriber::registry();
    match format {
        LogFormat::Auto | LogFormat::Pretty => registry
            .with(fmt.with_filter(level))
            .with(env_filter)
            .init(),
        LogFormat::Simplified => registry
            .with(fmt.with_ansi(false).compact().with_filter(level))
            .with(env_filter)
            .init(),
        LogFormat::Json => registry
            .with(fmt.json().with_filter(level))
            .with(env_filter)
            .init(),
    }
}

fn parse_rust_log(configured: LevelFilter) -> (LevelFilter, EnvFilter) {
    // Try to parse RUST_LOG as a simple level filter and apply default levels
    // internally. Otherwise, use it literally if the user knows which
    // overrides they want to run.
    let level = match env::var(EnvFilter::DEFAULT_ENV) {
        Ok(value) => match value.parse::<Level>() {
            Ok(level) => LevelFilter::from(level),
            Err(_) => return (LevelFilter::TRACE, EnvFilter::new(value)),
        },
        Err(_) => configured,
    };

    // This is the maximum verbosity that will be logged, we filter this down to `level`.
    let env_filter = EnvFilter::new(
        "INFO,\
        benchblob_cli=TRACE,\
        benchblob_service=TRACE,\
        ",
    );

    (level, env_filter)
}
