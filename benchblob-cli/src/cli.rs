//! Argument parsing and runtime bootstrap.

use std::path::PathBuf;

use anyhow::Result;
use argh::FromArgs;

use crate::config::Config;
use crate::{observability, pipeline};

/// Generator for incompressible storage/network benchmark files.
#[derive(Debug, FromArgs)]
struct Args {
    /// path to the YAML configuration file
    #[argh(option, short = 'c')]
    pub config: Option<PathBuf>,

    #[argh(subcommand)]
    pub command: Command,
}

#[derive(Debug, FromArgs)]
#[argh(subcommand)]
enum Command {
    Generate(GenerateCommand),
    Verify(VerifyCommand),
    Clean(CleanCommand),
    Version(VersionCommand),
}

/// generate the configured set of files and the index
#[derive(Debug, FromArgs)]
#[argh(subcommand, name = "generate")]
struct GenerateCommand {}

/// check every configured file against its expected size
///
/// Exits non-zero if any file is missing or has the wrong length. Never
/// modifies files.
#[derive(Debug, FromArgs)]
#[argh(subcommand, name = "verify")]
struct VerifyCommand {}

/// remove the generated files, the index, and the resume marker
#[derive(Debug, FromArgs)]
#[argh(subcommand, name = "clean")]
struct CleanCommand {}

/// print the benchblob version
#[derive(Default, Debug, FromArgs)]
#[argh(subcommand, name = "version")]
struct VersionCommand {}

/// Bootstrap the runtime and execute the CLI command.
pub fn execute() -> Result<()> {
    let args: Args = argh::from_env();

    // Special switch to just print the version and exit.
    if let Command::Version(_) = args.command {
        println!("{}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let config = Config::load(args.config.as_deref())?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .thread_name("main-rt")
        .enable_all()
        .build()?;
    let _runtime_guard = runtime.enter();

    observability::init_tracing(&config);
    tracing::debug!(?config);

    runtime.block_on(async move {
        match args.command {
            Command::Generate(GenerateCommand {}) => pipeline::generate(&config).await,
            Command::Verify(VerifyCommand {}) => pipeline::verify(&config).await,
            Command::Clean(CleanCommand {}) => pipeline::clean(&config).await,
            Command::Version(VersionCommand {}) => unreachable!(),
        }
    })
}
