//! The linear generation pipeline behind the CLI subcommands.

use anyhow::{Context, Result, bail};
use bytesize::ByteSize;
use yansi::Paint;

use benchblob_service::generate::{FileStatus, Generator};
use benchblob_service::resume::ResumeMarker;
use benchblob_service::sizes::{self, TargetFile};
use benchblob_service::{capabilities, diskspace, index};

use crate::config::Config;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Outcome {
    Generated,
    Reused,
}

/// Runs the full pipeline: detect, check space, generate or reuse each file,
/// write the index, clear the resume marker.
pub async fn generate(config: &Config) -> Result<()> {
    let targets = sizes::ladder(&config.sizes)?;
    tokio::fs::create_dir_all(&config.output_dir)
        .await
        .with_context(|| format!("failed to create {:?}", config.output_dir))?;

    let caps = capabilities::detect().await;
    let strategy = config.strategy.resolve(&caps)?;
    tracing::info!(
        ?strategy,
        openssl = caps.openssl,
        dev_zero = caps.dev_zero,
        "selected generation strategy"
    );

    let generator = Generator::new(
        strategy,
        config.chunk_size.as_u64() as usize,
        config.progress_interval,
    );
    let mut marker = ResumeMarker::load(&config.output_dir, &targets).await?;

    let mut report = Vec::with_capacity(targets.len());
    for target in &targets {
        let name = target.file_name();
        let path = config.output_dir.join(&name);

        match benchblob_service::generate::stat_target(&path, target.bytes()).await? {
            FileStatus::Complete => {
                tracing::info!(file = %name, "already complete, reusing");
                if !marker.is_completed(&name) {
                    marker.record(&config.output_dir, &name).await?;
                }
                report.push((target.clone(), Outcome::Reused));
                continue;
            }
            FileStatus::Mismatch { actual } => {
                tracing::warn!(
                    file = %name,
                    actual,
                    expected = target.bytes(),
                    "size mismatch, regenerating"
                );
                tokio::fs::remove_file(&path)
                    .await
                    .with_context(|| format!("failed to remove mismatched {name}"))?;
            }
            FileStatus::Missing => {}
        }

        diskspace::ensure_space(&config.output_dir, target.bytes(), config.reserve.as_u64())?;

        tracing::info!(file = %name, size = %ByteSize::b(target.bytes()), "generating");
        generator.write_file(&path, target.bytes()).await?;

        marker.record(&config.output_dir, &name).await?;
        report.push((target.clone(), Outcome::Generated));
    }

    index::write_index(&config.output_dir, &config.index.title, &targets).await?;
    ResumeMarker::clear(&config.output_dir).await?;

    print_report(&report);
    Ok(())
}

/// Re-stats every target and reports its status; errors if anything is
/// missing or mis-sized. Never modifies files.
pub async fn verify(config: &Config) -> Result<()> {
    let targets = sizes::ladder(&config.sizes)?;

    let mut incomplete = 0usize;
    for target in &targets {
        let name = target.file_name();
        let path = config.output_dir.join(&name);

        match benchblob_service::generate::stat_target(&path, target.bytes()).await? {
            FileStatus::Complete => {
                println!("{} {name}", "complete".bold().green());
            }
            FileStatus::Missing => {
                println!("{} {name}", "missing ".bold().red());
                incomplete += 1;
            }
            FileStatus::Mismatch { actual } => {
                println!(
                    "{} {name} ({} of {})",
                    "mismatch".bold().red(),
                    ByteSize::b(actual),
                    ByteSize::b(target.bytes())
                );
                incomplete += 1;
            }
        }
    }

    if incomplete > 0 {
        bail!("{incomplete} of {} files are incomplete", targets.len());
    }
    Ok(())
}

/// Removes the generated files, the index artifacts, and the resume marker.
pub async fn clean(config: &Config) -> Result<()> {
    let targets = sizes::ladder(&config.sizes)?;

    let mut artifacts: Vec<String> = targets.iter().map(TargetFile::file_name).collect();
    artifacts.push(index::INDEX_FILE.into());
    artifacts.push(index::MANIFEST_FILE.into());

    for name in artifacts {
        match tokio::fs::remove_file(config.output_dir.join(&name)).await {
            Ok(()) => tracing::info!(file = %name, "removed"),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => return Err(err).with_context(|| format!("failed to remove {name}")),
        }
    }

    ResumeMarker::clear(&config.output_dir).await?;
    Ok(())
}

fn print_report(report: &[(TargetFile, Outcome)]) {
    let generated: u64 = report
        .iter()
        .filter(|(_, outcome)| *outcome == Outcome::Generated)
        .map(|(target, _)| target.bytes())
        .sum();

    println!();
    println!("{}", "## Generated files".bold());
    for (target, outcome) in report {
        let outcome = match outcome {
            Outcome::Generated => "generated".bold().green(),
            Outcome::Reused => "reused   ".bold().blue(),
        };
        println!("{outcome} {} ({})", target.file_name(), target.display_size());
    }
    println!();
    println!("{} written", ByteSize::b(generated).bold());
}
