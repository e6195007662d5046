//! The two generation strategies and the chunked file writer.

use std::io::ErrorKind;
use std::path::Path;
use std::pin::Pin;
use std::process::Stdio;
use std::time::{Duration, Instant};
use std::{io, task};

use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};
use tokio::fs::OpenOptions;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt, BufWriter, ReadBuf};
use tokio::process::{Child, Command};

use crate::error::GeneratorError;

/// How the file contents are produced.
///
/// Both strategies yield streams that do not compress, which is what makes the
/// files usable for storage and network benchmarks.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Strategy {
    /// Pipe `/dev/zero` through `openssl enc -aes-256-ctr` with a one-shot
    /// random key. The AES keystream is incompressible and considerably
    /// faster than a userspace RNG on most hosts.
    OpenSsl,
    /// Fill chunks in-process from a fast non-crypto RNG.
    Rng,
}

/// The status of a target file on disk.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FileStatus {
    /// The file exists with exactly the expected byte length.
    Complete,
    /// The file does not exist.
    Missing,
    /// The file exists with the wrong byte length.
    Mismatch {
        /// The byte length found on disk.
        actual: u64,
    },
}

/// Stats a target file against its expected size.
pub async fn stat_target(path: &Path, expected: u64) -> Result<FileStatus, GeneratorError> {
    match tokio::fs::metadata(path).await {
        Ok(metadata) if metadata.len() == expected => Ok(FileStatus::Complete),
        Ok(metadata) => Ok(FileStatus::Mismatch {
            actual: metadata.len(),
        }),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(FileStatus::Missing),
        Err(err) => Err(err.into()),
    }
}

/// Writes target files using a fixed strategy.
#[derive(Debug)]
pub struct Generator {
    strategy: Strategy,
    chunk_size: usize,
    progress_interval: Duration,
}

impl Generator {
    /// Creates a generator for the given strategy.
    pub fn new(strategy: Strategy, chunk_size: usize, progress_interval: Duration) -> Self {
        Self {
            strategy,
            chunk_size,
            progress_interval,
        }
    }

    /// The strategy this generator writes with.
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Writes exactly `expected` bytes to `path`, overwriting whatever is
    /// there, and verifies the resulting byte length. A file that ends up
    /// with the wrong length is deleted before the error is returned, so the
    /// next run regenerates it.
    pub async fn write_file(&self, path: &Path, expected: u64) -> Result<(), GeneratorError> {
        let result = match self.strategy {
            Strategy::Rng => {
                let mut source = RngStream::new(rand::random(), expected);
                self.copy_to_file(&mut source, path, expected).await
            }
            Strategy::OpenSsl => {
                let (mut child, stdout) = spawn_openssl()?;
                let mut source = stdout.take(expected);
                let result = self.copy_to_file(&mut source, path, expected).await;

                // The zero stream never ends, so the child has to be killed.
                child.start_kill().ok();
                child.wait().await.ok();
                result
            }
        };

        if let Err(err) = result {
            tokio::fs::remove_file(path).await.ok();
            return Err(err);
        }

        match stat_target(path, expected).await? {
            FileStatus::Complete => Ok(()),
            FileStatus::Missing => Err(GeneratorError::SizeMismatch {
                path: path.to_path_buf(),
                expected,
                actual: 0,
            }),
            FileStatus::Mismatch { actual } => {
                tokio::fs::remove_file(path).await.ok();
                Err(GeneratorError::SizeMismatch {
                    path: path.to_path_buf(),
                    expected,
                    actual,
                })
            }
        }
    }

    async fn copy_to_file(
        &self,
        source: &mut (impl AsyncRead + Unpin),
        path: &Path,
        expected: u64,
    ) -> Result<(), GeneratorError> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .await?;
        let mut writer = BufWriter::with_capacity(self.chunk_size, file);

        let mut buf = vec![0u8; self.chunk_size];
        let mut written = 0u64;
        let mut last_progress = Instant::now();

        loop {
            let read = source.read(&mut buf).await?;
            if read == 0 {
                break;
            }
            writer.write_all(&buf[..read]).await?;
            written += read as u64;

            if last_progress.elapsed() >= self.progress_interval {
                tracing::info!(
                    path = %path.display(),
                    written,
                    expected,
                    "still writing"
                );
                last_progress = Instant::now();
            }
        }

        writer.flush().await?;
        let file = writer.into_inner();
        file.sync_data().await?;
        drop(file);

        if written != expected {
            return Err(GeneratorError::ShortRead {
                expected,
                actual: written,
            });
        }

        Ok(())
    }
}

fn spawn_openssl() -> Result<(Child, tokio::process::ChildStdout), GeneratorError> {
    let zero = std::fs::File::open("/dev/zero")?;

    let mut key = [0u8; 32];
    rand::rng().fill_bytes(&mut key);

    let mut child = Command::new("openssl")
        .args(["enc", "-aes-256-ctr", "-nosalt", "-pbkdf2", "-pass"])
        .arg(format!("pass:{}", hex::encode(key)))
        .stdin(Stdio::from(zero))
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|err| match err.kind() {
            ErrorKind::NotFound => GeneratorError::OpenSslUnavailable,
            _ => GeneratorError::Io(err),
        })?;

    let stdout = child.stdout.take().ok_or(GeneratorError::OpenSslUnavailable)?;
    Ok((child, stdout))
}

/// A bounded stream of random bytes.
struct RngStream {
    remaining: u64,
    rng: SmallRng,
}

impl RngStream {
    fn new(seed: u64, len: u64) -> Self {
        Self {
            remaining: len,
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl AsyncRead for RngStream {
    fn poll_read(
        mut self: Pin<&mut Self>,
        _cx: &mut task::Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> task::Poll<io::Result<()>> {
        let len_to_fill = (buf.remaining() as u64).min(self.remaining) as usize;

        let fill_buf = buf.initialize_unfilled_to(len_to_fill);
        self.rng.fill_bytes(fill_buf);

        self.remaining -= len_to_fill as u64;
        buf.advance(len_to_fill);

        task::Poll::Ready(Ok(()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator(strategy: Strategy) -> Generator {
        Generator::new(strategy, 16 * 1024, Duration::from_secs(5))
    }

    #[tokio::test]
    async fn rng_strategy_writes_the_exact_length() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("64KiB.bin");

        generator(Strategy::Rng)
            .write_file(&path, 64 * 1024)
            .await
            .unwrap();

        let contents = tokio::fs::read(&path).await.unwrap();
        assert_eq!(contents.len(), 64 * 1024);
        // A random stream has no long zero runs.
        assert!(contents.iter().any(|&b| b != 0));
    }

    #[tokio::test]
    async fn rng_strategy_overwrites_a_mismatched_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stale.bin");
        tokio::fs::write(&path, b"stale").await.unwrap();

        generator(Strategy::Rng).write_file(&path, 4096).await.unwrap();
        assert_eq!(stat_target(&path, 4096).await.unwrap(), FileStatus::Complete);
    }

    #[tokio::test]
    async fn stat_target_reports_all_states() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("probe.bin");

        assert_eq!(stat_target(&path, 10).await.unwrap(), FileStatus::Missing);

        tokio::fs::write(&path, [0u8; 7]).await.unwrap();
        assert_eq!(
            stat_target(&path, 10).await.unwrap(),
            FileStatus::Mismatch { actual: 7 }
        );
        assert_eq!(stat_target(&path, 7).await.unwrap(), FileStatus::Complete);
    }

    #[tokio::test]
    async fn openssl_strategy_writes_the_exact_length() {
        let caps = crate::capabilities::detect().await;
        if !caps.supports_openssl() {
            return;
        }

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("32KiB.bin");

        generator(Strategy::OpenSsl)
            .write_file(&path, 32 * 1024)
            .await
            .unwrap();

        let contents = tokio::fs::read(&path).await.unwrap();
        assert_eq!(contents.len(), 32 * 1024);
        assert!(contents.iter().any(|&b| b != 0));
    }
}
