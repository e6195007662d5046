//! The resume marker tracking which files a run has already completed.

use std::collections::BTreeSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::GeneratorError;
use crate::sizes::TargetFile;

/// File name of the resume marker inside the output directory.
pub const MARKER_FILE: &str = ".benchblob-resume.json";

/// Records which target files have been completed, so an interrupted run can
/// pick up where it left off.
///
/// The marker is persisted after every completed file and removed once the
/// whole set is done. It is only an accelerator: the byte-length check on
/// disk is authoritative, and a marker written for a different size ladder is
/// discarded.
#[derive(Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct ResumeMarker {
    ladder: Vec<String>,
    completed: BTreeSet<String>,
}

impl ResumeMarker {
    /// Creates a fresh marker for the given target set.
    pub fn new(targets: &[TargetFile]) -> Self {
        Self {
            ladder: targets.iter().map(TargetFile::file_name).collect(),
            completed: BTreeSet::new(),
        }
    }

    /// Loads the marker from the output directory.
    ///
    /// A missing, unreadable, or stale (different ladder) marker yields a
    /// fresh one.
    pub async fn load(dir: &Path, targets: &[TargetFile]) -> Result<Self, GeneratorError> {
        let fresh = Self::new(targets);

        let contents = match tokio::fs::read(marker_path(dir)).await {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(fresh),
            Err(err) => return Err(err.into()),
        };

        let marker: Self = match serde_json::from_slice(&contents) {
            Ok(marker) => marker,
            Err(err) => {
                tracing::warn!("discarding unreadable resume marker: {err}");
                return Ok(fresh);
            }
        };

        if marker.ladder != fresh.ladder {
            tracing::info!("resume marker was written for a different size set, discarding");
            return Ok(fresh);
        }

        Ok(marker)
    }

    /// Whether the marker records `name` as completed.
    pub fn is_completed(&self, name: &str) -> bool {
        self.completed.contains(name)
    }

    /// Records `name` as completed and persists the marker.
    pub async fn record(&mut self, dir: &Path, name: &str) -> Result<(), GeneratorError> {
        self.completed.insert(name.to_owned());
        self.persist(dir).await
    }

    async fn persist(&self, dir: &Path) -> Result<(), GeneratorError> {
        let path = marker_path(dir);
        let tmp = path.with_extension("json.tmp");

        // Write-then-rename so a crash never leaves a truncated marker.
        let contents = serde_json::to_vec_pretty(self).map_err(std::io::Error::from)?;
        tokio::fs::write(&tmp, contents).await?;
        tokio::fs::rename(&tmp, &path).await?;

        Ok(())
    }

    /// Removes the marker from the output directory, if present.
    pub async fn clear(dir: &Path) -> Result<(), GeneratorError> {
        match tokio::fs::remove_file(marker_path(dir)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

fn marker_path(dir: &Path) -> PathBuf {
    dir.join(MARKER_FILE)
}
