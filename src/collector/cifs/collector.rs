//! Reads `/proc/fs/cifs/Stats` through a [`FileSystem`] and parses it.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use super::error::CifsError;
use super::model::ClientStats;
use super::parser::parse_client_stats;
use crate::collector::traits::FileSystem;

/// Location of the stats file relative to the proc mount.
pub const STATS_PATH: &str = "fs/cifs/Stats";

/// Error type for collection failures.
#[derive(Error, Debug)]
pub enum CollectError {
    /// The stats file does not exist (cifs module not loaded).
    #[error("CIFS stats not available at {}", .0.display())]
    Unavailable(PathBuf),

    /// The stats file exists but could not be opened.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The stats file could not be read or parsed.
    #[error(transparent)]
    Parse(#[from] CifsError),
}

/// Collects CIFS client statistics.
pub struct CifsCollector<F: FileSystem> {
    fs: F,
    stats_path: PathBuf,
}

impl<F: FileSystem> CifsCollector<F> {
    /// Creates a new CIFS collector.
    ///
    /// # Arguments
    /// * `fs` - Filesystem implementation (real or mock)
    /// * `proc_path` - Base path to proc filesystem (usually "/proc")
    pub fn new(fs: F, proc_path: impl AsRef<Path>) -> Self {
        Self {
            fs,
            stats_path: proc_path.as_ref().join(STATS_PATH),
        }
    }

    pub fn stats_path(&self) -> &Path {
        &self.stats_path
    }

    /// Returns `true` if the stats file exists.
    pub fn is_available(&self) -> bool {
        self.fs.exists(&self.stats_path)
    }

    /// Reads and parses one snapshot of the stats file.
    pub fn collect(&self) -> Result<ClientStats, CollectError> {
        let reader = self.fs.open(&self.stats_path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => CollectError::Unavailable(self.stats_path.clone()),
            _ => CollectError::Io(e),
        })?;

        let stats = parse_client_stats(reader)?;
        debug!(
            "collected CIFS stats from {}: {} shares",
            self.stats_path.display(),
            stats.shares.len()
        );

        Ok(stats)
    }
}
