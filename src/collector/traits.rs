//! Abstractions for filesystem access to enable testing and mocking.
//!
//! The `FileSystem` trait allows the collector to work with both the real `/proc`
//! filesystem on Linux and mock implementations for testing on macOS or in CI.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Abstraction for filesystem operations.
///
/// This trait allows collectors to read from the real filesystem or from
/// a mock implementation for testing purposes.
pub trait FileSystem: Send + Sync {
    /// Opens a file for buffered, line-oriented reading.
    ///
    /// The returned reader owns the underlying handle; dropping it closes the file.
    fn open(&self, path: &Path) -> io::Result<Box<dyn BufRead + '_>>;

    /// Reads the entire contents of a file as a string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Checks if a path exists.
    fn exists(&self, path: &Path) -> bool;
}

/// Real filesystem implementation that delegates to `std::fs`.
///
/// Use this in production to read from the actual `/proc` filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFs;

impl RealFs {
    /// Creates a new `RealFs` instance.
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for RealFs {
    fn open(&self, path: &Path) -> io::Result<Box<dyn BufRead + '_>> {
        let file = File::open(path)?;
        Ok(Box::new(BufReader::new(file)))
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_real_fs_open_reads_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "CIFS Session: 1").unwrap();
        writeln!(file, "Share (unique mount targets): 2").unwrap();

        let fs = RealFs::new();
        let lines: Vec<String> = fs
            .open(file.path())
            .unwrap()
            .lines()
            .collect::<io::Result<_>>()
            .unwrap();
        assert_eq!(
            lines,
            vec!["CIFS Session: 1", "Share (unique mount targets): 2"]
        );
    }

    #[test]
    fn test_real_fs_read_to_string() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Resources in use").unwrap();

        let fs = RealFs::new();
        let content = fs.read_to_string(file.path()).unwrap();
        assert_eq!(content, "Resources in use\n");
    }

    #[test]
    fn test_real_fs_exists() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let fs = RealFs::new();
        assert!(fs.exists(file.path()));
        assert!(!fs.exists(Path::new("/nonexistent/path/12345")));
    }

    #[test]
    fn test_real_fs_open_missing() {
        let fs = RealFs::new();
        let err = fs.open(Path::new("/nonexistent/path/12345")).err().unwrap();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
