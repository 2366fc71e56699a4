//! In-memory mock filesystem for testing collectors without real `/proc`.
//!
//! This module provides `MockFs` which simulates a filesystem in memory,
//! allowing tests to run on macOS and in CI environments without Linux.

use crate::collector::traits::FileSystem;
use std::collections::{HashMap, HashSet};
use std::io::{self, BufRead, Cursor};
use std::path::{Path, PathBuf};

/// In-memory filesystem for testing.
///
/// Stores files and directories in memory, allowing tests to simulate
/// various `/proc` filesystem states without needing actual Linux access.
#[derive(Debug, Clone, Default)]
pub struct MockFs {
    /// Map from path to file contents.
    files: HashMap<PathBuf, String>,
    /// Set of directories (for `exists` support).
    directories: HashSet<PathBuf>,
    /// Files that exist but fail to open with the given error kind.
    unreadable: HashMap<PathBuf, io::ErrorKind>,
}

impl MockFs {
    /// Creates a new empty mock filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file with the given content.
    ///
    /// Parent directories are automatically created.
    pub fn add_file(&mut self, path: impl AsRef<Path>, content: impl Into<String>) {
        let path = path.as_ref().to_path_buf();
        self.add_parents(&path);
        self.files.insert(path, content.into());
    }

    /// Adds an empty directory.
    pub fn add_dir(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();
        self.add_parents(&path);
        self.directories.insert(path);
    }

    /// Adds a file that exists but cannot be opened, e.g. because of permissions.
    pub fn add_unreadable(&mut self, path: impl AsRef<Path>, kind: io::ErrorKind) {
        let path = path.as_ref().to_path_buf();
        self.add_parents(&path);
        self.unreadable.insert(path, kind);
    }

    /// Loads a file from the real filesystem under a virtual path.
    ///
    /// This is useful for regression tests with captured `/proc` snapshots.
    pub fn from_snapshot(real_path: &Path, virtual_path: impl AsRef<Path>) -> io::Result<Self> {
        let mut fs = Self::new();
        fs.add_file(virtual_path, std::fs::read_to_string(real_path)?);
        Ok(fs)
    }

    fn add_parents(&mut self, path: &Path) {
        let mut parent = path.parent();
        while let Some(p) = parent {
            if !p.as_os_str().is_empty() {
                self.directories.insert(p.to_path_buf());
            }
            parent = p.parent();
        }
    }

    fn lookup(&self, path: &Path) -> io::Result<&String> {
        if let Some(kind) = self.unreadable.get(path) {
            return Err(io::Error::new(
                *kind,
                format!("cannot open file: {:?}", path),
            ));
        }
        self.files.get(path).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("file not found: {:?}", path),
            )
        })
    }
}

impl FileSystem for MockFs {
    fn open(&self, path: &Path) -> io::Result<Box<dyn BufRead + '_>> {
        let content = self.lookup(path)?;
        Ok(Box::new(Cursor::new(content.as_bytes())))
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.lookup(path).cloned()
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path)
            || self.directories.contains(path)
            || self.unreadable.contains_key(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_mock_fs_add_file() {
        let mut fs = MockFs::new();
        fs.add_file("/proc/fs/cifs/Stats", "CIFS Session: 1\n");

        assert!(fs.exists(Path::new("/proc/fs/cifs/Stats")));
        assert!(fs.exists(Path::new("/proc/fs/cifs")));
        assert!(fs.exists(Path::new("/proc")));

        let content = fs.read_to_string(Path::new("/proc/fs/cifs/Stats")).unwrap();
        assert_eq!(content, "CIFS Session: 1\n");
    }

    #[test]
    fn test_mock_fs_open_lines() {
        let mut fs = MockFs::new();
        fs.add_file("/proc/fs/cifs/Stats", "first\nsecond\n");

        let lines: Vec<String> = fs
            .open(Path::new("/proc/fs/cifs/Stats"))
            .unwrap()
            .lines()
            .collect::<io::Result<_>>()
            .unwrap();
        assert_eq!(lines, vec!["first", "second"]);
    }

    #[test]
    fn test_mock_fs_add_dir() {
        let mut fs = MockFs::new();
        fs.add_dir("/proc/fs/nfsd");
        assert!(fs.exists(Path::new("/proc/fs/nfsd")));
        assert!(fs.exists(Path::new("/proc/fs")));
        assert!(!fs.exists(Path::new("/proc/fs/cifs")));
    }

    #[test]
    fn test_mock_fs_unreadable() {
        let mut fs = MockFs::new();
        fs.add_unreadable("/proc/fs/cifs/Stats", io::ErrorKind::PermissionDenied);

        assert!(fs.exists(Path::new("/proc/fs/cifs/Stats")));
        let err = fs.open(Path::new("/proc/fs/cifs/Stats")).err().unwrap();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
    }

    #[test]
    fn test_mock_fs_from_snapshot() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "CIFS Session: 4").unwrap();

        let fs = MockFs::from_snapshot(file.path(), "/proc/fs/cifs/Stats").unwrap();
        let content = fs.read_to_string(Path::new("/proc/fs/cifs/Stats")).unwrap();
        assert_eq!(content, "CIFS Session: 4\n");
    }

    #[test]
    fn test_mock_fs_not_found() {
        let fs = MockFs::new();
        let result = fs.read_to_string(Path::new("/nonexistent"));
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::NotFound);
    }
}
