//! Output filesystem used by resource publishing.

use std::fmt;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Output filesystem with scoped open-for-write.
pub trait PublishFs: Send + Sync + fmt::Debug {
    /// Open `path` (a slash path relative to the output root) for writing,
    /// creating missing parent directories and truncating existing files.
    fn create(&self, path: &str) -> io::Result<Box<dyn Write + Send>>;
}

/// [`PublishFs`] rooted at an OS directory.
#[derive(Debug, Clone)]
pub struct OsPublishFs {
    root: PathBuf,
}

impl OsPublishFs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a slash path onto the root, dropping `..` so writes stay inside it.
    fn resolve(&self, path: &str) -> PathBuf {
        let clean = crate::core::key::clean(path);
        let mut full = self.root.clone();
        full.extend(clean.split('/').filter(|s| !s.is_empty()));
        full
    }
}

impl PublishFs for OsPublishFs {
    fn create(&self, path: &str) -> io::Result<Box<dyn Write + Send>> {
        let full = self.resolve(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(Box::new(File::create(full)?))
    }
}

/// Write `bytes` to every target, opening all of them before writing.
pub fn write_all_targets(fs: &dyn PublishFs, targets: &[String], bytes: &[u8]) -> io::Result<()> {
    let mut writers = targets
        .iter()
        .map(|target| fs.create(target))
        .collect::<io::Result<Vec<_>>>()?;
    for writer in &mut writers {
        writer.write_all(bytes)?;
        writer.flush()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_os_publish_fs_creates_parents() {
        let temp = TempDir::new().unwrap();
        let fs = OsPublishFs::new(temp.path());
        let mut w = fs.create("/sect3/b1/pic.png").unwrap();
        w.write_all(b"png").unwrap();
        drop(w);
        let written = std::fs::read(temp.path().join("sect3/b1/pic.png")).unwrap();
        assert_eq!(written, b"png");
    }

    #[test]
    fn test_os_publish_fs_stays_in_root() {
        let temp = TempDir::new().unwrap();
        let fs = OsPublishFs::new(temp.path().join("public"));
        fs.create("../../escape.txt").unwrap();
        assert!(temp.path().join("public/escape.txt").exists());
    }

    #[test]
    fn test_write_all_targets() {
        let temp = TempDir::new().unwrap();
        let fs = OsPublishFs::new(temp.path());
        let targets = vec!["/en/a.txt".to_string(), "/fr/a.txt".to_string()];
        write_all_targets(&fs, &targets, b"hi").unwrap();
        assert_eq!(std::fs::read(temp.path().join("en/a.txt")).unwrap(), b"hi");
        assert_eq!(std::fs::read(temp.path().join("fr/a.txt")).unwrap(), b"hi");
    }
}
