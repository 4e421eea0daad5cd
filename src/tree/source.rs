//! Discovered-content feed consumed by the tree builder.

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

/// Custom opener for bytes that come from neither memory nor a plain file.
pub type OpenFn = Arc<dyn Fn() -> io::Result<Vec<u8>> + Send + Sync>;

/// Where the bytes of a discovered file live.
///
/// Reading is deferred: content files are read by the cascade propagator,
/// resources on first `content()` / `hash()` / `publish()`.
#[derive(Clone)]
pub enum Source {
    Bytes(Arc<[u8]>),
    File(PathBuf),
    Open(OpenFn),
}

impl Source {
    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::Bytes(Arc::from(bytes.into()))
    }

    pub fn read(&self) -> io::Result<Vec<u8>> {
        match self {
            Self::Bytes(bytes) => Ok(bytes.to_vec()),
            Self::File(path) => std::fs::read(path),
            Self::Open(open) => open(),
        }
    }
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bytes(bytes) => write!(f, "Bytes({} bytes)", bytes.len()),
            Self::File(path) => write!(f, "File({})", path.display()),
            Self::Open(_) => f.write_str("Open(..)"),
        }
    }
}

/// One discovered file.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Slash path relative to the content root, original case
    /// (e.g. `sect3/Unique2.md`).
    pub path: String,
    pub source: Source,
}

impl SourceFile {
    pub fn new(path: impl Into<String>, source: Source) -> Self {
        let path = path.into().replace('\\', "/");
        let path = path.trim_start_matches('/').to_string();
        Self { path, source }
    }

    /// In-memory file, mostly for data-driven pages and tests.
    pub fn from_bytes(path: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self::new(path, Source::bytes(bytes))
    }

    /// Directory part of `path`, without trailing slash.
    pub fn dir(&self) -> &str {
        let (dir, _) = crate::core::key::split(&self.path);
        dir.trim_end_matches('/')
    }

    /// File name part of `path`.
    pub fn file_name(&self) -> &str {
        crate::core::key::split(&self.path).1
    }
}
