//! Configuration utility functions.

use std::path::{Path, PathBuf};

/// Extract path component from a URL string
///
/// Uses `url` crate for proper parsing, handling edge cases like:
/// - Port numbers: `https://example.com:8080/path` -> `path`
/// - Query strings: `https://example.com/path?query` -> `path`
///
/// Returns `None` if the URL is invalid
///
/// # Examples
/// ```ignore
/// extract_url_path("https://example.org/docs/") -> Some("docs")
/// extract_url_path("https://example.com")       -> Some("")
/// extract_url_path("invalid")                   -> None
/// ```
pub fn extract_url_path(url_str: &str) -> Option<String> {
    let parsed = url::Url::parse(url_str).ok()?;
    Some(parsed.path().trim_matches('/').to_string())
}

/// Find config file by searching upward from `start`
///
/// ```text
/// /home/user/site/content/posts/  ← start
/// /home/user/site/tola.toml       ← found!
/// ```
pub fn find_config_file(start: &Path, config_name: &Path) -> Option<PathBuf> {
    if config_name.is_absolute() {
        return config_name.exists().then(|| config_name.to_path_buf());
    }

    let mut current = start;
    loop {
        let candidate = current.join(config_name);
        if candidate.exists() {
            return Some(candidate);
        }
        current = current.parent()?;
    }
}
