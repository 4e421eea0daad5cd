//! Site configuration management for `tola.toml`.
//!
//! # Sections
//!
//! | Section          | Purpose                                        |
//! |------------------|------------------------------------------------|
//! | `[site]`         | Title, base URL, language                      |
//! | `[build]`        | Content / output dirs, resource publishing     |
//! | `[taxonomies]`   | `singular = "plural"` taxonomy names           |
//!
//! Every field has a default; an empty file is a valid config. Unknown keys
//! are reported as warnings and otherwise ignored.

mod error;
mod util;

pub use error::ConfigError;
pub use util::{extract_url_path, find_config_file};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::log;
use crate::resource::SpecOptions;
use crate::tree::BuildOptions;

// ============================================================================
// sections
// ============================================================================

/// `[site]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSection {
    /// Home page title, used when home has none
    pub title: String,
    /// Absolute base URL; its path part becomes the link base path
    pub base_url: Option<String>,
    /// Content language, stripped from `page.<lang>.md` names
    pub language: String,
}

impl Default for SiteSection {
    fn default() -> Self {
        Self {
            title: String::new(),
            base_url: None,
            language: "en".to_string(),
        }
    }
}

/// `[build]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSection {
    /// Content directory, relative to the config file
    pub content: PathBuf,
    /// Output directory, relative to the config file
    pub output: PathBuf,
    /// Publish resources on first link access instead of eagerly
    pub lazy_publish: bool,
    /// Output sub-directories; each resource is written once per entry
    pub multihost_dirs: Vec<String>,
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            content: PathBuf::from("content"),
            output: PathBuf::from("public"),
            lazy_publish: true,
            multihost_dirs: Vec::new(),
        }
    }
}

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing tola.toml
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Project root directory - parent of config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    pub site: SiteSection,

    pub build: BuildSection,

    /// `singular -> plural`, e.g. `category = "categories"`
    pub taxonomies: BTreeMap<String, String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::new(),
            site: SiteSection::default(),
            build: BuildSection::default(),
            taxonomies: BTreeMap::from([
                ("category".to_string(), "categories".to_string()),
                ("tag".to_string(), "tags".to_string()),
            ]),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file; the project root is its parent.
    ///
    /// Unknown fields are logged as warnings.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (mut config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        config.root = path.parent().map(Path::to_path_buf).unwrap_or_default();
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let (config, _) = Self::parse_with_ignored(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring: {}", display_path, fields.join(", "));
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(url) = &self.site.base_url
            && extract_url_path(url).is_none()
        {
            return Err(ConfigError::Validation(format!(
                "site.base_url `{url}` is not an absolute URL"
            )));
        }
        if self.site.language.contains(['.', '/']) {
            return Err(ConfigError::Validation(format!(
                "site.language `{}` must not contain `.` or `/`",
                self.site.language
            )));
        }
        if let Some(plural) = self.taxonomies.values().find(|p| p.trim_matches('/').is_empty()) {
            return Err(ConfigError::Validation(format!(
                "taxonomy plural `{plural}` must not be empty"
            )));
        }
        Ok(())
    }

    // ========================================================================
    // derived settings
    // ========================================================================

    pub fn content_dir(&self) -> PathBuf {
        self.root.join(&self.build.content)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.root.join(&self.build.output)
    }

    pub fn spec_options(&self) -> SpecOptions {
        SpecOptions {
            base_url: self.site.base_url.clone(),
            multihost_dirs: self.build.multihost_dirs.clone(),
            lazy_publish: self.build.lazy_publish,
        }
    }

    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            language: self.site.language.clone(),
        }
    }

    /// Taxonomy plurals in a stable order.
    pub fn taxonomy_plurals(&self) -> Vec<String> {
        self.taxonomies.values().cloned().collect()
    }
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = SiteConfig::from_str("").unwrap();
        assert_eq!(config.site.language, "en");
        assert_eq!(config.build.content, PathBuf::from("content"));
        assert!(config.build.lazy_publish);
        assert_eq!(config.taxonomy_plurals(), ["categories", "tags"]);
    }

    #[test]
    fn test_full_config() {
        let config = SiteConfig::from_str(
            r#"
            [site]
            title = "My Site"
            base_url = "https://example.org/docs/"
            language = "fr"

            [build]
            content = "src"
            output = "dist"
            lazy_publish = false
            multihost_dirs = ["en", "fr"]

            [taxonomies]
            series = "series"
            "#,
        )
        .unwrap();

        assert_eq!(config.site.title, "My Site");
        assert_eq!(config.build.output, PathBuf::from("dist"));
        assert_eq!(config.taxonomy_plurals(), ["series"]);

        let options = config.spec_options();
        assert_eq!(options.base_url.as_deref(), Some("https://example.org/docs/"));
        assert_eq!(options.multihost_dirs, ["en", "fr"]);
        assert!(!options.lazy_publish);
        assert_eq!(config.build_options().language, "fr");
    }

    #[test]
    fn test_unknown_fields_are_collected() {
        let (_, ignored) = SiteConfig::parse_with_ignored(
            r#"
            [site]
            title = "x"
            author = "me"

            [serve]
            port = 80
            "#,
        )
        .unwrap();
        assert_eq!(ignored, ["site.author", "serve"]);
    }

    #[test]
    fn test_invalid_base_url() {
        let err = SiteConfig::from_str("[site]\nbase_url = \"docs\"").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_invalid_toml() {
        let err = SiteConfig::from_str("[site\n").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn test_load_sets_root() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tola.toml");
        fs::write(&path, "[build]\ncontent = \"pages\"\n").unwrap();

        let config = SiteConfig::load(&path).unwrap();
        assert_eq!(config.root, dir.path());
        assert_eq!(config.content_dir(), dir.path().join("pages"));
        assert_eq!(config.output_dir(), dir.path().join("public"));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = SiteConfig::load(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(..)));
    }
}
