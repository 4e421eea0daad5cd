//! A file resource attached to a page, materialized lazily.
//!
//! `content()`, `hash()` and `publish()` each run their I/O at most once per
//! instance; later and concurrent callers observe the memoized result,
//! including a memoized failure.

use std::fmt;
use std::sync::{Arc, OnceLock};

use serde_json::Value;

use super::{MediaType, PathSpec, ResourceError, publish};
use crate::core::{InitGuard, InitState, JsonMap, key};
use crate::tree::Source;

/// Paths supplied by the owning page for its sub-resources.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetPaths {
    /// Output directory of the page's resources (e.g. `sect3/b1`).
    pub sub_resource_base_target: String,
    /// Link directory of the page's resources, usually the same.
    pub sub_resource_base_link: String,
}

impl TargetPaths {
    pub fn new(base: impl Into<String>) -> Self {
        let base = base.into();
        Self {
            sub_resource_base_link: base.clone(),
            sub_resource_base_target: base,
        }
    }
}

/// Input for [`super::ResourceSpec::new_resource`].
#[derive(Debug, Clone)]
pub struct ResourceDescriptor {
    pub source: Source,
    /// Slash path relative to the owning bundle (e.g. `images/pic.png`).
    pub rel_target: String,
    pub target_paths: TargetPaths,
}

/// Front matter overrides for `name`, `title` and `params`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceMeta {
    pub name: Option<String>,
    pub title: Option<String>,
    pub params: JsonMap,
}

/// Publishing state, mirrored from the publish guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishState {
    Unpublished,
    Publishing,
    Published,
}

pub struct Resource {
    paths: Arc<PathSpec>,
    source: Source,
    /// Relative target directory (slash path, may be empty).
    dir: String,
    /// Relative target file name.
    file: String,
    target_paths: TargetPaths,
    base_offset: String,
    media_type: MediaType,
    meta: OnceLock<ResourceMeta>,
    content: InitGuard<Result<Arc<[u8]>, ResourceError>>,
    hash: InitGuard<Result<String, ResourceError>>,
    published: InitGuard<Result<(), ResourceError>>,
}

impl Resource {
    pub(super) fn new(paths: Arc<PathSpec>, desc: ResourceDescriptor) -> Self {
        let rel = key::clean(&desc.rel_target);
        let (dir, file) = key::split(rel.trim_start_matches('/'));
        Self {
            paths,
            media_type: MediaType::from_path(file),
            dir: dir.trim_end_matches('/').to_string(),
            file: file.to_string(),
            source: desc.source,
            target_paths: desc.target_paths,
            base_offset: String::new(),
            meta: OnceLock::new(),
            content: InitGuard::new(),
            hash: InitGuard::new(),
            published: InitGuard::new(),
        }
    }

    /// A copy placed under `base`, with its own content, hash and publish
    /// state.
    pub fn with_base_offset(&self, base: &str) -> Resource {
        Resource {
            paths: Arc::clone(&self.paths),
            source: self.source.clone(),
            dir: self.dir.clone(),
            file: self.file.clone(),
            target_paths: self.target_paths.clone(),
            base_offset: base.trim_matches('/').to_string(),
            media_type: self.media_type,
            meta: self.meta.clone(),
            content: InitGuard::new(),
            hash: InitGuard::new(),
            published: InitGuard::new(),
        }
    }

    // ========================================================================
    // Metadata
    // ========================================================================

    /// Relative target path, e.g. `images/pic.png`.
    pub fn key(&self) -> String {
        if self.dir.is_empty() {
            self.file.clone()
        } else {
            format!("{}/{}", self.dir, self.file)
        }
    }

    /// Same as [`Self::key`].
    pub fn target_path(&self) -> String {
        self.key()
    }

    /// Key of this resource in the resource cache (owner base + key).
    pub fn cache_key(&self) -> String {
        super::target_key(&key::join(&[
            &self.target_paths.sub_resource_base_target,
            &self.key(),
        ]))
    }

    pub fn name(&self) -> String {
        self.meta
            .get()
            .and_then(|m| m.name.clone())
            .unwrap_or_else(|| self.key())
    }

    pub fn title(&self) -> String {
        self.meta
            .get()
            .and_then(|m| m.title.clone())
            .unwrap_or_else(|| self.key())
    }

    pub fn params(&self) -> JsonMap {
        self.meta.get().map(|m| m.params.clone()).unwrap_or_default()
    }

    pub fn param(&self, key: &str) -> Option<Value> {
        self.meta.get()?.params.get(&key.to_lowercase()).cloned()
    }

    /// Attach front matter metadata. Only the first call has an effect.
    pub fn set_meta(&self, meta: ResourceMeta) -> bool {
        self.meta.set(meta).is_ok()
    }

    pub fn media_type(&self) -> MediaType {
        self.media_type
    }

    pub fn resource_type(&self) -> &'static str {
        self.media_type.resource_type()
    }

    pub fn target_paths(&self) -> &TargetPaths {
        &self.target_paths
    }

    // ========================================================================
    // Materialization
    // ========================================================================

    /// Full content, read once.
    pub fn content(&self) -> Result<Arc<[u8]>, ResourceError> {
        self.content
            .get_or_init(|| {
                self.source
                    .read()
                    .map(Arc::from)
                    .map_err(|e| ResourceError::open(self.key(), e))
            })
            .clone()
    }

    /// Hex blake3 fingerprint of the content, computed once.
    pub fn hash(&self) -> Result<String, ResourceError> {
        self.hash
            .get_or_init(|| {
                let content = self.content()?;
                Ok(super::ContentHash::of(&content).to_hex())
            })
            .clone()
    }

    /// Copy the content to every target file, once.
    ///
    /// A failure is logged once and returned to every caller.
    pub fn publish(&self) -> Result<(), ResourceError> {
        self.published
            .get_or_init(|| {
                let result = self.publish_now();
                match &result {
                    Ok(()) => crate::debug!("publish"; "{}", self.rel_target_path(false)),
                    Err(e) => crate::log!("error"; "failed to publish resource: {}", e),
                }
                result
            })
            .clone()
    }

    pub fn publish_state(&self) -> PublishState {
        match self.published.state() {
            InitState::Uninit => PublishState::Unpublished,
            InitState::InProgress => PublishState::Publishing,
            InitState::Done => PublishState::Published,
        }
    }

    fn publish_now(&self) -> Result<(), ResourceError> {
        let content = self.content()?;
        let targets = self.target_filenames();
        publish::write_all_targets(self.paths.publish_fs(), &targets, &content)
            .map_err(|e| ResourceError::publish(self.key(), e))
    }

    fn publish_if_needed(&self) {
        if self.paths.lazy_publish()
            && let Err(e) = self.publish()
        {
            crate::debug!("publish"; "link to unpublished {}: {}", self.key(), e);
        }
    }

    // ========================================================================
    // Links and targets
    // ========================================================================

    /// Site-relative link, e.g. `/docs/sect3/b1/pic.png`.
    ///
    /// Triggers publishing on first call in lazy-publish mode.
    pub fn rel_permalink(&self) -> String {
        self.publish_if_needed();
        self.paths.urlize(&self.rel_target_path(true))
    }

    /// Absolute link including the base URL's origin.
    pub fn permalink(&self) -> String {
        self.publish_if_needed();
        let rel = self.paths.urlize(&self.rel_target_path(true));
        self.paths.permalink(&rel)
    }

    /// Output files, one per multihost directory (or a single one).
    pub fn target_filenames(&self) -> Vec<String> {
        let dirs = self.paths.multihost_dirs();
        if dirs.is_empty() {
            return vec![self.rel_target_path_with_base("", false)];
        }
        dirs.iter()
            .map(|dir| self.rel_target_path_with_base(dir, false))
            .collect()
    }

    fn rel_target_path(&self, is_url: bool) -> String {
        self.rel_target_path_with_base("", is_url)
    }

    /// Join owner base, base directory, base offset and (for links) the
    /// site base path in front of the resource key; always rooted.
    fn rel_target_path_with_base(&self, base_dir: &str, is_url: bool) -> String {
        let owner_base = if is_url {
            &self.target_paths.sub_resource_base_link
        } else {
            &self.target_paths.sub_resource_base_target
        };
        let mut rel = key::join(&[owner_base, &self.key()]);

        if !base_dir.is_empty() {
            rel = key::join(&[base_dir, &rel]);
        }
        if !self.base_offset.is_empty() {
            rel = key::join(&[&self.base_offset, &rel]);
        }
        if is_url {
            let base_path = self.paths.base_path();
            if !base_path.is_empty() {
                rel = key::join(&[base_path, &rel]);
            }
        }

        if !rel.starts_with('/') {
            rel.insert(0, '/');
        }
        rel
    }
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("key", &self.key())
            .field("media_type", &self.media_type.to_string())
            .field("base_offset", &self.base_offset)
            .field("publish", &self.publish_state())
            .finish()
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Resource({}: {})", self.resource_type(), self.name())
    }
}
