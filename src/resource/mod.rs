//! Page resources: lazy materialization, publishing and caching.
//!
//! # Architecture
//!
//! ```text
//! ResourceSpec ──owns──▶ ResourceCache ──Found──▶ Arc<Resource>
//!      │                                              │
//!      └──Arc<PathSpec>◀──────────shared─────────────┘
//! ```
//!
//! Resources share the [`PathSpec`] (base URL, output hosts, publish fs) but
//! never the cache, so the cache can own them without a reference cycle.

mod cache;
mod generic;
mod hash;
mod media;
mod publish;


use std::fmt;
use std::io;
use std::sync::Arc;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use thiserror::Error;
use url::Url;

use crate::core::key;

pub use cache::{CacheEntry, ResourceCache, owned_key, target_key};
pub use generic::{PublishState, Resource, ResourceDescriptor, ResourceMeta, TargetPaths};
pub use hash::ContentHash;
pub use media::MediaType;
pub use publish::{OsPublishFs, PublishFs};

/// Characters escaped in URL path segments.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Resource failure, recorded on the resource and replayed on every access.
#[derive(Debug, Clone, Error)]
pub enum ResourceError {
    #[error("failed to open resource {path:?}: {source}")]
    Open {
        path: String,
        #[source]
        source: Arc<io::Error>,
    },
    #[error("failed to publish resource {path:?}: {source}")]
    Publish {
        path: String,
        #[source]
        source: Arc<io::Error>,
    },
}

impl ResourceError {
    pub(crate) fn open(path: String, err: io::Error) -> Self {
        Self::Open {
            path,
            source: Arc::new(err),
        }
    }

    pub(crate) fn publish(path: String, err: io::Error) -> Self {
        Self::Publish {
            path,
            source: Arc::new(err),
        }
    }
}

/// Options for building a [`ResourceSpec`].
#[derive(Debug, Clone, Default)]
pub struct SpecOptions {
    /// Site base URL; its path part becomes the link base path.
    pub base_url: Option<String>,
    /// Output sub-directories, one publish target each (multihost).
    pub multihost_dirs: Vec<String>,
    /// Publish on first link access instead of eagerly.
    pub lazy_publish: bool,
}

/// Link and publishing settings shared by every resource.
pub struct PathSpec {
    base_url: Option<Url>,
    base_path: String,
    multihost_dirs: Vec<String>,
    lazy_publish: bool,
    fs: Arc<dyn PublishFs>,
}

impl PathSpec {
    /// Base path from the base URL, e.g. `/docs` (empty for a root site).
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn multihost_dirs(&self) -> &[String] {
        &self.multihost_dirs
    }

    pub fn lazy_publish(&self) -> bool {
        self.lazy_publish
    }

    pub fn publish_fs(&self) -> &dyn PublishFs {
        self.fs.as_ref()
    }

    /// Percent-encode each segment of a slash path.
    pub fn urlize(&self, path: &str) -> String {
        path.split('/')
            .map(|segment| utf8_percent_encode(segment, SEGMENT).to_string())
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Absolute URL for a rooted, already encoded link.
    pub fn permalink(&self, rel: &str) -> String {
        match &self.base_url {
            Some(base) => {
                let mut url = base.clone();
                url.set_path(rel);
                url.to_string()
            }
            None => rel.to_string(),
        }
    }
}

impl fmt::Debug for PathSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathSpec")
            .field("base_url", &self.base_url.as_ref().map(Url::as_str))
            .field("multihost_dirs", &self.multihost_dirs)
            .field("lazy_publish", &self.lazy_publish)
            .field("fs", &self.fs)
            .finish()
    }
}

/// Build-scoped resource factory and cache.
#[derive(Debug)]
pub struct ResourceSpec {
    paths: Arc<PathSpec>,
    cache: ResourceCache,
}

impl ResourceSpec {
    pub fn new(options: SpecOptions, fs: Arc<dyn PublishFs>) -> Result<Self, url::ParseError> {
        let base_url = options.base_url.as_deref().map(Url::parse).transpose()?;
        let base_path = base_url
            .as_ref()
            .map(|url| url.path().trim_matches('/'))
            .filter(|path| !path.is_empty())
            .map(|path| format!("/{path}"))
            .unwrap_or_default();

        let paths = PathSpec {
            base_url,
            base_path,
            multihost_dirs: options
                .multihost_dirs
                .into_iter()
                .map(|dir| dir.trim_matches('/').to_string())
                .filter(|dir| !dir.is_empty())
                .collect(),
            lazy_publish: options.lazy_publish,
            fs,
        };
        Ok(Self {
            paths: Arc::new(paths),
            cache: ResourceCache::new(),
        })
    }

    pub fn paths(&self) -> &PathSpec {
        &self.paths
    }

    /// Create (or fetch the cached) resource published at the descriptor's
    /// target path.
    pub fn new_resource(&self, desc: ResourceDescriptor) -> Arc<Resource> {
        let target = target_key(&key::join(&[
            &desc.target_paths.sub_resource_base_target,
            &desc.rel_target,
        ]));
        self.cache
            .get_or_insert(&target, || Arc::new(Resource::new(Arc::clone(&self.paths), desc)))
    }

    /// Cached lookup; `find` runs on a miss and its answer (including
    /// "not found") is remembered.
    pub fn lookup(
        &self,
        key: &str,
        find: impl FnOnce() -> Option<Arc<Resource>>,
    ) -> Option<Arc<Resource>> {
        self.cache.get_or_create(&target_key(key), find)
    }

    /// Cached lookup of `name` on behalf of the page `owner`.
    pub fn lookup_owned(
        &self,
        owner: &str,
        name: &str,
        find: impl FnOnce() -> Option<Arc<Resource>>,
    ) -> Option<Arc<Resource>> {
        self.cache.get_or_create(&owned_key(owner, name), find)
    }

    /// Cached variant of a resource processed for `owner`.
    pub fn processed(
        &self,
        owner: &str,
        target: &str,
        create: impl FnOnce() -> Option<Arc<Resource>>,
    ) -> Option<Arc<Resource>> {
        self.cache.get_or_create(&owned_key(owner, target), create)
    }

    pub fn cache(&self) -> &ResourceCache {
        &self.cache
    }

    pub fn delete_cache_by_prefix(&self, prefix: &str) -> usize {
        self.cache.delete_by_prefix(prefix)
    }

    /// Evict the entries owned by one page, see [`ResourceCache::delete_owned`].
    pub fn delete_cache_for_owner<'a>(
        &self,
        owner: &str,
        targets: impl IntoIterator<Item = &'a str>,
    ) -> usize {
        self.cache.delete_owned(owner, targets)
    }

    pub fn clear_caches(&self) {
        self.cache.clear();
    }

    pub fn cache_stats(&self) -> String {
        self.cache.stats()
    }
}
