//! Build-scoped resource cache.
//!
//! Keys are canonical target paths (`/sect3/b1/pic.png`). Entries that belong
//! to one page (lookups made on its behalf and variants processed for it)
//! are scoped by the owning page key: `/sect3/b1\0/pic.png`.
//!
//! Owner-scoped entries of one page never share a key with another page, so
//! [`ResourceCache::delete_owned`] evicts exactly what that page put there.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use dashmap::DashMap;
use rustc_hash::FxHashSet;

use super::Resource;
use crate::core::key;

/// Cached lookup result; `Missing` remembers a failed lookup.
#[derive(Debug, Clone)]
pub enum CacheEntry {
    Found(Arc<Resource>),
    Missing,
}

impl CacheEntry {
    fn resource(&self) -> Option<Arc<Resource>> {
        match self {
            Self::Found(resource) => Some(Arc::clone(resource)),
            Self::Missing => None,
        }
    }
}

/// Cache key for a resource published at `target`.
pub fn target_key(target: &str) -> String {
    key::clean(target)
}

/// Separates the owner from the target in owner-scoped keys.
const OWNER_SEP: char = '\0';

/// Cache key for `target` looked up or processed on behalf of `owner`.
pub fn owned_key(owner: &str, target: &str) -> String {
    format!("{}{OWNER_SEP}{}", key::clean(owner), key::clean(target))
}

/// The path a key is evicted by: the owner for owner-scoped keys, the
/// target otherwise.
fn scope(key: &str) -> &str {
    key.split(OWNER_SEP).next().unwrap_or(key)
}

#[derive(Debug, Default)]
pub struct ResourceCache {
    entries: DashMap<String, CacheEntry>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl ResourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<CacheEntry> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    /// Return the cached entry for `key`, running `create` on a miss.
    ///
    /// Readers take a shared lookup first; only a miss locks the shard to
    /// create and store the entry, so `create` runs at most once per key.
    pub fn get_or_create(
        &self,
        key: &str,
        create: impl FnOnce() -> Option<Arc<Resource>>,
    ) -> Option<Arc<Resource>> {
        if let Some(entry) = self.entries.get(key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return entry.resource();
        }

        let entry = self.entries.entry(key.to_string()).or_insert_with(|| {
            self.misses.fetch_add(1, Ordering::Relaxed);
            match create() {
                Some(resource) => CacheEntry::Found(resource),
                None => CacheEntry::Missing,
            }
        });
        entry.resource()
    }

    /// Return the cached resource for `key`, creating it on a miss.
    ///
    /// Unlike [`Self::get_or_create`], a `Missing` marker left by an earlier
    /// lookup is replaced.
    pub fn get_or_insert(
        &self,
        key: &str,
        create: impl FnOnce() -> Arc<Resource>,
    ) -> Arc<Resource> {
        let cached = self.entries.get(key).and_then(|entry| entry.resource());
        if let Some(resource) = cached {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return resource;
        }

        let mut entry = self
            .entries
            .entry(key.to_string())
            .or_insert(CacheEntry::Missing);
        if let CacheEntry::Found(resource) = entry.value() {
            return Arc::clone(resource);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        let resource = create();
        *entry.value_mut() = CacheEntry::Found(Arc::clone(&resource));
        resource
    }

    /// Evict every key whose target (or owner) is equal to or beneath
    /// `prefix` (segment-aware).
    ///
    /// Returns the number of evicted entries.
    pub fn delete_by_prefix(&self, prefix: &str) -> usize {
        let prefix = key::clean(prefix);
        let before = self.entries.len();
        self.entries
            .retain(|key, _| !key::has_path_prefix(scope(key), &prefix));
        before - self.entries.len()
    }

    /// Evict the entries of one page: everything scoped to `owner`, plus the
    /// exact `targets` it publishes. Pages nested under `owner` keep theirs.
    pub fn delete_owned<'a>(
        &self,
        owner: &str,
        targets: impl IntoIterator<Item = &'a str>,
    ) -> usize {
        let owner = key::clean(owner);
        let targets: FxHashSet<String> = targets.into_iter().map(target_key).collect();
        let before = self.entries.len();
        self.entries.retain(|key, _| {
            let owned = key.contains(OWNER_SEP) && scope(key) == owner;
            !owned && !targets.contains(key.as_str())
        });
        before - self.entries.len()
    }

    pub fn clear(&self) {
        self.entries.clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// One-line summary for debug logging.
    pub fn stats(&self) -> String {
        let missing = self
            .entries
            .iter()
            .filter(|entry| matches!(entry.value(), CacheEntry::Missing))
            .count();
        format!(
            "resource cache: {} entries ({} missing), {} hits, {} misses",
            self.entries.len(),
            missing,
            self.hits.load(Ordering::Relaxed),
            self.misses.load(Ordering::Relaxed),
        )
    }
}
