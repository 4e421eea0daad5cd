//! Content nodes: sections, pages and taxonomy nodes.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use super::SourceFile;
use crate::cascade::CascadeError;
use crate::core::{DateTimeUtc, InitGuard, NodeKind, PathKey};
use crate::page::{Dates, PageMeta, SortKey};
use crate::resource::{Resource, TargetPaths};

/// Index of a node in its [`super::ContentTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A section, page or taxonomy node.
///
/// Parent and children are ids into the owning tree; the tree owns every
/// node.
pub struct ContentNode {
    pub(crate) id: NodeId,
    pub(crate) key: PathKey,
    pub(crate) kind: NodeKind,
    pub(crate) parent: Option<NodeId>,
    /// Member pages (branches and taxonomy terms).
    pub(crate) pages: Vec<NodeId>,
    /// Child sections (branches) or terms (taxonomy lists).
    pub(crate) sections: Vec<NodeId>,
    /// Content files inside a leaf bundle.
    pub(crate) bundled: Vec<NodeId>,
    pub(crate) resources: Vec<Arc<Resource>>,
    pub(crate) file: Option<SourceFile>,
    pub(crate) meta: InitGuard<Result<PageMeta, CascadeError>>,
    /// Dates derived from members, filled in after propagation.
    pub(crate) derived: Dates,
}

impl ContentNode {
    pub(crate) fn new(id: NodeId, key: PathKey, kind: NodeKind, file: Option<SourceFile>) -> Self {
        Self {
            id,
            key,
            kind,
            parent: None,
            pages: Vec::new(),
            sections: Vec::new(),
            bundled: Vec::new(),
            resources: Vec::new(),
            file,
            meta: InitGuard::new(),
            derived: Dates::default(),
        }
    }

    #[inline]
    pub fn id(&self) -> NodeId {
        self.id
    }

    #[inline]
    pub fn key(&self) -> &PathKey {
        &self.key
    }

    #[inline]
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    #[inline]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Member pages in default order (after propagation).
    pub fn pages(&self) -> &[NodeId] {
        &self.pages
    }

    /// Child sections in default order (after propagation).
    pub fn sections(&self) -> &[NodeId] {
        &self.sections
    }

    /// Content pages bundled as resources of a leaf bundle.
    pub fn bundled(&self) -> &[NodeId] {
        &self.bundled
    }

    pub fn resources(&self) -> &[Arc<Resource>] {
        &self.resources
    }

    /// Backing file, `None` for sections without `_index` and taxonomy nodes.
    pub fn file(&self) -> Option<&SourceFile> {
        self.file.as_ref()
    }

    /// Propagated metadata, `None` before propagation or after a failure.
    pub fn meta(&self) -> Option<&PageMeta> {
        self.meta.get().and_then(|m| m.as_ref().ok())
    }

    pub fn title(&self) -> &str {
        self.meta().map_or("", |m| m.title.as_str())
    }

    pub fn weight(&self) -> i64 {
        self.meta().map_or(0, |m| m.weight)
    }

    /// Own dates, with unset `date` / `lastmod` filled from members.
    pub fn dates(&self) -> Dates {
        self.meta()
            .map(|m| m.dates)
            .unwrap_or_default()
            .or(self.derived)
    }

    pub fn date(&self) -> DateTimeUtc {
        self.dates().date
    }

    #[inline]
    pub fn is_home(&self) -> bool {
        self.kind == NodeKind::Home
    }

    #[inline]
    pub fn is_branch(&self) -> bool {
        self.kind.is_branch()
    }

    /// A page owning its directory through an `index.<ext>` file.
    pub fn is_leaf_bundle(&self) -> bool {
        self.kind == NodeKind::Page
            && self
                .file
                .as_ref()
                .is_some_and(|f| f.file_name().split('.').next() == Some("index"))
    }

    /// Directory that relative references start from: the backing file's
    /// directory, else the node's own path.
    pub fn context_dir(&self) -> String {
        match &self.file {
            Some(file) => file.dir().to_lowercase(),
            None => self.key.as_str().to_string(),
        }
    }

    /// Output and link base for the node's resources, e.g. `sect3/b1`.
    pub fn target_paths(&self) -> TargetPaths {
        TargetPaths::new(self.key.as_str().trim_start_matches('/'))
    }

    pub(crate) fn sort_key(&self) -> SortKey<'_> {
        SortKey {
            date: self.date(),
            weight: self.weight(),
            title: self.title(),
            key: self.key.as_str(),
        }
    }
}

impl fmt::Debug for ContentNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentNode")
            .field("id", &self.id)
            .field("key", &self.key)
            .field("kind", &self.kind)
            .field("title", &self.title())
            .field("file", &self.file.as_ref().map(|f| f.path.as_str()))
            .finish()
    }
}
