//! In-memory content tree and path indexes.
//!
//! # Indexes
//!
//! | Index        | Keyed by                        | Lookup          |
//! |--------------|---------------------------------|-----------------|
//! | `sections`   | section / home path             | longest prefix  |
//! | `taxonomies` | taxonomy list and term path     | longest prefix  |
//! | `pages`      | page path (`/sect3/b1`)         | exact           |
//! | `names`      | short name (`b1`, `unique2`)    | exact, may be ambiguous |
//!
//! Nodes live in an arena; parent and child links are [`NodeId`]s.

mod builder;
mod names;
mod node;
mod prefix;
mod source;
mod taxonomy;

#[cfg(test)]
pub(crate) mod tests;

use std::sync::{Arc, OnceLock};

use rustc_hash::FxHashMap;

pub use builder::{BuildOptions, TreeBuilder};
pub use names::{ShortName, ShortNames, short_name};
pub use node::{ContentNode, NodeId};
pub use prefix::PrefixTree;
pub use source::{OpenFn, Source, SourceFile};

use crate::core::{NodeKind, PathKey, key};
use crate::resource::{Resource, ResourceSpec};

/// All content nodes of one build plus their indexes.
#[derive(Debug)]
pub struct ContentTree {
    nodes: Vec<ContentNode>,
    sections: PrefixTree<NodeId>,
    taxonomies: PrefixTree<NodeId>,
    pages: FxHashMap<PathKey, NodeId>,
    names: ShortNames,
    language: String,
    all_pages: OnceLock<Vec<NodeId>>,
    regular_pages: OnceLock<Vec<NodeId>>,
}

impl ContentTree {
    pub(crate) fn new(language: impl Into<String>) -> Self {
        Self {
            nodes: Vec::new(),
            sections: PrefixTree::new(),
            taxonomies: PrefixTree::new(),
            pages: FxHashMap::default(),
            names: ShortNames::default(),
            language: language.into().to_lowercase(),
            all_pages: OnceLock::new(),
            regular_pages: OnceLock::new(),
        }
    }

    /// The home node; always id 0.
    pub fn home(&self) -> &ContentNode {
        &self.nodes[0]
    }

    pub fn node(&self, id: NodeId) -> &ContentNode {
        &self.nodes[id.index()]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut ContentNode {
        self.reset_collections();
        &mut self.nodes[id.index()]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn parent(&self, node: &ContentNode) -> Option<&ContentNode> {
        node.parent.map(|id| self.node(id))
    }

    // ========================================================================
    // Indexes
    // ========================================================================

    pub(crate) fn sections_index(&self) -> &PrefixTree<NodeId> {
        &self.sections
    }

    pub(crate) fn taxonomies_index(&self) -> &PrefixTree<NodeId> {
        &self.taxonomies
    }

    pub(crate) fn short_names(&self) -> &ShortNames {
        &self.names
    }

    /// Exact page lookup by canonical page key.
    pub fn page(&self, key: &str) -> Option<&ContentNode> {
        self.pages.get(key).map(|&id| self.node(id))
    }

    /// Exact section lookup by canonical key.
    pub fn section(&self, key: &str) -> Option<&ContentNode> {
        self.sections.get(key).map(|&id| self.node(id))
    }

    /// Exact taxonomy lookup by canonical key.
    pub fn taxonomy(&self, key: &str) -> Option<&ContentNode> {
        self.taxonomies.get(key).map(|&id| self.node(id))
    }

    /// Node at `key` in any index.
    pub fn get(&self, key: &str) -> Option<&ContentNode> {
        self.section(key)
            .or_else(|| self.page(key))
            .or_else(|| self.taxonomy(key))
    }

    // ========================================================================
    // Collections
    // ========================================================================

    /// Every node reachable from home in tree order: a branch, its pages,
    /// then its sections; taxonomy nodes last.
    pub fn pages(&self) -> impl Iterator<Item = &ContentNode> {
        self.all_pages
            .get_or_init(|| self.collect_tree_order())
            .iter()
            .map(|&id| self.node(id))
    }

    /// Nodes of kind `page`, in tree order.
    pub fn regular_pages(&self) -> impl Iterator<Item = &ContentNode> {
        self.regular_pages
            .get_or_init(|| {
                self.pages()
                    .filter(|n| n.kind == NodeKind::Page)
                    .map(ContentNode::id)
                    .collect()
            })
            .iter()
            .map(|&id| self.node(id))
    }

    fn collect_tree_order(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        if !self.nodes.is_empty() {
            let mut stack = vec![NodeId(0)];
            while let Some(id) = stack.pop() {
                let node = self.node(id);
                out.push(id);
                out.extend(node.pages.iter().copied());
                stack.extend(node.sections.iter().rev().copied());
            }
        }
        for node in &self.nodes {
            if matches!(node.kind, NodeKind::TaxonomyTerm | NodeKind::Taxonomy) {
                out.push(node.id);
            }
        }
        out
    }

    fn reset_collections(&mut self) {
        self.all_pages.take();
        self.regular_pages.take();
    }

    // ========================================================================
    // Resources
    // ========================================================================

    /// Find a resource of `node` by its relative key, caching the answer
    /// (including "not found") in the resource cache under `node`'s scope.
    pub fn resource(
        &self,
        spec: &ResourceSpec,
        node: &ContentNode,
        name: &str,
    ) -> Option<Arc<Resource>> {
        let wanted = key::clean(name);
        spec.lookup_owned(node.key().as_str(), &wanted, || {
            node.resources
                .iter()
                .find(|r| key::clean(&r.key()) == wanted)
                .cloned()
        })
    }

    /// Evict the cache entries owned by `node`, i.e. everything scoped to it
    /// plus its own resources. Pages nested under it keep their entries.
    pub fn clear_resource_cache_for_page(&self, spec: &ResourceSpec, node: &ContentNode) -> usize {
        let targets: Vec<String> = node.resources.iter().map(|r| r.cache_key()).collect();
        spec.delete_cache_for_owner(node.key().as_str(), targets.iter().map(String::as_str))
    }

    // ========================================================================
    // Construction
    // ========================================================================

    pub(crate) fn push_node(
        &mut self,
        key: PathKey,
        kind: NodeKind,
        file: Option<SourceFile>,
    ) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(ContentNode::new(id, key, kind, file));
        self.reset_collections();
        id
    }

    pub(crate) fn index_section(&mut self, id: NodeId) {
        let key = self.nodes[id.index()].key.clone();
        self.sections.insert(key.as_str(), id);
    }

    pub(crate) fn index_taxonomy(&mut self, id: NodeId) {
        let key = self.nodes[id.index()].key.clone();
        self.taxonomies.insert(key.as_str(), id);
    }

    /// Index a page by key and short name; `false` if the key is taken.
    pub(crate) fn index_page(&mut self, id: NodeId) -> bool {
        let key = self.nodes[id.index()].key.clone();
        if self.pages.contains_key(key.as_str()) {
            return false;
        }
        self.names.insert(key.name(), id);
        self.pages.insert(key, id);
        true
    }

    pub(crate) fn nodes(&self) -> &[ContentNode] {
        &self.nodes
    }
}
