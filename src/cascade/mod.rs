//! Cascade propagation: front matter parsing, inherited params, ordering.
//!
//! # Passes
//!
//! ```text
//! propagate(tree)
//!   ├─ collect (&tree, parallel over sibling sections)
//!   │    section meta ─▶ page meta ─▶ bundled page meta
//!   │    sort pages, recurse into sections, sort sections, derive dates
//!   └─ apply (&mut tree)
//!        write sorted children and derived dates back
//! ```
//!
//! Metadata is written through each node's [`InitGuard`], so a node is
//! parsed once and a failure is remembered on the node.
//!
//! [`InitGuard`]: crate::core::InitGuard

mod resources;


use std::io;
use std::sync::Arc;

use rayon::prelude::*;
use serde_json::Value;
use thiserror::Error;

use crate::core::{JsonMap, NodeKind};
use crate::frontmatter::{LexError, MetaDecoder, split};
use crate::page::{
    Dates, PageMeta, SortKey, default_section_title, sort::default_order, sort_default,
};
use crate::tree::{ContentNode, ContentTree, NodeId};

#[derive(Debug, Clone, Error)]
pub enum CascadeError {
    #[error("{file}:{line}: failed to decode front matter: {message}")]
    Decode {
        file: String,
        line: usize,
        message: String,
    },

    #[error("{file}:{line}: cascade must be a map")]
    InvalidCascade { file: String, line: usize },

    #[error("{file}: failed to read: {source}")]
    Read {
        file: String,
        #[source]
        source: Arc<io::Error>,
    },
}

/// Sorted children and derived dates computed for one branch.
struct Update {
    id: NodeId,
    pages: Vec<NodeId>,
    sections: Vec<NodeId>,
    derived: Dates,
}

/// Walks the tree from home, setting every node's [`PageMeta`].
#[derive(Debug, Clone, Default)]
pub struct Propagator {
    site_title: String,
    decoder: MetaDecoder,
}

impl Propagator {
    pub fn new(site_title: impl Into<String>) -> Self {
        Self {
            site_title: site_title.into(),
            decoder: MetaDecoder,
        }
    }

    /// Propagate metadata through the whole tree.
    ///
    /// The first error in tree order aborts the pass; nothing is written back
    /// to the tree in that case.
    pub fn propagate(&self, tree: &mut ContentTree) -> Result<(), CascadeError> {
        let empty = JsonMap::new();
        let updates = self.handle_section(tree, tree.home().id(), &empty)?;

        crate::debug!("cascade"; "propagated {} sections", updates.len());
        for update in updates {
            let node = tree.node_mut(update.id);
            node.pages = update.pages;
            node.sections = update.sections;
            node.derived = update.derived;
        }
        Ok(())
    }

    fn handle_section<'t>(
        &self,
        tree: &'t ContentTree,
        id: NodeId,
        inherited: &'t JsonMap,
    ) -> Result<Vec<Update>, CascadeError> {
        let section = tree.node(id);
        let cascade = self.init_node(section, inherited)?;

        let mut derived = Dates::default();
        for &page_id in section.pages() {
            let page = tree.node(page_id);
            let page_cascade = self.init_node(page, cascade)?;
            for &bundled in page.bundled() {
                self.init_node(tree.node(bundled), page_cascade)?;
            }
            derived.absorb(&page.dates());
        }

        let mut pages = section.pages().to_vec();
        sort_default(&mut pages, |&p| tree.node(p).sort_key());

        let children: Vec<Result<Vec<Update>, CascadeError>> = section
            .sections()
            .par_iter()
            .map(|&child| self.handle_section(tree, child, cascade))
            .collect();
        let mut child_updates = Vec::with_capacity(children.len());
        for child in children {
            child_updates.push(child?);
        }

        // Children's derived dates are not applied yet, so sort on the
        // pending values.
        let mut sections: Vec<(NodeId, Dates)> = child_updates
            .iter()
            .map(|updates| (updates[0].id, updates[0].derived))
            .collect();
        sections.sort_by(|(a, a_derived), (b, b_derived)| {
            default_order(
                &pending_sort_key(tree.node(*a), *a_derived),
                &pending_sort_key(tree.node(*b), *b_derived),
            )
        });

        if section.is_home() {
            derived = Dates::default();
            for page in tree.regular_pages() {
                derived.absorb(&page.dates());
            }
        }

        let mut updates = vec![Update {
            id,
            pages,
            sections: sections.into_iter().map(|(id, _)| id).collect(),
            derived,
        }];
        updates.extend(child_updates.into_iter().flatten());
        Ok(updates)
    }

    /// Set the node's metadata once and return the cascade its descendants
    /// receive.
    fn init_node<'t>(
        &self,
        node: &'t ContentNode,
        inherited: &'t JsonMap,
    ) -> Result<&'t JsonMap, CascadeError> {
        let meta = node
            .meta
            .get_or_init(|| {
                let meta = self.load_meta(node, inherited)?;
                resources::apply_resource_meta(node, &meta);
                Ok(meta)
            })
            .as_ref()
            .map_err(|e| e.clone())?;
        Ok(meta.cascade.as_ref().unwrap_or(inherited))
    }

    fn load_meta(&self, node: &ContentNode, inherited: &JsonMap) -> Result<PageMeta, CascadeError> {
        let (own, cascade) = match node.file() {
            Some(file) => {
                let bytes = file.source.read().map_err(|e| CascadeError::Read {
                    file: file.path.clone(),
                    source: Arc::new(e),
                })?;
                self.read_front_matter(&file.path, &bytes)?
            }
            None => (JsonMap::new(), None),
        };

        let mut params = own;
        for (key, value) in inherited {
            if !params.contains_key(key) {
                params.insert(key.clone(), value.clone());
            }
        }

        let (mut meta, invalid) = PageMeta::from_params(params, cascade);
        if let Some(file) = node.file() {
            for key in invalid {
                crate::log!("cascade"; "{}: invalid {} date, ignored", file.path, key);
            }
        }

        if meta.title.is_empty() {
            match node.kind() {
                NodeKind::Home => meta.title = self.site_title.clone(),
                NodeKind::Section => meta.title = default_section_title(node.key().name()),
                _ => {}
            }
        }
        Ok(meta)
    }

    /// Decode own front matter; returns the params (keys lower-cased) and the
    /// node's own `cascade` block, taken out of the params.
    fn read_front_matter(
        &self,
        path: &str,
        bytes: &[u8],
    ) -> Result<(JsonMap, Option<JsonMap>), CascadeError> {
        let decode_error = |line: usize, message: String| CascadeError::Decode {
            file: path.to_string(),
            line,
            message,
        };

        let parts = split(bytes).map_err(|e| match e {
            LexError::Unterminated { delim, line } => {
                decode_error(line, format!("end front matter delimiter {delim:?} not found"))
            }
        })?;
        let Some(fm) = parts.front_matter else {
            return Ok((JsonMap::new(), None));
        };
        let decoded = self
            .decoder
            .decode(fm.format, fm.raw)
            .map_err(|e| decode_error(e.line + fm.line - 1, e.message))?;

        let mut params = lower_keys(decoded);
        let cascade = match params.remove("cascade") {
            None => None,
            Some(Value::Object(map)) => Some(lower_keys(map)),
            Some(_) => {
                return Err(CascadeError::InvalidCascade {
                    file: path.to_string(),
                    line: fm.line + key_line(fm.raw, "cascade"),
                });
            }
        };
        Ok((params, cascade))
    }
}

fn pending_sort_key(node: &ContentNode, derived: Dates) -> SortKey<'_> {
    let date = node.meta().map(|m| m.dates).unwrap_or_default().or(derived).date;
    SortKey {
        date,
        ..node.sort_key()
    }
}

fn lower_keys(map: JsonMap) -> JsonMap {
    map.into_iter().map(|(k, v)| (k.to_lowercase(), v)).collect()
}

/// Zero-based line of the first top-level occurrence of `key` in raw front
/// matter (0 when not found).
fn key_line(raw: &[u8], key: &str) -> usize {
    let text = String::from_utf8_lossy(raw);
    text.lines()
        .position(|line| {
            let line = line.trim_start().trim_start_matches(['"', '\'', '{', '[']).as_bytes();
            line.len() > key.len()
                && line[..key.len()].eq_ignore_ascii_case(key.as_bytes())
                && matches!(line[key.len()], b':' | b'=' | b' ' | b'"' | b'\'' | b']')
        })
        .unwrap_or(0)
}
