//! Taxonomy assembly from propagated page params.
//!
//! For a taxonomy `categories` and a page with `categories: [Rust]`:
//!
//! ```text
//! /categories        taxonomyTerm  "Categories"
//! /categories/rust   taxonomy      "Rust"   (first spelling seen)
//! ```

use rustc_hash::FxHashMap;

use super::{ContentTree, NodeId};
use crate::core::{NodeKind, PathKey};
use crate::page::{Dates, PageMeta, sort_default, title_case};

/// Term path segment: lower-cased, spaces and slashes turned into `-`.
pub fn term_segment(term: &str) -> String {
    term.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '/' { '-' } else { c })
        .collect()
}

impl ContentTree {
    /// Add a list node per taxonomy and a node per term found in regular
    /// page params. Run after propagation; pages without metadata are
    /// skipped.
    pub fn assemble_taxonomies<S: AsRef<str>>(&mut self, plurals: &[S]) {
        for plural in plurals {
            let plural = plural.as_ref().trim_matches('/').to_lowercase();
            if plural.is_empty() || self.taxonomy(&format!("/{plural}")).is_some() {
                continue;
            }
            self.assemble_taxonomy(&plural);
        }
    }

    fn assemble_taxonomy(&mut self, plural: &str) {
        // term segment -> (first spelling, members)
        let mut terms: Vec<(String, String, Vec<NodeId>)> = Vec::new();
        let mut index: FxHashMap<String, usize> = FxHashMap::default();
        for page in self.regular_pages() {
            let Some(meta) = page.meta() else { continue };
            for term in meta.string_list(plural) {
                let segment = term_segment(term);
                if segment.is_empty() {
                    continue;
                }
                let slot = *index.entry(segment.clone()).or_insert_with(|| {
                    terms.push((segment, term.trim().to_string(), Vec::new()));
                    terms.len() - 1
                });
                let members = &mut terms[slot].2;
                if !members.contains(&page.id()) {
                    members.push(page.id());
                }
            }
        }
        terms.sort_by(|a, b| a.0.cmp(&b.0));

        let home = self.home().id();
        let list_key = PathKey::new(plural);
        let list = self.push_node(list_key.clone(), NodeKind::TaxonomyTerm, None);
        self.node_mut(list).parent = Some(home);
        self.index_taxonomy(list);

        let mut list_dates = Dates::default();
        for (segment, spelling, mut members) in terms {
            sort_default(&mut members, |&id| self.node(id).sort_key());
            let mut dates = Dates::default();
            for &id in &members {
                dates.absorb(&self.node(id).dates());
            }
            list_dates.absorb(&dates);

            let term = self.push_node(list_key.join(&segment), NodeKind::Taxonomy, None);
            let node = self.node_mut(term);
            node.parent = Some(list);
            node.pages = members;
            node.derived = dates;
            node.meta.get_or_init(|| Ok(PageMeta {
                title: spelling,
                ..PageMeta::default()
            }));
            self.node_mut(list).sections.push(term);
            self.index_taxonomy(term);
        }

        let node = self.node_mut(list);
        node.derived = list_dates;
        node.meta.get_or_init(|| Ok(PageMeta {
            title: title_case(plural),
            ..PageMeta::default()
        }));
        crate::debug!("taxonomy"; "{} with {} terms", list_key, self.node(list).sections.len());
    }
}
