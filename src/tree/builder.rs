//! Build a [`ContentTree`] from a flat feed of source files.
//!
//! # Classification
//!
//! | File / directory               | Becomes                              |
//! |--------------------------------|--------------------------------------|
//! | `_index.<ext>`                 | section owning its directory (home at the root) |
//! | `index.<ext>` (no `_index`)    | leaf bundle page owning its directory |
//! | top-level directory            | section, unless it is a leaf bundle  |
//! | nested directory, no `_index`  | plain path segment                   |
//! | content under a leaf bundle    | bundled page of that bundle          |
//! | any other file                 | resource of the nearest bundle or section |

use rustc_hash::FxHashSet;

use super::{ContentTree, NodeId, PrefixTree, SourceFile};
use crate::core::{FileCategory, NodeKind, PathKey, key};
use crate::resource::{ResourceDescriptor, ResourceSpec};

/// Options for [`TreeBuilder`].
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Site language; `page.<lang>.md` maps to the same key as `page.md`.
    pub language: String,
}

/// Collects source files, then classifies them into a tree.
pub struct TreeBuilder<'s> {
    spec: &'s ResourceSpec,
    options: BuildOptions,
    files: Vec<SourceFile>,
}

struct Entry {
    file: SourceFile,
    category: FileCategory,
    /// Key of the file's directory (`/sect3/b1`).
    dir: PathKey,
}

impl<'s> TreeBuilder<'s> {
    pub fn new(spec: &'s ResourceSpec, options: BuildOptions) -> Self {
        Self {
            spec,
            options,
            files: Vec::new(),
        }
    }

    pub fn add(&mut self, file: SourceFile) -> &mut Self {
        self.files.push(file);
        self
    }

    pub fn extend(&mut self, files: impl IntoIterator<Item = SourceFile>) -> &mut Self {
        self.files.extend(files);
        self
    }

    pub fn build(self) -> ContentTree {
        let lang = self.options.language.to_lowercase();
        let mut tree = ContentTree::new(lang.clone());

        let entries: Vec<Entry> = self
            .files
            .into_iter()
            .map(|file| Entry {
                category: FileCategory::from_path(&file.path),
                dir: PathKey::new(file.dir()),
                file,
            })
            .collect();

        let bundles = leaf_bundle_dirs(&entries);
        let section_dirs = section_dirs(&entries, &bundles);

        // Home and sections, parents first.
        let home_file = entries
            .iter()
            .filter(|e| e.dir.is_root())
            .find(|e| matches!(e.category, FileCategory::BranchIndex(_)))
            .or_else(|| {
                entries
                    .iter()
                    .filter(|e| e.dir.is_root())
                    .find(|e| matches!(e.category, FileCategory::LeafIndex(_)))
            })
            .map(|e| e.file.clone());
        let home = tree.push_node(PathKey::root(), NodeKind::Home, home_file);
        tree.index_section(home);

        for dir in &section_dirs {
            let file = entries
                .iter()
                .find(|e| &e.dir == dir && matches!(e.category, FileCategory::BranchIndex(_)))
                .map(|e| e.file.clone());
            let parent = nearest_section(&tree, dir.parent().as_ref());
            let id = tree.push_node(dir.clone(), NodeKind::Section, file);
            tree.node_mut(id).parent = Some(parent);
            tree.node_mut(parent).sections.push(id);
            tree.index_section(id);
        }

        // Leaf bundles before any other page, so bundled content finds its
        // owner.
        let mut bundle_ids: PrefixTree<NodeId> = PrefixTree::new();
        for entry in &entries {
            if !matches!(entry.category, FileCategory::LeafIndex(_))
                || entry.dir.is_root()
                || bundles.get(entry.dir.as_str()).is_none()
                || bundle_ids.get(entry.dir.as_str()).is_some()
            {
                continue;
            }
            if let Some(id) = add_page(&mut tree, entry.dir.clone(), &entry.file) {
                bundle_ids.insert(entry.dir.as_str(), id);
            }
        }

        for entry in &entries {
            match entry.category {
                FileCategory::Resource => {}
                FileCategory::BranchIndex(_)
                    if section_dirs.contains(&entry.dir) || entry.dir.is_root() => {}
                FileCategory::LeafIndex(_) if entry.dir.is_root() => {}
                _ => {
                    let page_key = page_key(&entry.file.path, &lang);
                    match bundle_ids.longest_prefix(entry.dir.as_str()) {
                        Some((dir, &bundle)) => {
                            if entry.dir.as_str() == dir
                                && matches!(entry.category, FileCategory::LeafIndex(_))
                                && tree.node(bundle).file().map(|f| f.path.as_str())
                                    == Some(entry.file.path.as_str())
                            {
                                continue;
                            }
                            let file = Some(entry.file.clone());
                            let id = tree.push_node(page_key, NodeKind::Page, file);
                            tree.node_mut(id).parent = Some(bundle);
                            tree.node_mut(bundle).bundled.push(id);
                        }
                        None => {
                            add_page(&mut tree, page_key, &entry.file);
                        }
                    }
                }
            }
        }

        // Resources go to the owning bundle, else the nearest section.
        for entry in entries.iter().filter(|e| !e.category.is_content()) {
            let owner = match bundle_ids.longest_prefix(entry.dir.as_str()) {
                Some((_, &bundle)) => bundle,
                None => nearest_section(&tree, Some(&entry.dir)),
            };
            let depth = tree.node(owner).key.depth();
            let rel = entry
                .file
                .path
                .splitn(depth + 1, '/')
                .last()
                .unwrap_or_default()
                .to_string();
            let resource = self.spec.new_resource(ResourceDescriptor {
                source: entry.file.source.clone(),
                rel_target: rel,
                target_paths: tree.node(owner).target_paths(),
            });
            tree.node_mut(owner).resources.push(resource);
        }

        crate::debug!(
            "tree";
            "{} nodes, {} sections, {} short names",
            tree.len(),
            tree.sections_index().len(),
            tree.short_names().len()
        );
        tree
    }
}

/// Index a page under its nearest section; duplicates are skipped.
fn add_page(tree: &mut ContentTree, page_key: PathKey, file: &SourceFile) -> Option<NodeId> {
    if tree.page(page_key.as_str()).is_some() {
        crate::log!("content"; "duplicate page {}, skipping {}", page_key, file.path);
        return None;
    }
    let parent = nearest_section(tree, page_key.parent().as_ref());
    let id = tree.push_node(page_key, NodeKind::Page, Some(file.clone()));
    tree.index_page(id);
    tree.node_mut(id).parent = Some(parent);
    tree.node_mut(parent).pages.push(id);
    Some(id)
}

fn nearest_section(tree: &ContentTree, dir: Option<&PathKey>) -> NodeId {
    dir.and_then(|dir| tree.sections_index().longest_prefix(dir.as_str()))
        .map_or(tree.home().id(), |(_, &id)| id)
}

/// Page key: path without extension and language suffix; a leaf bundle
/// index maps to its directory.
fn page_key(path: &str, lang: &str) -> PathKey {
    let mut stem = key::path_no_ext(path);
    let lower = stem.to_lowercase();
    if !lang.is_empty() && lower.ends_with(&format!(".{lang}")) {
        stem = &stem[..stem.len() - lang.len() - 1];
    }
    PathKey::new(stem)
}

/// Directories owned by a leaf bundle; a bundle nested in another bundle is
/// plain bundled content.
fn leaf_bundle_dirs(entries: &[Entry]) -> PrefixTree<()> {
    let branches: FxHashSet<&PathKey> = entries
        .iter()
        .filter(|e| matches!(e.category, FileCategory::BranchIndex(_)))
        .map(|e| &e.dir)
        .collect();
    let mut candidates: Vec<&PathKey> = entries
        .iter()
        .filter(|e| matches!(e.category, FileCategory::LeafIndex(_)))
        .filter(|e| !e.dir.is_root() && !branches.contains(&e.dir))
        .map(|e| &e.dir)
        .collect();
    candidates.sort_by_key(|dir| dir.depth());

    let mut bundles = PrefixTree::new();
    for dir in candidates {
        if bundles.longest_prefix(dir.as_str()).is_none() {
            bundles.insert(dir.as_str(), ());
        }
    }
    bundles
}

/// Section directories in feed order, parents first.
fn section_dirs(entries: &[Entry], bundles: &PrefixTree<()>) -> Vec<PathKey> {
    let mut seen: FxHashSet<PathKey> = FxHashSet::default();
    let mut dirs = Vec::new();
    let mut push = |dir: PathKey| {
        if !dir.is_root()
            && bundles.longest_prefix(dir.as_str()).is_none()
            && seen.insert(dir.clone())
        {
            dirs.push(dir);
        }
    };

    for entry in entries {
        if let Some((top, _)) = entry.dir.as_str()[1..].split_once('/') {
            push(PathKey::new(top));
        } else if !entry.dir.is_root() {
            push(entry.dir.clone());
        }
        if matches!(entry.category, FileCategory::BranchIndex(_)) {
            push(entry.dir.clone());
        }
    }

    dirs.sort_by_key(PathKey::depth);
    dirs
}
