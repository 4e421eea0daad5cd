//! Reference resolution: turn a user-written page reference into a node.
//!
//! # Lookup order
//!
//! 1. Relative refs are joined onto the context's directory
//! 2. Section, page-as-section, or page in the longest matching section
//! 3. Content-root-relative retry for refs given without a leading slash
//! 4. Taxonomy nodes, only at the exact requested depth
//! 5. Short name (`b1`, `unique.md`), failing if it names several pages
//!
//! Not finding anything is `Ok(None)`; only ambiguous short names and
//! malformed legacy calls are errors. Resolution never mutates the tree.


use thiserror::Error;

use crate::core::{NodeKind, key};
use crate::tree::{ContentNode, ContentTree, ShortName, short_name};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// The short name maps to more than one page.
    #[error("page reference \"{0}\" is ambiguous")]
    Ambiguous(String),

    /// A legacy positional call with more than two meaningful arguments.
    #[error("too many arguments to get_page: {0:?}")]
    Malformed(Vec<String>),

    /// The reference naming the context node did not resolve.
    #[error("context reference \"{0}\" not found")]
    UnknownContext(String),
}

/// Resolve `reference`, relative to `context` when it has no leading slash.
pub fn resolve<'t>(
    tree: &'t ContentTree,
    context: Option<&ContentNode>,
    reference: &str,
) -> Result<Option<&'t ContentNode>, ResolveError> {
    let original = reference.trim().replace('\\', "/");
    let original = original.as_str();
    if original.is_empty() {
        return Ok(Some(tree.home()));
    }

    if let Some(ctx) = context
        && ctx.kind() == NodeKind::Page
        && matches!(original, "." | "./")
    {
        return Ok(Some(enclosing_section(tree, ctx)));
    }

    let normalized = match context {
        Some(ctx) if !original.starts_with('/') => {
            key::join(&["/", &ctx.context_dir(), original])
        }
        _ => key::clean(original),
    }
    .to_lowercase();

    let (found, name) = section_or_page(tree, &normalized);
    if found.is_some() {
        return Ok(found);
    }

    if !original.starts_with('/') {
        // Content-root-relative refs (`post/foo.md`) written in page bodies.
        let (found, _) = section_or_page(tree, &key::clean(&original.to_lowercase()));
        if found.is_some() {
            return Ok(found);
        }
    }

    if let Some((prefix, &id)) = tree.taxonomies_index().longest_prefix(&normalized) {
        if key::segment_count(prefix) != key::segment_count(&normalized) {
            return Ok(None);
        }
        return Ok(Some(tree.node(id)));
    }

    match tree.short_names().get(&name) {
        Some(ShortName::Unique(id)) => Ok(Some(tree.node(id))),
        Some(ShortName::Ambiguous) => Err(ResolveError::Ambiguous(original.to_string())),
        None => Ok(None),
    }
}

/// Legacy positional lookup: `get_page("section", "sect3")`,
/// `get_page("sect3/page1.md")`, `get_page()` for home.
///
/// Empty and `/` arguments are dropped; the kind argument is only used to
/// recognise the `home` and bare `section` forms.
pub fn get_page_legacy<'t>(
    tree: &'t ContentTree,
    args: &[&str],
) -> Result<Option<&'t ContentNode>, ResolveError> {
    let kept: Vec<&str> = args
        .iter()
        .copied()
        .filter(|arg| !arg.is_empty() && *arg != "/")
        .collect();

    if kept.len() > 2 {
        return Err(ResolveError::Malformed(
            kept.iter().map(|arg| arg.to_string()).collect(),
        ));
    }

    let reference = match kept.as_slice() {
        [] | ["home", ..] => "/".to_string(),
        ["section"] if args.len() == 2 => "/".to_string(),
        [.., reference] => reference.replace('\\', "/"),
    };
    let reference = if reference.starts_with('/') {
        reference
    } else {
        format!("/{reference}")
    };
    resolve(tree, None, &reference)
}

/// Structural lookup of a clean, rooted, lower-cased ref.
///
/// Returns the node (if any) and the ref's short name, used by the
/// short-name fallback.
pub(crate) fn section_or_page<'t>(
    tree: &'t ContentTree,
    reference: &str,
) -> (Option<&'t ContentNode>, String) {
    let matched = tree.sections_index().longest_prefix(reference);
    let prefix = matched.map_or("", |(prefix, _)| prefix);
    let filename = reference
        .strip_prefix(prefix)
        .unwrap_or(reference)
        .trim_start_matches('/');
    let name = short_name(filename, tree.language()).to_string();

    let Some((prefix, &id)) = matched else {
        return (None, name);
    };
    let section = tree.node(id);

    if prefix == reference {
        return (Some(section), name);
    }

    // A section referenced through its own file, e.g. `sect3/_index.md`.
    if let Some(file) = section.file()
        && file.file_name().to_lowercase() == filename
    {
        return (Some(section), name);
    }

    (tree.page(&key::join(&[prefix, &name])), name)
}

fn enclosing_section<'t>(tree: &'t ContentTree, node: &ContentNode) -> &'t ContentNode {
    let mut current = node.parent();
    while let Some(id) = current {
        let parent = tree.node(id);
        if parent.is_branch() {
            return parent;
        }
        current = parent.parent();
    }
    tree.home()
}
