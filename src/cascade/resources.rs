//! Resource metadata from a bundle's `resources` front matter list.
//!
//! ```yaml
//! resources:
//!   - src: "images/**/*.png"
//!     title: Gallery image
//!     params:
//!       credits: me
//! ```
//!
//! Entries are matched in order against each resource key. The first entry
//! providing `name` or `title` wins for that field; `params` merge with
//! earlier entries taking precedence.

use globset::{GlobBuilder, GlobMatcher};
use serde_json::Value;

use crate::core::JsonMap;
use crate::page::PageMeta;
use crate::resource::ResourceMeta;
use crate::tree::ContentNode;

pub(super) fn apply_resource_meta(node: &ContentNode, meta: &PageMeta) {
    if node.resources().is_empty() {
        return;
    }
    let Some(Value::Array(entries)) = meta.param("resources") else {
        return;
    };
    let entries: Vec<(GlobMatcher, &JsonMap)> = entries
        .iter()
        .filter_map(Value::as_object)
        .filter_map(|entry| {
            let pattern = entry.get("src").and_then(Value::as_str)?;
            match compile(pattern) {
                Ok(glob) => Some((glob, entry)),
                Err(e) => {
                    crate::debug!("cascade"; "{}: skipping resources entry: {}", node.key(), e);
                    None
                }
            }
        })
        .collect();
    if entries.is_empty() {
        return;
    }

    for resource in node.resources() {
        let key = resource.key();
        let mut applied = ResourceMeta::default();
        let mut matched = false;

        for (glob, entry) in &entries {
            if !glob.is_match(&key) {
                continue;
            }
            matched = true;
            if applied.name.is_none() {
                applied.name = entry.get("name").and_then(Value::as_str).map(str::to_string);
            }
            if applied.title.is_none() {
                applied.title = entry.get("title").and_then(Value::as_str).map(str::to_string);
            }
            if let Some(Value::Object(params)) = entry.get("params") {
                for (k, v) in params {
                    applied.params.entry(k.to_lowercase()).or_insert_with(|| v.clone());
                }
            }
        }

        if matched {
            resource.set_meta(applied);
        }
    }
}

/// Compile one `src` pattern: `*` stays within a segment, `**/` crosses
/// segments, matching ignores case.
fn compile(pattern: &str) -> Result<GlobMatcher, globset::Error> {
    let glob = GlobBuilder::new(pattern)
        .literal_separator(true)
        .case_insensitive(true)
        .build()?;
    Ok(glob.compile_matcher())
}
