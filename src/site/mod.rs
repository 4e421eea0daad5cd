//! Site orchestration: discover → build tree → propagate → taxonomies.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use jwalk::WalkDir;
use rayon::prelude::*;

use crate::cascade::Propagator;
use crate::config::SiteConfig;
use crate::logger::ProgressLine;
use crate::resolve::{self, ResolveError};
use crate::resource::{OsPublishFs, PublishFs, Resource, ResourceError, ResourceSpec};
use crate::tree::{ContentNode, ContentTree, Source, SourceFile, TreeBuilder};

/// Files never treated as content.
const IGNORED_FILES: &[&str] = &[".DS_Store", "Thumbs.db"];

/// A loaded, propagated site.
#[derive(Debug)]
pub struct Site {
    config: SiteConfig,
    spec: ResourceSpec,
    tree: ContentTree,
}

/// Outcome of [`Site::publish_all`].
#[derive(Debug, Default)]
pub struct PublishReport {
    pub published: usize,
    pub failed: Vec<ResourceError>,
}

impl Site {
    /// Load the content directory named by `config`, publishing into its
    /// output directory.
    pub fn load_dir(config: SiteConfig) -> Result<Self> {
        let content = config.content_dir();
        let files = discover(&content)
            .with_context(|| format!("failed to read content dir `{}`", content.display()))?;
        let fs = Arc::new(OsPublishFs::new(config.output_dir()));
        Self::from_files(config, files, fs)
    }

    /// Build a site from an explicit file feed.
    pub fn from_files(
        config: SiteConfig,
        files: Vec<SourceFile>,
        fs: Arc<dyn PublishFs>,
    ) -> Result<Self> {
        let spec = ResourceSpec::new(config.spec_options(), fs)
            .with_context(|| format!("invalid base_url {:?}", config.site.base_url))?;

        let mut builder = TreeBuilder::new(&spec, config.build_options());
        builder.extend(files);
        let mut tree = builder.build();

        Propagator::new(config.site.title.clone())
            .propagate(&mut tree)
            .context("failed to propagate front matter")?;
        tree.assemble_taxonomies(&config.taxonomy_plurals());

        crate::debug!("site"; "{} nodes, {}", tree.len(), spec.cache_stats());
        Ok(Self { config, spec, tree })
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn tree(&self) -> &ContentTree {
        &self.tree
    }

    pub fn spec(&self) -> &ResourceSpec {
        &self.spec
    }

    /// Resolve `reference`, optionally relative to the node `from` resolves to.
    ///
    /// A `from` that names no node is an error rather than a silent fallback
    /// to the content root.
    pub fn resolve(
        &self,
        from: Option<&str>,
        reference: &str,
    ) -> Result<Option<&ContentNode>, ResolveError> {
        let context = match from {
            Some(from) => match resolve::resolve(&self.tree, None, from)? {
                Some(node) => Some(node),
                None => return Err(ResolveError::UnknownContext(from.trim().to_string())),
            },
            None => None,
        };
        resolve::resolve(&self.tree, context, reference)
    }

    /// Every resource attached to a node, in tree order.
    pub fn resources(&self) -> Vec<Arc<Resource>> {
        self.tree
            .nodes()
            .iter()
            .flat_map(|node| node.resources().iter().cloned())
            .collect()
    }

    /// Publish every resource in parallel.
    pub fn publish_all(&self) -> PublishReport {
        let resources = self.resources();
        let progress = ProgressLine::new("publish", &[("resources", resources.len())]);

        let failed: Vec<ResourceError> = resources
            .par_iter()
            .filter_map(|resource| {
                let result = resource.publish();
                progress.inc("resources");
                result.err()
            })
            .collect();
        progress.finish();

        PublishReport {
            published: resources.len() - failed.len(),
            failed,
        }
    }
}

/// Content files under `dir`, sorted, as slash paths relative to `dir`.
pub fn discover(dir: &Path) -> Result<Vec<SourceFile>> {
    if !dir.is_dir() {
        anyhow::bail!("not a directory");
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort(true).skip_hidden(true) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_str().unwrap_or_default();
        if IGNORED_FILES.contains(&name) {
            continue;
        }
        let path = entry.path();
        let rel = path
            .strip_prefix(dir)
            .unwrap_or(path.as_path())
            .to_string_lossy()
            .into_owned();
        files.push(SourceFile::new(rel, Source::File(path)));
    }
    Ok(files)
}

#[cfg(test)]
mod tests;
