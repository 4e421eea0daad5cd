//! File and node category definitions.

use std::fmt;

use serde::Serialize;

/// Kind of content file, decides whether a file becomes a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    /// Markdown file (.md, .markdown)
    Markdown,
    /// HTML file (.html, .htm)
    Html,
}

impl ContentKind {
    /// Detect content kind from a file extension (without the dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "md" | "markdown" => Some(Self::Markdown),
            "html" | "htm" => Some(Self::Html),
            _ => None,
        }
    }

    /// Detect content kind from a slash path.
    pub fn from_path(path: &str) -> Option<Self> {
        let ext = super::key::ext(path);
        Self::from_extension(ext.trim_start_matches('.'))
    }

    /// File extensions for this content kind.
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            Self::Markdown => &["md", "markdown"],
            Self::Html => &["html", "htm"],
        }
    }
}

/// Category of a discovered file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileCategory {
    /// `_index.<ext>`: owns its directory as a section (home at the root).
    BranchIndex(ContentKind),
    /// `index.<ext>`: owns its directory as a leaf bundle page.
    LeafIndex(ContentKind),
    /// Any other content file.
    Content(ContentKind),
    /// Non-content file, attached to a bundle as a resource.
    Resource,
}

impl FileCategory {
    /// Classify a slash path by its file name.
    ///
    /// A language suffix (`index.en.md`) does not change the category.
    pub fn from_path(path: &str) -> Self {
        let Some(kind) = ContentKind::from_path(path) else {
            return Self::Resource;
        };
        let (_, file) = super::key::split(path);
        let stem = file.split('.').next().unwrap_or_default();
        match stem {
            "_index" => Self::BranchIndex(kind),
            "index" => Self::LeafIndex(kind),
            _ => Self::Content(kind),
        }
    }

    #[inline]
    pub fn is_content(self) -> bool {
        !matches!(self, Self::Resource)
    }
}

/// Kind of a node in the content tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
    Home,
    Section,
    Page,
    /// Taxonomy list node, e.g. `/categories`.
    TaxonomyTerm,
    /// Single term node, e.g. `/categories/rust`.
    Taxonomy,
}

impl NodeKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Section => "section",
            Self::Page => "page",
            Self::TaxonomyTerm => "taxonomyTerm",
            Self::Taxonomy => "taxonomy",
        }
    }

    /// Home and sections own child pages and sub-sections.
    #[inline]
    pub const fn is_branch(self) -> bool {
        matches!(self, Self::Home | Self::Section)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
