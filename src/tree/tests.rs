use std::sync::Arc;

use super::*;
use crate::cascade::Propagator;
use crate::resource::tests::MemoryFs;
use crate::resource::{PublishFs, SpecOptions};

// ============================================================================
// Fixtures
// ============================================================================

/// A content page with a title and one category.
pub(crate) fn page(title: &str) -> String {
    format!("---\ntitle: \"{title}\"\ncategories:\n- Rust\n---\n# Doc\n")
}

pub(crate) fn spec() -> ResourceSpec {
    let fs: Arc<dyn PublishFs> = Arc::new(MemoryFs::default());
    ResourceSpec::new(SpecOptions::default(), fs).unwrap()
}

/// Build, propagate and assemble `categories`.
pub(crate) fn build(spec: &ResourceSpec, files: Vec<SourceFile>) -> ContentTree {
    let mut builder = TreeBuilder::new(
        spec,
        BuildOptions {
            language: "en".to_string(),
        },
    );
    builder.extend(files);
    let mut tree = builder.build();
    Propagator::new("").propagate(&mut tree).unwrap();
    tree.assemble_taxonomies(&["categories"]);
    tree
}

/// Ten sections of ten pages plus the special cases under `sect3`.
pub(crate) fn fixture_files() -> Vec<SourceFile> {
    let mut files = Vec::new();
    for i in 0..10 {
        for j in 0..10 {
            files.push(SourceFile::from_bytes(
                format!("sect{i}/page{j}.md"),
                page(&format!("Title{i}_{j}")),
            ));
        }
    }
    for (path, title) in [
        ("_index.md", "home page"),
        ("about.md", "about page"),
        ("sect3/_index.md", "section 3"),
        ("sect3/unique.md", "UniqueBase"),
        ("sect3/Unique2.md", "UniqueBase2"),
        ("sect3/sect7/_index.md", "another sect7"),
        ("sect3/subsect/deep.md", "deep page"),
        ("sect3/b1/index.md", "b1 bundle"),
        ("sect3/index/index.md", "index bundle"),
    ] {
        files.push(SourceFile::from_bytes(path, page(title)));
    }
    files
}

pub(crate) fn fixture() -> ContentTree {
    build(&spec(), fixture_files())
}

fn keys<'t>(tree: &'t ContentTree, ids: &[NodeId]) -> Vec<&'t str> {
    ids.iter().map(|&id| tree.node(id).key().as_str()).collect()
}

// ============================================================================
// Classification
// ============================================================================

#[test]
fn test_fixture_classification() {
    let tree = fixture();

    assert_eq!(tree.sections_index().len(), 12);
    assert_eq!(tree.regular_pages().count(), 106);
    assert_eq!(tree.home().title(), "home page");
    assert_eq!(tree.language(), "en");

    let sect3 = tree.section("/sect3").unwrap();
    assert_eq!(sect3.title(), "section 3");
    assert_eq!(sect3.context_dir(), "sect3");

    let nested = tree.section("/sect3/sect7").unwrap();
    assert_eq!(nested.title(), "another sect7");
    assert_eq!(nested.parent(), Some(sect3.id()));

    // No `_index`: default title from the directory name.
    assert_eq!(tree.section("/sect7").unwrap().title(), "Sect7s");

    // A nested directory without `_index` is a plain path segment.
    assert!(tree.section("/sect3/subsect").is_none());
    let deep = tree.page("/sect3/subsect/deep").unwrap();
    assert_eq!(deep.parent(), Some(sect3.id()));
    assert_eq!(deep.context_dir(), "sect3/subsect");

    assert_eq!(tree.page("/sect3/unique2").unwrap().title(), "UniqueBase2");
    assert_eq!(tree.page("/sect3/unique2").unwrap().file().unwrap().path, "sect3/Unique2.md");
}

#[test]
fn test_leaf_bundles_and_short_names() {
    let tree = fixture();

    let b1 = tree.page("/sect3/b1").unwrap();
    assert!(b1.is_leaf_bundle());
    assert_eq!(b1.title(), "b1 bundle");
    assert!(tree.page("/sect3/index").unwrap().is_leaf_bundle());
    assert!(!tree.page("/about").unwrap().is_leaf_bundle());

    let names = tree.short_names();
    assert_eq!(names.get("b1"), Some(ShortName::Unique(b1.id())));
    assert_eq!(names.get("page1"), Some(ShortName::Ambiguous));
    assert_eq!(names.get("sect3"), None);
}

#[test]
fn test_fixture_taxonomy() {
    let tree = fixture();

    let list = tree.taxonomy("/categories").unwrap();
    assert_eq!(list.kind(), NodeKind::TaxonomyTerm);
    assert_eq!(list.title(), "Categories");
    assert_eq!(list.parent(), Some(tree.home().id()));
    assert_eq!(keys(&tree, list.sections()), ["/categories/rust"]);

    let term = tree.taxonomy("/categories/rust").unwrap();
    assert_eq!(term.kind(), NodeKind::Taxonomy);
    assert_eq!(term.title(), "Rust");
    assert_eq!(term.pages().len(), 106);
    assert_eq!(tree.get("/categories/rust").map(ContentNode::id), Some(term.id()));

    // Taxonomy nodes come after the content tree.
    let last: Vec<_> = tree.pages().map(|n| n.key().as_str()).collect();
    assert_eq!(&last[last.len() - 2..], ["/categories", "/categories/rust"]);
}

#[test]
fn test_assemble_taxonomies_skips_existing_and_empty() {
    let mut tree = fixture();
    let before = tree.len();
    tree.assemble_taxonomies(&["categories", "", "/"]);
    assert_eq!(tree.len(), before);

    // No page carries tags: the list exists without terms.
    tree.assemble_taxonomies(&["tags"]);
    let tags = tree.taxonomy("/tags").unwrap();
    assert_eq!(tags.title(), "Tags");
    assert!(tags.sections().is_empty());
}

// ============================================================================
// Bundles and resources
// ============================================================================

fn bundle_files() -> Vec<SourceFile> {
    vec![
        SourceFile::from_bytes("_index.md", "---\ntitle: Home\n---\n"),
        SourceFile::from_bytes("logo.png", "logo"),
        SourceFile::from_bytes("blog/_index.md", "---\ntitle: Blog\n---\n"),
        SourceFile::from_bytes("blog/banner.jpg", "banner"),
        SourceFile::from_bytes("blog/post.md", "---\ntitle: Post\n---\n"),
        SourceFile::from_bytes("blog/trip/index.md", "---\ntitle: Trip\n---\n"),
        SourceFile::from_bytes("blog/trip/images/a.png", "a"),
        SourceFile::from_bytes("blog/trip/notes.md", "---\ntitle: Notes\n---\n"),
        SourceFile::from_bytes("blog/trip/extra/index.md", "---\ntitle: Extra\n---\n"),
    ]
}

fn resource_keys(node: &ContentNode) -> Vec<String> {
    node.resources().iter().map(|r| r.key()).collect()
}

#[test]
fn test_bundled_content_and_resources() {
    let spec = spec();
    let tree = build(&spec, bundle_files());

    let trip = tree.page("/blog/trip").unwrap();
    assert_eq!(trip.bundled().len(), 2);
    for &id in trip.bundled() {
        let bundled = tree.node(id);
        assert_eq!(bundled.kind(), NodeKind::Page);
        assert_eq!(bundled.parent(), Some(trip.id()));
    }
    assert_eq!(tree.node(trip.bundled()[0]).title(), "Notes");

    // Bundled content is not addressable as a page.
    assert!(tree.page("/blog/trip/notes").is_none());
    assert!(tree.page("/blog/trip/extra").is_none());
    assert_eq!(tree.regular_pages().count(), 2);

    assert_eq!(resource_keys(trip), ["images/a.png"]);
    assert_eq!(trip.resources()[0].target_filenames(), ["/blog/trip/images/a.png"]);
    assert_eq!(resource_keys(tree.section("/blog").unwrap()), ["banner.jpg"]);
    assert_eq!(resource_keys(tree.home()), ["logo.png"]);
}

#[test]
fn test_resource_lookup_and_cache_eviction() {
    let spec = spec();
    let tree = build(&spec, bundle_files());
    let trip = tree.page("/blog/trip").unwrap();

    let found = tree.resource(&spec, trip, "images/a.png").unwrap();
    assert!(Arc::ptr_eq(&found, &trip.resources()[0]));
    assert!(tree.resource(&spec, trip, "./images/a.png").is_some());
    assert!(tree.resource(&spec, trip, "nope.png").is_none());
    assert!(spec.cache_stats().contains("(1 missing)"));

    // Lookups are scoped to the page: home does not see the trip's images.
    assert!(tree.resource(&spec, tree.home(), "blog/trip/images/a.png").is_none());

    let post = tree.page("/blog/post").unwrap();
    assert_eq!(tree.clear_resource_cache_for_page(&spec, post), 0);
    // The resource itself, the found lookup and the missing marker.
    assert_eq!(tree.clear_resource_cache_for_page(&spec, trip), 3);
    assert!(spec.cache().get("/blog/banner.jpg").is_some());
    assert!(spec.cache().get("/blog/trip/images/a.png").is_none());
}

#[test]
fn test_clear_home_resources_keeps_other_pages() {
    let spec = spec();
    let tree = build(&spec, bundle_files());
    assert!(tree.resource(&spec, tree.home(), "logo.png").is_some());
    let before = spec.cache().len();

    assert_eq!(tree.clear_resource_cache_for_page(&spec, tree.home()), 2);
    assert_eq!(spec.cache().len(), before - 2);
    assert!(spec.cache().get("/logo.png").is_none());
    assert!(spec.cache().get("/blog/banner.jpg").is_some());
    assert!(spec.cache().get("/blog/trip/images/a.png").is_some());
}

#[test]
fn test_clear_section_resources_keeps_nested_bundle() {
    let spec = spec();
    let tree = build(&spec, bundle_files());
    let blog = tree.section("/blog").unwrap();
    let trip = tree.page("/blog/trip").unwrap();
    assert!(tree.resource(&spec, trip, "images/a.png").is_some());

    assert_eq!(tree.clear_resource_cache_for_page(&spec, blog), 1);
    assert!(spec.cache().get("/blog/banner.jpg").is_none());
    assert!(spec.cache().get("/blog/trip/images/a.png").is_some());

    // The bundle's own lookup is still answered from the cache.
    let hits = spec.cache_stats();
    assert!(tree.resource(&spec, trip, "images/a.png").is_some());
    assert_ne!(spec.cache_stats(), hits);
    assert_eq!(tree.clear_resource_cache_for_page(&spec, trip), 2);
}

// ============================================================================
// Keys and order
// ============================================================================

#[test]
fn test_duplicate_pages_and_language_suffix() {
    let tree = build(
        &spec(),
        vec![
            SourceFile::from_bytes("about.md", "---\ntitle: About\n---\n"),
            SourceFile::from_bytes("about.en.md", "---\ntitle: About EN\n---\n"),
            SourceFile::from_bytes("about.fr.md", "---\ntitle: About FR\n---\n"),
        ],
    );

    let about = tree.page("/about").unwrap();
    assert_eq!(about.file().unwrap().path, "about.md");
    assert_eq!(tree.page("/about.fr").unwrap().title(), "About FR");
    assert_eq!(tree.regular_pages().count(), 2);
}

#[test]
fn test_root_index_is_home_file() {
    let tree = build(
        &spec(),
        vec![SourceFile::from_bytes("index.md", "---\ntitle: Landing\n---\n")],
    );
    assert_eq!(tree.home().title(), "Landing");
    assert_eq!(tree.regular_pages().count(), 0);
}

#[test]
fn test_pages_in_tree_order() {
    let tree = build(
        &spec(),
        vec![
            SourceFile::from_bytes("b/_index.md", "---\nweight: 2\n---\n"),
            SourceFile::from_bytes("a/_index.md", "---\nweight: 1\n---\n"),
            SourceFile::from_bytes("a/y.md", "---\ntitle: Y\nweight: 2\n---\n"),
            SourceFile::from_bytes("a/x.md", "---\ntitle: X\nweight: 3\n---\n"),
            SourceFile::from_bytes("a/z.md", "---\ntitle: Z\ndate: 2020-01-01\n---\n"),
            SourceFile::from_bytes("top.md", "---\ntitle: Top\n---\n"),
        ],
    );

    let order: Vec<_> = tree.pages().map(|n| n.key().as_str()).collect();
    assert_eq!(order, ["/", "/top", "/a", "/a/z", "/a/y", "/a/x", "/b", "/categories"]);

    let regular: Vec<_> = tree.regular_pages().map(|n| n.key().as_str()).collect();
    assert_eq!(regular, ["/top", "/a/z", "/a/y", "/a/x"]);
}
