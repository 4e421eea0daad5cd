use std::fs;
use std::path::Path;

use tempfile::TempDir;

use super::*;
use crate::core::NodeKind;
use crate::resource::tests::MemoryFs;

fn write(root: &Path, rel: &str, body: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, body).unwrap();
}

fn site_dir() -> TempDir {
    let temp = TempDir::new().unwrap();
    let content = temp.path().join("content");
    write(&content, "_index.md", "---\ntitle: Home\n---\n");
    write(&content, "about.md", "---\ntitle: About\ntags: [Intro]\n---\n");
    write(&content, "blog/_index.md", "---\ntitle: Blog\ncascade:\n  author: ann\n---\n");
    write(&content, "blog/trip/index.md", "---\ntitle: Trip\ntags:\n- Travel\n- intro\n---\n");
    write(&content, "blog/trip/images/a.png", "png-bytes");
    write(&content, "blog/trip/.hidden.png", "hidden");
    write(&content, "blog/.DS_Store", "junk");
    write(&content, "blog/Thumbs.db", "junk");
    temp
}

fn config(root: &Path) -> SiteConfig {
    SiteConfig {
        root: root.to_path_buf(),
        ..SiteConfig::default()
    }
}

#[test]
fn test_discover_skips_hidden_and_ignored() {
    let temp = site_dir();
    let files = discover(&temp.path().join("content")).unwrap();
    let paths: Vec<_> = files.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(
        paths,
        [
            "_index.md",
            "about.md",
            "blog/_index.md",
            "blog/trip/images/a.png",
            "blog/trip/index.md"
        ]
    );
}

#[test]
fn test_discover_missing_dir() {
    let temp = TempDir::new().unwrap();
    assert!(discover(&temp.path().join("nope")).is_err());
}

#[test]
fn test_load_dir_builds_and_propagates() {
    let temp = site_dir();
    let site = Site::load_dir(config(temp.path())).unwrap();
    let tree = site.tree();

    assert_eq!(tree.home().title(), "Home");
    let trip = tree.page("/blog/trip").unwrap();
    assert_eq!(trip.meta().unwrap().param("author"), Some(&serde_json::json!("ann")));
    assert_eq!(site.resources().len(), 1);

    // Default taxonomies: `tags` has terms, `categories` is empty.
    let intro = tree.taxonomy("/tags/intro").unwrap();
    assert_eq!(intro.kind(), NodeKind::Taxonomy);
    assert_eq!(intro.title(), "Intro");
    assert_eq!(intro.pages().len(), 2);
    assert!(tree.taxonomy("/categories").unwrap().sections().is_empty());
}

#[test]
fn test_site_resolve() {
    let temp = site_dir();
    let site = Site::load_dir(config(temp.path())).unwrap();

    assert_eq!(site.resolve(None, "trip").unwrap().unwrap().title(), "Trip");
    assert_eq!(site.resolve(Some("blog"), "trip").unwrap().unwrap().title(), "Trip");
    let about = site.resolve(Some("blog/trip"), "../../about.md").unwrap();
    assert_eq!(about.unwrap().title(), "About");
    assert!(site.resolve(None, "nothing").unwrap().is_none());
}

#[test]
fn test_site_resolve_unknown_context() {
    let temp = site_dir();
    let site = Site::load_dir(config(temp.path())).unwrap();

    let err = site.resolve(Some(" nowhere "), "about.md").unwrap_err();
    assert_eq!(err, ResolveError::UnknownContext("nowhere".to_string()));
    assert_eq!(err.to_string(), "context reference \"nowhere\" not found");
}

#[test]
fn test_publish_all_writes_output() {
    let temp = site_dir();
    let site = Site::load_dir(config(temp.path())).unwrap();

    let report = site.publish_all();
    assert_eq!(report.published, 1);
    assert!(report.failed.is_empty());
    let out = temp.path().join("public/blog/trip/images/a.png");
    assert_eq!(fs::read(out).unwrap(), b"png-bytes");
}

#[test]
fn test_publish_all_collects_failures() {
    let files = vec![
        SourceFile::from_bytes("post/index.md", "---\ntitle: Post\n---\n"),
        SourceFile::from_bytes("post/a.png", "a"),
        SourceFile::from_bytes("post/b.png", "b"),
    ];
    let fs = Arc::new(MemoryFs::failing());
    let site = Site::from_files(SiteConfig::default(), files, fs.clone()).unwrap();

    let report = site.publish_all();
    assert_eq!(report.published, 0);
    assert_eq!(report.failed.len(), 2);
    assert_eq!(fs.creates(), 2);

    // Failure is terminal: a second pass does not retry.
    site.publish_all();
    assert_eq!(fs.creates(), 2);
}

#[test]
fn test_from_files_reports_cascade_error() {
    let files = vec![SourceFile::from_bytes("_index.md", "---\ncascade: [1]\n---\n")];
    let fs = Arc::new(MemoryFs::default());
    let err = Site::from_files(SiteConfig::default(), files, fs).unwrap_err();
    assert!(format!("{err:#}").contains("cascade must be a map"));
}

#[test]
fn test_from_files_multihost() {
    let mut config = SiteConfig::default();
    config.build.multihost_dirs = vec!["en".to_string(), "de".to_string()];
    config.build.lazy_publish = false;
    let files = vec![
        SourceFile::from_bytes("post/index.md", "---\ntitle: Post\n---\n"),
        SourceFile::from_bytes("post/a.png", "a"),
    ];
    let fs = Arc::new(MemoryFs::default());
    let site = Site::from_files(config, files, fs.clone()).unwrap();

    site.publish_all();
    assert_eq!(fs.paths(), ["/de/post/a.png", "/en/post/a.png"]);
}
