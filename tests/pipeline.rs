//! Full builds of the fixture content tree through the public API.

use chrono::NaiveDate;
use folio::config::{FolioConfig, load_config};
use folio::history::NoHistory;
use folio::related::Direction;
use folio::site::Site;
use folio::types::{CollectionKind, ContentDocument};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());
        if src_path.is_dir() {
            fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/content");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
}

fn load(root: &Path) -> Site {
    let mut config = FolioConfig::default();
    config.content.posts = root.join("posts");
    config.content.projects = root.join("projects");
    Site::load_with(&config, &NoHistory, today())
}

fn slugs(docs: &[ContentDocument]) -> Vec<&str> {
    docs.iter().map(|d| d.slug.as_str()).collect()
}

// =========================================================================
// Collections
// =========================================================================

#[test]
fn posts_are_newest_first_and_skip_ignored_entries() {
    let tmp = setup_fixtures();
    let site = load(tmp.path());

    assert_eq!(
        slugs(site.posts().all()),
        vec![
            "generics-draft",
            "ownership",
            "async-basics",
            "pinning",
            "concurrency"
        ]
    );
    assert!(site.report().is_clean());
}

#[test]
fn every_document_reads_for_at_least_a_minute() {
    let tmp = setup_fixtures();
    let site = load(tmp.path());
    let all = site.posts().all().iter().chain(site.projects().all());
    assert!(all.into_iter().all(|d| d.reading_time_minutes >= 1));
}

#[test]
fn drafts_are_listed_but_not_published() {
    let tmp = setup_fixtures();
    let site = load(tmp.path());
    let published: Vec<&str> = site.posts().published().map(|d| d.slug.as_str()).collect();
    assert!(!published.contains(&"generics-draft"));
    assert_eq!(published.len(), site.posts().len() - 1);
}

#[test]
fn resolved_metadata_for_fixture_posts() {
    let tmp = setup_fixtures();
    let site = load(tmp.path());

    let ownership = site.posts().find("ownership", Some("rust")).unwrap();
    assert_eq!(ownership.title, "Understanding Ownership");
    assert_eq!(ownership.author.github.as_deref(), Some("ada"));
    assert_eq!(ownership.image_alt.as_deref(), Some("Boxes connected by arrows"));
    assert_eq!(
        ownership.excerpt,
        "Moves, borrows and lifetimes without the hand-waving."
    );

    let async_basics = site.posts().find("async-basics", None).unwrap();
    assert_eq!(async_basics.author.name, "Ada Lovelace");
    assert_eq!(async_basics.contributors[0].name, "Grace Hopper");
    assert!(async_basics.excerpt.starts_with("Futures do nothing until polled."));

    let concurrency = site.posts().find("concurrency", Some("go")).unwrap();
    assert!(concurrency.last_modified.is_some());

    let pinning = site.posts().find("pinning", None).unwrap();
    assert_eq!(pinning.category, "rust/async");
    assert_eq!(pinning.author, FolioConfig::default().default_author);
}

// =========================================================================
// Lookup and routes
// =========================================================================

#[test]
fn by_slug_ignores_case_and_carries_outline() {
    let tmp = setup_fixtures();
    let site = load(tmp.path());

    let view = site.posts().by_slug("OWNERSHIP", Some("Rust")).unwrap();
    let nav: Vec<(u8, &str)> = view
        .navigation()
        .map(|n| (n.level, n.slug.as_str()))
        .collect();
    assert_eq!(
        nav,
        vec![
            (2, "moves"),
            (2, "borrowing"),
            (3, "shared-references"),
            (3, "mutable-references"),
            (2, "in-practice"),
        ]
    );
}

#[test]
fn routes_exclude_nested_categories() {
    let tmp = setup_fixtures();
    let site = load(tmp.path());

    let paths = site.posts().all_paths();
    assert_eq!(paths.len(), 4);
    assert!(!paths.iter().any(|(category, _)| category.contains('/')));
    assert!(paths.contains(&("rust".to_string(), "ownership".to_string())));
}

#[test]
fn tags_across_posts() {
    let tmp = setup_fixtures();
    let site = load(tmp.path());
    let tags: Vec<(String, usize)> = site
        .posts()
        .tags()
        .into_iter()
        .map(|t| (t.name, t.count))
        .collect();
    // Equal counts fall back to alphabetical order
    assert_eq!(
        tags,
        vec![
            ("Async".to_string(), 2),
            ("Go".to_string(), 2),
            ("Rust".to_string(), 2),
            ("Concurrency".to_string(), 1),
            ("Memory".to_string(), 1),
        ]
    );
}

// =========================================================================
// Related content
// =========================================================================

#[test]
fn project_to_posts_ranking() {
    let tmp = setup_fixtures();
    let site = load(tmp.path());

    let project = site.projects().find("folio-cli", None).unwrap();
    let related = site.related_to(project, Some(10));
    let ranked: Vec<(&str, u32)> = related
        .iter()
        .map(|s| (s.document.slug.as_str(), s.score))
        .collect();
    assert_eq!(ranked, vec![("ownership", 9), ("async-basics", 3)]);
}

#[test]
fn related_never_returns_zero_scores_or_exceeds_limit() {
    let tmp = setup_fixtures();
    let site = load(tmp.path());

    for limit in 0..4 {
        for source in site.posts().all().iter().chain(site.projects().all()) {
            let related = site.related_to(source, Some(limit));
            assert!(related.len() <= limit);
            assert!(related.iter().all(|s| s.score > 0));
            assert!(related.iter().all(|s| s.document.collection != source.collection));
        }
    }
    assert_eq!(
        Direction::from_source(CollectionKind::Projects),
        Direction::ProjectToPosts
    );
}

// =========================================================================
// Determinism and configuration
// =========================================================================

#[test]
fn rebuilds_are_byte_identical() {
    let tmp = setup_fixtures();
    let first = load(tmp.path());
    let second = load(tmp.path());

    for kind in [CollectionKind::Posts, CollectionKind::Projects] {
        let a = serde_json::to_string(first.collection(kind).all()).unwrap();
        let b = serde_json::to_string(second.collection(kind).all()).unwrap();
        assert_eq!(a, b);
    }
}

#[test]
fn config_file_roots_are_relative_to_the_file() {
    let tmp = setup_fixtures();
    fs::write(
        tmp.path().join("folio.toml"),
        "[content]\nposts = \"posts\"\nprojects = \"projects\"\n\n[history]\nenabled = false\n",
    )
    .unwrap();

    let config = load_config(&tmp.path().join("folio.toml")).unwrap();
    assert_eq!(config.content.posts, tmp.path().join("posts"));

    let site = Site::load(&config);
    assert_eq!(site.posts().len(), 5);
    assert_eq!(site.projects().len(), 2);
}

#[test]
fn malformed_file_is_reported_not_fatal() {
    let tmp = setup_fixtures();
    fs::write(
        tmp.path().join("posts/rust/broken.md"),
        "---\ntags: [oops\n---\nBody\n",
    )
    .unwrap();

    let site = load(tmp.path());
    assert_eq!(site.posts().len(), 5);
    let report = site.report();
    assert_eq!(report.skipped.len(), 1);
    assert!(report.skipped[0].path.ends_with("posts/rust/broken.md"));
}
