#![allow(clippy::expect_used, clippy::unwrap_used)]

mod common;

use common::{FakePage, ScriptedTransport, cache_with};
use pretty_assertions::assert_eq;
use sourcecache_core::{AliasTable, Config, SourceCache};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use url::Url;

fn write(dir: &Path, rel: &str, contents: &str) -> Url {
    let path = dir.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, contents).unwrap();
    Url::from_file_path(&path).unwrap()
}

fn local_cache(aliases: AliasTable, config: &Config) -> (SourceCache, Arc<ScriptedTransport>) {
    let transport = Arc::new(ScriptedTransport::new());
    let cache = cache_with(FakePage::default(), Arc::clone(&transport), aliases, config);
    (cache, transport)
}

#[tokio::test]
async fn file_urls_are_read_but_not_cached_by_default() {
    // Given: A script on disk
    let dir = TempDir::new().unwrap();
    let url = write(dir.path(), "app.js", "one();\ntwo();\n");
    let (mut cache, transport) = local_cache(AliasTable::default(), &Config::default());

    // When: Loading it
    let lines = cache.load(url.as_str(), None, None).await.unwrap();

    // Then: Lines come back, the store stays empty and no request is made
    assert_eq!(lines.len(), 2);
    assert!(!cache.is_cached(url.as_str()));
    assert!(transport.requests().is_empty());

    // A later edit is visible on the next read
    std::fs::write(dir.path().join("app.js"), "changed();\n").unwrap();
    assert_eq!(cache.get_line(url.as_str(), 1).await, "changed();\n");
}

#[tokio::test]
async fn opted_in_local_files_are_cached_except_volatile_ones() {
    let dir = TempDir::new().unwrap();
    let script = write(dir.path(), "app.js", "a\n");
    let strings = write(dir.path(), "app.properties", "title=App\n");
    let localized = write(dir.path(), "locale/en/menu.js", "m\n");

    let mut config = Config::default();
    config.local.cache_local_files = true;
    let (mut cache, _) = local_cache(AliasTable::default(), &config);

    for url in [&script, &strings, &localized] {
        assert!(cache.load(url.as_str(), None, None).await.is_some());
    }

    assert!(cache.is_cached(script.as_str()));
    assert!(!cache.is_cached(strings.as_str()));
    assert!(!cache.is_cached(localized.as_str()));
}

#[tokio::test]
async fn empty_or_missing_files_yield_nothing() {
    let dir = TempDir::new().unwrap();
    let empty = write(dir.path(), "empty.js", "");
    let missing = Url::from_file_path(dir.path().join("missing.js")).unwrap();
    let (mut cache, _) = local_cache(AliasTable::default(), &Config::default());

    assert!(cache.load(empty.as_str(), None, None).await.is_none());
    assert!(cache.load(missing.as_str(), None, None).await.is_none());
    assert_eq!(
        cache.get_line(missing.as_str(), 1).await,
        format!("(no source for {missing})")
    );
}

#[tokio::test]
async fn resource_alias_reads_mapped_file() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "modules/util.jsm", "var EXPORTED = 1;\n");
    let aliases = AliasTable::default().with_resource("gre", dir.path());
    let (mut cache, _) = local_cache(aliases, &Config::default());

    let text = cache
        .load_text("resource://gre/modules/util.jsm", None, None)
        .await;

    assert_eq!(text.as_deref(), Some("var EXPORTED = 1;\n"));
}

#[tokio::test]
async fn unknown_resource_alias_yields_nothing() {
    let (mut cache, transport) = local_cache(AliasTable::default(), &Config::default());

    assert!(cache.load("resource://nowhere/x.jsm", None, None).await.is_none());
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn chrome_alias_reads_mapped_file() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "content/overlay.js", "init();\n");
    let aliases = AliasTable::default().with_chrome("ext", dir.path());
    let (mut cache, _) = local_cache(aliases, &Config::default());

    assert_eq!(
        cache.get_line("chrome://ext/content/overlay.js", 1).await,
        "init();\n"
    );
}

#[tokio::test]
async fn chrome_wrapper_munge_reads_right_hand_side() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "content/real.js", "real();\n");
    let aliases = AliasTable::default().with_chrome("ext", dir.path());
    let (mut cache, _) = local_cache(aliases, &Config::default());

    let text = cache
        .load_text(
            "chrome://ext/content/wrapper.js -> chrome://ext/content/real.js",
            None,
            None,
        )
        .await;

    assert_eq!(text.as_deref(), Some("real();\n"));
}

#[tokio::test]
async fn unresolvable_chrome_alias_is_one_line_notice() {
    let (mut cache, _) = local_cache(AliasTable::default(), &Config::default());
    let id = "chrome://unknown/content/a.js";

    let lines = cache.load(id, None, None).await.unwrap();

    assert_eq!(lines.len(), 1);
    assert_eq!(
        lines[0],
        format!("failed to convert chrome URL to a local path: {id}")
    );
    assert!(!cache.is_cached(id));
}

#[tokio::test]
async fn filtered_chrome_urls_are_not_read() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "content/overlay.js", "init();\n");
    let aliases = AliasTable::default().with_chrome("ext", dir.path());
    let mut config = Config::default();
    config.filter.filter_system_urls = true;
    let (mut cache, _) = local_cache(aliases, &config);
    let id = "chrome://ext/content/overlay.js";

    assert_eq!(
        cache.get_line(id, 1).await,
        format!("Filtered chrome url {id}")
    );
}
