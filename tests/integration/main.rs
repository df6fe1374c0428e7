//! Integration tests for swcache

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    fn swcache() -> Command {
        cargo_bin_cmd!("swcache")
    }

    /// Config file pointing storage into a temp dir
    fn temp_config(temp: &TempDir) -> PathBuf {
        let path = temp.path().join("config.toml");
        let content = format!(
            "[worker]\norigin = \"http://localhost:8080\"\n\n[storage]\ndir = '{}'\n",
            caches_dir(temp.path()).display()
        );
        std::fs::write(&path, content).unwrap();
        path
    }

    pub(super) fn caches_dir(root: &Path) -> PathBuf {
        root.join("caches")
    }

    pub(super) fn with_config(temp: &TempDir) -> Command {
        let mut cmd = swcache();
        cmd.env_remove("SWCACHE_CONFIG")
            .arg("--config")
            .arg(temp_config(temp));
        cmd
    }

    #[test]
    fn help_displays() {
        swcache()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Offline-caching service worker lifecycle"));
    }

    #[test]
    fn version_displays() {
        swcache()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("swcache"));
    }

    #[test]
    fn config_path_uses_flag() {
        let temp = TempDir::new().unwrap();
        with_config(&temp)
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show_merges_defaults() {
        let temp = TempDir::new().unwrap();
        with_config(&temp)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[worker]"))
            .stdout(predicate::str::contains("7fdesign-v1"))
            .stdout(predicate::str::contains("/offline.html"));
    }

    #[test]
    fn config_init_writes_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("fresh").join("config.toml");

        swcache()
            .arg("--config")
            .arg(&path)
            .args(["config", "init"])
            .assert()
            .success();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("[precache]"));
    }

    #[test]
    fn invalid_config_is_reported() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "[worker\nversion = ").unwrap();

        swcache()
            .arg("--config")
            .arg(&path)
            .arg("status")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid configuration"));
    }

    #[test]
    fn cache_list_empty() {
        let temp = TempDir::new().unwrap();
        with_config(&temp)
            .args(["cache", "list"])
            .assert()
            .success()
            .stdout(predicate::str::contains("No cache buckets found"));
    }

    #[test]
    fn cache_list_json_empty() {
        let temp = TempDir::new().unwrap();
        with_config(&temp)
            .args(["cache", "list", "--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[]"));
    }

    #[test]
    fn cache_show_missing_bucket() {
        let temp = TempDir::new().unwrap();
        with_config(&temp)
            .args(["cache", "show", "nope"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Cache bucket not found"));
    }

    #[test]
    fn fetch_before_install_fails_with_hint() {
        let temp = TempDir::new().unwrap();
        with_config(&temp)
            .args(["fetch", "http://localhost:8080/", "--navigate", "--offline"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("is not installed"))
            .stderr(predicate::str::contains("swcache install"));
    }

    #[test]
    fn activate_before_install_fails() {
        let temp = TempDir::new().unwrap();
        with_config(&temp)
            .arg("activate")
            .assert()
            .failure()
            .stderr(predicate::str::contains("is not installed"));
    }

    #[test]
    fn status_reports_missing_install() {
        let temp = TempDir::new().unwrap();
        with_config(&temp)
            .arg("status")
            .assert()
            .success()
            .stdout(predicate::str::contains("not installed"));
    }
}

mod offline_tests {
    use super::cli_tests::{caches_dir, with_config};
    use predicates::prelude::*;
    use swcache::http::{RequestKey, Response};
    use swcache::storage::{CacheStorage, CachedEntry, DiskStorage};
    use tempfile::TempDir;

    const CURRENT: &str = "7fdesign-v1";

    async fn seed(temp: &TempDir, bucket: &str, path: &str, body: &str) {
        let storage = DiskStorage::new(caches_dir(temp.path()));
        let url = format!("http://localhost:8080{}", path);
        let response = Response::new(200)
            .with_header("content-type", "text/html")
            .with_body(body.as_bytes().to_vec())
            .with_url(url.as_str());
        storage
            .put(bucket, CachedEntry::new(RequestKey::get(&url), response))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn cached_asset_is_served_offline() {
        let temp = TempDir::new().unwrap();
        seed(&temp, CURRENT, "/assets/css/style.css", "body{}").await;

        with_config(&temp)
            .args([
                "fetch",
                "http://localhost:8080/assets/css/style.css",
                "--offline",
                "--body",
            ])
            .assert()
            .success()
            .stdout("body{}")
            .stderr(predicate::str::contains("cache"));
    }

    #[tokio::test]
    async fn offline_navigation_without_fallback_fails() {
        let temp = TempDir::new().unwrap();
        seed(&temp, CURRENT, "/assets/css/style.css", "body{}").await;

        with_config(&temp)
            .args(["fetch", "http://localhost:8080/about", "--navigate", "--offline"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Offline fallback exhausted"));
    }

    #[tokio::test]
    async fn offline_navigation_serves_offline_page() {
        let temp = TempDir::new().unwrap();
        seed(&temp, CURRENT, "/offline.html", "<h1>You are offline</h1>").await;
        seed(&temp, CURRENT, "/index.html", "<h1>Home</h1>").await;

        with_config(&temp)
            .args([
                "fetch",
                "http://localhost:8080/about",
                "--navigate",
                "--offline",
                "--body",
            ])
            .assert()
            .success()
            .stdout("<h1>You are offline</h1>")
            .stderr(predicate::str::contains("fallback"));
    }

    #[tokio::test]
    async fn cross_origin_fetch_passes_through() {
        let temp = TempDir::new().unwrap();
        seed(&temp, CURRENT, "/index.html", "<h1>Home</h1>").await;

        with_config(&temp)
            .args(["fetch", "https://cdn.example.net/lib.js", "--offline"])
            .assert()
            .success()
            .stderr(predicate::str::contains("not intercepted"));
    }

    #[tokio::test]
    async fn activate_purges_stale_buckets() {
        let temp = TempDir::new().unwrap();
        seed(&temp, "7fdesign-v0", "/index.html", "old").await;
        seed(&temp, CURRENT, "/index.html", "new").await;

        with_config(&temp)
            .arg("activate")
            .assert()
            .success()
            .stdout(predicate::str::contains("7fdesign-v0"));

        with_config(&temp)
            .args(["cache", "list", "--format", "plain"])
            .assert()
            .success()
            .stdout(format!("{}\n", CURRENT));
    }

    #[tokio::test]
    async fn cache_show_lists_entries() {
        let temp = TempDir::new().unwrap();
        seed(&temp, CURRENT, "/index.html", "<h1>Home</h1>").await;

        with_config(&temp)
            .args(["cache", "show", CURRENT])
            .assert()
            .success()
            .stdout(predicate::str::contains("http://localhost:8080/index.html"))
            .stdout(predicate::str::contains("GET"));
    }

    #[tokio::test]
    async fn cache_clear_requires_confirmation() {
        let temp = TempDir::new().unwrap();
        seed(&temp, CURRENT, "/index.html", "<h1>Home</h1>").await;

        with_config(&temp)
            .args(["cache", "clear"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Aborted"));

        with_config(&temp)
            .args(["cache", "clear", "--yes"])
            .assert()
            .success();

        with_config(&temp)
            .args(["cache", "list"])
            .assert()
            .success()
            .stdout(predicate::str::contains("No cache buckets found"));
    }
}
