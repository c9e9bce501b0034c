//! Integration tests for the crawler
//!
//! The stub-fetcher tests drive whole runs through the public entry points
//! against canned pages. The wiremock tests exercise the real HTTP fetcher
//! end-to-end.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use trawl::config::Config;
use trawl::crawler::{
    generate_links, generate_links_with, scrape, scrape_with, FetchError, FetchedPage, Fetcher,
    RunOptions,
};
use trawl::output::{read_link_list, read_records};
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Serves canned pages and logs every request; unknown URLs answer 404
#[derive(Clone, Default)]
struct StubFetcher {
    pages: Arc<HashMap<String, String>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl StubFetcher {
    fn new(pages: &[(&str, &str)]) -> Self {
        Self {
            pages: Arc::new(
                pages
                    .iter()
                    .map(|(url, body)| (url.to_string(), body.to_string()))
                    .collect(),
            ),
            calls: Arc::default(),
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn times_fetched(&self, url: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == url).count()
    }
}

impl Fetcher for StubFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        self.calls.lock().unwrap().push(url.to_string());
        match self.pages.get(url.as_str()) {
            Some(body) => Ok(FetchedPage {
                final_url: url.clone(),
                body: body.clone(),
            }),
            None => Err(FetchError::Status {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}

/// Creates a test configuration writing its artifacts under `dir`
fn create_test_config(start_url: &str, max_depth: u32, dir: &Path) -> Config {
    let mut config = Config::new(start_url, max_depth);
    config.max_concurrent = 3;
    config.links_file = Some(dir.join("links.txt"));
    config.output_file = Some(dir.join("scraped.json"));
    config
}

fn links_in(config: &Config) -> Vec<String> {
    read_link_list(config.links_file().unwrap()).unwrap()
}

fn record_urls(config: &Config) -> Vec<String> {
    read_records(config.output_file().unwrap())
        .unwrap()
        .into_iter()
        .map(|r| r.url)
        .collect()
}

#[tokio::test]
async fn test_depth_zero_lists_only_start() {
    let dir = TempDir::new().unwrap();
    let config = create_test_config("http://ex.test/a", 0, dir.path());
    let fetcher = StubFetcher::new(&[("http://ex.test/a", "<html><body>No links</body></html>")]);

    let stats = generate_links_with(&config, fetcher.clone(), RunOptions::default())
        .await
        .unwrap();

    assert_eq!(links_in(&config), vec!["http://ex.test/a"]);
    assert_eq!(stats.output_entries, 1);
    assert_eq!(fetcher.calls(), vec!["http://ex.test/a"]);
}

#[tokio::test]
async fn test_fragment_links_fetched_once() {
    let dir = TempDir::new().unwrap();
    let config = create_test_config("http://ex.test/a", 2, dir.path());
    let fetcher = StubFetcher::new(&[
        (
            "http://ex.test/a",
            r##"<a href="http://ex.test/a/b#frag1">One</a>
                <a href="http://ex.test/a/b#frag2">Two</a>"##,
        ),
        ("http://ex.test/a/b", r##"<a href="#top">Top</a>"##),
    ]);

    generate_links_with(&config, fetcher.clone(), RunOptions::default())
        .await
        .unwrap();

    assert_eq!(fetcher.times_fetched("http://ex.test/a/b"), 1);
    assert_eq!(links_in(&config), vec!["http://ex.test/a", "http://ex.test/a/b"]);
}

#[tokio::test]
async fn test_other_authority_never_enqueued() {
    let dir = TempDir::new().unwrap();
    let config = create_test_config("http://ex.test/a", 2, dir.path());
    let fetcher = StubFetcher::new(&[(
        "http://ex.test/a",
        r#"<a href="http://other.test/x">Elsewhere</a>
           <a href="https://ex.test/a/secure">Other scheme</a>
           <a href="/b">Outside prefix</a>"#,
    )]);

    generate_links_with(&config, fetcher.clone(), RunOptions::default())
        .await
        .unwrap();

    assert_eq!(fetcher.calls(), vec!["http://ex.test/a"]);
    assert_eq!(links_in(&config), vec!["http://ex.test/a"]);
}

#[tokio::test]
async fn test_failed_fetch_does_not_abort_scrape() {
    let dir = TempDir::new().unwrap();
    let config = create_test_config("http://ex.test/a", 1, dir.path());
    let fetcher = StubFetcher::new(&[
        (
            "http://ex.test/a",
            r#"<main><a href="/a/1">1</a><a href="/a/2">2</a><a href="/a/3">3</a></main>"#,
        ),
        ("http://ex.test/a/1", "<main><p>First page</p></main>"),
        ("http://ex.test/a/3", "<main><p>Third page</p></main>"),
    ]);

    let stats = scrape_with(&config, fetcher.clone(), RunOptions::default())
        .await
        .unwrap();

    assert_eq!(stats.dispatched, 4);
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.batches, 2);
    assert_eq!(fetcher.times_fetched("http://ex.test/a/2"), 1);

    let mut urls = record_urls(&config);
    urls.sort();
    assert_eq!(
        urls,
        vec!["http://ex.test/a", "http://ex.test/a/1", "http://ex.test/a/3"]
    );

    let records = read_records(config.output_file().unwrap()).unwrap();
    let third = records.iter().find(|r| r.url == "http://ex.test/a/3").unwrap();
    assert_eq!(third.content, "Third page");
}

#[tokio::test]
async fn test_link_generation_resume_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let config = create_test_config("http://ex.test/a", 2, dir.path());
    let pages = [
        ("http://ex.test/a", r#"<a href="/a/x">X</a><a href="/a/y">Y</a>"#),
        ("http://ex.test/a/x", r#"<a href="/a/y/z">Z</a>"#),
        ("http://ex.test/a/y", ""),
        ("http://ex.test/a/y/z", ""),
    ];

    generate_links_with(&config, StubFetcher::new(&pages), RunOptions::default())
        .await
        .unwrap();
    let first = fs::read_to_string(config.links_file().unwrap()).unwrap();

    let second_fetcher = StubFetcher::new(&pages);
    let stats = generate_links_with(&config, second_fetcher.clone(), RunOptions::default())
        .await
        .unwrap();
    let second = fs::read_to_string(config.links_file().unwrap()).unwrap();

    assert_eq!(first, second);
    assert_eq!(stats.resumed, 4);
    // Only the start page is fetched again; everything it links to is known
    assert_eq!(second_fetcher.calls(), vec!["http://ex.test/a"]);
}

#[tokio::test]
async fn test_fresh_run_ignores_existing_links() {
    let dir = TempDir::new().unwrap();
    let config = create_test_config("http://ex.test/a", 0, dir.path());
    fs::write(config.links_file().unwrap(), "http://ex.test/a/stale\n").unwrap();

    let options = RunOptions {
        fresh: true,
        ..RunOptions::default()
    };
    generate_links_with(&config, StubFetcher::new(&[("http://ex.test/a", "")]), options)
        .await
        .unwrap();

    assert_eq!(links_in(&config), vec!["http://ex.test/a"]);
}

#[tokio::test]
async fn test_scrape_resume_skips_recorded_pages() {
    let dir = TempDir::new().unwrap();
    let config = create_test_config("http://ex.test/a", 1, dir.path());
    fs::write(
        config.output_file().unwrap(),
        r#"[{"URL": "http://ex.test/a/1", "content": "from last run"},
            {"URL": "http://ex.test/a", "content": "root"}]"#,
    )
    .unwrap();

    let fetcher = StubFetcher::new(&[
        ("http://ex.test/a", r#"<a href="/a/1">1</a><a href="/a/2">2</a>"#),
        ("http://ex.test/a/1", "<p>changed</p>"),
        ("http://ex.test/a/2", "<p>Second</p>"),
    ]);

    scrape_with(&config, fetcher.clone(), RunOptions::default())
        .await
        .unwrap();

    // The root is re-read for links but not recorded twice
    assert_eq!(fetcher.times_fetched("http://ex.test/a"), 1);
    assert_eq!(fetcher.times_fetched("http://ex.test/a/1"), 0);

    let records = read_records(config.output_file().unwrap()).unwrap();
    let urls: Vec<&str> = records.iter().map(|r| r.url.as_str()).collect();
    assert_eq!(urls, vec!["http://ex.test/a/1", "http://ex.test/a", "http://ex.test/a/2"]);
    assert_eq!(records[0].content, "from last run");
}

#[tokio::test]
async fn test_replay_scrapes_listed_urls_only() {
    let dir = TempDir::new().unwrap();
    let mut config = create_test_config("http://ex.test/a", 3, dir.path());
    config.use_generated_links = true;
    fs::write(
        config.links_file().unwrap(),
        "http://ex.test/a\n\nnot a url\nhttp://ex.test/a/b#section\n",
    )
    .unwrap();

    let fetcher = StubFetcher::new(&[
        ("http://ex.test/a", r#"<a href="/a/c">Never followed</a><p>Start</p>"#),
        ("http://ex.test/a/b", "<p>Bee</p>"),
        ("http://ex.test/a/c", "<p>Sea</p>"),
    ]);

    let stats = scrape_with(&config, fetcher.clone(), RunOptions::default())
        .await
        .unwrap();

    let mut calls = fetcher.calls();
    calls.sort();
    assert_eq!(calls, vec!["http://ex.test/a", "http://ex.test/a/b"]);
    assert_eq!(stats.links_queued, 0);

    let mut urls = record_urls(&config);
    urls.sort();
    assert_eq!(urls, vec!["http://ex.test/a", "http://ex.test/a/b"]);
}

#[tokio::test]
async fn test_replay_without_links_file_fails() {
    let dir = TempDir::new().unwrap();
    let mut config = create_test_config("http://ex.test/a", 1, dir.path());
    config.use_generated_links = true;

    let result = scrape_with(&config, StubFetcher::default(), RunOptions::default()).await;

    assert!(result.is_err());
    assert!(!config.output_file().unwrap().exists());
}

#[tokio::test]
async fn test_cancelled_before_start_writes_valid_artifact() {
    let dir = TempDir::new().unwrap();
    let config = create_test_config("http://ex.test/a", 1, dir.path());
    let options = RunOptions::default();
    options.cancel.cancel();

    let fetcher = StubFetcher::new(&[("http://ex.test/a", "<p>Start</p>")]);
    let stats = scrape_with(&config, fetcher.clone(), options).await.unwrap();

    assert!(stats.cancelled);
    assert!(fetcher.calls().is_empty());
    assert!(record_urls(&config).is_empty());
}

#[tokio::test]
async fn test_full_crawl_against_mock_server() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/docs/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(format!(
                    r#"<html><head><title>Docs</title></head><body>
                    <header>Site header</header>
                    <main><h1>Docs home</h1>
                    <a href="guide">Guide</a>
                    <a href="{}/docs/api#intro">API</a>
                    <a href="/blog/">Blog</a>
                    <a href="http://other.test/docs/">Mirror</a>
                    </main></body></html>"#,
                    base_url
                ))
                .insert_header("content-type", "text/html"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/docs/guide"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(
                    r#"<html><body><main><p>Install the tool.</p>
                    <a href="/docs/guide/advanced">Advanced</a></main></body></html>"#,
                )
                .insert_header("content-type", "text/html"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/docs/api"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    // Beyond max depth and out of scope respectively
    Mock::given(method("GET"))
        .and(path("/docs/guide/advanced"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/blog/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&format!("{}/docs/", base_url), 1, dir.path());

    let stats = scrape(&config, RunOptions::default()).await.unwrap();

    assert_eq!(stats.fetched, 2);
    assert_eq!(stats.failed, 1);

    let records = read_records(config.output_file().unwrap()).unwrap();
    assert_eq!(records.len(), 2);

    let home = records
        .iter()
        .find(|r| r.url == format!("{}/docs/", base_url))
        .unwrap();
    assert!(home.content.contains("Docs home"));
    assert!(!home.content.contains("Site header"));

    let guide = records
        .iter()
        .find(|r| r.url == format!("{}/docs/guide", base_url))
        .unwrap();
    assert!(guide.content.contains("Install the tool."));
}

#[tokio::test]
async fn test_link_generation_against_mock_server() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"<a href="/b">B</a><a href="/a">A</a><a href="/missing">M</a>"#),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"<a href="/">Home</a>"#))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/b"))
        .respond_with(ResponseTemplate::new(200).set_body_string(""))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&base_url, 3, dir.path());

    let stats = generate_links(&config, RunOptions::default()).await.unwrap();

    // Failed URLs are still listed in link-generation mode
    assert_eq!(
        links_in(&config),
        vec![
            format!("{}/", base_url),
            format!("{}/a", base_url),
            format!("{}/b", base_url),
            format!("{}/missing", base_url),
        ]
    );
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.dispatched, 4);
}

#[tokio::test]
async fn test_redirect_recorded_once_under_final_url() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"<a href="/old">Old</a><a href="/new">New</a>"#),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/new"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<main><p>New page</p></main>"))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&base_url, 1, dir.path());

    let stats = scrape(&config, RunOptions::default()).await.unwrap();

    let records = read_records(config.output_file().unwrap()).unwrap();
    let mut urls: Vec<String> = records.iter().map(|r| r.url.clone()).collect();
    urls.sort();
    assert_eq!(urls, vec![format!("{}/", base_url), format!("{}/new", base_url)]);
    assert_eq!(
        records.iter().filter(|r| r.content == "New page").count(),
        1
    );
    assert_eq!(stats.redirects_collapsed, 1);
}
