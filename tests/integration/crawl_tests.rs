//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and run the full
//! crawl and audit cycle end-to-end against a temporary output folder.

use std::collections::HashSet;
use stylesift::audit::{run_audit, FileType};
use stylesift::config::{Config, CrawlerConfig, OutputConfig};
use stylesift::crawler::crawl;
use stylesift::{CrawlSummary, ResourceKind, SiftError};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration writing under `root`
fn create_test_config(root: &TempDir) -> Config {
    Config {
        crawler: CrawlerConfig {
            max_concurrent_fetches: 4,
            fetch_timeout_secs: 5,
            ..CrawlerConfig::default()
        },
        output: OutputConfig {
            root_dir: root.path().display().to_string(),
            report_path: None,
        },
        ..Config::default()
    }
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(format!("<html><head></head><body>{}</body></html>", body))
        .insert_header("content-type", "text/html")
}

fn html_with_head(head: &str, body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(format!(
            "<html><head>{}</head><body>{}</body></html>",
            head, body
        ))
        .insert_header("content-type", "text/html")
}

fn css(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/css")
}

async fn mount(server: &MockServer, route: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(response)
        .mount(server)
        .await;
}

/// Paths of the records in a summary, relative to the server
fn record_paths(summary: &CrawlSummary) -> HashSet<String> {
    summary
        .records
        .iter()
        .map(|record| record.url.path().to_string())
        .collect()
}

fn saved_count(summary: &CrawlSummary, kind: ResourceKind) -> usize {
    summary
        .records
        .iter()
        .filter(|record| record.kind == kind && record.is_saved())
        .count()
}

#[tokio::test]
async fn test_full_crawl_dispatches_only_accepted_links() {
    let mock_server = MockServer::start().await;
    let root = TempDir::new().unwrap();

    mount(
        &mock_server,
        "/",
        html_with_head(
            r#"<link rel="stylesheet" href="/s.css">"#,
            r##"<a href="/about">About</a>
                <a href="https://other.com/">Elsewhere</a>
                <a href="#top">Top</a>"##,
        ),
    )
    .await;
    mount(&mock_server, "/about", html("<p>About us</p>")).await;
    mount(&mock_server, "/s.css", css("body { display: flex; }")).await;

    let config = create_test_config(&root);
    let seed = format!("{}/", mock_server.uri());
    let summary = crawl(&config, &seed).await.unwrap();

    // The seed plus exactly two discovered tasks
    assert_eq!(summary.dispatched, 3);
    assert_eq!(summary.records.len(), 3);
    assert!(summary.records.iter().all(|record| record.is_saved()));

    let paths = record_paths(&summary);
    assert!(paths.contains("/"));
    assert!(paths.contains("/about"));
    assert!(paths.contains("/s.css"));

    assert_eq!(saved_count(&summary, ResourceKind::Page), 2);
    assert_eq!(saved_count(&summary, ResourceKind::Stylesheet), 1);

    assert!(summary.destination.starts_with(root.path()));
    assert!(summary.destination.is_dir());
    for record in &summary.records {
        let saved = record.path().unwrap();
        assert!(saved.exists(), "missing file {}", saved.display());
    }
}

#[tokio::test]
async fn test_url_variants_are_fetched_once() {
    let mock_server = MockServer::start().await;
    let root = TempDir::new().unwrap();

    mount(
        &mock_server,
        "/",
        html(
            r#"<a href="/docs">Docs</a>
               <a href="/docs/">Docs again</a>
               <a href="/docs#intro">Intro</a>
               <a href="/">Home</a>"#,
        ),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/docs"))
        .respond_with(html(r#"<a href="/">Back home</a><a href="/docs/#end">End</a>"#))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&root);
    let summary = crawl(&config, &format!("{}/", mock_server.uri()))
        .await
        .unwrap();

    assert_eq!(summary.dispatched, 2);
    assert_eq!(summary.records.len(), 2);
    mock_server.verify().await;
}

#[tokio::test]
async fn test_chain_completes_before_crawl_returns() {
    let mock_server = MockServer::start().await;
    let root = TempDir::new().unwrap();

    mount(&mock_server, "/", html(r#"<a href="/b">B</a>"#)).await;
    mount(&mock_server, "/b", html(r#"<a href="/c">C</a>"#)).await;
    mount(
        &mock_server,
        "/c",
        html_with_head(r#"<link rel="stylesheet" href="/c.css">"#, "<p>end</p>"),
    )
    .await;
    mount(&mock_server, "/c.css", css("p { color: red; }")).await;

    let config = create_test_config(&root);
    let summary = crawl(&config, &format!("{}/", mock_server.uri()))
        .await
        .unwrap();

    // Every link in the chain settled before the summary was produced
    let paths = record_paths(&summary);
    for expected in ["/", "/b", "/c", "/c.css"] {
        assert!(paths.contains(expected), "missing record for {}", expected);
    }
    assert_eq!(summary.records.len(), 4);

    let files = std::fs::read_dir(&summary.destination).unwrap().count();
    assert_eq!(files, 4);
}

#[tokio::test]
async fn test_same_named_stylesheets_get_unique_files() {
    let mock_server = MockServer::start().await;
    let root = TempDir::new().unwrap();

    mount(
        &mock_server,
        "/",
        html_with_head(
            r#"<link rel="stylesheet" href="/one/style.css">
               <link rel="stylesheet" href="/two/style.css">"#,
            "",
        ),
    )
    .await;
    mount(&mock_server, "/one/style.css", css("a { color: blue; }")).await;
    mount(&mock_server, "/two/style.css", css("b { color: green; }")).await;

    let config = create_test_config(&root);
    let summary = crawl(&config, &format!("{}/", mock_server.uri()))
        .await
        .unwrap();

    let stylesheet_files: Vec<_> = summary
        .records
        .iter()
        .filter(|record| record.kind == ResourceKind::Stylesheet)
        .filter_map(|record| record.path().cloned())
        .collect();

    assert_eq!(stylesheet_files.len(), 2);
    assert_ne!(stylesheet_files[0], stylesheet_files[1]);
    for file in &stylesheet_files {
        let name = file.file_name().unwrap().to_string_lossy();
        assert!(name.ends_with("_style.css"), "unexpected name {}", name);
    }

    let mut contents: Vec<String> = stylesheet_files
        .iter()
        .map(|file| std::fs::read_to_string(file).unwrap())
        .collect();
    contents.sort();
    assert_eq!(contents, vec!["a { color: blue; }", "b { color: green; }"]);
}

#[tokio::test]
async fn test_failing_page_does_not_affect_siblings() {
    let mock_server = MockServer::start().await;
    let root = TempDir::new().unwrap();

    mount(
        &mock_server,
        "/",
        html(r#"<a href="/broken">Broken</a><a href="/ok">Ok</a>"#),
    )
    .await;
    mount(&mock_server, "/broken", ResponseTemplate::new(500)).await;
    mount(
        &mock_server,
        "/ok",
        html_with_head(r#"<link rel="stylesheet" href="/ok.css">"#, ""),
    )
    .await;
    mount(&mock_server, "/ok.css", css("main { gap: 1rem; }")).await;

    let config = create_test_config(&root);
    let summary = crawl(&config, &format!("{}/", mock_server.uri()))
        .await
        .unwrap();

    assert_eq!(summary.records.len(), 4);

    let broken = summary
        .records
        .iter()
        .find(|record| record.url.path() == "/broken")
        .unwrap();
    assert!(!broken.is_saved());
    assert_eq!(broken.referrer.as_ref(), Some(&summary.start_url));

    let ok_css = summary
        .records
        .iter()
        .find(|record| record.url.path() == "/ok.css")
        .unwrap();
    assert!(ok_css.is_saved());

    // No partial file is left for the failed page
    let files = std::fs::read_dir(&summary.destination).unwrap().count();
    assert_eq!(files, 3);
}

#[tokio::test]
async fn test_crawl_stays_within_seed_origin() {
    let mock_server = MockServer::start().await;
    let other_server = MockServer::start().await;
    let root = TempDir::new().unwrap();

    mount(
        &mock_server,
        "/",
        html(&format!(
            r#"<a href="{}/page">Other origin</a><a href="/local">Local</a>"#,
            other_server.uri()
        )),
    )
    .await;
    mount(&mock_server, "/local", html("<p>local</p>")).await;

    Mock::given(method("GET"))
        .respond_with(html("<p>should not be fetched</p>"))
        .expect(0)
        .mount(&other_server)
        .await;

    let config = create_test_config(&root);
    let summary = crawl(&config, &format!("{}/", mock_server.uri()))
        .await
        .unwrap();

    assert_eq!(summary.records.len(), 2);
    let paths = record_paths(&summary);
    assert!(paths.contains("/local"));
    assert!(!paths.contains("/page"));
    other_server.verify().await;
}

#[tokio::test]
async fn test_skipped_extensions_are_never_fetched() {
    let mock_server = MockServer::start().await;
    let root = TempDir::new().unwrap();

    mount(
        &mock_server,
        "/",
        html(r#"<a href="/report.PDF">Report</a><a href="/photo.jpg">Photo</a>"#),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/report.PDF"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; 16]))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&root);
    let summary = crawl(&config, &format!("{}/", mock_server.uri()))
        .await
        .unwrap();

    assert_eq!(summary.dispatched, 1);
    assert_eq!(summary.records.len(), 1);
    mock_server.verify().await;
}

#[tokio::test]
async fn test_seed_failure_produces_empty_crawl() {
    let mock_server = MockServer::start().await;
    let root = TempDir::new().unwrap();

    mount(&mock_server, "/", ResponseTemplate::new(404)).await;

    let config = create_test_config(&root);
    let summary = crawl(&config, &format!("{}/", mock_server.uri()))
        .await
        .unwrap();

    assert_eq!(summary.records.len(), 1);
    assert!(!summary.records[0].is_saved());

    let report = run_audit(&summary.destination).unwrap();
    assert!(report.is_empty());
}

#[tokio::test]
async fn test_malformed_seed_is_rejected() {
    let root = TempDir::new().unwrap();
    let config = create_test_config(&root);

    for seed in ["not a url", "ftp://example.com/", "mailto:someone@example.com"] {
        let result = crawl(&config, seed).await;
        assert!(
            matches!(result, Err(SiftError::Seed(_))),
            "seed {} should be rejected",
            seed
        );
    }

    // Nothing was created for a rejected seed
    assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_audit_after_crawl() {
    let mock_server = MockServer::start().await;
    let root = TempDir::new().unwrap();

    mount(
        &mock_server,
        "/",
        html_with_head(
            r#"<meta name="viewport" content="width=device-width">
               <link rel="stylesheet" href="/layout.css">"#,
            "<main><nav>menu</nav></main>",
        ),
    )
    .await;
    mount(
        &mock_server,
        "/layout.css",
        css(".grid {\n  display: grid;\n}\n@media (max-width: 600px) {\n  .grid { display: block; }\n}\n"),
    )
    .await;

    let config = create_test_config(&root);
    let summary = crawl(&config, &format!("{}/", mock_server.uri()))
        .await
        .unwrap();
    let report = run_audit(&summary.destination).unwrap();

    assert_eq!(report.files_of(FileType::Css).count(), 1);
    assert_eq!(report.files_of(FileType::Html).count(), 1);

    assert_eq!(report.total(FileType::Css, "CSS Grid").unwrap().files, 1);
    assert_eq!(report.total(FileType::Css, "Flexbox").unwrap().files, 0);
    assert_eq!(report.total(FileType::Html, "<main>").unwrap().files, 1);
    assert_eq!(report.total(FileType::Html, "Viewport meta").unwrap().files, 1);

    assert_eq!(report.media_queries.len(), 1);
    assert_eq!(report.media_queries[0].line_number, 4);
    assert_eq!(report.media_queries[0].text, "@media (max-width: 600px) {");
}

/// Paths the mock server actually received
async fn requested_paths(server: &MockServer) -> HashSet<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|request| request.url.path().to_string())
        .collect()
}

#[tokio::test]
async fn test_directory_page_resolves_relative_links() {
    let mock_server = MockServer::start().await;
    let root = TempDir::new().unwrap();

    mount(&mock_server, "/", html(r#"<a href="/docs/">Docs</a>"#)).await;
    mount(
        &mock_server,
        "/docs/",
        html_with_head(
            r#"<link rel="stylesheet" href="docs.css">"#,
            r#"<a href="intro">Intro</a><a href="../">Up</a>"#,
        ),
    )
    .await;
    mount(&mock_server, "/docs/intro", html("<p>intro</p>")).await;
    mount(&mock_server, "/docs/docs.css", css("h1 { color: navy; }")).await;

    let config = create_test_config(&root);
    let summary = crawl(&config, &format!("{}/", mock_server.uri()))
        .await
        .unwrap();

    let requested = requested_paths(&mock_server).await;
    for expected in ["/", "/docs/", "/docs/intro", "/docs/docs.css"] {
        assert!(requested.contains(expected), "{} was not requested", expected);
    }
    assert!(!requested.contains("/docs"));
    assert!(!requested.contains("/intro"));

    assert_eq!(summary.records.len(), 4);
    assert!(summary.records.iter().all(|record| record.is_saved()));
}

#[tokio::test]
async fn test_seed_with_trailing_slash_is_requested_as_written() {
    let mock_server = MockServer::start().await;
    let root = TempDir::new().unwrap();

    mount(
        &mock_server,
        "/guide/",
        html(r#"<a href="setup">Setup</a><a href="/guide">Same page</a>"#),
    )
    .await;
    mount(&mock_server, "/guide/setup", html("<p>setup</p>")).await;

    let config = create_test_config(&root);
    let summary = crawl(&config, &format!("{}/guide/", mock_server.uri()))
        .await
        .unwrap();

    assert_eq!(summary.start_url.path(), "/guide/");
    assert_eq!(summary.dispatched, 2);
    assert!(summary.records.iter().all(|record| record.is_saved()));

    let paths = record_paths(&summary);
    assert!(paths.contains("/guide/"));
    assert!(paths.contains("/guide/setup"));
}

#[tokio::test]
async fn test_redirected_page_resolves_links_against_target() {
    let mock_server = MockServer::start().await;
    let root = TempDir::new().unwrap();

    mount(&mock_server, "/", html(r#"<a href="/old">Old</a>"#)).await;
    mount(
        &mock_server,
        "/old",
        ResponseTemplate::new(301).insert_header("Location", "/new/"),
    )
    .await;
    mount(
        &mock_server,
        "/new/",
        html(r#"<a href="child">Child</a><a href="/new/">Self</a>"#),
    )
    .await;
    mount(&mock_server, "/new/child", html("<p>child</p>")).await;

    let config = create_test_config(&root);
    let summary = crawl(&config, &format!("{}/", mock_server.uri()))
        .await
        .unwrap();

    let old = summary
        .records
        .iter()
        .find(|record| record.url.path() == "/old")
        .unwrap();
    assert!(old.is_saved());
    assert_eq!(old.final_url.path(), "/new/");

    // The redirect target counts as visited, so only /old fetched it
    assert_eq!(summary.dispatched, 3);
    let paths = record_paths(&summary);
    assert!(paths.contains("/new/child"));
    assert!(!requested_paths(&mock_server).await.contains("/child"));
}

#[tokio::test]
async fn test_redirect_to_other_origin_is_not_followed() {
    let mock_server = MockServer::start().await;
    let other_server = MockServer::start().await;
    let root = TempDir::new().unwrap();

    mount(&mock_server, "/", html(r#"<a href="/away">Away</a>"#)).await;
    mount(
        &mock_server,
        "/away",
        ResponseTemplate::new(302)
            .insert_header("Location", format!("{}/landing", other_server.uri()).as_str()),
    )
    .await;
    mount(&other_server, "/landing", html(r#"<a href="/deeper">Deeper</a>"#)).await;

    Mock::given(method("GET"))
        .and(path("/deeper"))
        .respond_with(html("<p>should not be fetched</p>"))
        .expect(0)
        .mount(&other_server)
        .await;

    let config = create_test_config(&root);
    let summary = crawl(&config, &format!("{}/", mock_server.uri()))
        .await
        .unwrap();

    let away = summary
        .records
        .iter()
        .find(|record| record.url.path() == "/away")
        .unwrap();
    assert!(!away.is_saved());
    assert_eq!(away.final_url.path(), "/landing");

    // Only the seed page is left on disk
    assert_eq!(std::fs::read_dir(&summary.destination).unwrap().count(), 1);
    other_server.verify().await;
}
