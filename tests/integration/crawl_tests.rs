//! Integration tests for the crawler
//!
//! Most tests drive the crawl with in-memory renderers so page graphs of any
//! shape can be generated. The end-to-end tests use wiremock to serve real
//! pages and images over HTTP.

use async_trait::async_trait;
use pagescribe::config::{RendererBackend, RendererConfig};
use pagescribe::crawler::{
    CancelFlag, CrawlEvent, CrawlRequest, CrawlTask, Crawler, EventSink, HttpRenderer,
    ImageTextCollector, Ocr, OcrError, RenderError, Renderer,
};
use pagescribe::{OutputWriter, StopReason};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Builds a page with a title, paragraphs and links
fn page(title: &str, paragraphs: &[&str], links: &[String]) -> String {
    let paragraphs: String = paragraphs.iter().map(|p| format!("<p>{}</p>", p)).collect();
    let links: String = links
        .iter()
        .map(|href| format!(r#"<a href="{}">link</a>"#, href))
        .collect();
    format!(
        "<html><head><title>{}</title></head><body>{}{}</body></html>",
        title, paragraphs, links
    )
}

/// Returns `(file name, contents)` for every saved file, sorted by name
fn saved_files(dir: &Path) -> Vec<(String, String)> {
    let mut files: Vec<(String, String)> = std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .map(|entry| {
                    let entry = entry.unwrap();
                    (
                        entry.file_name().to_string_lossy().into_owned(),
                        std::fs::read_to_string(entry.path()).unwrap(),
                    )
                })
                .collect()
        })
        .unwrap_or_default();
    files.sort();
    files
}

/// Serves a fixed set of pages and records every render call
#[derive(Default)]
struct MapRenderer {
    pages: HashMap<String, String>,
    calls: Mutex<Vec<String>>,

    /// Cancelled as soon as any page is rendered
    cancel_on_render: Mutex<Option<CancelFlag>>,
}

impl MapRenderer {
    fn with_page(mut self, url: &str, html: String) -> Self {
        self.pages.insert(url.to_string(), html);
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Renderer for MapRenderer {
    async fn render(&self, url: &str) -> Result<String, RenderError> {
        self.calls.lock().unwrap().push(url.to_string());
        if let Some(flag) = self.cancel_on_render.lock().unwrap().as_ref() {
            flag.cancel();
        }
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| RenderError::Navigation(format!("net::ERR_NAME_NOT_RESOLVED at {}", url)))
    }
}

/// Generates a page for any URL, each linking to `fan_out` children
struct FanOutRenderer {
    fan_out: usize,
    calls: Mutex<usize>,
}

impl FanOutRenderer {
    fn new(fan_out: usize) -> Self {
        Self {
            fan_out,
            calls: Mutex::new(0),
        }
    }
}

#[async_trait]
impl Renderer for FanOutRenderer {
    async fn render(&self, url: &str) -> Result<String, RenderError> {
        *self.calls.lock().unwrap() += 1;
        let children: Vec<String> = (0..self.fan_out).map(|i| format!("{}/{}", url, i)).collect();
        let title = url.trim_start_matches("https://fan.test/");
        Ok(page(title, &["generated"], &children))
    }
}

/// Treats image bytes as the recognized text
struct Utf8Ocr;

#[async_trait]
impl Ocr for Utf8Ocr {
    async fn recognize(&self, image: &[u8]) -> Result<String, OcrError> {
        Ok(String::from_utf8_lossy(image).into_owned())
    }
}

async fn run(crawler: &Crawler, request: CrawlRequest) -> pagescribe::CrawlOutcome {
    crawler
        .run(&request, &EventSink::disabled(), &CancelFlag::new())
        .await
        .expect("crawl should succeed")
}

#[tokio::test]
async fn test_depth_bounds_levels() {
    let mut renderer = MapRenderer::default();
    for n in 0..10 {
        renderer = renderer.with_page(
            &format!("https://chain.test/{}", n),
            page(
                &format!("Chain {}", n),
                &["link in a chain"],
                &[format!("https://chain.test/{}", n + 1)],
            ),
        );
    }
    let renderer = Arc::new(renderer);
    let dir = TempDir::new().unwrap();
    let crawler = Crawler::new(renderer.clone(), OutputWriter::new(dir.path()));

    let outcome = run(
        &crawler,
        CrawlRequest::new("https://chain.test/0").with_depth(3),
    )
    .await;

    assert_eq!(outcome.files_written, 3);
    assert_eq!(outcome.levels_completed, 3);
    assert_eq!(outcome.stop_reason, StopReason::DepthReached);
    assert_eq!(
        renderer.calls(),
        vec![
            "https://chain.test/0",
            "https://chain.test/1",
            "https://chain.test/2"
        ]
    );

    let names: Vec<String> = saved_files(dir.path()).into_iter().map(|(n, _)| n).collect();
    assert_eq!(names.len(), 3);
    assert!(names[0].starts_with("Chain 0_"));
    assert!(names[2].starts_with("Chain 2_"));
}

#[tokio::test]
async fn test_page_ceiling_stops_wide_crawl() {
    let renderer = Arc::new(FanOutRenderer::new(10));
    let dir = TempDir::new().unwrap();
    let crawler = Crawler::new(renderer.clone(), OutputWriter::new(dir.path()));

    let outcome = run(
        &crawler,
        CrawlRequest::new("https://fan.test/root").with_depth(5),
    )
    .await;

    // 1 + 10 pages in the first two levels, then 39 more from level three
    assert_eq!(outcome.files_written, 50);
    assert_eq!(outcome.stop_reason, StopReason::PageLimit);
    assert_eq!(outcome.levels_completed, 2);
    assert_eq!(*renderer.calls.lock().unwrap(), 50);
    assert_eq!(saved_files(dir.path()).len(), 50);
}

#[tokio::test]
async fn test_page_limit_cannot_exceed_ceiling() {
    let renderer = Arc::new(FanOutRenderer::new(20));
    let dir = TempDir::new().unwrap();
    let crawler = Crawler::new(renderer, OutputWriter::new(dir.path())).with_page_limit(500);

    let outcome = run(
        &crawler,
        CrawlRequest::new("https://fan.test/root").with_depth(3),
    )
    .await;

    assert_eq!(outcome.files_written, 50);
    assert_eq!(saved_files(dir.path()).len(), 50);
}

#[tokio::test]
async fn test_lower_page_limit() {
    let renderer = Arc::new(FanOutRenderer::new(3));
    let dir = TempDir::new().unwrap();
    let crawler = Crawler::new(renderer, OutputWriter::new(dir.path())).with_page_limit(5);

    let outcome = run(
        &crawler,
        CrawlRequest::new("https://fan.test/root").with_depth(4),
    )
    .await;

    assert_eq!(outcome.files_written, 5);
    assert_eq!(outcome.stop_reason, StopReason::PageLimit);
}

#[tokio::test]
async fn test_visited_pages_are_not_rendered_again() {
    let a = "https://cycle.test/a".to_string();
    let b = "https://cycle.test/b".to_string();
    let c = "https://cycle.test/c".to_string();
    let renderer = Arc::new(
        MapRenderer::default()
            .with_page(&a, page("A", &["alpha"], &[b.clone(), c.clone(), a.clone()]))
            .with_page(&b, page("B", &["beta"], &[a.clone(), c.clone()]))
            .with_page(&c, page("C", &["gamma"], &[a.clone(), b.clone()])),
    );
    let dir = TempDir::new().unwrap();
    let crawler = Crawler::new(renderer.clone(), OutputWriter::new(dir.path()));

    let outcome = run(&crawler, CrawlRequest::new(a.clone()).with_depth(5)).await;

    assert_eq!(outcome.files_written, 3);
    assert_eq!(outcome.pages_visited, 3);
    assert_eq!(outcome.stop_reason, StopReason::FrontierExhausted);

    let calls = renderer.calls();
    assert_eq!(calls.len(), 3);
    for url in [&a, &b, &c] {
        assert_eq!(calls.iter().filter(|call| *call == url).count(), 1);
    }
}

#[tokio::test]
async fn test_long_multibyte_title_is_saved() {
    let start = "https://cjk.test/start".to_string();
    let next = "https://cjk.test/next".to_string();
    let long_title = "漢".repeat(120);
    let renderer = Arc::new(
        MapRenderer::default()
            .with_page(&start, page(&long_title, &["本文"], &[next.clone()]))
            .with_page(&next, page("Next", &["plain"], &[])),
    );
    let dir = TempDir::new().unwrap();
    let crawler = Crawler::new(renderer.clone(), OutputWriter::new(dir.path()));

    let outcome = run(&crawler, CrawlRequest::new(start.clone()).with_depth(2)).await;

    assert_eq!(outcome.files_written, 2);
    assert_eq!(renderer.calls(), vec![start.as_str(), next.as_str()]);

    let files = saved_files(dir.path());
    assert_eq!(files.len(), 2);
    let (name, text) = files
        .iter()
        .find(|(name, _)| name.starts_with('漢'))
        .expect("long-titled page should be saved");
    assert!(name.len() <= 255);
    assert!(text.starts_with(&format!("Title: {}\n", long_title)));
}

#[tokio::test]
async fn test_render_failure_skips_page() {
    let start = "https://mixed.test/".to_string();
    let good = "https://mixed.test/good".to_string();
    let broken = "https://mixed.test/broken".to_string();
    let renderer = Arc::new(
        MapRenderer::default()
            .with_page(&start, page("Start", &["hello"], &[broken.clone(), good.clone()]))
            .with_page(&good, page("Good", &["still here"], &[])),
    );
    let dir = TempDir::new().unwrap();
    let crawler = Crawler::new(renderer.clone(), OutputWriter::new(dir.path()));

    let mut handle = CrawlTask::spawn(
        Arc::new(crawler),
        CrawlRequest::new(start.clone()).with_depth(2),
    );

    let mut events = Vec::new();
    while let Some(event) = handle.next_event().await {
        events.push(event);
    }
    let outcome = handle.join().await.unwrap();

    assert_eq!(outcome.files_written, 2);
    assert_eq!(outcome.pages_visited, 3);
    assert!(events.iter().any(|event| matches!(
        event,
        CrawlEvent::PageSkipped { url, .. } if *url == broken
    )));
    assert_eq!(
        renderer.calls(),
        vec![start.as_str(), broken.as_str(), good.as_str()]
    );
}

#[tokio::test]
async fn test_task_events_in_order() {
    let start = "https://events.test/".to_string();
    let renderer = Arc::new(
        MapRenderer::default().with_page(&start, page("Only", &["single page"], &[])),
    );
    let dir = TempDir::new().unwrap();
    let crawler = Crawler::new(renderer, OutputWriter::new(dir.path()));

    let mut handle = CrawlTask::spawn(Arc::new(crawler), CrawlRequest::new(start.clone()));

    let mut events = Vec::new();
    while let Some(event) = handle.next_event().await {
        events.push(event);
    }
    let outcome = handle.join().await.unwrap();

    assert_eq!(events.len(), 3);
    assert_eq!(
        events[0],
        CrawlEvent::LevelStarted {
            level: 1,
            depth: 1,
            frontier: 1
        }
    );
    match &events[1] {
        CrawlEvent::PageSaved { url, path } => {
            assert_eq!(url, &start);
            assert!(path.starts_with(dir.path()));
            assert!(path.exists());
        }
        other => panic!("expected PageSaved, got {:?}", other),
    }
    assert_eq!(events[2], CrawlEvent::Finished(outcome));
}

#[tokio::test]
async fn test_cancel_stops_before_next_url() {
    let start = "https://cancel.test/".to_string();
    let renderer = Arc::new(
        MapRenderer::default()
            .with_page(
                &start,
                page(
                    "Start",
                    &["first"],
                    &["https://cancel.test/next".to_string()],
                ),
            )
            .with_page("https://cancel.test/next", page("Next", &["second"], &[])),
    );
    let dir = TempDir::new().unwrap();
    let crawler = Crawler::new(renderer.clone(), OutputWriter::new(dir.path()));

    let mut handle = CrawlTask::spawn(
        Arc::new(crawler),
        CrawlRequest::new(start.clone()).with_depth(3),
    );
    // The test runtime is single-threaded, so the crawl has not started yet
    *renderer.cancel_on_render.lock().unwrap() = Some(handle.cancel_flag());

    let mut events = Vec::new();
    while let Some(event) = handle.next_event().await {
        events.push(event);
    }
    let outcome = handle.join().await.unwrap();

    // The in-flight page still completes
    assert_eq!(outcome.files_written, 1);
    assert_eq!(outcome.stop_reason, StopReason::Cancelled);
    assert_eq!(renderer.calls(), vec![start.as_str()]);
    assert!(events.contains(&CrawlEvent::Cancelled));
    assert_eq!(saved_files(dir.path()).len(), 1);
}

/// Mounts an article page linking to two images and a second page
async fn mount_site(server: &MockServer) {
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/article"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(format!(
                    r#"<html><head><title>Hello, World! &lt;Test&gt;</title></head><body>
                    <p>  First   paragraph. </p>
                    <p></p>
                    <p>Second paragraph.</p>
                    <img src="/img/sign.png">
                    <img src="{}/img/blank.png">
                    <img src="/img/missing.png">
                    <a href="/second">Next</a>
                    <a href="mailto:editor@example.com">Mail</a>
                    </body></html>"#,
                    base
                ))
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/second"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(page("Second Page", &["More text."], &[]))
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/img/sign.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"  STOP AHEAD\n".to_vec()))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/img/blank.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b" \n".to_vec()))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/img/missing.png"))
        .respond_with(ResponseTemplate::new(404))
        .mount(server)
        .await;
}

fn http_crawler(dir: &TempDir) -> Crawler {
    let config = RendererConfig {
        backend: RendererBackend::Http,
        timeout_secs: 5,
        ..RendererConfig::default()
    };
    let renderer = Arc::new(HttpRenderer::new(&config).unwrap());
    Crawler::new(renderer, OutputWriter::new(dir.path().join("scraped_txt")))
        .with_image_text(ImageTextCollector::new(Arc::new(Utf8Ocr), reqwest::Client::new()))
}

#[tokio::test]
async fn test_full_crawl_over_http_with_ocr() {
    let server = MockServer::start().await;
    mount_site(&server).await;
    let dir = TempDir::new().unwrap();
    let crawler = http_crawler(&dir);
    let start = format!("{}/article", server.uri());

    let (events, mut receiver) = EventSink::channel();
    let outcome = crawler
        .run(
            &CrawlRequest::new(start.clone())
                .with_depth(2)
                .with_ocr(true),
            &events,
            &CancelFlag::new(),
        )
        .await
        .unwrap();
    drop(events);

    assert_eq!(outcome.files_written, 2);
    assert_eq!(outcome.stop_reason, StopReason::FrontierExhausted);

    let files = saved_files(&dir.path().join("scraped_txt"));
    assert_eq!(files.len(), 2);

    let (name, text) = files
        .iter()
        .find(|(name, _)| name.starts_with("Hello_ World_ _Test__"))
        .expect("article file should be saved");
    assert!(name.ends_with(".txt"));
    assert!(text.starts_with(&format!(
        "Title: Hello, World! <Test>\nURL: {}\nTimestamp: ",
        start
    )));
    assert!(text.contains("\n\nARTICLE TEXT:\nFirst paragraph.\nSecond paragraph.\n\n"));
    assert!(text.ends_with(&format!(
        "IMAGE TEXTS:\nImage text from {}/img/sign.png:\nSTOP AHEAD\n",
        server.uri()
    )));

    let (_, second) = files
        .iter()
        .find(|(name, _)| name.starts_with("Second Page_"))
        .expect("linked page should be saved");
    assert!(second.contains("ARTICLE TEXT:\nMore text.\n"));
    assert!(!second.contains("IMAGE TEXTS:"));

    // The 404 image produced a warning but did not stop the crawl
    let mut warnings = Vec::new();
    while let Ok(event) = receiver.try_recv() {
        if let CrawlEvent::Warning { message } = event {
            warnings.push(message);
        }
    }
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("/img/missing.png"));
}

#[tokio::test]
async fn test_crawl_without_ocr_has_no_image_section() {
    let server = MockServer::start().await;
    mount_site(&server).await;
    let dir = TempDir::new().unwrap();
    let crawler = http_crawler(&dir);

    let outcome = run(
        &crawler,
        CrawlRequest::new(format!("{}/article", server.uri())),
    )
    .await;

    assert_eq!(outcome.files_written, 1);
    let files = saved_files(&dir.path().join("scraped_txt"));
    assert_eq!(files.len(), 1);
    assert!(!files[0].1.contains("IMAGE TEXTS:"));
    assert!(files[0].1.ends_with("ARTICLE TEXT:\nFirst paragraph.\nSecond paragraph.\n\n"));
}

#[tokio::test]
async fn test_unreachable_start_page_writes_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();
    let crawler = http_crawler(&dir);

    let outcome = run(
        &crawler,
        CrawlRequest::new(format!("{}/down", server.uri())).with_depth(3),
    )
    .await;

    assert_eq!(outcome.files_written, 0);
    assert_eq!(outcome.pages_visited, 1);
    assert_eq!(outcome.stop_reason, StopReason::FrontierExhausted);
    assert!(saved_files(&dir.path().join("scraped_txt")).is_empty());
}
