//! Integration tests for the harvester
//!
//! These tests use wiremock to stand up mock sites and drive full harvests
//! end-to-end, with stub text generators and PDF extractors injected.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use sumi_harvest::config::{Config, VerticalHint};
use sumi_harvest::crawler::{PdfTextExtractor, StopReason};
use sumi_harvest::quality::TextGenerator;
use sumi_harvest::server;
use sumi_harvest::{HarvestError, Harvester};
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Generator returning canned text and recording the prompts it receives
struct StubGenerator {
    reply: Result<String, String>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl StubGenerator {
    fn replying(text: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(text.into()),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn failing(message: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(message.into()),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn last_prompt(&self) -> String {
        self.prompts.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

#[async_trait]
impl TextGenerator for StubGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, HarvestError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.reply.clone().map_err(HarvestError::Generation)
    }
}

/// Generator that answers only after a delay
struct SlowGenerator {
    delay: Duration,
}

#[async_trait]
impl TextGenerator for SlowGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, HarvestError> {
        tokio::time::sleep(self.delay).await;
        Ok(long_generated_text())
    }
}

/// PDF extractor returning fixed text regardless of input
struct StubPdf(&'static str);

#[async_trait]
impl PdfTextExtractor for StubPdf {
    async fn extract_text(&self, _bytes: Vec<u8>) -> Result<String, HarvestError> {
        Ok(self.0.to_string())
    }
}

/// Creates a test configuration with short timeouts and the proxy on the mock server
fn create_test_config(server: &MockServer) -> Config {
    let mut config = Config::default();
    config.crawler.initial_timeout_ms = 2_000;
    config.crawler.page_timeout_ms = 2_000;
    config.crawler.sitemap_timeout_ms = 1_000;
    config.crawler.time_budget_secs = 20;
    config.crawler.hard_limit_secs = 30;
    config.render_proxy.base_url = format!("{}/proxy", server.uri());
    config
}

fn harvester(config: Config) -> Harvester {
    Harvester::new(config)
        .expect("Failed to build harvester")
        .with_generator(None)
}

fn html_page(title: &str, body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/html; charset=utf-8")
        .set_body_string(format!(
            "<html><head><title>{}</title></head><body>{}</body></html>",
            title, body
        ))
}

/// A paragraph of roughly `len` characters that passes the quality keywords
fn prose(len: usize) -> String {
    let sentence = "We offer services for every customer. Read about our team or contact us. ";
    sentence.repeat(len / sentence.len() + 1)[..len].to_string()
}

fn long_generated_text() -> String {
    format!(
        "WEBSITE: example\n\n--- HOME PAGE ---\n{}\n\n--- PAGE: /faq ---\n{}",
        prose(400),
        prose(400)
    )
}

#[tokio::test]
async fn test_healthy_site_keeps_crawled_title() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(
            "Acme",
            &format!("<p>About Us. Contact. {}</p>", prose(1_500)),
        ))
        .mount(&server)
        .await;

    let report = harvester(create_test_config(&server))
        .harvest(&server.uri())
        .await
        .expect("Harvest failed");

    assert_eq!(report.title, "Acme");
    assert!(!report.fallback_applied);
    assert!(report.data.starts_with("WEBSITE: Acme ("));
    assert!(report.data.contains("--- HOME PAGE ---\n"));
    assert_eq!(report.pages_scraped(), 1);
    assert_eq!(report.debug.initial_status, Some(200));
    assert_eq!(report.debug.stop_reason, Some(StopReason::QueueExhausted));
}

#[tokio::test]
async fn test_rich_site_never_calls_generator() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page("Acme", &format!("<p>{}</p>", prose(2_600))))
        .mount(&server)
        .await;

    let generator = StubGenerator::replying(long_generated_text());
    let report = harvester(create_test_config(&server))
        .with_generator(Some(generator.clone()))
        .harvest(&server.uri())
        .await
        .expect("Harvest failed");

    assert!(!report.quality.needs_fallback());
    assert_eq!(generator.calls(), 0);
    assert!(!report.debug.fallback_engaged);
    assert_eq!(report.title, "Acme");
}

#[tokio::test]
async fn test_blocked_site_uses_generated_content() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page("Denied", "<h1>Access Denied</h1>"))
        .mount(&server)
        .await;

    let generator = StubGenerator::replying(long_generated_text());
    let report = harvester(create_test_config(&server))
        .with_generator(Some(generator.clone()))
        .harvest(&server.uri())
        .await
        .expect("Harvest failed");

    assert!(report.quality.is_blocked);
    assert!(report.debug.initial_blocked);
    assert!(report.debug.is_blocked);
    assert_eq!(generator.calls(), 1);
    assert!(generator.last_prompt().contains("127.0.0.1"));

    assert!(report.fallback_applied);
    assert!(report.debug.fallback_success);
    assert_eq!(report.title, "127.0.0.1 (Simulated Demo)");
    assert!(report.data.starts_with("WEBSITE: example"));
    assert!(report.data.ends_with(
        "\n\n[NOTE: This content was AI-generated because the direct site crawl was blocked.]"
    ));
    assert_eq!(report.pages_scraped(), 0);
}

#[tokio::test]
async fn test_unreachable_home_keeps_corpus_when_generation_fails() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page("Slow", &prose(3_000)).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let mut config = create_test_config(&server);
    config.crawler.initial_timeout_ms = 300;

    let generator = StubGenerator::failing("provider unavailable");
    let report = harvester(config)
        .with_generator(Some(generator.clone()))
        .harvest(&server.uri())
        .await
        .expect("Harvest failed");

    let target = format!("{}/", server.uri());
    assert_eq!(
        report.data,
        format!("WEBSITE: 127.0.0.1 ({})\n\n--- HOME PAGE ---\n\n\n", target)
    );
    assert_eq!(report.title, "127.0.0.1");
    assert!(report.quality.is_thin);
    assert!(report.debug.initial_error.is_some());
    assert!(report.debug.sitemaps_found.is_empty());
    assert_eq!(generator.calls(), 1);
    assert!(report.debug.fallback_engaged);
    assert!(!report.fallback_applied);
    assert!(report
        .debug
        .fallback_error
        .as_deref()
        .unwrap_or_default()
        .contains("provider unavailable"));
    assert_eq!(report.pages_scraped(), 1);
}

#[tokio::test]
async fn test_short_generated_text_is_discarded() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page("Tiny", "<p>Hello</p>"))
        .mount(&server)
        .await;

    let generator = StubGenerator::replying("too short");
    let report = harvester(create_test_config(&server))
        .with_generator(Some(generator.clone()))
        .harvest(&server.uri())
        .await
        .expect("Harvest failed");

    assert_eq!(generator.calls(), 1);
    assert!(!report.fallback_applied);
    assert_eq!(report.title, "Tiny");
    assert!(report.data.contains("Hello"));
}

#[tokio::test]
async fn test_pdf_target_is_extracted_without_link_discovery() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/report.pdf"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/pdf")
                .set_body_bytes(b"%PDF-1.4 <a href=\"/hidden\">not a link</a>".to_vec()),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/hidden"))
        .respond_with(html_page("Hidden", &prose(500)))
        .expect(0)
        .mount(&server)
        .await;

    let report = harvester(create_test_config(&server))
        .with_pdf_extractor(Arc::new(StubPdf("Quarterly report: services, about, contact.")))
        .harvest(&format!("{}/report.pdf", server.uri()))
        .await
        .expect("Harvest failed");

    assert!(report
        .data
        .contains("--- HOME PAGE ---\n[PDF CONTENT EXTRACTED]\nQuarterly report"));
    assert_eq!(report.pages.len(), 0);
    assert_eq!(report.debug.pdf_parsed, Some(true));
    assert_eq!(report.title, "127.0.0.1");
}

#[tokio::test]
async fn test_each_link_is_fetched_once() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(
            "Home",
            &format!(
                r##"<a href="/about">About</a>
                <a href="{base}/about">About again</a>
                <a href="/about?ref=nav">About query</a>
                <a href="/about#team">About fragment</a>
                <a href="/">Home</a>
                <p>{}</p>"##,
                prose(600)
            ),
        ))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/about"))
        .respond_with(html_page(
            "About",
            &format!(
                r#"<a href="/">Home</a><a href="/about">Self</a><p>{}</p>"#,
                prose(400)
            ),
        ))
        .expect(1)
        .mount(&server)
        .await;

    let report = harvester(create_test_config(&server))
        .harvest(&base)
        .await
        .expect("Harvest failed");

    assert_eq!(report.pages.paths(), vec!["/about"]);
    assert_eq!(report.debug.pages_fetched, 1);
    assert!(report.data.contains("--- PAGE: /about ---\n"));
    assert_eq!(report.pages_scraped(), 2);
}

#[tokio::test]
async fn test_page_cap_stops_the_crawl() {
    let server = MockServer::start().await;

    let links: String = (1..=10)
        .map(|i| format!(r#"<a href="/p{}">Page {}</a>"#, i, i))
        .collect();
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page("Home", &format!("{}<p>{}</p>", links, prose(600))))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/p\d+$"))
        .respond_with(html_page("Page", &prose(400)))
        .mount(&server)
        .await;

    let mut config = create_test_config(&server);
    config.crawler.max_pages = 3;

    let report = harvester(config)
        .harvest(&server.uri())
        .await
        .expect("Harvest failed");

    assert_eq!(report.pages.len(), 3);
    assert_eq!(report.debug.stop_reason, Some(StopReason::PageCap));
    assert_eq!(report.debug.pages_fetched, 5);
    assert_eq!(report.debug.queue_remaining, 5);
    assert_eq!(report.pages.paths(), vec!["/p1", "/p2", "/p3"]);
}

#[tokio::test]
async fn test_time_budget_stops_before_first_batch() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(
            "Home",
            &format!(r#"<a href="/about">About</a><p>{}</p>"#, prose(600)),
        ))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/about"))
        .respond_with(html_page("About", &prose(400)))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = create_test_config(&server);
    config.crawler.time_budget_secs = 0;

    let report = harvester(config)
        .harvest(&server.uri())
        .await
        .expect("Harvest failed");

    assert_eq!(report.debug.stop_reason, Some(StopReason::TimeBudget));
    assert_eq!(report.debug.queue_remaining, 1);
    assert!(report.pages.is_empty());
}

#[tokio::test]
async fn test_sitemap_seeds_the_queue() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            r#"<?xml version="1.0"?>
            <urlset>
              <url><loc>{base}/from-sitemap</loc></url>
              <url><loc>https://elsewhere.example/offsite</loc></url>
            </urlset>"#
        )))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page("Home", &format!("<p>{}</p>", prose(600))))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/from-sitemap"))
        .respond_with(html_page("Listed", &prose(400)))
        .expect(1)
        .mount(&server)
        .await;

    let report = harvester(create_test_config(&server))
        .harvest(&base)
        .await
        .expect("Harvest failed");

    assert_eq!(
        report.debug.sitemaps_found,
        vec![format!("{}/sitemap.xml", base)]
    );
    assert_eq!(report.debug.sitemap_urls_found, 1);
    assert_eq!(report.pages.paths(), vec!["/from-sitemap"]);
}

#[tokio::test]
async fn test_spa_pages_go_through_render_proxy() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(
            "App",
            r#"<div id="root"></div><a href="/pricing">Pricing</a>"#,
        ))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/pricing"))
        .respond_with(html_page("Pricing", &prose(400)))
        .expect(0)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path_regex("^/proxy/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/plain")
                .set_body_string(format!("# Pricing\n\n{}", prose(400))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let report = harvester(create_test_config(&server))
        .harvest(&server.uri())
        .await
        .expect("Harvest failed");

    assert!(report.debug.is_spa);
    let pricing = report.pages.get("/pricing").expect("pricing page kept");
    assert!(pricing.starts_with("# Pricing\n\n"));
}

#[tokio::test]
async fn test_subpage_filters() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(
            "Home",
            &format!(
                r#"<a href="/short">Short</a>
                <a href="/denied">Denied</a>
                <a href="/missing">Missing</a>
                <a href="/guide.pdf">Guide</a>
                <a href="/logo.png">Logo</a>
                <a href="https://elsewhere.example/">Offsite</a>
                <p>{}</p>"#,
                prose(600)
            ),
        ))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/short"))
        .respond_with(html_page("Short", "<p>Not much here</p>"))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/denied"))
        .respond_with(html_page("Denied", &format!("Access Denied {}", prose(400))))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/guide.pdf"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/pdf")
                .set_body_bytes(b"%PDF-1.4".to_vec()),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/logo.png"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let pdf_text = "Membership guide covering services, class schedules and contact details.";
    let report = harvester(create_test_config(&server))
        .with_pdf_extractor(Arc::new(StubPdf(pdf_text)))
        .harvest(&server.uri())
        .await
        .expect("Harvest failed");

    assert_eq!(report.pages.paths(), vec!["/guide.pdf"]);
    let guide = report.pages.get("/guide.pdf").unwrap();
    assert_eq!(
        guide,
        format!(
            "[PDF CONTENT EXTRACTED FROM: {}/guide.pdf]\n{}",
            server.uri(),
            pdf_text
        )
    );
    assert_eq!(report.debug.pages_fetched, 4);
}

#[tokio::test]
async fn test_vertical_hint_reaches_prompt() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page("Lab", "<p>Hello</p>"))
        .mount(&server)
        .await;

    let mut config = create_test_config(&server);
    config.heuristics.verticals = vec![VerticalHint {
        name: "local-lab".to_string(),
        keywords: vec!["127.0.0".to_string()],
        instructions: "List the lab instruments on site.".to_string(),
        section: Some("/instruments".to_string()),
    }];

    let generator = StubGenerator::replying(long_generated_text());
    harvester(config)
        .with_generator(Some(generator.clone()))
        .harvest(&server.uri())
        .await
        .expect("Harvest failed");

    let prompt = generator.last_prompt();
    assert!(prompt.contains("SPECIAL SECTION: List the lab instruments on site."));
    assert!(prompt.contains("--- PAGE: /instruments ---"));
}

#[tokio::test]
async fn test_slow_generation_near_hard_limit_keeps_crawled_corpus() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(
            "Hanging",
            r#"<a href="/hang">Hang</a><p>Hello</p>"#,
        ))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/hang"))
        .respond_with(html_page("Hang", &prose(400)).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let mut config = create_test_config(&server);
    config.crawler.time_budget_secs = 1;
    config.crawler.hard_limit_secs = 3;
    config.crawler.page_timeout_ms = 2_000;

    let harvester = harvester(config).with_generator(Some(Arc::new(SlowGenerator {
        delay: Duration::from_millis(1_500),
    })));

    let response = server::analyze(&harvester, Some(&server.uri()), Duration::from_secs(3))
        .await
        .expect("Harvest must survive a slow fallback");

    assert!(response.success);
    assert_eq!(response.title, "Hanging");
    assert!(response.data.starts_with("WEBSITE: Hanging ("));
    assert!(response.debug.fallback_engaged);
    assert!(!response.debug.fallback_success);
    assert!(response
        .debug
        .fallback_error
        .as_deref()
        .unwrap_or_default()
        .contains("timed out"));
    assert_eq!(response.pages_scraped, 1);
}

#[tokio::test]
async fn test_generation_timeout_keeps_crawled_corpus() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page("Tiny", "<p>Hello</p>"))
        .mount(&server)
        .await;

    let mut config = create_test_config(&server);
    config.fallback.timeout_ms = 200;

    let report = harvester(config)
        .with_generator(Some(Arc::new(SlowGenerator {
            delay: Duration::from_secs(2),
        })))
        .harvest(&server.uri())
        .await
        .expect("Harvest failed");

    assert!(!report.fallback_applied);
    assert_eq!(report.title, "Tiny");
    assert_eq!(
        report.debug.fallback_error.as_deref(),
        Some("generation timed out after 200ms")
    );
}
