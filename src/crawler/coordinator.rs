//! Harvest coordinator - runs one request through the whole pipeline
//!
//! A harvest walks the phase machine in order:
//! - Normalize the raw input into a target URL and bare domain
//! - Probe conventional sitemap locations (concurrently, failures ignored)
//! - Fetch the home page and decide whether the site is a client-rendered shell
//! - Walk the work queue in bounded batches until the queue, page cap, or time budget runs out
//! - Aggregate the corpus and run the quality gate
//! - Replace the corpus with generated content when the gate fires and generation succeeds
//!
//! Per-page failures never fail the harvest. Only an unusable input URL does.

use crate::config::{validate, Config};
use crate::crawler::aggregate::aggregate_corpus;
use crate::crawler::cleaner::{clean_html, contains_any, strip_tags, truncate_chars};
use crate::crawler::fetcher::{build_http_client, fetch_url, FetchResult, FetchedPage};
use crate::crawler::frontier::Frontier;
use crate::crawler::pages::ScrapedPages;
use crate::crawler::parser::{discover_links, extract_sitemap_locs, parse_title};
use crate::crawler::pdf::{looks_like_pdf, pdf_source_marker, PdfExtractLib, PdfTextExtractor, PDF_MARKER};
use crate::output::DebugInfo;
use crate::quality::{
    build_fallback_prompt, detect_vertical, evaluate, GeminiGenerator, QualityReport,
    TextGenerator, DISCLOSURE_NOTE, SIMULATED_SUFFIX,
};
use crate::state::{CrawlPhase, PhaseTracker};
use crate::url::{bare_domain, is_same_site, normalize_target, page_key};
use crate::HarvestError;
use futures::future::join_all;
use reqwest::Client;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

/// Headroom kept between the last timed call and the hard limit
const HARD_LIMIT_MARGIN: Duration = Duration::from_millis(500);

/// Why the crawl loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// No queued links remained
    QueueExhausted,
    /// ScrapedPages reached the page cap
    PageCap,
    /// The soft time budget elapsed
    TimeBudget,
}

/// The normalized target of one harvest
#[derive(Debug, Clone)]
pub struct CrawlTarget {
    pub url: Url,
    /// Host with a leading "www." stripped
    pub domain: String,
    /// Soft deadline after which no new batch is started
    pub deadline: Instant,
    /// Hard deadline that no request of this harvest may outlive
    pub hard_deadline: Instant,
}

impl CrawlTarget {
    /// Time left before the hard deadline, less a safety margin
    pub fn time_left(&self) -> Duration {
        self.hard_deadline
            .saturating_duration_since(Instant::now())
            .saturating_sub(HARD_LIMIT_MARGIN)
    }
}

/// What the initial fetch produced
#[derive(Debug, Default)]
struct HomePage {
    title: Option<String>,
    content: String,
    is_spa: bool,
    blocked: bool,
}

/// Result of fetching one queued link
struct PageOutcome {
    path: String,
    content: Option<String>,
    links: Vec<String>,
}

/// Final result of a harvest
#[derive(Debug)]
pub struct HarvestReport {
    pub target_url: String,
    pub title: String,
    /// The corpus, real or generated
    pub data: String,
    pub pages: ScrapedPages,
    pub quality: QualityReport,
    pub fallback_applied: bool,
    pub debug: DebugInfo,
}

impl HarvestReport {
    /// Scraped subpages plus the home page, unless generated content replaced the corpus
    pub fn pages_scraped(&self) -> usize {
        self.pages.len() + usize::from(!self.fallback_applied)
    }
}

/// Runs harvests against a shared HTTP client and configuration
///
/// # Example
///
/// ```no_run
/// use sumi_harvest::{Config, Harvester};
///
/// # async fn run() -> Result<(), sumi_harvest::HarvestError> {
/// let harvester = Harvester::new(Config::default())?;
/// let report = harvester.harvest("example.com").await?;
/// println!("{} pages, {} chars", report.pages_scraped(), report.data.len());
/// # Ok(())
/// # }
/// ```
pub struct Harvester {
    config: Arc<Config>,
    client: Client,
    generator: Option<Arc<dyn TextGenerator>>,
    pdf: Arc<dyn PdfTextExtractor>,
}

impl Harvester {
    /// Creates a harvester, resolving the fallback credential from the environment
    ///
    /// The configuration is validated first, so a harvester never runs with
    /// limits such as a zero batch size.
    pub fn new(config: Config) -> Result<Self, HarvestError> {
        validate(&config)?;
        let client = build_http_client(&config.user_agent)?;

        let generator: Option<Arc<dyn TextGenerator>> = if config.fallback.enabled {
            match GeminiGenerator::from_env(client.clone(), &config.fallback) {
                Some(generator) => Some(Arc::new(generator)),
                None => {
                    tracing::warn!(
                        "No fallback API key found in {:?}; generative fallback disabled",
                        config.fallback.api_key_env
                    );
                    None
                }
            }
        } else {
            None
        };

        Ok(Self {
            config: Arc::new(config),
            client,
            generator,
            pdf: Arc::new(PdfExtractLib),
        })
    }

    /// Replaces the fallback text generator
    pub fn with_generator(mut self, generator: Option<Arc<dyn TextGenerator>>) -> Self {
        self.generator = generator;
        self
    }

    /// Replaces the PDF text extractor
    pub fn with_pdf_extractor(mut self, pdf: Arc<dyn PdfTextExtractor>) -> Self {
        self.pdf = pdf;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Harvests a corpus for the given raw URL
    ///
    /// # Returns
    ///
    /// * `Ok(HarvestReport)` - The corpus, possibly thin or generated
    /// * `Err(HarvestError::UrlError)` - The input could not be normalized
    pub async fn harvest(&self, raw_url: &str) -> Result<HarvestReport, HarvestError> {
        let started = Instant::now();
        let mut phases = PhaseTracker::new();
        let mut debug = DebugInfo::started_now();

        let url = match normalize_target(raw_url) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!("Rejected input URL {:?}: {}", raw_url, e);
                phases.advance(CrawlPhase::Failed)?;
                return Err(e.into());
            }
        };

        let target = CrawlTarget {
            domain: bare_domain(&url),
            deadline: started + Duration::from_secs(self.config.crawler.time_budget_secs),
            hard_deadline: started + Duration::from_secs(self.config.crawler.hard_limit_secs),
            url,
        };
        let target_url = target.url.to_string();
        debug.target_url = Some(target_url.clone());
        tracing::info!("Starting harvest of {} (domain {})", target_url, target.domain);

        let mut frontier = Frontier::new(page_key(&target.url));

        phases.advance(CrawlPhase::Probing)?;
        self.probe_sitemaps(&target, &mut frontier, &mut debug).await;

        phases.advance(CrawlPhase::InitialFetch)?;
        let home = self.fetch_home(&target, &mut frontier, &mut debug).await;

        phases.advance(CrawlPhase::Crawling)?;
        let pages = self
            .crawl(&target, home.is_spa, &mut frontier, &mut debug)
            .await;

        phases.advance(CrawlPhase::Aggregating)?;
        let mut title = home.title.clone().unwrap_or_else(|| target.domain.clone());
        let mut data = aggregate_corpus(
            &title,
            &target_url,
            &home.content,
            &pages,
            self.config.crawler.corpus_char_ceiling,
        );

        phases.advance(CrawlPhase::QualityCheck)?;
        let quality = evaluate(&data, &self.config.heuristics, home.blocked);
        debug.final_data_length = data.chars().count();
        debug.is_thin = quality.is_thin;
        debug.is_blocked = quality.is_blocked;
        debug.is_low_quality = quality.is_low_quality;

        let mut fallback_applied = false;
        if quality.needs_fallback() {
            tracing::info!(
                "Quality gate fired for {} (thin={}, blocked={}, low_quality={})",
                target_url,
                quality.is_thin,
                quality.is_blocked,
                quality.is_low_quality
            );
            phases.advance(CrawlPhase::FallbackGenerating)?;
            debug.fallback_engaged = true;

            if let Some(generated) = self.generate_fallback(&target, &mut debug).await {
                data = format!("{}\n\n{}", generated, DISCLOSURE_NOTE);
                title = format!("{} {}", target.domain, SIMULATED_SUFFIX);
                fallback_applied = true;
                debug.fallback_success = true;
            }
        }

        phases.advance(CrawlPhase::Done)?;
        debug.phases = phases.history().to_vec();
        debug.elapsed_ms = started.elapsed().as_millis() as u64;

        tracing::info!(
            "Harvest of {} finished: {} pages kept, {} chars, fallback={} in {:?}",
            target_url,
            pages.len(),
            data.chars().count(),
            fallback_applied,
            started.elapsed()
        );

        Ok(HarvestReport {
            target_url,
            title,
            data,
            pages,
            quality,
            fallback_applied,
            debug,
        })
    }

    /// Probes every configured sitemap path concurrently and seeds the frontier
    async fn probe_sitemaps(
        &self,
        target: &CrawlTarget,
        frontier: &mut Frontier,
        debug: &mut DebugInfo,
    ) {
        let timeout = Duration::from_millis(self.config.crawler.sitemap_timeout_ms);

        let probes = self.config.crawler.sitemap_paths.iter().map(|path| async move {
            let sitemap_url = match target.url.join(path) {
                Ok(url) => url,
                Err(e) => return (path.clone(), Err(format!("invalid sitemap path: {}", e))),
            };

            match fetch_url(&self.client, sitemap_url.as_str(), timeout).await {
                FetchResult::Success(page) => {
                    (sitemap_url.to_string(), Ok(extract_sitemap_locs(&page.text())))
                }
                FetchResult::HttpError { status_code } => {
                    (sitemap_url.to_string(), Err(format!("HTTP {}", status_code)))
                }
                FetchResult::NetworkError { error, .. } => (sitemap_url.to_string(), Err(error)),
            }
        });

        for (sitemap_url, result) in join_all(probes).await {
            match result {
                Ok(locs) => {
                    let accepted: Vec<String> = locs
                        .iter()
                        .filter_map(|loc| Url::parse(loc).ok())
                        .filter(|url| matches!(url.scheme(), "http" | "https"))
                        .filter(|url| is_same_site(url, &target.domain))
                        .map(|url| page_key(&url))
                        .collect();
                    let added = frontier.enqueue_all(accepted);

                    tracing::info!(
                        "Sitemap {} listed {} URLs, {} queued",
                        sitemap_url,
                        locs.len(),
                        added
                    );
                    debug.log(format!(
                        "sitemap {}: {} locs, {} queued",
                        sitemap_url,
                        locs.len(),
                        added
                    ));
                    debug.sitemaps_found.push(sitemap_url);
                    debug.sitemap_urls_found += added;
                }
                Err(e) => {
                    tracing::debug!("Sitemap probe {} skipped: {}", sitemap_url, e);
                }
            }
        }
    }

    /// Fetches the target itself and seeds the frontier from its links
    async fn fetch_home(
        &self,
        target: &CrawlTarget,
        frontier: &mut Frontier,
        debug: &mut DebugInfo,
    ) -> HomePage {
        let timeout = Duration::from_millis(self.config.crawler.initial_timeout_ms)
            .min(target.time_left());
        let target_url = target.url.as_str();
        let mut home = HomePage::default();

        let page = match fetch_url(&self.client, target_url, timeout).await {
            FetchResult::Success(page) => page,
            FetchResult::HttpError { status_code } => {
                tracing::warn!("Home page {} returned HTTP {}", target_url, status_code);
                debug.initial_status = Some(status_code);
                return home;
            }
            FetchResult::NetworkError { error, timed_out } => {
                tracing::warn!("Home page {} failed: {}", target_url, error);
                if timed_out {
                    debug.log(format!("home page timed out after {}ms", timeout.as_millis()));
                }
                debug.initial_error = Some(error);
                return home;
            }
        };

        debug.initial_status = Some(page.status_code);
        debug.initial_content_type = Some(page.content_type.clone());

        if page.is_pdf(target_url) {
            debug.pdf_buffer_length = Some(page.body.len());
            if !looks_like_pdf(&page.body) {
                debug.log("home PDF response lacks a %PDF- header");
            }
            match self.pdf.extract_text(page.body).await {
                Ok(text) => {
                    let text = text.trim();
                    debug.pdf_parsed = Some(true);
                    debug.pdf_text_length = Some(text.chars().count());
                    home.content = format!(
                        "{}\n{}",
                        PDF_MARKER,
                        truncate_chars(text, self.config.crawler.pdf_char_budget)
                    );
                }
                Err(e) => {
                    tracing::warn!("Home PDF {} could not be parsed: {}", target_url, e);
                    debug.pdf_parsed = Some(false);
                    debug.pdf_error = Some(e.to_string());
                }
            }
            return home;
        }

        let html = page.text();
        debug.html_length = Some(html.len());

        let base = Url::parse(&page.final_url).unwrap_or_else(|_| target.url.clone());
        let links = discover_links(
            &html,
            &base,
            &target.domain,
            &self.config.heuristics.skipped_extensions,
        );
        let added = frontier.enqueue_all(links);
        debug.log(format!("home page: {} links queued", added));

        let heuristics = &self.config.heuristics;
        let visible = strip_tags(&html);

        if contains_any(&visible, &heuristics.page_blocked_markers) {
            tracing::warn!("Home page {} looks blocked", target_url);
            home.blocked = true;
            debug.initial_blocked = true;
        } else if visible.chars().count() < heuristics.spa_text_threshold
            && heuristics
                .spa_root_markers
                .iter()
                .any(|marker| html.contains(marker.as_str()))
        {
            tracing::info!(
                "Home page {} is a client-rendered shell; subpages go through the render proxy",
                target_url
            );
            home.is_spa = true;
            debug.is_spa = true;
        } else {
            home.title = parse_title(&html);
            home.content = clean_html(&html);
        }

        home
    }

    /// Processes the work queue in bounded batches
    async fn crawl(
        &self,
        target: &CrawlTarget,
        use_proxy: bool,
        frontier: &mut Frontier,
        debug: &mut DebugInfo,
    ) -> ScrapedPages {
        let crawler = &self.config.crawler;
        let mut pages = ScrapedPages::new(crawler.max_pages);

        let stop_reason = loop {
            if pages.is_full() {
                break StopReason::PageCap;
            }
            if Instant::now() >= target.deadline {
                break StopReason::TimeBudget;
            }
            if frontier.is_empty() {
                break StopReason::QueueExhausted;
            }

            let batch = frontier.next_batch(crawler.batch_size);
            tracing::debug!(
                "Dispatching batch of {} ({} still queued)",
                batch.len(),
                frontier.queue_len()
            );

            let outcomes =
                join_all(batch.iter().map(|link| self.fetch_page(link, target, use_proxy))).await;

            for outcome in outcomes {
                debug.pages_fetched += 1;
                frontier.enqueue_all(outcome.links);

                if let Some(content) = outcome.content {
                    if pages.insert(outcome.path, content) {
                        debug.pages_kept += 1;
                    }
                }
            }
        };

        tracing::info!(
            "Crawl stopped ({:?}): {} pages kept, {} queued links left",
            stop_reason,
            pages.len(),
            frontier.queue_len()
        );
        debug.queue_remaining = frontier.queue_len();
        debug.stop_reason = Some(stop_reason);

        pages
    }

    /// Fetches one queued link and decides whether its content is kept
    async fn fetch_page(&self, link: &str, target: &CrawlTarget, use_proxy: bool) -> PageOutcome {
        let mut outcome = PageOutcome {
            path: Url::parse(link)
                .map(|url| url.path().to_string())
                .unwrap_or_else(|_| link.to_string()),
            content: None,
            links: Vec::new(),
        };

        let fetch_target = if use_proxy {
            render_proxy_url(&self.config.render_proxy.base_url, link)
        } else {
            link.to_string()
        };
        let timeout =
            Duration::from_millis(self.config.crawler.page_timeout_ms).min(target.time_left());

        let page = match fetch_url(&self.client, &fetch_target, timeout).await {
            FetchResult::Success(page) => page,
            FetchResult::HttpError { status_code } => {
                tracing::debug!("Skipping {}: HTTP {}", link, status_code);
                return outcome;
            }
            FetchResult::NetworkError { error, .. } => {
                tracing::debug!("Skipping {}: {}", link, error);
                return outcome;
            }
        };

        if page.is_pdf(link) {
            outcome.content = self.subpage_pdf(link, page).await;
            return outcome;
        }

        let crawler = &self.config.crawler;
        let body = page.text();

        let clean = if use_proxy {
            body
        } else {
            if let Ok(source) = Url::parse(link) {
                outcome.links = discover_links(
                    &body,
                    &source,
                    &target.domain,
                    &self.config.heuristics.skipped_extensions,
                );
            }
            clean_html(&body)
        };

        if clean.chars().count() > crawler.min_page_chars
            && !contains_any(&clean, &self.config.heuristics.subpage_blocked_markers)
        {
            outcome.content = Some(truncate_chars(&clean, crawler.page_char_budget).to_string());
        } else {
            tracing::debug!("Discarding {}: too short or blocked", link);
        }

        outcome
    }

    async fn subpage_pdf(&self, link: &str, page: FetchedPage) -> Option<String> {
        match self.pdf.extract_text(page.body).await {
            Ok(text) => {
                let text = text.trim();
                if text.chars().count() > self.config.crawler.min_pdf_chars {
                    Some(format!(
                        "{}\n{}",
                        pdf_source_marker(link),
                        truncate_chars(text, self.config.crawler.pdf_char_budget)
                    ))
                } else {
                    tracing::debug!("Discarding PDF {}: too little text", link);
                    None
                }
            }
            Err(e) => {
                tracing::debug!("Discarding PDF {}: {}", link, e);
                None
            }
        }
    }

    /// Asks the generator for a simulated export; `None` keeps the crawled corpus
    async fn generate_fallback(&self, target: &CrawlTarget, debug: &mut DebugInfo) -> Option<String> {
        let Some(generator) = &self.generator else {
            debug.fallback_error = Some("no generation credential configured".to_string());
            tracing::warn!("Fallback needed for {} but no generator is configured", target.domain);
            return None;
        };

        let vertical = detect_vertical(&target.domain, &self.config.heuristics.verticals);
        if let Some(vertical) = vertical {
            debug.log(format!("fallback vertical: {}", vertical.name));
        }
        let prompt = build_fallback_prompt(&target.domain, target.url.as_str(), vertical);

        let budget =
            Duration::from_millis(self.config.fallback.timeout_ms).min(target.time_left());
        if budget.is_zero() {
            tracing::warn!("No time left for fallback generation for {}", target.domain);
            debug.fallback_error = Some("hard limit reached before generation".to_string());
            return None;
        }

        let generated = match tokio::time::timeout(budget, generator.generate(&prompt)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    "Fallback generation for {} exceeded {:?}; keeping crawl",
                    target.domain,
                    budget
                );
                debug.fallback_error =
                    Some(format!("generation timed out after {}ms", budget.as_millis()));
                return None;
            }
        };

        match generated {
            Ok(text) if text.chars().count() > self.config.fallback.min_chars => Some(text),
            Ok(text) => {
                tracing::warn!(
                    "Generated content for {} too short ({} chars); keeping crawl",
                    target.domain,
                    text.chars().count()
                );
                debug.fallback_error = Some("generated content too short".to_string());
                None
            }
            Err(e) => {
                tracing::warn!("Fallback generation for {} failed: {}", target.domain, e);
                debug.fallback_error = Some(e.to_string());
                None
            }
        }
    }
}

/// Builds the render-proxy URL for a link
pub fn render_proxy_url(base_url: &str, link: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), link)
}
