//! Crawler module for page fetching and corpus assembly
//!
//! This module contains the harvest pipeline, including:
//! - HTTP fetching with per-request timeouts
//! - HTML parsing, link discovery and sitemap extraction
//! - Content cleaning and PDF text extraction
//! - The visited set, work queue and scraped-page store
//! - Corpus aggregation and overall harvest coordination

mod aggregate;
mod cleaner;
mod coordinator;
mod fetcher;
mod frontier;
mod pages;
mod parser;
mod pdf;

pub use aggregate::{aggregate_corpus, corpus_header};
pub use cleaner::{clean_html, contains_any, strip_tags, truncate_chars};
pub use coordinator::{render_proxy_url, CrawlTarget, HarvestReport, Harvester, StopReason};
pub use fetcher::{build_http_client, fetch_url, is_pdf_response, FetchResult, FetchedPage};
pub use frontier::Frontier;
pub use pages::ScrapedPages;
pub use parser::{discover_links, extract_sitemap_locs, parse_html, parse_title, ParsedPage};
pub use pdf::{looks_like_pdf, pdf_source_marker, PdfExtractLib, PdfTextExtractor, PDF_MARKER};
