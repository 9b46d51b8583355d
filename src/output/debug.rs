//! Diagnostic record accumulated through a harvest
//!
//! Purely observational: nothing in the pipeline reads these fields to make a
//! decision. The record is returned to the caller for operator troubleshooting.

use crate::crawler::StopReason;
use crate::state::CrawlPhase;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Free-form diagnostics for one harvest
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,

    // Sitemap probing
    pub sitemaps_found: Vec<String>,
    pub sitemap_urls_found: usize,

    // Initial fetch
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_content_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_buffer_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_parsed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_text_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_error: Option<String>,
    pub initial_blocked: bool,
    pub is_spa: bool,

    // Crawl
    pub pages_fetched: usize,
    pub pages_kept: usize,
    pub queue_remaining: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_reason: Option<StopReason>,

    // Quality gate and fallback
    pub final_data_length: usize,
    pub is_thin: bool,
    pub is_blocked: bool,
    pub is_low_quality: bool,
    pub fallback_engaged: bool,
    pub fallback_success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_error: Option<String>,

    pub phases: Vec<CrawlPhase>,
    pub elapsed_ms: u64,
    pub logs: Vec<String>,
}

impl DebugInfo {
    /// Creates a record stamped with the current time
    pub fn started_now() -> Self {
        Self {
            started_at: Some(Utc::now()),
            ..Self::default()
        }
    }

    /// Appends a free-form log line
    pub fn log(&mut self, message: impl Into<String>) {
        self.logs.push(message.into());
    }
}
