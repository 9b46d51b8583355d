//! Quality gate and generative fallback
//!
//! The gate runs three independent heuristics over the final corpus. When any of
//! them fires, the harvester asks a text generator for a simulated crawl export.

mod generator;
mod prompt;

pub use generator::{resolve_api_key, GeminiGenerator, TextGenerator};
pub use prompt::{build_fallback_prompt, detect_vertical, DISCLOSURE_NOTE, SIMULATED_SUFFIX};

use crate::config::HeuristicsConfig;
use crate::crawler::contains_any;
use serde::Serialize;

/// Outcome of the quality gate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityReport {
    /// Corpus is shorter than the thin threshold
    pub is_thin: bool,
    /// Corpus (or the home page) carried a blocking/CAPTCHA marker
    pub is_blocked: bool,
    /// Corpus mentions none of the quality keywords
    pub is_low_quality: bool,
}

impl QualityReport {
    /// Returns true when the fallback should be attempted
    pub fn needs_fallback(&self) -> bool {
        self.is_thin || self.is_blocked || self.is_low_quality
    }
}

/// Evaluates the corpus against the configured heuristics
///
/// `home_blocked` carries the home-page block detection from the initial fetch:
/// a blocked home page contributes no text, so the corpus alone cannot show it.
pub fn evaluate(corpus: &str, heuristics: &HeuristicsConfig, home_blocked: bool) -> QualityReport {
    let lower = corpus.to_lowercase();

    QualityReport {
        is_thin: corpus.chars().count() < heuristics.thin_threshold,
        is_blocked: home_blocked || contains_any(corpus, &heuristics.corpus_blocked_markers),
        is_low_quality: !heuristics
            .quality_keywords
            .iter()
            .any(|keyword| lower.contains(&keyword.to_lowercase())),
    }
}
