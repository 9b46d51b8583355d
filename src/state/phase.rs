/// Phase definitions for a single harvest
///
/// `Normalizing → Probing → InitialFetch → Crawling → Aggregating → QualityCheck
/// → [FallbackGenerating] → Done`, with `Failed` reachable only from `Normalizing`.
use crate::HarvestError;
use serde::Serialize;
use std::fmt;

/// Represents the current phase of a harvest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CrawlPhase {
    // ===== Active Phases =====
    /// Canonicalizing the raw input URL
    Normalizing,

    /// Probing conventional sitemap locations
    Probing,

    /// Fetching the target page itself
    InitialFetch,

    /// Processing the work queue in bounded batches
    Crawling,

    /// Building the corpus string
    Aggregating,

    /// Evaluating thin/blocked/low-quality heuristics
    QualityCheck,

    /// Generating synthetic content
    FallbackGenerating,

    // ===== Terminal Phases =====
    /// The harvest produced a result (possibly synthetic)
    Done,

    /// The input could not be turned into a target
    Failed,
}

impl CrawlPhase {
    /// Returns true if no further transitions are possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Returns true if the pipeline may move from `self` to `next`
    pub fn can_transition_to(&self, next: CrawlPhase) -> bool {
        use CrawlPhase::*;
        matches!(
            (self, next),
            (Normalizing, Probing)
                | (Normalizing, Failed)
                | (Probing, InitialFetch)
                | (InitialFetch, Crawling)
                | (Crawling, Aggregating)
                | (Aggregating, QualityCheck)
                | (QualityCheck, FallbackGenerating)
                | (QualityCheck, Done)
                | (FallbackGenerating, Done)
        )
    }

    /// Converts the phase to its string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normalizing => "normalizing",
            Self::Probing => "probing",
            Self::InitialFetch => "initial_fetch",
            Self::Crawling => "crawling",
            Self::Aggregating => "aggregating",
            Self::QualityCheck => "quality_check",
            Self::FallbackGenerating => "fallback_generating",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Tracks the phases a harvest has passed through
#[derive(Debug, Clone)]
pub struct PhaseTracker {
    current: CrawlPhase,
    history: Vec<CrawlPhase>,
}

impl Default for PhaseTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl PhaseTracker {
    /// Creates a tracker positioned at `Normalizing`
    pub fn new() -> Self {
        Self {
            current: CrawlPhase::Normalizing,
            history: vec![CrawlPhase::Normalizing],
        }
    }

    /// Returns the current phase
    pub fn current(&self) -> CrawlPhase {
        self.current
    }

    /// Returns every phase entered so far, in order
    pub fn history(&self) -> &[CrawlPhase] {
        &self.history
    }

    /// Moves to `next`, rejecting transitions the pipeline does not allow
    pub fn advance(&mut self, next: CrawlPhase) -> Result<(), HarvestError> {
        if !self.current.can_transition_to(next) {
            return Err(HarvestError::InvalidTransition {
                from: self.current,
                to: next,
            });
        }
        tracing::trace!("Phase {} -> {}", self.current, next);
        self.current = next;
        self.history.push(next);
        Ok(())
    }
}
