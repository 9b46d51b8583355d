//! State module for tracking harvest progress
//!
//! A harvest runs strictly top-to-bottom through a fixed sequence of phases.
//!
//! # Components
//!
//! - `CrawlPhase`: The phases of a single harvest and their legal transitions
//! - `PhaseTracker`: Records the path a harvest took and rejects illegal transitions

mod phase;

// Re-export main types
pub use phase::{CrawlPhase, PhaseTracker};
