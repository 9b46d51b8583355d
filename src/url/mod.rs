//! URL handling module for Sumi-Harvest
//!
//! This module provides target normalization, bare-domain extraction,
//! crawl-key derivation and same-site filtering.

mod domain;
mod normalize;

// Re-export main functions
pub use domain::{bare_domain, is_same_site};
pub use normalize::{has_skipped_extension, normalize_target, page_key};
