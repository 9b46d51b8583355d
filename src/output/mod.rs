//! Output module for shaping harvest results
//!
//! This module handles:
//! - The diagnostic record accumulated through every stage
//! - The JSON success and error responses returned to callers

mod debug;
mod response;

pub use debug::DebugInfo;
pub use response::{AnalyzeResponse, ErrorResponse, GENERIC_FAILURE};
