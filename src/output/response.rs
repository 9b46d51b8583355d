//! JSON response shapes for the analyze endpoint

use crate::crawler::HarvestReport;
use crate::output::DebugInfo;
use serde::Serialize;

/// Generic message returned for unexpected pipeline failures
pub const GENERIC_FAILURE: &str = "Deep crawl failed.";

/// Successful harvest response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub success: bool,
    pub data: String,
    pub title: String,
    pub pages_scraped: usize,
    pub debug: DebugInfo,
}

impl From<HarvestReport> for AnalyzeResponse {
    fn from(report: HarvestReport) -> Self {
        Self {
            success: true,
            pages_scraped: report.pages_scraped(),
            data: report.data,
            title: report.title,
            debug: report.debug,
        }
    }
}

/// Failure response
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}
