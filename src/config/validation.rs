use crate::config::types::{
    Config, CrawlerConfig, FallbackConfig, HeuristicsConfig, RenderProxyConfig, UserAgentConfig,
};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_heuristics(&config.heuristics)?;
    validate_render_proxy(&config.render_proxy)?;
    validate_fallback(&config.fallback)?;
    Ok(())
}

/// Validates crawl limits and timeouts
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.batch_size < 1 || config.batch_size > 50 {
        return Err(ConfigError::Validation(format!(
            "batch-size must be between 1 and 50, got {}",
            config.batch_size
        )));
    }

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(
            "max-pages must be >= 1".to_string(),
        ));
    }

    if config.time_budget_secs >= config.hard_limit_secs {
        return Err(ConfigError::Validation(format!(
            "time-budget-secs ({}) must be below hard-limit-secs ({})",
            config.time_budget_secs, config.hard_limit_secs
        )));
    }

    if config.corpus_char_ceiling < 1 || config.page_char_budget < 1 || config.pdf_char_budget < 1 {
        return Err(ConfigError::Validation(
            "character budgets must be >= 1".to_string(),
        ));
    }

    for (name, value) in [
        ("initial-timeout-ms", config.initial_timeout_ms),
        ("page-timeout-ms", config.page_timeout_ms),
        ("sitemap-timeout-ms", config.sitemap_timeout_ms),
    ] {
        if value < 1 {
            return Err(ConfigError::Validation(format!("{} must be >= 1", name)));
        }
    }

    if config.sitemap_paths.iter().any(|p| p.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "sitemap-paths cannot contain empty entries".to_string(),
        ));
    }

    Ok(())
}

/// Validates the user agent string
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.value.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent value cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Validates heuristic tables
fn validate_heuristics(config: &HeuristicsConfig) -> Result<(), ConfigError> {
    if config.quality_keywords.is_empty() {
        return Err(ConfigError::Validation(
            "quality-keywords cannot be empty".to_string(),
        ));
    }

    if config.spa_root_markers.iter().any(|m| m.is_empty()) {
        return Err(ConfigError::Validation(
            "spa-root-markers cannot contain empty entries".to_string(),
        ));
    }

    for vertical in &config.verticals {
        if vertical.keywords.is_empty() || vertical.keywords.iter().any(|k| k.is_empty()) {
            return Err(ConfigError::Validation(format!(
                "vertical '{}' must have non-empty keywords",
                vertical.name
            )));
        }

        if let Some(section) = &vertical.section {
            if !section.starts_with('/') {
                return Err(ConfigError::Validation(format!(
                    "vertical '{}' section must start with '/', got '{}'",
                    vertical.name, section
                )));
            }
        }
    }

    Ok(())
}

/// Validates the rendering proxy base URL
fn validate_render_proxy(config: &RenderProxyConfig) -> Result<(), ConfigError> {
    validate_http_url("render-proxy base-url", &config.base_url)
}

/// Validates the fallback generator configuration
fn validate_fallback(config: &FallbackConfig) -> Result<(), ConfigError> {
    validate_http_url("fallback api-base", &config.api_base)?;

    if config.model.trim().is_empty() {
        return Err(ConfigError::Validation(
            "fallback model cannot be empty".to_string(),
        ));
    }

    if config.timeout_ms < 1 {
        return Err(ConfigError::Validation(
            "fallback timeout-ms must be >= 1".to_string(),
        ));
    }

    Ok(())
}

fn validate_http_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", field, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} must use http or https, got '{}'",
            field, value
        )));
    }

    Ok(())
}
