use serde::Deserialize;

/// Main configuration structure for Sumi-Harvest
///
/// Every section is optional; a missing section falls back to the tuned defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub heuristics: HeuristicsConfig,
    #[serde(rename = "render-proxy")]
    pub render_proxy: RenderProxyConfig,
    pub fallback: FallbackConfig,
    pub server: ServerConfig,
}

/// Crawl limits and timeouts
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Maximum number of subpages kept in the corpus
    pub max_pages: usize,

    /// Number of URLs fetched concurrently per batch
    pub batch_size: usize,

    /// Soft wall-clock budget; no batch starts after it has elapsed
    pub time_budget_secs: u64,

    /// Hard upper bound for a whole request
    pub hard_limit_secs: u64,

    /// Characters kept per HTML subpage
    pub page_char_budget: usize,

    /// Characters kept per extracted PDF
    pub pdf_char_budget: usize,

    /// Absolute ceiling for the aggregated corpus
    pub corpus_char_ceiling: usize,

    /// Cleaned HTML pages must be longer than this to be kept
    pub min_page_chars: usize,

    /// Extracted PDF text must be longer than this to be kept
    pub min_pdf_chars: usize,

    /// Timeout for the initial page fetch (milliseconds)
    pub initial_timeout_ms: u64,

    /// Timeout for each subpage fetch (milliseconds)
    pub page_timeout_ms: u64,

    /// Timeout for each sitemap probe (milliseconds)
    pub sitemap_timeout_ms: u64,

    /// Conventional sitemap filenames probed relative to the target
    pub sitemap_paths: Vec<String>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_pages: 50,
            batch_size: 5,
            time_budget_secs: 280,
            hard_limit_secs: 300,
            page_char_budget: 8000,
            pdf_char_budget: 10_000,
            corpus_char_ceiling: 100_000,
            min_page_chars: 200,
            min_pdf_chars: 50,
            initial_timeout_ms: 15_000,
            page_timeout_ms: 10_000,
            sitemap_timeout_ms: 5_000,
            sitemap_paths: strings(&[
                "sitemap_index.xml",
                "sitemap.xml",
                "properties-sitemap.xml",
                "listings-sitemap.xml",
            ]),
        }
    }
}

/// User agent sent with every outbound fetch
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    pub value: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            value: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
                    (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                .to_string(),
        }
    }
}

/// Heuristic tables for blocking, SPA detection and content quality
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct HeuristicsConfig {
    /// Markers that mark the home page as a block/interstitial page
    pub page_blocked_markers: Vec<String>,

    /// Markers that reject an individual cleaned subpage
    pub subpage_blocked_markers: Vec<String>,

    /// Markers that flag the final corpus as blocked
    pub corpus_blocked_markers: Vec<String>,

    /// Raw-markup markers of a client-rendered root element
    pub spa_root_markers: Vec<String>,

    /// Visible text shorter than this (with a root marker) flags an SPA shell
    pub spa_text_threshold: usize,

    /// Corpora shorter than this are considered thin
    pub thin_threshold: usize,

    /// A corpus containing none of these (case-insensitive) is low quality
    pub quality_keywords: Vec<String>,

    /// Link path extensions that never carry page content
    pub skipped_extensions: Vec<String>,

    /// Domain-keyword driven prompt hints for the fallback generator
    pub verticals: Vec<VerticalHint>,
}

impl Default for HeuristicsConfig {
    fn default() -> Self {
        Self {
            page_blocked_markers: strings(&["Request unsuccessful", "Access Denied", "Cloudflare"]),
            subpage_blocked_markers: strings(&["Access Denied"]),
            corpus_blocked_markers: strings(&[
                "Request unsuccessful",
                "Access Denied",
                "Enable JavaScript",
                "Cloudflare",
            ]),
            spa_root_markers: strings(&["id=\"root\"", "id=\"__next\""]),
            spa_text_threshold: 500,
            thin_threshold: 2000,
            quality_keywords: strings(&["services", "about", "contact"]),
            skipped_extensions: strings(&[
                "jpg", "jpeg", "png", "gif", "zip", "css", "js", "mp4", "mov", "svg", "woff2",
            ]),
            verticals: vec![VerticalHint {
                name: "fitness".to_string(),
                keywords: strings(&["fitness", "gym", "crossfit"]),
                instructions: "CRITICAL: List specific gym equipment (treadmills, squat racks, \
                               free weights, hammer strength machines) found at this type of facility."
                    .to_string(),
                section: Some("/equipment".to_string()),
            }],
        }
    }
}

/// A vertical detected by keywords in the bare domain
#[derive(Debug, Clone, Deserialize)]
pub struct VerticalHint {
    /// Human-readable vertical name
    pub name: String,

    /// Substrings of the domain that select this vertical
    pub keywords: Vec<String>,

    /// Extra instructions appended to the generation prompt
    #[serde(default)]
    pub instructions: String,

    /// Optional extra page section the generated export must contain
    #[serde(default)]
    pub section: Option<String>,
}

/// Third-party rendering proxy used for client-rendered sites
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RenderProxyConfig {
    /// Base URL; the target URL is appended after a `/`
    pub base_url: String,
}

impl Default for RenderProxyConfig {
    fn default() -> Self {
        Self {
            base_url: "https://r.jina.ai".to_string(),
        }
    }
}

/// Generative fallback configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct FallbackConfig {
    /// Whether the fallback may be attempted at all
    pub enabled: bool,

    /// Base URL of the Gemini-compatible API
    pub api_base: String,

    /// Model identifier
    pub model: String,

    /// Environment variables searched (in order) for the API key
    pub api_key_env: Vec<String>,

    /// Generated text must be longer than this to replace the corpus
    pub min_chars: usize,

    /// Timeout for the generation request (milliseconds)
    pub timeout_ms: u64,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_base: "https://generativelanguage.googleapis.com".to_string(),
            model: "gemini-flash-latest".to_string(),
            api_key_env: strings(&[
                "GEMINI_API_KEY",
                "GOOGLE_GENERATIVE_AI_API_KEY",
                "GOOGLE_API_KEY",
            ]),
            min_chars: 500,
            timeout_ms: 60_000,
        }
    }
}

/// Inbound HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to bind (host:port)
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3000".to_string(),
        }
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}
