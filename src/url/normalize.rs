use crate::UrlError;
use url::Url;

/// Normalizes raw user input into a fetchable absolute target URL
///
/// # Normalization Steps
///
/// 1. Trim surrounding whitespace; reject empty input
/// 2. Prefix `https://` when no `http://`/`https://` scheme is present
/// 3. Append `/` when the input looks like a directory, i.e. it does not
///    already end in `/` and has no trailing dot-extension such as `.html`
/// 4. Parse the result; reject non-HTTP(S) schemes and host-less URLs
///
/// # Examples
///
/// ```
/// use sumi_harvest::url::normalize_target;
///
/// let url = normalize_target("example.com").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/");
///
/// let url = normalize_target("example.com/page.html").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/page.html");
/// ```
pub fn normalize_target(raw: &str) -> Result<Url, UrlError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(UrlError::Missing);
    }

    let mut candidate = if has_http_scheme(trimmed) {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    if !candidate.ends_with('/') && !has_extension_suffix(&candidate) {
        candidate.push('/');
    }

    let url = Url::parse(&candidate).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingDomain);
    }

    Ok(url)
}

fn has_http_scheme(input: &str) -> bool {
    let lower = input.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// True when the string ends in `.` followed by 2-5 ASCII alphanumerics
fn has_extension_suffix(input: &str) -> bool {
    match input.rsplit_once('.') {
        Some((_, suffix)) => {
            (2..=5).contains(&suffix.len()) && suffix.chars().all(|c| c.is_ascii_alphanumeric())
        }
        None => false,
    }
}

/// Returns the crawl key for a URL: origin plus path, query and fragment dropped
///
/// This is the identity used by the visited set and the work queue.
pub fn page_key(url: &Url) -> String {
    format!("{}{}", url.origin().ascii_serialization(), url.path())
}

/// Checks whether a path ends in one of the given (lowercase) extensions
pub fn has_skipped_extension(path: &str, extensions: &[String]) -> bool {
    let lower = path.to_ascii_lowercase();
    let last_segment = lower.rsplit('/').next().unwrap_or("");
    match last_segment.rsplit_once('.') {
        Some((_, ext)) => extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)),
        None => false,
    }
}
