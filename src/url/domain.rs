use url::Url;

/// Extracts the bare domain from a URL
///
/// The host is lowercased and a leading `www.` is stripped. The result is only
/// used for same-site membership checks and display, never for protocol decisions.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sumi_harvest::url::bare_domain;
///
/// let url = Url::parse("https://www.Example.com/path").unwrap();
/// assert_eq!(bare_domain(&url), "example.com");
/// ```
pub fn bare_domain(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default().to_lowercase();
    match host.strip_prefix("www.") {
        Some(stripped) => stripped.to_string(),
        None => host,
    }
}

/// Checks whether a URL's host contains the bare target domain
///
/// This is a substring check, so subdomains (`blog.example.com`) are members
/// of `example.com`.
pub fn is_same_site(url: &Url, domain: &str) -> bool {
    match url.host_str() {
        Some(host) => !domain.is_empty() && host.to_lowercase().contains(domain),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_www() {
        let url = Url::parse("https://www.example.com/").unwrap();
        assert_eq!(bare_domain(&url), "example.com");
    }

    #[test]
    fn test_only_leading_www_stripped() {
        let url = Url::parse("https://shop.www.example.com/").unwrap();
        assert_eq!(bare_domain(&url), "shop.www.example.com");
    }

    #[test]
    fn test_port_excluded() {
        let url = Url::parse("http://127.0.0.1:8080/").unwrap();
        assert_eq!(bare_domain(&url), "127.0.0.1");
    }

    #[test]
    fn test_same_site_includes_subdomains() {
        let url = Url::parse("https://blog.example.com/post").unwrap();
        assert!(is_same_site(&url, "example.com"));
    }

    #[test]
    fn test_other_site_rejected() {
        let url = Url::parse("https://other.org/").unwrap();
        assert!(!is_same_site(&url, "example.com"));
    }

    #[test]
    fn test_empty_domain_never_matches() {
        let url = Url::parse("https://example.com/").unwrap();
        assert!(!is_same_site(&url, ""));
    }
}
