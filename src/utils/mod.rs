//! Utility functions and helpers.

pub mod http;
pub mod report;
pub mod text;

use url::Url;

/// Resolve a potentially relative URL against a base URL.
pub fn resolve_url(base: &Url, href: &str) -> String {
    base.join(href)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| href.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_url() {
        let base = Url::parse("https://in.indeed.com/jobs?q=python").unwrap();
        assert_eq!(
            resolve_url(&base, "/viewjob?jk=abc"),
            "https://in.indeed.com/viewjob?jk=abc"
        );
        assert_eq!(
            resolve_url(&base, "https://www.naukri.com/job-listings-1"),
            "https://www.naukri.com/job-listings-1"
        );
    }

    #[test]
    fn test_resolve_empty_href_returns_base() {
        let base = Url::parse("https://www.foundit.in/srp/results").unwrap();
        assert_eq!(resolve_url(&base, ""), "https://www.foundit.in/srp/results");
    }
}
