use std::collections::HashSet;

use url::Url;

use crate::collection::Link;

pub fn extract(raw: &str) -> Option<String> {
    let parsed = Url::parse(raw.trim()).ok()?;
    let host = parsed.host_str()?;
    let host = host.strip_prefix("www.").unwrap_or(host);
    if host.is_empty() {
        return None;
    }
    Some(host.to_ascii_lowercase())
}

pub fn facet<'a, I>(links: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a Link>,
{
    let mut seen = HashSet::new();
    let mut domains = Vec::new();
    for link in links {
        if let Some(domain) = extract(&link.url) {
            if seen.insert(domain.clone()) {
                domains.push(domain);
            }
        }
    }
    domains
}

/// Whether `link` is on `domain` or one of its subdomains. Unparseable URLs
/// fall back to a raw substring check.
pub fn matches(link: &Link, domain: &str) -> bool {
    let domain = domain.to_ascii_lowercase();
    match extract(&link.url) {
        Some(host) => host == domain || host.ends_with(&format!(".{domain}")),
        None => link.url.contains(&domain),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(url: &str) -> Link {
        Link {
            url: url.to_string(),
            ..Link::default()
        }
    }

    #[test]
    fn strips_leading_www_only() {
        assert_eq!(extract("https://www.example.com/a").as_deref(), Some("example.com"));
        assert_eq!(extract("https://wwwx.example.com").as_deref(), Some("wwwx.example.com"));
        assert_eq!(extract("https://sub.www.example.com").as_deref(), Some("sub.www.example.com"));
    }

    #[test]
    fn invalid_urls_have_no_domain() {
        assert_eq!(extract("not a url"), None);
        assert_eq!(extract(""), None);
        assert_eq!(extract("mailto:someone@example.com"), None);
    }

    #[test]
    fn facet_is_distinct_in_first_seen_order() {
        let links = vec![
            link("https://b.io/1"),
            link("garbage"),
            link("https://www.a.io"),
            link("https://b.io/2"),
        ];
        assert_eq!(facet(&links), vec!["b.io".to_string(), "a.io".to_string()]);
    }

    #[test]
    fn matching_falls_back_to_substring_for_bad_urls() {
        assert!(matches(&link("https://www.a.io/x"), "a.io"));
        assert!(!matches(&link("https://b.io/a.io"), "a.io"));
        assert!(matches(&link("a.io/broken path"), "a.io"));
    }

    #[test]
    fn subdomains_match_their_parent() {
        assert!(matches(&link("https://blog.example.com/post"), "example.com"));
        assert!(matches(&link("https://a.b.example.com"), "EXAMPLE.com"));
        assert!(!matches(&link("https://notexample.com"), "example.com"));
        assert!(!matches(&link("https://example.com"), "blog.example.com"));
    }
}
