use std::cmp::Reverse;
use std::fmt::Write as _;

use chrono::{DateTime, Utc};

use crate::collection::{Collection, Link};
use crate::config::FeedConfig;
use crate::pipeline;

const RSS_DOCS: &str = "https://validator.w3.org/feed/docs/rss2.html";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedItem<'a> {
    pub link: &'a Link,
    pub category: &'a str,
}

pub fn recent_items(collections: &[Collection], limit: usize) -> Vec<FeedItem<'_>> {
    let mut items: Vec<FeedItem<'_>> = collections
        .iter()
        .flat_map(|collection| {
            collection.links.iter().map(move |link| FeedItem {
                link,
                category: &collection.source,
            })
        })
        .collect();
    items.sort_by_cached_key(|item| Reverse(pipeline::parse_date(&item.link.date).timestamp_millis()));
    items.truncate(limit);
    items
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c if c.is_control() && !matches!(c, '\n' | '\r' | '\t') => {}
            c => out.push(c),
        }
    }
    out
}

fn element(out: &mut String, indent: usize, name: &str, value: &str) {
    let _ = writeln!(
        out,
        "{:indent$}<{name}>{}</{name}>",
        "",
        escape(value),
        indent = indent
    );
}

pub fn render(cfg: &FeedConfig, items: &[FeedItem<'_>], now: DateTime<Utc>) -> String {
    let site = cfg.site_url.trim_end_matches('/');
    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
    out.push_str(
        "<rss version=\"2.0\" xmlns:dc=\"http://purl.org/dc/elements/1.1/\">\n",
    );
    out.push_str("  <channel>\n");
    element(&mut out, 4, "title", &cfg.title);
    element(&mut out, 4, "link", site);
    element(&mut out, 4, "description", &cfg.description);
    element(&mut out, 4, "lastBuildDate", &now.to_rfc2822());
    element(&mut out, 4, "docs", RSS_DOCS);
    element(&mut out, 4, "generator", &format!("linkvault {}", crate::VERSION));
    element(&mut out, 4, "language", &cfg.language);
    match (cfg.author_name.is_empty(), cfg.author_link.is_empty()) {
        (false, false) => element(
            &mut out,
            4,
            "dc:creator",
            &format!("{} ({})", cfg.author_name, cfg.author_link),
        ),
        (false, true) => element(&mut out, 4, "dc:creator", &cfg.author_name),
        _ => {}
    }
    out.push_str("    <image>\n");
    element(&mut out, 6, "title", &cfg.title);
    element(&mut out, 6, "url", &format!("{site}/icon.svg"));
    element(&mut out, 6, "link", site);
    out.push_str("    </image>\n");

    for item in items {
        let link = item.link;
        let published = pipeline::try_parse_date(&link.date).unwrap_or(now);
        out.push_str("    <item>\n");
        element(&mut out, 6, "title", &link.title);
        element(&mut out, 6, "link", &link.url);
        element(&mut out, 6, "guid", &link.url);
        element(&mut out, 6, "pubDate", &published.to_rfc2822());
        if !link.description.is_empty() {
            element(&mut out, 6, "description", &link.description);
        }
        element(&mut out, 6, "category", item.category);
        out.push_str("    </item>\n");
    }

    out.push_str("  </channel>\n");
    out.push_str("</rss>\n");
    out
}

pub fn generate(collections: &[Collection], cfg: &FeedConfig, now: DateTime<Utc>) -> String {
    let items = recent_items(collections, cfg.limit);
    tracing::info!(items = items.len(), "rendering feed");
    render(cfg, &items, now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn link(title: &str, url: &str, date: &str) -> Link {
        Link {
            title: title.to_string(),
            url: url.to_string(),
            date: date.to_string(),
            ..Link::default()
        }
    }

    fn collection(source: &str, links: Vec<Link>) -> Collection {
        Collection {
            title: source.to_uppercase(),
            links,
            source: source.to_string(),
        }
    }

    #[test]
    fn keeps_most_recent_across_collections() {
        let collections = vec![
            collection("tools", vec![link("t1", "https://a.io/1", "2024-01-01")]),
            collection(
                "reading",
                vec![
                    link("r1", "https://b.io/1", "2025-01-01"),
                    link("r2", "https://b.io/2", ""),
                    link("r3", "https://b.io/3", "2023-06-01"),
                ],
            ),
        ];
        let items = recent_items(&collections, 3);
        let titles: Vec<&str> = items.iter().map(|i| i.link.title.as_str()).collect();
        assert_eq!(titles, vec!["r1", "t1", "r3"]);
        assert_eq!(items[1].category, "tools");
    }

    #[test]
    fn renders_escaped_items() {
        let mut entry = link("Tom & Jerry <3", "https://a.io/?x=1&y=2", "2024-01-01");
        entry.description = "\"quoted\"".into();
        let collections = vec![collection("fun", vec![entry])];
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
        let xml = generate(&collections, &FeedConfig::default(), now);

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
        assert!(xml.contains("<title>Tom &amp; Jerry &lt;3</title>"));
        assert!(xml.contains("<guid>https://a.io/?x=1&amp;y=2</guid>"));
        assert!(xml.contains("<description>&quot;quoted&quot;</description>"));
        assert!(xml.contains("<category>fun</category>"));
        let published = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert!(xml.contains(&format!("<pubDate>{}</pubDate>", published.to_rfc2822())));
        assert!(xml.trim_end().ends_with("</rss>"));
    }

    #[test]
    fn creator_includes_author_link() {
        let cfg = FeedConfig {
            author_name: "Ada".into(),
            author_link: "https://ada.example".into(),
            ..FeedConfig::default()
        };
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
        let xml = render(&cfg, &[], now);
        assert!(xml.contains("<dc:creator>Ada (https://ada.example)</dc:creator>"));
        assert!(!render(&FeedConfig::default(), &[], now).contains("dc:creator"));
    }

    #[test]
    fn undated_items_use_generation_time() {
        let collections = vec![collection("misc", vec![link("x", "https://a.io", "")])];
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
        let xml = generate(&collections, &FeedConfig::default(), now);
        assert!(xml.contains(&format!("<pubDate>{}</pubDate>", now.to_rfc2822())));
    }
}
