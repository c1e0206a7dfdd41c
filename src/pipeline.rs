use std::cmp::Reverse;
use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::collection::Link;
use crate::domain;

pub const DEFAULT_PAGE_SIZE: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Desc,
    Asc,
}

impl SortOrder {
    pub fn toggled(self) -> Self {
        match self {
            SortOrder::Desc => SortOrder::Asc,
            SortOrder::Asc => SortOrder::Desc,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortOrder::Desc => "Newest first",
            SortOrder::Asc => "Oldest first",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainFilter {
    selected: BTreeSet<String>,
}

impl DomainFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn only<S: Into<String>>(domain: S) -> Self {
        let mut filter = Self::default();
        filter.selected.insert(domain.into());
        filter
    }

    pub fn is_all(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn contains(&self, domain: &str) -> bool {
        self.selected.contains(domain)
    }

    pub fn toggle(&mut self, domain: &str) -> bool {
        if self.selected.remove(domain) {
            false
        } else {
            self.selected.insert(domain.to_string());
            true
        }
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.selected.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    fn admits(&self, link: &Link) -> bool {
        self.is_all() || self.selected.iter().any(|domain| domain::matches(link, domain))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Query<'q> {
    pub domains: &'q DomainFilter,
    pub search: &'q str,
    pub sort: SortOrder,
    pub page_size: usize,
    pub page: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResult<'a> {
    pub items: Vec<&'a Link>,
    pub total: usize,
    pub page: usize,
    pub total_pages: usize,
}

impl PageResult<'_> {
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

/// Parses the ISO-ish dates found in collection files. Anything else is the
/// epoch.
pub fn parse_date(raw: &str) -> DateTime<Utc> {
    try_parse_date(raw).unwrap_or_default()
}

pub fn try_parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn sort_key(link: &Link) -> i64 {
    parse_date(&link.date).timestamp_millis()
}

pub fn filter_by_domain<'a>(links: Vec<&'a Link>, filter: &DomainFilter) -> Vec<&'a Link> {
    if filter.is_all() {
        return links;
    }
    links.into_iter().filter(|link| filter.admits(link)).collect()
}

pub fn filter_by_text<'a>(links: Vec<&'a Link>, search: &str) -> Vec<&'a Link> {
    if search.trim().is_empty() {
        return links;
    }
    let needle = search.to_lowercase();
    links
        .into_iter()
        .filter(|link| {
            link.title.to_lowercase().contains(&needle)
                || link.description.to_lowercase().contains(&needle)
        })
        .collect()
}

/// Stable sort by date; equal dates keep their incoming order.
pub fn sort_by_date(links: &mut [&Link], order: SortOrder) {
    match order {
        SortOrder::Asc => links.sort_by_cached_key(|link| sort_key(link)),
        SortOrder::Desc => links.sort_by_cached_key(|link| Reverse(sort_key(link))),
    }
}

pub fn total_pages(total: usize, page_size: usize) -> usize {
    total.div_ceil(page_size.max(1)).max(1)
}

pub fn clamp_page(page: usize, total: usize, page_size: usize) -> usize {
    page.clamp(1, total_pages(total, page_size))
}

pub fn paginate<T: Copy>(items: &[T], page: usize, page_size: usize) -> (Vec<T>, usize) {
    let page_size = page_size.max(1);
    let page = clamp_page(page, items.len(), page_size);
    let start = (page - 1) * page_size;
    let end = (start + page_size).min(items.len());
    let slice = items.get(start..end).unwrap_or(&[]);
    (slice.to_vec(), page)
}

pub fn run<'a, I>(links: I, query: &Query<'_>) -> PageResult<'a>
where
    I: IntoIterator<Item = &'a Link>,
{
    let links: Vec<&'a Link> = links.into_iter().collect();
    let links = filter_by_domain(links, query.domains);
    let mut links = filter_by_text(links, query.search);
    sort_by_date(&mut links, query.sort);

    let total = links.len();
    let (items, page) = paginate(&links, query.page, query.page_size);
    PageResult {
        items,
        total,
        page,
        total_pages: total_pages(total, query.page_size),
    }
}
