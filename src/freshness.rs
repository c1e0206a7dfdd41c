use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    Fresh,
    Aging,
    Stale,
    Expired,
}

impl Freshness {
    pub fn from_days(days: i64) -> Self {
        match days {
            d if d <= 30 => Freshness::Fresh,
            d if d <= 180 => Freshness::Aging,
            d if d <= 365 => Freshness::Stale,
            _ => Freshness::Expired,
        }
    }
}

pub fn badge(updated: DateTime<Utc>, now: DateTime<Utc>) -> (String, Freshness) {
    let days = (now - updated).num_days().max(0);
    let label = format!("UPDATED {}", updated.format("%-d %b %Y")).to_uppercase();
    (label, Freshness::from_days(days))
}
