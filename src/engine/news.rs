use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use log::warn;
use serde_json::Value;

use crate::engine::models::NewsItem;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NewsDate {
    pub day: u32,
    /// 1-based month, localized by the renderer.
    pub month: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NewsCardKind {
    Article,
    NoNews,
    FetchFailed,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewsCard {
    pub kind: NewsCardKind,
    pub title: String,
    pub author: Option<String>,
    pub body: Vec<String>,
    pub date: Option<NewsDate>,
}

impl NewsCard {
    fn fallback(kind: NewsCardKind) -> Self {
        Self {
            kind,
            title: String::new(),
            author: None,
            body: Vec::new(),
            date: Some(NewsDate { day: 1, month: 1 }),
        }
    }

    fn article(item: &NewsItem) -> Self {
        let date = parse_news_date(&item.publish_date);
        if date.is_none() {
            warn!(
                "news: unreadable publish date {:?} on '{}'",
                item.publish_date, item.title
            );
        }
        let author = item.author.trim();
        Self {
            kind: NewsCardKind::Article,
            title: item.title.clone(),
            author: (!author.is_empty()).then(|| author.to_owned()),
            body: item.content.lines().map(str::to_owned).collect(),
            date,
        }
    }
}

/// Fully redrawn feed; each refresh replaces the previous one.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NewsFeed {
    pub cards: Vec<NewsCard>,
}

impl NewsFeed {
    pub fn from_result(result: Result<Vec<NewsItem>, String>) -> Self {
        let cards = match result {
            Ok(items) if !items.is_empty() => items.iter().map(NewsCard::article).collect(),
            Ok(_) => vec![NewsCard::fallback(NewsCardKind::NoNews)],
            Err(err) => {
                warn!("news: fetch failed: {err}");
                vec![NewsCard::fallback(NewsCardKind::FetchFailed)]
            }
        };
        Self { cards }
    }

    pub fn articles(&self) -> impl Iterator<Item = &NewsCard> {
        self.cards
            .iter()
            .filter(|card| card.kind == NewsCardKind::Article)
    }
}

/// Day and month of a publish date given as a string or epoch milliseconds.
pub fn parse_news_date(value: &Value) -> Option<NewsDate> {
    let date = match value {
        Value::Number(number) => number
            .as_i64()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .map(|dt| dt.date_naive()),
        Value::String(raw) => parse_date_str(raw.trim()),
        _ => None,
    }?;
    Some(NewsDate {
        day: date.day(),
        month: date.month(),
    })
}

fn parse_date_str(raw: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.date_naive());
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.date());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}
