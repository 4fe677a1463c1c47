//! The content item carried through the coordinator.
//!
//! Every [`FeedSource`](super::FeedSource) converts its native records into
//! `FeedItem`s, so the coordinator and the presenters never need to know
//! which backend produced a given entry.

use chrono::{DateTime, Utc};
use std::cmp::Ordering;

/// A single entry in a feed snapshot.
///
/// Snapshot order is whatever the source delivered. The [`Ord`] impl is
/// **reverse-chronological** (newest first, undated last) and is only used
/// by sources that need to sort a batch before handing it out.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct FeedItem {
    /// Stable identifier. Push patches match existing entries on this.
    pub id: String,

    /// Headline shown in the list.
    pub title: String,

    /// Optional summary text.
    pub description: Option<String>,

    /// URL of the full content.
    pub link: Option<String>,

    /// Publication timestamp.
    pub published: Option<DateTime<Utc>>,

    /// Label of the source this entry came from.
    pub source_name: String,
}

impl FeedItem {
    /// Minimal entry with only an id and a title; everything else empty.
    pub fn new(id: impl Into<String>, title: impl Into<String>, source_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            link: None,
            published: None,
            source_name: source_name.into(),
        }
    }

    pub fn with_published(mut self, published: DateTime<Utc>) -> Self {
        self.published = Some(published);
        self
    }
}

impl Ord for FeedItem {
    fn cmp(&self, other: &Self) -> Ordering {
        // `None < Some(_)`, so comparing other-to-self puts undated entries last.
        other.published.cmp(&self.published)
    }
}

impl PartialOrd for FeedItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
    }

    #[test]
    fn sorts_newest_first() {
        let mut items = vec![
            FeedItem::new("old", "Old", "t").with_published(at(2024, 1, 1)),
            FeedItem::new("new", "New", "t").with_published(at(2026, 1, 1)),
            FeedItem::new("mid", "Mid", "t").with_published(at(2025, 6, 15)),
        ];
        items.sort();

        let ids: Vec<_> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["new", "mid", "old"]);
    }

    #[test]
    fn undated_entries_sort_last() {
        let mut items = vec![
            FeedItem::new("undated", "U", "t"),
            FeedItem::new("dated", "D", "t").with_published(at(2025, 1, 1)),
        ];
        items.sort();

        assert_eq!(items[0].id, "dated");
        assert_eq!(items[1].id, "undated");
    }

    #[test]
    fn new_leaves_optional_fields_empty() {
        let item = FeedItem::new("a", "A", "src");
        assert!(item.description.is_none());
        assert!(item.link.is_none());
        assert!(item.published.is_none());
        assert_eq!(item.source_name, "src");
    }
}
