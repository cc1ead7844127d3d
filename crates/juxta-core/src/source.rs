//! Host-supplied item fetching. The engine never owns an HTTP client: hosts
//! implement [`ItemSource`] over their own stack or hand in an async closure.

use std::future::Future;

use chrono::{DateTime, NaiveDateTime};

use crate::error::Result;
use crate::item::Item;

/// A fetched batch plus the collection total the backend reported (e.g. a
/// `X-WP-Total` header). `None` when the source cannot know it.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedItems {
    pub items: Vec<Item>,
    pub total: Option<u64>,
}

impl FetchedItems {
    /// A batch that is the whole collection.
    pub fn complete(items: Vec<Item>) -> FetchedItems {
        let total = Some(items.len() as u64);
        FetchedItems { items, total }
    }
}

/// Runtime-agnostic fetch seam. Any `Fn() -> impl Future` closure is a
/// source, so hosts can plug an async block in directly.
pub trait ItemSource {
    fn fetch_items(&self) -> impl Future<Output = Result<FetchedItems>> + Send;
}

impl<F, Fut> ItemSource for F
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<FetchedItems>> + Send,
{
    fn fetch_items(&self) -> impl Future<Output = Result<FetchedItems>> + Send {
        self()
    }
}

/// Source over a prebuilt list: fixtures, tests, offline snapshots.
#[derive(Debug, Clone, Default)]
pub struct StaticItemSource {
    items: Vec<Item>,
}

impl StaticItemSource {
    pub fn new(items: Vec<Item>) -> StaticItemSource {
        StaticItemSource { items }
    }
}

impl ItemSource for StaticItemSource {
    fn fetch_items(&self) -> impl Future<Output = Result<FetchedItems>> + Send {
        let fetched = FetchedItems::complete(self.items.clone());
        async move { Ok(fetched) }
    }
}

/// Sorts newest first, in place and stably. Items whose date is absent or
/// unparsable sort last instead of poisoning the order.
pub fn sort_by_date_desc(items: &mut [Item]) {
    items.sort_by_key(|item| std::cmp::Reverse(date_stamp(item)));
}

fn date_stamp(item: &Item) -> i64 {
    item.date
        .as_deref()
        .and_then(parse_cms_date)
        .unwrap_or(i64::MIN)
}

/// WordPress emits timezone-less `YYYY-MM-DDTHH:MM:SS`; RFC 3339 covers
/// backends that append an offset.
fn parse_cms_date(date: &str) -> Option<i64> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(date) {
        return Some(parsed.timestamp());
    }
    NaiveDateTime::parse_from_str(date, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc().timestamp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    fn dated(id: i64, date: Option<&str>) -> Item {
        let mut item = Item::new(id, format!("Item {id}"));
        item.date = date.map(str::to_string);
        item
    }

    #[test]
    fn sorts_newest_first_with_undated_items_last() {
        let mut items = vec![
            dated(1, Some("2023-01-01T00:00:00")),
            dated(2, None),
            dated(3, Some("2024-05-12T09:30:00")),
            dated(4, Some("not a date")),
            dated(5, Some("2024-05-12T09:30:00+00:00")),
        ];
        sort_by_date_desc(&mut items);
        let ids: Vec<_> = items.iter().map(|item| item.id.clone()).collect();
        // Items 3 and 5 carry the same instant; the sort is stable, so their
        // fetch order survives. Undated and unparsable sort last, same rule.
        assert_eq!(
            ids,
            vec![
                crate::item::ItemId::Int(3),
                crate::item::ItemId::Int(5),
                crate::item::ItemId::Int(1),
                crate::item::ItemId::Int(2),
                crate::item::ItemId::Int(4),
            ]
        );
    }

    #[test]
    fn static_source_reports_its_length_as_total() {
        let source = StaticItemSource::new(vec![dated(1, None), dated(2, None)]);
        let fetched = block_on(source.fetch_items()).unwrap();
        assert_eq!(fetched.items.len(), 2);
        assert_eq!(fetched.total, Some(2));
    }

    #[test]
    fn closures_are_sources() {
        let source = || async { Ok(FetchedItems::complete(vec![dated(9, None)])) };
        let fetched = block_on(source.fetch_items()).unwrap();
        assert_eq!(fetched.items[0].id, crate::item::ItemId::Int(9));
        assert_eq!(fetched.total, Some(1));
    }
}
