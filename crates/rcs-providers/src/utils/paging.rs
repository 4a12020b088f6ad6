//! Marker paging over in-memory collections

use std::str::FromStr;

use rcs_domain::pagination::{Page, PageRequest};

/// Cut one page out of a collection ordered by `key`
///
/// Items whose key is at or before the request marker are skipped; the page
/// gets a next marker when it came back full. Numeric keys compare as
/// numbers, so `10` follows `9`. A marker that does not parse as a key
/// yields an empty final page.
pub fn page_by_key<T, K, F>(mut items: Vec<T>, page: &PageRequest, key: F) -> Page<T>
where
    K: Ord + ToString + FromStr,
    F: Fn(&T) -> K,
{
    let marker = match page.marker.as_deref().map(K::from_str) {
        None => None,
        Some(Ok(marker)) => Some(marker),
        Some(Err(_)) => return Page::last(Vec::new()),
    };
    items.sort_by_key(|item| key(item));
    let remaining = items
        .into_iter()
        .filter(|item| marker.as_ref().is_none_or(|marker| key(item) > *marker));
    let items: Vec<T> = match page.limit {
        Some(limit) => remaining.take(limit).collect(),
        None => remaining.collect(),
    };
    Page::from_full_page(items, page.limit, |item| key(item).to_string())
}
