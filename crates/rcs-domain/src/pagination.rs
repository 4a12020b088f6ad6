//! Marker-based pagination
//!
//! Every listing in the supported APIs is paged with an opaque marker: the
//! client asks for up to `limit` items after `marker`, and the marker for the
//! following page is (almost always) the identifier of the last item it
//! received. [`collect_all`] and [`paginate`] drive that loop for any page
//! fetcher; the `list_all_*` methods on the service ports are built on them.

use crate::error::{Error, Result};
use futures::stream::{self, Stream, TryStreamExt};
use serde::{Deserialize, Serialize};
use std::future::Future;

/// Parameters for fetching one page of a listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Return items after this marker (exclusive)
    pub marker: Option<String>,
    /// Maximum number of items to return
    pub limit: Option<usize>,
}

impl PageRequest {
    /// First page with the given size limit
    pub fn first(limit: Option<usize>) -> Self {
        Self {
            marker: None,
            limit,
        }
    }

    /// Same request continuing after `marker`
    #[must_use]
    pub fn after<S: Into<String>>(mut self, marker: S) -> Self {
        self.marker = Some(marker.into());
        self
    }
}

/// One page of a listing
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    items: Vec<T>,
    next_marker: Option<String>,
}

impl<T> Page<T> {
    /// Create a page with an explicit next marker
    pub fn new(items: Vec<T>, next_marker: Option<String>) -> Self {
        Self { items, next_marker }
    }

    /// Create the final page of a listing
    pub fn last(items: Vec<T>) -> Self {
        Self::new(items, None)
    }

    /// Create a page whose continuation is derived from its own contents
    ///
    /// A next marker (the key of the last item) is only produced when a limit
    /// was requested and the page came back full; a short page is the last
    /// one.
    pub fn from_full_page<F>(items: Vec<T>, limit: Option<usize>, key: F) -> Self
    where
        F: Fn(&T) -> String,
    {
        let next_marker = match (limit, items.last()) {
            (Some(limit), Some(last)) if limit > 0 && items.len() >= limit => Some(key(last)),
            _ => None,
        };
        Self { items, next_marker }
    }

    /// Items on this page
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Consume the page, returning its items
    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// Marker to request the next page with, if any
    pub fn next_marker(&self) -> Option<&str> {
        self.next_marker.as_deref()
    }

    /// Whether another page may follow
    pub fn has_next_page(&self) -> bool {
        self.next_marker.is_some()
    }

    /// Number of items on this page
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether this page is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Transform every item, keeping the continuation marker
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            next_marker: self.next_marker,
        }
    }
}

impl<T> IntoIterator for Page<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

/// Decide the marker for the next request
///
/// Stops when the page carries no marker, or when the server hands back the
/// marker that was just requested.
fn advance(requested: Option<&str>, returned: Option<&str>) -> Option<String> {
    match returned {
        Some(next) if requested != Some(next) => Some(next.to_string()),
        _ => None,
    }
}

/// Fetch every page of a listing and concatenate the items
///
/// # Arguments
/// * `page_size` - Limit sent with every page request (`None` lets the service decide)
/// * `fetch` - Fetches one page for the given request
///
/// # Example
///
/// ```ignore
/// let groups = collect_all(Some(50), |page| service.list_scaling_groups(page)).await?;
/// ```
pub async fn collect_all<T, F, Fut>(page_size: Option<usize>, mut fetch: F) -> Result<Vec<T>>
where
    F: FnMut(PageRequest) -> Fut,
    Fut: Future<Output = Result<Page<T>>>,
{
    let mut items = Vec::new();
    let mut marker: Option<String> = None;

    loop {
        let page = fetch(PageRequest {
            marker: marker.clone(),
            limit: page_size,
        })
        .await?;
        let next = advance(marker.as_deref(), page.next_marker());
        items.extend(page.into_items());

        match next {
            Some(next) => marker = Some(next),
            None => return Ok(items),
        }
    }
}

/// Stream every item of a listing, fetching pages lazily
///
/// Pages are requested only as the stream is polled, so consumers can stop
/// early without paying for the rest of the listing.
pub fn paginate<T, F, Fut>(page_size: Option<usize>, fetch: F) -> impl Stream<Item = Result<T>>
where
    F: FnMut(PageRequest) -> Fut,
    Fut: Future<Output = Result<Page<T>>>,
{
    stream::try_unfold(
        Some((None::<String>, fetch)),
        move |state| async move {
            let Some((marker, mut fetch)) = state else {
                return Ok::<_, Error>(None);
            };
            let page = fetch(PageRequest {
                marker: marker.clone(),
                limit: page_size,
            })
            .await?;
            let next_state =
                advance(marker.as_deref(), page.next_marker()).map(|next| (Some(next), fetch));
            let items = stream::iter(page.into_items().into_iter().map(Ok::<T, Error>));
            Ok::<_, Error>(Some((items, next_state)))
        },
    )
    .try_flatten()
}
