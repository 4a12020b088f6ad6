//! Unit tests for marker-based pagination

use futures::StreamExt;
use rcs_domain::{Error, Page, PageRequest, collect_all, paginate};
use std::sync::Mutex;

/// Serves `items` in pages, using the item itself as marker
fn serve(items: &[u32], request: &PageRequest) -> Page<u32> {
    let start = match &request.marker {
        Some(marker) => items
            .iter()
            .position(|i| i.to_string() == *marker)
            .map_or(items.len(), |p| p + 1),
        None => 0,
    };
    let limit = request.limit.unwrap_or(items.len());
    let page: Vec<u32> = items.iter().skip(start).take(limit).copied().collect();
    Page::from_full_page(page, request.limit, u32::to_string)
}

#[tokio::test]
async fn test_collect_all_walks_every_page() {
    let items: Vec<u32> = (1..=7).collect();
    let requests = Mutex::new(Vec::new());

    let all = collect_all(Some(3), |request| {
        requests
            .lock()
            .expect("lock")
            .push(request.marker.clone());
        let page = serve(&items, &request);
        async move { Ok(page) }
    })
    .await
    .expect("collect");

    assert_eq!(all, items);
    let requests = requests.into_inner().expect("lock");
    assert_eq!(
        requests,
        vec![None, Some("3".to_string()), Some("6".to_string())]
    );
}

#[tokio::test]
async fn test_collect_all_exact_multiple_ends_with_empty_page() {
    let items: Vec<u32> = (1..=4).collect();
    let calls = Mutex::new(0);

    let all = collect_all(Some(2), |request| {
        *calls.lock().expect("lock") += 1;
        let page = serve(&items, &request);
        async move { Ok(page) }
    })
    .await
    .expect("collect");

    assert_eq!(all.len(), 4);
    assert_eq!(*calls.lock().expect("lock"), 3);
}

#[tokio::test]
async fn test_collect_all_stops_on_repeated_marker() {
    let calls = Mutex::new(0);

    let all = collect_all(Some(1), |_request| {
        *calls.lock().expect("lock") += 1;
        async move { Ok(Page::new(vec![1_u32], Some("same".to_string()))) }
    })
    .await
    .expect("collect");

    assert_eq!(all, vec![1, 1]);
    assert_eq!(*calls.lock().expect("lock"), 2);
}

#[tokio::test]
async fn test_collect_all_propagates_errors() {
    let result: rcs_domain::Result<Vec<u32>> =
        collect_all(Some(1), |_request| async { Err(Error::service(500, "down")) }).await;
    assert!(matches!(result, Err(Error::Service { status: 500, .. })));
}

#[tokio::test]
async fn test_paginate_is_lazy() {
    let items: Vec<u32> = (1..=10).collect();
    let calls = Mutex::new(0);

    let first_four: Vec<u32> = paginate(Some(2), |request| {
        *calls.lock().expect("lock") += 1;
        let page = serve(&items, &request);
        async move { Ok(page) }
    })
    .take(4)
    .map(|item| item.expect("item"))
    .collect()
    .await;

    assert_eq!(first_four, vec![1, 2, 3, 4]);
    assert_eq!(*calls.lock().expect("lock"), 2);
}

#[test]
fn test_page_map_keeps_marker() {
    let page = Page::new(vec![1, 2], Some("2".to_string())).map(|i| i * 10);
    assert_eq!(page.items(), &[10, 20]);
    assert_eq!(page.next_marker(), Some("2"));
}
