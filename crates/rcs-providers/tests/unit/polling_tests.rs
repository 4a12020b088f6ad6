//! Polling helper tests (virtual time)

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use rcs_domain::error::Error;
use rcs_providers::utils::{Poll, PollOptions, poll_until};

#[tokio::test(start_paused = true)]
async fn test_poll_until_ready() {
    let calls = Arc::new(AtomicU32::new(0));
    let options = PollOptions::new(Duration::from_secs(5), Duration::from_secs(60));

    let check_calls = calls.clone();
    let value = poll_until("counter reaches 3", options, move || {
        let calls = check_calls.clone();
        async move {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(if n >= 3 { Poll::Ready(n) } else { Poll::Pending })
        }
    })
    .await
    .unwrap();

    assert_eq!(value, 3);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn test_poll_until_times_out() {
    let options = PollOptions::new(Duration::from_secs(10), Duration::from_secs(35));
    let err = poll_until("never ready", options, || async { Ok(Poll::<()>::Pending) })
        .await
        .unwrap_err();

    match err {
        Error::Timeout { operation, elapsed } => {
            assert_eq!(operation, "never ready");
            assert!(elapsed <= Duration::from_secs(35));
        }
        other => panic!("expected Timeout, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_check_error_stops_polling() {
    let calls = Arc::new(AtomicU32::new(0));
    let check_calls = calls.clone();
    let err = poll_until("failing", PollOptions::default(), move || {
        let calls = check_calls.clone();
        async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err::<Poll<()>, _>(Error::not_found("load balancer 1"))
        }
    })
    .await
    .unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
