use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use cascata::{CacheEntry, CacheStatus, CacheStore, CascataError, Clock, Freshness, MemoryStore};
use cascata_mock::ManualClock;
use serde_json::json;
use tokio::time::Duration;

const TTL: Duration = Duration::from_secs(15 * 60);

fn freshness() -> (Freshness, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::default());
    let f = Freshness::new(
        Arc::new(MemoryStore::default()),
        Arc::clone(&clock) as Arc<dyn Clock>,
    );
    (f, clock)
}

async fn fetch_counted(
    f: &Freshness,
    calls: &AtomicUsize,
    result: Result<u32, CascataError>,
    max_age: Duration,
) -> Result<cascata::Cached<u32>, CascataError> {
    f.cache_or("k", max_age, || async {
        calls.fetch_add(1, Ordering::SeqCst);
        result
    })
    .await
}

#[tokio::test]
async fn fresh_entry_is_served_without_fetching() {
    let (f, clock) = freshness();
    let calls = AtomicUsize::new(0);

    let first = fetch_counted(&f, &calls, Ok(1), TTL).await.unwrap();
    assert_eq!(first.status, CacheStatus::Miss);

    clock.advance(Duration::from_secs(5 * 60));
    let second = fetch_counted(&f, &calls, Ok(2), TTL).await.unwrap();
    assert_eq!(second.status, CacheStatus::Hit);
    assert_eq!(second.value, 1);
    assert_eq!(second.fetched_at, first.fetched_at);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn expired_entry_is_refetched_and_overwritten() {
    let (f, clock) = freshness();
    let calls = AtomicUsize::new(0);
    fetch_counted(&f, &calls, Ok(1), TTL).await.unwrap();

    clock.advance(TTL);
    let refreshed = fetch_counted(&f, &calls, Ok(2), TTL).await.unwrap();
    assert_eq!(refreshed.status, CacheStatus::Miss);
    assert_eq!(refreshed.value, 2);
    assert_eq!(refreshed.fetched_at, clock.now());

    let stored = f.store().get("k").await.unwrap();
    assert_eq!(stored.payload, json!(2));
}

#[tokio::test]
async fn failed_refresh_serves_stale_and_keeps_the_entry() {
    let (f, clock) = freshness();
    let calls = AtomicUsize::new(0);
    let first = fetch_counted(&f, &calls, Ok(1), TTL).await.unwrap();

    clock.advance(Duration::from_secs(3600));
    let stale = fetch_counted(&f, &calls, Err(CascataError::unavailable("p", "down")), TTL)
        .await
        .unwrap();
    assert_eq!(stale.status, CacheStatus::Stale);
    assert!(stale.is_degraded());
    assert_eq!(stale.value, 1);
    assert_eq!(stale.fetched_at, first.fetched_at);

    // The failure did not touch the entry, so the next attempt is still a miss.
    let stored = f.store().get("k").await.unwrap();
    assert_eq!(stored.fetched_at, first.fetched_at);
}

#[tokio::test]
async fn failure_with_nothing_cached_is_no_data() {
    let (f, _clock) = freshness();
    let calls = AtomicUsize::new(0);
    let cause = CascataError::unavailable("p", "down");
    let err = fetch_counted(&f, &calls, Err(cause.clone()), TTL)
        .await
        .unwrap_err();
    assert_eq!(err, CascataError::no_data("k", cause));
    assert!(f.store().get("k").await.is_none());
}

#[tokio::test]
async fn zero_max_age_always_refetches() {
    let (f, _clock) = freshness();
    let calls = AtomicUsize::new(0);
    fetch_counted(&f, &calls, Ok(1), Duration::ZERO).await.unwrap();
    let again = fetch_counted(&f, &calls, Ok(2), Duration::ZERO).await.unwrap();
    assert_eq!(again.status, CacheStatus::Miss);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn undecodable_entry_is_treated_as_absent() {
    let (f, clock) = freshness();
    f.store()
        .set(CacheEntry::new("k", json!({"not": "a number"}), clock.now()))
        .await
        .unwrap();
    let calls = AtomicUsize::new(0);
    let got = fetch_counted(&f, &calls, Ok(9), TTL).await.unwrap();
    assert_eq!(got.status, CacheStatus::Miss);
    assert_eq!(got.value, 9);
}

#[tokio::test]
async fn future_dated_entry_counts_as_fresh() {
    let (f, clock) = freshness();
    let ahead = clock.now() + chrono::Duration::minutes(30);
    f.store()
        .set(CacheEntry::new("k", json!(4), ahead))
        .await
        .unwrap();
    let calls = AtomicUsize::new(0);
    let got = fetch_counted(&f, &calls, Ok(5), TTL).await.unwrap();
    assert_eq!(got.status, CacheStatus::Hit);
    assert_eq!(got.value, 4);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}
