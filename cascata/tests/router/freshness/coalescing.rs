use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use cascata::{CacheStatus, Clock, Freshness, MemoryStore};
use cascata_mock::ManualClock;
use tokio::time::Duration;

const TTL: Duration = Duration::from_secs(60);

fn freshness(coalesce: bool) -> Freshness {
    Freshness::new(
        Arc::new(MemoryStore::default()),
        Arc::new(ManualClock::default()) as Arc<dyn Clock>,
    )
    .with_coalescing(coalesce)
}

async fn slow_fetch(f: &Freshness, calls: &AtomicUsize) -> CacheStatus {
    f.cache_or("calendar:v1:week", TTL, || async {
        calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(100)).await;
        Ok::<_, cascata::CascataError>(vec![1, 2, 3])
    })
    .await
    .unwrap()
    .status
}

#[tokio::test(start_paused = true)]
async fn concurrent_misses_fetch_once_when_coalescing() {
    let f = freshness(true);
    let calls = AtomicUsize::new(0);

    let (a, b, c) = tokio::join!(
        slow_fetch(&f, &calls),
        slow_fetch(&f, &calls),
        slow_fetch(&f, &calls)
    );

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    let mut statuses = vec![a, b, c];
    statuses.sort_by_key(|s| s.as_str());
    assert_eq!(
        statuses,
        vec![CacheStatus::Hit, CacheStatus::Hit, CacheStatus::Miss]
    );
    assert_eq!(f.inflight_keys(), 0, "lock entries are released after use");
}

#[tokio::test(start_paused = true)]
async fn concurrent_misses_each_fetch_without_coalescing() {
    let f = freshness(false);
    let calls = AtomicUsize::new(0);

    let (a, b) = tokio::join!(slow_fetch(&f, &calls), slow_fetch(&f, &calls));

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!((a, b), (CacheStatus::Miss, CacheStatus::Miss));
}

#[tokio::test(start_paused = true)]
async fn coalescing_keys_are_independent() {
    let f = freshness(true);
    let calls = AtomicUsize::new(0);

    let other = async {
        f.cache_or("earnings:v1:x", TTL, || async {
            calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(100)).await;
            Ok::<_, cascata::CascataError>(0u8)
        })
        .await
        .unwrap()
        .status
    };
    let (a, b) = tokio::join!(slow_fetch(&f, &calls), other);

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!((a, b), (CacheStatus::Miss, CacheStatus::Miss));
}
