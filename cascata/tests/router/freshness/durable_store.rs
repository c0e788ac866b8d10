use std::sync::Arc;

use cascata::{CacheStatus, Cascata, CascataConnector, Clock, StoreConfig, TieredStore};
use cascata_mock::ManualClock;

use crate::helpers::{AAPL, m_quote_map};

fn build(path: &std::path::Path, clock: Arc<ManualClock>, c: Arc<dyn CascataConnector>) -> Cascata {
    let store = TieredStore::from_config(&StoreConfig {
        sqlite_path: Some(path.to_path_buf()),
        memory_max_entries: 100,
    });
    assert!(store.is_durable());
    Cascata::builder()
        .with_connector(c)
        .store(Arc::new(store))
        .clock(clock as Arc<dyn Clock>)
        .build()
        .unwrap()
}

#[tokio::test]
async fn entries_survive_a_restart_through_the_durable_tier() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.db");
    let clock = Arc::new(ManualClock::default());

    let first = m_quote_map("first", &[(AAPL, "190")]);
    let before = build(&path, Arc::clone(&clock), first.clone());
    assert_eq!(
        before.cached_quotes(&[AAPL]).await.unwrap().status,
        CacheStatus::Miss
    );
    drop(before);

    let second = m_quote_map("second", &[(AAPL, "999")]);
    let after = build(&path, clock, second.clone());
    let served = after.cached_quotes(&[AAPL]).await.unwrap();
    assert_eq!(served.status, CacheStatus::Hit);
    assert_eq!(served.value.quotes[AAPL].price, Some(crate::helpers::d("190")));
    assert_eq!(second.calls(), 0);
}
