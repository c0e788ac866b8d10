use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use cascata::{
    CacheStatus, Cascata, CascataError, EmptyDefault, SectionRegistry,
};
use serde_json::{Value, json};
use tokio::time::Duration;

use crate::helpers::{AAPL, cascata_with, event, m_quote_map};

const MIN: Duration = Duration::from_secs(60);

/// Registry with a `quotes` section backed by the orchestrator and a
/// `calendar` section whose health is controlled by `calendar_up`.
fn registry(cascata: &Arc<Cascata>, calendar_up: &Arc<AtomicBool>) -> SectionRegistry {
    let c = Arc::clone(cascata);
    let up = Arc::clone(calendar_up);
    SectionRegistry::builder()
        .section("quotes", 15 * MIN, EmptyDefault::Map, move || {
            let c = Arc::clone(&c);
            async move {
                let batch = c.quotes(&[AAPL]).await?;
                serde_json::to_value(batch.quotes).map_err(|e| CascataError::Data(e.to_string()))
            }
        })
        .section("calendar", 60 * MIN, EmptyDefault::List, move || {
            let up = up.load(Ordering::SeqCst);
            async move {
                if up {
                    Ok(json!([event(8, Some("12:30"), "CPI m/m")]))
                } else {
                    Err(CascataError::unavailable("ff", "HTTP 503"))
                }
            }
        })
        .build()
        .unwrap()
}

#[tokio::test]
async fn failing_section_degrades_without_affecting_siblings() {
    let top = m_quote_map("top", &[(AAPL, "190")]);
    let (cascata, _clock) = cascata_with(&[top]);
    let cascata = Arc::new(cascata);
    let calendar_up = Arc::new(AtomicBool::new(false));
    let agg = cascata.aggregator(registry(&cascata, &calendar_up));

    let report = agg.all().await;
    assert_eq!(report.sections.len(), 2);
    assert_eq!(report.sections["calendar"], json!([]));
    assert_eq!(report.degraded, vec!["calendar".to_string()]);
    assert!(report.stale.is_empty());
    assert!(report.sections["quotes"].get(AAPL).is_some());
    assert!(!report.is_complete());
}

#[tokio::test]
async fn sections_are_cached_independently_and_stale_served() {
    let top = m_quote_map("top", &[(AAPL, "190")]);
    let (cascata, clock) = cascata_with(&[top]);
    let cascata = Arc::new(cascata);
    let calendar_up = Arc::new(AtomicBool::new(true));
    let agg = cascata.aggregator(registry(&cascata, &calendar_up));

    assert!(agg.all().await.is_complete());

    // Past the quotes window but inside the calendar window.
    clock.advance(20 * MIN);
    assert_eq!(agg.section("calendar").await.unwrap().status, CacheStatus::Hit);
    assert_eq!(agg.section("quotes").await.unwrap().status, CacheStatus::Miss);

    calendar_up.store(false, Ordering::SeqCst);
    clock.advance(61 * MIN);
    let report = agg.all().await;
    assert_eq!(report.stale, vec!["calendar".to_string()]);
    assert!(report.degraded.is_empty());
    assert_eq!(report.sections["calendar"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn unknown_section_is_an_error() {
    let top = m_quote_map("top", &[]);
    let (cascata, _clock) = cascata_with(&[top]);
    let cascata = Arc::new(cascata);
    let agg = cascata.aggregator(registry(&cascata, &Arc::new(AtomicBool::new(true))));

    let err = agg.section("news").await.unwrap_err();
    assert_eq!(err, CascataError::UnknownSection("news".into()));
}

#[tokio::test(start_paused = true)]
async fn slow_section_is_cut_off_by_the_request_deadline() {
    let (b, _clock) = crate::helpers::builder_with_clock();
    let cascata = b
        .with_connector(m_quote_map("top", &[]))
        .request_timeout(Duration::from_secs(2))
        .build()
        .unwrap();
    let registry = SectionRegistry::builder()
        .section("slow", MIN, EmptyDefault::Map, || async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(json!({"late": true}))
        })
        .section("fast", MIN, EmptyDefault::List, || async { Ok(json!([1])) })
        .build()
        .unwrap();
    let report = cascata.aggregator(registry).all().await;

    assert_eq!(report.sections["slow"], Value::Object(serde_json::Map::new()));
    assert_eq!(report.sections["fast"], json!([1]));
    assert_eq!(report.degraded, vec!["slow".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn deadline_miss_on_refresh_serves_the_cached_section() {
    let (b, clock) = crate::helpers::builder_with_clock();
    let cascata = b
        .with_connector(m_quote_map("top", &[]))
        .request_timeout(Duration::from_secs(2))
        .build()
        .unwrap();
    let slow = Arc::new(AtomicBool::new(false));
    let s = Arc::clone(&slow);
    let registry = SectionRegistry::builder()
        .section("news", MIN, EmptyDefault::List, move || {
            let slow = s.load(Ordering::SeqCst);
            async move {
                if slow {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    Ok(json!(["late"]))
                } else {
                    Ok(json!(["headline"]))
                }
            }
        })
        .build()
        .unwrap();
    let agg = cascata.aggregator(registry);

    let first = agg.all().await;
    assert_eq!(first.sections["news"], json!(["headline"]));

    slow.store(true, Ordering::SeqCst);
    clock.advance(5 * MIN);
    let second = agg.all().await;
    assert_eq!(second.sections["news"], json!(["headline"]));
    assert_eq!(second.stale, vec!["news".to_string()]);
    assert!(second.degraded.is_empty());
}

#[test]
fn registry_rejects_duplicate_and_blank_names() {
    let dup = SectionRegistry::builder()
        .section("a", MIN, EmptyDefault::List, || async { Ok(json!([])) })
        .section("a", MIN, EmptyDefault::List, || async { Ok(json!([])) })
        .build();
    assert!(matches!(dup, Err(CascataError::InvalidArg(_))));

    let blank = SectionRegistry::builder()
        .section(" ", MIN, EmptyDefault::List, || async { Ok(json!([])) })
        .build();
    assert!(blank.is_err());

    let ok = SectionRegistry::builder()
        .section("b", MIN, EmptyDefault::Map, || async { Ok(json!({})) })
        .section("a", MIN, EmptyDefault::List, || async { Ok(json!([])) })
        .build()
        .unwrap();
    assert_eq!(ok.names().collect::<Vec<_>>(), vec!["b", "a"]);
    assert_eq!(ok.get("a").map(|s| s.cache_key()), Some("section:a".to_string()));
}
