use cascata::CascataError;
use tokio::time::Duration;

use crate::helpers::{MockConnector, builder_with_clock, m_quote};

#[tokio::test(start_paused = true)]
async fn hanging_provider_times_out_and_the_chain_advances() {
    let slow = MockConnector::builder()
        .name("slow")
        .delay(Duration::from_secs(3600))
        .returns_quote_ok(crate::helpers::quote_fixture("X", "1"))
        .build();
    let fast = m_quote("fast", "2");

    let (b, _clock) = builder_with_clock();
    let cascata = b
        .with_connector(slow.clone())
        .with_connector(fast.clone())
        .provider_timeout(Duration::from_millis(50))
        .build()
        .unwrap();

    let q = cascata.quote("AAPL").await.unwrap();
    assert_eq!(q.price, Some(crate::helpers::d("2")));
    assert_eq!(slow.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn timeout_is_recorded_as_provider_timeout() {
    let slow = MockConnector::builder()
        .name("slow")
        .delay(Duration::from_secs(3600))
        .returns_quote_ok(crate::helpers::quote_fixture("X", "1"))
        .build();

    let (b, _clock) = builder_with_clock();
    let cascata = b
        .with_connector(slow)
        .provider_timeout(Duration::from_millis(50))
        .build()
        .unwrap();

    let err = cascata.quote("AAPL").await.unwrap_err();
    let flat = err.flatten();
    assert_eq!(flat.len(), 1);
    assert!(matches!(
        &flat[0],
        CascataError::ProviderTimeout { provider, capability } if provider == "slow" && capability == "quote"
    ));
}
