use std::sync::Arc;

use cascata::{Capability, Cascata, CascataConnector};

use crate::helpers::{builder_with_clock, m_quote};

#[tokio::test]
async fn prefer_for_overrides_registration_order() {
    let paid = m_quote("paid", "1");
    let free = m_quote("free", "2");
    let paid_dyn: Arc<dyn CascataConnector> = paid.clone();
    let free_dyn: Arc<dyn CascataConnector> = free.clone();

    let (b, _clock) = builder_with_clock();
    let cascata = b
        .with_connector(paid_dyn.clone())
        .with_connector(free_dyn.clone())
        .prefer_for(Capability::Quote, &[free_dyn, paid_dyn])
        .build()
        .unwrap();

    let q = cascata.quote("AAPL").await.unwrap();
    assert_eq!(q.price, Some(crate::helpers::d("2")));
    assert_eq!(paid.calls(), 0);
    assert_eq!(free.calls(), 1);
}

#[tokio::test]
async fn unlisted_connectors_keep_registration_order_after_listed_ones() {
    let a = m_quote("a", "0");
    let b = m_quote("b", "0");
    let c = m_quote("c", "3");
    let c_dyn: Arc<dyn CascataConnector> = c.clone();

    let (builder, _clock) = builder_with_clock();
    let cascata = builder
        .with_connector(a.clone())
        .with_connector(b.clone())
        .with_connector(c_dyn.clone())
        .prefer_for(Capability::Quote, &[c_dyn])
        .build()
        .unwrap();

    assert!(cascata.quote("AAPL").await.is_ok());
    assert_eq!((a.calls(), b.calls(), c.calls()), (0, 0, 1));
}

#[test]
fn build_without_connectors_fails() {
    let err = Cascata::builder().build().unwrap_err();
    assert!(matches!(err, cascata::CascataError::InvalidArg(_)));
}
