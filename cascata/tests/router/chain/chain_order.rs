use std::sync::Arc;

use cascata::{Attempt, AttemptFailure, Capability, CascataConnector, CascataError, ChainOutcome, ProviderChain, Validation};
use tokio::time::Duration;

use crate::helpers::{MockConnector, cascata_with, m_quote, quote_fixture};

#[tokio::test]
async fn first_valid_provider_wins_and_later_ones_are_never_called() {
    let a = MockConnector::builder()
        .name("A")
        .fails_quote(CascataError::unavailable("A", "HTTP 503"))
        .build();
    let b = m_quote("B", "101.25");
    let c = m_quote("C", "999");

    let (cascata, _clock) = cascata_with(&[a.clone(), b.clone(), c.clone()]);
    let q = cascata.quote("aapl").await.unwrap();

    assert_eq!(q.symbol, "AAPL");
    assert_eq!(q.price, Some(crate::helpers::d("101.25")));
    assert_eq!(a.calls(), 1);
    assert_eq!(b.calls(), 1);
    assert_eq!(c.calls(), 0, "providers after the winner must not be invoked");
}

#[tokio::test]
async fn invalid_payload_advances_the_chain() {
    let a = m_quote("A", "0");
    let b = m_quote("B", "42");

    let (cascata, _clock) = cascata_with(&[a.clone(), b]);
    let q = cascata.quote("MSFT").await.unwrap();
    assert_eq!(q.price, Some(crate::helpers::d("42")));
    assert_eq!(a.calls(), 1);
}

#[tokio::test]
async fn exhaustion_reports_attempts_in_chain_order() {
    let a = MockConnector::builder()
        .name("A")
        .fails_quote(CascataError::unavailable("A", "HTTP 429"))
        .build();
    let b = m_quote("B", "0");

    let (cascata, _clock) = cascata_with(&[a, b]);
    let err = cascata.quote("AAPL").await.unwrap_err();
    match err {
        CascataError::AllProvidersExhausted {
            capability,
            attempted,
            errors,
        } => {
            assert_eq!(capability, "quote");
            assert_eq!(attempted, vec!["A", "B"]);
            assert!(matches!(errors[0], CascataError::ProviderUnavailable { .. }));
            assert!(matches!(
                errors[1],
                CascataError::ProviderInvalidResponse { ref provider, .. } if provider == "B"
            ));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn untagged_errors_are_attributed_to_the_provider() {
    let a = MockConnector::builder()
        .name("A")
        .fails_quote(CascataError::Data("decode failed".into()))
        .build();
    let (cascata, _clock) = cascata_with(&[a]);
    let err = cascata.quote("AAPL").await.unwrap_err();
    let flat = err.flatten();
    assert!(matches!(
        &flat[0],
        CascataError::ProviderUnavailable { provider, .. } if provider == "A"
    ));
}

#[tokio::test]
async fn no_capable_provider_is_unsupported() {
    let cal = crate::helpers::m_calendar("cal", vec![]);
    let (cascata, _clock) = cascata_with(&[cal.clone()]);
    let err = cascata.quote("AAPL").await.unwrap_err();
    assert!(matches!(err, CascataError::Unsupported { .. }));
    assert_eq!(cal.calls(), 0);
}

#[tokio::test]
async fn blank_symbol_is_rejected_before_any_call() {
    let a = m_quote("A", "1");
    let (cascata, _clock) = cascata_with(&[a.clone()]);
    let err = cascata.quote("   ").await.unwrap_err();
    assert!(matches!(err, CascataError::InvalidArg(_)));
    assert_eq!(a.calls(), 0);
}

#[tokio::test]
async fn provider_chain_can_be_driven_directly() {
    let a: Arc<dyn CascataConnector> = m_quote("A", "0");
    let b: Arc<dyn CascataConnector> = m_quote("B", "7");
    let chain = ProviderChain::new(Capability::Quote, Duration::from_secs(1));

    let outcome = chain
        .run(&[a, b], |c| {
            c.as_quote_provider()?;
            Some(async move {
                let p = c.as_quote_provider().expect("advertised");
                let q = p.quote("X").await?;
                Ok::<_, CascataError>(p.validate_quote(q))
            })
        })
        .await;

    match outcome {
        ChainOutcome::Success {
            value,
            provider,
            index,
        } => {
            assert_eq!(provider, "B");
            assert_eq!(index, 1);
            assert_eq!(value, quote_fixture("X", "7"));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[tokio::test]
async fn exhausted_outcome_lists_attempts() {
    let a: Arc<dyn CascataConnector> = m_quote("A", "0");
    let chain = ProviderChain::new(Capability::Quote, Duration::from_secs(1));
    let outcome = chain
        .run(&[a], |_c| {
            Some(async { Ok::<_, CascataError>(Validation::<()>::Invalid("empty".into())) })
        })
        .await;
    assert_eq!(outcome.attempted(), vec!["A"]);
    assert_eq!(
        outcome,
        ChainOutcome::Exhausted {
            attempts: vec![Attempt {
                provider: "A",
                failure: AttemptFailure::Invalid("empty".into()),
            }],
        }
    );
}
