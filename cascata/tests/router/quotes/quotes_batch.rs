use cascata::CascataError;
use proptest::prelude::*;
use tokio::time::Duration;

use crate::helpers::{AAPL, BAD, MSFT, MockConnector, builder_with_clock, cascata_with, m_quote_map};

#[tokio::test]
async fn batch_omits_unusable_symbols_and_lists_them_as_missing() {
    let top = m_quote_map("top", &[(AAPL, "190"), (BAD, "0")]);
    let backup = m_quote_map("backup", &[(MSFT, "420"), (BAD, "0")]);

    let (cascata, _clock) = cascata_with(&[top, backup]);
    let batch = cascata.quotes(&[AAPL, BAD, MSFT]).await.unwrap();

    assert_eq!(batch.quotes.keys().collect::<Vec<_>>(), vec![AAPL, MSFT]);
    assert_eq!(batch.missing, vec![BAD.to_string()]);
    assert_eq!(batch.quotes[MSFT].price, Some(crate::helpers::d("420")));
}

#[tokio::test]
async fn symbols_are_normalized_and_deduplicated() {
    let top = m_quote_map("top", &[(AAPL, "190")]);
    let (cascata, _clock) = cascata_with(&[top.clone()]);

    let batch = cascata.quotes(&[" aapl", "AAPL", "Aapl "]).await.unwrap();
    assert_eq!(batch.quotes.len(), 1);
    assert!(batch.missing.is_empty());
    assert_eq!(top.calls(), 1);
}

#[tokio::test]
async fn empty_symbol_list_is_invalid() {
    let top = m_quote_map("top", &[]);
    let (cascata, _clock) = cascata_with(&[top]);
    let none: [&str; 0] = [];
    assert!(matches!(
        cascata.quotes(&none).await,
        Err(CascataError::InvalidArg(_))
    ));
    assert!(matches!(
        cascata.quotes(&["", "  "]).await,
        Err(CascataError::InvalidArg(_))
    ));
}

#[tokio::test]
async fn min_batch_quotes_floor_is_enforced() {
    let top = m_quote_map("top", &[(AAPL, "190")]);
    let (b, _clock) = builder_with_clock();
    let cascata = b.with_connector(top).min_batch_quotes(2).build().unwrap();

    let err = cascata.quotes(&[AAPL, MSFT]).await.unwrap_err();
    assert_eq!(
        err,
        CascataError::InsufficientQuotes {
            resolved: 1,
            required: 2
        }
    );
}

#[tokio::test(start_paused = true)]
async fn request_deadline_drops_only_the_slow_symbol() {
    let slow = MockConnector::builder()
        .name("slow")
        .delay(Duration::from_secs(30))
        .with_quote_fn(|sym| {
            if sym == MSFT {
                Ok(crate::helpers::quote_fixture(sym, "420"))
            } else {
                Err(CascataError::not_found(format!("quote for {sym}")))
            }
        })
        .build();
    let fast = m_quote_map("fast", &[(AAPL, "190")]);

    let (b, _clock) = builder_with_clock();
    let cascata = b
        .with_connector(fast)
        .with_connector(slow)
        .provider_timeout(Duration::from_secs(60))
        .request_timeout(Duration::from_secs(1))
        .build()
        .unwrap();

    let batch = cascata.quotes(&[AAPL, MSFT]).await.unwrap();
    assert!(batch.quotes.contains_key(AAPL));
    assert_eq!(batch.missing, vec![MSFT.to_string()]);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn every_requested_symbol_lands_in_exactly_one_bucket(
        picks in proptest::collection::vec(prop_oneof![
            Just("aapl"), Just("AAPL"), Just("msft"), Just("BAD"), Just("zzz"), Just(" ko ")
        ], 1..12)
    ) {
        let top = m_quote_map("top", &[(AAPL, "190"), (MSFT, "420"), ("KO", "60"), (BAD, "0")]);
        let (cascata, _clock) = cascata_with(&[top]);
        let batch = tokio_test::block_on(cascata.quotes(picks.as_slice())).unwrap();

        let mut expected: Vec<String> = picks.iter().map(|s| s.trim().to_ascii_uppercase()).collect();
        expected.sort();
        expected.dedup();

        let mut seen: Vec<String> = batch.quotes.keys().cloned().chain(batch.missing.iter().cloned()).collect();
        seen.sort();
        prop_assert_eq!(seen, expected);
        prop_assert!(batch.quotes.values().all(cascata::Quote::is_sane));
    }
}
