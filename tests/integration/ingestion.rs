//! Reference data and recorded tick files through the full pipeline.

use std::sync::Arc;

use cross_exchange_arb::arbitrage::{CancellationFlag, Confidence, DetectionOrchestrator};
use cross_exchange_arb::catalog::{AssetCatalog, ExchangeCatalog};
use cross_exchange_arb::config::DetectionParams;
use cross_exchange_arb::report::render_table;
use cross_exchange_arb::ticks::{JsonFileSource, PriceTickStore, TickSource};
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;

use super::T0;

#[test]
fn sample_data_end_to_end() {
    let exchanges = ExchangeCatalog::from_json_file("data/exchanges.json").unwrap();
    let assets = AssetCatalog::from_json_file("data/assets.json").unwrap();
    let store = PriceTickStore::new();
    let report = store.append_batch(JsonFileSource::open("data/ticks.json").unwrap().next_batch());
    assert_eq!(report.accepted, 8);

    let cycle = DetectionOrchestrator::new(Arc::new(exchanges))
        .run(
            &store.view(),
            &DetectionParams::new(dec!(0.5), 60),
            T0,
            &CancellationFlag::new(),
        )
        .unwrap();

    let legs: Vec<(&str, &str, &str)> = cycle
        .opportunities
        .iter()
        .map(|o| {
            (
                o.candidate.asset_id.as_str(),
                o.candidate.buy_exchange_id.as_str(),
                o.candidate.sell_exchange_id.as_str(),
            )
        })
        .collect();
    assert_eq!(
        legs,
        vec![
            ("BTC", "BINANCE", "COINBASE"),
            ("BTC", "BITSTAMP", "COINBASE"),
            ("BTC", "KRAKEN", "COINBASE"),
            ("ETH", "BINANCE", "KRAKEN"),
        ]
    );

    let best = &cycle.opportunities[0];
    assert_eq!(best.buy_fee, dec!(0.07));
    assert_eq!(best.net_profit, dec!(326.5));
    assert_eq!(best.confidence, Confidence::High);

    let eth = &cycle.opportunities[3];
    assert_eq!(eth.net_profit, dec!(7.15127));
    assert_eq!(eth.confidence, Confidence::Low);

    let table = render_table(&cycle.opportunities, &assets);
    assert!(table.contains("Bitcoin"));
    assert!(table.contains("Ethereum"));
}

#[test]
fn invalid_ticks_are_reported_and_skipped() {
    let raw = r#"[
        {"exchange_id": "A", "asset_id": "BTC", "price": "30000", "volume": "1",
         "timestamp": "2024-01-01T00:00:00Z"},
        {"exchange_id": "B", "asset_id": "BTC", "price": "0", "volume": "1",
         "timestamp": "2024-01-01T00:00:00Z"},
        {"exchange_id": "B", "asset_id": "BTC", "price": "30500", "volume": "-2",
         "timestamp": "2024-01-01T00:00:00Z"},
        {"exchange_id": "", "asset_id": "BTC", "price": "30500", "volume": "1",
         "timestamp": "2024-01-01T00:00:00Z"}
    ]"#;
    let store = PriceTickStore::new();

    let report = store.append_batch(JsonFileSource::from_json(raw).unwrap().next_batch());

    assert_eq!(report.accepted, 1);
    let indexes: Vec<usize> = report.rejected.iter().map(|r| r.index).collect();
    assert_eq!(indexes, vec![1, 2, 3]);
    assert_eq!(store.len(), 1);
}

#[test]
fn duplicate_exchange_in_reference_feed_is_rejected() {
    let dir = std::env::temp_dir().join(format!("arb-catalog-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("exchanges.json");
    std::fs::write(
        &path,
        r#"[{"id":"A","fee_rate":0.1},{"id":"A","fee_rate":0.2,"fee_tier":"VIP"}]"#,
    )
    .unwrap();

    let result = ExchangeCatalog::from_json_file(&path);

    assert!(result.is_err());
    std::fs::remove_dir_all(&dir).ok();
}
