//! Orchestrated detection scenarios.

use cross_exchange_arb::arbitrage::{CancellationFlag, Confidence};
use cross_exchange_arb::config::{DetectionParams, WindowAnchor};
use cross_exchange_arb::error::DetectionError;
use cross_exchange_arb::report::{CsvSink, OpportunitySink};
use cross_exchange_arb::ticks::{PriceTick, PriceTickStore};
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;
use time::Duration;

use super::{btc, two_exchange_orchestrator, T0};

fn params() -> DetectionParams {
    DetectionParams::new(dec!(0.5), 60)
}

#[test]
fn buy_low_sell_high_after_fees() {
    let store = PriceTickStore::new();
    store.append_batch(vec![btc("A", dec!(30000), T0), btc("B", dec!(30500), T0)]);

    let cycle = two_exchange_orchestrator()
        .run(&store.view(), &params(), T0, &CancellationFlag::new())
        .unwrap();

    assert_eq!(cycle.candidate_count, 1);
    let opp = &cycle.opportunities[0];
    assert_eq!(opp.candidate.buy_exchange_id, "A");
    assert_eq!(opp.candidate.sell_exchange_id, "B");
    assert_eq!(opp.candidate.gross_profit, dec!(500));
    assert_eq!(opp.candidate.profit_pct.round_dp(3), dec!(1.667));
    assert_eq!(opp.buy_fee, dec!(0.10));
    assert_eq!(opp.sell_fee, dec!(0.35));
    assert_eq!(opp.net_profit, dec!(363.25));
    assert_eq!(opp.net_profit_pct.round_dp(3), dec!(1.211));
    assert_eq!(opp.confidence, Confidence::High);
}

#[test]
fn identical_prices_yield_nothing() {
    let store = PriceTickStore::new();
    store.append_batch(vec![btc("A", dec!(30000), T0), btc("B", dec!(30000), T0)]);

    let cycle = two_exchange_orchestrator()
        .run(&store.view(), &params(), T0, &CancellationFlag::new())
        .unwrap();

    assert_eq!(cycle.candidate_count, 0);
    assert!(cycle.opportunities.is_empty());
}

#[test]
fn all_ticks_stale_signals_no_data() {
    let store = PriceTickStore::new();
    store.append_batch(vec![btc("A", dec!(30000), T0), btc("B", dec!(30500), T0)]);
    let params = params().with_anchor(WindowAnchor::Now);

    let result = two_exchange_orchestrator().run(
        &store.view(),
        &params,
        T0 + Duration::seconds(61),
        &CancellationFlag::new(),
    );

    assert_eq!(result.unwrap_err(), DetectionError::NoData);
}

#[test]
fn quotes_at_different_instants_do_not_pair() {
    let store = PriceTickStore::new();
    store.append_batch(vec![
        btc("A", dec!(30000), T0),
        btc("B", dec!(30500), T0 + Duration::seconds(1)),
    ]);

    let cycle = two_exchange_orchestrator()
        .run(
            &store.view(),
            &params(),
            T0 + Duration::seconds(1),
            &CancellationFlag::new(),
        )
        .unwrap();

    assert_eq!(cycle.snapshot_size, 2);
    assert!(cycle.opportunities.is_empty());
}

#[test]
fn newer_quote_replaces_older_in_window() {
    let store = PriceTickStore::new();
    let t1 = T0 + Duration::seconds(10);
    store.append_batch(vec![
        btc("A", dec!(29000), T0),
        btc("B", dec!(30500), T0),
        btc("A", dec!(30400), t1),
        btc("B", dec!(30450), t1),
    ]);

    let cycle = two_exchange_orchestrator()
        .run(&store.view(), &params(), t1, &CancellationFlag::new())
        .unwrap();

    assert_eq!(cycle.snapshot_size, 2);
    assert!(cycle.opportunities.is_empty());
}

#[test]
fn view_taken_before_append_is_unaffected() {
    let store = PriceTickStore::new();
    store.append_batch(vec![btc("A", dec!(30000), T0), btc("B", dec!(30000), T0)]);
    let view = store.view();

    store.append_batch(vec![btc("B", dec!(31000), T0)]);

    let orchestrator = two_exchange_orchestrator();
    let before = orchestrator
        .run(&view, &params(), T0, &CancellationFlag::new())
        .unwrap();
    let after = orchestrator
        .run(&store.view(), &params(), T0, &CancellationFlag::new())
        .unwrap();

    assert!(before.opportunities.is_empty());
    assert_eq!(after.opportunities.len(), 1);
}

#[test]
fn unknown_exchange_dropped_with_warning_record() {
    let store = PriceTickStore::new();
    store.append_batch(vec![
        btc("A", dec!(30000), T0),
        btc("B", dec!(30500), T0),
        btc("GHOST", dec!(31000), T0),
    ]);

    let cycle = two_exchange_orchestrator()
        .run(&store.view(), &params(), T0, &CancellationFlag::new())
        .unwrap();

    assert_eq!(cycle.opportunities.len(), 1);
    assert_eq!(cycle.skipped.len(), 2);
    assert!(cycle
        .skipped
        .iter()
        .all(|s| s.sell_exchange_id == "GHOST" && s.reason == "unknown_exchange"));
}

#[test]
fn csv_export_of_cycle() {
    let ticks: Vec<PriceTick> = vec![btc("A", dec!(30000), T0), btc("B", dec!(30500), T0)];
    let store = PriceTickStore::new();
    store.append_batch(ticks);
    let cycle = two_exchange_orchestrator()
        .run(&store.view(), &params(), T0, &CancellationFlag::new())
        .unwrap();

    let mut sink = CsvSink::new(Vec::new());
    sink.publish(&cycle.opportunities).unwrap();
    let output = String::from_utf8(sink.into_inner().unwrap()).unwrap();

    assert_eq!(
        output.lines().nth(1).unwrap(),
        "BTC,A,B,30000,30500,500,1.666667,363.25,1.210833,HIGH,2024-01-01T00:00:00Z"
    );
}

#[test]
fn full_store_view_matches_view_bounded_at_now() {
    let store = PriceTickStore::new();
    store.append_batch(vec![
        btc("A", dec!(30000), T0),
        btc("B", dec!(30500), T0),
        btc("A", dec!(31000), T0 + Duration::seconds(5)),
        btc("B", dec!(30000), T0 + Duration::seconds(5)),
    ]);
    let orchestrator = two_exchange_orchestrator();
    let cancel = CancellationFlag::new();

    let full = orchestrator.run(&store.view(), &params(), T0, &cancel).unwrap();
    let bounded = orchestrator
        .run(&store.view_until(T0), &params(), T0, &cancel)
        .unwrap();

    assert_eq!(full, bounded);
    assert_eq!(full.opportunities[0].candidate.buy_exchange_id, "A");
}
