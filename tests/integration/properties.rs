//! Invariants checked over a seeded synthetic market.

use std::cmp::Ordering;

use cross_exchange_arb::arbitrage::{
    build_snapshot, scan, CancellationFlag, Confidence, DetectionCycle, WindowReference,
};
use cross_exchange_arb::config::DetectionParams;
use cross_exchange_arb::error::DetectionError;
use cross_exchange_arb::ticks::{PriceTickStore, SyntheticConfig, SyntheticTickSource, TickSource};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use time::Duration;

use super::{btc, synthetic_orchestrator, T0};

const ROUNDS: usize = 25;

/// Run one cycle per synthetic round and collect the non-empty results.
fn simulate(seed: u64, params: &DetectionParams) -> Vec<DetectionCycle> {
    let orchestrator = synthetic_orchestrator();
    let mut source = SyntheticTickSource::new(SyntheticConfig::with_seed(seed, T0));
    let store = PriceTickStore::new();
    let cancel = CancellationFlag::new();
    let mut cycles = Vec::with_capacity(ROUNDS);

    for _ in 0..ROUNDS {
        let now = source.next_timestamp();
        store.append_batch(source.next_batch());
        match orchestrator.run(&store.view(), params, now, &cancel) {
            Ok(cycle) => cycles.push(cycle),
            Err(DetectionError::NoData) => {}
            Err(e) => panic!("unexpected detection error: {e}"),
        }
    }

    cycles
}

#[test]
fn synthetic_feed_produces_opportunities() {
    let cycles = simulate(42, &DetectionParams::new(dec!(0.5), 60));

    assert_eq!(cycles.len(), ROUNDS);
    assert!(cycles.iter().any(|c| !c.opportunities.is_empty()));
}

#[test]
fn no_self_pairs_and_threshold_holds_exactly() {
    for min_profit_pct in [dec!(0.1), dec!(0.5), dec!(1.2)] {
        let threshold = Decimal::ONE + min_profit_pct / dec!(100);

        for cycle in simulate(7, &DetectionParams::new(min_profit_pct, 60)) {
            for opp in &cycle.opportunities {
                let c = &opp.candidate;
                assert_ne!(c.buy_exchange_id, c.sell_exchange_id);
                assert!(c.sell_price > c.buy_price * threshold);
            }
        }
    }
}

#[test]
fn net_profit_is_exact() {
    for cycle in simulate(11, &DetectionParams::new(dec!(0.3), 60)) {
        for opp in &cycle.opportunities {
            let c = &opp.candidate;
            let expected = c.gross_profit
                - c.buy_price * opp.buy_fee / dec!(100)
                - c.sell_price * opp.sell_fee / dec!(100);
            assert_eq!(opp.net_profit, expected);
            assert_eq!(opp.net_profit_pct, opp.net_profit / c.buy_price * dec!(100));
            assert_eq!(opp.confidence, Confidence::from_net_profit_pct(opp.net_profit_pct));
        }
    }
}

#[test]
fn results_are_ranked() {
    for cycle in simulate(3, &DetectionParams::new(dec!(0.2), 60)) {
        for pair in cycle.opportunities.windows(2) {
            assert_ne!(pair[0].candidate.rank(&pair[1].candidate), Ordering::Greater);
            assert!(pair[0].candidate.profit_pct >= pair[1].candidate.profit_pct);
        }
    }
}

#[test]
fn repeated_runs_match() {
    let params = DetectionParams::new(dec!(0.4), 60);

    assert_eq!(simulate(99, &params), simulate(99, &params));
}

#[test]
fn ties_break_by_asset_then_exchanges() {
    let ticks = vec![
        btc("B", dec!(100), T0),
        btc("C", dec!(102), T0),
        btc("A", dec!(100), T0),
        cross_exchange_arb::ticks::PriceTick::new("A", "ETH", dec!(50), dec!(1), T0),
        cross_exchange_arb::ticks::PriceTick::new("B", "ETH", dec!(51), dec!(1), T0),
    ];
    let snapshot =
        build_snapshot(&ticks, Duration::seconds(60), WindowReference::LatestTick).unwrap();

    let order: Vec<(String, String, String)> = scan(&snapshot, dec!(0.5))
        .into_iter()
        .map(|c| (c.asset_id, c.buy_exchange_id, c.sell_exchange_id))
        .collect();

    let row = |a: &str, b: &str, s: &str| (a.to_string(), b.to_string(), s.to_string());
    assert_eq!(
        order,
        vec![
            row("BTC", "A", "C"),
            row("BTC", "B", "C"),
            row("ETH", "A", "B"),
        ]
    );
}

#[test]
fn cutoff_is_inclusive() {
    let anchor = T0 + Duration::seconds(60);
    let ticks = vec![
        btc("A", dec!(100), T0),
        btc("B", dec!(100), T0 - Duration::milliseconds(1)),
        btc("C", dec!(100), anchor),
    ];

    let snapshot =
        build_snapshot(&ticks, Duration::seconds(60), WindowReference::LatestTick).unwrap();

    assert_eq!(snapshot.cutoff(), T0);
    assert!(snapshot.get("A", "BTC").is_some());
    assert!(snapshot.get("B", "BTC").is_none());
    assert!(snapshot.get("C", "BTC").is_some());
}
