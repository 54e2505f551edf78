//! Pairwise cross-exchange scan over a snapshot.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use tracing::{debug, instrument, warn};

use super::snapshot::Snapshot;
use super::types::ArbitrageCandidate;
use crate::ticks::PriceTick;

/// Emit every (buy, sell) pair of distinct exchanges quoting the same asset at
/// the same instant where `sell.price > buy.price * (1 + min_profit_pct / 100)`.
///
/// Candidates come back in [`ArbitrageCandidate::rank`] order.
#[instrument(skip_all, fields(entries = snapshot.len(), min_profit_pct = %min_profit_pct))]
pub fn scan(snapshot: &Snapshot, min_profit_pct: Decimal) -> Vec<ArbitrageCandidate> {
    let Some(factor) = (min_profit_pct / Decimal::ONE_HUNDRED).checked_add(Decimal::ONE) else {
        warn!(%min_profit_pct, "Profit threshold overflowed, no candidates emitted");
        return Vec::new();
    };

    let mut by_asset: BTreeMap<&str, Vec<&PriceTick>> = BTreeMap::new();
    for entry in snapshot.entries() {
        by_asset.entry(entry.asset_id.as_str()).or_default().push(entry);
    }

    let mut candidates = Vec::new();
    for (asset_id, quotes) in &by_asset {
        if quotes.len() < 2 {
            continue;
        }

        for buy in quotes {
            let Some(threshold) = buy.price.checked_mul(factor) else {
                warn!(asset_id, exchange = %buy.exchange_id, "Threshold overflow, buy leg skipped");
                continue;
            };

            for sell in quotes {
                if buy.exchange_id == sell.exchange_id || buy.timestamp != sell.timestamp {
                    continue;
                }
                if sell.price <= threshold {
                    continue;
                }

                match candidate(buy, sell) {
                    Some(c) => candidates.push(c),
                    None => warn!(
                        asset_id,
                        buy_exchange = %buy.exchange_id,
                        sell_exchange = %sell.exchange_id,
                        buy_price = %buy.price,
                        "Profit percentage undefined, candidate excluded"
                    ),
                }
            }
        }
    }

    candidates.sort_by(|a, b| a.rank(b));
    debug!(
        assets = by_asset.len(),
        candidates = candidates.len(),
        "Pairwise scan complete"
    );

    candidates
}

fn candidate(buy: &PriceTick, sell: &PriceTick) -> Option<ArbitrageCandidate> {
    let gross_profit = sell.price.checked_sub(buy.price)?;
    let profit_pct = gross_profit
        .checked_div(buy.price)?
        .checked_mul(Decimal::ONE_HUNDRED)?;

    Some(ArbitrageCandidate {
        asset_id: buy.asset_id.clone(),
        buy_exchange_id: buy.exchange_id.clone(),
        sell_exchange_id: sell.exchange_id.clone(),
        buy_price: buy.price,
        sell_price: sell.price,
        buy_volume: buy.volume,
        sell_volume: sell.volume,
        gross_profit,
        profit_pct,
        timestamp: buy.timestamp,
    })
}
