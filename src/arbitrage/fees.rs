//! Fee adjustment: net profit after both legs' trading fees.

use rust_decimal::Decimal;
use tracing::{debug, warn};

use super::types::{AdjustedCandidate, ArbitrageCandidate, SkippedCandidate};
use crate::catalog::ExchangeCatalog;
use crate::error::CandidateError;
use crate::metrics;

/// Result of adjusting a batch of candidates.
#[derive(Debug, Clone, Default)]
pub struct FeeAdjustment {
    /// Candidates with fees applied, in input order.
    pub adjusted: Vec<AdjustedCandidate>,
    /// Warning records for dropped candidates.
    pub skipped: Vec<SkippedCandidate>,
}

/// Apply each exchange's effective fee to its leg.
///
/// A candidate that cannot be adjusted is dropped with a warning record; the
/// rest of the batch continues.
pub fn adjust(candidates: Vec<ArbitrageCandidate>, catalog: &ExchangeCatalog) -> FeeAdjustment {
    let mut result = FeeAdjustment::default();

    for candidate in candidates {
        match adjust_candidate(&candidate, catalog) {
            Ok(fees) => result.adjusted.push(AdjustedCandidate {
                candidate,
                buy_fee: fees.buy_fee,
                sell_fee: fees.sell_fee,
                net_profit: fees.net_profit,
                net_profit_pct: fees.net_profit_pct,
            }),
            Err(e) => {
                warn!(
                    asset = %candidate.asset_id,
                    buy_exchange = %candidate.buy_exchange_id,
                    sell_exchange = %candidate.sell_exchange_id,
                    reason = e.reason(),
                    error = %e,
                    "Candidate skipped during fee adjustment"
                );
                metrics::inc_candidates_skipped(e.reason());
                result.skipped.push(SkippedCandidate::new(&candidate, &e));
            }
        }
    }

    debug!(
        adjusted = result.adjusted.len(),
        skipped = result.skipped.len(),
        "Fee adjustment complete"
    );

    result
}

/// Fee figures for one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegFees {
    /// Effective buy-side fee in percent.
    pub buy_fee: Decimal,
    /// Effective sell-side fee in percent.
    pub sell_fee: Decimal,
    /// gross - buy_price * buy_fee / 100 - sell_price * sell_fee / 100.
    pub net_profit: Decimal,
    /// net_profit / buy_price * 100.
    pub net_profit_pct: Decimal,
}

/// Compute net profit for one candidate.
pub fn adjust_candidate(
    candidate: &ArbitrageCandidate,
    catalog: &ExchangeCatalog,
) -> Result<LegFees, CandidateError> {
    let buy_fee = fee_for(catalog, &candidate.buy_exchange_id, candidate)?;
    let sell_fee = fee_for(catalog, &candidate.sell_exchange_id, candidate)?;

    let arithmetic = |operation: &'static str| CandidateError::Arithmetic {
        asset_id: candidate.asset_id.clone(),
        buy_exchange_id: candidate.buy_exchange_id.clone(),
        sell_exchange_id: candidate.sell_exchange_id.clone(),
        operation,
    };

    let buy_cost = leg_fee(candidate.buy_price, buy_fee).ok_or_else(|| arithmetic("buy_fee"))?;
    let sell_cost = leg_fee(candidate.sell_price, sell_fee).ok_or_else(|| arithmetic("sell_fee"))?;

    let net_profit = candidate
        .gross_profit
        .checked_sub(buy_cost)
        .and_then(|n| n.checked_sub(sell_cost))
        .ok_or_else(|| arithmetic("net_profit"))?;

    let net_profit_pct = net_profit
        .checked_div(candidate.buy_price)
        .and_then(|r| r.checked_mul(Decimal::ONE_HUNDRED))
        .ok_or_else(|| arithmetic("net_profit_pct"))?;

    Ok(LegFees {
        buy_fee,
        sell_fee,
        net_profit,
        net_profit_pct,
    })
}

fn fee_for(
    catalog: &ExchangeCatalog,
    exchange_id: &str,
    candidate: &ArbitrageCandidate,
) -> Result<Decimal, CandidateError> {
    catalog
        .effective_fee(exchange_id)
        .map_err(|_| CandidateError::UnknownExchange {
            exchange_id: exchange_id.to_string(),
            asset_id: candidate.asset_id.clone(),
        })
}

// Fee percentage applied to the leg's price, not to the profit.
fn leg_fee(price: Decimal, fee_pct: Decimal) -> Option<Decimal> {
    price.checked_mul(fee_pct)?.checked_div(Decimal::ONE_HUNDRED)
}
