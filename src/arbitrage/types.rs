//! Candidate and opportunity types produced by the detection pipeline.

use std::cmp::Ordering;

use rust_decimal::Decimal;
use serde::Serialize;
use time::OffsetDateTime;

use super::confidence::Confidence;
use crate::error::CandidateError;

/// Raw cross-exchange price gap, before fees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArbitrageCandidate {
    /// Asset quoted on both legs.
    pub asset_id: String,
    /// Exchange to buy on (lower price).
    pub buy_exchange_id: String,
    /// Exchange to sell on (higher price).
    pub sell_exchange_id: String,
    /// Buy leg price.
    pub buy_price: Decimal,
    /// Sell leg price.
    pub sell_price: Decimal,
    /// Buy leg quoted volume.
    pub buy_volume: Decimal,
    /// Sell leg quoted volume.
    pub sell_volume: Decimal,
    /// sell_price - buy_price.
    pub gross_profit: Decimal,
    /// gross_profit / buy_price * 100.
    pub profit_pct: Decimal,
    /// Shared instant of both legs.
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

impl ArbitrageCandidate {
    /// Result ordering: profit_pct descending, then asset, buy and sell exchange ascending.
    pub fn rank(&self, other: &Self) -> Ordering {
        other
            .profit_pct
            .cmp(&self.profit_pct)
            .then_with(|| self.asset_id.cmp(&other.asset_id))
            .then_with(|| self.buy_exchange_id.cmp(&other.buy_exchange_id))
            .then_with(|| self.sell_exchange_id.cmp(&other.sell_exchange_id))
    }
}

/// Candidate with both legs' fees applied, not yet classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdjustedCandidate {
    /// The underlying candidate.
    pub candidate: ArbitrageCandidate,
    /// Effective buy-side fee in percent.
    pub buy_fee: Decimal,
    /// Effective sell-side fee in percent.
    pub sell_fee: Decimal,
    /// Profit after both legs' fees.
    pub net_profit: Decimal,
    /// net_profit / buy_price * 100.
    pub net_profit_pct: Decimal,
}

/// Fee-adjusted, classified opportunity. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArbitrageOpportunity {
    /// The underlying candidate.
    #[serde(flatten)]
    pub candidate: ArbitrageCandidate,
    /// Effective buy-side fee in percent.
    pub buy_fee: Decimal,
    /// Effective sell-side fee in percent.
    pub sell_fee: Decimal,
    /// Profit after both legs' fees.
    pub net_profit: Decimal,
    /// net_profit / buy_price * 100.
    pub net_profit_pct: Decimal,
    /// Confidence tier.
    pub confidence: Confidence,
    /// Reference instant of the cycle that produced this opportunity.
    #[serde(with = "time::serde::rfc3339")]
    pub analysis_timestamp: OffsetDateTime,
}

/// Warning record for a candidate dropped during fee adjustment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedCandidate {
    /// Asset of the dropped candidate.
    pub asset_id: String,
    /// Buy leg exchange.
    pub buy_exchange_id: String,
    /// Sell leg exchange.
    pub sell_exchange_id: String,
    /// Machine-readable reason.
    pub reason: &'static str,
    /// Human-readable detail.
    pub message: String,
}

impl SkippedCandidate {
    /// Build the warning record for a dropped candidate.
    pub fn new(candidate: &ArbitrageCandidate, error: &CandidateError) -> Self {
        Self {
            asset_id: candidate.asset_id.clone(),
            buy_exchange_id: candidate.buy_exchange_id.clone(),
            sell_exchange_id: candidate.sell_exchange_id.clone(),
            reason: error.reason(),
            message: error.to_string(),
        }
    }
}

/// Output of one detection cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetectionCycle {
    /// Opportunities in result order.
    pub opportunities: Vec<ArbitrageOpportunity>,
    /// Candidates dropped during fee adjustment.
    pub skipped: Vec<SkippedCandidate>,
    /// Reference instant the cycle ran against.
    #[serde(with = "time::serde::rfc3339")]
    pub analysis_timestamp: OffsetDateTime,
    /// Entries in the windowed snapshot.
    pub snapshot_size: usize,
    /// Candidates emitted by the scanner.
    pub candidate_count: usize,
}

impl DetectionCycle {
    /// A cycle with no results.
    pub fn empty(analysis_timestamp: OffsetDateTime) -> Self {
        Self {
            opportunities: Vec::new(),
            skipped: Vec::new(),
            analysis_timestamp,
            snapshot_size: 0,
            candidate_count: 0,
        }
    }

    /// Count of opportunities in a confidence tier.
    pub fn count_by_confidence(&self, confidence: Confidence) -> usize {
        self.opportunities
            .iter()
            .filter(|o| o.confidence == confidence)
            .count()
    }
}
