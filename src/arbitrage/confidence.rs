//! Confidence tiers by net profit percentage.

use rust_decimal::Decimal;
use serde::Serialize;
use strum::{Display, EnumString};
use time::OffsetDateTime;

use super::types::{AdjustedCandidate, ArbitrageOpportunity};

/// Coarse bucket summarizing net profit percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum Confidence {
    /// net_profit_pct >= 1.0
    High,
    /// 0.5 <= net_profit_pct < 1.0
    Medium,
    /// net_profit_pct < 0.5
    Low,
}

impl Confidence {
    /// Lower bound (inclusive) of the HIGH tier.
    pub const HIGH_THRESHOLD: Decimal = Decimal::ONE;
    /// Lower bound (inclusive) of the MEDIUM tier.
    pub const MEDIUM_THRESHOLD: Decimal = Decimal::from_parts(5, 0, 0, false, 1);

    /// Tier for a net profit percentage. Bounds are closed at the lower end.
    pub fn from_net_profit_pct(net_profit_pct: Decimal) -> Self {
        if net_profit_pct >= Self::HIGH_THRESHOLD {
            Confidence::High
        } else if net_profit_pct >= Self::MEDIUM_THRESHOLD {
            Confidence::Medium
        } else {
            Confidence::Low
        }
    }

    /// Static label, as used in metrics and exports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::High => "HIGH",
            Confidence::Medium => "MEDIUM",
            Confidence::Low => "LOW",
        }
    }
}

/// Attach a confidence tier and the cycle's analysis instant.
pub fn classify(
    adjusted: AdjustedCandidate,
    analysis_timestamp: OffsetDateTime,
) -> ArbitrageOpportunity {
    let confidence = Confidence::from_net_profit_pct(adjusted.net_profit_pct);

    ArbitrageOpportunity {
        candidate: adjusted.candidate,
        buy_fee: adjusted.buy_fee,
        sell_fee: adjusted.sell_fee,
        net_profit: adjusted.net_profit,
        net_profit_pct: adjusted.net_profit_pct,
        confidence,
        analysis_timestamp,
    }
}
