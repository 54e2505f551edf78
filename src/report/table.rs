//! Fixed-width text rendering of a cycle's results.

use std::fmt;
use std::fmt::Write as _;

use rust_decimal::Decimal;

use crate::arbitrage::{ArbitrageOpportunity, Confidence, DetectionCycle};
use crate::catalog::AssetCatalog;

/// Per-tier counts and headline figures for one cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleSummary {
    /// Opportunities emitted.
    pub total: usize,
    /// HIGH tier count.
    pub high: usize,
    /// MEDIUM tier count.
    pub medium: usize,
    /// LOW tier count.
    pub low: usize,
    /// Candidates dropped during fee adjustment.
    pub skipped: usize,
    /// Largest net profit percentage, if any.
    pub best_net_profit_pct: Option<Decimal>,
}

impl CycleSummary {
    /// Summarize a detection cycle.
    pub fn from_cycle(cycle: &DetectionCycle) -> Self {
        Self {
            total: cycle.opportunities.len(),
            high: cycle.count_by_confidence(Confidence::High),
            medium: cycle.count_by_confidence(Confidence::Medium),
            low: cycle.count_by_confidence(Confidence::Low),
            skipped: cycle.skipped.len(),
            best_net_profit_pct: cycle.opportunities.iter().map(|o| o.net_profit_pct).max(),
        }
    }
}

impl fmt::Display for CycleSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} opportunities (HIGH={}, MEDIUM={}, LOW={}) | skipped={} | best net={}%",
            self.total,
            self.high,
            self.medium,
            self.low,
            self.skipped,
            self.best_net_profit_pct
                .map(|d| d.round_dp(3).to_string())
                .unwrap_or_else(|| "N/A".to_string()),
        )
    }
}

/// Render opportunities as an aligned text table, using asset display names.
pub fn render_table(opportunities: &[ArbitrageOpportunity], assets: &AssetCatalog) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<12} {:<10} {:<10} {:>14} {:>14} {:>10} {:>14} {:>10} {:<6}",
        "ASSET", "BUY", "SELL", "BUY PRICE", "SELL PRICE", "GROSS %", "NET PROFIT", "NET %", "CONF"
    );
    let _ = writeln!(out, "{}", "-".repeat(110));

    for opp in opportunities {
        let c = &opp.candidate;
        let _ = writeln!(
            out,
            "{:<12} {:<10} {:<10} {:>14} {:>14} {:>10} {:>14} {:>10} {:<6}",
            assets.display_name(&c.asset_id),
            c.buy_exchange_id,
            c.sell_exchange_id,
            c.buy_price.to_string(),
            c.sell_price.to_string(),
            c.profit_pct.round_dp(3).to_string(),
            opp.net_profit.round_dp(4).to_string(),
            opp.net_profit_pct.round_dp(3).to_string(),
            opp.confidence.as_str(),
        );
    }

    if opportunities.is_empty() {
        let _ = writeln!(out, "(no opportunities)");
    }

    out
}
