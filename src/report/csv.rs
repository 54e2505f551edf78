//! CSV export of opportunities.

use std::io::Write;

use rust_decimal::Decimal;
use serde::Serialize;
use time::OffsetDateTime;

use super::OpportunitySink;
use crate::arbitrage::{ArbitrageOpportunity, Confidence};
use crate::error::AppError;

#[derive(Serialize)]
struct CsvRow<'a> {
    #[serde(rename = "Asset")]
    asset: &'a str,
    #[serde(rename = "BuyExchange")]
    buy_exchange: &'a str,
    #[serde(rename = "SellExchange")]
    sell_exchange: &'a str,
    #[serde(rename = "BuyPrice")]
    buy_price: Decimal,
    #[serde(rename = "SellPrice")]
    sell_price: Decimal,
    #[serde(rename = "GrossProfit")]
    gross_profit: Decimal,
    #[serde(rename = "ProfitPct")]
    profit_pct: Decimal,
    #[serde(rename = "NetProfit")]
    net_profit: Decimal,
    #[serde(rename = "NetProfitPct")]
    net_profit_pct: Decimal,
    #[serde(rename = "Confidence")]
    confidence: Confidence,
    #[serde(rename = "AnalysisTimestamp", with = "time::serde::rfc3339")]
    analysis_timestamp: OffsetDateTime,
}

impl<'a> From<&'a ArbitrageOpportunity> for CsvRow<'a> {
    fn from(opp: &'a ArbitrageOpportunity) -> Self {
        Self {
            asset: &opp.candidate.asset_id,
            buy_exchange: &opp.candidate.buy_exchange_id,
            sell_exchange: &opp.candidate.sell_exchange_id,
            buy_price: opp.candidate.buy_price,
            sell_price: opp.candidate.sell_price,
            gross_profit: opp.candidate.gross_profit,
            profit_pct: opp.candidate.profit_pct.round_dp(PCT_DP),
            net_profit: opp.net_profit,
            net_profit_pct: opp.net_profit_pct.round_dp(PCT_DP),
            confidence: opp.confidence,
            analysis_timestamp: opp.analysis_timestamp,
        }
    }
}

/// Decimal places kept for percentage columns.
const PCT_DP: u32 = 6;

/// Writes opportunities as CSV rows; the header is written once, before the first row.
pub struct CsvSink<W: Write> {
    writer: ::csv::Writer<W>,
}

impl<W: Write> CsvSink<W> {
    /// Wrap a writer.
    pub fn new(inner: W) -> Self {
        Self {
            writer: ::csv::Writer::from_writer(inner),
        }
    }

    /// Flush and return the inner writer.
    pub fn into_inner(self) -> Result<W, AppError> {
        self.writer
            .into_inner()
            .map_err(|e| AppError::Io(e.into_error()))
    }
}

impl<W: Write> OpportunitySink for CsvSink<W> {
    fn publish(&mut self, opportunities: &[ArbitrageOpportunity]) -> Result<(), AppError> {
        for opp in opportunities {
            self.writer.serialize(CsvRow::from(opp))?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
