//! Exchange and asset reference types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use time::Date;

/// Volume/loyalty tier that discounts an exchange's nominal fee.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, Default,
)]
#[serde(rename_all = "UPPERCASE", try_from = "String")]
#[strum(ascii_case_insensitive, serialize_all = "UPPERCASE")]
pub enum FeeTier {
    /// No discount.
    #[default]
    Standard,
    /// 15% off the nominal rate.
    Pro,
    /// 30% off the nominal rate.
    Vip,
}

impl FeeTier {
    /// Multiplier applied to the nominal fee rate.
    pub fn multiplier(&self) -> Decimal {
        match self {
            FeeTier::Vip => Decimal::new(7, 1),
            FeeTier::Pro => Decimal::new(85, 2),
            FeeTier::Standard => Decimal::ONE,
        }
    }
}

// Feeds spell tiers in any case; route serde through the strum parser.
impl TryFrom<String> for FeeTier {
    type Error = strum::ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Exchange record from the reference feed.
///
/// Only `id`, `fee_rate` and `fee_tier` feed the engine; the rest is passthrough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exchange {
    /// Unique exchange identifier.
    pub id: String,
    /// Nominal taker fee in percent (0.10 = 0.10%).
    pub fee_rate: Decimal,
    /// Fee discount tier.
    #[serde(default)]
    pub fee_tier: FeeTier,
    /// Country of incorporation.
    #[serde(default)]
    pub country: Option<String>,
    /// Launch date.
    #[serde(default)]
    pub launch_date: Option<Date>,
    /// Whether fiat on-ramps are offered.
    #[serde(default)]
    pub has_fiat: Option<bool>,
}

impl Exchange {
    /// Create an exchange with only the fields the engine uses.
    pub fn new(id: impl Into<String>, fee_rate: Decimal, fee_tier: FeeTier) -> Self {
        Self {
            id: id.into(),
            fee_rate,
            fee_tier,
            country: None,
            launch_date: None,
            has_fiat: None,
        }
    }

    /// Fee rate after the tier discount, in percent.
    pub fn effective_fee(&self) -> Decimal {
        self.fee_rate * self.fee_tier.multiplier()
    }
}

/// Asset record from the reference feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    /// Unique asset identifier (ticker).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Market capitalisation, if known.
    #[serde(default)]
    pub market_cap: Option<Decimal>,
}

impl Asset {
    /// Create an asset record.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            market_cap: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::str::FromStr;

    #[test]
    fn tier_multipliers() {
        assert_eq!(FeeTier::Vip.multiplier(), dec!(0.7));
        assert_eq!(FeeTier::Pro.multiplier(), dec!(0.85));
        assert_eq!(FeeTier::Standard.multiplier(), dec!(1));
    }

    #[test]
    fn vip_effective_fee() {
        let exchange = Exchange::new("B", dec!(0.50), FeeTier::Vip);
        assert_eq!(exchange.effective_fee(), dec!(0.35));
    }

    #[test]
    fn fee_tier_parses_any_case() {
        assert_eq!(FeeTier::from_str("vip").unwrap(), FeeTier::Vip);
        assert_eq!(FeeTier::from_str("PRO").unwrap(), FeeTier::Pro);
        assert_eq!(FeeTier::from_str("Standard").unwrap(), FeeTier::Standard);
        assert!(FeeTier::from_str("GOLD").is_err());
    }

    #[test]
    fn exchange_feed_accepts_mixed_case_tiers() {
        let json = r#"[
            {"id": "A", "fee_rate": 0.10, "fee_tier": "vip"},
            {"id": "B", "fee_rate": 0.20, "fee_tier": "Pro"},
            {"id": "C", "fee_rate": 0.30, "fee_tier": "standard"}
        ]"#;

        let exchanges: Vec<Exchange> = serde_json::from_str(json).unwrap();

        let tiers: Vec<FeeTier> = exchanges.iter().map(|e| e.fee_tier).collect();
        assert_eq!(tiers, vec![FeeTier::Vip, FeeTier::Pro, FeeTier::Standard]);
        assert_eq!(serde_json::to_string(&FeeTier::Vip).unwrap(), "\"VIP\"");
    }

    #[test]
    fn exchange_feed_rejects_unknown_tier() {
        let json = r#"[{"id": "A", "fee_rate": 0.10, "fee_tier": "gold"}]"#;

        assert!(serde_json::from_str::<Vec<Exchange>>(json).is_err());
    }

    #[test]
    fn exchange_feed_passthrough_fields_are_optional() {
        let json = r#"[
            {"id": "A", "fee_rate": "0.10", "fee_tier": "STANDARD"},
            {"id": "B", "fee_rate": 0.5, "fee_tier": "VIP", "country": "MT",
             "launch_date": "2017-07-14", "has_fiat": true}
        ]"#;

        let exchanges: Vec<Exchange> = serde_json::from_str(json).unwrap();

        assert_eq!(exchanges.len(), 2);
        assert_eq!(exchanges[0].fee_tier, FeeTier::Standard);
        assert_eq!(exchanges[1].country.as_deref(), Some("MT"));
        assert_eq!(exchanges[1].effective_fee(), dec!(0.35));
    }
}
