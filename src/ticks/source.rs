//! Tick sources feeding the store.

use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use time::{Duration, OffsetDateTime};
use tracing::{debug, instrument};

use super::types::PriceTick;
use crate::error::AppError;

/// Producer of price tick batches.
pub trait TickSource {
    /// Next batch of ticks. An empty batch means the source is idle.
    fn next_batch(&mut self) -> Vec<PriceTick>;
}

/// Replays a recorded JSON array of ticks as a single batch.
#[derive(Debug, Default)]
pub struct JsonFileSource {
    pending: Vec<PriceTick>,
}

impl JsonFileSource {
    /// Read a JSON array of ticks. Values are validated later, at the store.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&raw)
    }

    /// Parse a JSON array of ticks.
    pub fn from_json(raw: &str) -> Result<Self, AppError> {
        let pending: Vec<PriceTick> = serde_json::from_str(raw)?;
        debug!(ticks = pending.len(), "Tick file loaded");
        Ok(Self { pending })
    }
}

impl TickSource for JsonFileSource {
    fn next_batch(&mut self) -> Vec<PriceTick> {
        std::mem::take(&mut self.pending)
    }
}

/// Parameters for [`SyntheticTickSource`].
#[derive(Debug, Clone)]
pub struct SyntheticConfig {
    /// Exchanges that quote every asset.
    pub exchanges: Vec<String>,
    /// Assets with their starting reference price.
    pub assets: Vec<(String, Decimal)>,
    /// Timestamp of the first round.
    pub start: OffsetDateTime,
    /// Time between rounds.
    pub step: Duration,
    /// Maximum per-exchange deviation from the reference price, in basis points.
    pub max_spread_bps: u32,
    /// Maximum reference price drift per round, in basis points.
    pub max_drift_bps: u32,
    /// RNG seed; equal seeds produce equal feeds.
    pub seed: u64,
}

impl SyntheticConfig {
    /// A small default universe with the given seed.
    pub fn with_seed(seed: u64, start: OffsetDateTime) -> Self {
        Self {
            exchanges: ["BINANCE", "COINBASE", "KRAKEN", "BITSTAMP"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            assets: vec![
                ("BTC".to_string(), Decimal::new(30_000, 0)),
                ("ETH".to_string(), Decimal::new(2_000, 0)),
                ("SOL".to_string(), Decimal::new(25, 0)),
            ],
            start,
            step: Duration::seconds(1),
            max_spread_bps: 150,
            max_drift_bps: 20,
            seed,
        }
    }
}

/// Seeded, reproducible tick generator.
///
/// Every round quotes each (exchange, asset) pair once, all at the same
/// timestamp, so the same-instant pairing rule sees every exchange.
#[derive(Debug)]
pub struct SyntheticTickSource {
    config: SyntheticConfig,
    rng: StdRng,
    reference: Vec<Decimal>,
    round: i32,
}

impl SyntheticTickSource {
    /// Create a generator.
    pub fn new(config: SyntheticConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        let reference = config.assets.iter().map(|(_, p)| *p).collect();
        Self {
            config,
            rng,
            reference,
            round: 0,
        }
    }

    /// Timestamp the next round will carry.
    pub fn next_timestamp(&self) -> OffsetDateTime {
        self.config.start + self.config.step * self.round
    }

    /// Generate `rounds` rounds in one vector.
    pub fn take_rounds(&mut self, rounds: usize) -> Vec<PriceTick> {
        (0..rounds).flat_map(|_| self.next_batch()).collect()
    }

}

/// Uniform offset in `[-max_bps, max_bps]` basis points, as a fraction.
fn bps_offset(rng: &mut StdRng, max_bps: u32) -> Decimal {
    let max = i64::from(max_bps);
    Decimal::new(rng.gen_range(-max..=max), 4)
}

impl TickSource for SyntheticTickSource {
    fn next_batch(&mut self) -> Vec<PriceTick> {
        let timestamp = self.next_timestamp();
        let SyntheticConfig {
            assets,
            exchanges,
            max_drift_bps,
            max_spread_bps,
            ..
        } = &self.config;
        let rng = &mut self.rng;
        let mut batch = Vec::with_capacity(assets.len() * exchanges.len());

        for ((asset_id, _), reference) in assets.iter().zip(self.reference.iter_mut()) {
            let drift = bps_offset(rng, *max_drift_bps);
            *reference = (*reference * (Decimal::ONE + drift)).round_dp(8);

            for exchange_id in exchanges {
                let spread = bps_offset(rng, *max_spread_bps);
                let price = (*reference * (Decimal::ONE + spread)).round_dp(2);
                let volume = Decimal::new(rng.gen_range(1..=100_000), 3);

                batch.push(PriceTick::new(
                    exchange_id.clone(),
                    asset_id.clone(),
                    price.max(Decimal::new(1, 2)),
                    volume,
                    timestamp,
                ));
            }
        }

        self.round += 1;
        batch
    }
}
