//! Append-only price tick store with point-in-time views.

use std::sync::{Arc, PoisonError, RwLock};

use serde::Serialize;
use time::OffsetDateTime;
use tracing::{debug, warn};

use super::types::PriceTick;
use crate::error::TickError;
use crate::metrics;

/// Immutable view of the store at one version.
///
/// Appends made after the view was taken are never visible through it.
#[derive(Debug, Clone, Default)]
pub struct TickView {
    ticks: Arc<Vec<PriceTick>>,
}

impl TickView {
    /// Wrap a fixed tick sequence (ingestion order preserved).
    pub fn from_ticks(ticks: Vec<PriceTick>) -> Self {
        Self {
            ticks: Arc::new(ticks),
        }
    }

    /// All ticks in ingestion order.
    pub fn ticks(&self) -> &[PriceTick] {
        &self.ticks
    }

    /// Ticks observed at or before `instant`, in ingestion order.
    pub fn until(&self, instant: OffsetDateTime) -> impl Iterator<Item = &PriceTick> + '_ {
        self.ticks.iter().filter(move |t| t.timestamp <= instant)
    }

    /// Number of ticks in the view.
    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    /// Whether the view holds no ticks.
    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }
}

/// A tick refused at the ingestion boundary.
#[derive(Debug, Clone, Serialize)]
pub struct RejectedTick {
    /// Position of the tick in the submitted batch.
    pub index: usize,
    /// Why it was refused.
    pub reason: String,
}

/// Outcome of a batch append.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestReport {
    /// Ticks appended.
    pub accepted: usize,
    /// Ticks refused.
    pub rejected: Vec<RejectedTick>,
}

/// Append-only tick store.
///
/// Writers replace the inner `Arc` copy-on-write, so readers holding a
/// [`TickView`] keep scanning a consistent version. An append while a view is
/// held copies the history once. The store is unbounded; retention is left
/// to the operator restarting the service.
#[derive(Debug, Default)]
pub struct PriceTickStore {
    ticks: RwLock<Arc<Vec<PriceTick>>>,
}

impl PriceTickStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and append one tick.
    pub fn append(&self, tick: PriceTick) -> Result<(), TickError> {
        if let Err(e) = tick.validate() {
            warn!(error = %e, "Rejected tick at ingestion");
            metrics::inc_ticks_rejected(1);
            return Err(e);
        }

        let mut guard = self.ticks.write().unwrap_or_else(PoisonError::into_inner);
        Arc::make_mut(&mut guard).push(tick);
        metrics::inc_ticks_ingested(1);
        Ok(())
    }

    /// Validate and append a batch; bad ticks are reported, not fatal.
    pub fn append_batch(&self, batch: impl IntoIterator<Item = PriceTick>) -> IngestReport {
        let mut report = IngestReport::default();
        let mut valid = Vec::new();

        for (index, tick) in batch.into_iter().enumerate() {
            match tick.validate() {
                Ok(()) => valid.push(tick),
                Err(e) => {
                    warn!(index, error = %e, "Rejected tick at ingestion");
                    report.rejected.push(RejectedTick {
                        index,
                        reason: e.to_string(),
                    });
                }
            }
        }

        report.accepted = valid.len();
        if !valid.is_empty() {
            let mut guard = self.ticks.write().unwrap_or_else(PoisonError::into_inner);
            Arc::make_mut(&mut guard).extend(valid);
        }

        metrics::inc_ticks_ingested(report.accepted as u64);
        metrics::inc_ticks_rejected(report.rejected.len() as u64);
        debug!(
            accepted = report.accepted,
            rejected = report.rejected.len(),
            "Tick batch ingested"
        );

        report
    }

    /// Point-in-time view of every tick appended so far.
    pub fn view(&self) -> TickView {
        let guard = self.ticks.read().unwrap_or_else(PoisonError::into_inner);
        TickView {
            ticks: Arc::clone(&guard),
        }
    }

    /// Point-in-time view restricted to ticks observed at or before `instant`.
    pub fn view_until(&self, instant: OffsetDateTime) -> TickView {
        let view = self.view();
        TickView::from_ticks(view.until(instant).cloned().collect())
    }

    /// Most recent tick for an (exchange, asset) key; later ingestion wins ties.
    pub fn latest(&self, exchange_id: &str, asset_id: &str) -> Option<PriceTick> {
        let view = self.view();
        let mut best: Option<&PriceTick> = None;

        for tick in view.ticks() {
            if tick.exchange_id != exchange_id || tick.asset_id != asset_id {
                continue;
            }
            if best.map_or(true, |b| tick.timestamp >= b.timestamp) {
                best = Some(tick);
            }
        }

        best.cloned()
    }

    /// Ticks with `from <= timestamp <= to`, in ingestion order.
    pub fn range(&self, from: OffsetDateTime, to: OffsetDateTime) -> Vec<PriceTick> {
        self.view()
            .ticks()
            .iter()
            .filter(|t| t.timestamp >= from && t.timestamp <= to)
            .cloned()
            .collect()
    }

    /// Number of stored ticks.
    pub fn len(&self) -> usize {
        self.ticks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use time::macros::datetime;

    fn tick(exchange: &str, price: Decimal, ts: OffsetDateTime) -> PriceTick {
        PriceTick::new(exchange, "BTC", price, dec!(1), ts)
    }

    #[test]
    fn append_rejects_invalid_tick() {
        let store = PriceTickStore::new();

        let result = store.append(tick("A", Decimal::ZERO, datetime!(2024-01-01 00:00 UTC)));

        assert!(result.is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn batch_reports_rejections_and_keeps_valid_ticks() {
        let store = PriceTickStore::new();
        let ts = datetime!(2024-01-01 00:00 UTC);

        let report = store.append_batch(vec![
            tick("A", dec!(100), ts),
            tick("B", dec!(-5), ts),
            tick("C", dec!(101), ts),
        ]);

        assert_eq!(report.accepted, 2);
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].index, 1);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn view_is_not_torn_by_later_appends() {
        let store = PriceTickStore::new();
        let ts = datetime!(2024-01-01 00:00 UTC);
        store.append(tick("A", dec!(100), ts)).unwrap();

        let view = store.view();
        store.append(tick("B", dec!(101), ts)).unwrap();

        assert_eq!(view.len(), 1);
        assert_eq!(store.view().len(), 2);
    }

    #[test]
    fn view_until_excludes_later_ticks() {
        let store = PriceTickStore::new();
        store.append(tick("A", dec!(100), datetime!(2024-01-01 00:00 UTC))).unwrap();
        store.append(tick("A", dec!(101), datetime!(2024-01-01 00:05 UTC))).unwrap();

        let view = store.view_until(datetime!(2024-01-01 00:01 UTC));

        assert_eq!(view.len(), 1);
        assert_eq!(view.ticks()[0].price, dec!(100));
    }

    #[test]
    fn latest_prefers_later_ingestion_on_tie() {
        let store = PriceTickStore::new();
        let ts = datetime!(2024-01-01 00:00 UTC);
        store.append(tick("A", dec!(100), ts)).unwrap();
        store.append(tick("A", dec!(102), datetime!(2023-12-31 23:59 UTC))).unwrap();
        store.append(tick("A", dec!(101), ts)).unwrap();

        let latest = store.latest("A", "BTC").unwrap();

        assert_eq!(latest.price, dec!(101));
        assert!(store.latest("Z", "BTC").is_none());
    }

    #[test]
    fn range_is_inclusive() {
        let store = PriceTickStore::new();
        store.append(tick("A", dec!(1), datetime!(2024-01-01 00:00 UTC))).unwrap();
        store.append(tick("A", dec!(2), datetime!(2024-01-01 00:01 UTC))).unwrap();
        store.append(tick("A", dec!(3), datetime!(2024-01-01 00:02 UTC))).unwrap();

        let ticks = store.range(
            datetime!(2024-01-01 00:00 UTC),
            datetime!(2024-01-01 00:01 UTC),
        );

        assert_eq!(ticks.len(), 2);
    }
}
