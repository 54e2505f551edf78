//! Windowed latest-price snapshot.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use time::{Duration, OffsetDateTime, PrimitiveDateTime};
use tracing::debug;

use crate::error::DetectionError;
use crate::ticks::PriceTick;

/// Which instant the freshness window is measured back from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowReference {
    /// The newest tick in the input.
    LatestTick,
    /// A fixed instant; ticks after it are ignored.
    At(OffsetDateTime),
}

/// (exchange, asset) key of a snapshot entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SnapshotKey {
    /// Exchange ID.
    pub exchange_id: String,
    /// Asset ID.
    pub asset_id: String,
}

/// Most recent in-window tick per (exchange, asset).
#[derive(Debug, Clone)]
pub struct Snapshot {
    entries: HashMap<SnapshotKey, PriceTick>,
    cutoff: OffsetDateTime,
    anchor: OffsetDateTime,
}

impl Snapshot {
    /// Entry for a key.
    pub fn get(&self, exchange_id: &str, asset_id: &str) -> Option<&PriceTick> {
        self.entries.get(&SnapshotKey {
            exchange_id: exchange_id.to_string(),
            asset_id: asset_id.to_string(),
        })
    }

    /// All entries, unordered.
    pub fn entries(&self) -> impl Iterator<Item = &PriceTick> {
        self.entries.values()
    }

    /// Oldest timestamp admitted (inclusive).
    pub fn cutoff(&self) -> OffsetDateTime {
        self.cutoff
    }

    /// Instant the window was measured back from.
    pub fn anchor(&self) -> OffsetDateTime {
        self.anchor
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no tick fell inside the window.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Keep, per (exchange, asset), the newest tick with `cutoff <= timestamp <= anchor`.
///
/// `cutoff = anchor - max_age`. On equal timestamps the tick later in input
/// order wins, so the result depends on ingestion order for exact ties.
pub fn build_snapshot<'a, I>(
    ticks: I,
    max_age: Duration,
    reference: WindowReference,
) -> Result<Snapshot, DetectionError>
where
    I: IntoIterator<Item = &'a PriceTick>,
{
    let ticks: Vec<&PriceTick> = ticks.into_iter().collect();

    let anchor = match reference {
        WindowReference::LatestTick => ticks
            .iter()
            .map(|t| t.timestamp)
            .max()
            .ok_or(DetectionError::EmptyInput)?,
        WindowReference::At(now) if ticks.is_empty() => {
            debug!(%now, "No ticks to window");
            return Err(DetectionError::EmptyInput);
        }
        WindowReference::At(now) => now,
    };
    let cutoff = anchor
        .checked_sub(max_age)
        .unwrap_or_else(|| PrimitiveDateTime::MIN.assume_utc());

    let mut entries: HashMap<SnapshotKey, PriceTick> = HashMap::new();
    for tick in ticks {
        if tick.timestamp < cutoff || tick.timestamp > anchor {
            continue;
        }

        let key = SnapshotKey {
            exchange_id: tick.exchange_id.clone(),
            asset_id: tick.asset_id.clone(),
        };
        match entries.entry(key) {
            Entry::Occupied(mut slot) => {
                if tick.timestamp >= slot.get().timestamp {
                    slot.insert(tick.clone());
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(tick.clone());
            }
        }
    }

    debug!(entries = entries.len(), %cutoff, %anchor, "Snapshot built");

    Ok(Snapshot {
        entries,
        cutoff,
        anchor,
    })
}
