use crate::pixel::PixelData;
use crate::square::SquareId;
use std::collections::{BTreeMap, BTreeSet};

/// Inclusive block range for one run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockRange {
    pub from: u64,
    pub to: u64,
}

impl BlockRange {
    /// Range for the next run: `[last_processed+1, min(last_processed +
    /// max_blocks, settled_tip)]`, or `None` when no settled block is left
    /// to process.
    pub fn next_run(last_processed: u64, settled_tip: u64, max_blocks: u64) -> Option<BlockRange> {
        let from = last_processed + 1;
        let to = settled_tip.min(last_processed.saturating_add(max_blocks));
        if to < from {
            return None;
        }
        Some(BlockRange { from, to })
    }

    pub fn len(&self) -> u64 {
        self.to - self.from + 1
    }
}

/// A Square left the issuer: `Transfer(issuer, buyer, squareNumber)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SoldEvent {
    pub square: SquareId,
    pub block: u64,
    pub log_index: u64,
}

/// Main-contract `Personalized(squareNumber)`: a change signal only; the
/// payload of record is read back through the contract accessor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PersonalizedEvent {
    pub square: SquareId,
    pub block: u64,
    pub log_index: u64,
}

/// Underlay-contract `PersonalizedUnderlay`. Unlike the main contract,
/// this event carries the full payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnderlayEvent {
    pub square: SquareId,
    pub block: u64,
    pub log_index: u64,
    pub title: String,
    pub href: String,
    pub pixel_data: PixelData,
}

/// Authoritative current value of one square from the main contract's read
/// accessor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SquareRead {
    pub version: u64,
    pub title: String,
    pub href: String,
    pub pixel_data: PixelData,
}

impl SquareRead {
    /// "Main content is blank": pixel data bit-equal to the all-zero
    /// sentinel AND empty title AND empty href. Anything else is non-blank.
    pub fn is_blank(&self) -> bool {
        self.pixel_data.is_blank() && self.title.is_empty() && self.href.is_empty()
    }
}

/// Prefetched accessor reads for the squares touched by Personalized
/// events in a batch.
pub type SquareReads = BTreeMap<SquareId, SquareRead>;

/// The three event sequences fetched for one run.
///
/// The sequences come from three independent filtered queries, so no global
/// chronological order survives fetching. [`EventBatch::normalize`] restores
/// per-type (block, log index) order; cross-type order is fixed by the
/// reconciliation engine's type precedence, never by arrival order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EventBatch {
    pub sold: Vec<SoldEvent>,
    pub underlay: Vec<UnderlayEvent>,
    pub personalized: Vec<PersonalizedEvent>,
}

impl EventBatch {
    /// Sort each sequence into ascending (block, log index) order.
    pub fn normalize(&mut self) {
        self.sold.sort_by_key(|e| (e.block, e.log_index));
        self.underlay.sort_by_key(|e| (e.block, e.log_index));
        self.personalized.sort_by_key(|e| (e.block, e.log_index));
    }

    pub fn is_empty(&self) -> bool {
        self.total_events() == 0
    }

    pub fn total_events(&self) -> usize {
        self.sold.len() + self.underlay.len() + self.personalized.len()
    }

    /// Distinct squares named by Personalized events; these are the squares
    /// whose authoritative state must be read before reconciliation.
    pub fn personalized_squares(&self) -> BTreeSet<SquareId> {
        self.personalized.iter().map(|e| e.square).collect()
    }
}
