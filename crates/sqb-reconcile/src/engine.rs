use crate::table::SquareTable;
use sqb_schemas::{
    EventBatch, Personalization, PixelData, ResolvedSquare, SquareId, SquareReads,
    UnderlayPersonalization,
};
use std::collections::BTreeMap;
use std::fmt;

/// A Personalized event named a square with no prefetched accessor read.
///
/// The fetch phase guarantees one read per distinct personalized square;
/// seeing this means the batch and the reads were assembled inconsistently.
/// The run aborts before the checkpoint advances, so the range is safe to
/// retry in full.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReconcileError {
    MissingSquareRead { square: SquareId },
}

impl fmt::Display for ReconcileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReconcileError::MissingSquareRead { square } => {
                write!(f, "no accessor read prefetched for personalized square {square}")
            }
        }
    }
}

impl std::error::Error for ReconcileError {}

/// What one reconciliation run produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Final resolved state per touched square, ascending square id; the
    /// last write within the run wins. This is the publisher's input.
    pub touched: Vec<ResolvedSquare>,
    pub sold_applied: usize,
    pub underlay_applied: usize,
    pub personalized_applied: usize,
}

impl ReconcileReport {
    pub fn is_empty(&self) -> bool {
        self.touched.is_empty()
    }
}

/// Apply one fetched batch to the square table.
///
/// Event types apply in fixed precedence (Sold, then underlay, then
/// main-contract Personalized), each type in ascending (block, log index)
/// order. The three sequences come from independent filtered queries, so no
/// global chronological order survives fetching; the fixed precedence is
/// what makes re-running the same committed batch reproducible. To the same
/// end the engine re-sorts each sequence itself rather than trusting the
/// caller's ordering.
///
/// 1. **Sold**: reset the square to version 0, no title, no href, gray
///    pixels; the underlay becomes visible.
/// 2. **Underlay**: record the underlay unconditionally; project it into
///    the square's display state only while the underlay is visible.
/// 3. **Personalized**: the event is a change signal; the prefetched
///    accessor read is the payload of record. A blank read (all-zero
///    pixels, empty title and href) exposes the underlay (or the gray
///    default if none is recorded), keeping the freshly read version. A
///    non-blank read projects the main contract's own content.
pub fn reconcile(
    table: &mut SquareTable,
    batch: &EventBatch,
    reads: &SquareReads,
) -> Result<ReconcileReport, ReconcileError> {
    let mut resolved: BTreeMap<SquareId, ResolvedSquare> = BTreeMap::new();

    let mut sold: Vec<_> = batch.sold.iter().collect();
    sold.sort_by_key(|e| (e.block, e.log_index));
    for ev in sold {
        table.set_personalization(
            ev.square,
            Personalization {
                version: 0,
                title: String::new(),
                href: String::new(),
                updated_block: ev.block,
            },
        );
        table.set_underlay_visible(ev.square, true);
        resolved.insert(ev.square, ResolvedSquare::unpersonalized(ev.square));
    }

    let mut underlay: Vec<_> = batch.underlay.iter().collect();
    underlay.sort_by_key(|e| (e.block, e.log_index));
    for ev in underlay {
        table.set_underlay(
            ev.square,
            UnderlayPersonalization {
                title: ev.title.clone(),
                href: ev.href.clone(),
                pixel_data: ev.pixel_data,
            },
        );
        if table.underlay_visible(ev.square) {
            // Keep the main contract's version; the underlay has none.
            let version = table.personalization(ev.square).map_or(0, |p| p.version);
            table.set_personalization(
                ev.square,
                Personalization {
                    version,
                    title: ev.title.clone(),
                    href: ev.href.clone(),
                    updated_block: ev.block,
                },
            );
            resolved.insert(
                ev.square,
                ResolvedSquare {
                    id: ev.square,
                    version,
                    title: ev.title.clone(),
                    href: ev.href.clone(),
                    pixel_data: ev.pixel_data,
                },
            );
        }
    }

    let mut personalized: Vec<_> = batch.personalized.iter().collect();
    personalized.sort_by_key(|e| (e.block, e.log_index));
    for ev in personalized {
        let read = reads
            .get(&ev.square)
            .ok_or(ReconcileError::MissingSquareRead { square: ev.square })?;
        let blank = read.is_blank();
        table.set_underlay_visible(ev.square, blank);

        let (title, href, pixel_data) = if blank {
            match table.underlay(ev.square) {
                Some(u) => (u.title.clone(), u.href.clone(), u.pixel_data),
                None => (String::new(), String::new(), PixelData::UNPERSONALIZED),
            }
        } else {
            (read.title.clone(), read.href.clone(), read.pixel_data)
        };

        table.set_personalization(
            ev.square,
            Personalization {
                version: read.version,
                title: title.clone(),
                href: href.clone(),
                updated_block: ev.block,
            },
        );
        resolved.insert(
            ev.square,
            ResolvedSquare {
                id: ev.square,
                version: read.version,
                title,
                href,
                pixel_data,
            },
        );
    }

    Ok(ReconcileReport {
        touched: resolved.into_values().collect(),
        sold_applied: batch.sold.len(),
        underlay_applied: batch.underlay.len(),
        personalized_applied: batch.personalized.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqb_schemas::{PersonalizedEvent, SoldEvent, SquareRead, UnderlayEvent};

    fn sq(n: u64) -> SquareId {
        SquareId::new(n).unwrap()
    }

    fn underlay_event(square: u64, block: u64, title: &str) -> UnderlayEvent {
        UnderlayEvent {
            square: sq(square),
            block,
            log_index: 0,
            title: title.to_string(),
            href: "https://under".to_string(),
            pixel_data: PixelData::from_bytes([0x11; 300]),
        }
    }

    #[test]
    fn underlay_for_untouched_square_is_stored_but_not_surfaced() {
        let mut table = SquareTable::new();
        let batch = EventBatch {
            underlay: vec![underlay_event(7, 10, "early")],
            ..EventBatch::default()
        };

        let report = reconcile(&mut table, &batch, &SquareReads::new()).unwrap();

        assert_eq!(table.underlay(sq(7)).unwrap().title, "early");
        assert!(table.personalization(sq(7)).is_none());
        assert!(!table.underlay_visible(sq(7)));
        // Nothing displayed changed, so nothing is republished.
        assert!(report.is_empty());
    }

    #[test]
    fn same_square_same_type_replays_in_block_order() {
        let mut table = SquareTable::new();
        // Make the underlay visible first.
        table.set_underlay_visible(sq(3), true);

        // Delivered newest-first; the engine must re-sort.
        let batch = EventBatch {
            underlay: vec![
                underlay_event(3, 20, "newer"),
                underlay_event(3, 10, "older"),
            ],
            ..EventBatch::default()
        };
        reconcile(&mut table, &batch, &SquareReads::new()).unwrap();

        assert_eq!(table.underlay(sq(3)).unwrap().title, "newer");
        assert_eq!(table.personalization(sq(3)).unwrap().title, "newer");
        assert_eq!(table.personalization(sq(3)).unwrap().updated_block, 20);
    }

    #[test]
    fn missing_read_aborts_without_partial_output() {
        let mut table = SquareTable::new();
        let batch = EventBatch {
            personalized: vec![PersonalizedEvent { square: sq(5), block: 4, log_index: 0 }],
            ..EventBatch::default()
        };

        let err = reconcile(&mut table, &batch, &SquareReads::new()).unwrap_err();
        assert_eq!(err, ReconcileError::MissingSquareRead { square: sq(5) });
    }

    #[test]
    fn sold_then_underlay_in_one_batch_surfaces_the_underlay() {
        let mut table = SquareTable::new();
        let batch = EventBatch {
            sold: vec![SoldEvent { square: sq(12), block: 5, log_index: 0 }],
            underlay: vec![underlay_event(12, 6, "fresh")],
            ..EventBatch::default()
        };

        let report = reconcile(&mut table, &batch, &SquareReads::new()).unwrap();

        // One touched square; the underlay written after the sale wins.
        assert_eq!(report.touched.len(), 1);
        let out = &report.touched[0];
        assert_eq!(out.title, "fresh");
        assert_eq!(out.version, 0);
        assert_eq!(out.pixel_data, PixelData::from_bytes([0x11; 300]));
    }

    #[test]
    fn report_counts_match_batch() {
        let mut table = SquareTable::new();
        let mut reads = SquareReads::new();
        reads.insert(
            sq(2),
            SquareRead {
                version: 1,
                title: "t".into(),
                href: "h".into(),
                pixel_data: PixelData::from_bytes([0x22; 300]),
            },
        );
        let batch = EventBatch {
            sold: vec![SoldEvent { square: sq(1), block: 1, log_index: 0 }],
            underlay: vec![underlay_event(3, 1, "u")],
            personalized: vec![PersonalizedEvent { square: sq(2), block: 2, log_index: 0 }],
        };

        let report = reconcile(&mut table, &batch, &reads).unwrap();
        assert_eq!(report.sold_applied, 1);
        assert_eq!(report.underlay_applied, 1);
        assert_eq!(report.personalized_applied, 1);
        // Squares 1 and 2 display something new; 3 stays hidden.
        assert_eq!(report.touched.len(), 2);
    }
}
