// Order independence: shuffling same-type events that touch disjoint
// squares changes nothing, and shuffling same-type events for the same
// square still replays them in true ascending block order: the engine
// sorts, it never trusts arrival order.

use sqb_reconcile::{reconcile, SquareTable};
use sqb_schemas::{EventBatch, PixelData, SoldEvent, SquareId, SquareReads, UnderlayEvent};

fn sq(n: u64) -> SquareId {
    SquareId::new(n).unwrap()
}

fn underlay(square: u64, block: u64, log_index: u64, title: &str, fill: u8) -> UnderlayEvent {
    UnderlayEvent {
        square: sq(square),
        block,
        log_index,
        title: title.to_string(),
        href: format!("https://{title}"),
        pixel_data: PixelData::from_bytes([fill; 300]),
    }
}

#[test]
fn shuffled_disjoint_events_produce_identical_state() {
    let events = vec![
        underlay(100, 10, 0, "a", 0x01),
        underlay(200, 11, 0, "b", 0x02),
        underlay(300, 12, 0, "c", 0x03),
        underlay(400, 13, 0, "d", 0x04),
    ];

    let mut start = SquareTable::new();
    for n in [100u64, 200, 300, 400] {
        start.set_underlay_visible(sq(n), true);
    }

    let mut forward = start.clone();
    let batch = EventBatch { underlay: events.clone(), ..EventBatch::default() };
    let report_fwd = reconcile(&mut forward, &batch, &SquareReads::new()).unwrap();

    let mut reversed_events = events;
    reversed_events.reverse();
    let mut reversed = start.clone();
    let batch = EventBatch { underlay: reversed_events, ..EventBatch::default() };
    let report_rev = reconcile(&mut reversed, &batch, &SquareReads::new()).unwrap();

    assert_eq!(forward, reversed);
    assert_eq!(report_fwd, report_rev);
}

#[test]
fn shuffled_same_square_events_replay_in_block_order() {
    let mut start = SquareTable::new();
    start.set_underlay_visible(sq(77), true);

    // Three versions of square 77's underlay, delivered out of order.
    let scrambled = vec![
        underlay(77, 30, 0, "third", 0x33),
        underlay(77, 10, 0, "first", 0x11),
        underlay(77, 20, 0, "second", 0x22),
    ];

    let mut table = start.clone();
    let batch = EventBatch { underlay: scrambled, ..EventBatch::default() };
    reconcile(&mut table, &batch, &SquareReads::new()).unwrap();

    // Block 30 wrote last, whatever order the RPC returned.
    assert_eq!(table.underlay(sq(77)).unwrap().title, "third");
    assert_eq!(table.personalization(sq(77)).unwrap().title, "third");
    assert_eq!(table.personalization(sq(77)).unwrap().updated_block, 30);
}

#[test]
fn same_block_events_break_ties_by_log_index() {
    let mut table = SquareTable::new();
    table.set_underlay_visible(sq(5), true);

    let batch = EventBatch {
        underlay: vec![
            underlay(5, 40, 7, "later-in-block", 0xBB),
            underlay(5, 40, 2, "earlier-in-block", 0xAA),
        ],
        ..EventBatch::default()
    };
    reconcile(&mut table, &batch, &SquareReads::new()).unwrap();

    assert_eq!(table.underlay(sq(5)).unwrap().title, "later-in-block");
}

#[test]
fn sold_order_across_disjoint_squares_is_irrelevant() {
    let batch_fwd = EventBatch {
        sold: vec![
            SoldEvent { square: sq(1), block: 5, log_index: 0 },
            SoldEvent { square: sq(2), block: 6, log_index: 0 },
        ],
        ..EventBatch::default()
    };
    let batch_rev = EventBatch {
        sold: batch_fwd.sold.iter().rev().cloned().collect(),
        ..EventBatch::default()
    };

    let mut a = SquareTable::new();
    let mut b = SquareTable::new();
    reconcile(&mut a, &batch_fwd, &SquareReads::new()).unwrap();
    reconcile(&mut b, &batch_rev, &SquareReads::new()).unwrap();
    assert_eq!(a, b);
}
