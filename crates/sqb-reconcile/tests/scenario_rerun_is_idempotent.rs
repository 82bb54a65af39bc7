// Idempotence: reconciling the same fetched batch twice from the same
// starting state yields identical tables and identical reports. A crashed
// run that never advanced the checkpoint is therefore safe to retry in full.

use sqb_reconcile::{reconcile, SquareTable};
use sqb_schemas::{
    EventBatch, PersonalizedEvent, PixelData, SoldEvent, SquareId, SquareRead, SquareReads,
    UnderlayEvent,
};

fn sq(n: u64) -> SquareId {
    SquareId::new(n).unwrap()
}

fn mixed_batch() -> (EventBatch, SquareReads) {
    let batch = EventBatch {
        sold: vec![
            SoldEvent { square: sq(10), block: 100, log_index: 0 },
            SoldEvent { square: sq(11), block: 101, log_index: 0 },
        ],
        underlay: vec![
            UnderlayEvent {
                square: sq(10),
                block: 102,
                log_index: 1,
                title: "U10".to_string(),
                href: "https://u10".to_string(),
                pixel_data: PixelData::from_bytes([0x10; 300]),
            },
            UnderlayEvent {
                square: sq(20),
                block: 99,
                log_index: 0,
                title: "U20".to_string(),
                href: "https://u20".to_string(),
                pixel_data: PixelData::from_bytes([0x20; 300]),
            },
        ],
        personalized: vec![PersonalizedEvent { square: sq(30), block: 103, log_index: 2 }],
    };

    let mut reads = SquareReads::new();
    reads.insert(
        sq(30),
        SquareRead {
            version: 5,
            title: "Main30".to_string(),
            href: "https://m30".to_string(),
            pixel_data: PixelData::from_bytes([0x30; 300]),
        },
    );
    (batch, reads)
}

#[test]
fn same_batch_twice_from_same_start_is_identical() {
    let (batch, reads) = mixed_batch();

    let mut start = SquareTable::new();
    start.set_underlay_visible(sq(20), true);

    let mut first = start.clone();
    let report_a = reconcile(&mut first, &batch, &reads).unwrap();

    let mut second = start.clone();
    let report_b = reconcile(&mut second, &batch, &reads).unwrap();

    assert_eq!(first, second);
    assert_eq!(report_a, report_b);
}

#[test]
fn replaying_onto_the_committed_result_is_stable_for_payload_events() {
    // Sold and underlay events carry their payloads, so replaying them onto
    // an already-committed table converges to the same display state.
    let (batch, reads) = mixed_batch();

    let mut table = SquareTable::new();
    reconcile(&mut table, &batch, &reads).unwrap();
    let committed = table.clone();

    reconcile(&mut table, &batch, &reads).unwrap();
    assert_eq!(table, committed);
}
