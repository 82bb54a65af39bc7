// A batch with 101 Personalized events is rejected wholesale: the admission
// gate fires before the engine runs, and every piece of per-square state
// stays identical to its pre-run value.

use sqb_reconcile::{check_admission, reconcile, BatchAdmission, SquareTable, MAX_PERSONALIZED_PER_RUN};
use sqb_schemas::{EventBatch, Personalization, PersonalizedEvent, SquareId, SquareReads};

fn sq(n: u64) -> SquareId {
    SquareId::new(n).unwrap()
}

fn oversized_batch() -> EventBatch {
    EventBatch {
        personalized: (1..=101)
            .map(|i| PersonalizedEvent { square: sq(i), block: i, log_index: 0 })
            .collect(),
        ..EventBatch::default()
    }
}

#[test]
fn oversized_batch_is_rejected_with_evidence() {
    let admission = check_admission(&oversized_batch());
    assert_eq!(
        admission,
        BatchAdmission::Rejected { personalized: 101, ceiling: MAX_PERSONALIZED_PER_RUN }
    );
}

#[test]
fn rejected_run_leaves_state_untouched() {
    let mut table = SquareTable::new();
    table.set_personalization(
        sq(500),
        Personalization {
            version: 4,
            title: "keep me".to_string(),
            href: "https://keep".to_string(),
            updated_block: 33,
        },
    );
    table.set_underlay_visible(sq(501), true);
    let before = table.clone();

    // The pipeline consults the gate first; a rejection means reconcile is
    // never called for this batch.
    let admission = check_admission(&oversized_batch());
    assert!(admission.is_rejected());

    assert_eq!(table, before, "rejection must not mutate any per-square state");
}

#[test]
fn batch_at_the_ceiling_still_reconciles() {
    let mut table = SquareTable::new();
    let batch = EventBatch {
        personalized: (1..=MAX_PERSONALIZED_PER_RUN as u64)
            .map(|i| PersonalizedEvent { square: sq(i), block: i, log_index: 0 })
            .collect(),
        ..EventBatch::default()
    };
    assert!(check_admission(&batch).is_admitted());

    // All reads present and blank: every square resolves to the gray default.
    let mut reads = SquareReads::new();
    for i in 1..=MAX_PERSONALIZED_PER_RUN as u64 {
        reads.insert(
            sq(i),
            sqb_schemas::SquareRead {
                version: 1,
                title: String::new(),
                href: String::new(),
                pixel_data: sqb_schemas::PixelData::BLANK,
            },
        );
    }
    let report = reconcile(&mut table, &batch, &reads).unwrap();
    assert_eq!(report.touched.len(), MAX_PERSONALIZED_PER_RUN);
}
