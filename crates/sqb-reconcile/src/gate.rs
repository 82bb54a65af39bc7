//! Batch admission gate.
//!
//! Every run MUST pass its fetched batch through [`check_admission`] before
//! the engine mutates any per-square state. The gate counts main-contract
//! Personalized events only: each one costs an authoritative contract read
//! plus downstream artifact publishing, and the publisher cannot absorb
//! bursts. Sold and underlay events carry their own payloads and are cheap,
//! so they are not counted.
//!
//! A rejected batch aborts the run with zero mutation; the operator retries
//! with a narrower block range.

use sqb_schemas::EventBatch;

/// Most Personalized events one run will accept.
pub const MAX_PERSONALIZED_PER_RUN: usize = 100;

/// Result of the admission check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BatchAdmission {
    /// Batch is within the ceiling; reconciliation may proceed.
    Admitted,
    /// Batch exceeds the ceiling; the run must abort before any mutation.
    ///
    /// Carries the observed count and the ceiling for the operator message.
    Rejected { personalized: usize, ceiling: usize },
}

impl BatchAdmission {
    pub fn is_admitted(&self) -> bool {
        matches!(self, BatchAdmission::Admitted)
    }

    pub fn is_rejected(&self) -> bool {
        !self.is_admitted()
    }
}

/// Admission check for one fetched batch.
pub fn check_admission(batch: &EventBatch) -> BatchAdmission {
    let personalized = batch.personalized.len();
    if personalized > MAX_PERSONALIZED_PER_RUN {
        BatchAdmission::Rejected {
            personalized,
            ceiling: MAX_PERSONALIZED_PER_RUN,
        }
    } else {
        BatchAdmission::Admitted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqb_schemas::{PersonalizedEvent, SoldEvent, SquareId};

    fn personalized_batch(count: usize) -> EventBatch {
        EventBatch {
            personalized: (0..count)
                .map(|i| PersonalizedEvent {
                    square: SquareId::new(i as u64 % 10_000 + 1).unwrap(),
                    block: i as u64,
                    log_index: 0,
                })
                .collect(),
            ..EventBatch::default()
        }
    }

    #[test]
    fn admits_up_to_the_ceiling() {
        assert!(check_admission(&personalized_batch(0)).is_admitted());
        assert!(check_admission(&personalized_batch(MAX_PERSONALIZED_PER_RUN)).is_admitted());
    }

    #[test]
    fn rejects_past_the_ceiling_with_evidence() {
        let admission = check_admission(&personalized_batch(101));
        assert!(admission.is_rejected());
        assert_eq!(
            admission,
            BatchAdmission::Rejected {
                personalized: 101,
                ceiling: MAX_PERSONALIZED_PER_RUN,
            }
        );
    }

    #[test]
    fn other_event_types_are_not_counted() {
        let batch = EventBatch {
            sold: (0..500)
                .map(|i| SoldEvent {
                    square: SquareId::new(i % 10_000 + 1).unwrap(),
                    block: i,
                    log_index: 0,
                })
                .collect(),
            ..EventBatch::default()
        };
        assert!(check_admission(&batch).is_admitted());
    }
}
