//! sqb-reconcile
//!
//! Deterministic core: decides what every touched Square displays after a
//! fetched batch of events.
//!
//! Architectural decisions:
//! - Fixed type precedence (Sold, then underlay, then main-contract
//!   Personalized), each type replayed in ascending (block, log index)
//!   order, never the incidental order the RPC returned.
//! - The main contract's Personalized event is a change signal only; the
//!   authoritative payload is the prefetched accessor read.
//! - Admission gate rejects oversized batches before any mutation.
//!
//! Deterministic, pure logic. No IO. No RPC calls.

mod engine;
mod gate;
mod table;

pub use engine::{reconcile, ReconcileError, ReconcileReport};
pub use gate::{check_admission, BatchAdmission, MAX_PERSONALIZED_PER_RUN};
pub use table::{SquareTable, TableShapeError};
