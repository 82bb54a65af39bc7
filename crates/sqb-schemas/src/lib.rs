//! Shared domain types for the Square Board pipeline.
//!
//! Everything here is plain data: square identifiers and grid geometry,
//! pixel buffers with their sentinel values, personalization records, the
//! on-chain event shapes and the per-run batch that carries them. No IO and
//! no chain access; those live behind the boundaries in `sqb-chain`,
//! `sqb-store` and `sqb-publish`.

mod events;
mod pixel;
mod square;
mod state;

pub use events::{
    BlockRange, EventBatch, PersonalizedEvent, SoldEvent, SquareRead, SquareReads, UnderlayEvent,
};
pub use pixel::{PixelData, PixelDataError, PIXEL_DATA_LEN, SQUARE_EDGE_PIXELS};
pub use square::{InvalidSquareId, SquareId, GRID_EDGE, NUM_SQUARES};
pub use state::{Personalization, ResolvedSquare, UnderlayPersonalization};
