use crate::pixel::PixelData;
use crate::square::SquareId;

/// Current main-layer personalization record for one Square.
///
/// The pixel buffer is not part of this record: images are durable as
/// published artifacts, and the resolved buffer travels to the publisher in
/// [`ResolvedSquare`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Personalization {
    /// Personalization counter read from the main contract.
    pub version: u64,
    pub title: String,
    pub href: String,
    /// Block of the event that last changed what this square displays.
    pub updated_block: u64,
}

/// Last-known underlay personalization for one Square.
///
/// Independent of the main layer; may be recorded before the square is ever
/// minted, and only surfaces while the main layer is blank.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnderlayPersonalization {
    pub title: String,
    pub href: String,
    pub pixel_data: PixelData,
}

/// Fully resolved display state for one Square, handed to the publisher.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedSquare {
    pub id: SquareId,
    pub version: u64,
    pub title: String,
    pub href: String,
    /// 300 bytes, 10×10 RGB, row-major.
    pub pixel_data: PixelData,
}

impl ResolvedSquare {
    /// The state a square displays before any personalization: gray, no
    /// title, no link.
    pub fn unpersonalized(id: SquareId) -> Self {
        Self {
            id,
            version: 0,
            title: String::new(),
            href: String::new(),
            pixel_data: PixelData::UNPERSONALIZED,
        }
    }
}
