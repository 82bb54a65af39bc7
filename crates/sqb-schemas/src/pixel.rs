use std::fmt;

/// Edge length of one Square's image in pixels.
pub const SQUARE_EDGE_PIXELS: usize = 10;

/// Byte length of one Square's image: 10×10 pixels, 3 bytes each, row-major.
pub const PIXEL_DATA_LEN: usize = SQUARE_EDGE_PIXELS * SQUARE_EDGE_PIXELS * 3;

/// The 10×10 RGB image of one Square.
///
/// Two sentinel values exist and must not be confused:
/// [`PixelData::UNPERSONALIZED`] (gray, `0xE6` bytes) is what a square
/// *displays* before anyone personalizes it; [`PixelData::BLANK`] (black,
/// zero bytes) is what the main contract *stores* when an owner clears
/// their personalization to let the underlay show through.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelData([u8; PIXEL_DATA_LEN]);

impl PixelData {
    /// Display default for a square with no personalization.
    pub const UNPERSONALIZED: PixelData = PixelData([0xE6; PIXEL_DATA_LEN]);

    /// Blank-detection sentinel: the all-zero buffer the main contract
    /// holds for a cleared square.
    pub const BLANK: PixelData = PixelData([0x00; PIXEL_DATA_LEN]);

    pub fn from_bytes(bytes: [u8; PIXEL_DATA_LEN]) -> Self {
        Self(bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, PixelDataError> {
        let arr: [u8; PIXEL_DATA_LEN] = bytes
            .try_into()
            .map_err(|_| PixelDataError::BadLength(bytes.len()))?;
        Ok(Self(arr))
    }

    /// Decode from the lowercase-hex form used at the storage boundary.
    pub fn from_hex(s: &str) -> Result<Self, PixelDataError> {
        let bytes = hex::decode(s).map_err(PixelDataError::BadHex)?;
        Self::from_slice(&bytes)
    }

    /// Lowercase-hex form used at the storage boundary.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn as_bytes(&self) -> &[u8; PIXEL_DATA_LEN] {
        &self.0
    }

    /// Bit-equality against the all-zero sentinel.
    pub fn is_blank(&self) -> bool {
        *self == Self::BLANK
    }
}

impl fmt::Debug for PixelData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // 300 raw bytes are unreadable in test output; show a prefix.
        write!(f, "PixelData({}…)", hex::encode(&self.0[..6]))
    }
}

/// Pixel buffer that is not exactly 300 bytes, or hex that does not decode.
#[derive(Debug)]
pub enum PixelDataError {
    BadLength(usize),
    BadHex(hex::FromHexError),
}

impl fmt::Display for PixelDataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PixelDataError::BadLength(len) => {
                write!(f, "pixel data is {len} bytes, expected {PIXEL_DATA_LEN}")
            }
            PixelDataError::BadHex(e) => write!(f, "pixel data is not valid hex: {e}"),
        }
    }
}

impl std::error::Error for PixelDataError {}
