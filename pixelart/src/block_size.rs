use std::fmt;
use std::num::{IntErrorKind, NonZeroU32, ParseIntError};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Edge length, in source pixels, of each square collapsed into one colour.
///
/// Always at least 1. Anything that would not make a valid block size
/// (zero, negative, missing, garbage) falls back to [`BlockSize::DEFAULT`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockSize(NonZeroU32);

impl BlockSize {
    pub const DEFAULT: BlockSize = BlockSize(match NonZeroU32::new(10) {
        Some(n) => n,
        None => unreachable!(),
    });

    /// Coerce a raw integer; `<= 0` means "use the default".
    pub fn coerce(raw: i64) -> Self {
        if raw <= 0 {
            return Self::DEFAULT;
        }
        let clamped = u32::try_from(raw).unwrap_or(u32::MAX);
        NonZeroU32::new(clamped).map_or(Self::DEFAULT, BlockSize)
    }

    /// Parse an optional form field. Absent, blank or non-numeric input
    /// yields the default.
    pub fn from_field(field: Option<&str>) -> Self {
        field
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .and_then(|s| Self::parse_integer(s).ok())
            .unwrap_or(Self::DEFAULT)
    }

    /// Integers beyond `i64` still count: too large saturates, too small
    /// is non-positive and takes the default.
    fn parse_integer(s: &str) -> Result<Self, ParseIntError> {
        match s.parse::<i64>() {
            Ok(raw) => Ok(Self::coerce(raw)),
            Err(e) => match e.kind() {
                IntErrorKind::PosOverflow => Ok(Self::coerce(i64::MAX)),
                IntErrorKind::NegOverflow => Ok(Self::DEFAULT),
                _ => Err(e),
            },
        }
    }

    pub fn get(self) -> u32 {
        self.0.get()
    }

    /// Resolution the image is averaged down to before re-expansion.
    /// Never collapses below 1×1.
    pub fn reduced_dimensions(self, (width, height): (u32, u32)) -> (u32, u32) {
        let b = self.get();
        ((width / b).max(1), (height / b).max(1))
    }
}

impl Default for BlockSize {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl FromStr for BlockSize {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_integer(s.trim())
    }
}

impl fmt::Display for BlockSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for BlockSize {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.get())
    }
}

impl<'de> Deserialize<'de> for BlockSize {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        i64::deserialize(deserializer).map(Self::coerce)
    }
}
