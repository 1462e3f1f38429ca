use std::{
    fmt::{self, Display},
    str::FromStr,
};

use sha2::{Digest as _, Sha256};

/// A 256-bit seed from which a puzzle is generated reproducibly.
///
/// Seeds display as 64 lowercase hexadecimal digits and parse from the same
/// form, so a puzzle can be shared or replayed from its seed alone.
///
/// # Examples
///
/// ```
/// use hueflip_generator::PuzzleSeed;
///
/// let seed: PuzzleSeed =
///     "1234567890abcdef1234567890abcdef1234567890abcdef1234567890abcdef".parse()?;
/// assert_eq!(seed.to_string().parse::<PuzzleSeed>()?, seed);
/// # Ok::<(), hueflip_generator::SeedParseError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PuzzleSeed([u8; 32]);

impl PuzzleSeed {
    /// Draws a fresh seed from the thread-local random source.
    #[must_use]
    pub fn random() -> Self {
        Self(rand::random())
    }

    /// Creates a seed from raw bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Returns the raw bytes of the seed.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Derives the seed used by a numbered generation attempt.
    ///
    /// Each attempt hashes the base seed with its number, so retries draw
    /// fresh randomness while staying reproducible.
    #[must_use]
    pub fn for_attempt(&self, attempt: u32) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(self.0);
        hasher.update(b"hueflip-attempt");
        hasher.update(attempt.to_le_bytes());
        Self(hasher.finalize().into())
    }
}

impl Display for PuzzleSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// Error returned when a seed string is not 64 hexadecimal digits.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum SeedParseError {
    /// The string does not have exactly 64 characters.
    #[display("seed must have 64 hex digits, got {len}")]
    InvalidLength {
        /// Length of the input in characters.
        len: usize,
    },
    /// The string contains a non-hexadecimal character.
    #[display("invalid hex digit `{ch}` in seed")]
    InvalidDigit {
        /// Offending character.
        ch: char,
    },
}

impl FromStr for PuzzleSeed {
    type Err = SeedParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let chars = s.trim().chars().collect::<Vec<_>>();
        if chars.len() != 64 {
            return Err(SeedParseError::InvalidLength { len: chars.len() });
        }
        let mut bytes = [0u8; 32];
        for (byte, pair) in bytes.iter_mut().zip(chars.chunks(2)) {
            let hi = hex_value(pair[0])?;
            let lo = hex_value(pair[1])?;
            *byte = (hi << 4) | lo;
        }
        Ok(Self(bytes))
    }
}

fn hex_value(ch: char) -> Result<u8, SeedParseError> {
    ch.to_digit(16)
        .and_then(|d| u8::try_from(d).ok())
        .ok_or(SeedParseError::InvalidDigit { ch })
}
