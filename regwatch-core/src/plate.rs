//! Extraction of schedule coding digits from raw plate identifiers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
/// Plate identifier without a usable numeric suffix.
pub enum InvalidPlateFormat {
    /// Nothing left after trimming whitespace.
    #[error("Invalid plate format: empty plate number")]
    Empty,
    /// Plate contains a character that never appears on a plate.
    #[error("Invalid plate format: unexpected character {character:?} in {plate:?}")]
    UnexpectedCharacter {
        /// Trimmed plate as received.
        plate: String,
        /// First offending character.
        character: char,
    },
    /// Plate does not end in a digit.
    #[error("Invalid plate format: no numeric suffix in {0:?}")]
    NoNumericSuffix(String),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
/// Text that is not exactly two ASCII digits.
#[error("Coding digits must be exactly two ASCII digits, got {0:?}")]
pub struct MalformedCodingDigits(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
/// The two plate digits a renewal schedule is keyed by, `00` through `99`.
pub struct CodingDigits {
    tens: u8,
    ones: u8,
}

impl CodingDigits {
    /// Number of distinct coding digit pairs.
    pub const COUNT: usize = 100;

    /// Build from two decimal digits.
    #[must_use]
    pub fn new(tens: u8, ones: u8) -> Option<Self> {
        (tens <= 9 && ones <= 9).then_some(Self { tens, ones })
    }

    /// Build from a dense index in `0..COUNT`.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        let tens = u8::try_from(index / 10).ok()?;
        let ones = u8::try_from(index % 10).ok()?;
        Self::new(tens, ones)
    }

    /// Every coding digit pair in ascending order.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..Self::COUNT).filter_map(Self::from_index)
    }

    /// Second-to-last plate digit.
    #[must_use]
    pub fn tens(self) -> u8 {
        self.tens
    }

    /// Last plate digit.
    #[must_use]
    pub fn ones(self) -> u8 {
        self.ones
    }

    /// Dense index in `0..COUNT`.
    #[must_use]
    pub fn index(self) -> usize {
        usize::from(self.tens) * 10 + usize::from(self.ones)
    }
}

impl fmt::Display for CodingDigits {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}{}", self.tens, self.ones)
    }
}

impl FromStr for CodingDigits {
    type Err = MalformedCodingDigits;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let malformed = || MalformedCodingDigits(raw.to_owned());
        let mut digits = raw.chars().map(|ch| ch.to_digit(10));
        match (digits.next(), digits.next(), digits.next()) {
            (Some(Some(tens)), Some(Some(ones)), None) => Self::new(
                u8::try_from(tens).map_err(|_err| malformed())?,
                u8::try_from(ones).map_err(|_err| malformed())?,
            )
            .ok_or_else(malformed),
            _ => Err(malformed()),
        }
    }
}

impl TryFrom<String> for CodingDigits {
    type Error = MalformedCodingDigits;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

impl From<CodingDigits> for String {
    fn from(digits: CodingDigits) -> Self {
        digits.to_string()
    }
}

/// Extract the coding digits from a plate identifier.
///
/// The trailing run of digits is the key: a single digit is padded with a
/// leading zero, longer runs keep their last two digits.
///
/// # Errors
///
/// Returns [`InvalidPlateFormat`] for empty input, characters other than ASCII
/// letters, digits, spaces and hyphens, or a plate that does not end in a digit.
pub fn parse_coding_digits(plate: &str) -> Result<CodingDigits, InvalidPlateFormat> {
    let trimmed = plate.trim();
    if trimmed.is_empty() {
        return Err(InvalidPlateFormat::Empty);
    }

    if let Some(character) = trimmed
        .chars()
        .find(|ch| !(ch.is_ascii_alphanumeric() || *ch == ' ' || *ch == '-'))
    {
        return Err(InvalidPlateFormat::UnexpectedCharacter {
            plate: trimmed.to_owned(),
            character,
        });
    }

    let mut suffix = trimmed
        .bytes()
        .rev()
        .take_while(u8::is_ascii_digit)
        .map(|byte| byte - b'0');

    let ones = suffix
        .next()
        .ok_or_else(|| InvalidPlateFormat::NoNumericSuffix(trimmed.to_owned()))?;
    let tens = suffix.next().unwrap_or(0);

    Ok(CodingDigits { tens, ones })
}
