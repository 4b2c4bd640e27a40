//! The tile model: letters, blanks, machine codes and tile values.
//!
//! On the hot path tiles travel as *machine codes*: a `u8` where `0` is
//! the empty square / blank / separator sentinel, `1..=26` are `A..=Z`,
//! and the high bit marks a blank playing as the coded letter. The typed
//! [`Letter`] and [`Tile`] wrappers are the public face of the same data.

use crate::game::Equity;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::{self, Display, Formatter};

/// Machine code of the blank tile (also the empty square and the
/// lexicon separator, which never collide in context).
pub const BLANK: u8 = 0;
/// High bit marking a blank that is playing as a letter.
pub const BLANK_MASK: u8 = 0x80;

/// Strips the blank marker from a machine code.
#[inline]
pub fn unblank(code: u8) -> u8 {
    code & !BLANK_MASK
}

/// Checks whether a machine code carries the blank marker.
#[inline]
pub fn is_blanked(code: u8) -> bool {
    code & BLANK_MASK != 0
}

/// The 26 bit set bit for a (possibly blanked) letter code.
#[inline]
pub fn code_bit(code: u8) -> u32 {
    1 << (unblank(code) - 1)
}

/// Tile values in eighths of a point, indexed by machine code.
/// Blanks (index 0) are worth nothing.
const TILE_VALUES: [i16; 27] = [
    0,  // blank
    8,  // A
    24, // B
    24, // C
    16, // D
    8,  // E
    32, // F
    16, // G
    32, // H
    8,  // I
    64, // J
    40, // K
    8,  // L
    24, // M
    8,  // N
    8,  // O
    24, // P
    80, // Q
    8,  // R
    8,  // S
    8,  // T
    8,  // U
    32, // V
    32, // W
    64, // X
    32, // Y
    80, // Z
];

/// The value of the tile behind a machine code, in eighths of a point.
/// Blanks score zero whatever letter they play as.
#[inline]
pub fn code_value(code: u8) -> Equity {
    if is_blanked(code) {
        Equity::ZERO
    } else {
        Equity(TILE_VALUES[code as usize])
    }
}

/// Checks whether a machine code plays as a vowel.
#[inline]
pub fn is_vowel(code: u8) -> bool {
    matches!(unblank(code), 1 | 5 | 9 | 15 | 21)
}

/// One of the 26 letters, held directly as its machine code
/// (`1..=26`). Keeping the wire encoding inside the newtype means the
/// lexicon and board boundaries never do offset arithmetic; the code
/// is the value.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Letter(#[serde(deserialize_with = "checked_letter_code")] u8);

/// Rejects serialized codes outside `1..=26` so a [`Letter`] can
/// never hold the blank or separator sentinel.
fn checked_letter_code<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    match u8::deserialize(deserializer)? {
        code @ 1..=26 => Ok(code),
        _ => Err(serde::de::Error::custom("not a letter code")),
    }
}

impl Letter {
    /// Parses a letter from either case of `A..=Z`; anything else
    /// carries no letter.
    pub fn from_char(ch: char) -> Option<Self> {
        match ch {
            'A'..='Z' => Some(Letter(ch as u8 - b'A' + 1)),
            'a'..='z' => Some(Letter(ch as u8 - b'a' + 1)),
            _ => None,
        }
    }
    /// Reads the letter out of a machine code, ignoring the blank
    /// marker. The sentinel code 0 (and anything past `Z`) is not a
    /// letter.
    pub fn from_code(code: u8) -> Option<Self> {
        match unblank(code) {
            code @ 1..=26 => Some(Letter(code)),
            _ => None,
        }
    }
    /// The machine code (`1..=26`).
    pub fn code(self) -> u8 {
        self.0
    }
    /// The uppercase character the letter prints as.
    pub fn as_char(self) -> char {
        (self.0 - 1 + b'A') as char
    }
}
impl Display for Letter {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}
impl fmt::Debug for Letter {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "'{}'", self.as_char())
    }
}

/// A physical tile: a letter tile, or the blank. A played blank
/// remembers which letter it stands in for but still scores nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Tile {
    /// An ordinary letter tile.
    Letter(Letter),
    /// The blank, with its designated letter once it has been played.
    Blank(Option<Letter>),
}

impl Tile {
    /// Checks whether `self` is a blank tile.
    pub fn is_blank(&self) -> bool {
        matches!(self, Tile::Blank(_))
    }
    /// The machine code of the tile. An undesignated blank is the bare
    /// blank code.
    pub fn code(&self) -> u8 {
        match self {
            Tile::Letter(l) => l.code(),
            Tile::Blank(Some(l)) => l.code() | BLANK_MASK,
            Tile::Blank(None) => BLANK,
        }
    }
    /// Builds a tile from a machine code; `0` is an undesignated blank.
    pub fn from_code(code: u8) -> Tile {
        match (is_blanked(code), Letter::from_code(code)) {
            (true, letter) => Tile::Blank(letter),
            (false, Some(letter)) => Tile::Letter(letter),
            (false, None) => Tile::Blank(None),
        }
    }
    /// Gets the value of the tile in eighths of a point.
    pub fn value(&self) -> Equity {
        code_value(self.code())
    }
}
impl Display for Tile {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Tile::Letter(l) => write!(f, "{}", l),
            // blanks print in lowercase
            Tile::Blank(Some(l)) => write!(f, "{}", l.as_char().to_ascii_lowercase()),
            Tile::Blank(_) => write!(f, "?"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letter_codes() {
        let a = Letter::from_char('a').expect("a letter");
        let z = Letter::from_char('Z').expect("a letter");
        assert_eq!(a.code(), 1);
        assert_eq!(z.code(), 26);
        assert_eq!(a.as_char(), 'A');
        assert_eq!(Letter::from_code(1), Some(a));
        assert_eq!(Letter::from_code(26 | BLANK_MASK), Some(z));
        assert_eq!(Letter::from_code(0), None);
        assert_eq!(Letter::from_code(27), None);
        assert!(Letter::from_char('3').is_none());
    }

    #[test]
    fn tile_codes_round_trip() {
        for code in 1..=26u8 {
            assert_eq!(Tile::from_code(code).code(), code);
            let blanked = code | BLANK_MASK;
            assert_eq!(Tile::from_code(blanked).code(), blanked);
        }
        assert_eq!(Tile::from_code(BLANK), Tile::Blank(None));
    }

    #[test]
    fn values() {
        assert_eq!(code_value(17), Equity::from_points(10)); // Q
        assert_eq!(code_value(5), Equity::from_points(1)); // E
        assert_eq!(code_value(17 | BLANK_MASK), Equity::ZERO);
        assert_eq!(
            Tile::Blank(Some(Letter::from_char('Z').unwrap())).value(),
            Equity::ZERO
        );
    }

    #[test]
    fn vowels() {
        for ch in "AEIOU".chars() {
            assert!(is_vowel(Letter::from_char(ch).unwrap().code()));
        }
        for ch in "BCDQZ".chars() {
            assert!(!is_vowel(Letter::from_char(ch).unwrap().code()));
        }
        assert!(is_vowel(1 | BLANK_MASK));
    }

    #[test]
    fn bits() {
        assert_eq!(code_bit(1), 1);
        assert_eq!(code_bit(26), 1 << 25);
        assert_eq!(code_bit(3 | BLANK_MASK), 1 << 2);
    }
}
