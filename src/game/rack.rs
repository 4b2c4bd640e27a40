//! Models the rack of up to seven tiles a player draws from.

use crate::{
    error::{EngineError, EngineResult},
    game::{
        tile::{self, Tile, BLANK},
        Equity,
    },
};
use std::{fmt, iter::repeat};

/// A rack never holds more than this many tiles.
pub const RACK_SIZE: usize = 7;

/// A rack, stored as a count per machine code: index 0 is the blank,
/// `1..=26` are `A..=Z`. The total never exceeds [`RACK_SIZE`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Rack {
    counts: [u8; 27],
    total: u8,
}

impl Rack {
    /// Creates a rack from a string such as `"RETINAS"` or `"?S"`,
    /// where `?` is a blank.
    pub fn from_letters(letters: &str) -> EngineResult<Self> {
        let mut rack = Rack::default();
        for ch in letters.chars() {
            match ch {
                '?' => rack.add(BLANK)?,
                'a'..='z' => rack.add(ch as u8 - b'a' + 1)?,
                'A'..='Z' => rack.add(ch as u8 - b'A' + 1)?,
                _ => return Err(EngineError::InvalidTileChar(ch)),
            }
        }
        Ok(rack)
    }
    /// Creates a rack from typed tiles.
    pub fn from_tiles(tiles: impl IntoIterator<Item = Tile>) -> EngineResult<Self> {
        let mut rack = Rack::default();
        for tile in tiles {
            // a designated blank still goes back to being a blank
            let code = if tile.is_blank() { BLANK } else { tile.code() };
            rack.add(code)?;
        }
        Ok(rack)
    }

    fn add(&mut self, code: u8) -> EngineResult<()> {
        if self.total as usize == RACK_SIZE {
            return Err(EngineError::RackOverflow);
        }
        self.counts[code as usize] += 1;
        self.total += 1;
        Ok(())
    }

    /// The per-code tile counts.
    pub fn counts(&self) -> &[u8; 27] {
        &self.counts
    }
    /// The number of tiles on the rack.
    pub fn total(&self) -> u8 {
        self.total
    }
    /// Checks whether the rack is empty.
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
    /// The count for one machine code.
    pub fn count(&self, code: u8) -> u8 {
        self.counts[code as usize]
    }
    /// Checks whether the rack holds a blank.
    pub fn has_blank(&self) -> bool {
        self.counts[BLANK as usize] > 0
    }
    /// The 26 bit set of real letters present on the rack.
    pub fn letter_bits(&self) -> u32 {
        let mut bits = 0;
        for code in 1..=26u8 {
            if self.counts[code as usize] > 0 {
                bits |= tile::code_bit(code);
            }
        }
        bits
    }
    /// The summed value of the tiles on the rack, in eighths.
    pub fn value_sum(&self) -> Equity {
        self.codes().map(tile::code_value).sum()
    }
    /// An iterator over the machine codes on the rack, ascending, each
    /// repeated by its count. Blanks come first.
    pub fn codes(&self) -> impl Iterator<Item = u8> + '_ {
        self.counts
            .iter()
            .enumerate()
            .flat_map(|(code, &count)| repeat(code as u8).take(count as usize))
    }
}

impl fmt::Display for Rack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for code in self.codes() {
            match code {
                BLANK => write!(f, "?")?,
                _ => write!(f, "{}", (code - 1 + b'A') as char)?,
            }
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_letters() {
        let rack = Rack::from_letters("RETINAS").expect("a valid rack");
        assert_eq!(rack.total(), 7);
        assert_eq!(rack.count(1), 1); // A
        assert_eq!(rack.count(19), 1); // S
        assert!(!rack.has_blank());

        let rack = Rack::from_letters("?S").expect("a valid rack");
        assert_eq!(rack.total(), 2);
        assert!(rack.has_blank());
        assert_eq!(rack.letter_bits(), tile::code_bit(19));
    }

    #[test]
    fn overflow_and_junk() {
        assert_eq!(
            Rack::from_letters("ABCDEFGH"),
            Err(EngineError::RackOverflow)
        );
        assert_eq!(
            Rack::from_letters("AB*"),
            Err(EngineError::InvalidTileChar('*'))
        );
    }

    #[test]
    fn codes_are_sorted() {
        let rack = Rack::from_letters("ZA?A").expect("a valid rack");
        let codes: Vec<u8> = rack.codes().collect();
        assert_eq!(codes, vec![0, 1, 1, 26]);
        assert_eq!(rack.to_string(), "[?AAZ]");
    }

    #[test]
    fn values() {
        let rack = Rack::from_letters("QA?").expect("a valid rack");
        assert_eq!(rack.value_sum(), Equity::from_points(11));
    }
}
