//! Module representing a move chosen by the generator: a placement or
//! an exchange, with its score and equity and a total preference
//! order for deterministic tiebreaking.

use crate::game::{tile, Equity};
use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, fmt};

/// Marker in a placement's tile array for a square played through.
pub const PLAYTHROUGH: u8 = 0;

/// The two lane directions a word can run in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Along a row.
    Horizontal = 0,
    /// Along a column.
    Vertical = 1,
}

impl Direction {
    /// Both directions, horizontal first.
    pub fn iter() -> impl Iterator<Item = Direction> {
        [Direction::Horizontal, Direction::Vertical].into_iter()
    }
}

/// What sort of move this is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveKind {
    /// Tiles placed on the board.
    Place,
    /// Tiles returned to the bag in exchange for new ones.
    Exchange,
}

/// A single move. `tiles` holds machine codes over the word span:
/// [`PLAYTHROUGH`] for squares that already held a tile, the placed
/// code otherwise (blanks carry the high bit). Score and equity are
/// in eighths of a point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    /// Placement or exchange.
    pub kind: MoveKind,
    /// Row of the first square of the span (real board coordinates).
    pub row_start: u8,
    /// Column of the first square of the span.
    pub col_start: u8,
    /// Lane the word runs along.
    pub dir: Direction,
    /// Number of tiles taken off the rack.
    pub tiles_played: u8,
    /// Length of the whole span, playthroughs included.
    pub tiles_length: u8,
    /// Score in eighths of a point.
    pub score: Equity,
    /// Score plus leave and adjustment terms, in eighths.
    pub equity: Equity,
    /// The span's machine codes.
    pub tiles: [u8; 15],
}

impl Move {
    /// A placement move with zeroed score and equity, mostly useful
    /// for setting up positions.
    pub fn place(row: u8, col: u8, dir: Direction, span: &[u8]) -> Self {
        let mut tiles = [0u8; 15];
        tiles[..span.len()].copy_from_slice(span);
        Self {
            kind: MoveKind::Place,
            row_start: row,
            col_start: col,
            dir,
            tiles_played: span.iter().filter(|&&code| code != PLAYTHROUGH).count() as u8,
            tiles_length: span.len() as u8,
            score: Equity::ZERO,
            equity: Equity::ZERO,
            tiles,
        }
    }

    /// An exchange of the given tile codes.
    pub fn exchange(codes: &[u8], equity: Equity) -> Self {
        let mut tiles = [0u8; 15];
        tiles[..codes.len()].copy_from_slice(codes);
        Self {
            kind: MoveKind::Exchange,
            row_start: 0,
            col_start: 0,
            dir: Direction::Horizontal,
            tiles_played: codes.len() as u8,
            tiles_length: codes.len() as u8,
            score: Equity::ZERO,
            equity,
            tiles,
        }
    }

    fn dir_rank(&self) -> u8 {
        self.dir as u8
    }
    fn kind_rank(&self) -> u8 {
        match self.kind {
            MoveKind::Place => 0,
            MoveKind::Exchange => 1,
        }
    }

    /// The total preference order: `Greater` means `self` is the move
    /// to keep. Higher equity wins; ties fall through score (higher),
    /// then placements before exchanges, start row, start column,
    /// direction (horizontal first), tiles played (fewer), span
    /// length (shorter) and finally the tile codes (lexicographically
    /// smaller).
    pub fn preference(&self, other: &Move) -> Ordering {
        self.equity
            .cmp(&other.equity)
            .then(self.score.cmp(&other.score))
            .then(other.kind_rank().cmp(&self.kind_rank()))
            .then(other.row_start.cmp(&self.row_start))
            .then(other.col_start.cmp(&self.col_start))
            .then(other.dir_rank().cmp(&self.dir_rank()))
            .then(other.tiles_played.cmp(&self.tiles_played))
            .then(other.tiles_length.cmp(&self.tiles_length))
            .then_with(|| {
                let this = &self.tiles[..self.tiles_length as usize];
                let that = &other.tiles[..other.tiles_length as usize];
                that.cmp(this)
            })
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            MoveKind::Exchange => {
                write!(f, "EXCH ")?;
                for &code in &self.tiles[..self.tiles_length as usize] {
                    match code {
                        0 => write!(f, "?")?,
                        _ => write!(f, "{}", (tile::unblank(code) - 1 + b'A') as char)?,
                    }
                }
                Ok(())
            }
            MoveKind::Place => {
                match self.dir {
                    Direction::Horizontal => {
                        write!(f, "{}{} ", self.row_start + 1, (b'A' + self.col_start) as char)?
                    }
                    Direction::Vertical => {
                        write!(f, "{}{} ", (b'A' + self.col_start) as char, self.row_start + 1)?
                    }
                }
                let mut in_playthrough = false;
                for &code in &self.tiles[..self.tiles_length as usize] {
                    if (code == PLAYTHROUGH) != in_playthrough {
                        in_playthrough = !in_playthrough;
                        write!(f, "{}", if in_playthrough { "(" } else { ")" })?;
                    }
                    match code {
                        PLAYTHROUGH => write!(f, ".")?,
                        code if tile::is_blanked(code) => {
                            write!(
                                f,
                                "{}",
                                ((tile::unblank(code) - 1 + b'A') as char).to_ascii_lowercase()
                            )?
                        }
                        code => write!(f, "{}", (code - 1 + b'A') as char)?,
                    }
                }
                if in_playthrough {
                    write!(f, ")")?;
                }
                write!(f, " {}", self.score)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn place_counts_playthroughs() {
        let mov = Move::place(7, 5, Direction::Horizontal, &[3, PLAYTHROUGH, 20]);
        assert_eq!(mov.tiles_played, 2);
        assert_eq!(mov.tiles_length, 3);
    }

    #[test]
    fn preference_equity_then_score() {
        let mut a = Move::place(7, 7, Direction::Horizontal, &[1]);
        let mut b = a;
        a.equity = Equity(10);
        b.equity = Equity(9);
        b.score = Equity(100);
        assert_eq!(a.preference(&b), Ordering::Greater);

        b.equity = Equity(10);
        assert_eq!(a.preference(&b), Ordering::Less);
    }

    #[test]
    fn preference_positional_tiebreaks() {
        let base = Move::place(7, 7, Direction::Horizontal, &[1, 2]);

        let mut lower_row = base;
        lower_row.row_start = 6;
        assert_eq!(lower_row.preference(&base), Ordering::Greater);

        let mut vertical = base;
        vertical.dir = Direction::Vertical;
        assert_eq!(base.preference(&vertical), Ordering::Greater);

        let mut fewer_played = base;
        fewer_played.tiles_played = 1;
        assert_eq!(fewer_played.preference(&base), Ordering::Greater);

        let mut lex_smaller = base;
        lex_smaller.tiles[1] = 1;
        assert_eq!(lex_smaller.preference(&base), Ordering::Greater);

        let exch = Move::exchange(&[1, 2], Equity::ZERO);
        assert_eq!(base.preference(&exch), Ordering::Greater);
    }

    #[test]
    fn display() {
        let mut mov = Move::place(7, 5, Direction::Horizontal, &[3, PLAYTHROUGH, 20]);
        mov.score = Equity::from_points(10);
        assert_eq!(mov.to_string(), "8F C(.)T 10.000");

        let mov = Move::place(2, 3, Direction::Vertical, &[19, 1 | 0x80]);
        assert_eq!(mov.to_string(), "D3 Sa 0.000");

        let exch = Move::exchange(&[0, 17], Equity::ZERO);
        assert_eq!(exch.to_string(), "EXCH ?Q");
    }
}
