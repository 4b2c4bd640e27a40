//! The shadow pass: an admissible upper bound on the equity
//! reachable through every anchor, without touching the lexicon.
//!
//! The walk mirrors the span space of the real generator: place at
//! the anchor, extend left one square at a time (absorbing any board
//! tiles for free), and for every left extent explore every right
//! extent. Where the cross-set pins a square to a single tile the
//! score is exact; everywhere else the square is *unrestricted* and
//! its contribution is bounded at record time by pairing the highest
//! remaining tile values with the highest effective multipliers (the
//! rearrangement inequality makes that an upper bound for any real
//! assignment).

use super::{anchor::Anchor, eval, MoveGen};
use crate::game::{
    board::{self, DIM, NO_CROSS_WORD},
    play::Direction,
    tile::{self, BLANK},
    Equity,
};
use log::trace;

/// Shadow state saved around a speculative placement.
#[derive(Clone, Copy)]
struct ShadowSave {
    rack: [u8; 27],
    rack_total: u8,
    desc_scores: [i16; 7],
    desc_len: usize,
    unrestricted_len: usize,
    tiles_played: usize,
}

impl<'a> MoveGen<'a> {
    /// Walks every lane in both directions, bounds every anchor and
    /// pushes the survivors onto the heap (still unordered).
    pub(super) fn shadow_pass(&mut self) {
        for dir in Direction::iter() {
            if self.board_was_empty && dir == Direction::Vertical {
                // vertical openers mirror horizontal ones exactly
                continue;
            }
            for row in 0..DIM {
                self.cache_lane(dir, row);
                let mut last_anchor_col: i32 = -1;
                for col in 0..DIM {
                    if !self.is_anchor(col) {
                        continue;
                    }
                    self.anchor_col = col;
                    self.last_anchor_col = last_anchor_col;
                    self.shadow_anchor(dir, row, col);
                    last_anchor_col = col as i32;
                }
            }
        }
    }

    fn save(&self) -> ShadowSave {
        ShadowSave {
            rack: self.rack,
            rack_total: self.rack_total,
            desc_scores: self.shadow_desc_scores,
            desc_len: self.shadow_desc_len,
            unrestricted_len: self.shadow_unrestricted_len,
            tiles_played: self.shadow_tiles_played,
        }
    }
    fn restore(&mut self, save: ShadowSave) {
        self.rack = save.rack;
        self.rack_total = save.rack_total;
        self.shadow_desc_scores = save.desc_scores;
        self.shadow_desc_len = save.desc_len;
        self.shadow_unrestricted_len = save.unrestricted_len;
        self.shadow_tiles_played = save.tiles_played;
    }

    /// Bounds one anchor and pushes it when anything is playable.
    fn shadow_anchor(&mut self, dir: Direction, row: usize, col: usize) {
        // descending tile values of the whole rack
        self.shadow_desc_len = self.full_total as usize;
        for (slot, value) in self
            .shadow_desc_scores
            .iter_mut()
            .zip(self.rack_values_asc[..self.full_total as usize].iter().rev())
        {
            *slot = *value;
        }
        self.shadow_unrestricted_len = 0;
        self.shadow_tiles_played = 0;
        self.shadow_best = None;

        let possible = self.row_cross_sets[col]
            & self.row_leftx[col]
            & self.row_rightx[col]
            & self.rack_letter_bits();
        if possible != 0 {
            let (main, perp, word_mult) = self.shadow_place(col, possible, 0, 0, 1);
            self.shadow_tiles_played = 1;
            self.shadow_after_left(col, main, perp, word_mult);

            self.rack = self.full_rack;
            self.rack_total = self.full_total;
        }

        if let Some((bound_equity, bound_score)) = self.shadow_best {
            let scan_order = (match dir {
                Direction::Horizontal => row * DIM + col,
                Direction::Vertical => DIM * DIM + row * DIM + col,
            }) as u16;
            trace!(
                "anchor {:?} lane {} col {} bound {}",
                dir,
                row,
                col,
                bound_equity
            );
            self.heap.push(Anchor {
                row: row as u8,
                col: col as u8,
                dir,
                last_anchor_col: self.last_anchor_col as i8,
                bound_equity,
                bound_score,
                scan_order,
            });
        }
    }

    /// Accounts a speculative tile on `col`. When the square is
    /// pinned to one tile of the rack the placement is exact (value
    /// removed from the descending scores); otherwise the square
    /// joins the unrestricted list for the record-time pairing.
    /// Returns the updated `(main, perp, word_mult)`.
    fn shadow_place(
        &mut self,
        col: usize,
        possible: u32,
        main: i32,
        perp: i32,
        word_mult: i32,
    ) -> (i32, i32, i32) {
        let (tile_mult, square_word_mult) = board::multipliers(self.row * DIM + col);
        let (tile_mult, square_word_mult) = (tile_mult as i32, square_word_mult as i32);
        let word_mult = word_mult * square_word_mult;

        let cross_score = self.row_cross_scores[col];
        let has_cross = cross_score != NO_CROSS_WORD;
        let mut main = main;
        let mut perp = match has_cross {
            true => perp + cross_score as i32 * square_word_mult,
            false => perp,
        };

        if possible.count_ones() == 1 {
            let letter = (possible.trailing_zeros() + 1) as u8;
            let real = self.rack[letter as usize] > 0;
            let blank = self.rack[BLANK as usize] > 0;
            if !(real && blank) {
                // forced tile: score it exactly
                let code = if real { letter } else { BLANK };
                let value = if real {
                    tile::code_value(letter).eighths() as i32
                } else {
                    0
                };
                self.rack[code as usize] -= 1;
                self.rack_total -= 1;
                self.remove_desc_score(value as i16);
                main += value * tile_mult;
                if has_cross {
                    perp += value * tile_mult * square_word_mult;
                }
                return (main, perp, word_mult);
            }
            // both the real tile and a blank could sit here: the
            // choice is free, so fall through to the loose bound
        }

        self.shadow_unrestricted[self.shadow_unrestricted_len] =
            (tile_mult, square_word_mult, has_cross);
        self.shadow_unrestricted_len += 1;
        (main, perp, word_mult)
    }

    /// Drops one copy of `value` from the descending score list.
    fn remove_desc_score(&mut self, value: i16) {
        let at = self.shadow_desc_scores[..self.shadow_desc_len]
            .iter()
            .rposition(|&v| v == value)
            .expect("a consumed tile is on the descending score list");
        self.shadow_desc_scores
            .copy_within(at + 1..self.shadow_desc_len, at);
        self.shadow_desc_len -= 1;
    }

    /// Having placed down to `leftmost`, absorbs the board run to its
    /// left, explores every right extent of this configuration, then
    /// tries to stretch one more square left.
    fn shadow_after_left(&mut self, leftmost: usize, main: i32, perp: i32, word_mult: i32) {
        let mut main = main;
        let mut edge = leftmost as i32 - 1;
        while edge >= 0 && self.row_letters[edge as usize] != 0 {
            main += tile::code_value(self.row_letters[edge as usize]).eighths() as i32;
            edge -= 1;
        }

        let save = self.save();
        self.shadow_right(self.anchor_col + 1, main, perp, word_mult);
        self.restore(save);

        if edge >= 0
            && edge > self.last_anchor_col
            && self.shadow_tiles_played < self.full_total as usize
        {
            let col = edge as usize;
            let possible = self.row_cross_sets[col] & self.rack_letter_bits();
            if possible != 0 {
                let save = self.save();
                let (main, perp, word_mult) = self.shadow_place(col, possible, main, perp, word_mult);
                self.shadow_tiles_played += 1;
                self.shadow_after_left(col, main, perp, word_mult);
                self.restore(save);
            }
        }
    }

    /// Absorbs the board run from `from` rightward, records the
    /// stopping configuration, and keeps extending right while the
    /// rack lasts.
    fn shadow_right(&mut self, from: usize, main: i32, perp: i32, word_mult: i32) {
        let mut main = main;
        let mut col = from;
        while col < DIM && self.row_letters[col] != 0 {
            main += tile::code_value(self.row_letters[col]).eighths() as i32;
            col += 1;
        }

        self.shadow_record(main, perp, word_mult);

        if col < DIM && self.shadow_tiles_played < self.full_total as usize {
            let possible = self.row_cross_sets[col] & self.rack_letter_bits();
            if possible != 0 {
                let save = self.save();
                let (main, perp, word_mult) = self.shadow_place(col, possible, main, perp, word_mult);
                self.shadow_tiles_played += 1;
                self.shadow_right(col + 1, main, perp, word_mult);
                self.restore(save);
            }
        }
    }

    /// Bounds the current stopping configuration and folds it into
    /// the anchor's running maximum.
    fn shadow_record(&mut self, main: i32, perp: i32, word_mult: i32) {
        let played = self.shadow_tiles_played;
        debug_assert!(played >= 1);

        // effective multiplier of each unrestricted square under the
        // *final* word multiplier, recomputed so a late double word
        // still lifts earlier squares
        let mut effective = [0i32; DIM];
        let unrestricted = self.shadow_unrestricted_len;
        for i in 0..unrestricted {
            let (tile_mult, square_word_mult, has_cross) = self.shadow_unrestricted[i];
            effective[i] = tile_mult * word_mult
                + match has_cross {
                    true => tile_mult * square_word_mult,
                    false => 0,
                };
        }
        effective[..unrestricted].sort_unstable_by(|a, b| b.cmp(a));

        debug_assert!(unrestricted <= self.shadow_desc_len);
        let mut tiles_score = 0i32;
        for i in 0..unrestricted {
            tiles_score += self.shadow_desc_scores[i] as i32 * effective[i];
        }

        let mut score = tiles_score + main * word_mult + perp;
        if played >= 7 {
            score += Equity::BINGO_BONUS.eighths() as i32;
        }
        let score = Equity(score as i16);

        let mut equity = score;
        if self.bag_count > 0 {
            equity += self.leave_map.best_leave(self.full_total as usize - played);
        } else if played == self.full_total as usize {
            equity += eval::outplay_bonus(self.opp_rack_value);
        } else {
            // optimistic leave: the cheapest tiles the rack could keep
            let kept = self.full_total as usize - played;
            let cheapest: i16 = self.rack_values_asc[..kept].iter().sum();
            equity -= eval::holding_penalty(Equity(cheapest));
        }

        let better = match self.shadow_best {
            Some((best_equity, _)) => equity > best_equity,
            None => true,
        };
        if better {
            self.shadow_best = Some((equity, score));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        game::{board::Board, play::Move, rack::Rack},
        lexicon::{Lexicon, LexiconBuilder},
    };

    fn lex() -> Lexicon {
        LexiconBuilder::from_words(&["CAT", "CATS", "AT", "ACT", "TA", "ZA"]).expect("a lexicon")
    }

    fn bounds_cover_best(board: &Board, rack: &Rack, lexicon: &Lexicon) {
        // with the cutoff disabled every anchor expands; the result
        // must match the cutoff run byte for byte, and no anchor
        // bound may undercut the best move through it
        let mut with = MoveGen::new(board, rack, None, lexicon, None, 86);
        with.run(true);
        let mut without = MoveGen::new(board, rack, None, lexicon, None, 86);
        without.run(false);
        assert_eq!(with.best, without.best);
    }

    #[test]
    fn playthrough_scores_reach_the_bound() {
        let lexicon = lex();
        let mut board = Board::new();
        board
            .apply_move(&Move::place(7, 7, crate::game::play::Direction::Horizontal, &[26])) // Z
            .expect("a legal placement");
        board.update_cross_sets(&lexicon);
        let rack = Rack::from_letters("A").unwrap();

        let mut gen = MoveGen::new(&board, &rack, None, &lexicon, None, 86);
        gen.shadow_pass();
        gen.heap.heapify();

        // the anchor right of the Z must include the Z's ten points
        // in its bound: Z(A) scores 11
        let mut found = false;
        while let Some(anchor) = gen.heap.pop() {
            if anchor.dir == crate::game::play::Direction::Horizontal
                && anchor.row == 7
                && anchor.col == 8
            {
                assert!(anchor.bound_equity >= Equity::from_points(11));
                found = true;
            }
        }
        assert!(found, "the hook square right of the Z is an anchor");
    }

    #[test]
    fn shadow_agrees_with_exhaustive_search() {
        let lexicon = lex();
        let rack = Rack::from_letters("CATS").unwrap();

        let mut board = Board::new();
        board.update_cross_sets(&lexicon);
        bounds_cover_best(&board, &rack, &lexicon);

        board
            .apply_move(&Move::place(7, 7, crate::game::play::Direction::Horizontal, &[1]))
            .expect("a legal placement");
        board.update_cross_sets(&lexicon);
        bounds_cover_best(&board, &rack, &lexicon);

        board
            .apply_move(&Move::place(7, 6, crate::game::play::Direction::Horizontal, &[3]))
            .expect("a legal placement");
        board
            .apply_move(&Move::place(7, 8, crate::game::play::Direction::Horizontal, &[20]))
            .expect("a legal placement");
        board.update_cross_sets(&lexicon);
        bounds_cover_best(&board, &rack, &lexicon);
        bounds_cover_best(&board, &Rack::from_letters("?S").unwrap(), &lexicon);
    }
}
