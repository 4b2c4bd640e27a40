//! Move generation: finds the single highest-equity move for a
//! position.
//!
//! A call runs in two phases. The shadow pass walks every anchor and
//! computes an admissible upper bound on the equity reachable through
//! it, filling a max-heap. The heap is then drained best bound first;
//! each anchor is expanded by recursive GADDAG traversal, and as soon
//! as the best remaining bound cannot beat the best move found, the
//! whole search stops. Exchanges are scanned separately and the
//! overall winner is returned.

mod anchor;
mod eval;
mod exchange;
mod shadow;

use crate::{
    game::{
        board::{self, Board, DIM, NO_CROSS_WORD},
        play::{Direction, Move, MoveKind, PLAYTHROUGH},
        rack::Rack,
        tile::{self, BLANK, BLANK_MASK},
        Equity,
    },
    leaves::{LeaveMap, LeaveTable},
    lexicon::{Lexicon, SEPARATOR},
};
use anchor::AnchorHeap;
use log::{debug, trace};
use std::cmp::Ordering;

/// Finds the best move for the position, or [`None`] when neither a
/// placement nor an exchange is possible (the caller must pass).
///
/// `board` must carry current cross and extension sets
/// ([`Board::update_cross_sets`]). Exchanges are considered only with
/// at least seven tiles in the bag and a leave table to value them
/// with. With `bag_count` zero the endgame adjustments replace leave
/// values; `opp_rack` feeds the out-play bonus and is treated as
/// empty when absent.
pub fn generate_moves(
    board: &Board,
    rack: &Rack,
    opp_rack: Option<&Rack>,
    lexicon: &Lexicon,
    leaves: Option<&LeaveTable>,
    bag_count: u8,
) -> Option<Move> {
    let mut gen = MoveGen::new(board, rack, opp_rack, lexicon, leaves, bag_count);
    gen.run(true);
    let placement = gen.best;

    let exchange = match bag_count >= 7 && leaves.is_some() {
        true => exchange::best_exchange(rack, &gen.leave_map),
        false => None,
    };

    match (placement, exchange) {
        (Some(place), Some(exch)) => match place.preference(&exch) {
            Ordering::Greater => Some(place),
            _ => Some(exch),
        },
        (place, exch) => place.or(exch),
    }
}

/// All the mutable state of one generation call. Everything lives in
/// fixed-size arrays; nothing allocates once the struct is built.
struct MoveGen<'a> {
    lexicon: &'a Lexicon,
    board: &'a Board,
    bag_count: u8,

    // rack state, mutated during traversal and restored per anchor
    rack: [u8; 27],
    rack_total: u8,
    full_rack: [u8; 27],
    full_total: u8,
    leave_map: LeaveMap,

    // static per-call terms
    opp_rack_value: Equity,
    rack_values_asc: [i16; 7],
    board_was_empty: bool,

    // cache of the lane currently being generated
    dir: Direction,
    row: usize,
    row_letters: [u8; DIM],
    row_cross_sets: [u32; DIM],
    row_cross_scores: [i16; DIM],
    row_leftx: [u32; DIM],
    row_rightx: [u32; DIM],

    // anchor scope
    anchor_col: usize,
    last_anchor_col: i32,

    // shadow scratch (see the shadow module)
    shadow_desc_scores: [i16; 7],
    shadow_desc_len: usize,
    shadow_unrestricted: [(i32, i32, bool); DIM],
    shadow_unrestricted_len: usize,
    shadow_tiles_played: usize,
    shadow_best: Option<(Equity, Equity)>,

    // generator state
    tiles_played: usize,
    strip: [u8; DIM],
    best: Option<Move>,

    heap: AnchorHeap,
    anchors_cut: usize,
}

impl<'a> MoveGen<'a> {
    fn new(
        board: &'a Board,
        rack: &Rack,
        opp_rack: Option<&Rack>,
        lexicon: &'a Lexicon,
        leaves: Option<&LeaveTable>,
        bag_count: u8,
    ) -> Self {
        let counts = *rack.counts();
        let total = rack.total();

        let mut rack_values_asc = [0i16; 7];
        for (slot, code) in rack_values_asc.iter_mut().zip(rack.codes()) {
            *slot = tile::code_value(code).eighths();
        }
        rack_values_asc[..total as usize].sort_unstable();

        Self {
            lexicon,
            board,
            bag_count,
            rack: counts,
            rack_total: total,
            full_rack: counts,
            full_total: total,
            leave_map: LeaveMap::new(leaves, rack),
            opp_rack_value: opp_rack.map(Rack::value_sum).unwrap_or(Equity::ZERO),
            rack_values_asc,
            board_was_empty: board.is_empty(),
            dir: Direction::Horizontal,
            row: 0,
            row_letters: [0; DIM],
            row_cross_sets: [0; DIM],
            row_cross_scores: [NO_CROSS_WORD; DIM],
            row_leftx: [0; DIM],
            row_rightx: [0; DIM],
            anchor_col: 0,
            last_anchor_col: -1,
            shadow_desc_scores: [0; 7],
            shadow_desc_len: 0,
            shadow_unrestricted: [(0, 0, false); DIM],
            shadow_unrestricted_len: 0,
            shadow_tiles_played: 0,
            shadow_best: None,
            tiles_played: 0,
            strip: [0; DIM],
            best: None,
            heap: AnchorHeap::new(),
            anchors_cut: 0,
        }
    }

    /// Runs the full search. With `cutoff` false every anchor is
    /// expanded regardless of its bound (the result must not change;
    /// tests lean on that).
    fn run(&mut self, cutoff: bool) {
        self.shadow_pass();
        self.heap.heapify();
        debug!(
            "shadow pass ranked {} anchors ({} tiles on board)",
            self.heap.len(),
            self.board.tile_count()
        );

        let mut cached: Option<(Direction, usize)> = None;
        while let Some(anchor) = self.heap.pop() {
            if cutoff {
                if let Some(best) = &self.best {
                    if anchor.bound_equity < best.equity {
                        // every remaining bound is no better than this one
                        self.anchors_cut = self.heap.len() + 1;
                        break;
                    }
                }
            }
            trace!(
                "expanding {:?} lane {} col {}: bound {} (score {})",
                anchor.dir,
                anchor.row,
                anchor.col,
                anchor.bound_equity,
                anchor.bound_score
            );
            let lane = (anchor.dir, anchor.row as usize);
            if cached != Some(lane) {
                self.cache_lane(anchor.dir, anchor.row as usize);
                cached = Some(lane);
            }

            self.rack = self.full_rack;
            self.rack_total = self.full_total;
            self.leave_map.reset();
            self.tiles_played = 0;
            self.anchor_col = anchor.col as usize;
            self.last_anchor_col = anchor.last_anchor_col as i32;

            let root = self.lexicon.gaddag_root();
            self.recursive_gen(self.anchor_col, root, self.anchor_col, self.anchor_col, 0, 0, 1);
        }
        debug!(
            "generation finished: cut {} anchors, best {}",
            self.anchors_cut,
            self.best
                .as_ref()
                .map(|b| b.to_string())
                .unwrap_or_else(|| "none".into())
        );
    }

    /// Copies one lane of the board into the linear row cache.
    fn cache_lane(&mut self, dir: Direction, row: usize) {
        let view = self.board.view(dir);
        let base = row * DIM;
        self.dir = dir;
        self.row = row;
        self.row_letters.copy_from_slice(&view.letters[base..base + DIM]);
        self.row_cross_sets
            .copy_from_slice(&view.cross_sets[base..base + DIM]);
        self.row_cross_scores
            .copy_from_slice(&view.cross_scores[base..base + DIM]);
        self.row_leftx.copy_from_slice(&view.leftx[base..base + DIM]);
        self.row_rightx
            .copy_from_slice(&view.rightx[base..base + DIM]);
    }

    /// Whether generation can start at this cached column: empty and
    /// touching a tile in some direction, or the centre square of an
    /// empty board.
    fn is_anchor(&self, col: usize) -> bool {
        if self.row_letters[col] != 0 {
            return false;
        }
        if self.board_was_empty {
            return self.row == DIM / 2 && col == DIM / 2;
        }
        (col > 0 && self.row_letters[col - 1] != 0)
            || (col + 1 < DIM && self.row_letters[col + 1] != 0)
            || self.row_cross_scores[col] != NO_CROSS_WORD
    }

    /// The 26 bit set of letters the rack can currently produce: its
    /// real letters, or everything while it holds a blank.
    fn rack_letter_bits(&self) -> u32 {
        if self.rack[BLANK as usize] > 0 {
            return crate::lexicon::ALL_LETTERS;
        }
        let mut bits = 0;
        for code in 1..=26u8 {
            if self.rack[code as usize] > 0 {
                bits |= tile::code_bit(code);
            }
        }
        bits
    }

    /// Recursive GADDAG expansion at `col`, reading the sibling list
    /// at `node`. Accumulators travel as arguments; the rack, leave
    /// map and strip are fields with explicit undo.
    #[allow(clippy::too_many_arguments)]
    fn recursive_gen(
        &mut self,
        col: usize,
        node: u32,
        leftstrip: usize,
        rightstrip: usize,
        main_score: i32,
        cross_total: i32,
        word_mult: i32,
    ) {
        let lexicon = self.lexicon;
        let letter = self.row_letters[col];

        if letter != 0 {
            // playthrough: the only usable sibling is the board tile
            let raw = tile::unblank(letter);
            if node == 0 {
                return;
            }
            let mut at = node;
            loop {
                let sibling = lexicon.node(at);
                if sibling.tile() == raw {
                    self.go_on(
                        col,
                        letter,
                        sibling.arc_index(),
                        sibling.accepts(),
                        false,
                        leftstrip,
                        rightstrip,
                        main_score,
                        cross_total,
                        word_mult,
                    );
                    return;
                }
                if sibling.is_end() {
                    return;
                }
                at += 1;
            }
        }

        if self.rack_total == 0 || node == 0 {
            return;
        }
        let mut cross_set = self.row_cross_sets[col];
        if col == self.anchor_col {
            // the anchor tile sits directly after its lane prefix and
            // directly before its lane suffix; both extension sets are
            // exact filters here (and only here)
            cross_set &= self.row_leftx[col] & self.row_rightx[col];
        }
        if cross_set == 0 {
            return;
        }

        let mut at = node;
        loop {
            let sibling = lexicon.node(at);
            let sibling_tile = sibling.tile();
            if sibling_tile != SEPARATOR && cross_set & tile::code_bit(sibling_tile) != 0 {
                if self.rack[sibling_tile as usize] > 0 {
                    self.rack[sibling_tile as usize] -= 1;
                    self.rack_total -= 1;
                    self.tiles_played += 1;
                    self.leave_map.take(sibling_tile);
                    self.go_on(
                        col,
                        sibling_tile,
                        sibling.arc_index(),
                        sibling.accepts(),
                        true,
                        leftstrip,
                        rightstrip,
                        main_score,
                        cross_total,
                        word_mult,
                    );
                    self.leave_map.put_back(sibling_tile);
                    self.tiles_played -= 1;
                    self.rack_total += 1;
                    self.rack[sibling_tile as usize] += 1;
                }
                if self.rack[BLANK as usize] > 0 {
                    self.rack[BLANK as usize] -= 1;
                    self.rack_total -= 1;
                    self.tiles_played += 1;
                    self.leave_map.take(BLANK);
                    self.go_on(
                        col,
                        sibling_tile | BLANK_MASK,
                        sibling.arc_index(),
                        sibling.accepts(),
                        true,
                        leftstrip,
                        rightstrip,
                        main_score,
                        cross_total,
                        word_mult,
                    );
                    self.leave_map.put_back(BLANK);
                    self.tiles_played -= 1;
                    self.rack_total += 1;
                    self.rack[BLANK as usize] += 1;
                }
            }
            if sibling.is_end() {
                return;
            }
            at += 1;
        }
    }

    /// Scores the tile at `col` into the accumulators, then records
    /// and/or keeps extending per the GADDAG scheme: leftward while
    /// `col` is at or left of the anchor, rightward after crossing
    /// the separator.
    #[allow(clippy::too_many_arguments)]
    fn go_on(
        &mut self,
        col: usize,
        code: u8,
        next_node: u32,
        accepts: bool,
        fresh: bool,
        leftstrip: usize,
        rightstrip: usize,
        main_score: i32,
        cross_total: i32,
        word_mult: i32,
    ) {
        let value = tile::code_value(code).eighths() as i32;
        let (main_score, cross_total, word_mult) = match fresh {
            true => {
                let (tile_mult, square_word_mult) = board::multipliers(self.row * DIM + col);
                let placed = value * tile_mult as i32;
                let crossed = match self.row_cross_scores[col] {
                    NO_CROSS_WORD => 0,
                    cross_score => (cross_score as i32 + placed) * square_word_mult as i32,
                };
                self.strip[col] = code;
                (
                    main_score + placed,
                    cross_total + crossed,
                    word_mult * square_word_mult as i32,
                )
            }
            false => {
                self.strip[col] = PLAYTHROUGH;
                (main_score + value, cross_total, word_mult)
            }
        };

        if col <= self.anchor_col {
            let leftstrip = col;
            let no_letter_left = col == 0 || self.row_letters[col - 1] == 0;
            let anchor_right_clear =
                self.anchor_col + 1 == DIM || self.row_letters[self.anchor_col + 1] == 0;

            if accepts && no_letter_left && anchor_right_clear && self.tiles_played > 0 {
                self.record(leftstrip, rightstrip, main_score, cross_total, word_mult);
            }
            if next_node != 0 {
                if col > 0 && col as i32 - 1 > self.last_anchor_col {
                    self.recursive_gen(
                        col - 1,
                        next_node,
                        leftstrip,
                        rightstrip,
                        main_score,
                        cross_total,
                        word_mult,
                    );
                }
                if no_letter_left && self.anchor_col + 1 < DIM {
                    let separated = self.lexicon.follow_separator(next_node);
                    if separated != 0 {
                        self.recursive_gen(
                            self.anchor_col + 1,
                            separated,
                            leftstrip,
                            rightstrip,
                            main_score,
                            cross_total,
                            word_mult,
                        );
                    }
                }
            }
        } else {
            let rightstrip = col;
            let no_letter_right = col + 1 == DIM || self.row_letters[col + 1] == 0;

            if accepts && no_letter_right && self.tiles_played > 0 {
                self.record(leftstrip, rightstrip, main_score, cross_total, word_mult);
            }
            if next_node != 0 && col + 1 < DIM {
                self.recursive_gen(
                    col + 1,
                    next_node,
                    leftstrip,
                    rightstrip,
                    main_score,
                    cross_total,
                    word_mult,
                );
            }
        }
    }

    /// Value of the tiles still on the (mutated) rack, in eighths.
    fn rack_leave_value(&self) -> Equity {
        let mut total = 0i16;
        for code in 1..=26u8 {
            total += tile::code_value(code).eighths() * self.rack[code as usize] as i16;
        }
        Equity(total)
    }

    /// Finishes a candidate: computes score and equity, applies the
    /// duplicate-lane rule and the running tiebreak, and keeps it if
    /// it wins.
    fn record(
        &mut self,
        leftstrip: usize,
        rightstrip: usize,
        main_score: i32,
        cross_total: i32,
        word_mult: i32,
    ) {
        // a single fresh tile whose real word is perpendicular was
        // already recorded by the other lane
        if self.dir == Direction::Vertical && self.tiles_played == 1 {
            let placed = (leftstrip..=rightstrip)
                .find(|&c| self.strip[c] != PLAYTHROUGH)
                .expect("a recorded move placed a tile");
            if self.row_cross_scores[placed] != NO_CROSS_WORD {
                return;
            }
        }

        let mut score = main_score * word_mult + cross_total;
        if self.tiles_played == 7 {
            score += Equity::BINGO_BONUS.eighths() as i32;
        }
        let score = Equity(score as i16);

        let mut equity = score;
        if self.bag_count > 0 {
            equity += self.leave_map.current();
        } else if self.rack_total == 0 {
            equity += eval::outplay_bonus(self.opp_rack_value);
        } else {
            equity -= eval::holding_penalty(self.rack_leave_value());
        }
        if self.board_was_empty {
            for col in leftstrip..=rightstrip {
                let code = self.strip[col];
                if code != PLAYTHROUGH && tile::is_vowel(code) {
                    let (row, col) = match self.dir {
                        Direction::Horizontal => (self.row, col),
                        Direction::Vertical => (col, self.row),
                    };
                    equity -= eval::opening_penalty(row, col);
                }
            }
        }

        // cheap reject before building the move
        if let Some(best) = &self.best {
            if equity < best.equity {
                return;
            }
        }

        let (row_start, col_start) = match self.dir {
            Direction::Horizontal => (self.row as u8, leftstrip as u8),
            Direction::Vertical => (leftstrip as u8, self.row as u8),
        };
        let mut tiles = [0u8; 15];
        let length = rightstrip - leftstrip + 1;
        tiles[..length].copy_from_slice(&self.strip[leftstrip..=rightstrip]);

        let candidate = Move {
            kind: MoveKind::Place,
            row_start,
            col_start,
            dir: self.dir,
            tiles_played: self.tiles_played as u8,
            tiles_length: length as u8,
            score,
            equity,
            tiles,
        };
        let keep = match &self.best {
            Some(best) => candidate.preference(best) == Ordering::Greater,
            None => true,
        };
        if keep {
            self.best = Some(candidate);
        }
    }
}
