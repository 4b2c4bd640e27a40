//! Static evaluation terms beyond the raw score: opening placement
//! penalties and the endgame adjustments.

use crate::game::{
    board::{bonus_at, Bonus, CELLS, DIM},
    Equity,
};
use lazy_static::lazy_static;

/// Penalty for placing a vowel beside an open double or triple letter
/// square on the opening move, in eighths.
const OPENING_HOTSPOT_PENALTY: Equity = Equity(6);

/// Flat penalty on endgame moves that do not empty the rack, in
/// eighths (the stalling cost on top of the doubled leave).
const ENDGAME_HOLDING_PENALTY: Equity = Equity(80);

lazy_static! {
    /// Per-square opening penalty: hot wherever a king-move neighbour
    /// is a letter premium.
    static ref OPENING_PENALTIES: [Equity; CELLS] = {
        let mut table = [Equity::ZERO; CELLS];
        for row in 0..DIM as i32 {
            for col in 0..DIM as i32 {
                'neighbours: for drow in -1..=1 {
                    for dcol in -1..=1 {
                        if drow == 0 && dcol == 0 {
                            continue;
                        }
                        let (nrow, ncol) = (row + drow, col + dcol);
                        if !(0..DIM as i32).contains(&nrow) || !(0..DIM as i32).contains(&ncol) {
                            continue;
                        }
                        if matches!(
                            bonus_at(nrow as usize, ncol as usize),
                            Some(Bonus::DoubleLetter) | Some(Bonus::TripleLetter)
                        ) {
                            table[(row * DIM as i32 + col) as usize] = OPENING_HOTSPOT_PENALTY;
                            break 'neighbours;
                        }
                    }
                }
            }
        }
        table
    };
}

/// The opening penalty for putting a vowel on this square.
#[inline]
pub(crate) fn opening_penalty(row: usize, col: usize) -> Equity {
    OPENING_PENALTIES[row * DIM + col]
}

/// Endgame credit for going out: twice the value stranded on the
/// opponent's rack.
#[inline]
pub(crate) fn outplay_bonus(opp_rack_value: Equity) -> Equity {
    opp_rack_value * 2
}

/// Endgame cost of *not* going out with `leave_value` still on the
/// rack.
#[inline]
pub(crate) fn holding_penalty(leave_value: Equity) -> Equity {
    leave_value * 2 + ENDGAME_HOLDING_PENALTY
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hotspots_surround_letter_premiums() {
        // (7, 3) is a double letter: its row neighbours are hot
        assert_eq!(opening_penalty(7, 2), OPENING_HOTSPOT_PENALTY);
        assert_eq!(opening_penalty(7, 4), OPENING_HOTSPOT_PENALTY);
        // (6, 6) is a double letter: the centre is diagonal to it
        assert_eq!(opening_penalty(7, 7), OPENING_HOTSPOT_PENALTY);
        // far corner area beside the triple word only
        assert_eq!(opening_penalty(0, 1), Equity::ZERO);
    }

    #[test]
    fn endgame_terms() {
        assert_eq!(outplay_bonus(Equity::from_points(5)), Equity::from_points(10));
        assert_eq!(
            holding_penalty(Equity::from_points(10)),
            Equity::from_points(30)
        );
    }
}
