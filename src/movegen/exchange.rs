//! Exchange enumeration: every non-empty subset of the rack, valued
//! purely by the leave it keeps back.

use crate::{
    game::{play::Move, rack::Rack, Equity},
    leaves::LeaveMap,
};
use std::cmp::Ordering;

/// Finds the best exchange, reusing the leave map's precomputed
/// subset values (bit `i` of a mask removes the `i`-th tile of the
/// rack in ascending code order, the same layout the map uses).
/// Returns [`None`] for an empty rack.
pub(crate) fn best_exchange(rack: &Rack, leave_map: &LeaveMap) -> Option<Move> {
    let n = rack.total() as usize;
    if n == 0 {
        return None;
    }
    let mut codes = [0u8; 7];
    for (slot, code) in codes.iter_mut().zip(rack.codes()) {
        *slot = code;
    }

    let mut best: Option<Move> = None;
    for mask in 1usize..(1 << n) {
        // the tiles under the mask leave the rack; equity is whatever
        // the kept subset is worth
        let equity = leave_map.subset_value(mask);
        let mut exchanged = [0u8; 7];
        let mut len = 0;
        for (i, &code) in codes[..n].iter().enumerate() {
            if mask & (1 << i) != 0 {
                exchanged[len] = code;
                len += 1;
            }
        }
        let candidate = Move::exchange(&exchanged[..len], equity);
        let better = match &best {
            Some(best) => candidate.preference(best) == Ordering::Greater,
            None => true,
        };
        if better {
            best = Some(candidate);
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leaves::LeaveTable;

    #[test]
    fn keeps_the_best_leave() {
        let table = LeaveTable::from_racks(&[("S", 64), ("Q", -88), ("QS", -40)])
            .expect("a leave table");
        let rack = Rack::from_letters("QS").unwrap();
        let leave_map = LeaveMap::new(Some(&table), &rack);

        let best = best_exchange(&rack, &leave_map).expect("an exchange");
        // tossing the Q keeps S (worth 64), the best available leave
        assert_eq!(best.equity, Equity(64));
        assert_eq!(best.tiles_played, 1);
        assert_eq!(best.tiles[0], 17);
        assert_eq!(best.score, Equity::ZERO);
    }

    #[test]
    fn empty_rack_has_no_exchange() {
        let rack = Rack::default();
        let leave_map = LeaveMap::new(None, &rack);
        assert!(best_exchange(&rack, &leave_map).is_none());
    }

    #[test]
    fn without_a_table_prefers_fewest_tiles() {
        // all leaves are worth zero: ties resolve through the move
        // preference order (fewer tiles, then lexicographic)
        let rack = Rack::from_letters("AB").unwrap();
        let leave_map = LeaveMap::new(None, &rack);
        let best = best_exchange(&rack, &leave_map).expect("an exchange");
        assert_eq!(best.tiles_played, 1);
        assert_eq!(best.tiles[0], 1);
    }
}
