//! Leave values: the worth of the tiles kept back after a move.
//!
//! [`LeaveTable`] is the static table keyed by sorted racks (blanks
//! first); [`LeaveMap`] precomputes the values of every subset of one
//! starting rack so the generator can look the current leave up in
//! O(1) while placing and unplacing tiles.

use crate::{
    error::{EngineError, EngineResult},
    game::{rack::Rack, Equity},
    lexicon::{Lexicon, LexiconBuilder},
};
use log::debug;

/// Leave values for every rack of up to seven tiles, keyed by a DAWG
/// over sorted machine-code sequences (blank code 0 first). Each
/// accepting node maps to a unique rack; a per-node word count lets
/// lookup turn a rack into its value ordinal in O(rack length).
#[derive(Debug, Clone)]
pub struct LeaveTable {
    keys: Lexicon,
    values: Vec<Equity>,
    word_counts: Vec<u32>,
}

impl LeaveTable {
    /// Wraps a key pool and its ordinal-ordered values, deriving the
    /// per-node word counts by fixed-point iteration in reverse node
    /// order (sibling lists may point anywhere in the pool, so a
    /// single pass is not guaranteed to settle).
    pub fn new(pool: Vec<u32>, values: Vec<Equity>) -> EngineResult<Self> {
        let keys = Lexicon::new(pool)?;
        let word_counts = Self::count_words(&keys);
        let derived = match keys.dawg_root() {
            0 => 0,
            root => word_counts[root as usize],
        };
        if derived as usize != values.len() {
            return Err(EngineError::LeaveCountMismatch {
                declared: values.len() as u32,
                derived,
            });
        }
        debug!("leave table loaded: {} racks", values.len());
        Ok(Self {
            keys,
            values,
            word_counts,
        })
    }

    /// Decodes the little-endian leave file: `u32` node count, the
    /// nodes, `u32` value count, then the values in eighths.
    pub fn from_bytes(bytes: &[u8]) -> EngineResult<Self> {
        let (kwg_size, rest) = take_u32(bytes)?;
        let mut rest = rest;
        let mut pool = Vec::with_capacity(kwg_size as usize);
        for _ in 0..kwg_size {
            let (node, tail) = take_u32(rest)?;
            pool.push(node);
            rest = tail;
        }
        let (num_leaves, mut rest) = take_u32(rest)?;
        let mut values = Vec::with_capacity(num_leaves as usize);
        for _ in 0..num_leaves {
            match rest {
                [a, b, tail @ ..] => {
                    values.push(Equity(i16::from_le_bytes([*a, *b])));
                    rest = tail;
                }
                _ => return Err(EngineError::LeaveFileTruncated),
            }
        }
        if !rest.is_empty() {
            return Err(EngineError::LeaveFileTruncated);
        }
        Self::new(pool, values)
    }

    /// Serializes back to the little-endian leave file layout.
    pub fn to_bytes(&self) -> Vec<u8> {
        let nodes = self.keys.as_nodes();
        let mut bytes = Vec::with_capacity(8 + nodes.len() * 4 + self.values.len() * 2);
        bytes.extend_from_slice(&(nodes.len() as u32).to_le_bytes());
        for &node in nodes {
            bytes.extend_from_slice(&node.to_le_bytes());
        }
        bytes.extend_from_slice(&(self.values.len() as u32).to_le_bytes());
        for value in &self.values {
            bytes.extend_from_slice(&value.eighths().to_le_bytes());
        }
        bytes
    }

    /// Builds a table from `(rack, eighths)` pairs, e.g.
    /// `("?S", 196)`. Intended for fixtures and tools.
    pub fn from_racks(entries: &[(&str, i16)]) -> EngineResult<Self> {
        let mut keys = Vec::with_capacity(entries.len());
        for &(letters, _) in entries {
            let mut codes: Vec<u8> = Rack::from_letters(letters)?.codes().collect();
            codes.sort_unstable();
            keys.push(codes);
        }
        let pool = LexiconBuilder::build_dawg(&keys)?;
        let keys_lexicon = Lexicon::new(pool)?;
        let word_counts = Self::count_words(&keys_lexicon);
        let total = word_counts[keys_lexicon.dawg_root() as usize] as usize;

        let mut table = Self {
            keys: keys_lexicon,
            values: vec![Equity::ZERO; total],
            word_counts,
        };
        for (codes, &(_, eighths)) in keys.iter().zip(entries) {
            let ordinal = table
                .locate(codes)
                .expect("every entry was inserted into the key pool");
            table.values[ordinal] = Equity(eighths);
        }
        Ok(table)
    }

    /// The value of a leave given as ascending machine codes. Unknown
    /// racks and the empty leave are worth zero.
    pub fn value_of_codes(&self, codes: &[u8]) -> Equity {
        match self.locate(codes) {
            Some(ordinal) => self.values[ordinal],
            None => Equity::ZERO,
        }
    }

    /// The value of keeping back a whole rack.
    pub fn value_of(&self, rack: &Rack) -> Equity {
        let mut codes = [0u8; 7];
        let mut len = 0;
        for code in rack.codes() {
            codes[len] = code;
            len += 1;
        }
        self.value_of_codes(&codes[..len])
    }

    /// Finds the value ordinal of a sorted rack, walking earlier
    /// siblings' word counts as it descends.
    fn locate(&self, codes: &[u8]) -> Option<usize> {
        if codes.is_empty() {
            return None;
        }
        let mut ordinal = 0u32;
        let mut p = self.keys.dawg_root();
        for (i, &tile) in codes.iter().enumerate() {
            if p == 0 {
                return None;
            }
            let mut j = p;
            let node = loop {
                let node = self.keys.node(j);
                if node.tile() == tile {
                    break node;
                }
                if node.is_end() {
                    return None;
                }
                j += 1;
            };
            // racks routed through earlier siblings all come first
            ordinal += self.word_counts[p as usize] - self.word_counts[j as usize];
            if i + 1 == codes.len() {
                return match node.accepts() {
                    true => Some(ordinal as usize),
                    false => None,
                };
            }
            if node.accepts() {
                // the shorter rack ending here precedes its extensions
                ordinal += 1;
            }
            p = node.arc_index();
        }
        None
    }

    /// Per-node accepted-rack counts: each entry covers the node's own
    /// subtree plus every later sibling in its list.
    fn count_words(keys: &Lexicon) -> Vec<u32> {
        let n = keys.as_nodes().len();
        let mut counts = vec![0u32; n];
        // reverse order converges in one pass for typical layouts; the
        // outer loop covers pools whose arcs point forwards
        for _ in 0..=n {
            let mut changed = false;
            for i in (0..n).rev() {
                let node = keys.node(i as u32);
                let mut count = match node.arc_index() {
                    0 => 0,
                    arc => counts[arc as usize],
                };
                if node.accepts() {
                    count += 1;
                }
                if !node.is_end() && i + 1 < n {
                    count += counts[i + 1];
                }
                if counts[i] != count {
                    counts[i] = count;
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }
        counts
    }
}

/// Reads a little-endian `u32` off the front of a byte buffer.
fn take_u32(bytes: &[u8]) -> EngineResult<(u32, &[u8])> {
    match bytes {
        [a, b, c, d, rest @ ..] => Ok((u32::from_le_bytes([*a, *b, *c, *d]), rest)),
        _ => Err(EngineError::LeaveFileTruncated),
    }
}

/// The number of subsets of a full seven tile rack.
pub const LEAVE_MAP_SIZE: usize = 1 << 7;

/// Precomputed leave values for every subset of one starting rack.
///
/// Bits of the index mark removed tiles: ascending code order, the
/// k-th copy of a code owning bit `base_index[code] + k`. Taking and
/// restoring a tile flips a single bit, so the current leave value is
/// always one array read away.
#[derive(Debug, Clone)]
pub struct LeaveMap {
    values: [Equity; LEAVE_MAP_SIZE],
    best_leaves: [Equity; 8],
    base_index: [u8; 27],
    initial_counts: [u8; 27],
    counts_left: [u8; 27],
    current_index: usize,
    size: u8,
}

impl LeaveMap {
    /// Precomputes all `2.pow(rack len)` subset values for a starting
    /// rack. Without a table every leave is worth zero.
    pub fn new(table: Option<&LeaveTable>, rack: &Rack) -> Self {
        let size = rack.total();
        let n = size as usize;

        let counts = *rack.counts();
        let mut base_index = [0u8; 27];
        let mut bit = 0u8;
        for code in 0..27 {
            base_index[code] = bit;
            bit += counts[code];
        }

        let sorted: Vec<u8> = rack.codes().collect();
        let mut values = [Equity::ZERO; LEAVE_MAP_SIZE];
        let mut best_leaves = [Equity(i16::MIN); 8];
        let mut leave = [0u8; 7];
        for mask in 0..(1usize << n) {
            let mut len = 0;
            for (i, &code) in sorted.iter().enumerate() {
                if mask & (1 << i) == 0 {
                    leave[len] = code;
                    len += 1;
                }
            }
            let value = match table {
                Some(table) if len > 0 => table.value_of_codes(&leave[..len]),
                _ => Equity::ZERO,
            };
            values[mask] = value;
            if value > best_leaves[len] {
                best_leaves[len] = value;
            }
        }
        for best in best_leaves.iter_mut() {
            if *best == Equity(i16::MIN) {
                *best = Equity::ZERO;
            }
        }

        Self {
            values,
            best_leaves,
            base_index,
            initial_counts: counts,
            counts_left: counts,
            current_index: 0,
            size,
        }
    }

    /// Marks one copy of `code` as played.
    pub fn take(&mut self, code: u8) {
        let code = code as usize;
        assert!(self.counts_left[code] > 0, "took a tile that is not left");
        self.counts_left[code] -= 1;
        self.current_index |= 1 << (self.base_index[code] + self.counts_left[code]);
    }
    /// Restores one copy of `code`.
    pub fn put_back(&mut self, code: u8) {
        let code = code as usize;
        self.current_index &= !(1 << (self.base_index[code] + self.counts_left[code]));
        self.counts_left[code] += 1;
    }
    /// Forgets every placement.
    pub fn reset(&mut self) {
        self.counts_left = self.initial_counts;
        self.current_index = 0;
    }
    /// The value of the tiles currently left on the rack.
    pub fn current(&self) -> Equity {
        self.values[self.current_index]
    }
    /// The value of the leave after removing exactly the tiles in
    /// `mask` (bit order as documented on the type).
    pub fn subset_value(&self, mask: usize) -> Equity {
        self.values[mask]
    }
    /// The best value over all leaves of `len` tiles reachable from
    /// the starting rack.
    pub fn best_leave(&self, len: usize) -> Equity {
        self.best_leaves[len]
    }
    /// Number of tiles on the starting rack.
    pub fn size(&self) -> u8 {
        self.size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> LeaveTable {
        LeaveTable::from_racks(&[
            ("S", 64),
            ("?", 196),
            ("Q", -88),
            ("?S", 240),
            ("ER", 32),
            ("QS", -40),
        ])
        .expect("a leave table")
    }

    #[test]
    fn lookup() {
        let table = fixture();
        assert_eq!(table.value_of(&Rack::from_letters("S").unwrap()), Equity(64));
        assert_eq!(table.value_of(&Rack::from_letters("?").unwrap()), Equity(196));
        assert_eq!(table.value_of(&Rack::from_letters("Q").unwrap()), Equity(-88));
        assert_eq!(table.value_of(&Rack::from_letters("S?").unwrap()), Equity(240));
        assert_eq!(table.value_of(&Rack::from_letters("RE").unwrap()), Equity(32));
        // unknown racks and the empty leave fall back to zero
        assert_eq!(table.value_of(&Rack::from_letters("ZZ").unwrap()), Equity::ZERO);
        assert_eq!(table.value_of(&Rack::default()), Equity::ZERO);
    }

    #[test]
    fn byte_round_trip() {
        let table = fixture();
        let bytes = table.to_bytes();
        let reloaded = LeaveTable::from_bytes(&bytes).expect("a leave table");
        assert_eq!(reloaded.value_of_codes(&[0, 19]), Equity(240));
        assert_eq!(reloaded.value_of_codes(&[17]), Equity(-88));
        assert_eq!(
            LeaveTable::from_bytes(&bytes[..bytes.len() - 1]).unwrap_err(),
            EngineError::LeaveFileTruncated
        );
    }

    #[test]
    fn count_mismatch() {
        let table = fixture();
        let pool = table.keys.as_nodes().to_vec();
        assert!(matches!(
            LeaveTable::new(pool, vec![Equity::ZERO]).unwrap_err(),
            EngineError::LeaveCountMismatch { .. }
        ));
    }

    #[test]
    fn leave_map_tracks_subsets() {
        let table = fixture();
        let rack = Rack::from_letters("?QS").unwrap();
        let mut map = LeaveMap::new(Some(&table), &rack);

        // nothing played: the whole rack is the leave (unknown => 0)
        assert_eq!(map.current(), Equity::ZERO);

        // play the Q: leave is ?S
        map.take(17);
        assert_eq!(map.current(), Equity(240));
        // also play the S: leave is ?
        map.take(19);
        assert_eq!(map.current(), Equity(196));
        // restore the S, play the blank: leave is S
        map.put_back(19);
        map.take(0);
        assert_eq!(map.current(), Equity(64));

        map.reset();
        assert_eq!(map.current(), Equity::ZERO);
    }

    #[test]
    fn best_leaves_are_maxima() {
        let table = fixture();
        let rack = Rack::from_letters("?QS").unwrap();
        let map = LeaveMap::new(Some(&table), &rack);

        // size 1: max(S=64, ?=196, Q=-88)
        assert_eq!(map.best_leave(1), Equity(196));
        // size 2: max(?S=240, QS=-40, ?Q unknown=0)
        assert_eq!(map.best_leave(2), Equity(240));
        assert_eq!(map.best_leave(0), Equity::ZERO);
    }

    #[test]
    fn duplicate_codes_flip_distinct_bits() {
        let rack = Rack::from_letters("AAB").unwrap();
        let mut map = LeaveMap::new(None, &rack);
        map.take(1);
        map.take(1);
        let index_both = map.current_index;
        map.put_back(1);
        map.put_back(1);
        assert_eq!(map.current_index, 0);
        assert_eq!(index_both.count_ones(), 2);
    }
}
