//! Builds packed node pools from word lists: a DAWG plus a GADDAG for
//! the playing lexicon, or a bare DAWG for leave keys.

use crate::{
    error::{EngineError, EngineResult},
    game::tile::Letter,
    lexicon::{Lexicon, SEPARATOR},
};
use super::MAX_NODES;
use itertools::Itertools;
use std::collections::{BTreeMap, HashMap, VecDeque};

#[derive(Default)]
struct TrieNode {
    edges: BTreeMap<u8, usize>,
    accepts: bool,
}

/// A minimized node after suffix sharing.
struct MergedNode {
    accepts: bool,
    edges: Vec<(u8, usize)>,
}

/// Constructs the packed node pool described in
/// [`lexicon`](crate::lexicon) from in-memory sequences, for tests,
/// tools and callers that start from a plain word list rather than a
/// serialized lexicon.
pub struct LexiconBuilder {
    nodes: Vec<TrieNode>,
}

impl LexiconBuilder {
    fn with_roots(count: usize) -> Self {
        let mut nodes = Vec::new();
        nodes.resize_with(count, TrieNode::default);
        Self { nodes }
    }

    /// Builds a full playing lexicon: DAWG over the words and GADDAG
    /// over every separator rotation of each word.
    pub fn from_words(words: &[&str]) -> EngineResult<Lexicon> {
        let mut builder = Self::with_roots(2);
        let mut scratch = Vec::new();
        for word in words.iter().unique() {
            let mut codes = Vec::with_capacity(word.len());
            for ch in word.chars() {
                match Letter::from_char(ch) {
                    Some(letter) => codes.push(letter.code()),
                    None => return Err(EngineError::InvalidTileChar(ch)),
                }
            }
            if codes.is_empty() {
                continue;
            }
            builder.insert(0, &codes);

            // the fully reversed word, accepting with no separator
            scratch.clear();
            scratch.extend(codes.iter().rev());
            builder.insert(1, &scratch);

            // every proper split: reversed prefix, separator, suffix
            for split in 1..codes.len() {
                scratch.clear();
                scratch.extend(codes[..split].iter().rev());
                scratch.push(SEPARATOR);
                scratch.extend_from_slice(&codes[split..]);
                builder.insert(1, &scratch);
            }
        }
        Lexicon::new(builder.into_pool(true)?)
    }

    /// Builds a bare DAWG pool over arbitrary code sequences (leave
    /// keys use code 0 for the blank). The second root slot stays a
    /// dead end.
    pub fn build_dawg(seqs: &[Vec<u8>]) -> EngineResult<Vec<u32>> {
        let mut builder = Self::with_roots(1);
        for seq in seqs {
            if !seq.is_empty() {
                builder.insert(0, seq);
            }
        }
        builder.into_pool(false)
    }

    fn insert(&mut self, root: usize, seq: &[u8]) {
        let mut at = root;
        for &tile in seq {
            at = match self.nodes[at].edges.get(&tile) {
                Some(&next) => next,
                None => {
                    let next = self.nodes.len();
                    self.nodes.push(TrieNode::default());
                    self.nodes[at].edges.insert(tile, next);
                    next
                }
            };
        }
        self.nodes[at].accepts = true;
    }

    /// Merges equivalent subtrees bottom-up, returning the merged
    /// arena and the merged ids of the trie roots.
    fn minimize(&self, roots: &[usize]) -> (Vec<MergedNode>, Vec<usize>) {
        let mut merged: Vec<MergedNode> = Vec::new();
        let mut memo: HashMap<(bool, Vec<(u8, usize)>), usize> = HashMap::new();
        let mut mapping: Vec<Option<usize>> = vec![None; self.nodes.len()];

        fn merge_from(
            at: usize,
            nodes: &[TrieNode],
            merged: &mut Vec<MergedNode>,
            memo: &mut HashMap<(bool, Vec<(u8, usize)>), usize>,
            mapping: &mut Vec<Option<usize>>,
        ) -> usize {
            if let Some(id) = mapping[at] {
                return id;
            }
            let edges: Vec<(u8, usize)> = nodes[at]
                .edges
                .iter()
                .map(|(&tile, &child)| (tile, merge_from(child, nodes, merged, memo, mapping)))
                .collect();
            let key = (nodes[at].accepts, edges);
            let id = match memo.get(&key) {
                Some(&id) => id,
                None => {
                    let id = merged.len();
                    merged.push(MergedNode {
                        accepts: key.0,
                        edges: key.1.clone(),
                    });
                    memo.insert(key, id);
                    id
                }
            };
            mapping[at] = Some(id);
            id
        }

        let merged_roots = roots
            .iter()
            .map(|&root| merge_from(root, &self.nodes, &mut merged, &mut memo, &mut mapping))
            .collect();
        (merged, merged_roots)
    }

    /// Lays the merged automaton out as a packed pool: two header
    /// nodes, then one contiguous sibling block per reachable state.
    fn into_pool(self, with_gaddag: bool) -> EngineResult<Vec<u32>> {
        let roots: Vec<usize> = if with_gaddag { vec![0, 1] } else { vec![0] };
        let (merged, merged_roots) = self.minimize(&roots);

        // breadth-first block assignment from the roots
        let mut starts: Vec<u32> = vec![0; merged.len()];
        let mut order: Vec<usize> = Vec::with_capacity(merged.len());
        let mut seen = vec![false; merged.len()];
        let mut queue: VecDeque<usize> = VecDeque::new();
        for &root in &merged_roots {
            // both roots can merge to one state on degenerate inputs
            if !seen[root] {
                seen[root] = true;
                queue.push_back(root);
            }
        }
        while let Some(state) = queue.pop_front() {
            order.push(state);
            for &(_, child) in &merged[state].edges {
                if !seen[child] {
                    seen[child] = true;
                    queue.push_back(child);
                }
            }
        }

        let mut next = 2u32;
        for &state in &order {
            if !merged[state].edges.is_empty() {
                starts[state] = next;
                next += merged[state].edges.len() as u32;
            }
        }
        if next as usize > MAX_NODES {
            return Err(EngineError::LexiconSize);
        }

        const IS_END: u32 = 1 << 22;
        const ACCEPTS: u32 = 1 << 23;

        let mut pool = vec![0u32; next as usize];
        pool[0] = IS_END | starts[merged_roots[0]];
        pool[1] = IS_END
            | match merged_roots.get(1) {
                Some(&gaddag) => starts[gaddag],
                None => 0,
            };
        for &state in &order {
            if merged[state].edges.is_empty() {
                continue;
            }
            let block = starts[state];
            let last = merged[state].edges.len() - 1;
            for (offset, &(tile, child)) in merged[state].edges.iter().enumerate() {
                let mut word = ((tile as u32) << 24) | starts[child];
                if merged[child].accepts {
                    word |= ACCEPTS;
                }
                if offset == last {
                    word |= IS_END;
                }
                pool[(block + offset as u32) as usize] = word;
            }
        }
        Ok(pool)
    }
}
