//! The error and result types for the library.

use serde::{Deserialize, Serialize};
use std::{error::Error, fmt};

/// The [`Result`] type for loading and validation operations.
pub type EngineResult<T> = std::result::Result<T, EngineError>;

/// The error type for loading and validation operations. Errors inside
/// a running generation call are invariant violations and panic instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineError {
    /// The lexicon byte buffer was not a whole number of 32 bit words.
    LexiconSize,
    /// The lexicon had fewer than the two required root nodes.
    LexiconTooSmall,
    /// A lexicon node held an arc index beyond the end of the node pool.
    LexiconArcOutOfBounds {
        /// Index of the offending node.
        node: u32,
        /// The out of range arc index it carried.
        arc: u32,
    },
    /// The leave file ended before the declared node or value count.
    LeaveFileTruncated,
    /// The leave file's value count does not match the number of racks
    /// accepted by its key automaton.
    LeaveCountMismatch {
        /// Count declared in the file header.
        declared: u32,
        /// Count derived from the key automaton.
        derived: u32,
    },
    /// A rack or word was built from a character outside `A..=Z` / `?`.
    InvalidTileChar(char),
    /// A rack was given more than seven tiles.
    RackOverflow,
    /// A placement ran past the edge of the board.
    PlacementOutOfBounds,
    /// A placement wrote a tile onto an occupied square, or marked an
    /// empty square as a playthrough.
    PlacementOverlap,
}

impl Error for EngineError {}
impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::LexiconSize => {
                write!(f, "Lexicon bytes are not a whole number of 32 bit nodes")
            }
            EngineError::LexiconTooSmall => {
                write!(f, "A lexicon needs at least its two root nodes")
            }
            EngineError::LexiconArcOutOfBounds { node, arc } => {
                write!(f, "Node {} holds arc index {} beyond the node pool", node, arc)
            }
            EngineError::LeaveFileTruncated => {
                write!(f, "Leave file ended before the declared contents")
            }
            EngineError::LeaveCountMismatch { declared, derived } => write!(
                f,
                "Leave file declares {} values but its keys accept {} racks",
                declared, derived
            ),
            EngineError::InvalidTileChar(ch) => {
                write!(f, "'{}' is not a tile (expected A..=Z or ?)", ch)
            }
            EngineError::RackOverflow => write!(f, "A rack holds at most 7 tiles"),
            EngineError::PlacementOutOfBounds => {
                write!(f, "Placement runs past the edge of the board")
            }
            EngineError::PlacementOverlap => {
                write!(f, "Placement does not match the occupancy of the board")
            }
        }
    }
}
