//! An equity-driven Scrabble move generator.
//!
//! Given a board, a rack, a lexicon (DAWG + GADDAG in one packed node
//! pool) and optionally a leave-value table, [`generate_moves`]
//! returns the single move of maximum equity -- score plus the value
//! of the tiles kept back -- with fully deterministic tiebreaking.
//! Anchors are expanded best-first under admissible shadow bounds, so
//! most positions finish after touching only a handful of them.

// Produce a compiler warning for missing documentation.
#![warn(missing_docs)]

pub mod error;
pub mod game;
pub mod leaves;
pub mod lexicon;
pub mod movegen;

pub use error::{EngineError, EngineResult};
pub use game::{
    board::Board,
    play::{Direction, Move, MoveKind},
    rack::Rack,
    Equity,
};
pub use leaves::{LeaveMap, LeaveTable};
pub use lexicon::{Lexicon, LexiconBuilder};
pub use movegen::generate_moves;
