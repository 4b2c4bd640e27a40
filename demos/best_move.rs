use equigen::{generate_moves, Board, Direction, LexiconBuilder, Move, Rack};

fn main() {
    env_logger::init();

    // a small built-in list so the demo runs standalone; use the
    // build_lexicon demo plus Lexicon::from_bytes for a real one
    let lexicon = LexiconBuilder::from_words(&[
        "AT", "TA", "AS", "CAT", "CATS", "ACT", "SAT", "TAS", "EAT", "EATS", "SEAT", "TEAS",
        "RATE", "RATES", "IRATE", "SATIRE", "SATIRES",
    ])
    .unwrap();

    let mut board = Board::new();
    board
        .apply_move(&Move::place(7, 6, Direction::Horizontal, &[3, 1, 20])) // CAT
        .unwrap();
    board.update_cross_sets(&lexicon);

    let rack = Rack::from_letters("SATIRE?").unwrap();

    println!("{}", board);
    println!(":: Rack {}", rack);
    match generate_moves(&board, &rack, None, &lexicon, None, 86) {
        Some(best) => println!(":: Best move: {} (equity {})", best, best.equity),
        None => println!(":: No move available, pass"),
    }
}
