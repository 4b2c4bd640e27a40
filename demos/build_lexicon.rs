use equigen::LexiconBuilder;
use std::{
    env,
    fs::{self, File},
    io::{BufRead, BufReader},
};

fn main() {
    let path = env::args().nth(1).unwrap_or_else(|| "words.txt".into());

    // read the word list, one word per line
    let file = File::open(&path).unwrap();
    let reader = BufReader::new(file);
    let words: Vec<String> = reader
        .lines()
        .flatten()
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect();
    let words: Vec<&str> = words.iter().map(String::as_str).collect();

    println!(":: Building lexicon from '{}' ({} words)", path, words.len());
    let lexicon = LexiconBuilder::from_words(&words).unwrap();

    // write the node pool as little-endian words
    println!(
        ":: Writing file 'lexicon.bin' ({} nodes)",
        lexicon.as_nodes().len()
    );
    let mut bytes = Vec::with_capacity(lexicon.as_nodes().len() * 4);
    for &node in lexicon.as_nodes() {
        bytes.extend_from_slice(&node.to_le_bytes());
    }
    fs::write("lexicon.bin", &bytes).unwrap();
}
