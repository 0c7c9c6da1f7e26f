use std::env;

use log::info;
use ngram_lm_core::{Estimator, NGramStore, SmoothingConfig};

fn main() -> anyhow::Result<()> {
    // Set RUST_LOG=debug (or trace) to see store construction and backoff decisions
    env_logger::init();

    // First argument: count listing, second (optional): JSON smoothing configuration
    let mut args = env::args().skip(1);
    let counts_path = args.next().unwrap_or_else(|| "./data/counts.txt".to_owned());
    let config = match args.next() {
        Some(path) => SmoothingConfig::load(&path)?,
        None => SmoothingConfig::default(),
    };

    // Load the pre-computed n-gram counts (parsed on all cores)
    let store = NGramStore::from_counts_file(&counts_path)?;
    info!(
        "loaded {} contexts from {} (max order {})",
        store.context_count(),
        counts_path,
        store.max_order()
    );

    // The estimator only borrows the store
    let estimator = Estimator::new(&store, config)?;

    // Conditional probabilities, most recent context word last
    let queries: [(&str, &[&str]); 6] = [
        ("the", &[]),
        ("cat", &["the"]),
        ("sat", &["the", "cat"]),
        ("ran", &["the", "dog"]),
        ("cat", &["a"]),
        ("unicorn", &["the", "cat"]),
    ];
    for (word, context) in queries {
        let context: Vec<String> = context.iter().map(|w| (*w).to_owned()).collect();
        let p = estimator.probability(&word.to_owned(), &context)?;
        println!("P({} | {}) = {:.6}", word, context.join(" "), p);
    }

    // Whole sentences, scored with up to two words of history
    for sentence in ["the cat sat", "the dog barked", "sat the cat"] {
        let words: Vec<String> = sentence.split_whitespace().map(str::to_owned).collect();
        let score = estimator.sequence_log_probability(&words, store.max_order())?;
        println!("log P({}) = {:.4}", sentence, score);
    }

    Ok(())
}
