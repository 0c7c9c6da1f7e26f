use std::collections::HashMap;
use std::convert::Infallible;
use std::hash::Hash;
use std::path::Path;
use std::sync::mpsc;
use std::thread;

use log::debug;

use super::count_store::CountStore;
use super::state::ContextState;
use crate::error::ModelError;
use crate::io::{parse_record, read_listing, significant_lines};

/// In-memory n-gram count store.
///
/// The `NGramStore` keeps one continuation table per observed context,
/// the empty context included, and answers the `CountStore` queries with
/// hash lookups.
///
/// # Responsibilities
/// - Aggregate `(ngram, count)` records into per-context continuation tables
/// - Build from large record lists or count listings on several threads
/// - Merge with another store
/// - Enumerate the stored n-grams of a given order
///
/// # Invariants
/// - A record `(ngram, count)` adds `count` to the continuation `ngram[i]`
///   of the context `ngram[..i]`, for every `i < ngram.len()`
/// - Only contexts with at least one continuation are stored
/// - `max_order` is the length of the longest record added
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NGramStore<W: Eq + Hash> {
	/// Mapping from a context to the words observed after it
	states: HashMap<Vec<W>, ContextState<W>>,

	/// Length of the longest record
	max_order: usize,
}

impl<W: Eq + Hash> Default for NGramStore<W> {
	fn default() -> Self {
		Self { states: HashMap::new(), max_order: 0 }
	}
}

impl<W: Eq + Hash + Clone> NGramStore<W> {
	/// Creates an empty store. Every query answers 0.
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds `count` occurrences of `ngram` to the store.
	///
	/// Every prefix of `ngram` gains one continuation: the word that
	/// follows it inside `ngram`.
	///
	/// # Notes
	/// - A zero count is ignored.
	///
	/// # Errors
	/// Returns `ModelError::EmptyNGram` if `ngram` has no words.
	pub fn add_ngram(&mut self, ngram: &[W], count: u64) -> Result<(), ModelError> {
		if ngram.is_empty() {
			return Err(ModelError::EmptyNGram);
		}
		if count == 0 {
			return Ok(());
		}

		self.max_order = self.max_order.max(ngram.len());
		for (i, word) in ngram.iter().enumerate() {
			let context = &ngram[..i];
			match self.states.get_mut(context) {
				Some(state) => state.add_continuation(word.clone(), count),
				None => {
					let mut state = ContextState::new();
					state.add_continuation(word.clone(), count);
					self.states.insert(context.to_vec(), state);
				}
			}
		}
		Ok(())
	}

	/// Builds a store from `(ngram, count)` records on the current thread.
	///
	/// # Errors
	/// Returns `ModelError::EmptyNGram` on the first record without words.
	pub fn from_ngrams<I>(records: I) -> Result<Self, ModelError>
	where
		I: IntoIterator<Item = (Vec<W>, u64)>,
	{
		let mut store = Self::new();
		for (ngram, count) in records {
			store.add_ngram(&ngram, count)?;
		}
		debug!("built count store: {} contexts, max order {}", store.context_count(), store.max_order);
		Ok(store)
	}

	/// Builds a store from `(ngram, count)` records on several threads.
	///
	/// Produces the same store as `from_ngrams`.
	///
	/// # Behavior
	/// - Splits the records into chunks (based on CPU cores * factor).
	/// - Builds one partial store per chunk on a scoped thread.
	/// - Merges the partial stores as they arrive on the channel.
	pub fn from_ngrams_parallel(records: &[(Vec<W>, u64)]) -> Result<Self, ModelError>
	where
		W: Send + Sync,
	{
		Self::build_in_chunks(records, |chunk| {
			let mut partial_store = Self::new();
			for (ngram, count) in chunk {
				partial_store.add_ngram(ngram, *count)?;
			}
			Ok(partial_store)
		})
	}

	/// Splits `items` into chunks, builds a partial store per chunk in
	/// parallel and merges them.
	///
	/// # Notes
	/// - Partial stores are merged in arrival order; counts are summed so
	///   the result does not depend on it.
	/// - When several chunks fail, the error of the earliest listing line
	///   is returned.
	fn build_in_chunks<T, F>(items: &[T], build: F) -> Result<Self, ModelError>
	where
		T: Sync,
		W: Send,
		F: Fn(&[T]) -> Result<Self, ModelError> + Sync,
	{
		if items.is_empty() {
			return Ok(Self::new());
		}

		let cpus = num_cpus::get();
		let factor = 8;
		let chunks = cpus * factor;
		let chunk_size = items.len().div_ceil(chunks);

		let (tx, rx) = mpsc::channel();
		thread::scope(|scope| {
			for chunk in items.chunks(chunk_size) {
				let tx = tx.clone();
				let build = &build;
				scope.spawn(move || {
					// The receiver outlives the scope
					let _ = tx.send(build(chunk));
				});
			}
		});
		drop(tx);

		let mut final_store = Self::new();
		let mut failure: Option<ModelError> = None;
		for partial_store in rx.iter() {
			match partial_store {
				Ok(partial_store) => final_store.merge(&partial_store),
				Err(err) => failure = Some(earliest_error(failure, err)),
			}
		}

		if let Some(err) = failure {
			return Err(err);
		}
		debug!(
			"built count store from {} chunks: {} contexts, max order {}",
			items.len().div_ceil(chunk_size),
			final_store.context_count(),
			final_store.max_order
		);
		Ok(final_store)
	}

	/// Merges another store into this one.
	///
	/// # Notes
	/// - Continuation counts of matching contexts are summed.
	/// - Contexts only present in `other` are cloned.
	pub fn merge(&mut self, other: &Self) {
		for (context, state) in &other.states {
			if let Some(existing) = self.states.get_mut(context) {
				existing.merge(state);
			} else {
				self.states.insert(context.clone(), state.clone());
			}
		}
		self.max_order = self.max_order.max(other.max_order);
	}

	/// Iterates over every stored n-gram of length `order` with its count.
	///
	/// The count of an n-gram is the sum of the counts of all records
	/// starting with it. Iteration order is unspecified. `order == 0`
	/// yields nothing.
	pub fn ngrams(&self, order: usize) -> impl Iterator<Item = (Vec<W>, u64)> + '_ {
		self.states
			.iter()
			.filter(move |(context, _)| order > 0 && context.len() + 1 == order)
			.flat_map(|(context, state)| {
				state.continuations().map(move |(word, count)| {
					let mut ngram = Vec::with_capacity(context.len() + 1);
					ngram.extend_from_slice(context);
					ngram.push(word.clone());
					(ngram, count)
				})
			})
	}
}

impl<W: Eq + Hash> NGramStore<W> {
	/// Length of the longest record added to the store.
	pub fn max_order(&self) -> usize {
		self.max_order
	}

	/// Number of contexts with at least one continuation.
	pub fn context_count(&self) -> usize {
		self.states.len()
	}

	/// Returns `true` if no record has been added.
	pub fn is_empty(&self) -> bool {
		self.states.is_empty()
	}
}

impl NGramStore<String> {
	/// Loads a count listing from a file.
	///
	/// # Format
	/// One record per line: whitespace separated words followed by the
	/// count. Blank lines and lines starting with `#` are ignored.
	/// ```text
	/// # unigrams and bigrams
	/// the 120
	/// the cat 14
	/// ```
	///
	/// # Errors
	/// - `ModelError::Io` if the file cannot be read.
	/// - `ModelError::Format` for the earliest malformed line.
	pub fn from_counts_file<P: AsRef<Path>>(path: P) -> Result<Self, ModelError> {
		let lines = read_listing(&path)?;
		debug!("loading {} count records from {}", lines.len(), path.as_ref().display());
		Self::from_listing(&lines)
	}

	/// Loads a count listing already held in memory.
	///
	/// Same format and errors as `from_counts_file`.
	pub fn from_counts_lines(contents: &str) -> Result<Self, ModelError> {
		Self::from_listing(&significant_lines(contents))
	}

	fn from_listing(lines: &[(usize, String)]) -> Result<Self, ModelError> {
		Self::build_in_chunks(lines, |chunk| {
			let mut partial_store = Self::new();
			for (line, text) in chunk {
				let (words, count) = parse_record(text)
					.map_err(|message| ModelError::Format { line: *line, message })?;
				partial_store.add_ngram(&words, count)?;
			}
			Ok(partial_store)
		})
	}
}

impl<W: Eq + Hash> CountStore<W> for NGramStore<W> {
	type Error = Infallible;

	fn total_continuations(&self, context: &[W]) -> Result<u64, Self::Error> {
		Ok(self.states.get(context).map_or(0, ContextState::total))
	}

	fn distinct_continuations(&self, context: &[W]) -> Result<u64, Self::Error> {
		Ok(self.states.get(context).map_or(0, ContextState::distinct))
	}

	fn count_of(&self, context: &[W], word: &W) -> Result<u64, Self::Error> {
		Ok(self.states.get(context).map_or(0, |state| state.count(word)))
	}
}

/// Keeps the error that points at the earliest listing line.
fn earliest_error(current: Option<ModelError>, candidate: ModelError) -> ModelError {
	match current {
		Some(current) if error_line(&current) <= error_line(&candidate) => current,
		_ => candidate,
	}
}

fn error_line(err: &ModelError) -> usize {
	match err {
		ModelError::Format { line, .. } => *line,
		_ => usize::MAX,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn words(text: &str) -> Vec<String> {
		text.split_whitespace().map(str::to_owned).collect()
	}

	fn sample_records() -> Vec<(Vec<String>, u64)> {
		vec![
			(words("the cat sat"), 2),
			(words("the cat ran"), 1),
			(words("the dog"), 3),
			(words("a cat"), 1),
		]
	}

	fn sample_store() -> NGramStore<String> {
		NGramStore::from_ngrams(sample_records()).unwrap()
	}

	#[test]
	fn test_empty_context_covers_all_records() {
		let store = sample_store();
		assert_eq!(store.total_continuations(&[]).unwrap(), 7);
		assert_eq!(store.distinct_continuations(&[]).unwrap(), 2);
		assert_eq!(store.count_of(&[], &"the".to_owned()).unwrap(), 6);
		assert_eq!(store.count_of(&[], &"a".to_owned()).unwrap(), 1);
	}

	#[test]
	fn test_prefix_aggregation() {
		let store = sample_store();
		assert_eq!(store.total_continuations(&words("the")).unwrap(), 6);
		assert_eq!(store.distinct_continuations(&words("the")).unwrap(), 2);
		assert_eq!(store.count_of(&words("the"), &"cat".to_owned()).unwrap(), 3);

		assert_eq!(store.total_continuations(&words("the cat")).unwrap(), 3);
		assert_eq!(store.distinct_continuations(&words("the cat")).unwrap(), 2);
		assert_eq!(store.count_of(&words("the cat"), &"sat".to_owned()).unwrap(), 2);
	}

	#[test]
	fn test_unseen_queries_answer_zero() {
		let store = sample_store();
		// "the dog" only appears as a full record, it has no continuation
		assert_eq!(store.total_continuations(&words("the dog")).unwrap(), 0);
		assert_eq!(store.distinct_continuations(&words("the dog")).unwrap(), 0);
		assert_eq!(store.total_continuations(&words("zebra")).unwrap(), 0);
		assert_eq!(store.count_of(&words("zebra"), &"cat".to_owned()).unwrap(), 0);
		assert_eq!(store.count_of(&[], &"zebra".to_owned()).unwrap(), 0);

		let empty = NGramStore::<String>::new();
		assert!(empty.is_empty());
		assert_eq!(empty.total_continuations(&[]).unwrap(), 0);
		assert_eq!(empty.distinct_continuations(&[]).unwrap(), 0);
	}

	#[test]
	fn test_empty_ngram_is_rejected() {
		let mut store = NGramStore::<String>::new();
		assert!(matches!(store.add_ngram(&[], 3), Err(ModelError::EmptyNGram)));
		assert!(matches!(NGramStore::from_ngrams(vec![(Vec::<String>::new(), 1)]), Err(ModelError::EmptyNGram)));
	}

	#[test]
	fn test_zero_count_is_ignored() {
		let mut store = NGramStore::<&str>::new();
		store.add_ngram(&["x", "y"], 0).unwrap();
		assert!(store.is_empty());
		assert_eq!(store.max_order(), 0);
	}

	#[test]
	fn test_max_order_and_ngrams() {
		let store = sample_store();
		assert_eq!(store.max_order(), 3);
		assert_eq!(store.context_count(), 4);

		let mut bigrams: Vec<(Vec<String>, u64)> = store.ngrams(2).collect();
		bigrams.sort();
		assert_eq!(
			bigrams,
			vec![(words("a cat"), 1), (words("the cat"), 3), (words("the dog"), 3)]
		);
		assert_eq!(store.ngrams(1).count(), 2);
		assert_eq!(store.ngrams(0).count(), 0);
		assert_eq!(store.ngrams(4).count(), 0);
	}

	#[test]
	fn test_merge_sums_counts() {
		let mut left = NGramStore::from_ngrams(vec![(words("the cat"), 2)]).unwrap();
		let right = NGramStore::from_ngrams(vec![(words("the cat"), 1), (words("a dog barks"), 4)]).unwrap();
		left.merge(&right);

		assert_eq!(left.count_of(&words("the"), &"cat".to_owned()).unwrap(), 3);
		assert_eq!(left.total_continuations(&[]).unwrap(), 7);
		assert_eq!(left.max_order(), 3);
	}

	#[test]
	fn test_parallel_build_matches_sequential() {
		let mut records = Vec::new();
		for i in 0..500u64 {
			let ngram = vec![format!("w{}", i % 7), format!("w{}", i % 11), format!("w{}", i % 13)];
			records.push((ngram, i % 5 + 1));
		}
		let sequential = NGramStore::from_ngrams(records.clone()).unwrap();
		let parallel = NGramStore::from_ngrams_parallel(&records).unwrap();
		assert_eq!(sequential, parallel);

		let empty: Vec<(Vec<String>, u64)> = Vec::new();
		assert!(NGramStore::from_ngrams_parallel(&empty).unwrap().is_empty());
	}

	#[test]
	fn test_counts_lines() {
		let store = NGramStore::from_counts_lines("# sample\nthe cat sat 2\n\nthe dog 3\n").unwrap();
		assert_eq!(store.total_continuations(&[]).unwrap(), 5);
		assert_eq!(store.count_of(&words("the"), &"dog".to_owned()).unwrap(), 3);
	}

	#[test]
	fn test_counts_lines_reports_earliest_error() {
		let mut listing = String::new();
		for i in 0..300 {
			listing.push_str(&format!("w{} w{} {}\n", i, i + 1, i + 1));
		}
		listing.push_str("broken line x\n");
		listing.push_str("also broken\n");
		listing.insert_str(0, "bad\n");

		match NGramStore::from_counts_lines(&listing) {
			Err(ModelError::Format { line, .. }) => assert_eq!(line, 1),
			other => panic!("expected a format error, got {:?}", other),
		}
	}
}
