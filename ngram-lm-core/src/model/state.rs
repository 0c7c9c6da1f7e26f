use std::collections::HashMap;
use std::hash::Hash;

/// Continuation table of one context in the count store.
///
/// A `ContextState` corresponds to a fixed context (a word prefix) and
/// stores every word observed right after it, with its count.
///
/// ## Responsibilities:
/// - Accumulate continuation counts while the store is built
/// - Answer the total / distinct / per-word queries of the store contract
/// - Merge with the state of the same context from another store
///
/// ## Invariants
/// - `total` always equals the sum of `continuations`
/// - Each continuation count is strictly positive
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ContextState<W: Eq + Hash> {
	/// Words observed after the context.
	/// Example: { "cat" => 42, "dog" => 3 }
	continuations: HashMap<W, u64>,
	/// Cached sum of `continuations`.
	total: u64,
}

impl<W: Eq + Hash> ContextState<W> {
	/// Creates a new empty state.
	pub(crate) fn new() -> Self {
		Self {
			continuations: HashMap::new(),
			total: 0,
		}
	}

	/// Records `count` more occurrences of `word` after this context.
	///
	/// A zero count leaves the state untouched so that absent words are
	/// never stored with a zero entry.
	pub(crate) fn add_continuation(&mut self, word: W, count: u64) {
		if count == 0 {
			return;
		}
		let entry = self.continuations.entry(word).or_insert(0);
		*entry = entry.saturating_add(count);
		self.total = self.total.saturating_add(count);
	}

	/// Sum of all continuation counts.
	pub(crate) fn total(&self) -> u64 {
		self.total
	}

	/// Number of distinct continuation words.
	pub(crate) fn distinct(&self) -> u64 {
		self.continuations.len() as u64
	}

	/// Count of a single continuation, 0 if never observed.
	pub(crate) fn count(&self, word: &W) -> u64 {
		self.continuations.get(word).copied().unwrap_or(0)
	}

	/// Iterates over `(word, count)` pairs in unspecified order.
	pub(crate) fn continuations(&self) -> impl Iterator<Item = (&W, u64)> {
		self.continuations.iter().map(|(word, count)| (word, *count))
	}

	/// Merges another state of the same context into this one.
	///
	/// Continuation counts are summed.
	pub(crate) fn merge(&mut self, other: &Self)
	where
		W: Clone,
	{
		for (word, count) in &other.continuations {
			self.add_continuation(word.clone(), *count);
		}
	}
}
