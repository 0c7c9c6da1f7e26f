/// Read-only access to n-gram counts, as consumed by the estimator.
///
/// A context is a slice of words, most recent word last. The empty
/// context is valid and covers the whole corpus.
///
/// # Contract
/// - Every query is answered for any context or word, seen or not.
///   Unseen data yields `Ok(0)`, never an error.
/// - `Err` is reserved for failures of the backing storage itself
///   (corrupted data, unreadable pages, ...). The estimator forwards such
///   errors to its caller unchanged.
/// - Implementations must not change their answers while an estimator
///   borrows them.
pub trait CountStore<W> {
	/// Failure of the backing storage.
	type Error: std::error::Error;

	/// Sum of the counts of every continuation observed after `context`.
	fn total_continuations(&self, context: &[W]) -> Result<u64, Self::Error>;

	/// Number of distinct words observed immediately after `context`.
	fn distinct_continuations(&self, context: &[W]) -> Result<u64, Self::Error>;

	/// Raw count of the n-gram formed by `context` followed by `word`.
	fn count_of(&self, context: &[W], word: &W) -> Result<u64, Self::Error>;
}

impl<W, S: CountStore<W> + ?Sized> CountStore<W> for &S {
	type Error = S::Error;

	fn total_continuations(&self, context: &[W]) -> Result<u64, Self::Error> {
		(**self).total_continuations(context)
	}

	fn distinct_continuations(&self, context: &[W]) -> Result<u64, Self::Error> {
		(**self).distinct_continuations(context)
	}

	fn count_of(&self, context: &[W], word: &W) -> Result<u64, Self::Error> {
		(**self).count_of(context, word)
	}
}
