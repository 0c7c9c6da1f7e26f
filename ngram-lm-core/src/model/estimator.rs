use log::{debug, trace};

use super::config::SmoothingConfig;
use super::count_store::CountStore;
use crate::error::ModelError;

/// Why a context level was skipped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackoffReason {
	/// No word was ever observed after the context.
	NoContinuations,
	/// The context total is below `min_evidence`.
	Sparse,
}

/// Discounted estimate of one context level and the weight left to the
/// lower-order model.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Interpolation {
	/// `max(0, count - delta) / total`
	pub direct: f64,
	/// `delta * unique / total`
	pub backoff_weight: f64,
}

impl Interpolation {
	/// Blends the direct estimate with the estimate of the shorter context.
	pub fn blend(&self, lower: f64) -> f64 {
		self.direct + self.backoff_weight * lower
	}
}

/// Decision taken at a single context level.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Level {
	/// The level contributes nothing; the shorter context decides alone.
	Backoff(BackoffReason),
	/// The empty context has no continuation at all.
	Fallback(f64),
	/// Non-empty context with enough evidence.
	Interpolate(Interpolation),
	/// Empty context: the backoff mass is spread over `unique` words.
	Unigram { terms: Interpolation, unique: u64 },
}

/// Absolute-discounting backoff estimator over a count store.
///
/// Computes `P(word | context)` by discounting the counts of the context,
/// then blending with the estimate of the same word after the context
/// with its oldest word dropped, down to the empty context.
///
/// # Responsibilities
/// - Decide, level by level, whether a context has enough evidence
/// - Interpolate the discounted estimate with the lower-order estimate
/// - Forward count store failures unchanged
///
/// # Invariants
/// - The configuration is validated once and never changes
/// - The store is only read; no state is kept between queries
pub struct Estimator<'a, S: ?Sized> {
	store: &'a S,
	config: SmoothingConfig,
}

impl<S: ?Sized> Clone for Estimator<'_, S> {
	fn clone(&self) -> Self {
		*self
	}
}

impl<S: ?Sized> Copy for Estimator<'_, S> {}

impl<S: ?Sized> std::fmt::Debug for Estimator<'_, S> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Estimator").field("config", &self.config).finish_non_exhaustive()
	}
}

impl<'a, S: ?Sized> Estimator<'a, S> {
	/// Creates an estimator with a custom configuration.
	///
	/// # Errors
	/// Returns `ModelError::InvalidParameter` if the configuration is out
	/// of range (see `SmoothingConfig::validate`).
	pub fn new(store: &'a S, config: SmoothingConfig) -> Result<Self, ModelError> {
		config.validate()?;
		debug!("estimator configured: {:?}", config);
		Ok(Self { store, config })
	}

	/// Creates an estimator with `delta = 0.75`, `eps = 1.0`, a
	/// minimum evidence of 10 and a fallback of 1.0.
	pub fn with_defaults(store: &'a S) -> Self {
		Self { store, config: SmoothingConfig::default() }
	}

	pub fn config(&self) -> &SmoothingConfig {
		&self.config
	}

	pub fn store(&self) -> &'a S {
		self.store
	}

	/// Smoothed probability of `word` after `context`.
	///
	/// The context is read most recent word last. Backoff always drops the
	/// oldest word.
	///
	/// # Notes
	/// - Walks suffixes from the full context down to the first terminal
	///   level, then folds the interpolations back up. Each step computes
	///   the same expression as the recursive definition, so results are
	///   bit-identical to it.
	/// - The result is not normalized over the vocabulary. With the
	///   default configuration it lies in `[0, 1]`.
	///
	/// # Errors
	/// Only errors of the count store, returned as is.
	pub fn probability<W>(&self, word: &W, context: &[W]) -> Result<f64, S::Error>
	where
		S: CountStore<W>,
	{
		let mut pending: Vec<Interpolation> = Vec::with_capacity(context.len());
		let mut start = 0;

		let mut probability = loop {
			let suffix = &context[start..];
			match self.level(word, suffix)? {
				Level::Backoff(reason) => {
					trace!("backing off from context of length {}: {:?}", suffix.len(), reason);
				}
				Level::Interpolate(terms) => pending.push(terms),
				Level::Fallback(value) => break value,
				Level::Unigram { terms, unique } => {
					break terms.direct + terms.backoff_weight * self.config.eps / unique as f64;
				}
			}
			// Only the empty context is terminal, and it is always reached
			start += 1;
		};

		for terms in pending.iter().rev() {
			probability = terms.blend(probability);
		}
		Ok(probability)
	}

	/// Decision taken for exactly `context`, without looking at shorter
	/// contexts.
	///
	/// # Behavior
	/// 1. `total = max(1, total_continuations)`, `unique = distinct_continuations`
	/// 2. `unique == 0`: `Fallback` for the empty context, `Backoff` otherwise
	/// 3. Non-empty context with `total < min_evidence`: `Backoff`
	/// 4. Otherwise the discounted terms, as `Unigram` for the empty context
	pub fn level<W>(&self, word: &W, context: &[W]) -> Result<Level, S::Error>
	where
		S: CountStore<W>,
	{
		let total = self.store.total_continuations(context)?.max(1);
		let unique = self.store.distinct_continuations(context)?;

		if unique == 0 {
			if context.is_empty() {
				return Ok(Level::Fallback(self.config.empty_fallback));
			}
			return Ok(Level::Backoff(BackoffReason::NoContinuations));
		}

		if total < self.config.min_evidence && !context.is_empty() {
			return Ok(Level::Backoff(BackoffReason::Sparse));
		}

		let count = self.store.count_of(context, word)?;
		let terms = Interpolation {
			direct: (count as f64 - self.config.delta).max(0.0) / total as f64,
			backoff_weight: self.config.delta * unique as f64 / total as f64,
		};

		if context.is_empty() {
			Ok(Level::Unigram { terms, unique })
		} else {
			Ok(Level::Interpolate(terms))
		}
	}

	/// Natural-log probability of a whole word sequence.
	///
	/// Each word is conditioned on at most `order - 1` preceding words of
	/// the sequence (`order == 0` behaves like 1). An empty sequence scores
	/// `0.0`; a word with zero probability makes the score `-inf`.
	pub fn sequence_log_probability<W>(&self, words: &[W], order: usize) -> Result<f64, S::Error>
	where
		S: CountStore<W>,
	{
		let history = order.max(1) - 1;
		let mut log_probability = 0.0;
		for (i, word) in words.iter().enumerate() {
			let start = i.saturating_sub(history);
			log_probability += self.probability(word, &words[start..i])?.ln();
		}
		Ok(log_probability)
	}
}
