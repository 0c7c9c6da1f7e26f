//! Smoothed n-gram language model.
//!
//! This crate estimates the probability of a word given the words that
//! precede it, from pre-computed n-gram counts:
//! - A count store contract (`CountStore`) answering continuation queries
//! - An in-memory store (`NGramStore`) built from `(ngram, count)` records
//! - An absolute-discounting backoff estimator (`Estimator`) that blends
//!   each context with its shorter suffixes
//!
//! Only the model API and the error type are exposed publicly. File helpers
//! are kept internal.

/// Count stores and the smoothing estimator.
///
/// This module exposes the estimator, its configuration and the
/// count store contract it consumes.
pub mod model;

/// Error type shared by the store builders and the configuration.
pub mod error;

/// I/O utilities (count listing loading).
///
/// Not exposed
pub(crate) mod io;

pub use error::ModelError;
pub use model::config::SmoothingConfig;
pub use model::count_store::CountStore;
pub use model::estimator::{BackoffReason, Estimator, Interpolation, Level};
pub use model::ngram_store::NGramStore;
