//! Top-level module for the smoothed n-gram model.
//!
//! This module provides:
//! - The count store contract (`CountStore`)
//! - An in-memory count store (`NGramStore`)
//! - Internal per-context continuation tables (`ContextState`)
//! - Smoothing parameters (`SmoothingConfig`)
//! - The backoff estimator (`Estimator`)

/// Query contract between the estimator and any n-gram count storage.
///
/// Defines the three aggregate queries the estimator needs per context.
pub mod count_store;

/// In-memory n-gram count store.
///
/// Supports building from records, parallel construction, merging,
/// loading count listings and iterating stored n-grams.
pub mod ngram_store;

/// Continuation table of a single context.
///
/// Tracks the words observed after a context and their counts.
/// This module is not exposed publicly.
mod state;

/// Smoothing parameters with defaults, validation and JSON loading.
pub mod config;

/// Absolute-discounting backoff estimator.
///
/// Walks the context from its longest suffix down to the empty context
/// and interpolates discounted estimates on the way back up.
pub mod estimator;
