use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Smoothing parameters of the estimator.
///
/// Values are checked by `validate`, which `Estimator::new` calls, so an
/// estimator never runs with an out-of-range parameter.
///
/// # JSON
/// Every field is optional; missing fields take their default.
/// ```json
/// { "delta": 0.5, "min_evidence": 5 }
/// ```
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct SmoothingConfig {
	/// Absolute discount subtracted from every observed count, in `[0, 1]`.
	#[serde(default = "default_delta")]
	pub delta: f64,

	/// Unseen mass spread uniformly over the distinct continuations of the
	/// empty context. Non-negative.
	#[serde(default = "default_eps")]
	pub eps: f64,

	/// Contexts whose total continuation count is below this value are
	/// skipped in favor of their shorter suffix. Never applies to the
	/// empty context.
	#[serde(default = "default_min_evidence")]
	pub min_evidence: u64,

	/// Value returned when even the empty context has no continuation.
	/// Not a normalized probability: a flat score, in `[0, 1]`.
	#[serde(default = "default_empty_fallback")]
	pub empty_fallback: f64,
}

fn default_delta() -> f64 {
	0.75
}

fn default_eps() -> f64 {
	1.0
}

fn default_min_evidence() -> u64 {
	10
}

fn default_empty_fallback() -> f64 {
	1.0
}

impl Default for SmoothingConfig {
	fn default() -> Self {
		Self {
			delta: default_delta(),
			eps: default_eps(),
			min_evidence: default_min_evidence(),
			empty_fallback: default_empty_fallback(),
		}
	}
}

impl SmoothingConfig {
	/// Creates the default configuration.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the absolute discount.
	pub fn with_delta(mut self, delta: f64) -> Self {
		self.delta = delta;
		self
	}

	/// Sets the unseen mass of the empty context.
	pub fn with_eps(mut self, eps: f64) -> Self {
		self.eps = eps;
		self
	}

	/// Sets the minimum-evidence threshold.
	pub fn with_min_evidence(mut self, min_evidence: u64) -> Self {
		self.min_evidence = min_evidence;
		self
	}

	/// Sets the zero-evidence fallback value.
	pub fn with_empty_fallback(mut self, empty_fallback: f64) -> Self {
		self.empty_fallback = empty_fallback;
		self
	}

	/// Checks every parameter range.
	///
	/// # Errors
	/// Returns `ModelError::InvalidParameter` for the first offending field:
	/// - `delta` not finite or outside `[0, 1]`
	/// - `eps` not finite or negative
	/// - `empty_fallback` not finite or outside `[0, 1]`
	pub fn validate(&self) -> Result<(), ModelError> {
		if !self.delta.is_finite() || !(0.0..=1.0).contains(&self.delta) {
			return Err(ModelError::InvalidParameter {
				name: "delta",
				value: self.delta,
				expected: "a value in [0, 1]",
			});
		}
		if !self.eps.is_finite() || self.eps < 0.0 {
			return Err(ModelError::InvalidParameter {
				name: "eps",
				value: self.eps,
				expected: "a non-negative value",
			});
		}
		if !self.empty_fallback.is_finite() || !(0.0..=1.0).contains(&self.empty_fallback) {
			return Err(ModelError::InvalidParameter {
				name: "empty_fallback",
				value: self.empty_fallback,
				expected: "a value in [0, 1]",
			});
		}
		Ok(())
	}

	/// Parses and validates a JSON configuration.
	pub fn from_json(json_str: &str) -> Result<Self, ModelError> {
		let config: Self = serde_json::from_str(json_str).map_err(|e| ModelError::Config(e.to_string()))?;
		config.validate()?;
		Ok(config)
	}

	/// Loads and validates a JSON configuration file.
	pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ModelError> {
		let content = fs::read_to_string(path)?;
		Self::from_json(&content)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_default_config() {
		let config = SmoothingConfig::default();
		assert!((config.delta - 0.75).abs() < f64::EPSILON);
		assert!((config.eps - 1.0).abs() < f64::EPSILON);
		assert_eq!(config.min_evidence, 10);
		assert!((config.empty_fallback - 1.0).abs() < f64::EPSILON);
		assert!(config.validate().is_ok());
	}

	#[test]
	fn test_builder_pattern() {
		let config = SmoothingConfig::new()
			.with_delta(0.5)
			.with_eps(0.25)
			.with_min_evidence(3)
			.with_empty_fallback(0.0);

		assert!((config.delta - 0.5).abs() < f64::EPSILON);
		assert!((config.eps - 0.25).abs() < f64::EPSILON);
		assert_eq!(config.min_evidence, 3);
		assert!(config.validate().is_ok());
	}

	#[test]
	fn test_invalid_parameters() {
		let cases = [
			SmoothingConfig::new().with_delta(1.5),
			SmoothingConfig::new().with_delta(-0.1),
			SmoothingConfig::new().with_delta(f64::NAN),
			SmoothingConfig::new().with_eps(-1.0),
			SmoothingConfig::new().with_eps(f64::INFINITY),
			SmoothingConfig::new().with_empty_fallback(2.0),
		];
		for config in cases {
			assert!(
				matches!(config.validate(), Err(ModelError::InvalidParameter { .. })),
				"{:?} should be rejected",
				config
			);
		}
	}

	#[test]
	fn test_boundaries_are_valid() {
		assert!(SmoothingConfig::new().with_delta(0.0).validate().is_ok());
		assert!(SmoothingConfig::new().with_delta(1.0).validate().is_ok());
		assert!(SmoothingConfig::new().with_eps(0.0).validate().is_ok());
		assert!(SmoothingConfig::new().with_eps(3.0).validate().is_ok());
	}

	#[test]
	fn test_from_json_partial() {
		let config = SmoothingConfig::from_json(r#"{ "delta": 0.5, "min_evidence": 5 }"#).unwrap();
		assert!((config.delta - 0.5).abs() < f64::EPSILON);
		assert_eq!(config.min_evidence, 5);
		assert!((config.eps - 1.0).abs() < f64::EPSILON);
		assert!((config.empty_fallback - 1.0).abs() < f64::EPSILON);
	}

	#[test]
	fn test_from_json_errors() {
		assert!(matches!(SmoothingConfig::from_json("{ not json"), Err(ModelError::Config(_))));
		assert!(matches!(
			SmoothingConfig::from_json(r#"{ "delta": 4.0 }"#),
			Err(ModelError::InvalidParameter { name: "delta", .. })
		));
	}
}
