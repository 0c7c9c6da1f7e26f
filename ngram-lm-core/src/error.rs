use std::fmt;
use std::io;

/// Errors raised while building a count store or configuring an estimator.
///
/// Probability queries never produce a `ModelError`: degenerate data is
/// handled by the smoothing policy, and failures of a backing store are
/// returned with the store's own error type.
#[derive(Debug)]
pub enum ModelError {
	/// A smoothing parameter is outside its valid range.
	InvalidParameter {
		name: &'static str,
		value: f64,
		expected: &'static str,
	},
	/// An n-gram record with no words.
	EmptyNGram,
	/// A malformed line in a count listing (1-based line number).
	Format { line: usize, message: String },
	/// A configuration document that could not be parsed.
	Config(String),
	/// File read failure.
	Io(io::Error),
}

impl fmt::Display for ModelError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ModelError::InvalidParameter { name, value, expected } => {
				write!(f, "invalid {}: {} (expected {})", name, value, expected)
			}
			ModelError::EmptyNGram => write!(f, "n-gram must contain at least one word"),
			ModelError::Format { line, message } => write!(f, "line {}: {}", line, message),
			ModelError::Config(s) => write!(f, "configuration error: {}", s),
			ModelError::Io(e) => write!(f, "I/O error: {}", e),
		}
	}
}

impl std::error::Error for ModelError {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			ModelError::Io(e) => Some(e),
			_ => None,
		}
	}
}

impl From<io::Error> for ModelError {
	fn from(e: io::Error) -> Self {
		ModelError::Io(e)
	}
}
