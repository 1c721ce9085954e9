//! Error types for agrupar operations.
//!
//! Provides rich error context for library consumers.

use std::fmt;

/// Main error type for agrupar operations.
///
/// # Examples
///
/// ```
/// use agrupar::error::AgruparError;
///
/// let err = AgruparError::DimensionMismatch {
///     expected: "labels=100".to_string(),
///     actual: "99".to_string(),
/// };
/// assert!(err.to_string().contains("dimension mismatch"));
/// ```
#[derive(Debug)]
pub enum AgruparError {
    /// Matrix/vector dimensions don't match for the operation.
    DimensionMismatch {
        /// Expected dimensions description
        expected: String,
        /// Actual dimensions found
        actual: String,
    },

    /// Invalid hyperparameter value provided.
    InvalidHyperparameter {
        /// Parameter name
        param: String,
        /// Provided value
        value: String,
        /// Constraint description
        constraint: String,
    },

    /// A linkage matrix does not describe a valid merge tree.
    InvalidLinkage {
        /// What is wrong with it
        message: String,
    },

    /// Node or sample index outside the valid range.
    IndexOutOfBounds {
        /// Requested index
        index: usize,
        /// Number of valid entries
        len: usize,
    },

    /// Operation needs at least one sample.
    EmptyInput {
        /// Where the empty input was found
        context: String,
    },

    /// Drawing backend failed while rendering a figure.
    Render {
        /// Backend error message
        message: String,
    },

    /// I/O error (file not found, permission denied, etc.).
    Io(std::io::Error),

    /// Input that cannot be processed, such as a non-finite dissimilarity.
    Other(String),
}

impl fmt::Display for AgruparError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgruparError::DimensionMismatch { expected, actual } => {
                write!(
                    f,
                    "Matrix dimension mismatch: expected {expected}, got {actual}"
                )
            }
            AgruparError::InvalidHyperparameter {
                param,
                value,
                constraint,
            } => {
                write!(
                    f,
                    "Invalid hyperparameter: {param} = {value}, expected {constraint}"
                )
            }
            AgruparError::InvalidLinkage { message } => {
                write!(f, "Invalid linkage matrix: {message}")
            }
            AgruparError::IndexOutOfBounds { index, len } => {
                write!(f, "Index {index} out of bounds (len={len})")
            }
            AgruparError::EmptyInput { context } => write!(f, "Empty input: {context}"),
            AgruparError::Render { message } => write!(f, "Rendering failed: {message}"),
            AgruparError::Io(e) => write!(f, "I/O error: {e}"),
            AgruparError::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for AgruparError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AgruparError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for AgruparError {
    fn from(err: std::io::Error) -> Self {
        AgruparError::Io(err)
    }
}

impl From<String> for AgruparError {
    fn from(msg: String) -> Self {
        AgruparError::Other(msg)
    }
}

impl AgruparError {
    /// Create a dimension mismatch error with descriptive context
    #[must_use]
    pub fn dimension_mismatch(context: &str, expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch {
            expected: format!("{context}={expected}"),
            actual: format!("{actual}"),
        }
    }

    /// Create an index out of bounds error
    #[must_use]
    pub fn index_out_of_bounds(index: usize, len: usize) -> Self {
        Self::IndexOutOfBounds { index, len }
    }

    /// Create an empty input error
    #[must_use]
    pub fn empty_input(context: &str) -> Self {
        Self::EmptyInput {
            context: context.to_string(),
        }
    }

    /// Create an invalid linkage error
    #[must_use]
    pub fn invalid_linkage(message: impl Into<String>) -> Self {
        Self::InvalidLinkage {
            message: message.into(),
        }
    }

    /// Wrap a drawing backend error
    pub fn render(err: impl fmt::Display) -> Self {
        Self::Render {
            message: err.to_string(),
        }
    }
}

/// Convenience type alias for Results.
pub type Result<T> = std::result::Result<T, AgruparError>;
