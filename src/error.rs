//! Error types for the network analysis core

use thiserror::Error;

/// Result alias for the library core.
pub type Result<T> = std::result::Result<T, NetworkError>;

/// Errors produced by matrix construction, partitioning and deconvolution.
///
/// Shape and parameter errors are unrecoverable and surface to the caller
/// before any computation. Degenerate inputs and merge exhaustion are
/// recoverable: callers fall back to keeping modules unsplit or unmerged.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// Matrix has no rows or columns.
    #[error("matrix is empty")]
    EmptyMatrix,

    /// Matrix is not square.
    #[error("matrix must be square, got {rows} x {cols}")]
    NonSquare { rows: usize, cols: usize },

    /// Two collaborating structures disagree on dimension.
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    /// Adjacency values violate the symmetry invariant.
    #[error("matrix is not symmetric at ({row}, {col}): {upper} != {lower}")]
    NotSymmetric { row: usize, col: usize, upper: f64, lower: f64 },

    /// A transform produced NaN or infinite values.
    #[error("non-finite value produced by {operation}")]
    NonFinite { operation: &'static str },

    /// A parameter is outside its valid domain.
    #[error("invalid parameter '{name}': {message}")]
    InvalidParameter { name: &'static str, message: String },

    /// Modules of size < 2 cannot be split.
    #[error("cannot split module of size {size}")]
    ModuleTooSmall { size: usize },

    /// No merge order produced module sizes within the configured policy.
    #[error("no merge order in {start}..={end} produced module sizes within [{min_size}, {max_size}]")]
    MergeExhausted {
        start: usize,
        end: usize,
        min_size: usize,
        max_size: usize,
    },

    /// An operation that requires modules was called before any exist.
    #[error("no modules exist")]
    EmptyPartition,
}
