use thiserror::Error;

use crate::allocator::AllocatorError;

/// Error type for matrix operations.
///
/// Every fallible operation in the crate reports one of these kinds. A failed operation
/// never leaves a partially built matrix behind.
#[derive(Error, Debug, PartialEq)]
pub enum MatrixError {
    /// An operand is malformed or an argument is out of its domain.
    ///
    /// # Common Causes
    /// - Passing a matrix that was already released
    /// - Requesting a matrix with zero or negative rows/columns
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The cell buffer of a matrix could not be allocated.
    ///
    /// See [`AllocatorError`] for the underlying cause.
    #[error("Allocation failure: {0}")]
    AllocationFailure(#[from] AllocatorError),

    /// Operand shapes are incompatible for the requested operation.
    ///
    /// # Examples
    /// - Adding a 2x3 matrix to a 3x2 matrix
    /// - Multiplying a 2x3 matrix by a 2x3 matrix
    #[error("Dimension mismatch in {operation}: {lhs:?} vs {rhs:?}")]
    DimensionMismatch {
        /// Name of the operation that failed
        operation: String,
        /// Shape of the left-hand operand
        lhs: [usize; 2],
        /// Shape of the right-hand operand
        rhs: [usize; 2],
    },

    /// A square-only operation received a non-square matrix.
    #[error("Matrix is not square: {rows}x{columns}")]
    NotSquare {
        /// Number of rows of the input
        rows: usize,
        /// Number of columns of the input
        columns: usize,
    },

    /// The matrix has a zero determinant and cannot be inverted.
    #[error("Matrix is singular")]
    Singular,

    /// A cell index lies outside the matrix.
    #[error("Index ({row}, {column}) out of bounds for shape {shape:?}")]
    IndexOutOfBounds {
        /// Requested row
        row: usize,
        /// Requested column
        column: usize,
        /// Shape of the matrix
        shape: [usize; 2],
    },
}

impl MatrixError {
    /// Creates an InvalidArgument error.
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        Self::InvalidArgument(reason.into())
    }

    /// Creates a DimensionMismatch error for the named operation.
    pub fn dimension_mismatch(
        operation: impl Into<String>,
        lhs: [usize; 2],
        rhs: [usize; 2],
    ) -> Self {
        Self::DimensionMismatch {
            operation: operation.into(),
            lhs,
            rhs,
        }
    }

    /// Creates a NotSquare error from a shape.
    pub fn not_square(shape: [usize; 2]) -> Self {
        Self::NotSquare {
            rows: shape[0],
            columns: shape[1],
        }
    }

    /// Returns a user-friendly suggestion for resolving the error.
    pub fn suggestion(&self) -> &str {
        match self {
            Self::InvalidArgument(_) => {
                "Pass a matrix created with positive dimensions that has not been released"
            }
            Self::AllocationFailure(e) => e.suggestion(),
            Self::DimensionMismatch { .. } => {
                "Elementwise ops need equal shapes; products need lhs columns == rhs rows"
            }
            Self::NotSquare { .. } => "Determinants, cofactors and inverses need a square matrix",
            Self::Singular => "The determinant is zero; the matrix has no inverse",
            Self::IndexOutOfBounds { .. } => "Verify 0 <= row < rows and 0 <= column < columns",
        }
    }
}
