#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
//!
//! # Overview
//!
//! `dense-matrix` provides a small, exact set of linear-algebra primitives over dense
//! `f64` matrices: creation and release, tolerance-based equality, elementwise sums and
//! differences, scalar and matrix products, transposes, and the cofactor pipeline
//! (minors, determinants, cofactor matrices, inverses).
//!
//! Determinants use direct Laplace expansion, so cost grows as `O(n!)`. The crate is meant
//! for small matrices where exact cofactor arithmetic is preferred over pivoting methods.
//!
//! # Memory
//!
//! Every [`Matrix`] owns its cells, obtained from a [`MatrixAllocator`]. The cells are
//! returned to the allocator when the matrix is released or dropped, so the intermediate
//! matrices built by multi-step operations never outlive the call, even on error paths.
//!
//! # Quick Start
//!
//! ```rust
//! use dense_matrix::{Matrix, linalg, ops};
//!
//! let a = Matrix::from_rows(&[[2.0, 1.0], [7.0, 4.0]]).unwrap();
//! assert_eq!(linalg::determinant(&a).unwrap(), 1.0);
//!
//! let inv = linalg::inverse(&a).unwrap();
//! let eye = ops::multiply(&a, &inv).unwrap();
//! assert!(eye.equals(&Matrix::identity(2).unwrap()));
//! ```

/// Allocator module containing memory management utilities.
///
/// Provides the [`MatrixAllocator`] trait and the default [`CpuAllocator`].
pub mod allocator;

/// Error types for matrix operations.
pub mod error;

/// Determinants, cofactor matrices and inverses.
pub mod linalg;

/// Matrix module containing the [`Matrix`] type, construction and equality.
pub mod matrix;

/// Elementwise and structural operations: scale, add, subtract, transpose, multiply.
pub mod ops;

/// Storage module containing the owned cell buffer behind every matrix.
pub mod storage;

pub use crate::allocator::{AllocatorError, CpuAllocator, MatrixAllocator};
pub use crate::error::MatrixError;
pub use crate::matrix::{CpuMatrix, Matrix, EQ_TOLERANCE};
