use std::alloc;
use std::alloc::Layout;

use thiserror::Error;

/// An error type for matrix allocator operations.
#[derive(Debug, Error, PartialEq)]
pub enum AllocatorError {
    /// The requested buffer size overflows a valid memory layout.
    #[error("Invalid matrix layout {0}")]
    LayoutError(core::alloc::LayoutError),

    /// The number of cells does not fit in `usize`.
    #[error("Matrix of {rows}x{columns} cells overflows usize")]
    SizeOverflow {
        /// Requested rows
        rows: usize,
        /// Requested columns
        columns: usize,
    },

    /// A zero-sized buffer was requested.
    #[error("Zero-sized matrix buffer requested")]
    ZeroSized,

    /// The allocator returned a null pointer.
    #[error("Null pointer")]
    NullPointer,
}

impl AllocatorError {
    /// Returns a user-friendly suggestion for resolving the error.
    pub fn suggestion(&self) -> &str {
        match self {
            Self::LayoutError(_) | Self::SizeOverflow { .. } => {
                "Reduce the matrix dimensions; the buffer size overflows"
            }
            Self::ZeroSized => "Matrices need at least one row and one column",
            Self::NullPointer => "Release unused matrices to reclaim memory",
        }
    }
}

/// A trait for allocating and deallocating the cell buffers of matrices.
///
/// Every buffer handed out by [`MatrixAllocator::alloc_zeroed`] is returned exactly once
/// through [`MatrixAllocator::dealloc`] with the same layout.
///
/// # Safety
///
/// Matrix storage reads the returned buffer as `layout.size() / size_of::<f64>()` cells.
/// An implementation of `alloc_zeroed` must therefore return a pointer that is valid for
/// reads and writes of `layout.size()` bytes, aligned to `layout.align()`, zero-filled, and
/// not aliased by any other live allocation until it is passed back to `dealloc`.
pub trait MatrixAllocator: Clone {
    /// Allocates zero-initialised memory for a matrix buffer with the given layout.
    fn alloc_zeroed(&self, layout: Layout) -> Result<*mut u8, AllocatorError>;

    /// Deallocates memory previously returned by `alloc_zeroed` with the same layout.
    fn dealloc(&self, ptr: *mut u8, layout: Layout);
}

/// A matrix allocator that uses the global system allocator.
#[derive(Clone, Copy, Debug, Default)]
pub struct CpuAllocator;

impl MatrixAllocator for CpuAllocator {
    /// Allocates zeroed memory for a matrix buffer.
    ///
    /// # Arguments
    ///
    /// * `layout` - The layout of the buffer. Must have a non-zero size.
    ///
    /// # Returns
    ///
    /// A non-null pointer to the allocated memory if successful, otherwise an error.
    fn alloc_zeroed(&self, layout: Layout) -> Result<*mut u8, AllocatorError> {
        if layout.size() == 0 {
            return Err(AllocatorError::ZeroSized);
        }
        let ptr = unsafe { alloc::alloc_zeroed(layout) };
        if ptr.is_null() {
            Err(AllocatorError::NullPointer)?
        }
        Ok(ptr)
    }

    /// Deallocates memory for a matrix buffer.
    ///
    /// # Safety
    ///
    /// The pointer must come from `alloc_zeroed` on this allocator with the same layout.
    #[allow(clippy::not_unsafe_ptr_arg_deref)]
    fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        if !ptr.is_null() {
            unsafe { alloc::dealloc(ptr, layout) }
        }
    }
}
