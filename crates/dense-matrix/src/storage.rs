use std::{alloc::Layout, ptr::NonNull};

use super::allocator::{AllocatorError, MatrixAllocator};

/// An owned, contiguous buffer of `f64` cells obtained from a [`MatrixAllocator`].
///
/// The buffer is zero-filled on creation and handed back to its allocator when the storage
/// is dropped, so every exit path of an operation releases the intermediates it built.
///
/// # Fields
///
/// * `ptr` - Pointer to the first cell.
/// * `len` - The number of cells.
/// * `layout` - The layout used for allocation, reused on deallocation.
/// * `alloc` - The allocator that owns the memory.
pub struct MatrixStorage<A: MatrixAllocator> {
    ptr: NonNull<f64>,
    len: usize,
    layout: Layout,
    alloc: A,
}

impl<A: MatrixAllocator> MatrixStorage<A> {
    /// Allocates a zero-filled buffer of `len` cells.
    ///
    /// # Errors
    ///
    /// Returns an error if `len` is zero, the layout overflows, or the allocator fails.
    pub fn zeros(len: usize, alloc: A) -> Result<Self, AllocatorError> {
        let layout = Layout::array::<f64>(len).map_err(AllocatorError::LayoutError)?;
        let ptr = alloc.alloc_zeroed(layout)?;
        let ptr = NonNull::new(ptr as *mut f64).ok_or(AllocatorError::NullPointer)?;
        Ok(Self {
            ptr,
            len,
            layout,
            alloc,
        })
    }

    /// Allocates a buffer and copies `data` into it.
    ///
    /// # Errors
    ///
    /// Same as [`MatrixStorage::zeros`] for `data.len()` cells.
    pub fn from_slice(data: &[f64], alloc: A) -> Result<Self, AllocatorError> {
        let mut storage = Self::zeros(data.len(), alloc)?;
        storage.as_mut_slice().copy_from_slice(data);
        Ok(storage)
    }

    /// Returns the allocator used to allocate the storage.
    #[inline]
    pub fn alloc(&self) -> &A {
        &self.alloc
    }

    /// Returns the cells as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        // SAFETY: ptr is valid for `len` initialised cells for the lifetime of self.
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    /// Returns the cells as a mutable slice.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        // SAFETY: as above, and &mut self guarantees exclusive access.
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }
}

impl<A: MatrixAllocator> Drop for MatrixStorage<A> {
    fn drop(&mut self) {
        self.alloc.dealloc(self.ptr.as_ptr() as *mut u8, self.layout);
    }
}
