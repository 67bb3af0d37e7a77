use approx::AbsDiffEq;

use crate::{
    allocator::{AllocatorError, CpuAllocator, MatrixAllocator},
    error::MatrixError,
    storage::MatrixStorage,
};

/// Absolute per-cell tolerance used by [`Matrix::equals`].
pub const EQ_TOLERANCE: f64 = 1e-7;

/// A dense, row-major matrix of `f64` cells with owned storage.
///
/// A matrix is either allocated, with `rows >= 1`, `columns >= 1` and exactly
/// `rows * columns` cells, or released, with both dimensions reset to zero. Released
/// matrices are rejected by every operation with [`MatrixError::InvalidArgument`].
///
/// The cell buffer is obtained from the allocator `A` and returned to it when the matrix is
/// released or dropped.
///
/// # Examples
///
/// ```
/// use dense_matrix::Matrix;
///
/// let mut m = Matrix::create(2, 3).unwrap();
/// assert_eq!(m.shape(), [2, 3]);
/// assert_eq!(m.get(1, 2), Some(0.0));
///
/// m.set(1, 2, 4.5).unwrap();
/// assert_eq!(m.get(1, 2), Some(4.5));
///
/// m.release();
/// assert_eq!(m.shape(), [0, 0]);
/// ```
pub struct Matrix<A: MatrixAllocator = CpuAllocator> {
    storage: Option<MatrixStorage<A>>,
    rows: usize,
    columns: usize,
}

/// Type alias for a matrix backed by the system allocator.
pub type CpuMatrix = Matrix<CpuAllocator>;

/// Converts a caller supplied dimension into a strictly positive `usize`.
fn positive_dim<T: TryInto<usize>>(value: T, name: &str) -> Result<usize, MatrixError> {
    match value.try_into() {
        Ok(0) | Err(_) => Err(MatrixError::invalid_argument(format!(
            "{name} must be a positive integer"
        ))),
        Ok(dim) => Ok(dim),
    }
}

/// Validates both dimensions and returns `(rows, columns, rows * columns)`.
fn checked_shape<R, C>(rows: R, columns: C) -> Result<(usize, usize, usize), MatrixError>
where
    R: TryInto<usize>,
    C: TryInto<usize>,
{
    let rows = positive_dim(rows, "rows")?;
    let columns = positive_dim(columns, "columns")?;
    let numel = rows.checked_mul(columns).ok_or_else(|| {
        log::warn!("a {rows}x{columns} matrix does not fit in memory");
        AllocatorError::SizeOverflow { rows, columns }
    })?;
    Ok((rows, columns, numel))
}

impl Matrix<CpuAllocator> {
    /// Creates a zero-filled matrix on the system allocator.
    ///
    /// # Arguments
    ///
    /// * `rows` - Number of rows. Any integer type; must be positive.
    /// * `columns` - Number of columns. Any integer type; must be positive.
    ///
    /// # Errors
    ///
    /// [`MatrixError::InvalidArgument`] if a dimension is zero or negative,
    /// [`MatrixError::AllocationFailure`] if the cells cannot be allocated.
    ///
    /// # Example
    ///
    /// ```
    /// use dense_matrix::{Matrix, MatrixError};
    ///
    /// let m = Matrix::create(3, 3).unwrap();
    /// assert!(m.as_slice().iter().all(|&v| v == 0.0));
    ///
    /// assert!(matches!(Matrix::create(-1, 3), Err(MatrixError::InvalidArgument(_))));
    /// ```
    pub fn create<R, C>(rows: R, columns: C) -> Result<Self, MatrixError>
    where
        R: TryInto<usize>,
        C: TryInto<usize>,
    {
        Self::create_in(rows, columns, CpuAllocator)
    }

    /// Creates a matrix from row-major data.
    ///
    /// # Errors
    ///
    /// [`MatrixError::DimensionMismatch`] if `data.len() != rows * columns`.
    pub fn from_shape_vec(
        rows: usize,
        columns: usize,
        data: Vec<f64>,
    ) -> Result<Self, MatrixError> {
        Self::from_shape_slice_in(rows, columns, &data, CpuAllocator)
    }

    /// Creates a matrix from a slice of row-major data.
    pub fn from_shape_slice(
        rows: usize,
        columns: usize,
        data: &[f64],
    ) -> Result<Self, MatrixError> {
        Self::from_shape_slice_in(rows, columns, data, CpuAllocator)
    }

    /// Creates a matrix from a list of rows.
    ///
    /// # Errors
    ///
    /// [`MatrixError::InvalidArgument`] if there are no rows or the first row is empty,
    /// [`MatrixError::DimensionMismatch`] if the rows have different lengths.
    ///
    /// # Example
    ///
    /// ```
    /// use dense_matrix::Matrix;
    ///
    /// let m = Matrix::from_rows(&[[1.0, 2.0], [3.0, 4.0]]).unwrap();
    /// assert_eq!(m.get(1, 0), Some(3.0));
    /// ```
    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R]) -> Result<Self, MatrixError> {
        Self::from_rows_in(rows, CpuAllocator)
    }

    /// Creates a matrix by evaluating `f(row, column)` for every cell.
    pub fn from_shape_fn<F>(rows: usize, columns: usize, f: F) -> Result<Self, MatrixError>
    where
        F: FnMut(usize, usize) -> f64,
    {
        Self::from_shape_fn_in(rows, columns, f, CpuAllocator)
    }

    /// Creates the `size x size` identity matrix.
    pub fn identity(size: usize) -> Result<Self, MatrixError> {
        Self::identity_in(size, CpuAllocator)
    }
}

impl<A: MatrixAllocator> Matrix<A> {
    /// Creates a zero-filled matrix whose cells come from `alloc`.
    ///
    /// See [`Matrix::create`] for the argument rules.
    pub fn create_in<R, C>(rows: R, columns: C, alloc: A) -> Result<Self, MatrixError>
    where
        R: TryInto<usize>,
        C: TryInto<usize>,
    {
        let (rows, columns, numel) = checked_shape(rows, columns)?;
        let storage = MatrixStorage::zeros(numel, alloc).map_err(|e| {
            log::warn!("failed to allocate a {rows}x{columns} matrix: {e}");
            MatrixError::AllocationFailure(e)
        })?;

        Ok(Self {
            storage: Some(storage),
            rows,
            columns,
        })
    }

    /// Creates a matrix from a slice of row-major data with the given allocator.
    ///
    /// The length is checked before anything is allocated.
    pub fn from_shape_slice_in(
        rows: usize,
        columns: usize,
        data: &[f64],
        alloc: A,
    ) -> Result<Self, MatrixError> {
        let (rows, columns, numel) = checked_shape(rows, columns)?;
        if data.len() != numel {
            return Err(MatrixError::dimension_mismatch(
                "from_shape_slice",
                [rows, columns],
                [1, data.len()],
            ));
        }
        let storage = MatrixStorage::from_slice(data, alloc)?;
        Ok(Self {
            storage: Some(storage),
            rows,
            columns,
        })
    }

    /// Creates a matrix from a list of rows with the given allocator.
    pub fn from_rows_in<R: AsRef<[f64]>>(rows: &[R], alloc: A) -> Result<Self, MatrixError> {
        let columns = rows.first().map_or(0, |r| r.as_ref().len());
        if let Some(ragged) = rows.iter().find(|r| r.as_ref().len() != columns) {
            return Err(MatrixError::dimension_mismatch(
                "from_rows",
                [rows.len(), columns],
                [1, ragged.as_ref().len()],
            ));
        }
        let mut matrix = Self::create_in(rows.len(), columns, alloc)?;
        for (dst, src) in matrix.as_slice_mut().chunks_exact_mut(columns).zip(rows) {
            dst.copy_from_slice(src.as_ref());
        }
        Ok(matrix)
    }

    /// Creates a matrix by evaluating `f(row, column)` for every cell with the given allocator.
    pub fn from_shape_fn_in<F>(
        rows: usize,
        columns: usize,
        mut f: F,
        alloc: A,
    ) -> Result<Self, MatrixError>
    where
        F: FnMut(usize, usize) -> f64,
    {
        let mut matrix = Self::create_in(rows, columns, alloc)?;
        for (i, v) in matrix.as_slice_mut().iter_mut().enumerate() {
            *v = f(i / columns, i % columns);
        }
        Ok(matrix)
    }

    /// Creates the `size x size` identity matrix with the given allocator.
    pub fn identity_in(size: usize, alloc: A) -> Result<Self, MatrixError> {
        Self::from_shape_fn_in(size, size, |r, c| if r == c { 1.0 } else { 0.0 }, alloc)
    }

    /// Frees the cells and resets both dimensions to zero.
    ///
    /// Releasing an already released matrix does nothing.
    pub fn release(&mut self) {
        self.storage = None;
        self.rows = 0;
        self.columns = 0;
    }

    /// Returns true while the matrix holds cells.
    #[inline]
    pub fn is_allocated(&self) -> bool {
        self.storage.is_some()
    }

    /// Number of rows.
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    #[inline]
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// The shape as `[rows, columns]`.
    #[inline]
    pub fn shape(&self) -> [usize; 2] {
        [self.rows, self.columns]
    }

    /// Total number of cells.
    #[inline]
    pub fn numel(&self) -> usize {
        self.rows * self.columns
    }

    /// Returns true if the matrix is allocated and has as many rows as columns.
    #[inline]
    pub fn is_square(&self) -> bool {
        self.is_allocated() && self.rows == self.columns
    }

    /// Returns the storage, or an InvalidArgument error naming `operation` if released.
    pub(crate) fn checked_storage(
        &self,
        operation: &str,
    ) -> Result<&MatrixStorage<A>, MatrixError> {
        self.storage.as_ref().ok_or_else(|| {
            MatrixError::invalid_argument(format!("{operation}: matrix is not allocated"))
        })
    }

    /// Allocates a zero-filled matrix with the same allocator as `self`.
    pub(crate) fn zeros_like(
        &self,
        rows: usize,
        columns: usize,
        operation: &str,
    ) -> Result<Self, MatrixError> {
        let alloc = self.checked_storage(operation)?.alloc().clone();
        Self::create_in(rows, columns, alloc)
    }

    /// Reads a cell without bounds checks against the shape.
    ///
    /// Callers must have checked the matrix is allocated and the index is in range.
    #[inline]
    pub(crate) fn at(&self, row: usize, column: usize) -> f64 {
        self.as_slice()[row * self.columns + column]
    }

    /// Returns the cell at `(row, column)` or `None` if out of range or released.
    pub fn get(&self, row: usize, column: usize) -> Option<f64> {
        if row >= self.rows || column >= self.columns {
            return None;
        }
        self.as_slice().get(row * self.columns + column).copied()
    }

    /// Returns a mutable reference to the cell at `(row, column)`.
    pub fn get_mut(&mut self, row: usize, column: usize) -> Option<&mut f64> {
        if row >= self.rows || column >= self.columns {
            return None;
        }
        let offset = row * self.columns + column;
        self.as_slice_mut().get_mut(offset)
    }

    /// Writes `value` at `(row, column)`.
    ///
    /// # Errors
    ///
    /// [`MatrixError::InvalidArgument`] if the matrix is released,
    /// [`MatrixError::IndexOutOfBounds`] if the index is outside the matrix.
    pub fn set(&mut self, row: usize, column: usize, value: f64) -> Result<(), MatrixError> {
        self.checked_storage("set")?;
        let shape = self.shape();
        let cell = self
            .get_mut(row, column)
            .ok_or(MatrixError::IndexOutOfBounds { row, column, shape })?;
        *cell = value;
        Ok(())
    }

    /// The cells in row-major order. Empty for a released matrix.
    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        match self.storage.as_ref() {
            Some(s) => s.as_slice(),
            None => &[],
        }
    }

    /// The cells in row-major order, mutably. Empty for a released matrix.
    #[inline]
    pub fn as_slice_mut(&mut self) -> &mut [f64] {
        match self.storage.as_mut() {
            Some(s) => s.as_mut_slice(),
            None => &mut [],
        }
    }

    /// Iterates over the rows as slices.
    pub fn iter_rows(&self) -> std::slice::ChunksExact<'_, f64> {
        self.as_slice().chunks_exact(self.columns.max(1))
    }

    /// Returns true iff both matrices are allocated, have the same shape, and every pair of
    /// cells differs by at most [`EQ_TOLERANCE`].
    ///
    /// # Example
    ///
    /// ```
    /// use dense_matrix::Matrix;
    ///
    /// let a = Matrix::from_rows(&[[1.0, 2.0]]).unwrap();
    /// let b = Matrix::from_rows(&[[1.0 + 1e-9, 2.0]]).unwrap();
    /// assert!(a.equals(&b));
    /// ```
    pub fn equals(&self, other: &Self) -> bool {
        self.abs_diff_eq(other, EQ_TOLERANCE)
    }

    /// Apply a function to each cell, producing a new matrix of the same shape.
    ///
    /// # Errors
    ///
    /// [`MatrixError::InvalidArgument`] if the matrix is released.
    pub fn map<F>(&self, f: F) -> Result<Self, MatrixError>
    where
        F: Fn(f64) -> f64,
    {
        let mut out = self.zeros_like(self.rows, self.columns, "map")?;
        for (dst, &src) in out.as_slice_mut().iter_mut().zip(self.as_slice()) {
            *dst = f(src);
        }
        Ok(out)
    }

    /// Combine two matrices of equal shape cell by cell.
    ///
    /// # Arguments
    ///
    /// * `other` - The right-hand operand.
    /// * `operation` - Name reported in errors.
    /// * `op` - The function applied to each `(lhs, rhs)` cell pair.
    ///
    /// # Errors
    ///
    /// [`MatrixError::InvalidArgument`] if either operand is released,
    /// [`MatrixError::DimensionMismatch`] if the shapes differ.
    pub fn element_wise_op<F>(
        &self,
        other: &Self,
        operation: &str,
        op: F,
    ) -> Result<Self, MatrixError>
    where
        F: Fn(f64, f64) -> f64,
    {
        self.checked_storage(operation)?;
        other.checked_storage(operation)?;
        if self.shape() != other.shape() {
            return Err(MatrixError::dimension_mismatch(
                operation,
                self.shape(),
                other.shape(),
            ));
        }

        let mut out = self.zeros_like(self.rows, self.columns, operation)?;
        for ((dst, &a), &b) in out
            .as_slice_mut()
            .iter_mut()
            .zip(self.as_slice())
            .zip(other.as_slice())
        {
            *dst = op(a, b);
        }
        Ok(out)
    }

    /// Copies the matrix into a fresh allocation from the same allocator.
    pub fn try_clone(&self) -> Result<Self, MatrixError> {
        let alloc = self.checked_storage("try_clone")?.alloc().clone();
        let storage = MatrixStorage::from_slice(self.as_slice(), alloc)?;
        Ok(Self {
            storage: Some(storage),
            rows: self.rows,
            columns: self.columns,
        })
    }
}

impl<A: MatrixAllocator> PartialEq for Matrix<A> {
    /// Exact cell equality. Released matrices compare unequal to everything.
    fn eq(&self, other: &Self) -> bool {
        self.is_allocated()
            && other.is_allocated()
            && self.shape() == other.shape()
            && self.as_slice() == other.as_slice()
    }
}

impl<A: MatrixAllocator> AbsDiffEq for Matrix<A> {
    type Epsilon = f64;

    fn default_epsilon() -> f64 {
        EQ_TOLERANCE
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f64) -> bool {
        if !self.is_allocated() || !other.is_allocated() || self.shape() != other.shape() {
            return false;
        }
        self.as_slice()
            .iter()
            .zip(other.as_slice())
            .all(|(a, b)| a.abs_diff_eq(b, epsilon))
    }
}

impl<A: MatrixAllocator> std::fmt::Debug for Matrix<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Matrix")
            .field("rows", &self.rows)
            .field("columns", &self.columns)
            .field("data", &self.as_slice())
            .finish()
    }
}

fn format_scientific(v: f64) -> String {
    let num = format!("{v:.4e}");
    match num.split_once('e') {
        Some((before, after)) => {
            let after = if let Some(stripped) = after.strip_prefix('-') {
                format!("-{stripped:0>2}")
            } else {
                format!("+{after:0>2}")
            };
            format!("{before}e{after}")
        }
        None => num,
    }
}

impl<A: MatrixAllocator> std::fmt::Display for Matrix<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if !self.is_allocated() {
            return write!(f, "[]");
        }

        let width = self
            .as_slice()
            .iter()
            .map(|v| format!("{v:.4}").len())
            .max()
            .unwrap_or(0);
        let scientific = width > 8;

        for (r, row) in self.iter_rows().enumerate() {
            write!(f, "{}", if r == 0 { "[[" } else { " [" })?;
            for (c, v) in row.iter().enumerate() {
                if c > 0 {
                    write!(f, ",")?;
                }
                if scientific {
                    write!(f, "{}", format_scientific(*v))?;
                } else {
                    let rounded = format!("{v:.4}");
                    write!(f, "{rounded:>width$}")?;
                }
            }
            if r + 1 == self.rows {
                write!(f, "]]")?;
            } else {
                writeln!(f, "],")?;
            }
        }
        Ok(())
    }
}
