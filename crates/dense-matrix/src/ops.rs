use crate::{allocator::MatrixAllocator, error::MatrixError, matrix::Matrix};

/// Multiply every cell of the matrix by a scalar.
///
/// # Arguments
///
/// * `a` - The matrix to scale.
/// * `scalar` - The factor applied to each cell.
///
/// # Returns
///
/// A new matrix of the same shape.
///
/// # Errors
///
/// [`MatrixError::InvalidArgument`] if `a` is released.
///
/// # Example
///
/// ```
/// use dense_matrix::{Matrix, ops::scale};
///
/// let a = Matrix::from_rows(&[[1.0, -2.0], [0.5, 3.0]]).unwrap();
/// let b = scale(&a, 2.0).unwrap();
/// assert_eq!(b.as_slice(), &[2.0, -4.0, 1.0, 6.0]);
/// ```
pub fn scale<A: MatrixAllocator>(a: &Matrix<A>, scalar: f64) -> Result<Matrix<A>, MatrixError> {
    a.map(|v| v * scalar)
}

/// Elementwise sum of two matrices of the same shape.
///
/// # Errors
///
/// [`MatrixError::InvalidArgument`] if either operand is released,
/// [`MatrixError::DimensionMismatch`] if the shapes differ.
///
/// # Example
///
/// ```
/// use dense_matrix::{Matrix, ops::add};
///
/// let a = Matrix::from_rows(&[[1.0, 2.0]]).unwrap();
/// let b = Matrix::from_rows(&[[3.0, 4.0]]).unwrap();
/// assert_eq!(add(&a, &b).unwrap().as_slice(), &[4.0, 6.0]);
/// ```
pub fn add<A: MatrixAllocator>(a: &Matrix<A>, b: &Matrix<A>) -> Result<Matrix<A>, MatrixError> {
    a.element_wise_op(b, "add", |x, y| x + y)
}

/// Elementwise difference `a - b` of two matrices of the same shape.
///
/// # Errors
///
/// [`MatrixError::InvalidArgument`] if either operand is released,
/// [`MatrixError::DimensionMismatch`] if the shapes differ.
pub fn subtract<A: MatrixAllocator>(
    a: &Matrix<A>,
    b: &Matrix<A>,
) -> Result<Matrix<A>, MatrixError> {
    a.element_wise_op(b, "subtract", |x, y| x - y)
}

/// Transpose a matrix: the result is `columns x rows` with cell `(j, i)` equal to `a(i, j)`.
///
/// # Errors
///
/// [`MatrixError::InvalidArgument`] if `a` is released.
///
/// # Example
///
/// ```
/// use dense_matrix::{Matrix, ops::transpose};
///
/// let a = Matrix::from_rows(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]).unwrap();
/// let t = transpose(&a).unwrap();
/// assert_eq!(t.shape(), [3, 2]);
/// assert_eq!(t.as_slice(), &[1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
/// ```
pub fn transpose<A: MatrixAllocator>(a: &Matrix<A>) -> Result<Matrix<A>, MatrixError> {
    let [rows, columns] = a.shape();
    let mut out = a.zeros_like(columns, rows, "transpose")?;
    for (i, row) in a.iter_rows().enumerate() {
        for (j, &v) in row.iter().enumerate() {
            out.as_slice_mut()[j * rows + i] = v;
        }
    }
    Ok(out)
}

/// Standard matrix product `a * b`.
///
/// The result has shape `a.rows x b.columns`; each cell is the dot product of the
/// corresponding row of `a` and column of `b`.
///
/// # Errors
///
/// [`MatrixError::InvalidArgument`] if either operand is released,
/// [`MatrixError::DimensionMismatch`] if `a.columns != b.rows`.
///
/// # Example
///
/// ```
/// use dense_matrix::{Matrix, ops::multiply};
///
/// let a = Matrix::from_rows(&[[1.0, 2.0], [3.0, 4.0]]).unwrap();
/// let b = Matrix::from_rows(&[[5.0], [6.0]]).unwrap();
/// let c = multiply(&a, &b).unwrap();
/// assert_eq!(c.as_slice(), &[17.0, 39.0]);
/// ```
pub fn multiply<A: MatrixAllocator>(
    a: &Matrix<A>,
    b: &Matrix<A>,
) -> Result<Matrix<A>, MatrixError> {
    a.checked_storage("multiply")?;
    b.checked_storage("multiply")?;
    if a.columns() != b.rows() {
        return Err(MatrixError::dimension_mismatch(
            "multiply",
            a.shape(),
            b.shape(),
        ));
    }

    let (rows, inner, columns) = (a.rows(), a.columns(), b.columns());
    let mut out = a.zeros_like(rows, columns, "multiply")?;
    for (i, dst_row) in out.as_slice_mut().chunks_exact_mut(columns).enumerate() {
        for (j, dst) in dst_row.iter_mut().enumerate() {
            *dst = (0..inner).map(|k| a.at(i, k) * b.at(k, j)).sum();
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale() -> Result<(), MatrixError> {
        let a = Matrix::from_rows(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]])?;
        let b = scale(&a, -0.5)?;
        assert_eq!(b.shape(), [2, 3]);
        assert_eq!(b.as_slice(), &[-0.5, -1.0, -1.5, -2.0, -2.5, -3.0]);
        Ok(())
    }

    #[test]
    fn test_scale_released() -> Result<(), MatrixError> {
        let mut a = Matrix::create(2, 2)?;
        a.release();
        assert!(matches!(scale(&a, 2.0), Err(MatrixError::InvalidArgument(_))));
        Ok(())
    }

    #[test]
    fn test_add_subtract() -> Result<(), MatrixError> {
        let a = Matrix::from_rows(&[[1.0, 2.0], [3.0, 4.0]])?;
        let b = Matrix::from_rows(&[[0.5, -2.0], [10.0, 1.0]])?;

        let sum = add(&a, &b)?;
        assert_eq!(sum.as_slice(), &[1.5, 0.0, 13.0, 5.0]);

        let diff = subtract(&a, &b)?;
        assert_eq!(diff.as_slice(), &[0.5, 4.0, -7.0, 3.0]);

        let back = add(&diff, &b)?;
        assert!(back.equals(&a));
        Ok(())
    }

    #[test]
    fn test_add_shape_mismatch() -> Result<(), MatrixError> {
        let a = Matrix::create(2, 3)?;
        let b = Matrix::create(3, 2)?;
        assert_eq!(
            add(&a, &b).unwrap_err(),
            MatrixError::dimension_mismatch("add", [2, 3], [3, 2])
        );
        assert_eq!(
            subtract(&a, &b).unwrap_err(),
            MatrixError::dimension_mismatch("subtract", [2, 3], [3, 2])
        );
        Ok(())
    }

    #[test]
    fn test_add_released_operand() -> Result<(), MatrixError> {
        let a = Matrix::create(2, 2)?;
        let mut b = Matrix::create(2, 2)?;
        b.release();
        assert!(matches!(add(&a, &b), Err(MatrixError::InvalidArgument(_))));
        assert!(matches!(
            subtract(&b, &a),
            Err(MatrixError::InvalidArgument(_))
        ));
        Ok(())
    }

    #[test]
    fn test_transpose() -> Result<(), MatrixError> {
        let a = Matrix::from_rows(&[[1.0, 2.0, 3.0]])?;
        let t = transpose(&a)?;
        assert_eq!(t.shape(), [3, 1]);
        assert_eq!(t.as_slice(), &[1.0, 2.0, 3.0]);

        let tt = transpose(&t)?;
        assert!(tt.equals(&a));
        Ok(())
    }

    #[test]
    fn test_multiply() -> Result<(), MatrixError> {
        let a = Matrix::from_rows(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]])?;
        let b = Matrix::from_rows(&[[7.0, 8.0], [9.0, 10.0], [11.0, 12.0]])?;
        let c = multiply(&a, &b)?;
        assert_eq!(c.shape(), [2, 2]);
        assert_eq!(c.as_slice(), &[58.0, 64.0, 139.0, 154.0]);
        Ok(())
    }

    #[test]
    fn test_multiply_identity() -> Result<(), MatrixError> {
        let a = Matrix::from_rows(&[[2.0, -1.0], [0.5, 3.0]])?;
        let eye = Matrix::identity(2)?;
        assert!(multiply(&a, &eye)?.equals(&a));
        assert!(multiply(&eye, &a)?.equals(&a));
        Ok(())
    }

    #[test]
    fn test_multiply_inner_mismatch() -> Result<(), MatrixError> {
        let a = Matrix::create(2, 3)?;
        let b = Matrix::create(2, 3)?;
        assert_eq!(
            multiply(&a, &b).unwrap_err(),
            MatrixError::dimension_mismatch("multiply", [2, 3], [2, 3])
        );
        Ok(())
    }
}
