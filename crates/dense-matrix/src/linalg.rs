use log::{debug, trace, warn};

use crate::{allocator::MatrixAllocator, error::MatrixError, matrix::Matrix, ops::transpose};

/// Copies every cell of the square `src` except those in `skip_row` or `skip_col` into `dst`.
///
/// `dst` must already be `(size - 1) x (size - 1)` where `size` is the dimension of `src`.
fn minor_into<A: MatrixAllocator>(
    src: &Matrix<A>,
    skip_row: usize,
    skip_col: usize,
    dst: &mut Matrix<A>,
) {
    let cells = dst.as_slice_mut();
    let mut k = 0;
    for (row, src_row) in src.iter_rows().enumerate() {
        if row == skip_row {
            continue;
        }
        for (col, &v) in src_row.iter().enumerate() {
            if col != skip_col {
                cells[k] = v;
                k += 1;
            }
        }
    }
}

/// Builds the minor of `src` obtained by deleting `skip_row` and `skip_col`.
///
/// The returned matrix is a fresh allocation owned by the caller.
fn minor<A: MatrixAllocator>(
    src: &Matrix<A>,
    skip_row: usize,
    skip_col: usize,
) -> Result<Matrix<A>, MatrixError> {
    let size = src.rows();
    trace!("minor ({skip_row}, {skip_col}) of {size}x{size}");
    let mut dst = src.zeros_like(size - 1, size - 1, "minor")?;
    minor_into(src, skip_row, skip_col, &mut dst);
    Ok(dst)
}

/// Checks that `a` is allocated and square, returning its dimension.
fn square_dim<A: MatrixAllocator>(a: &Matrix<A>, operation: &str) -> Result<usize, MatrixError> {
    a.checked_storage(operation)?;
    if !a.is_square() {
        return Err(MatrixError::not_square(a.shape()));
    }
    Ok(a.rows())
}

/// First-row Laplace expansion on an allocated square matrix.
fn determinant_recursive<A: MatrixAllocator>(a: &Matrix<A>) -> Result<f64, MatrixError> {
    let size = a.rows();
    if size == 1 {
        return Ok(a.at(0, 0));
    }

    let mut det = 0.0;
    let mut sign = 1.0;
    for col in 0..size {
        let m = minor(a, 0, col)?;
        det += sign * a.at(0, col) * determinant_recursive(&m)?;
        sign = -sign;
    }
    Ok(det)
}

/// Compute the determinant of a square matrix by cofactor expansion along the first row.
///
/// Runs in `O(n!)` time with recursion depth `n`; intended for small matrices.
///
/// # Errors
///
/// [`MatrixError::InvalidArgument`] if `a` is released, [`MatrixError::NotSquare`] if
/// `a` is not square, [`MatrixError::AllocationFailure`] if a minor cannot be allocated.
///
/// # Example
///
/// ```
/// use dense_matrix::{Matrix, linalg::determinant};
///
/// let a = Matrix::from_rows(&[[1.0, 2.0], [3.0, 4.0]]).unwrap();
/// assert_eq!(determinant(&a).unwrap(), -2.0);
/// ```
pub fn determinant<A: MatrixAllocator>(a: &Matrix<A>) -> Result<f64, MatrixError> {
    let size = square_dim(a, "determinant")?;
    debug!("determinant of {size}x{size} matrix");
    determinant_recursive(a)
}

/// Compute the cofactor matrix: cell `(i, j)` is `(-1)^(i+j)` times the determinant of the
/// minor that deletes row `i` and column `j`.
///
/// The single cofactor of a 1x1 matrix is 1, the determinant of the empty minor.
///
/// # Errors
///
/// [`MatrixError::InvalidArgument`] if `a` is released, [`MatrixError::NotSquare`] if
/// `a` is not square, [`MatrixError::AllocationFailure`] if an allocation fails.
///
/// # Example
///
/// ```
/// use dense_matrix::{Matrix, linalg::cofactors};
///
/// let a = Matrix::from_rows(&[[1.0, 2.0], [3.0, 4.0]]).unwrap();
/// let c = cofactors(&a).unwrap();
/// assert_eq!(c.as_slice(), &[4.0, -3.0, -2.0, 1.0]);
/// ```
pub fn cofactors<A: MatrixAllocator>(a: &Matrix<A>) -> Result<Matrix<A>, MatrixError> {
    let size = square_dim(a, "cofactors")?;
    debug!("cofactors of {size}x{size} matrix");

    let mut out = a.zeros_like(size, size, "cofactors")?;
    if size == 1 {
        out.set(0, 0, 1.0)?;
        return Ok(out);
    }

    for i in 0..size {
        for j in 0..size {
            let m = minor(a, i, j)?;
            let sign = if (i + j) % 2 == 0 { 1.0 } else { -1.0 };
            out.set(i, j, sign * determinant_recursive(&m)?)?;
        }
    }
    Ok(out)
}

/// Invert a square matrix through its adjugate: `inverse = transpose(cofactors(a)) / det(a)`.
///
/// # Errors
///
/// [`MatrixError::InvalidArgument`] if `a` is released, [`MatrixError::NotSquare`] if
/// `a` is not square, [`MatrixError::Singular`] if the determinant is exactly zero,
/// [`MatrixError::AllocationFailure`] if an allocation fails.
///
/// # Example
///
/// ```
/// use dense_matrix::{Matrix, linalg::inverse};
///
/// let a = Matrix::from_rows(&[[4.0, 7.0], [2.0, 6.0]]).unwrap();
/// let inv = inverse(&a).unwrap();
/// let expected = Matrix::from_rows(&[[0.6, -0.7], [-0.2, 0.4]]).unwrap();
/// assert!(inv.equals(&expected));
/// ```
pub fn inverse<A: MatrixAllocator>(a: &Matrix<A>) -> Result<Matrix<A>, MatrixError> {
    let size = square_dim(a, "inverse")?;
    debug!("inverse of {size}x{size} matrix");

    let det = determinant_recursive(a)?;
    if det == 0.0 {
        warn!("cannot invert {size}x{size} matrix: determinant is zero");
        return Err(MatrixError::Singular);
    }

    if size == 1 {
        let mut out = a.zeros_like(1, 1, "inverse")?;
        out.set(0, 0, 1.0 / a.at(0, 0))?;
        return Ok(out);
    }

    let adjugate = transpose(&cofactors(a)?)?;
    adjugate.map(|v| v / det)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minor_skips_row_and_column() -> Result<(), MatrixError> {
        let a = Matrix::from_rows(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]])?;

        let m = minor(&a, 0, 0)?;
        assert_eq!(m.as_slice(), &[5.0, 6.0, 8.0, 9.0]);

        let m = minor(&a, 1, 1)?;
        assert_eq!(m.as_slice(), &[1.0, 3.0, 7.0, 9.0]);

        let m = minor(&a, 2, 0)?;
        assert_eq!(m.as_slice(), &[2.0, 3.0, 5.0, 6.0]);

        let m = minor(&a, 0, 2)?;
        assert_eq!(m.as_slice(), &[4.0, 5.0, 7.0, 8.0]);
        Ok(())
    }

    #[test]
    fn test_minor_into_existing_buffer() -> Result<(), MatrixError> {
        let a = Matrix::from_rows(&[[1.0, 2.0], [3.0, 4.0]])?;
        let mut dst = Matrix::create(1, 1)?;
        minor_into(&a, 1, 0, &mut dst);
        assert_eq!(dst.as_slice(), &[2.0]);
        minor_into(&a, 0, 1, &mut dst);
        assert_eq!(dst.as_slice(), &[3.0]);
        Ok(())
    }

    #[test]
    fn test_determinant_1x1() -> Result<(), MatrixError> {
        let a = Matrix::from_rows(&[[5.0]])?;
        assert_eq!(determinant(&a)?, 5.0);
        Ok(())
    }

    #[test]
    fn test_determinant_2x2() -> Result<(), MatrixError> {
        let a = Matrix::from_rows(&[[1.0, 2.0], [3.0, 4.0]])?;
        assert_eq!(determinant(&a)?, -2.0);
        Ok(())
    }

    #[test]
    fn test_determinant_3x3() -> Result<(), MatrixError> {
        let a = Matrix::from_rows(&[[2.0, 5.0, 7.0], [6.0, 3.0, 4.0], [5.0, -2.0, -3.0]])?;
        assert_eq!(determinant(&a)?, -1.0);

        let singular = Matrix::from_rows(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]])?;
        assert_eq!(determinant(&singular)?, 0.0);
        Ok(())
    }

    #[test]
    fn test_determinant_4x4() -> Result<(), MatrixError> {
        let a = Matrix::from_rows(&[
            [1.0, 0.0, 2.0, -1.0],
            [3.0, 0.0, 0.0, 5.0],
            [2.0, 1.0, 4.0, -3.0],
            [1.0, 0.0, 5.0, 0.0],
        ])?;
        assert_eq!(determinant(&a)?, 30.0);
        Ok(())
    }

    #[test]
    fn test_determinant_errors() -> Result<(), MatrixError> {
        let a = Matrix::create(2, 3)?;
        assert_eq!(
            determinant(&a),
            Err(MatrixError::NotSquare {
                rows: 2,
                columns: 3
            })
        );

        let mut b = Matrix::create(2, 2)?;
        b.release();
        assert!(matches!(
            determinant(&b),
            Err(MatrixError::InvalidArgument(_))
        ));
        Ok(())
    }

    #[test]
    fn test_cofactors_2x2() -> Result<(), MatrixError> {
        let a = Matrix::from_rows(&[[1.0, 2.0], [3.0, 4.0]])?;
        let expected = Matrix::from_rows(&[[4.0, -3.0], [-2.0, 1.0]])?;
        assert!(cofactors(&a)?.equals(&expected));
        Ok(())
    }

    #[test]
    fn test_cofactors_3x3() -> Result<(), MatrixError> {
        let a = Matrix::from_rows(&[[1.0, 2.0, 3.0], [0.0, 4.0, 2.0], [5.0, 2.0, 1.0]])?;
        let expected =
            Matrix::from_rows(&[[0.0, 10.0, -20.0], [4.0, -14.0, 8.0], [-8.0, -2.0, 4.0]])?;
        assert!(cofactors(&a)?.equals(&expected));
        Ok(())
    }

    #[test]
    fn test_cofactors_1x1() -> Result<(), MatrixError> {
        let a = Matrix::from_rows(&[[7.0]])?;
        assert_eq!(cofactors(&a)?.as_slice(), &[1.0]);
        Ok(())
    }

    #[test]
    fn test_cofactors_not_square() -> Result<(), MatrixError> {
        let a = Matrix::create(3, 1)?;
        assert!(matches!(
            cofactors(&a),
            Err(MatrixError::NotSquare { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_inverse_1x1() -> Result<(), MatrixError> {
        let a = Matrix::from_rows(&[[4.0]])?;
        assert_eq!(inverse(&a)?.as_slice(), &[0.25]);
        Ok(())
    }

    #[test]
    fn test_inverse_3x3() -> Result<(), MatrixError> {
        let a = Matrix::from_rows(&[[2.0, 5.0, 7.0], [6.0, 3.0, 4.0], [5.0, -2.0, -3.0]])?;
        let expected =
            Matrix::from_rows(&[[1.0, -1.0, 1.0], [-38.0, 41.0, -34.0], [27.0, -29.0, 24.0]])?;
        let inv = inverse(&a)?;
        assert!(inv.equals(&expected));
        Ok(())
    }

    #[test]
    fn test_inverse_singular() -> Result<(), MatrixError> {
        let a = Matrix::from_rows(&[[1.0, 2.0], [2.0, 4.0]])?;
        assert_eq!(inverse(&a), Err(MatrixError::Singular));

        let zero = Matrix::create(1, 1)?;
        assert_eq!(inverse(&zero), Err(MatrixError::Singular));
        Ok(())
    }

    #[test]
    fn test_inverse_not_square() -> Result<(), MatrixError> {
        let a = Matrix::create(2, 3)?;
        assert!(matches!(inverse(&a), Err(MatrixError::NotSquare { .. })));
        Ok(())
    }
}
