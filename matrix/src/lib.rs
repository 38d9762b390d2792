mod matrix_c64;

use std::ops::{Index, IndexMut};

// Dense column-major matrix, data[j * nrow + i] for element (i, j).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Matrix<T> {
    nrow: usize,
    ncol: usize,
    data: Vec<T>,
}

impl<T: Default + Clone> Matrix<T> {
    pub fn new(nrow: usize, ncol: usize) -> Matrix<T> {
        Matrix {
            nrow,
            ncol,
            data: vec![T::default(); nrow * ncol],
        }
    }

    pub fn get_nrow(&self) -> usize {
        self.nrow
    }

    pub fn get_ncol(&self) -> usize {
        self.ncol
    }

    pub fn as_slice(&self) -> &[T] {
        self.data.as_slice()
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        self.data.as_mut_slice()
    }

    // Columns are contiguous in memory.
    pub fn get_col(&self, j: usize) -> &[T] {
        &self.data[j * self.nrow..(j + 1) * self.nrow]
    }

    pub fn set_col(&mut self, j: usize, col: &[T]) {
        assert_eq!(col.len(), self.nrow);

        self.data[j * self.nrow..(j + 1) * self.nrow].clone_from_slice(col);
    }

    pub fn set_zeros(&mut self)
    where
        T: num_traits::Zero,
    {
        for v in self.data.iter_mut() {
            *v = T::zero();
        }
    }
}

impl<T> Index<[usize; 2]> for Matrix<T> {
    type Output = T;

    fn index(&self, idx: [usize; 2]) -> &T {
        &self.data[idx[1] * self.nrow + idx[0]]
    }
}

impl<T> IndexMut<[usize; 2]> for Matrix<T> {
    fn index_mut(&mut self, idx: [usize; 2]) -> &mut T {
        &mut self.data[idx[1] * self.nrow + idx[0]]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::c64;

    #[test]
    fn test_matrix_index() {
        let mut m = Matrix::<f64>::new(3, 2);

        m[[0, 1]] = 5.0;
        m[[2, 0]] = -1.0;

        assert_eq!(m[[0, 1]], 5.0);
        assert_eq!(m[[2, 0]], -1.0);
        assert_eq!(m.get_nrow(), 3);
        assert_eq!(m.get_ncol(), 2);
    }

    #[test]
    fn test_matrix_columns() {
        let mut m = Matrix::<f64>::new(3, 2);

        m.set_col(1, &[1.0, 2.0, 3.0]);

        assert_eq!(m.get_col(1), &[1.0, 2.0, 3.0]);
        assert_eq!(m[[1, 1]], 2.0);

        m.set_zeros();
        assert_eq!(m.get_col(1), &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_matrix_c64_hermitian_check() {
        let mut m = Matrix::<c64>::new(2, 2);

        m[[0, 1]] = c64::new(1.0, 2.0);
        m[[1, 0]] = c64::new(1.0, -2.0);

        assert!(m.is_hermitian(1.0E-12));

        m[[1, 0]] = c64::new(1.0, 2.0);
        assert!(!m.is_hermitian(1.0E-12));
    }
}
