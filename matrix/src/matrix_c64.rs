use crate::Matrix;

use types::c64;

impl Matrix<c64> {
    pub fn is_hermitian(&self, tol: f64) -> bool {
        if self.nrow != self.ncol {
            return false;
        }

        for j in 0..self.ncol {
            for i in 0..self.nrow {
                let d = self[[i, j]] - self[[j, i]].conj();

                if d.norm() > tol {
                    return false;
                }
            }
        }

        true
    }
}
