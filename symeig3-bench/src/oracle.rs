//! Double-precision reference solver (nalgebra)

use nalgebra::{Matrix3, SymmetricEigen, U3};
use symeig3::validation::{canonicalize, ReferenceDecomposition};
use symeig3::SymmetricMatrix3;

/// Raw nalgebra decomposition of `m` widened to f64
pub fn solve(m: &SymmetricMatrix3) -> SymmetricEigen<f64, U3> {
    let rows = m.to_rows();
    Matrix3::from_fn(|r, c| f64::from(rows[r][c])).symmetric_eigen()
}

/// nalgebra output in ascending order with symeig3's sign convention
pub fn to_reference(eig: &SymmetricEigen<f64, U3>) -> ReferenceDecomposition {
    let values = [eig.eigenvalues[0], eig.eigenvalues[1], eig.eigenvalues[2]];
    let column = |k: usize| {
        let v = eig.eigenvectors.column(k);
        [v[0], v[1], v[2]]
    };
    canonicalize(values, [column(0), column(1), column(2)])
}

/// Solve and canonicalize in one step
#[cfg(test)]
pub fn reference(m: &SymmetricMatrix3) -> ReferenceDecomposition {
    to_reference(&solve(m))
}
