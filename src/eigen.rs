//! Closed-form eigendecomposition of real symmetric 3×3 matrices
//!
//! Every symmetric matrix has three real eigenvalues, so the characteristic
//! cubic can be solved with the trigonometric form instead of complex
//! arithmetic. The work per matrix is constant: no iteration, no allocation,
//! and a handful of well-predicted branches.
//!
//! # Algorithm
//!
//! 1. Shift `B = A − m·I` with `m = trace(A)/3`.
//! 2. `p = ‖B‖²_F / 6`, `q = det(B) / 2`, `φ = acos(clamp(q / p^1.5, −1, 1)) / 3`.
//! 3. `λ = m + 2·√p·cos(φ + 2πk/3)`. When `p` is negligible relative to `m²`
//!    the trigonometric step is skipped and all three eigenvalues equal `m`.
//! 4. Each eigenvector is the normalized cross product of the two least
//!    parallel rows of `A − λ·I`. Repeated eigenvalues get an arbitrary
//!    orthonormal basis of their eigenspace.
//!
//! Steps 1 to 3 run in f64 and round the roots to f32 once, which keeps
//! closely spaced eigenvalues accurate. Eigenvector recovery stays in f32.
//!
//! # Conventions
//!
//! - Eigenvalues are ascending.
//! - Each eigenvector has its largest-magnitude component non-negative (the
//!   first such component on ties).
//! - Non-finite input yields non-finite output; nothing is validated.
//!
//! # Example
//!
//! ```
//! use symeig3::{decompose, SymmetricMatrix3};
//!
//! let m = SymmetricMatrix3::new(4.0, 1.0, 0.0, 4.0, 0.0, 2.0);
//! let eig = decompose(&m);
//!
//! let values = eig.eigenvalues.as_array();
//! assert!((values[0] - 2.0).abs() < 1e-5);
//! assert!((values[1] - 3.0).abs() < 1e-5);
//! assert!((values[2] - 5.0).abs() < 1e-5);
//!
//! // Eigenvector for λ = 2 is the z axis
//! let v0 = eig.eigenvectors.vector(0);
//! assert!((v0[2] - 1.0).abs() < 1e-5);
//! ```

use std::f64::consts::PI;
use std::ops::Index;

use crate::matrix::{vec3, SymmetricMatrix3, Vector3};
use crate::SolverConfig;

const TWO_PI_OVER_THREE: f64 = 2.0 * PI / 3.0;

/// Three real eigenvalues in ascending order
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EigenvalueTriple([f32; 3]);

impl EigenvalueTriple {
    /// Wraps three values, sorting them ascending
    ///
    /// NaN values are left where they are.
    #[must_use]
    pub fn new(mut values: [f32; 3]) -> Self {
        sort3(&mut values);
        Self(values)
    }

    #[inline(always)]
    pub(crate) const fn from_sorted(values: [f32; 3]) -> Self {
        Self(values)
    }

    /// The eigenvalues, smallest first
    #[must_use]
    pub const fn as_array(&self) -> [f32; 3] {
        self.0
    }

    /// Sum of the eigenvalues (equals the trace)
    #[must_use]
    pub fn sum(&self) -> f32 {
        self.0[0] + self.0[1] + self.0[2]
    }

    /// Product of the eigenvalues (equals the determinant)
    #[must_use]
    pub fn product(&self) -> f32 {
        self.0[0] * self.0[1] * self.0[2]
    }

    /// Largest eigenvalue magnitude
    #[must_use]
    pub fn max_abs(&self) -> f32 {
        self.0[0].abs().max(self.0[2].abs())
    }

    /// Classifies eigenvalue gaps against the degeneracy tolerance
    ///
    /// # Example
    ///
    /// ```
    /// use symeig3::{Degeneracy, EigenvalueTriple, SolverConfig};
    ///
    /// let values = EigenvalueTriple::new([2.0, 2.0, 5.0]);
    /// assert_eq!(
    ///     values.degeneracy(&SolverConfig::default()),
    ///     Degeneracy::RepeatedPair { distinct: 2 }
    /// );
    /// ```
    #[must_use]
    pub fn degeneracy(&self, config: &SolverConfig) -> Degeneracy {
        let [l0, l1, l2] = self.0;
        let eps = config.degeneracy_tolerance * self.max_abs();
        let low_tie = l1 - l0 <= eps;
        let high_tie = l2 - l1 <= eps;

        match (low_tie, high_tie) {
            (true, true) => Degeneracy::AllEqual,
            (true, false) => Degeneracy::RepeatedPair { distinct: 2 },
            (false, true) => Degeneracy::RepeatedPair { distinct: 0 },
            (false, false) => Degeneracy::Distinct,
        }
    }
}

impl Index<usize> for EigenvalueTriple {
    type Output = f32;

    fn index(&self, index: usize) -> &f32 {
        &self.0[index]
    }
}

/// Multiplicity pattern of an [`EigenvalueTriple`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Degeneracy {
    /// All gaps exceed the tolerance
    Distinct,
    /// Two eigenvalues coincide; `distinct` indexes the remaining one (0 or 2)
    RepeatedPair {
        /// Index of the eigenvalue outside the repeated pair
        distinct: usize,
    },
    /// The matrix is numerically a multiple of the identity
    AllEqual,
}

/// Orthonormal eigenvectors, index-aligned with an [`EigenvalueTriple`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EigenvectorBasis([Vector3; 3]);

impl Default for EigenvectorBasis {
    fn default() -> Self {
        Self::standard()
    }
}

impl EigenvectorBasis {
    /// Wraps three vectors as given
    #[must_use]
    pub const fn new(vectors: [Vector3; 3]) -> Self {
        Self(vectors)
    }

    /// The standard basis `e1, e2, e3`
    #[must_use]
    pub const fn standard() -> Self {
        Self([[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]])
    }

    /// Eigenvector for eigenvalue `i`
    ///
    /// # Panics
    ///
    /// Panics if `i >= 3`.
    #[must_use]
    pub fn vector(&self, i: usize) -> Vector3 {
        self.0[i]
    }

    /// All three eigenvectors
    #[must_use]
    pub const fn as_array(&self) -> [Vector3; 3] {
        self.0
    }

    /// Largest deviation of `Vᵀ·V` from the identity
    #[must_use]
    pub fn orthonormality_error(&self) -> f32 {
        let mut worst = 0.0f32;
        for i in 0..3 {
            for j in i..3 {
                let expected = if i == j { 1.0 } else { 0.0 };
                worst = worst.max((vec3::dot(&self.0[i], &self.0[j]) - expected).abs());
            }
        }
        worst
    }
}

/// Eigenvalues paired with their eigenvectors for one matrix
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EigenDecomposition {
    /// Ascending eigenvalues
    pub eigenvalues: EigenvalueTriple,
    /// Eigenvector `i` belongs to eigenvalue `i`
    pub eigenvectors: EigenvectorBasis,
}

impl EigenDecomposition {
    /// Iterates `(λᵢ, vᵢ)` pairs, smallest eigenvalue first
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (f32, Vector3)> + '_ {
        (0..3).map(move |i| (self.eigenvalues[i], self.eigenvectors.vector(i)))
    }

    /// Largest `‖A·vᵢ − λᵢ·vᵢ‖` over the three pairs
    #[must_use]
    pub fn residual(&self, matrix: &SymmetricMatrix3) -> f32 {
        self.iter()
            .map(|(lambda, v)| {
                let av = matrix.mul_vec(&v);
                vec3::norm(&vec3::sub_scaled(&av, &v, lambda))
            })
            .fold(0.0f32, f32::max)
    }

    /// Rebuilds `V·diag(λ)·Vᵀ`
    ///
    /// # Example
    ///
    /// ```
    /// use symeig3::{decompose, SymmetricMatrix3};
    ///
    /// let m = SymmetricMatrix3::new(2.0, -1.0, 0.5, 3.0, 0.25, 1.0);
    /// let r = decompose(&m).reconstruct();
    /// assert!((r.a01 - m.a01).abs() < 1e-4);
    /// assert!((r.a22 - m.a22).abs() < 1e-4);
    /// ```
    #[must_use]
    pub fn reconstruct(&self) -> SymmetricMatrix3 {
        let mut out = SymmetricMatrix3::zeros();
        for (lambda, v) in self.iter() {
            out.a00 += lambda * v[0] * v[0];
            out.a01 += lambda * v[0] * v[1];
            out.a02 += lambda * v[0] * v[2];
            out.a11 += lambda * v[1] * v[1];
            out.a12 += lambda * v[1] * v[2];
            out.a22 += lambda * v[2] * v[2];
        }
        out
    }
}

/// Shift and cubic invariants of one matrix, in f64
///
/// `p` and `q` belong to the shifted matrix `A − m·I`. The f64 exponent range
/// holds the cube of any finite f32 entry, so no rescaling is needed.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub(crate) struct Invariants {
    pub m: f64,
    pub p: f64,
    pub q: f64,
}

/// Invariants from the six stored entries of one matrix
///
/// Takes loose entries so the lane kernel can feed it straight from its
/// per-entry arrays.
#[inline(always)]
pub(crate) fn shifted_invariants(a00: f32, a01: f32, a02: f32, a11: f32, a12: f32, a22: f32) -> Invariants {
    let (a00, a11, a22) = (f64::from(a00), f64::from(a11), f64::from(a22));
    let (a01, a02, a12) = (f64::from(a01), f64::from(a02), f64::from(a12));

    let m = (a00 + a11 + a22) / 3.0;
    let b00 = a00 - m;
    let b11 = a11 - m;
    let b22 = a22 - m;

    let p = (b00 * b00 + b11 * b11 + b22 * b22 + 2.0 * (a01 * a01 + a02 * a02 + a12 * a12)) / 6.0;
    let det = b00 * (b11 * b22 - a12 * a12) - a01 * (a01 * b22 - a12 * a02) + a02 * (a01 * a12 - b11 * a02);

    Invariants { m, p, q: 0.5 * det }
}

/// Ascending roots of the characteristic cubic, rounded to f32
///
/// The trigonometric step runs in f64: near a repeated pair `q / p^1.5`
/// sits next to ±1 where `acos` amplifies rounding by `1/√ε`.
#[inline(always)]
pub(crate) fn roots_from_invariants(inv: &Invariants, config: &SolverConfig) -> [f32; 3] {
    let m = inv.m;
    let flat = inv.p <= f64::from(config.zero_tolerance) * m * m;

    // Substitute a harmless p so the shared arithmetic never divides by ~0.
    let p = if flat { 1.0 } else { inv.p };
    let sqrt_p = p.sqrt();
    let r = (inv.q / (p * sqrt_p)).clamp(-1.0, 1.0);
    let phi = r.acos() / 3.0;
    let amplitude = 2.0 * sqrt_p;

    let largest = m + amplitude * phi.cos();
    let smallest = m + amplitude * (phi + TWO_PI_OVER_THREE).cos();
    let middle = 3.0 * m - largest - smallest;

    let mut values = [smallest as f32, middle as f32, largest as f32];
    sort3(&mut values);

    if flat {
        let m = m as f32;
        [m, m, m]
    } else {
        values
    }
}

/// Compare-swap network; NaN never moves
#[inline(always)]
fn sort3(v: &mut [f32; 3]) {
    if v[0] > v[1] {
        v.swap(0, 1);
    }
    if v[1] > v[2] {
        v.swap(1, 2);
    }
    if v[0] > v[1] {
        v.swap(0, 1);
    }
}

/// Solves the characteristic cubic of `matrix` with default tolerances
///
/// # Example
///
/// ```
/// use symeig3::{solve_eigenvalues, SymmetricMatrix3};
///
/// let values = solve_eigenvalues(&SymmetricMatrix3::from_diagonal(5.0, 2.0, 3.0));
/// let [l0, l1, l2] = values.as_array();
/// assert!((l0 - 2.0).abs() < 1e-5);
/// assert!((l1 - 3.0).abs() < 1e-5);
/// assert!((l2 - 5.0).abs() < 1e-5);
/// ```
#[must_use]
pub fn solve_eigenvalues(matrix: &SymmetricMatrix3) -> EigenvalueTriple {
    solve_eigenvalues_with(matrix, &SolverConfig::default())
}

/// Solves the characteristic cubic of `matrix`
#[must_use]
pub fn solve_eigenvalues_with(matrix: &SymmetricMatrix3, config: &SolverConfig) -> EigenvalueTriple {
    let inv = shifted_invariants(matrix.a00, matrix.a01, matrix.a02, matrix.a11, matrix.a12, matrix.a22);
    EigenvalueTriple(roots_from_invariants(&inv, config))
}

/// Recovers eigenvectors for already-solved eigenvalues with default tolerances
#[must_use]
pub fn recover_eigenvectors(matrix: &SymmetricMatrix3, values: &EigenvalueTriple) -> EigenvectorBasis {
    recover_eigenvectors_with(matrix, values, &SolverConfig::default())
}

/// Recovers an orthonormal eigenvector basis for ascending `values`
///
/// The branch taken depends on [`EigenvalueTriple::degeneracy`]:
///
/// - `Distinct`: the extreme eigenvalue with the wider gap anchors the basis,
///   the opposite extreme is orthogonalized against it and the middle vector
///   is their cross product.
/// - `RepeatedPair`: the distinct eigenvector is solved directly and any
///   orthonormal pair spanning its complement is returned for the pair.
/// - `AllEqual`: the standard basis.
#[must_use]
pub fn recover_eigenvectors_with(
    matrix: &SymmetricMatrix3,
    values: &EigenvalueTriple,
    config: &SolverConfig,
) -> EigenvectorBasis {
    let vectors = match values.degeneracy(config) {
        Degeneracy::AllEqual => return EigenvectorBasis::standard(),
        Degeneracy::RepeatedPair { distinct } => {
            let d = null_vector(&matrix.shifted(values[distinct]));
            let u = any_orthogonal(&d);
            let w = vec3::cross(&d, &u);
            if distinct == 0 {
                [d, u, w]
            } else {
                [u, w, d]
            }
        }
        Degeneracy::Distinct => {
            let (anchor, opposite) = if values[1] - values[0] >= values[2] - values[1] {
                (0, 2)
            } else {
                (2, 0)
            };
            let a = null_vector(&matrix.shifted(values[anchor]));
            let b = orthogonalize(&null_vector(&matrix.shifted(values[opposite])), &a);

            let mut basis = [[0.0f32; 3]; 3];
            basis[anchor] = a;
            basis[opposite] = b;
            basis[1] = vec3::cross(&basis[2], &basis[0]);
            basis
        }
    };

    EigenvectorBasis(vectors.map(|v| canonical_sign(&v)))
}

/// Decomposes `matrix` with default tolerances
#[must_use]
pub fn decompose(matrix: &SymmetricMatrix3) -> EigenDecomposition {
    decompose_with(matrix, &SolverConfig::default())
}

/// Decomposes `matrix`: eigenvalue solve followed by eigenvector recovery
#[must_use]
pub fn decompose_with(matrix: &SymmetricMatrix3, config: &SolverConfig) -> EigenDecomposition {
    let eigenvalues = solve_eigenvalues_with(matrix, config);
    let eigenvectors = recover_eigenvectors_with(matrix, &eigenvalues, config);
    EigenDecomposition {
        eigenvalues,
        eigenvectors,
    }
}

/// Unit vector spanning the null space of a (near-)singular `shifted`
///
/// Uses the pair of rows whose cross product is largest. Rows are scaled by
/// the largest entry first so tiny matrices do not underflow.
#[inline(always)]
fn null_vector(shifted: &SymmetricMatrix3) -> Vector3 {
    let rows = shifted.to_rows();
    let max_abs = rows
        .iter()
        .flatten()
        .fold(0.0f32, |acc, x| acc.max(x.abs()));
    let inv = if max_abs > 0.0 { 1.0 / max_abs } else { 1.0 };
    let rows = rows.map(|r| vec3::scale(&r, inv));

    let candidates = [
        vec3::cross(&rows[0], &rows[1]),
        vec3::cross(&rows[0], &rows[2]),
        vec3::cross(&rows[1], &rows[2]),
    ];

    let mut best = candidates[0];
    let mut best_norm_sq = vec3::norm_sq(&best);
    for c in &candidates[1..] {
        let n = vec3::norm_sq(c);
        if n > best_norm_sq {
            best = *c;
            best_norm_sq = n;
        }
    }

    if best_norm_sq <= f32::MIN_POSITIVE {
        // Rank ≤ 1: every vector orthogonal to the dominant row is a solution.
        let dominant = rows
            .iter()
            .copied()
            .fold([0.0f32; 3], |acc, r| {
                if vec3::norm_sq(&r) > vec3::norm_sq(&acc) {
                    r
                } else {
                    acc
                }
            });
        return any_orthogonal(&dominant);
    }

    vec3::scale(&best, 1.0 / best_norm_sq.sqrt())
}

/// Some unit vector orthogonal to `v` (the x axis when `v` is zero)
#[inline(always)]
fn any_orthogonal(v: &Vector3) -> Vector3 {
    let mut axis = [0.0f32; 3];
    axis[vec3::argmin_abs(v)] = 1.0;
    let c = vec3::cross(v, &axis);
    let n = vec3::norm_sq(&c);
    if n <= f32::MIN_POSITIVE {
        return axis;
    }
    vec3::scale(&c, 1.0 / n.sqrt())
}

/// `b` with its component along unit `a` removed, renormalized
#[inline(always)]
fn orthogonalize(b: &Vector3, a: &Vector3) -> Vector3 {
    let r = vec3::sub_scaled(b, a, vec3::dot(b, a));
    let n = vec3::norm_sq(&r);
    if n <= f32::MIN_POSITIVE {
        return any_orthogonal(a);
    }
    vec3::scale(&r, 1.0 / n.sqrt())
}

#[inline(always)]
fn canonical_sign(v: &Vector3) -> Vector3 {
    if v[vec3::argmax_abs(v)] < 0.0 {
        vec3::scale(v, -1.0)
    } else {
        *v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQRT_HALF: f32 = std::f32::consts::FRAC_1_SQRT_2;

    fn assert_valid(m: &SymmetricMatrix3, eig: &EigenDecomposition) {
        let tol = 1e-4 * eig.eigenvalues.max_abs().max(1.0);
        let residual = eig.residual(m);
        assert!(residual <= tol, "residual {residual} > {tol} for {m:?}");
        let ortho = eig.eigenvectors.orthonormality_error();
        assert!(ortho <= 1e-4, "orthonormality error {ortho} for {m:?}");
    }

    fn assert_parallel(actual: &Vector3, expected: &Vector3) {
        let cos = vec3::dot(actual, expected).abs();
        assert!((cos - 1.0).abs() < 1e-5, "{actual:?} not parallel to {expected:?}");
    }

    #[test]
    fn test_diagonal_matrix() {
        let m = SymmetricMatrix3::from_diagonal(2.0, 3.0, 5.0);
        let eig = decompose(&m);

        let [l0, l1, l2] = eig.eigenvalues.as_array();
        assert!((l0 - 2.0).abs() < 1e-5, "got {l0}");
        assert!((l1 - 3.0).abs() < 1e-5, "got {l1}");
        assert!((l2 - 5.0).abs() < 1e-5, "got {l2}");

        assert_parallel(&eig.eigenvectors.vector(0), &[1.0, 0.0, 0.0]);
        assert_parallel(&eig.eigenvectors.vector(1), &[0.0, 1.0, 0.0]);
        assert_parallel(&eig.eigenvectors.vector(2), &[0.0, 0.0, 1.0]);
        assert_valid(&m, &eig);
    }

    #[test]
    fn test_diagonal_matrix_unsorted_input() {
        let m = SymmetricMatrix3::from_diagonal(5.0, 2.0, 3.0);
        let eig = decompose(&m);
        assert!((eig.eigenvalues[0] - 2.0).abs() < 1e-5);
        assert_parallel(&eig.eigenvectors.vector(0), &[0.0, 1.0, 0.0]);
        assert_parallel(&eig.eigenvectors.vector(2), &[1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_block_matrix() {
        let m = SymmetricMatrix3::new(4.0, 1.0, 0.0, 4.0, 0.0, 2.0);
        let eig = decompose(&m);

        let [l0, l1, l2] = eig.eigenvalues.as_array();
        assert!((l0 - 2.0).abs() < 1e-5, "got {l0}");
        assert!((l1 - 3.0).abs() < 1e-5, "got {l1}");
        assert!((l2 - 5.0).abs() < 1e-5, "got {l2}");

        assert_parallel(&eig.eigenvectors.vector(0), &[0.0, 0.0, 1.0]);
        assert_parallel(&eig.eigenvectors.vector(1), &[SQRT_HALF, -SQRT_HALF, 0.0]);
        assert_parallel(&eig.eigenvectors.vector(2), &[SQRT_HALF, SQRT_HALF, 0.0]);
        assert_valid(&m, &eig);
    }

    #[test]
    fn test_identity_takes_flat_path() {
        let m = SymmetricMatrix3::identity();
        let eig = decompose(&m);
        assert_eq!(eig.eigenvalues.as_array(), [1.0, 1.0, 1.0]);
        assert_eq!(eig.eigenvectors, EigenvectorBasis::standard());
        assert_valid(&m, &eig);
    }

    #[test]
    fn test_zero_matrix() {
        let m = SymmetricMatrix3::zeros();
        let eig = decompose(&m);
        assert_eq!(eig.eigenvalues.as_array(), [0.0, 0.0, 0.0]);
        assert_eq!(eig.eigenvectors.orthonormality_error(), 0.0);
        assert_valid(&m, &eig);
    }

    #[test]
    fn test_scaled_identity() {
        let m = SymmetricMatrix3::from_diagonal(-7.5, -7.5, -7.5);
        let eig = decompose(&m);
        assert_eq!(eig.eigenvalues.as_array(), [-7.5, -7.5, -7.5]);
        assert_valid(&m, &eig);
    }

    #[test]
    fn test_repeated_pair_low() {
        // Eigenvalues 1, 1, 4 with distinct eigenvector (1,1,1)/√3
        let m = SymmetricMatrix3::new(2.0, 1.0, 1.0, 2.0, 1.0, 2.0);
        let eig = decompose(&m);

        let [l0, l1, l2] = eig.eigenvalues.as_array();
        assert!((l0 - 1.0).abs() < 1e-5, "got {l0}");
        assert!((l1 - 1.0).abs() < 1e-5, "got {l1}");
        assert!((l2 - 4.0).abs() < 1e-5, "got {l2}");
        assert_eq!(
            eig.eigenvalues.degeneracy(&SolverConfig::default()),
            Degeneracy::RepeatedPair { distinct: 2 }
        );

        let third = 1.0 / 3.0f32.sqrt();
        assert_parallel(&eig.eigenvectors.vector(2), &[third, third, third]);
        assert_valid(&m, &eig);
    }

    #[test]
    fn test_repeated_pair_high() {
        let m = SymmetricMatrix3::from_diagonal(-3.0, 6.0, 6.0);
        let eig = decompose(&m);
        assert_eq!(
            eig.eigenvalues.degeneracy(&SolverConfig::default()),
            Degeneracy::RepeatedPair { distinct: 0 }
        );
        assert_parallel(&eig.eigenvectors.vector(0), &[1.0, 0.0, 0.0]);
        assert_valid(&m, &eig);
    }

    #[test]
    fn test_negative_definite() {
        let m = SymmetricMatrix3::new(-4.0, -1.0, 0.0, -4.0, 0.0, -2.0);
        let eig = decompose(&m);
        let [l0, l1, l2] = eig.eigenvalues.as_array();
        assert!((l0 + 5.0).abs() < 1e-5);
        assert!((l1 + 3.0).abs() < 1e-5);
        assert!((l2 + 2.0).abs() < 1e-5);
        assert_valid(&m, &eig);
    }

    #[test]
    fn test_tiny_and_huge_scale() {
        for s in [1e-20f32, 1e-6, 1e6, 1e15] {
            let m = SymmetricMatrix3::new(4.0 * s, 1.0 * s, 0.0, 4.0 * s, 0.0, 2.0 * s);
            let eig = decompose(&m);
            let [l0, l1, l2] = eig.eigenvalues.as_array();
            assert!((l0 / s - 2.0).abs() < 1e-4, "scale {s}: got {l0}");
            assert!((l1 / s - 3.0).abs() < 1e-4, "scale {s}: got {l1}");
            assert!((l2 / s - 5.0).abs() < 1e-4, "scale {s}: got {l2}");
            assert!(eig.eigenvectors.orthonormality_error() < 1e-4);
        }
    }

    #[test]
    fn test_rank_one_matrix() {
        // v·vᵀ with v = (1, 2, 2): eigenvalues 0, 0, 9
        let m = SymmetricMatrix3::new(1.0, 2.0, 2.0, 4.0, 4.0, 4.0);
        let eig = decompose(&m);
        assert!((eig.eigenvalues[2] - 9.0).abs() < 1e-4);
        assert!(eig.eigenvalues[0].abs() < 1e-4);
        assert_parallel(&eig.eigenvectors.vector(2), &[1.0 / 3.0, 2.0 / 3.0, 2.0 / 3.0]);
        assert_valid(&m, &eig);
    }

    #[test]
    fn test_sign_convention() {
        let m = SymmetricMatrix3::new(2.0, -1.0, 0.5, 3.0, 0.25, 1.0);
        let eig = decompose(&m);
        for i in 0..3 {
            let v = eig.eigenvectors.vector(i);
            assert!(v[vec3::argmax_abs(&v)] >= 0.0, "vector {i} = {v:?}");
        }
    }

    #[test]
    fn test_trace_and_determinant_identities() {
        let m = SymmetricMatrix3::new(1.5, -2.0, 0.75, 3.0, 1.25, -0.5);
        let values = solve_eigenvalues(&m);
        assert!((values.sum() - m.trace()).abs() < 1e-4);
        assert!((values.product() - m.determinant()).abs() < 1e-3);
    }

    #[test]
    fn test_deterministic_bitwise() {
        let m = SymmetricMatrix3::new(12.5, -33.0, 7.25, 91.0, -0.5, -64.0);
        let first = decompose(&m);
        for _ in 0..100 {
            let again = decompose(&m);
            for i in 0..3 {
                assert_eq!(again.eigenvalues[i].to_bits(), first.eigenvalues[i].to_bits());
                for k in 0..3 {
                    assert_eq!(
                        again.eigenvectors.vector(i)[k].to_bits(),
                        first.eigenvectors.vector(i)[k].to_bits()
                    );
                }
            }
        }
    }

    #[test]
    fn test_nan_propagates() {
        let mut m = SymmetricMatrix3::identity();
        m.a01 = f32::NAN;
        let eig = decompose(&m);
        for (lambda, v) in eig.iter() {
            assert!(!lambda.is_finite());
            assert!(v.iter().all(|x| !x.is_finite()), "got {v:?}");
        }
    }

    #[test]
    fn test_infinity_propagates() {
        let mut m = SymmetricMatrix3::identity();
        m.a22 = f32::INFINITY;
        let eig = decompose(&m);
        assert!(eig.eigenvalues.as_array().iter().all(|x| !x.is_finite()));
    }

    #[test]
    fn test_degeneracy_classification() {
        let config = SolverConfig::default();
        assert_eq!(
            EigenvalueTriple::new([1.0, 2.0, 3.0]).degeneracy(&config),
            Degeneracy::Distinct
        );
        assert_eq!(
            EigenvalueTriple::new([3.0, 3.0, 3.0]).degeneracy(&config),
            Degeneracy::AllEqual
        );
        assert_eq!(
            EigenvalueTriple::new([0.0, 0.0, 0.0]).degeneracy(&config),
            Degeneracy::AllEqual
        );
        assert_eq!(
            EigenvalueTriple::new([-1.0, 5.0, 5.0 + 1e-6]).degeneracy(&config),
            Degeneracy::RepeatedPair { distinct: 0 }
        );
        assert_eq!(
            EigenvalueTriple::new([f32::NAN, 1.0, 2.0]).degeneracy(&config),
            Degeneracy::Distinct
        );
    }

    #[test]
    fn test_eigenvalue_triple_sorts() {
        let t = EigenvalueTriple::new([3.0, -1.0, 2.0]);
        assert_eq!(t.as_array(), [-1.0, 2.0, 3.0]);
        assert_eq!(t.max_abs(), 3.0);
    }

    #[test]
    fn test_reconstruct_matches_input() {
        let m = SymmetricMatrix3::new(4.0, 2.0, 0.0, 5.0, 3.0, 6.0);
        let r = decompose(&m).reconstruct();
        for row in 0..3 {
            for col in 0..3 {
                assert!(
                    (r.get(row, col) - m.get(row, col)).abs() < 1e-4,
                    "A[{row},{col}] = {}, reconstructed = {}",
                    m.get(row, col),
                    r.get(row, col)
                );
            }
        }
    }

    #[test]
    fn test_iter_is_ascending() {
        let eig = decompose(&SymmetricMatrix3::new(4.0, 2.0, 0.0, 5.0, 3.0, 6.0));
        let pairs: Vec<_> = eig.iter().collect();
        assert_eq!(pairs.len(), 3);
        assert!(pairs[0].0 <= pairs[1].0 && pairs[1].0 <= pairs[2].0);
    }

    #[test]
    fn test_degeneracy_tolerance_merges_close_pair() {
        let m = SymmetricMatrix3::from_diagonal(1.0, 1.01, 3.0);

        let strict = decompose_with(&m, &SolverConfig::strict());
        assert_eq!(
            strict.eigenvalues.degeneracy(&SolverConfig::strict()),
            Degeneracy::Distinct
        );
        assert_valid(&m, &strict);

        let loose = SolverConfig::new().with_degeneracy_tolerance(0.01).build();
        let merged = decompose_with(&m, &loose);
        assert_eq!(
            merged.eigenvalues.degeneracy(&loose),
            Degeneracy::RepeatedPair { distinct: 2 }
        );
        // Within the merged plane any orthonormal pair is acceptable
        assert_parallel(&merged.eigenvectors.vector(2), &[0.0, 0.0, 1.0]);
        assert!(merged.eigenvectors.orthonormality_error() <= 1e-5);
    }

    /// Rotation matrix from a random unit quaternion
    fn random_rotation(rng: &mut impl rand::Rng) -> [[f64; 3]; 3] {
        let (w, x, y, z) = loop {
            let q: [f64; 4] = std::array::from_fn(|_| rng.gen_range(-1.0..1.0));
            let n = q.iter().map(|c| c * c).sum::<f64>().sqrt();
            if n > 0.1 {
                break (q[0] / n, q[1] / n, q[2] / n, q[3] / n);
            }
        };
        [
            [1.0 - 2.0 * (y * y + z * z), 2.0 * (x * y - w * z), 2.0 * (x * z + w * y)],
            [2.0 * (x * y + w * z), 1.0 - 2.0 * (x * x + z * z), 2.0 * (y * z - w * x)],
            [2.0 * (x * z - w * y), 2.0 * (y * z + w * x), 1.0 - 2.0 * (x * x + y * y)],
        ]
    }

    /// `R·diag(d)·Rᵀ` rounded to f32
    fn rotated_diagonal(r: &[[f64; 3]; 3], d: [f64; 3]) -> SymmetricMatrix3 {
        let entry = |i: usize, j: usize| (0..3).map(|k| r[i][k] * d[k] * r[j][k]).sum::<f64>() as f32;
        SymmetricMatrix3::new(entry(0, 0), entry(0, 1), entry(0, 2), entry(1, 1), entry(1, 2), entry(2, 2))
    }

    #[test]
    fn test_close_eigenvalue_pairs_stay_accurate() {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};

        let mut rng = StdRng::seed_from_u64(31);
        let steps = 64;
        for step in 0..steps {
            // Relative gap swept log-uniformly over [1e-9, 1]
            let gap = 10f64.powf(-9.0 + 9.0 * f64::from(step) / f64::from(steps - 1));
            for _ in 0..40 {
                let lambda: f64 = rng.gen_range(-50.0..50.0);
                let mu: f64 = rng.gen_range(-100.0..100.0);
                let scale = f64::max(lambda.abs(), mu.abs()).max(1.0);
                let r = random_rotation(&mut rng);
                let m = rotated_diagonal(&r, [lambda, lambda + gap * scale, mu]);
                assert_valid(&m, &decompose(&m));
            }
        }
    }

    #[test]
    fn test_close_pair_eigenvalues_resolved() {
        use rand::rngs::StdRng;
        use rand::SeedableRng;

        // Pair gap of 1e-3 relative to the matrix scale
        let r = random_rotation(&mut StdRng::seed_from_u64(5));
        let m = rotated_diagonal(&r, [41.5, 41.5 + 0.04, -44.0]);
        let values = solve_eigenvalues(&m).as_array();
        assert!((values[0] + 44.0).abs() < 1e-4, "got {values:?}");
        assert!((values[1] - 41.5).abs() < 1e-4, "got {values:?}");
        assert!((values[2] - 41.54).abs() < 1e-4, "got {values:?}");
    }

    // =========================================================================
    // Property-based tests (proptest)
    // =========================================================================

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn symmetric() -> impl Strategy<Value = SymmetricMatrix3> {
            prop::array::uniform6(-100.0f32..100.0)
                .prop_map(|[a00, a01, a02, a11, a12, a22]| {
                    SymmetricMatrix3::new(a00, a01, a02, a11, a12, a22)
                })
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(200))]

            #[test]
            fn prop_reconstruction(m in symmetric()) {
                let eig = decompose(&m);
                let tol = 1e-4 * eig.eigenvalues.max_abs().max(1.0);
                prop_assert!(eig.residual(&m) <= tol, "residual {} > {}", eig.residual(&m), tol);
            }

            #[test]
            fn prop_orthonormal(m in symmetric()) {
                let eig = decompose(&m);
                prop_assert!(eig.eigenvectors.orthonormality_error() <= 1e-4);
            }

            #[test]
            fn prop_ascending(m in symmetric()) {
                let values = solve_eigenvalues(&m).as_array();
                prop_assert!(values[0] <= values[1] && values[1] <= values[2]);
            }

            #[test]
            fn prop_trace_identity(m in symmetric()) {
                let values = solve_eigenvalues(&m);
                let tol = 1e-4 * values.max_abs().max(1.0);
                prop_assert!((values.sum() - m.trace()).abs() <= tol);
            }

            #[test]
            fn prop_determinant_identity(m in symmetric()) {
                let values = solve_eigenvalues(&m);
                let scale = values.max_abs().max(1.0);
                let tol = 1e-4 * scale * scale * scale;
                prop_assert!((values.product() - m.determinant()).abs() <= tol);
            }

            #[test]
            fn prop_diagonal_recovers_entries(
                d in prop::array::uniform3(-50.0f32..50.0)
            ) {
                let m = SymmetricMatrix3::from_diagonal(d[0], d[1], d[2]);
                let mut expected = d;
                expected.sort_by(|a, b| a.partial_cmp(b).unwrap());
                let values = solve_eigenvalues(&m).as_array();
                for i in 0..3 {
                    prop_assert!((values[i] - expected[i]).abs() <= 1e-4 * 50.0);
                }
            }
        }
    }
}
