//! Symmetric 3×3 matrix storage and small fixed-size vector helpers
//!
//! A [`SymmetricMatrix3`] stores only the six independent entries of the
//! upper triangle. Every accessor that exposes the full matrix mirrors those
//! entries, so the lower triangle can never disagree with the upper one.
//!
//! # Example
//!
//! ```
//! use symeig3::SymmetricMatrix3;
//!
//! let m = SymmetricMatrix3::new(4.0, 1.0, 0.0, 4.0, 0.0, 2.0);
//! assert_eq!(m.get(1, 0), 1.0);
//! assert_eq!(m.trace(), 10.0);
//! assert!((m.determinant() - 30.0).abs() < 1e-5);
//! ```

/// A 3-component column vector
pub type Vector3 = [f32; 3];

/// Real symmetric 3×3 matrix stored as its upper triangle
///
/// ```text
/// | a00 a01 a02 |
/// | a01 a11 a12 |
/// | a02 a12 a22 |
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SymmetricMatrix3 {
    /// Row 0, column 0
    pub a00: f32,
    /// Row 0, column 1 (mirrored to row 1, column 0)
    pub a01: f32,
    /// Row 0, column 2 (mirrored to row 2, column 0)
    pub a02: f32,
    /// Row 1, column 1
    pub a11: f32,
    /// Row 1, column 2 (mirrored to row 2, column 1)
    pub a12: f32,
    /// Row 2, column 2
    pub a22: f32,
}

impl SymmetricMatrix3 {
    /// Creates a matrix from its upper triangle, row by row
    #[must_use]
    pub const fn new(a00: f32, a01: f32, a02: f32, a11: f32, a12: f32, a22: f32) -> Self {
        Self {
            a00,
            a01,
            a02,
            a11,
            a12,
            a22,
        }
    }

    /// Zero matrix
    #[must_use]
    pub const fn zeros() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0, 0.0, 0.0)
    }

    /// Identity matrix
    #[must_use]
    pub const fn identity() -> Self {
        Self::from_diagonal(1.0, 1.0, 1.0)
    }

    /// Diagonal matrix `diag(d0, d1, d2)`
    #[must_use]
    pub const fn from_diagonal(d0: f32, d1: f32, d2: f32) -> Self {
        Self::new(d0, 0.0, 0.0, d1, 0.0, d2)
    }

    /// Builds a matrix from full rows, reading only the upper triangle
    ///
    /// # Example
    ///
    /// ```
    /// use symeig3::SymmetricMatrix3;
    ///
    /// // The lower triangle is ignored, not averaged
    /// let m = SymmetricMatrix3::from_rows(&[
    ///     [1.0, 2.0, 3.0],
    ///     [9.0, 4.0, 5.0],
    ///     [9.0, 9.0, 6.0],
    /// ]);
    /// assert_eq!(m.get(1, 0), 2.0);
    /// ```
    #[must_use]
    pub const fn from_rows(rows: &[[f32; 3]; 3]) -> Self {
        Self::new(
            rows[0][0], rows[0][1], rows[0][2], rows[1][1], rows[1][2], rows[2][2],
        )
    }

    /// Builds a matrix from 9 row-major floats, reading only the upper triangle
    #[must_use]
    pub const fn from_row_major(data: &[f32; 9]) -> Self {
        Self::new(data[0], data[1], data[2], data[4], data[5], data[8])
    }

    /// Writes the full matrix as 9 row-major floats
    pub fn write_row_major(&self, out: &mut [f32; 9]) {
        let rows = self.to_rows();
        for (r, row) in rows.iter().enumerate() {
            out[r * 3..r * 3 + 3].copy_from_slice(row);
        }
    }

    /// Expands to full rows with the lower triangle mirrored
    #[must_use]
    pub const fn to_rows(&self) -> [[f32; 3]; 3] {
        [
            [self.a00, self.a01, self.a02],
            [self.a01, self.a11, self.a12],
            [self.a02, self.a12, self.a22],
        ]
    }

    /// Entry at `(row, col)`
    ///
    /// # Panics
    ///
    /// Panics if `row` or `col` is not in `0..3`.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.to_rows()[row][col]
    }

    /// Sum of the diagonal
    #[must_use]
    pub fn trace(&self) -> f32 {
        self.a00 + self.a11 + self.a22
    }

    /// Determinant by cofactor expansion along the first row
    #[must_use]
    pub fn determinant(&self) -> f32 {
        self.a00 * (self.a11 * self.a22 - self.a12 * self.a12)
            - self.a01 * (self.a01 * self.a22 - self.a12 * self.a02)
            + self.a02 * (self.a01 * self.a12 - self.a11 * self.a02)
    }

    /// Squared Frobenius norm (off-diagonal entries counted twice)
    #[must_use]
    pub fn frobenius_norm_sq(&self) -> f32 {
        self.a00 * self.a00
            + self.a11 * self.a11
            + self.a22 * self.a22
            + 2.0 * (self.a01 * self.a01 + self.a02 * self.a02 + self.a12 * self.a12)
    }

    /// Matrix-vector product `A·v`
    #[must_use]
    pub fn mul_vec(&self, v: &Vector3) -> Vector3 {
        [
            self.a00 * v[0] + self.a01 * v[1] + self.a02 * v[2],
            self.a01 * v[0] + self.a11 * v[1] + self.a12 * v[2],
            self.a02 * v[0] + self.a12 * v[1] + self.a22 * v[2],
        ]
    }

    /// `A − λ·I`
    #[must_use]
    pub fn shifted(&self, lambda: f32) -> Self {
        Self::new(
            self.a00 - lambda,
            self.a01,
            self.a02,
            self.a11 - lambda,
            self.a12,
            self.a22 - lambda,
        )
    }

    /// Returns true if all six stored entries are finite
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.a00.is_finite()
            && self.a01.is_finite()
            && self.a02.is_finite()
            && self.a11.is_finite()
            && self.a12.is_finite()
            && self.a22.is_finite()
    }
}

impl From<[[f32; 3]; 3]> for SymmetricMatrix3 {
    fn from(rows: [[f32; 3]; 3]) -> Self {
        Self::from_rows(&rows)
    }
}

/// Arithmetic on [`Vector3`] values
pub mod vec3 {
    use super::Vector3;

    /// Dot product
    #[inline(always)]
    #[must_use]
    pub fn dot(a: &Vector3, b: &Vector3) -> f32 {
        a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
    }

    /// Cross product `a × b`
    #[inline(always)]
    #[must_use]
    pub fn cross(a: &Vector3, b: &Vector3) -> Vector3 {
        [
            a[1] * b[2] - a[2] * b[1],
            a[2] * b[0] - a[0] * b[2],
            a[0] * b[1] - a[1] * b[0],
        ]
    }

    /// Squared Euclidean length
    #[inline(always)]
    #[must_use]
    pub fn norm_sq(a: &Vector3) -> f32 {
        dot(a, a)
    }

    /// Euclidean length
    #[inline(always)]
    #[must_use]
    pub fn norm(a: &Vector3) -> f32 {
        norm_sq(a).sqrt()
    }

    /// `s·a`
    #[inline(always)]
    #[must_use]
    pub fn scale(a: &Vector3, s: f32) -> Vector3 {
        [a[0] * s, a[1] * s, a[2] * s]
    }

    /// `a − s·b`
    #[inline(always)]
    #[must_use]
    pub fn sub_scaled(a: &Vector3, b: &Vector3, s: f32) -> Vector3 {
        [a[0] - s * b[0], a[1] - s * b[1], a[2] - s * b[2]]
    }

    /// Index of the component with the largest magnitude (first wins on ties)
    #[inline(always)]
    #[must_use]
    pub fn argmax_abs(a: &Vector3) -> usize {
        let mut best = 0;
        if a[1].abs() > a[best].abs() {
            best = 1;
        }
        if a[2].abs() > a[best].abs() {
            best = 2;
        }
        best
    }

    /// Index of the component with the smallest magnitude (first wins on ties)
    #[inline(always)]
    #[must_use]
    pub fn argmin_abs(a: &Vector3) -> usize {
        let mut best = 0;
        if a[1].abs() < a[best].abs() {
            best = 1;
        }
        if a[2].abs() < a[best].abs() {
            best = 2;
        }
        best
    }
}
