//! Structure-of-arrays batch containers
//!
//! [`MatrixBatch`] keeps one contiguous array per stored matrix entry and
//! [`DecompositionBatch`] one per output component, the layout tensor-field
//! code usually already has in memory.
//!
//! # Example
//!
//! ```
//! use symeig3::{decompose_soa, MatrixBatch, SymmetricMatrix3};
//!
//! let mut batch = MatrixBatch::new();
//! batch.push(SymmetricMatrix3::from_diagonal(2.0, 3.0, 5.0));
//! batch.push(SymmetricMatrix3::identity());
//!
//! let out = decompose_soa(&batch);
//! assert_eq!(out.len(), 2);
//! assert!((out.eigenvalues(2)[0] - 5.0).abs() < 1e-5);
//! assert_eq!(out.eigenvalues(0)[1], 1.0);
//! ```

use crate::{EigenDecomposition, EigenvalueTriple, EigenvectorBasis, Result, SymEigError, SymmetricMatrix3};

/// Input matrices, one array per upper-triangle entry
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatrixBatch {
    a00: Vec<f32>,
    a01: Vec<f32>,
    a02: Vec<f32>,
    a11: Vec<f32>,
    a12: Vec<f32>,
    a22: Vec<f32>,
}

impl MatrixBatch {
    /// Empty batch
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty batch with room for `capacity` matrices
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            a00: Vec::with_capacity(capacity),
            a01: Vec::with_capacity(capacity),
            a02: Vec::with_capacity(capacity),
            a11: Vec::with_capacity(capacity),
            a12: Vec::with_capacity(capacity),
            a22: Vec::with_capacity(capacity),
        }
    }

    /// Builds a batch from existing entry arrays `[a00, a01, a02, a11, a12, a22]`
    ///
    /// # Errors
    ///
    /// Returns `SizeMismatch` if the arrays differ in length.
    pub fn from_columns(columns: [Vec<f32>; 6]) -> Result<Self> {
        let expected = columns[0].len();
        if let Some(bad) = columns.iter().find(|c| c.len() != expected) {
            return Err(SymEigError::SizeMismatch {
                expected,
                actual: bad.len(),
            });
        }
        let [a00, a01, a02, a11, a12, a22] = columns;
        Ok(Self {
            a00,
            a01,
            a02,
            a11,
            a12,
            a22,
        })
    }

    /// Number of matrices
    #[must_use]
    pub fn len(&self) -> usize {
        self.a00.len()
    }

    /// Returns true if the batch holds no matrices
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.a00.is_empty()
    }

    /// Appends one matrix
    pub fn push(&mut self, m: SymmetricMatrix3) {
        self.a00.push(m.a00);
        self.a01.push(m.a01);
        self.a02.push(m.a02);
        self.a11.push(m.a11);
        self.a12.push(m.a12);
        self.a22.push(m.a22);
    }

    /// Matrix at `i`, or `None` past the end
    #[must_use]
    pub fn get(&self, i: usize) -> Option<SymmetricMatrix3> {
        (i < self.len()).then(|| self.at(i))
    }

    /// Iterates matrices in order
    pub fn iter(&self) -> impl ExactSizeIterator<Item = SymmetricMatrix3> + '_ {
        (0..self.len()).map(move |i| self.at(i))
    }

    fn at(&self, i: usize) -> SymmetricMatrix3 {
        SymmetricMatrix3::new(
            self.a00[i],
            self.a01[i],
            self.a02[i],
            self.a11[i],
            self.a12[i],
            self.a22[i],
        )
    }

    /// Entry arrays `[a00, a01, a02, a11, a12, a22]`
    #[must_use]
    pub fn columns(&self) -> [&[f32]; 6] {
        [&self.a00, &self.a01, &self.a02, &self.a11, &self.a12, &self.a22]
    }
}

impl FromIterator<SymmetricMatrix3> for MatrixBatch {
    fn from_iter<I: IntoIterator<Item = SymmetricMatrix3>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut batch = Self::with_capacity(iter.size_hint().0);
        for m in iter {
            batch.push(m);
        }
        batch
    }
}

impl From<&[SymmetricMatrix3]> for MatrixBatch {
    fn from(matrices: &[SymmetricMatrix3]) -> Self {
        matrices.iter().copied().collect()
    }
}

/// Decomposition results, one array per eigenvalue and eigenvector component
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecompositionBatch {
    values: [Vec<f32>; 3],
    /// `vectors[k][c]`: component `c` of eigenvector `k`
    vectors: [[Vec<f32>; 3]; 3],
}

impl DecompositionBatch {
    /// Zero-filled results for `len` matrices
    #[must_use]
    pub fn zeros(len: usize) -> Self {
        let column = || vec![0.0f32; len];
        Self {
            values: [column(), column(), column()],
            vectors: [
                [column(), column(), column()],
                [column(), column(), column()],
                [column(), column(), column()],
            ],
        }
    }

    /// Number of decompositions
    #[must_use]
    pub fn len(&self) -> usize {
        self.values[0].len()
    }

    /// Returns true if the batch holds no decompositions
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values[0].is_empty()
    }

    /// Eigenvalue `k` (0 = smallest) of every matrix
    ///
    /// # Panics
    ///
    /// Panics if `k >= 3`.
    #[must_use]
    pub fn eigenvalues(&self, k: usize) -> &[f32] {
        &self.values[k]
    }

    /// Component `c` of eigenvector `k` of every matrix
    ///
    /// # Panics
    ///
    /// Panics if `k >= 3` or `c >= 3`.
    #[must_use]
    pub fn eigenvector_component(&self, k: usize, c: usize) -> &[f32] {
        &self.vectors[k][c]
    }

    /// Decomposition at `i`, or `None` past the end
    #[must_use]
    pub fn get(&self, i: usize) -> Option<EigenDecomposition> {
        (i < self.len()).then(|| self.at(i))
    }

    /// Iterates decompositions in order
    pub fn iter(&self) -> impl ExactSizeIterator<Item = EigenDecomposition> + '_ {
        (0..self.len()).map(move |i| self.at(i))
    }

    fn at(&self, i: usize) -> EigenDecomposition {
        let vector = |k: usize| {
            [
                self.vectors[k][0][i],
                self.vectors[k][1][i],
                self.vectors[k][2][i],
            ]
        };
        EigenDecomposition {
            eigenvalues: EigenvalueTriple::from_sorted([
                self.values[0][i],
                self.values[1][i],
                self.values[2][i],
            ]),
            eigenvectors: EigenvectorBasis::new([vector(0), vector(1), vector(2)]),
        }
    }

    /// Writes `d` at index `i`
    ///
    /// # Panics
    ///
    /// Panics if `i >= self.len()`.
    pub fn set(&mut self, i: usize, d: &EigenDecomposition) {
        for k in 0..3 {
            self.values[k][i] = d.eigenvalues[k];
            let v = d.eigenvectors.vector(k);
            for (c, component) in v.iter().enumerate() {
                self.vectors[k][c][i] = *component;
            }
        }
    }
}
