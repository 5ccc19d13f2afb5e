//! Accuracy validation against a reference solver
//!
//! Utilities for measuring how closely the closed-form solver tracks an
//! iterative double-precision reference:
//!
//! - [`random_symmetric`] / [`random_batch`]: reproducible test input from an
//!   explicit RNG
//! - [`ReferenceDecomposition`]: reference output in the same ordering and sign
//!   convention as [`EigenDecomposition`]
//! - [`compare`] / [`AgreementReport`]: per-matrix agreement and the running
//!   percentages over many trials
//!
//! The reference solver itself is not part of this crate. Callers pass it in as
//! a closure, so any f64 eigensolver can serve as the baseline.
//!
//! # Example
//!
//! ```
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//! use symeig3::decompose_batch;
//! use symeig3::validation::{random_batch, AgreementReport, ReferenceDecomposition, DEFAULT_RANGE};
//!
//! let mut rng = StdRng::seed_from_u64(7);
//! let matrices = random_batch(&mut rng, 64, DEFAULT_RANGE);
//! let results = decompose_batch(&matrices);
//!
//! // Stand-in oracle: the solver's own output widened to f64
//! let mut report = AgreementReport::new(5e-5);
//! report.accumulate(&matrices, &results, |m| {
//!     ReferenceDecomposition::from(&symeig3::decompose(m))
//! });
//! assert_eq!(report.vector_percentage(), 100.0);
//! ```

use std::ops::RangeInclusive;

use rand::Rng;

use crate::{EigenDecomposition, SymmetricMatrix3};

/// Entry range of the random benchmark matrices
pub const DEFAULT_RANGE: RangeInclusive<f32> = -100.0..=100.0;

/// Relative eigenvalue gap below which a reference matrix counts as degenerate
///
/// Eigenvectors of nearly repeated eigenvalues are not unique, so two correct
/// solvers can disagree on them by O(1).
pub const DEGENERATE_GAP: f64 = 1e-3;

/// Random symmetric matrix with independent entries drawn from `range`
///
/// # Panics
///
/// Panics if `range` is empty.
pub fn random_symmetric<R: Rng + ?Sized>(rng: &mut R, range: RangeInclusive<f32>) -> SymmetricMatrix3 {
    let mut draw = || rng.gen_range(range.clone());
    SymmetricMatrix3::new(draw(), draw(), draw(), draw(), draw(), draw())
}

/// `n` random symmetric matrices with entries drawn from `range`
///
/// # Panics
///
/// Panics if `range` is empty.
pub fn random_batch<R: Rng + ?Sized>(rng: &mut R, n: usize, range: RangeInclusive<f32>) -> Vec<SymmetricMatrix3> {
    (0..n).map(|_| random_symmetric(rng, range.clone())).collect()
}

/// Double-precision decomposition from a reference solver
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceDecomposition {
    /// Eigenvalues in ascending order
    pub eigenvalues: [f64; 3],
    /// Unit eigenvectors, `eigenvectors[k]` paired with `eigenvalues[k]`
    pub eigenvectors: [[f64; 3]; 3],
}

impl ReferenceDecomposition {
    /// Relative gap between the closest pair of eigenvalues
    ///
    /// Zero for the zero matrix.
    #[must_use]
    pub fn min_relative_gap(&self) -> f64 {
        let [l0, l1, l2] = self.eigenvalues;
        let scale = l0.abs().max(l2.abs());
        if scale == 0.0 {
            return 0.0;
        }
        (l1 - l0).min(l2 - l1) / scale
    }

    /// Returns true if two eigenvalues are closer than [`DEGENERATE_GAP`]
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.min_relative_gap() < DEGENERATE_GAP
    }
}

impl From<&EigenDecomposition> for ReferenceDecomposition {
    fn from(d: &EigenDecomposition) -> Self {
        let vectors = d.eigenvectors.as_array();
        Self {
            eigenvalues: d.eigenvalues.as_array().map(f64::from),
            eigenvectors: vectors.map(|v| v.map(f64::from)),
        }
    }
}

/// Puts raw solver output into ascending order with the crate's sign convention
///
/// `vectors[k]` must be the eigenvector of `values[k]`. Each vector is scaled
/// so its largest-magnitude component is non-negative (first index wins on
/// ties).
///
/// # Example
///
/// ```
/// use symeig3::validation::canonicalize;
///
/// let r = canonicalize(
///     [5.0, 2.0, 3.0],
///     [[0.0, 0.0, -1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
/// );
/// assert_eq!(r.eigenvalues, [2.0, 3.0, 5.0]);
/// assert_eq!(r.eigenvectors[2], [0.0, 0.0, 1.0]);
/// ```
#[must_use]
pub fn canonicalize(values: [f64; 3], vectors: [[f64; 3]; 3]) -> ReferenceDecomposition {
    let mut order = [0usize, 1, 2];
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut out = ReferenceDecomposition {
        eigenvalues: [0.0; 3],
        eigenvectors: [[0.0; 3]; 3],
    };
    for (slot, &k) in order.iter().enumerate() {
        out.eigenvalues[slot] = values[k];
        out.eigenvectors[slot] = signed(vectors[k]);
    }
    out
}

fn signed(v: [f64; 3]) -> [f64; 3] {
    let mut best = 0;
    for i in 1..3 {
        if v[i].abs() > v[best].abs() {
            best = i;
        }
    }
    if v[best] < 0.0 {
        v.map(|x| -x)
    } else {
        v
    }
}

/// Agreement of one decomposition with its reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Agreement {
    /// Eigenvector `k` matches in every component (up to sign)
    pub vectors: [bool; 3],
    /// Eigenvalue `k` matches
    pub values: [bool; 3],
    /// Reference has a (nearly) repeated eigenvalue
    pub degenerate: bool,
}

/// Compares one decomposition with its reference under an absolute tolerance
///
/// An eigenvector agrees when all three components lie within `tolerance`
/// of the reference vector or of its negation.
#[must_use]
pub fn compare(core: &EigenDecomposition, reference: &ReferenceDecomposition, tolerance: f32) -> Agreement {
    let tol = f64::from(tolerance);
    let mut agreement = Agreement {
        vectors: [false; 3],
        values: [false; 3],
        degenerate: reference.is_degenerate(),
    };

    for k in 0..3 {
        agreement.values[k] = (f64::from(core.eigenvalues[k]) - reference.eigenvalues[k]).abs() <= tol;

        let v = core.eigenvectors.vector(k).map(f64::from);
        let r = reference.eigenvectors[k];
        let same = (0..3).all(|c| (v[c] - r[c]).abs() <= tol);
        let flipped = (0..3).all(|c| (v[c] + r[c]).abs() <= tol);
        agreement.vectors[k] = same || flipped;
    }
    agreement
}

/// Running agreement counts over any number of matrices
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgreementReport {
    /// Absolute tolerance used for every comparison
    pub tolerance: f32,
    /// Matrices recorded
    pub matrices: u64,
    /// Eigenvectors compared (excludes degenerate matrices)
    pub vectors_compared: u64,
    /// Eigenvectors within tolerance
    pub vectors_within: u64,
    /// Eigenvalues compared
    pub values_compared: u64,
    /// Eigenvalues within tolerance
    pub values_within: u64,
    /// Matrices left out of the eigenvector criterion
    pub degenerate_excluded: u64,
}

impl AgreementReport {
    /// Empty report
    #[must_use]
    pub fn new(tolerance: f32) -> Self {
        Self {
            tolerance,
            matrices: 0,
            vectors_compared: 0,
            vectors_within: 0,
            values_compared: 0,
            values_within: 0,
            degenerate_excluded: 0,
        }
    }

    /// Adds one comparison
    pub fn record(&mut self, agreement: &Agreement) {
        self.matrices += 1;
        self.values_compared += 3;
        self.values_within += agreement.values.iter().filter(|&&ok| ok).count() as u64;

        if agreement.degenerate {
            self.degenerate_excluded += 1;
        } else {
            self.vectors_compared += 3;
            self.vectors_within += agreement.vectors.iter().filter(|&&ok| ok).count() as u64;
        }
    }

    /// Compares `results[i]` with `oracle(&matrices[i])` for every `i`
    pub fn accumulate<F>(&mut self, matrices: &[SymmetricMatrix3], results: &[EigenDecomposition], mut oracle: F)
    where
        F: FnMut(&SymmetricMatrix3) -> ReferenceDecomposition,
    {
        debug_assert_eq!(matrices.len(), results.len());
        for (m, d) in matrices.iter().zip(results.iter()) {
            let reference = oracle(m);
            self.record(&compare(d, &reference, self.tolerance));
        }
    }

    /// Folds another report's counts into this one
    pub fn merge(&mut self, other: &AgreementReport) {
        self.matrices += other.matrices;
        self.vectors_compared += other.vectors_compared;
        self.vectors_within += other.vectors_within;
        self.values_compared += other.values_compared;
        self.values_within += other.values_within;
        self.degenerate_excluded += other.degenerate_excluded;
    }

    /// Percentage of compared eigenvectors within tolerance (100 when none)
    #[must_use]
    pub fn vector_percentage(&self) -> f64 {
        percentage(self.vectors_within, self.vectors_compared)
    }

    /// Percentage of eigenvalues within tolerance (100 when none)
    #[must_use]
    pub fn value_percentage(&self) -> f64 {
        percentage(self.values_within, self.values_compared)
    }
}

fn percentage(within: u64, total: u64) -> f64 {
    if total == 0 {
        100.0
    } else {
        within as f64 * 100.0 / total as f64
    }
}
