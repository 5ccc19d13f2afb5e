//! symeig3: Closed-Form Eigendecomposition of Symmetric 3×3 Matrices
//!
//! **symeig3** computes eigenvalues and orthonormal eigenvectors of real
//! symmetric 3×3 matrices in single precision without iteration, for
//! workloads that decompose millions of small tensors (stress, strain,
//! diffusion, structure tensors).
//!
//! 1. **Eigenvalues** - trigonometric solution of the characteristic cubic
//! 2. **Eigenvectors** - cross products of rows of `A - λI`, with special
//!    handling for repeated eigenvalues
//! 3. **Batches** - scalar, lane-blocked and parallel backends that produce
//!    bit-identical results
//!
//! # Design Principles
//!
//! - **Fixed cost**: every matrix takes the same straight-line path
//! - **Never fails**: degenerate, zero and badly scaled input still yields an
//!   orthonormal basis; NaN/inf input propagates to non-finite output
//! - **Deterministic**: same input and config, same bits, on every backend
//!
//! # Quick Start
//!
//! ```rust
//! use symeig3::{decompose, SymmetricMatrix3};
//!
//! let a = SymmetricMatrix3::new(4.0, 1.0, 0.0, 4.0, 0.0, 2.0);
//! let d = decompose(&a);
//!
//! // Ascending eigenvalues: 2, 3, 5
//! assert!((d.eigenvalues[0] - 2.0).abs() < 1e-5);
//! assert!((d.eigenvalues[1] - 3.0).abs() < 1e-5);
//! assert!((d.eigenvalues[2] - 5.0).abs() < 1e-5);
//! assert!(d.residual(&a) < 1e-4);
//! ```

pub mod backends;
pub mod batch;
pub mod config;
pub mod eigen;
pub mod error;
pub mod matrix;
pub mod soa;
pub mod validation;

pub use batch::{decompose_batch, decompose_batch_into, decompose_packed, decompose_soa, BatchRunner};
pub use config::{BatchConfig, SolverConfig};
pub use eigen::{
    decompose, decompose_with, recover_eigenvectors, recover_eigenvectors_with, solve_eigenvalues,
    solve_eigenvalues_with, Degeneracy, EigenDecomposition, EigenvalueTriple, EigenvectorBasis,
};
pub use error::{Result, SymEigError};
pub use matrix::{SymmetricMatrix3, Vector3};
pub use soa::{DecompositionBatch, MatrixBatch};

/// Batch execution target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Backend {
    /// One matrix per iteration
    Scalar,
    /// Structure-of-arrays blocks of [`backends::lanes::LANES`] matrices
    Lanes,
    /// Lane blocks spread over the rayon thread pool (feature `parallel`)
    Parallel,
    /// Pick per batch from its length
    #[default]
    Auto,
}

impl Backend {
    /// Select the best available backend for this build
    ///
    /// This is a convenience wrapper around `select_best_available_backend()`
    pub fn select_best() -> Self {
        select_best_available_backend()
    }

    /// Returns true if this build can run the backend
    #[must_use]
    pub fn is_available(self) -> bool {
        match self {
            Backend::Parallel => cfg!(feature = "parallel"),
            _ => true,
        }
    }
}

/// Select the best available backend for this build
///
/// Returns `Parallel` when the crate was built with the `parallel` feature
/// and `Lanes` otherwise. Never returns `Auto`.
///
/// # Examples
///
/// ```
/// use symeig3::{select_best_available_backend, Backend};
///
/// let backend = select_best_available_backend();
/// assert_ne!(backend, Backend::Auto);
/// assert!(backend.is_available());
/// ```
#[must_use]
pub fn select_best_available_backend() -> Backend {
    if cfg!(feature = "parallel") {
        Backend::Parallel
    } else {
        Backend::Lanes
    }
}

/// Resolve `Auto` for a batch of `len` matrices
///
/// Parallel once the batch reaches `parallel_threshold` (and the feature is
/// on), Lanes once it fills a lane block, Scalar below that.
///
/// # Examples
///
/// ```
/// use symeig3::{select_backend_for_batch, Backend};
///
/// assert_eq!(select_backend_for_batch(3, 16_384), Backend::Scalar);
/// assert_eq!(select_backend_for_batch(1_000, 16_384), Backend::Lanes);
/// ```
#[must_use]
pub fn select_backend_for_batch(len: usize, parallel_threshold: usize) -> Backend {
    if cfg!(feature = "parallel") && len >= parallel_threshold {
        Backend::Parallel
    } else if len >= backends::lanes::LANES {
        Backend::Lanes
    } else {
        Backend::Scalar
    }
}
