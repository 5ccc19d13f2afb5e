//! Solver tolerances and batch execution settings
//!
//! # Examples
//!
//! ```
//! use symeig3::{Backend, BatchConfig, SolverConfig};
//!
//! // Defaults suit entries of moderate magnitude in single precision
//! let solver = SolverConfig::default();
//! assert_eq!(solver.degeneracy_tolerance, 1e-5);
//!
//! // Builder pattern, as elsewhere in the crate
//! let batch = BatchConfig::new()
//!     .with_backend(Backend::Lanes)
//!     .with_solver(SolverConfig::new().with_degeneracy_tolerance(1e-4).build())
//!     .build();
//! assert_eq!(batch.backend, Backend::Lanes);
//! ```

use crate::Backend;

/// Tolerances used by the per-matrix kernel
///
/// Both tolerances are relative, so scaling a matrix by a positive constant
/// does not change which branch the kernel takes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverConfig {
    /// Two eigenvalues are treated as equal when their gap is at most this
    /// fraction of the largest eigenvalue magnitude
    pub degeneracy_tolerance: f32,
    /// The shifted matrix `A − m·I` is treated as zero when `p ≤ tol · m²`
    pub zero_tolerance: f32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            degeneracy_tolerance: 1e-5,
            zero_tolerance: 1e-12,
        }
    }
}

impl SolverConfig {
    /// Create a solver configuration with default tolerances
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the relative eigenvalue-gap tolerance
    ///
    /// Negative values are clamped to zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use symeig3::SolverConfig;
    ///
    /// let config = SolverConfig::new().with_degeneracy_tolerance(-1.0);
    /// assert_eq!(config.degeneracy_tolerance, 0.0);
    /// ```
    #[must_use]
    pub fn with_degeneracy_tolerance(mut self, tolerance: f32) -> Self {
        self.degeneracy_tolerance = tolerance.max(0.0);
        self
    }

    /// Set the relative tolerance for the all-equal shortcut
    ///
    /// Negative values are clamped to zero.
    #[must_use]
    pub fn with_zero_tolerance(mut self, tolerance: f32) -> Self {
        self.zero_tolerance = tolerance.max(0.0);
        self
    }

    /// Finalize configuration (no-op, for builder pattern consistency)
    #[must_use]
    pub fn build(self) -> Self {
        self
    }

    /// Tight tolerances: only near-exact ties take the degenerate branches
    #[must_use]
    pub const fn strict() -> Self {
        Self {
            degeneracy_tolerance: 1e-6,
            zero_tolerance: 1e-14,
        }
    }

    /// Loose tolerances for noisy tensor fields
    #[must_use]
    pub const fn relaxed() -> Self {
        Self {
            degeneracy_tolerance: 1e-4,
            zero_tolerance: 1e-10,
        }
    }
}

/// Execution settings for [`BatchRunner`](crate::BatchRunner)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchConfig {
    /// Execution target; `Auto` picks one per batch
    pub backend: Backend,
    /// Minimum batch length before `Auto` goes multi-threaded
    pub parallel_threshold: usize,
    /// Matrices per rayon task (rounded up to whole lane blocks)
    pub chunk_size: usize,
    /// Per-matrix tolerances
    pub solver: SolverConfig,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Auto,
            parallel_threshold: 16_384,
            chunk_size: 4_096,
            solver: SolverConfig::default(),
        }
    }
}

impl BatchConfig {
    /// Create a batch configuration with default settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the execution backend
    #[must_use]
    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    /// Set the minimum batch length for multi-threaded execution
    #[must_use]
    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    /// Set the number of matrices per parallel task
    ///
    /// Zero is raised to one.
    ///
    /// # Examples
    ///
    /// ```
    /// use symeig3::BatchConfig;
    ///
    /// assert_eq!(BatchConfig::new().with_chunk_size(0).chunk_size, 1);
    /// ```
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Set per-matrix tolerances
    #[must_use]
    pub fn with_solver(mut self, solver: SolverConfig) -> Self {
        self.solver = solver;
        self
    }

    /// Finalize configuration (no-op, for builder pattern consistency)
    #[must_use]
    pub fn build(self) -> Self {
        self
    }
}
