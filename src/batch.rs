//! Batch decomposition
//!
//! [`BatchRunner`] maps a sequence of matrices onto an equally long, index
//! aligned sequence of decompositions. The backend only changes how the work
//! is scheduled: every backend returns the same bits for the same input.
//!
//! Three memory layouts are accepted:
//!
//! - slices of [`SymmetricMatrix3`] / [`EigenDecomposition`]
//! - flat packed `f32` buffers (9 floats in, 9 + 3 floats out per matrix)
//! - structure-of-arrays containers ([`MatrixBatch`] / [`DecompositionBatch`])
//!
//! # Example
//!
//! ```
//! use symeig3::{Backend, BatchConfig, BatchRunner, SymmetricMatrix3};
//!
//! let matrices = vec![SymmetricMatrix3::from_diagonal(2.0, 3.0, 5.0); 100];
//! let runner = BatchRunner::new(BatchConfig::new().with_backend(Backend::Lanes));
//! let out = runner.run(&matrices).unwrap();
//!
//! assert_eq!(out.len(), 100);
//! assert!((out[99].eigenvalues[2] - 5.0).abs() < 1e-5);
//! ```

use crate::backends::lanes::{LaneBackend, LANES};
use crate::backends::scalar::ScalarBackend;
use crate::backends::BatchKernel;
use crate::{
    select_backend_for_batch, Backend, BatchConfig, DecompositionBatch, EigenDecomposition,
    MatrixBatch, Result, SolverConfig, SymEigError, SymmetricMatrix3,
};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Floats per packed input matrix and per packed eigenvector basis
const PACKED_MATRIX: usize = 9;
/// Floats per packed eigenvalue triple
const PACKED_VALUES: usize = 3;

/// Runs decompositions over whole batches with a fixed [`BatchConfig`]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BatchRunner {
    config: BatchConfig,
}

impl BatchRunner {
    /// Create a runner
    #[must_use]
    pub fn new(config: BatchConfig) -> Self {
        Self { config }
    }

    /// Active configuration
    #[must_use]
    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Concrete backend for a batch of `len` matrices
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedBackend` if the configured backend is not compiled
    /// into this build.
    pub fn resolve_backend(&self, len: usize) -> Result<Backend> {
        let backend = match self.config.backend {
            Backend::Auto => select_backend_for_batch(len, self.config.parallel_threshold),
            backend if backend.is_available() => backend,
            backend => return Err(SymEigError::UnsupportedBackend(backend)),
        };
        #[cfg(feature = "tracing")]
        tracing::debug!(?backend, len, "resolved batch backend");
        Ok(backend)
    }

    /// Decompose every matrix, returning a new vector
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedBackend` if the configured backend is unavailable.
    pub fn run(&self, input: &[SymmetricMatrix3]) -> Result<Vec<EigenDecomposition>> {
        let mut output = vec![EigenDecomposition::default(); input.len()];
        self.run_into(input, &mut output)?;
        Ok(output)
    }

    /// Decompose every matrix into caller-owned storage
    ///
    /// # Errors
    ///
    /// Returns `SizeMismatch` if `output.len() != input.len()` and
    /// `UnsupportedBackend` if the configured backend is unavailable.
    #[cfg_attr(feature = "tracing", instrument(skip(self, input, output), fields(len = input.len(), backend = ?self.config.backend)))]
    pub fn run_into(&self, input: &[SymmetricMatrix3], output: &mut [EigenDecomposition]) -> Result<()> {
        if output.len() != input.len() {
            return Err(SymEigError::SizeMismatch {
                expected: input.len(),
                actual: output.len(),
            });
        }
        let backend = self.resolve_backend(input.len())?;
        self.dispatch(backend, input, output);
        Ok(())
    }

    /// Decompose a structure-of-arrays batch
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedBackend` if the configured backend is unavailable.
    #[cfg_attr(feature = "tracing", instrument(skip(self, input), fields(len = input.len(), backend = ?self.config.backend)))]
    pub fn run_soa(&self, input: &MatrixBatch) -> Result<DecompositionBatch> {
        let backend = self.resolve_backend(input.len())?;
        Ok(self.soa_with(backend, input))
    }

    /// Decompose packed row-major matrices
    ///
    /// `matrices` holds 9 floats per matrix (full row-major 3×3, only the upper
    /// triangle is read). Eigenvector `k` of matrix `i` lands in column `k` of
    /// the row-major 3×3 block at `vectors[9 * i..]`, so component `r` is
    /// `vectors[9 * i + 3 * r + k]`. Eigenvalues land ascending in
    /// `values[3 * i..3 * i + 3]`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if `matrices.len()` is not a multiple of 9,
    /// `SizeMismatch` if the output buffers do not fit, and
    /// `UnsupportedBackend` if the configured backend is unavailable.
    ///
    /// # Example
    ///
    /// ```
    /// use symeig3::{BatchConfig, BatchRunner};
    ///
    /// let matrices = [2.0, 0.0, 0.0, 0.0, 3.0, 0.0, 0.0, 0.0, 5.0];
    /// let mut vectors = [0.0; 9];
    /// let mut values = [0.0; 3];
    /// BatchRunner::new(BatchConfig::new())
    ///     .run_packed(&matrices, &mut vectors, &mut values)
    ///     .unwrap();
    ///
    /// let identity = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0];
    /// for (v, e) in vectors.iter().zip(identity) {
    ///     assert!((v - e).abs() < 1e-6);
    /// }
    /// assert!((values[0] - 2.0).abs() < 1e-5);
    /// ```
    #[cfg_attr(feature = "tracing", instrument(skip(self, matrices, vectors, values), fields(len = matrices.len() / PACKED_MATRIX, backend = ?self.config.backend)))]
    pub fn run_packed(&self, matrices: &[f32], vectors: &mut [f32], values: &mut [f32]) -> Result<()> {
        if matrices.len() % PACKED_MATRIX != 0 {
            return Err(SymEigError::InvalidInput(format!(
                "packed matrix buffer length {} is not a multiple of {PACKED_MATRIX}",
                matrices.len()
            )));
        }
        let count = matrices.len() / PACKED_MATRIX;
        if vectors.len() != count * PACKED_MATRIX {
            return Err(SymEigError::SizeMismatch {
                expected: count * PACKED_MATRIX,
                actual: vectors.len(),
            });
        }
        if values.len() != count * PACKED_VALUES {
            return Err(SymEigError::SizeMismatch {
                expected: count * PACKED_VALUES,
                actual: values.len(),
            });
        }

        let backend = self.resolve_backend(count)?;
        self.packed_with(backend, matrices, vectors, values);
        Ok(())
    }

    /// Matrices per rayon task, whole lane blocks only
    fn parallel_chunk(&self) -> usize {
        self.config.chunk_size.max(1).div_ceil(LANES) * LANES
    }

    fn dispatch(&self, backend: Backend, input: &[SymmetricMatrix3], output: &mut [EigenDecomposition]) {
        let solver = &self.config.solver;
        match backend {
            Backend::Scalar => ScalarBackend::decompose_chunk(input, output, solver),
            Backend::Parallel => self.dispatch_parallel(input, output),
            Backend::Lanes | Backend::Auto => LaneBackend::decompose_chunk(input, output, solver),
        }
    }

    #[cfg(feature = "parallel")]
    fn dispatch_parallel(&self, input: &[SymmetricMatrix3], output: &mut [EigenDecomposition]) {
        use rayon::prelude::*;

        let chunk = self.parallel_chunk();
        let solver = &self.config.solver;
        input
            .par_chunks(chunk)
            .zip(output.par_chunks_mut(chunk))
            .for_each(|(input, output)| LaneBackend::decompose_chunk(input, output, solver));
    }

    #[cfg(not(feature = "parallel"))]
    fn dispatch_parallel(&self, input: &[SymmetricMatrix3], output: &mut [EigenDecomposition]) {
        LaneBackend::decompose_chunk(input, output, &self.config.solver);
    }

    fn soa_with(&self, backend: Backend, input: &MatrixBatch) -> DecompositionBatch {
        let mut output = DecompositionBatch::zeros(input.len());

        if backend == Backend::Parallel {
            let gathered: Vec<SymmetricMatrix3> = input.iter().collect();
            let mut results = vec![EigenDecomposition::default(); gathered.len()];
            self.dispatch(backend, &gathered, &mut results);
            for (i, d) in results.iter().enumerate() {
                output.set(i, d);
            }
            return output;
        }

        // Stream through stack blocks so the sequential path never allocates
        // an intermediate array-of-structs copy.
        let mut block = [SymmetricMatrix3::zeros(); LANES];
        let mut results = [EigenDecomposition::default(); LANES];
        let mut start = 0;
        while start < input.len() {
            let n = LANES.min(input.len() - start);
            for (l, slot) in block[..n].iter_mut().enumerate() {
                if let Some(m) = input.get(start + l) {
                    *slot = m;
                }
            }
            self.dispatch(backend, &block[..n], &mut results[..n]);
            for (l, d) in results[..n].iter().enumerate() {
                output.set(start + l, d);
            }
            start += n;
        }
        output
    }

    fn packed_with(&self, backend: Backend, matrices: &[f32], vectors: &mut [f32], values: &mut [f32]) {
        let solver = &self.config.solver;
        match backend {
            Backend::Scalar => packed_chunk::<ScalarBackend>(matrices, vectors, values, solver),
            Backend::Parallel => self.packed_parallel(matrices, vectors, values),
            Backend::Lanes | Backend::Auto => packed_chunk::<LaneBackend>(matrices, vectors, values, solver),
        }
    }

    #[cfg(feature = "parallel")]
    fn packed_parallel(&self, matrices: &[f32], vectors: &mut [f32], values: &mut [f32]) {
        use rayon::prelude::*;

        let chunk = self.parallel_chunk();
        let solver = &self.config.solver;
        matrices
            .par_chunks(chunk * PACKED_MATRIX)
            .zip(vectors.par_chunks_mut(chunk * PACKED_MATRIX))
            .zip(values.par_chunks_mut(chunk * PACKED_VALUES))
            .for_each(|((m, v), e)| packed_chunk::<LaneBackend>(m, v, e, solver));
    }

    #[cfg(not(feature = "parallel"))]
    fn packed_parallel(&self, matrices: &[f32], vectors: &mut [f32], values: &mut [f32]) {
        packed_chunk::<LaneBackend>(matrices, vectors, values, &self.config.solver);
    }
}

/// Unpacks, decomposes and repacks one run of packed matrices, a lane block at a time
fn packed_chunk<K: BatchKernel>(matrices: &[f32], vectors: &mut [f32], values: &mut [f32], solver: &SolverConfig) {
    let mut block = [SymmetricMatrix3::zeros(); LANES];
    let mut results = [EigenDecomposition::default(); LANES];

    let in_blocks = matrices.chunks(LANES * PACKED_MATRIX);
    let vec_blocks = vectors.chunks_mut(LANES * PACKED_MATRIX);
    let val_blocks = values.chunks_mut(LANES * PACKED_VALUES);

    for ((src, vec_out), val_out) in in_blocks.zip(vec_blocks).zip(val_blocks) {
        let n = src.len() / PACKED_MATRIX;
        for (slot, m) in block.iter_mut().zip(src.chunks_exact(PACKED_MATRIX)) {
            *slot = SymmetricMatrix3::new(m[0], m[1], m[2], m[4], m[5], m[8]);
        }

        K::decompose_chunk(&block[..n], &mut results[..n], solver);

        for ((d, v), e) in results[..n]
            .iter()
            .zip(vec_out.chunks_exact_mut(PACKED_MATRIX))
            .zip(val_out.chunks_exact_mut(PACKED_VALUES))
        {
            for k in 0..3 {
                e[k] = d.eigenvalues[k];
                let vector = d.eigenvectors.vector(k);
                for r in 0..3 {
                    v[3 * r + k] = vector[r];
                }
            }
        }
    }
}

/// Decompose a batch with the default configuration
///
/// Output has the input's length and order.
///
/// # Example
///
/// ```
/// use symeig3::{decompose, decompose_batch, SymmetricMatrix3};
///
/// let matrices = [
///     SymmetricMatrix3::from_diagonal(2.0, 3.0, 5.0),
///     SymmetricMatrix3::new(4.0, 1.0, 0.0, 4.0, 0.0, 2.0),
/// ];
/// let out = decompose_batch(&matrices);
/// assert_eq!(out[1], decompose(&matrices[1]));
/// ```
#[must_use]
pub fn decompose_batch(input: &[SymmetricMatrix3]) -> Vec<EigenDecomposition> {
    let runner = BatchRunner::default();
    let backend = select_backend_for_batch(input.len(), runner.config.parallel_threshold);
    let mut output = vec![EigenDecomposition::default(); input.len()];
    runner.dispatch(backend, input, &mut output);
    output
}

/// Decompose a batch into caller-owned storage with the default configuration
///
/// # Errors
///
/// Returns `SizeMismatch` if `output.len() != input.len()`.
pub fn decompose_batch_into(input: &[SymmetricMatrix3], output: &mut [EigenDecomposition]) -> Result<()> {
    BatchRunner::default().run_into(input, output)
}

/// Decompose packed row-major matrices with the default configuration
///
/// See [`BatchRunner::run_packed`] for the buffer layout.
///
/// # Errors
///
/// Returns `InvalidInput` if `matrices.len()` is not a multiple of 9 and
/// `SizeMismatch` if the output buffers do not fit.
pub fn decompose_packed(matrices: &[f32], vectors: &mut [f32], values: &mut [f32]) -> Result<()> {
    BatchRunner::default().run_packed(matrices, vectors, values)
}

/// Decompose a structure-of-arrays batch with the default configuration
#[must_use]
pub fn decompose_soa(input: &MatrixBatch) -> DecompositionBatch {
    let runner = BatchRunner::default();
    let backend = select_backend_for_batch(input.len(), runner.config.parallel_threshold);
    runner.soa_with(backend, input)
}
