//! Chunk kernels for batched decomposition
//!
//! Each backend maps a contiguous chunk of input matrices onto an equally
//! long chunk of outputs. Chunks never share state, so the batch runner is
//! free to hand disjoint chunks to different threads.
//!
//! # Backends
//!
//! - `scalar`: one matrix at a time, straight through the per-matrix kernel
//! - `lanes`: blocks of [`lanes::LANES`] matrices in structure-of-arrays form,
//!   every algorithm stage run across all lanes before the next one starts
//!
//! Both produce bit-identical output: they call the same per-matrix stages in
//! the same order and only differ in how the loops are arranged.

use crate::{EigenDecomposition, SolverConfig, SymmetricMatrix3};

pub mod lanes;
pub mod scalar;

/// Backend trait implemented by every chunk kernel
///
/// # Contract
///
/// - `input` and `output` have the same length
/// - `output[i]` depends on `input[i]` and `config` only
pub trait BatchKernel {
    /// Decomposes `input[i]` into `output[i]` for every `i`
    fn decompose_chunk(
        input: &[SymmetricMatrix3],
        output: &mut [EigenDecomposition],
        config: &SolverConfig,
    );
}
