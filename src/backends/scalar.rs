//! Scalar backend implementation
//!
//! Portable baseline: a plain loop over the per-matrix kernel. It is the
//! correctness reference the lane backend is checked against.

use super::BatchKernel;
use crate::eigen::decompose_with;
use crate::{EigenDecomposition, SolverConfig, SymmetricMatrix3};

/// Scalar backend (one matrix per iteration)
pub struct ScalarBackend;

impl BatchKernel for ScalarBackend {
    fn decompose_chunk(
        input: &[SymmetricMatrix3],
        output: &mut [EigenDecomposition],
        config: &SolverConfig,
    ) {
        debug_assert_eq!(input.len(), output.len());
        for (matrix, out) in input.iter().zip(output.iter_mut()) {
            *out = decompose_with(matrix, config);
        }
    }
}
