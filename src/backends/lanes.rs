//! Lane backend: fixed-width structure-of-arrays blocks
//!
//! A block holds [`LANES`] matrices with one contiguous array per stored
//! entry. The eigenvalue solve runs as two passes over the block (cubic
//! invariants read straight from the entry arrays, then the trigonometric
//! roots) with identical control flow in every lane. Eigenvector recovery,
//! which branches on degeneracy, then runs lane by lane.
//!
//! Short chunks are padded with zero matrices whose results are discarded.

use super::BatchKernel;
use crate::eigen::{recover_eigenvectors_with, roots_from_invariants, shifted_invariants, Invariants};
use crate::{EigenDecomposition, EigenvalueTriple, SolverConfig, SymmetricMatrix3};

/// Matrices per block
pub const LANES: usize = 8;

/// One block of matrices in structure-of-arrays form
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MatrixLanes {
    /// Entry (0, 0) for each lane
    pub a00: [f32; LANES],
    /// Entry (0, 1) for each lane
    pub a01: [f32; LANES],
    /// Entry (0, 2) for each lane
    pub a02: [f32; LANES],
    /// Entry (1, 1) for each lane
    pub a11: [f32; LANES],
    /// Entry (1, 2) for each lane
    pub a12: [f32; LANES],
    /// Entry (2, 2) for each lane
    pub a22: [f32; LANES],
}

impl MatrixLanes {
    /// Loads up to [`LANES`] matrices; missing lanes stay zero
    ///
    /// Matrices beyond the first [`LANES`] are ignored.
    #[must_use]
    pub fn load(chunk: &[SymmetricMatrix3]) -> Self {
        let mut block = Self::default();
        for (l, m) in chunk.iter().take(LANES).enumerate() {
            block.a00[l] = m.a00;
            block.a01[l] = m.a01;
            block.a02[l] = m.a02;
            block.a11[l] = m.a11;
            block.a12[l] = m.a12;
            block.a22[l] = m.a22;
        }
        block
    }

    /// Matrix held in lane `l`
    #[inline(always)]
    #[must_use]
    pub fn lane(&self, l: usize) -> SymmetricMatrix3 {
        SymmetricMatrix3::new(
            self.a00[l],
            self.a01[l],
            self.a02[l],
            self.a11[l],
            self.a12[l],
            self.a22[l],
        )
    }
}

/// Ascending eigenvalues for every lane of `block`
///
/// `result[k][l]` is eigenvalue `k` of lane `l`.
#[must_use]
pub fn solve_eigenvalue_lanes(block: &MatrixLanes, config: &SolverConfig) -> [[f32; LANES]; 3] {
    let mut invariants = [Invariants::default(); LANES];
    for (l, inv) in invariants.iter_mut().enumerate() {
        *inv = shifted_invariants(
            block.a00[l],
            block.a01[l],
            block.a02[l],
            block.a11[l],
            block.a12[l],
            block.a22[l],
        );
    }

    let mut values = [[0.0f32; LANES]; 3];
    for (l, inv) in invariants.iter().enumerate() {
        let roots = roots_from_invariants(inv, config);
        values[0][l] = roots[0];
        values[1][l] = roots[1];
        values[2][l] = roots[2];
    }
    values
}

/// Lane backend (blocks of [`LANES`] matrices)
pub struct LaneBackend;

impl BatchKernel for LaneBackend {
    fn decompose_chunk(
        input: &[SymmetricMatrix3],
        output: &mut [EigenDecomposition],
        config: &SolverConfig,
    ) {
        debug_assert_eq!(input.len(), output.len());
        for (in_block, out_block) in input.chunks(LANES).zip(output.chunks_mut(LANES)) {
            let block = MatrixLanes::load(in_block);
            let values = solve_eigenvalue_lanes(&block, config);

            for (l, out) in out_block.iter_mut().enumerate() {
                let eigenvalues =
                    EigenvalueTriple::from_sorted([values[0][l], values[1][l], values[2][l]]);
                out.eigenvectors = recover_eigenvectors_with(&block.lane(l), &eigenvalues, config);
                out.eigenvalues = eigenvalues;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::scalar::ScalarBackend;

    fn sample(n: usize) -> Vec<SymmetricMatrix3> {
        (0..n)
            .map(|i| {
                let t = i as f32;
                SymmetricMatrix3::new(
                    (t * 0.37).sin() * 90.0,
                    (t * 1.13).cos() * 40.0,
                    (t * 0.71).sin() * 25.0,
                    (t * 0.53).cos() * 75.0,
                    (t * 1.91).sin() * 60.0,
                    (t * 0.29).cos() * 85.0,
                )
            })
            .collect()
    }

    fn assert_bit_identical(a: &EigenDecomposition, b: &EigenDecomposition) {
        for i in 0..3 {
            assert_eq!(a.eigenvalues[i].to_bits(), b.eigenvalues[i].to_bits());
            for k in 0..3 {
                assert_eq!(
                    a.eigenvectors.vector(i)[k].to_bits(),
                    b.eigenvectors.vector(i)[k].to_bits()
                );
            }
        }
    }

    #[test]
    fn test_load_pads_with_zero() {
        let chunk = [SymmetricMatrix3::identity(); 3];
        let block = MatrixLanes::load(&chunk);
        assert_eq!(block.lane(2), SymmetricMatrix3::identity());
        assert_eq!(block.lane(3), SymmetricMatrix3::zeros());
        assert_eq!(block.lane(LANES - 1), SymmetricMatrix3::zeros());
    }

    #[test]
    fn test_load_ignores_excess() {
        let chunk = vec![SymmetricMatrix3::identity(); LANES + 4];
        let block = MatrixLanes::load(&chunk);
        for l in 0..LANES {
            assert_eq!(block.lane(l), SymmetricMatrix3::identity());
        }
    }

    #[test]
    fn test_eigenvalue_lanes_match_scalar_solve() {
        let input = sample(LANES);
        let block = MatrixLanes::load(&input);
        let config = SolverConfig::default();
        let values = solve_eigenvalue_lanes(&block, &config);

        for (l, m) in input.iter().enumerate() {
            let expected = crate::solve_eigenvalues_with(m, &config).as_array();
            for k in 0..3 {
                assert_eq!(values[k][l].to_bits(), expected[k].to_bits());
            }
        }
    }

    #[test]
    fn test_lane_backend_bit_identical_to_scalar() {
        // 3 full blocks plus a ragged tail
        let input = sample(3 * LANES + 5);
        let config = SolverConfig::default();

        let mut lanes = vec![EigenDecomposition::default(); input.len()];
        let mut scalar = vec![EigenDecomposition::default(); input.len()];
        LaneBackend::decompose_chunk(&input, &mut lanes, &config);
        ScalarBackend::decompose_chunk(&input, &mut scalar, &config);

        for (a, b) in lanes.iter().zip(scalar.iter()) {
            assert_bit_identical(a, b);
        }
    }

    #[test]
    fn test_eigenvalue_lanes_close_pairs_match_scalar_solve() {
        // Eigenvalues 4, 4 + 2^-k, -3 rotated about z by 45°
        let input: Vec<_> = (0..LANES)
            .map(|k| {
                let d = 2.0f32.powi(-(2 * k as i32 + 4));
                let h = d / 2.0;
                SymmetricMatrix3::new(4.0 + h, h, 0.0, 4.0 + h, 0.0, -3.0)
            })
            .collect();
        let block = MatrixLanes::load(&input);
        let config = SolverConfig::default();
        let values = solve_eigenvalue_lanes(&block, &config);

        for (l, m) in input.iter().enumerate() {
            let expected = crate::solve_eigenvalues_with(m, &config).as_array();
            for k in 0..3 {
                assert_eq!(values[k][l].to_bits(), expected[k].to_bits());
            }
            assert!((values[0][l] + 3.0).abs() < 1e-5);
            assert!((values[1][l] - 4.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_lane_backend_degenerate_lanes() {
        let input = [
            SymmetricMatrix3::identity(),
            SymmetricMatrix3::zeros(),
            SymmetricMatrix3::new(2.0, 1.0, 1.0, 2.0, 1.0, 2.0),
            SymmetricMatrix3::from_diagonal(2.0, 3.0, 5.0),
        ];
        let mut output = [EigenDecomposition::default(); 4];
        LaneBackend::decompose_chunk(&input, &mut output, &SolverConfig::default());

        assert_eq!(output[0].eigenvalues.as_array(), [1.0, 1.0, 1.0]);
        assert_eq!(output[1].eigenvalues.as_array(), [0.0, 0.0, 0.0]);
        for (m, out) in input.iter().zip(output.iter()) {
            assert!(out.eigenvectors.orthonormality_error() < 1e-5);
            assert!(out.residual(m) < 1e-4 * out.eigenvalues.max_abs().max(1.0));
        }
    }
}
