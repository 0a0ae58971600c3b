//! Pairwise shared-influence counts between output features, and the
//! initial drop scores derived from them. Building the matrix is the
//! quadratic, dominant cost of the whole pipeline; rows are independent of
//! each other and computed in parallel.

use ndarray::Array2;
use rayon::prelude::*;

use crate::influence::InfluenceSets;

/// Symmetric `output_dim x output_dim` matrix of influence-set
/// intersection sizes. The diagonal holds each set's self-intersection
/// (always `top_k`) and is excluded from every score sum.
pub struct RedundancyMatrix {
    counts: Array2<u32>,
}

impl RedundancyMatrix {
    pub fn from_influences(sets: &InfluenceSets) -> Self {
        let n = sets.output_dim();

        let rows: Vec<Vec<u32>> = (0..n)
            .into_par_iter()
            .map(|i| (0..n).map(|j| sets.overlap(i, j)).collect())
            .collect();

        let mut counts = Array2::zeros((n, n));
        for (i, row) in rows.into_iter().enumerate() {
            for (j, count) in row.into_iter().enumerate() {
                counts[[i, j]] = count;
            }
        }

        RedundancyMatrix { counts }
    }

    pub fn output_dim(&self) -> usize {
        self.counts.nrows()
    }

    /// Number of input features shared by the influence sets of `i` and `j`.
    pub fn overlap(&self, i: usize, j: usize) -> u32 {
        self.counts[[i, j]]
    }

    /// Initial drop score of every output feature: the sum of its overlaps
    /// with all other features, diagonal excluded.
    pub fn initial_scores(&self) -> Vec<i64> {
        self.counts
            .rows()
            .into_iter()
            .enumerate()
            .map(|(i, row)| {
                row.iter()
                    .enumerate()
                    .filter(|&(j, _)| j != i)
                    .map(|(_, &count)| count as i64)
                    .sum()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::influence::top_influences;
    use ndarray::array;

    // Three output features over five inputs: columns 0 and 1 both lean on
    // rows 1 and 4, column 2 on rows 0 and 2.
    fn overlapping_fixture() -> RedundancyMatrix {
        let weights = array![
            [0.1, 0.2, 5.0],
            [4.0, 3.5, 0.1],
            [0.2, 0.1, 4.0],
            [0.3, 0.2, 0.2],
            [3.0, 5.0, 0.3],
        ];
        let sets = top_influences(weights.view(), 2).unwrap();
        RedundancyMatrix::from_influences(&sets)
    }

    #[test]
    fn test_identical_sets_share_everything() {
        let matrix = overlapping_fixture();
        assert_eq!(matrix.overlap(0, 1), 2);
        assert_eq!(matrix.overlap(0, 2), 0);
        assert_eq!(matrix.overlap(1, 2), 0);
    }

    #[test]
    fn test_diagonal_is_self_intersection() {
        let matrix = overlapping_fixture();
        for i in 0..3 {
            assert_eq!(matrix.overlap(i, i), 2);
        }
    }

    #[test]
    fn test_matrix_is_symmetric() {
        let weights = array![
            [0.9, 0.8, 0.1, 0.4],
            [0.7, 0.6, 0.2, 0.5],
            [0.1, 0.5, 0.9, 0.6],
            [0.2, 0.1, 0.8, 0.7],
            [0.3, 0.4, 0.6, 0.1],
        ];
        let sets = top_influences(weights.view(), 3).unwrap();
        let matrix = RedundancyMatrix::from_influences(&sets);
        for i in 0..4 {
            for j in 0..4 {
                assert_eq!(matrix.overlap(i, j), matrix.overlap(j, i));
            }
        }
    }

    #[test]
    fn test_initial_scores_exclude_diagonal() {
        let matrix = overlapping_fixture();
        // Feature 2 overlaps with nobody, so its score must be zero even
        // though its self-intersection is 2.
        assert_eq!(matrix.initial_scores(), vec![2, 2, 0]);
    }
}
