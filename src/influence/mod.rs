//! # Influence Sets
//!
//! Every output feature of a projection layer (a column of the weight
//! matrix) is characterized by the set of input features that feed it most
//! strongly. This module extracts, for each column, the `top_k` row indices
//! with the largest absolute weight. Two output features whose influence
//! sets overlap heavily draw on the same inputs, which the later stages
//! treat as a proxy for carrying duplicated information.
//!
//! Ranking ties are broken by the lower row index, so extraction is fully
//! deterministic and repeated calls on the same column always return the
//! same set.

use std::cmp::Ordering;

use ndarray::{Array2, ArrayView2};
use num_traits::Float;
use rayon::prelude::*;

use crate::error::{Error, Result};

/// The per-output-feature influence sets of one weight matrix.
///
/// Holds the ranked index lists plus a dense membership table so that
/// pairwise intersection checks cost O(1) per candidate index.
pub struct InfluenceSets {
    top_k: usize,
    input_dim: usize,
    indices: Vec<Vec<usize>>,
    membership: Array2<bool>,
}

impl InfluenceSets {
    pub fn output_dim(&self) -> usize {
        self.indices.len()
    }

    pub fn input_dim(&self) -> usize {
        self.input_dim
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Influence indices of one output feature, strongest weight first.
    pub fn indices(&self, feature: usize) -> &[usize] {
        &self.indices[feature]
    }

    pub fn contains(&self, feature: usize, input: usize) -> bool {
        self.membership[[feature, input]]
    }

    /// Size of the intersection of two influence sets.
    pub fn overlap(&self, a: usize, b: usize) -> u32 {
        self.indices[a]
            .iter()
            .filter(|&&input| self.membership[[b, input]])
            .count() as u32
    }
}

/// Extract the `top_k` most influential input features of every output
/// feature of `weights` (shape `[input_dim, output_dim]`).
///
/// Columns are processed in parallel; each column's result depends only on
/// that column, so the outcome is independent of scheduling.
pub fn top_influences<T>(weights: ArrayView2<T>, top_k: usize) -> Result<InfluenceSets>
where
    T: Float + Send + Sync,
{
    let (input_dim, output_dim) = weights.dim();
    if input_dim == 0 || output_dim == 0 {
        return Err(Error::EmptyInput {
            rows: input_dim,
            cols: output_dim,
        });
    }
    if top_k == 0 || top_k > input_dim {
        return Err(Error::InvalidParameter {
            name: "top_k",
            reason: format!("must be in 1..={}, got {}", input_dim, top_k),
        });
    }

    let indices: Vec<Vec<usize>> = (0..output_dim)
        .into_par_iter()
        .map(|feature| {
            let column = weights.column(feature);
            let mut order: Vec<usize> = (0..input_dim).collect();
            // Largest magnitude first; equal magnitudes fall back to the
            // lower row index.
            order.sort_unstable_by(|&a, &b| {
                column[b]
                    .abs()
                    .partial_cmp(&column[a].abs())
                    .unwrap_or(Ordering::Equal)
                    .then(a.cmp(&b))
            });
            order.truncate(top_k);
            order
        })
        .collect();

    let mut membership = Array2::from_elem((output_dim, input_dim), false);
    for (feature, set) in indices.iter().enumerate() {
        for &input in set {
            membership[[feature, input]] = true;
        }
    }

    Ok(InfluenceSets {
        top_k,
        input_dim,
        indices,
        membership,
    })
}
