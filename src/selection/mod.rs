//! Greedy removal of the most redundant output features.
//!
//! Each iteration drops the feature with the highest running drop score and
//! subtracts its pairwise overlaps from every surviving feature's score, so
//! the next choice is made against the updated redundancy landscape rather
//! than the stale initial counts.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::debug;

use crate::error::{Error, Result};
use crate::redundancy::RedundancyMatrix;

/// Score assigned to a dropped feature. Live scores never go below zero,
/// so any negative value keeps a dropped slot out of the argmax without
/// removing it from the vector.
const DROPPED: i64 = -1;

/// Why the greedy loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// All requested drops were performed.
    BudgetExhausted,
    /// The best remaining score was zero; nothing redundant is left.
    RedundancyExhausted,
    /// The caller raised the cancel flag mid-run.
    Cancelled,
}

/// Cooperative early-stop signal, checked once per drop iteration.
#[derive(Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Outcome of one greedy run.
#[derive(Debug, Clone)]
pub struct DropSelection {
    /// Features in the order they were dropped.
    pub order: Vec<usize>,
    /// Scores after the run; dropped slots hold the sentinel.
    pub final_scores: Vec<i64>,
    pub reason: StopReason,
}

/// Drop up to `drop_number` features, always taking the currently highest
/// scored one (ties to the lowest index) and propagating the score update.
pub fn greedy_drop(
    redundancy: &RedundancyMatrix,
    mut scores: Vec<i64>,
    drop_number: usize,
    cancel: Option<&CancelFlag>,
) -> Result<DropSelection> {
    if scores.len() != redundancy.output_dim() {
        return Err(Error::InvalidParameter {
            name: "scores",
            reason: format!(
                "expected one score per output feature ({}), got {}",
                redundancy.output_dim(),
                scores.len()
            ),
        });
    }
    if drop_number > scores.len() {
        return Err(Error::InvalidParameter {
            name: "drop_number",
            reason: format!(
                "must not exceed the {} output features, got {}",
                scores.len(),
                drop_number
            ),
        });
    }

    let mut order = Vec::with_capacity(drop_number);
    let mut reason = StopReason::BudgetExhausted;

    for _ in 0..drop_number {
        if cancel.is_some_and(|flag| flag.is_cancelled()) {
            reason = StopReason::Cancelled;
            break;
        }

        let mut best: Option<(usize, i64)> = None;
        for (i, &score) in scores.iter().enumerate() {
            if score >= 0 && best.map_or(true, |(_, top)| score > top) {
                best = Some((i, score));
            }
        }

        let (dropped, score) = match best {
            Some(pair) => pair,
            None => {
                reason = StopReason::RedundancyExhausted;
                break;
            }
        };
        if score == 0 {
            debug!(
                "stopping after {} drops, no redundancy left among live features",
                order.len()
            );
            reason = StopReason::RedundancyExhausted;
            break;
        }

        order.push(dropped);
        for (i, entry) in scores.iter_mut().enumerate() {
            // Already-dropped slots stay at the sentinel.
            if i != dropped && *entry >= 0 {
                *entry -= redundancy.overlap(dropped, i) as i64;
            }
        }
        scores[dropped] = DROPPED;
    }

    Ok(DropSelection {
        order,
        final_scores: scores,
        reason,
    })
}

/// Indices worth keeping after a run: everything whose final score is
/// strictly positive. Features that end at exactly zero were never
/// redundant with anything, yet the policy discards them together with the
/// greedily dropped ones.
pub fn kept_features(final_scores: &[i64]) -> Vec<usize> {
    final_scores
        .iter()
        .enumerate()
        .filter(|&(_, &score)| score > 0)
        .map(|(i, _)| i)
        .collect()
}
