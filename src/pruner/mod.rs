use log::{debug, info};
use ndarray::{Array2, ArrayView2, Axis};
use num_traits::Float;

use crate::error::{Error, Result};
use crate::influence::top_influences;
use crate::redundancy::RedundancyMatrix;
use crate::selection::{greedy_drop, kept_features, CancelFlag, StopReason};

pub struct ProjectionPrunerBuilder {
    top_k: usize,
    drop_number: usize,
    cancel: Option<CancelFlag>,
}

impl Default for ProjectionPrunerBuilder {
    fn default() -> Self {
        Self {
            top_k: 512,
            drop_number: 100,
            cancel: None,
        }
    }
}

impl ProjectionPrunerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many input features define an output feature's signature.
    pub fn top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Maximum number of output features to remove.
    pub fn drop_number(mut self, drop_number: usize) -> Self {
        self.drop_number = drop_number;
        self
    }

    /// Attach an early-stop signal, checked once per drop iteration.
    pub fn cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn build(self) -> ProjectionPruner {
        ProjectionPruner {
            top_k: self.top_k,
            drop_number: self.drop_number,
            cancel: self.cancel,
            output_dim_: None,
            kept_: None,
            drop_order_: None,
            final_scores_: None,
            stop_reason_: None,
        }
    }
}

/// Selects the subset of a projection layer's output features to keep,
/// judging the rest redundant from the weight structure alone.
///
/// Mirrors a fit/transform workflow: `fit` runs the selection on the
/// weight matrix (shape `[input_dim, output_dim]`), `transform` slices the
/// output dimension of any compatible matrix down to the kept features.
pub struct ProjectionPruner {
    top_k: usize,
    drop_number: usize,
    cancel: Option<CancelFlag>,
    output_dim_: Option<usize>,
    kept_: Option<Vec<usize>>,
    drop_order_: Option<Vec<usize>>,
    final_scores_: Option<Vec<i64>>,
    stop_reason_: Option<StopReason>,
}

impl ProjectionPruner {
    pub fn fit<T>(&mut self, weights: ArrayView2<T>) -> Result<&mut Self>
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
        if self.drop_number > output_dim {
            return Err(Error::InvalidParameter {
                name: "drop_number",
                reason: format!(
                    "must not exceed the {} output features, got {}",
                    output_dim, self.drop_number
                ),
            });
        }

        debug!(
            "extracting top-{} influence sets for {} output features",
            self.top_k, output_dim
        );
        let influences = top_influences(weights, self.top_k)?;

        debug!("building {n} x {n} redundancy matrix", n = output_dim);
        let redundancy = RedundancyMatrix::from_influences(&influences);
        let scores = redundancy.initial_scores();

        let selection = greedy_drop(&redundancy, scores, self.drop_number, self.cancel.as_ref())?;
        let kept = kept_features(&selection.final_scores);

        info!(
            "dropped {} of {} output features, keeping {} ({:?})",
            selection.order.len(),
            output_dim,
            kept.len(),
            selection.reason
        );

        self.output_dim_ = Some(output_dim);
        self.kept_ = Some(kept);
        self.drop_order_ = Some(selection.order);
        self.final_scores_ = Some(selection.final_scores);
        self.stop_reason_ = Some(selection.reason);
        Ok(self)
    }

    /// Kept output-feature indices, ascending.
    pub fn kept_features(&self) -> Result<&[usize]> {
        self.kept_.as_deref().ok_or(Error::NotFitted)
    }

    /// Features in the order the greedy loop removed them.
    pub fn drop_order(&self) -> Result<&[usize]> {
        self.drop_order_.as_deref().ok_or(Error::NotFitted)
    }

    /// Drop scores after the run; dropped slots hold the sentinel.
    pub fn final_scores(&self) -> Result<&[i64]> {
        self.final_scores_.as_deref().ok_or(Error::NotFitted)
    }

    pub fn stop_reason(&self) -> Result<StopReason> {
        self.stop_reason_.ok_or(Error::NotFitted)
    }

    /// Slice the output dimension of `weights` down to the kept features.
    pub fn transform<T>(&self, weights: ArrayView2<T>) -> Result<Array2<T>>
    where
        T: Float,
    {
        let kept = self.kept_.as_ref().ok_or(Error::NotFitted)?;
        let expected = self.output_dim_.ok_or(Error::NotFitted)?;
        if weights.ncols() != expected {
            return Err(Error::InvalidParameter {
                name: "weights",
                reason: format!("expected {} columns, got {}", expected, weights.ncols()),
            });
        }
        Ok(weights.select(Axis(1), kept))
    }

    pub fn fit_transform<T>(&mut self, weights: ArrayView2<T>) -> Result<Array2<T>>
    where
        T: Float + Send + Sync,
    {
        self.fit(weights)?;
        self.transform(weights)
    }
}
