use thiserror::Error;

/// Errors reported by the pruning pipeline. Every variant is detected at
/// the entry of the stage it concerns; there is no partial execution state
/// to roll back.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("empty weight matrix ({rows} x {cols})")]
    EmptyInput { rows: usize, cols: usize },

    #[error("pruner must be fitted first")]
    NotFitted,
}

pub type Result<T> = std::result::Result<T, Error>;
