pub mod error;
pub mod influence;
pub mod redundancy;
pub mod selection;
mod pruner;

pub use error::Error;
pub use error::Result;
pub use pruner::{ProjectionPruner, ProjectionPrunerBuilder};
pub use selection::{CancelFlag, DropSelection, StopReason};
