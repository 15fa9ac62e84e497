//! Record normalization, point derivation, statistics and pipeline
//! orchestration

pub mod authors;
pub mod cores;
pub mod correlate;
pub mod normalize;
pub mod pipeline;
pub mod points;
pub mod stats;

pub use pipeline::{Pipeline, PipelineError};
pub use points::{derive_points, DerivedBatch};
