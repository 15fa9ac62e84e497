//! Common types and utilities for the time-to-merge pipeline

pub mod config;
pub mod models;
pub mod series;

pub use config::RunConfig;
pub use models::{AuthorStats, CorrelatedPoint, Point, Rgb};
pub use series::PipelineOutput;
