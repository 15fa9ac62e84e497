//! Stackalytics contributor-metrics client

pub mod client;

pub use client::{ClientError, EngineerStat, Metric, StackalyticsClient};
