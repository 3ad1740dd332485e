#![forbid(unsafe_code)]

//! Semantic model for trunnel tree charts (headless).
//!
//! A tree chart draws an ordered category/value series as a stacked trunk that splits into
//! branches (the leading items) and leaves (the trailing `leaf_count` items). This crate owns
//! the data side: series validation and partitioning, layout configuration, host data views
//! and persisted visual settings. Geometry lives in `trunnel-render`.

pub mod config;
pub mod data_view;
pub mod error;
pub mod geom;
pub mod series;
pub mod settings;

pub use config::TreeConfig;
pub use data_view::{CategoricalView, DataView, DataViewMetadata};
pub use error::{Error, Result};
pub use series::{DerivedRow, Partition, Series, SeriesItem};
pub use settings::{VisualObjectInstance, VisualSettings};

#[cfg(test)]
mod tests;
