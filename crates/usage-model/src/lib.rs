//! Core vocabulary for the usage-tracking pipeline.
//!
//! This crate defines the types shared by every pipeline stage: category
//! keys, sheet/measure classification, gap-fill policies, and the run
//! configuration loaded from disk.

pub mod category;
pub mod config;
pub mod error;

pub use category::{CategoryKey, MeasureKind, SheetKind};
pub use config::{FillPolicy, PipelineConfig};
pub use error::ConfigError;
