//! castscore domain crate
//!
//! This crate contains the core pipeline logic following hexagonal
//! architecture:
//! - `model`: Domain entities and value objects
//! - `ports`: Trait definitions for external dependencies (adapters)
//! - `usecases`: Extraction, resolution, adjustment, analysis, batching
//! - `heuristics`: Deterministic score caps and adjustment constants

pub mod heuristics;
pub mod model;
pub mod ports;
pub mod usecases;

pub use heuristics::{AdjustmentConfig, HeuristicConfig};
pub use model::*;
pub use ports::*;
