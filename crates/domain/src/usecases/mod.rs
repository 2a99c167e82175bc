//! Pipeline use cases

pub mod adjust;
pub mod analyze;
pub mod batch;
pub mod extract;
pub mod resolve;

pub use adjust::AdjustmentEngine;
pub use analyze::{Analyzer, AnalyzerConfig};
pub use batch::{BatchConfig, BatchOrchestrator, BatchReport};
pub use extract::{ContentExtractor, ExtractConfig};
pub use resolve::{LocatedReference, ReferenceResolver, ResolveError, ResolvedScore};
