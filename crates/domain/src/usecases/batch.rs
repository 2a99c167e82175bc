//! Batch orchestration: analyze many casts with bounded concurrency
//!
//! Casts are processed in fixed-size chunks. Items within a chunk run
//! concurrently; chunks run strictly one after another with a delay in
//! between to respect scorer rate limits. One item's failure never
//! aborts the rest.

use std::sync::Arc;

use futures::future::join_all;
use tokio::time::{Duration, sleep};

use crate::{
    model::{AnalysisDepth, Cast},
    ports::{ArticleFetcher, CastSource, Clock, ScoreWriter, Scorer},
    usecases::analyze::Analyzer,
};

/// Configuration for batch analysis
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Casts analyzed concurrently per chunk
    pub batch_size: usize,
    /// Pause between chunks
    pub delay_between_batches: Duration,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 5,
            delay_between_batches: Duration::from_millis(1000),
        }
    }
}

/// Aggregated success/failure counts for one batch run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub processed: usize,
    pub failed: usize,
}

/// Orchestrates batch analysis and persistence
pub struct BatchOrchestrator<S, C, F>
where
    S: Scorer + ?Sized,
    C: CastSource + ?Sized,
    F: ArticleFetcher + ?Sized,
{
    analyzer: Arc<Analyzer<S, C, F>>,
    writer: Arc<dyn ScoreWriter>,
    clock: Arc<dyn Clock>,
    config: BatchConfig,
}

impl<S, C, F> BatchOrchestrator<S, C, F>
where
    S: Scorer + ?Sized,
    C: CastSource + ?Sized,
    F: ArticleFetcher + ?Sized,
{
    pub fn new(
        analyzer: Arc<Analyzer<S, C, F>>,
        writer: Arc<dyn ScoreWriter>,
        clock: Arc<dyn Clock>,
        config: BatchConfig,
    ) -> Self {
        Self {
            analyzer,
            writer,
            clock,
            config,
        }
    }

    /// Analyze all casts, persisting each successful result.
    ///
    /// Always returns with `processed + failed == casts.len()`.
    pub async fn run(&self, casts: Vec<Cast>) -> BatchReport {
        let total = casts.len();
        let batch_size = self.config.batch_size.max(1);
        let mut report = BatchReport::default();

        let chunks: Vec<&[Cast]> = casts.chunks(batch_size).collect();
        let chunk_count = chunks.len();

        for (index, chunk) in chunks.into_iter().enumerate() {
            if index > 0 {
                sleep(self.config.delay_between_batches).await;
            }

            tracing::info!(
                chunk = index + 1,
                chunks = chunk_count,
                size = chunk.len(),
                "Processing batch chunk"
            );

            let outcomes = join_all(chunk.iter().map(|cast| self.process_one(cast))).await;
            for ok in outcomes {
                if ok {
                    report.processed += 1;
                } else {
                    report.failed += 1;
                }
            }
        }

        tracing::info!(
            total,
            processed = report.processed,
            failed = report.failed,
            "Batch complete"
        );

        report
    }

    async fn process_one(&self, cast: &Cast) -> bool {
        let Some(result) = self.analyzer.analyze(cast, AnalysisDepth::TopLevel).await else {
            tracing::warn!(cast_hash = %cast.hash, "Cast not analyzed");
            return false;
        };

        match self
            .writer
            .record_score(&cast.hash, &result, self.clock.now())
            .await
        {
            Ok(()) => {
                tracing::info!(
                    cast_hash = %cast.hash,
                    score = result.quality_score,
                    category = %result.category,
                    "Scored cast"
                );
                true
            }
            Err(error) => {
                tracing::error!(cast_hash = %cast.hash, error = %error, "Failed to persist score");
                false
            }
        }
    }
}
