//! Top-level cast quality analysis
//!
//! Orchestrates extraction, reference resolution, heuristics and the
//! external scorer for a single cast. Within one call the steps run
//! strictly in sequence; `None` from `analyze` means "not analyzed",
//! which callers must keep distinct from a valid low score.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::{
    heuristics::{AdjustmentConfig, HeuristicConfig},
    model::{AnalysisDepth, AnalysisResult, Cast, Category, Embed},
    ports::{ArticleFetcher, CastSource, Clock, ScoreInput, ScoreWriter, Scorer},
    usecases::{
        adjust::AdjustmentEngine,
        extract::{ContentExtractor, ExtractConfig},
        resolve::{LocatedReference, ReferenceResolver},
    },
};

/// Configuration bundle for the analyzer
#[derive(Debug, Clone, Default)]
pub struct AnalyzerConfig {
    pub extract: ExtractConfig,
    pub heuristics: HeuristicConfig,
    pub adjustment: AdjustmentConfig,
}

/// The cast quality-scoring pipeline
pub struct Analyzer<S, C, F>
where
    S: Scorer + ?Sized,
    C: CastSource + ?Sized,
    F: ArticleFetcher + ?Sized,
{
    scorer: Arc<S>,
    extractor: ContentExtractor<F>,
    resolver: ReferenceResolver<C>,
    clock: Arc<dyn Clock>,
    heuristics: HeuristicConfig,
    adjustment: AdjustmentConfig,
}

/// How a quote cast's resolution attempt ended
enum QuoteOutcome {
    /// Scored against the referenced cast
    Adjusted(AnalysisResult),
    /// Resolution failed; score the quoting cast as ordinary content
    FallThrough,
    /// Scorer failure during adjustment; the whole call is unanalyzed
    NotAnalyzed,
}

impl<S, C, F> Analyzer<S, C, F>
where
    S: Scorer + ?Sized,
    C: CastSource + ?Sized,
    F: ArticleFetcher + ?Sized,
{
    pub fn new(
        scorer: Arc<S>,
        cast_source: Arc<C>,
        article_fetcher: Arc<F>,
        stores: Vec<Arc<dyn crate::ports::ScoreStore>>,
        clock: Arc<dyn Clock>,
        config: AnalyzerConfig,
    ) -> Self {
        Self {
            scorer,
            extractor: ContentExtractor::new(article_fetcher, config.extract),
            resolver: ReferenceResolver::new(stores, cast_source),
            clock,
            heuristics: config.heuristics,
            adjustment: config.adjustment,
        }
    }

    /// Analyze a cast's quality.
    ///
    /// At `TopLevel` depth a quote cast is scored against its referenced
    /// cast; at `ResolvingReference` depth quotes are treated as ordinary
    /// content, which bounds quote-chain recursion to one level.
    pub async fn analyze(&self, cast: &Cast, depth: AnalysisDepth) -> Option<AnalysisResult> {
        // No scorer means no analysis at all; heuristic-only scores must
        // not be persisted in an unconfigured deployment.
        if !self.scorer.is_available() {
            tracing::warn!(cast_hash = %cast.hash, "Scorer unavailable, cast not analyzed");
            return None;
        }

        if depth == AnalysisDepth::TopLevel {
            if let Some(quoted_hash) = cast.quoted_reference() {
                match self.resolve_and_adjust(cast, quoted_hash).await {
                    QuoteOutcome::Adjusted(result) => return Some(result),
                    QuoteOutcome::NotAnalyzed => return None,
                    QuoteOutcome::FallThrough => {}
                }
            }
        }

        self.score_plain(cast).await
    }

    /// Resolve the referenced cast's score, then apply the adjustment
    /// engine instead of the normal rubric.
    async fn resolve_and_adjust(&self, cast: &Cast, quoted_hash: &str) -> QuoteOutcome {
        let resolved = match self.resolver.locate(quoted_hash).await {
            Ok(LocatedReference::Scored(resolved)) => resolved,
            Ok(LocatedReference::Unscored { cast: quoted, store_index }) => {
                // One level of recursion: score the quoted cast as plain
                // content and persist before continuing.
                let Some(result) = self.score_plain(&quoted).await else {
                    tracing::warn!(
                        cast_hash = %quoted_hash,
                        "Quoted cast analysis unavailable, scoring quote as ordinary content"
                    );
                    return QuoteOutcome::FallThrough;
                };
                if let Err(error) = self
                    .resolver
                    .persist(store_index, quoted_hash, &result, self.clock.now())
                    .await
                {
                    tracing::error!(
                        cast_hash = %quoted_hash,
                        error = %error,
                        "Failed to persist quoted cast score"
                    );
                }
                crate::usecases::resolve::ResolvedScore {
                    score: result.quality_score,
                    category: result.category,
                }
            }
            Ok(LocatedReference::Unknown) => {
                tracing::debug!(
                    cast_hash = %quoted_hash,
                    "Referenced cast unknown, scoring quote as ordinary content"
                );
                return QuoteOutcome::FallThrough;
            }
            Err(error) => {
                tracing::warn!(
                    cast_hash = %quoted_hash,
                    error = %error,
                    "Reference resolution failed, scoring quote as ordinary content"
                );
                return QuoteOutcome::FallThrough;
            }
        };

        let quoted_text = cast
            .embeds
            .iter()
            .find_map(|e| match e {
                Embed::Quote { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .unwrap_or_default();

        let engine = AdjustmentEngine::new(self.scorer.as_ref(), self.adjustment.clone());
        match engine
            .score_quote(&cast.text, quoted_text, resolved, cast.quotes_own_parent())
            .await
        {
            Ok(result) => QuoteOutcome::Adjusted(result),
            Err(error) => {
                tracing::warn!(cast_hash = %cast.hash, error = %error, "Adjustment scoring failed");
                QuoteOutcome::NotAnalyzed
            }
        }
    }

    /// Ordinary (non-quote-resolving) scoring: extract, heuristics, rubric
    async fn score_plain(&self, cast: &Cast) -> Option<AnalysisResult> {
        let content = self.extractor.extract(cast).await;

        // Trivial-content rules skip the scorer call outright
        if content.has_text {
            if let Some(cap) = self.heuristics.score_cap(&cast.text) {
                tracing::debug!(cast_hash = %cast.hash, cap, "Heuristic cap short-circuit");
                return Some(AnalysisResult::new(cap, Category::Other));
            }
        }

        // Nothing to evaluate
        if content.text.trim().len() < self.heuristics.min_content_chars {
            tracing::debug!(cast_hash = %cast.hash, "Content below minimum, neutral default");
            return Some(self.heuristics.neutral_result());
        }

        let input = ScoreInput {
            text: content.text.clone(),
            image_only: content.is_image_only(),
        };

        match self.scorer.score_content(input).await {
            Ok(mut result) => {
                if content.has_text {
                    result.quality_score =
                        self.heuristics.clamp(&cast.text, result.quality_score);
                }
                Some(result)
            }
            Err(error) => {
                tracing::warn!(cast_hash = %cast.hash, error = %error, "Scorer call failed");
                None
            }
        }
    }
}

impl<S, C, F> Analyzer<S, C, F>
where
    S: Scorer + ?Sized + 'static,
    C: CastSource + ?Sized + 'static,
    F: ArticleFetcher + ?Sized + 'static,
{
    /// Run an analysis as a detached-but-observable task.
    ///
    /// The result is delivered through the writer; the handle makes
    /// completion (and panics) visible to the caller.
    pub fn spawn(
        self: &Arc<Self>,
        cast: Cast,
        writer: Arc<dyn ScoreWriter>,
    ) -> JoinHandle<Option<AnalysisResult>> {
        let analyzer = Arc::clone(self);
        tokio::spawn(async move {
            let result = analyzer.analyze(&cast, AnalysisDepth::TopLevel).await;
            if let Some(result) = &result {
                if let Err(error) = writer
                    .record_score(&cast.hash, result, analyzer.clock.now())
                    .await
                {
                    tracing::error!(cast_hash = %cast.hash, error = %error, "Failed to persist score");
                }
            }
            result
        })
    }
}
