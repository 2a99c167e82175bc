//! Adjustment engine: derive a quote's score from the quoted cast's score
//!
//! Two sub-cases. A cast quoting its own parent is scored purely on the
//! commentary it adds. A cast quoting an unrelated cast inherits the
//! referenced score with a signed adjustment. Both inherit the referenced
//! cast's category.

use async_trait::async_trait;

use crate::{
    heuristics::AdjustmentConfig,
    model::AnalysisResult,
    ports::{Scorer, ScorerError},
    usecases::resolve::ResolvedScore,
};

/// Use case for scoring quote casts once the referenced score is known
pub struct AdjustmentEngine<S> {
    scorer: S,
    config: AdjustmentConfig,
}

impl<S: Scorer> AdjustmentEngine<S> {
    pub fn new(scorer: S, config: AdjustmentConfig) -> Self {
        Self { scorer, config }
    }

    /// Score a quote cast against its resolved reference.
    ///
    /// `quotes_parent` distinguishes quoting the direct parent (commentary
    /// scored on its own) from quoting an unrelated cast (referenced score
    /// plus adjustment).
    pub async fn score_quote(
        &self,
        commentary: &str,
        quoted_text: &str,
        referenced: ResolvedScore,
        quotes_parent: bool,
    ) -> Result<AnalysisResult, ScorerError> {
        let score = if quotes_parent {
            self.commentary_score(commentary, quoted_text).await?
        } else {
            self.adjusted_score(commentary, quoted_text, referenced.score)
                .await?
        };

        // A quote inherits its reference's topic
        Ok(AnalysisResult::new(score, referenced.category))
    }

    /// Parent-quote case: score of the added commentary alone, 0-100
    async fn commentary_score(
        &self,
        commentary: &str,
        quoted_text: &str,
    ) -> Result<u8, ScorerError> {
        if let Some(score) = self.config.trivial_commentary_score(commentary) {
            tracing::debug!(score, "Trivial parent-quote commentary");
            return Ok(score);
        }
        let score = self.scorer.score_commentary(commentary, quoted_text).await?;
        Ok(score.min(100))
    }

    /// Unrelated-quote case: referenced score plus base adjustment plus an
    /// optional scorer-assessed delta for non-trivial commentary
    async fn adjusted_score(
        &self,
        commentary: &str,
        quoted_text: &str,
        referenced_score: u8,
    ) -> Result<u8, ScorerError> {
        let delta = if self.config.is_trivial_commentary(commentary) {
            0
        } else {
            let raw = self.scorer.score_adjustment(commentary, quoted_text).await?;
            let clamped = self.config.clamp_delta(raw);
            tracing::debug!(raw, clamped, "Commentary adjustment");
            clamped
        };

        Ok(self.config.apply(referenced_score, delta))
    }
}

// Allow use cases to borrow a shared scorer the way the analyzer holds it
#[async_trait]
impl<S: Scorer + ?Sized> Scorer for &S {
    fn is_available(&self) -> bool {
        (*self).is_available()
    }

    async fn score_content(
        &self,
        input: crate::ports::ScoreInput,
    ) -> Result<AnalysisResult, ScorerError> {
        (*self).score_content(input).await
    }

    async fn score_commentary(
        &self,
        commentary: &str,
        quoted_text: &str,
    ) -> Result<u8, ScorerError> {
        (*self).score_commentary(commentary, quoted_text).await
    }

    async fn score_adjustment(
        &self,
        commentary: &str,
        quoted_text: &str,
    ) -> Result<i32, ScorerError> {
        (*self).score_adjustment(commentary, quoted_text).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Category;
    use crate::ports::ScoreInput;

    struct FakeScorer {
        commentary_score: u8,
        adjustment_delta: i32,
    }

    #[async_trait]
    impl Scorer for FakeScorer {
        async fn score_content(
            &self,
            _input: ScoreInput,
        ) -> Result<AnalysisResult, ScorerError> {
            unreachable!("adjustment engine never runs the full rubric")
        }

        async fn score_commentary(
            &self,
            _commentary: &str,
            _quoted_text: &str,
        ) -> Result<u8, ScorerError> {
            Ok(self.commentary_score)
        }

        async fn score_adjustment(
            &self,
            _commentary: &str,
            _quoted_text: &str,
        ) -> Result<i32, ScorerError> {
            Ok(self.adjustment_delta)
        }
    }

    fn engine(scorer: FakeScorer) -> AdjustmentEngine<FakeScorer> {
        AdjustmentEngine::new(scorer, AdjustmentConfig::default())
    }

    fn reference(score: u8) -> ResolvedScore {
        ResolvedScore {
            score,
            category: Category::CryptoCritique,
        }
    }

    #[tokio::test]
    async fn test_parent_quote_empty_commentary_is_zero() {
        let engine = engine(FakeScorer {
            commentary_score: 99,
            adjustment_delta: 0,
        });

        let result = engine
            .score_quote("", "original text", reference(70), true)
            .await
            .unwrap();

        assert_eq!(result.quality_score, 0);
        assert_eq!(result.category, Category::CryptoCritique);
    }

    #[tokio::test]
    async fn test_parent_quote_symbol_commentary_is_five() {
        let engine = engine(FakeScorer {
            commentary_score: 99,
            adjustment_delta: 0,
        });

        let result = engine
            .score_quote("🙌🙌", "original text", reference(70), true)
            .await
            .unwrap();

        assert_eq!(result.quality_score, 5);
    }

    #[tokio::test]
    async fn test_parent_quote_short_commentary_is_ten() {
        let engine = engine(FakeScorer {
            commentary_score: 99,
            adjustment_delta: 0,
        });

        let result = engine
            .score_quote("so true", "original text", reference(70), true)
            .await
            .unwrap();

        assert_eq!(result.quality_score, 10);
    }

    #[tokio::test]
    async fn test_parent_quote_substantive_commentary_uses_scorer() {
        let engine = engine(FakeScorer {
            commentary_score: 72,
            adjustment_delta: 0,
        });

        let result = engine
            .score_quote(
                "this misses the second-order effects on small creators",
                "original text",
                reference(70),
                true,
            )
            .await
            .unwrap();

        // Independent of the parent's 70
        assert_eq!(result.quality_score, 72);
    }

    #[tokio::test]
    async fn test_unrelated_quote_without_commentary_loses_ten() {
        let engine = engine(FakeScorer {
            commentary_score: 0,
            adjustment_delta: 0,
        });

        let result = engine
            .score_quote("", "original text", reference(70), false)
            .await
            .unwrap();

        assert_eq!(result.quality_score, 60);
        assert_eq!(result.category, Category::CryptoCritique);
    }

    #[tokio::test]
    async fn test_unrelated_quote_delta_is_clamped() {
        let engine = engine(FakeScorer {
            commentary_score: 0,
            adjustment_delta: 40,
        });

        let result = engine
            .score_quote(
                "a genuinely substantial take on this topic",
                "original text",
                reference(70),
                false,
            )
            .await
            .unwrap();

        // Delta clamps to +10, cancelling the -10 base
        assert_eq!(result.quality_score, 70);
    }

    #[tokio::test]
    async fn test_unrelated_quote_floors_at_zero() {
        let engine = engine(FakeScorer {
            commentary_score: 0,
            adjustment_delta: -30,
        });

        let result = engine
            .score_quote(
                "barely related commentary that drags this down",
                "original text",
                reference(15),
                false,
            )
            .await
            .unwrap();

        // 15 - 10 - 30 floors at 0
        assert_eq!(result.quality_score, 0);
    }
}
