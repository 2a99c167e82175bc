//! Deterministic offline scorer for tests and local dry runs

use async_trait::async_trait;
use castscore_domain::{AnalysisResult, Category, ScoreInput, Scorer, ScorerError};

/// Keyword buckets used to guess a category without a model
const CATEGORY_KEYWORDS: [(Category, &[&str]); 9] = [
    (Category::CryptoCritique, &["crypto", "token", "defi", "rug"]),
    (Category::PlatformAnalysis, &["platform", "algorithm", "feed", "moderation"]),
    (Category::CreatorEconomy, &["creator", "monetize", "audience", "subscriber"]),
    (Category::ArtCulture, &["art", "gallery", "mint", "aesthetic"]),
    (Category::AiPhilosophy, &["ai", "model", "intelligence", "alignment"]),
    (Category::CommunityCulture, &["community", "channel", "vibes", "norms"]),
    (Category::LifeReflection, &["life", "learned", "grateful", "morning"]),
    (Category::MarketNews, &["market", "price", "raise", "launch"]),
    (Category::Playful, &["lol", "meme", "joke", "fun"]),
];

/// Length-and-keyword based scorer with no external calls.
///
/// Scores scale with content length; categories come from keyword
/// matching. Deterministic for a given input.
#[derive(Debug, Clone, Copy, Default)]
pub struct StubScorer;

impl StubScorer {
    fn length_score(text: &str, base: u8, cap: u8) -> u8 {
        let scaled = base as usize + text.trim().len() / 20;
        scaled.min(cap as usize) as u8
    }

    fn guess_category(text: &str) -> Category {
        let lower = text.to_lowercase();
        for (category, keywords) in CATEGORY_KEYWORDS {
            if keywords.iter().any(|k| lower.contains(k)) {
                return category;
            }
        }
        Category::Other
    }
}

#[async_trait]
impl Scorer for StubScorer {
    async fn score_content(&self, input: ScoreInput) -> Result<AnalysisResult, ScorerError> {
        let cap = if input.image_only { 30 } else { 85 };
        let score = Self::length_score(&input.text, 20, cap);
        Ok(
            AnalysisResult::new(score, Self::guess_category(&input.text))
                .with_reasoning("stub: length and keyword heuristic"),
        )
    }

    async fn score_commentary(
        &self,
        commentary: &str,
        _quoted_text: &str,
    ) -> Result<u8, ScorerError> {
        Ok(Self::length_score(commentary, 15, 75))
    }

    async fn score_adjustment(
        &self,
        commentary: &str,
        _quoted_text: &str,
    ) -> Result<i32, ScorerError> {
        // Longer commentary reads as more effort
        if commentary.trim().len() >= 80 {
            Ok(5)
        } else {
            Ok(-5)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_deterministic_scores() {
        let scorer = StubScorer;
        let input = ScoreInput {
            text: "a reflection on how the creator economy rewards consistency".to_string(),
            image_only: false,
        };

        let first = scorer.score_content(input.clone()).await.unwrap();
        let second = scorer.score_content(input).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.category, Category::CreatorEconomy);
    }

    #[tokio::test]
    async fn test_image_only_stays_in_band() {
        let scorer = StubScorer;
        let result = scorer
            .score_content(ScoreInput {
                text: "Image: [no description]".repeat(10),
                image_only: true,
            })
            .await
            .unwrap();

        assert!(result.quality_score <= 30);
    }
}
