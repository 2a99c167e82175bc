//! Scorer placeholder for deployments with no API credential
//!
//! Reports itself unavailable so the pipeline skips analysis entirely,
//! heuristics included, and every direct call fails with a configuration
//! error. Keeps the absence of a credential non-fatal to the process.

use async_trait::async_trait;
use castscore_domain::{AnalysisResult, ScoreInput, Scorer, ScorerError};

pub struct DisabledScorer {
    reason: String,
}

impl DisabledScorer {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    fn error(&self) -> ScorerError {
        tracing::warn!(reason = %self.reason, "Scorer not configured, skipping analysis");
        ScorerError::Config(self.reason.clone())
    }
}

#[async_trait]
impl Scorer for DisabledScorer {
    fn is_available(&self) -> bool {
        false
    }

    async fn score_content(&self, _input: ScoreInput) -> Result<AnalysisResult, ScorerError> {
        Err(self.error())
    }

    async fn score_commentary(&self, _: &str, _: &str) -> Result<u8, ScorerError> {
        Err(self.error())
    }

    async fn score_adjustment(&self, _: &str, _: &str) -> Result<i32, ScorerError> {
        Err(self.error())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_scorer_reports_unavailable() {
        let scorer = DisabledScorer::new("CASTSCORE_API_KEY not set");

        assert!(!scorer.is_available());
        let result = scorer
            .score_content(ScoreInput {
                text: "gm".to_string(),
                image_only: false,
            })
            .await;
        assert!(matches!(result, Err(ScorerError::Config(_))));
    }
}
