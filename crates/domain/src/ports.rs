//! Port definitions (traits) for external dependencies
//!
//! These traits define the boundaries between the pipeline and external
//! systems. Adapters implement these traits to connect to real
//! infrastructure.

use async_trait::async_trait;
use thiserror::Error;
use time::OffsetDateTime;

use crate::model::{AnalysisResult, Article, Cast, StoredCast};

/// Error type for scorer operations
#[derive(Debug, Error)]
pub enum ScorerError {
    #[error("Scorer not configured: {0}")]
    Config(String),
    #[error("Scorer API error: {0}")]
    Api(String),
    #[error("Invalid response format: {0}")]
    InvalidFormat(String),
    #[error("Rate limited")]
    RateLimited,
    #[error("Timeout")]
    Timeout,
}

/// Input for a full-rubric content scoring call
#[derive(Debug, Clone)]
pub struct ScoreInput {
    /// Composed text blob from content extraction
    pub text: String,
    /// Image-only content biases the rubric toward a 5-30 range
    pub image_only: bool,
}

/// Port for the external text-scoring API.
///
/// Three operations mirror the three prompt shapes the pipeline uses.
/// Any error at this boundary makes the whole top-level analysis return
/// "not analyzed"; retry policy belongs to the caller.
#[async_trait]
pub trait Scorer: Send + Sync {
    /// Whether the backing API is configured at all. When this returns
    /// false every analysis must report "not analyzed" without scoring,
    /// heuristics included.
    fn is_available(&self) -> bool {
        true
    }

    /// Score composed content against the full quality rubric
    async fn score_content(&self, input: ScoreInput) -> Result<AnalysisResult, ScorerError>;

    /// Score only the commentary a quote adds over its own parent,
    /// 0-100 direct
    async fn score_commentary(
        &self,
        commentary: &str,
        quoted_text: &str,
    ) -> Result<u8, ScorerError>;

    /// Signed adjustment delta for commentary added when quoting an
    /// unrelated cast; the caller clamps the range
    async fn score_adjustment(
        &self,
        commentary: &str,
        quoted_text: &str,
    ) -> Result<i32, ScorerError>;
}

/// Error type for score store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Port for one score-store backend.
///
/// A cast's record may live in either of two backends (curated casts or
/// reply casts, different lifecycle stages); the resolver checks a
/// priority-ordered list of these.
#[async_trait]
pub trait ScoreStore: Send + Sync {
    /// Backend name for logging (e.g. "curated", "replies")
    fn kind(&self) -> &'static str;

    /// Look up a cast and its score record by hash
    async fn get(&self, cast_hash: &str) -> Result<Option<StoredCast>, StoreError>;

    /// Insert a cast with no score yet (placeholder linkage fields allowed)
    async fn insert_placeholder(&self, cast: &Cast) -> Result<(), StoreError>;

    /// Write the score record for a stored cast (atomic upsert)
    async fn set_score(
        &self,
        cast_hash: &str,
        result: &AnalysisResult,
        analyzed_at: OffsetDateTime,
    ) -> Result<(), StoreError>;
}

/// Caller-supplied persistence callback for analysis results
#[async_trait]
pub trait ScoreWriter: Send + Sync {
    async fn record_score(
        &self,
        cast_hash: &str,
        result: &AnalysisResult,
        analyzed_at: OffsetDateTime,
    ) -> Result<(), StoreError>;
}

/// Error type for cast source operations
#[derive(Debug, Error)]
pub enum CastSourceError {
    #[error("API error: {0}")]
    Api(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Rate limited, retry after: {0:?}")]
    RateLimited(Option<std::time::Duration>),
}

/// Port for fetching casts from the content source.
///
/// Used only when neither score store already holds a quoted cast.
#[async_trait]
pub trait CastSource: Send + Sync {
    /// Fetch a cast by hash, with its reply/parent linkage
    async fn fetch_cast(&self, cast_hash: &str) -> Result<Option<Cast>, CastSourceError>;
}

/// Error type for article fetch operations
#[derive(Debug, Error)]
pub enum ArticleError {
    #[error("Fetch error: {0}")]
    Fetch(String),
    #[error("Invalid article payload: {0}")]
    InvalidPayload(String),
}

/// Port for fetching long-form articles by URL
#[async_trait]
pub trait ArticleFetcher: Send + Sync {
    /// Whether the URL points at a known long-form platform
    fn is_article_url(&self, url: &str) -> bool;

    /// Fetch title and body for an article URL
    async fn fetch_article(&self, url: &str) -> Result<Option<Article>, ArticleError>;
}

/// Port for time/clock operations (enables deterministic testing)
pub trait Clock: Send + Sync {
    /// Get the current time
    fn now(&self) -> OffsetDateTime;
}

/// Real clock implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}
