//! In-memory score store
//!
//! Backs tests and one-shot CLI runs where persistence is not wanted.

use async_trait::async_trait;
use castscore_domain::{
    AnalysisResult, Cast, ScoreStore, ScoreWriter, StoreError, StoredCast,
};
use std::collections::HashMap;
use std::sync::Mutex;
use time::OffsetDateTime;

pub struct InMemoryScoreStore {
    kind: &'static str,
    casts: Mutex<HashMap<String, StoredCast>>,
}

impl InMemoryScoreStore {
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            casts: Mutex::new(HashMap::new()),
        }
    }

    /// Seed a fully scored entry (for tests)
    pub fn insert_scored(&self, cast: Cast, result: &AnalysisResult) {
        let mut casts = self.casts.lock().unwrap_or_else(|e| e.into_inner());
        casts.insert(
            cast.hash.clone(),
            StoredCast {
                cast,
                score: Some(result.quality_score),
                category: Some(result.category),
                analyzed_at: Some(OffsetDateTime::now_utc()),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.casts.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryScoreStore {
    fn default() -> Self {
        Self::new("memory")
    }
}

#[async_trait]
impl ScoreStore for InMemoryScoreStore {
    fn kind(&self) -> &'static str {
        self.kind
    }

    async fn get(&self, cast_hash: &str) -> Result<Option<StoredCast>, StoreError> {
        let casts = self.casts.lock().unwrap_or_else(|e| e.into_inner());
        Ok(casts.get(cast_hash).cloned())
    }

    async fn insert_placeholder(&self, cast: &Cast) -> Result<(), StoreError> {
        let mut casts = self.casts.lock().unwrap_or_else(|e| e.into_inner());
        casts.entry(cast.hash.clone()).or_insert_with(|| StoredCast {
            cast: cast.clone(),
            score: None,
            category: None,
            analyzed_at: None,
        });
        Ok(())
    }

    async fn set_score(
        &self,
        cast_hash: &str,
        result: &AnalysisResult,
        analyzed_at: OffsetDateTime,
    ) -> Result<(), StoreError> {
        let mut casts = self.casts.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(stored) = casts.get_mut(cast_hash) {
            stored.score = Some(result.quality_score);
            stored.category = Some(result.category);
            stored.analyzed_at = Some(analyzed_at);
        }
        Ok(())
    }
}

#[async_trait]
impl ScoreWriter for InMemoryScoreStore {
    async fn record_score(
        &self,
        cast_hash: &str,
        result: &AnalysisResult,
        analyzed_at: OffsetDateTime,
    ) -> Result<(), StoreError> {
        let mut casts = self.casts.lock().unwrap_or_else(|e| e.into_inner());
        let stored = casts.entry(cast_hash.to_string()).or_insert_with(|| StoredCast {
            cast: Cast {
                hash: cast_hash.to_string(),
                text: String::new(),
                embeds: Vec::new(),
                parent_hash: None,
                author_fid: None,
            },
            score: None,
            category: None,
            analyzed_at: None,
        });
        stored.score = Some(result.quality_score);
        stored.category = Some(result.category);
        stored.analyzed_at = Some(analyzed_at);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use castscore_domain::Category;

    #[tokio::test]
    async fn test_placeholder_preserves_first_insert() {
        let store = InMemoryScoreStore::default();
        let cast = Cast {
            hash: "0xa".to_string(),
            text: "first".to_string(),
            embeds: Vec::new(),
            parent_hash: None,
            author_fid: None,
        };
        store.insert_placeholder(&cast).await.unwrap();

        let mut altered = cast.clone();
        altered.text = "second".to_string();
        store.insert_placeholder(&altered).await.unwrap();

        let stored = store.get("0xa").await.unwrap().unwrap();
        assert_eq!(stored.cast.text, "first");
    }

    #[tokio::test]
    async fn test_record_score_then_get() {
        let store = InMemoryScoreStore::default();
        let result = AnalysisResult::new(70, Category::AiPhilosophy);
        store
            .record_score("0xb", &result, OffsetDateTime::now_utc())
            .await
            .unwrap();

        let stored = store.get("0xb").await.unwrap().unwrap();
        assert_eq!(stored.score, Some(70));
        assert_eq!(stored.category, Some(Category::AiPhilosophy));
    }
}
