//! Reference resolution use case
//!
//! Locates a quoted cast's existing score across the priority-ordered
//! score stores, fetching the cast from the content source when no
//! backend has seen it yet.

use std::sync::Arc;

use thiserror::Error;

use crate::{
    model::{Cast, Category, StoredCast},
    ports::{CastSource, CastSourceError, ScoreStore, StoreError},
};

/// A referenced cast's resolved score and category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedScore {
    pub score: u8,
    pub category: Category,
}

/// Where a referenced cast was found and in what state
#[derive(Debug)]
pub enum LocatedReference {
    /// A backend already holds a completed analysis
    Scored(ResolvedScore),
    /// A backend holds the cast but it has not been analyzed yet
    Unscored { cast: Cast, store_index: usize },
    /// The content source does not know the cast either
    Unknown,
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    #[error("Cast source error: {0}")]
    Source(#[from] CastSourceError),
}

/// Resolver over a fixed-priority list of score stores plus the
/// content source as a fallback.
pub struct ReferenceResolver<C: ?Sized> {
    stores: Vec<Arc<dyn ScoreStore>>,
    source: Arc<C>,
}

impl<C: CastSource + ?Sized> ReferenceResolver<C> {
    pub fn new(stores: Vec<Arc<dyn ScoreStore>>, source: Arc<C>) -> Self {
        Self { stores, source }
    }

    /// Locate a referenced cast across the backends, falling back to the
    /// content source.
    ///
    /// A cast fetched from the source is persisted as a placeholder into
    /// the first backend so the eventual score has somewhere to live.
    pub async fn locate(&self, cast_hash: &str) -> Result<LocatedReference, ResolveError> {
        for (index, store) in self.stores.iter().enumerate() {
            match store.get(cast_hash).await? {
                Some(stored) if stored.is_scored() => {
                    tracing::debug!(
                        cast_hash = %cast_hash,
                        store = store.kind(),
                        "Referenced cast already scored"
                    );
                    return Ok(LocatedReference::Scored(resolved_from(&stored)));
                }
                Some(stored) => {
                    tracing::debug!(
                        cast_hash = %cast_hash,
                        store = store.kind(),
                        "Referenced cast stored but unscored"
                    );
                    return Ok(LocatedReference::Unscored {
                        cast: stored.cast,
                        store_index: index,
                    });
                }
                None => {}
            }
        }

        match self.source.fetch_cast(cast_hash).await? {
            Some(cast) => {
                if let Some(store) = self.stores.first() {
                    store.insert_placeholder(&cast).await?;
                    tracing::debug!(
                        cast_hash = %cast_hash,
                        store = store.kind(),
                        "Fetched referenced cast and stored placeholder"
                    );
                    Ok(LocatedReference::Unscored {
                        cast,
                        store_index: 0,
                    })
                } else {
                    Ok(LocatedReference::Unknown)
                }
            }
            None => Ok(LocatedReference::Unknown),
        }
    }

    /// Persist a freshly computed score for a located cast
    pub async fn persist(
        &self,
        store_index: usize,
        cast_hash: &str,
        result: &crate::model::AnalysisResult,
        analyzed_at: time::OffsetDateTime,
    ) -> Result<(), StoreError> {
        match self.stores.get(store_index) {
            Some(store) => store.set_score(cast_hash, result, analyzed_at).await,
            None => Ok(()),
        }
    }
}

fn resolved_from(stored: &StoredCast) -> ResolvedScore {
    ResolvedScore {
        score: stored.score.unwrap_or(0),
        category: stored.category.unwrap_or_default(),
    }
}
