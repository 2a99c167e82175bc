//! SQLite score store implementation
//!
//! Two fixed tables back the two post lifecycle stages: curated casts
//! and reply casts. Both share one schema and one connection pool.

use async_trait::async_trait;
use castscore_domain::{
    AnalysisResult, Cast, Category, ScoreStore, ScoreWriter, StoreError, StoredCast,
};
use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};
use std::path::Path;
use time::OffsetDateTime;

/// Which backend table a store instance reads and writes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastTable {
    Curated,
    Replies,
}

impl CastTable {
    fn table_name(self) -> &'static str {
        match self {
            CastTable::Curated => "curated_casts",
            CastTable::Replies => "reply_casts",
        }
    }

    fn kind(self) -> &'static str {
        match self {
            CastTable::Curated => "curated",
            CastTable::Replies => "replies",
        }
    }
}

/// SQLite-backed score store over one of the two cast tables
#[derive(Clone)]
pub struct SqliteScoreStore {
    pool: SqlitePool,
    table: CastTable,
}

impl SqliteScoreStore {
    /// Open both backends over one pool, initializing the database if needed
    pub async fn open_pair(
        db_path: impl AsRef<Path>,
    ) -> Result<(SqliteScoreStore, SqliteScoreStore), StoreError> {
        let db_path = db_path.as_ref();

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::Database(format!("Failed to create directory: {e}")))?;
        }

        let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&db_url)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Self::from_pool(pool).await
    }

    /// In-memory pair (for testing)
    pub async fn in_memory_pair() -> Result<(SqliteScoreStore, SqliteScoreStore), StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Self::from_pool(pool).await
    }

    async fn from_pool(
        pool: SqlitePool,
    ) -> Result<(SqliteScoreStore, SqliteScoreStore), StoreError> {
        for table in [CastTable::Curated, CastTable::Replies] {
            run_migrations(&pool, table).await?;
        }

        Ok((
            Self {
                pool: pool.clone(),
                table: CastTable::Curated,
            },
            Self {
                pool,
                table: CastTable::Replies,
            },
        ))
    }
}

async fn run_migrations(pool: &SqlitePool, table: CastTable) -> Result<(), StoreError> {
    let sql = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {} (
            hash TEXT PRIMARY KEY,
            text TEXT NOT NULL DEFAULT '',
            embeds TEXT NOT NULL DEFAULT '[]',
            parent_hash TEXT,
            author_fid INTEGER,
            quality_score INTEGER,
            category TEXT,
            reasoning TEXT,
            analyzed_at TEXT
        )
        "#,
        table.table_name()
    );

    sqlx::query(&sql)
        .execute(pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

    Ok(())
}

type CastRow = (
    String,
    String,
    String,
    Option<String>,
    Option<i64>,
    Option<i64>,
    Option<String>,
    Option<String>,
);

fn format_timestamp(timestamp: OffsetDateTime) -> Result<String, StoreError> {
    timestamp
        .format(&time::format_description::well_known::Rfc3339)
        .map_err(|e| StoreError::Serialization(e.to_string()))
}

#[async_trait]
impl ScoreStore for SqliteScoreStore {
    fn kind(&self) -> &'static str {
        self.table.kind()
    }

    async fn get(&self, cast_hash: &str) -> Result<Option<StoredCast>, StoreError> {
        let sql = format!(
            "SELECT hash, text, embeds, parent_hash, author_fid, quality_score, \
             category, analyzed_at FROM {} WHERE hash = ?",
            self.table.table_name()
        );

        let row: Option<CastRow> = sqlx::query_as(&sql)
            .bind(cast_hash)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let Some((hash, text, embeds_json, parent_hash, author_fid, score, category, analyzed_at)) =
            row
        else {
            return Ok(None);
        };

        let embeds = serde_json::from_str(&embeds_json)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        let analyzed_at = analyzed_at
            .map(|s| {
                OffsetDateTime::parse(&s, &time::format_description::well_known::Rfc3339)
                    .map_err(|e| StoreError::Serialization(e.to_string()))
            })
            .transpose()?;

        Ok(Some(StoredCast {
            cast: Cast {
                hash,
                text,
                embeds,
                parent_hash,
                author_fid,
            },
            score: score.map(|s| s.clamp(0, 100) as u8),
            category: category.as_deref().map(Category::parse),
            analyzed_at,
        }))
    }

    async fn insert_placeholder(&self, cast: &Cast) -> Result<(), StoreError> {
        let embeds_json = serde_json::to_string(&cast.embeds)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        let sql = format!(
            r#"
            INSERT INTO {} (hash, text, embeds, parent_hash, author_fid)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(hash) DO NOTHING
            "#,
            self.table.table_name()
        );

        sqlx::query(&sql)
            .bind(&cast.hash)
            .bind(&cast.text)
            .bind(&embeds_json)
            .bind(&cast.parent_hash)
            .bind(cast.author_fid)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }

    async fn set_score(
        &self,
        cast_hash: &str,
        result: &AnalysisResult,
        analyzed_at: OffsetDateTime,
    ) -> Result<(), StoreError> {
        let analyzed_at_str = format_timestamp(analyzed_at)?;

        let sql = format!(
            "UPDATE {} SET quality_score = ?, category = ?, reasoning = ?, analyzed_at = ? \
             WHERE hash = ?",
            self.table.table_name()
        );

        sqlx::query(&sql)
            .bind(i64::from(result.quality_score))
            .bind(result.category.as_str())
            .bind(&result.reasoning)
            .bind(&analyzed_at_str)
            .bind(cast_hash)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl ScoreWriter for SqliteScoreStore {
    async fn record_score(
        &self,
        cast_hash: &str,
        result: &AnalysisResult,
        analyzed_at: OffsetDateTime,
    ) -> Result<(), StoreError> {
        let analyzed_at_str = format_timestamp(analyzed_at)?;

        // Upsert: batch callers may score casts the store has not seen
        let sql = format!(
            r#"
            INSERT INTO {} (hash, quality_score, category, reasoning, analyzed_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(hash) DO UPDATE SET
                quality_score = excluded.quality_score,
                category = excluded.category,
                reasoning = excluded.reasoning,
                analyzed_at = excluded.analyzed_at
            "#,
            self.table.table_name()
        );

        sqlx::query(&sql)
            .bind(cast_hash)
            .bind(i64::from(result.quality_score))
            .bind(result.category.as_str())
            .bind(&result.reasoning)
            .bind(&analyzed_at_str)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }
}
