//! Batch command - score many casts from a JSON file

use anyhow::{Context, Result, bail};
use castscore_adapters::store::{CastTable, InMemoryScoreStore, SqliteScoreStore};
use castscore_domain::usecases::BatchOrchestrator;
use castscore_domain::{Cast, Embed, ScoreStore, ScoreWriter, SystemClock};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;

use crate::args::BatchArgs;
use crate::commands::analyze::{build_analyzer, build_cast_source};
use crate::config::AppConfig;

/// One input record; embeds use the same JSON shape the stores persist
#[derive(Debug, Deserialize)]
struct CastInput {
    hash: String,
    #[serde(default)]
    text: String,
    #[serde(default)]
    embeds: Vec<Embed>,
    #[serde(default)]
    parent_hash: Option<String>,
    #[serde(default)]
    author_fid: Option<i64>,
}

impl From<CastInput> for Cast {
    fn from(input: CastInput) -> Self {
        Cast {
            hash: input.hash,
            text: input.text,
            embeds: input.embeds,
            parent_hash: input.parent_hash,
            author_fid: input.author_fid,
        }
    }
}

pub async fn execute(args: BatchArgs, config_path: Option<PathBuf>) -> Result<()> {
    let mut config = AppConfig::load(config_path.as_deref()).unwrap_or_default();

    if let Some(batch_size) = args.batch_size {
        config.batch.batch_size = batch_size;
    }
    if let Some(delay_ms) = args.delay_ms {
        config.batch.delay_ms = delay_ms;
    }

    let casts = read_casts(&args.input)?;
    if casts.is_empty() {
        println!("No casts in input file, nothing to do.");
        return Ok(());
    }

    let table = match args.table.as_str() {
        "curated" => CastTable::Curated,
        "replies" => CastTable::Replies,
        other => bail!("Unknown table: {} (expected curated or replies)", other),
    };

    let (stores, writer) = build_stores(&config, table, args.dry_run).await?;

    let source = build_cast_source(&config);
    let analyzer = build_analyzer(&config, source, stores)?;

    let orchestrator = BatchOrchestrator::new(
        analyzer,
        writer,
        Arc::new(SystemClock),
        config.batch_config(),
    );

    tracing::info!(
        total = casts.len(),
        batch_size = config.batch.batch_size,
        dry_run = args.dry_run,
        "Starting batch analysis"
    );

    let report = orchestrator.run(casts).await;

    if args.json {
        println!(
            "{}",
            serde_json::json!({
                "processed": report.processed,
                "failed": report.failed,
            })
        );
    } else {
        println!("Batch complete: {} scored, {} failed", report.processed, report.failed);
    }

    Ok(())
}

fn read_casts(path: &PathBuf) -> Result<Vec<Cast>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read input file: {}", path.display()))?;

    let inputs: Vec<CastInput> =
        serde_json::from_str(&content).context("Input file is not a JSON array of casts")?;

    Ok(inputs.into_iter().map(Cast::from).collect())
}

async fn build_stores(
    config: &AppConfig,
    table: CastTable,
    dry_run: bool,
) -> Result<(Vec<Arc<dyn ScoreStore>>, Arc<dyn ScoreWriter>)> {
    if dry_run {
        let store = Arc::new(InMemoryScoreStore::default());
        return Ok((vec![store.clone()], store));
    }

    let (curated, replies) = SqliteScoreStore::open_pair(&config.general.db_path)
        .await
        .context("Failed to open score database")?;

    let writer: Arc<dyn ScoreWriter> = match table {
        CastTable::Curated => Arc::new(curated.clone()),
        CastTable::Replies => Arc::new(replies.clone()),
    };

    Ok((vec![Arc::new(curated), Arc::new(replies)], writer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_read_casts_parses_minimal_records() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"hash": "0xa", "text": "first"}}, {{"hash": "0xb", "text": "second", "parent_hash": "0xa"}}]"#
        )
        .unwrap();

        let casts = read_casts(&file.path().to_path_buf()).unwrap();
        assert_eq!(casts.len(), 2);
        assert_eq!(casts[0].hash, "0xa");
        assert_eq!(casts[1].parent_hash.as_deref(), Some("0xa"));
    }

    #[test]
    fn test_read_casts_rejects_non_array() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"hash": "0xa"}}"#).unwrap();

        assert!(read_casts(&file.path().to_path_buf()).is_err());
    }
}
