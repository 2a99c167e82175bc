//! Analyze command - one-shot cast scoring

use anyhow::{Context, Result, bail};
use castscore_adapters::article::HttpArticleFetcher;
use castscore_adapters::hub::HttpCastSource;
use castscore_adapters::llm::{DisabledScorer, OpenAiCompatScorer, ScorerConfig, StubScorer};
use castscore_adapters::store::{InMemoryScoreStore, SqliteScoreStore};
use castscore_domain::usecases::Analyzer;
use castscore_domain::{
    AnalysisDepth, AnalysisResult, Cast, CastSource, Clock, ScoreStore, ScoreWriter, Scorer,
    SystemClock,
};
use secrecy::SecretString;
use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::Arc;

use crate::args::AnalyzeArgs;
use crate::config::AppConfig;

pub async fn execute(args: AnalyzeArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref()).unwrap_or_default();

    let result = if let Some(ref hash) = args.hash {
        analyze_by_hash(&config, hash).await?
    } else {
        analyze_text(&config, &get_input_text(&args)?).await?
    };

    match result {
        Some(result) => print_result(&result, args.json)?,
        None => {
            if args.json {
                println!("null");
            } else {
                println!("Cast was not analyzed (scorer unavailable or failed).");
            }
        }
    }

    Ok(())
}

/// Fetch the cast from the hub, score it, and persist the result.
async fn analyze_by_hash(config: &AppConfig, hash: &str) -> Result<Option<AnalysisResult>> {
    let (curated, replies) = SqliteScoreStore::open_pair(&config.general.db_path)
        .await
        .context("Failed to open score database")?;

    let writer: Arc<dyn ScoreWriter> = Arc::new(curated.clone());
    let stores: Vec<Arc<dyn ScoreStore>> = vec![Arc::new(curated), Arc::new(replies)];

    let source = build_cast_source(config);
    let analyzer = build_analyzer(config, source.clone(), stores)?;

    let cast = source
        .fetch_cast(hash)
        .await
        .context("Failed to fetch cast from hub")?;

    let Some(cast) = cast else {
        bail!("Cast not found: {}", hash);
    };

    tracing::info!(cast_hash = %cast.hash, "Analyzing cast");

    let result = analyzer.analyze(&cast, AnalysisDepth::TopLevel).await;

    if let Some(ref result) = result {
        writer
            .record_score(&cast.hash, result, SystemClock.now())
            .await
            .context("Failed to persist score")?;
    }

    Ok(result)
}

/// Score ad-hoc text as a synthetic cast without touching the database.
async fn analyze_text(config: &AppConfig, text: &str) -> Result<Option<AnalysisResult>> {
    if text.trim().is_empty() {
        bail!("No text provided to analyze");
    }

    let stores: Vec<Arc<dyn ScoreStore>> = vec![Arc::new(InMemoryScoreStore::default())];
    let source = build_cast_source(config);
    let analyzer = build_analyzer(config, source, stores)?;

    let cast = Cast {
        hash: "cli-input".to_string(),
        text: text.to_string(),
        embeds: vec![],
        parent_hash: None,
        author_fid: None,
    };

    Ok(analyzer.analyze(&cast, AnalysisDepth::TopLevel).await)
}

pub(crate) type CliAnalyzer = Analyzer<dyn Scorer, HttpCastSource, HttpArticleFetcher>;

pub(crate) fn build_analyzer(
    config: &AppConfig,
    source: Arc<HttpCastSource>,
    stores: Vec<Arc<dyn ScoreStore>>,
) -> Result<Arc<CliAnalyzer>> {
    let scorer = build_scorer(config)?;
    let fetcher = build_article_fetcher(config);

    Ok(Arc::new(Analyzer::new(
        scorer,
        source,
        Arc::new(fetcher),
        stores,
        Arc::new(SystemClock),
        config.analyzer_config(),
    )))
}

pub(crate) fn build_cast_source(config: &AppConfig) -> Arc<HttpCastSource> {
    let api_key = std::env::var(&config.hub.api_key_env)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(|v| SecretString::new(v.into()));

    Arc::new(HttpCastSource::new(config.hub.base_url.clone(), api_key))
}

fn build_article_fetcher(config: &AppConfig) -> HttpArticleFetcher {
    if config.article.hosts.is_empty() {
        HttpArticleFetcher::new(config.article.base_url.clone())
    } else {
        HttpArticleFetcher::with_hosts(
            config.article.base_url.clone(),
            config.article.hosts.clone(),
        )
    }
}

/// Build the configured scorer. A missing credential degrades to the
/// disabled scorer rather than failing the command: every analysis then
/// reports "not analyzed".
pub(crate) fn build_scorer(config: &AppConfig) -> Result<Arc<dyn Scorer>> {
    match config.scorer.provider.as_str() {
        "openai_compat" => {
            let scorer_config = ScorerConfig {
                model: config.scorer.model.clone(),
                temperature: config.scorer.temperature,
                max_tokens: config.scorer.max_tokens,
                timeout_secs: config.scorer.timeout_secs,
            };

            match load_api_key(&config.scorer.api_key_env) {
                Ok(api_key) => Ok(Arc::new(OpenAiCompatScorer::new(
                    api_key,
                    config.scorer.base_url.clone(),
                    scorer_config,
                ))),
                Err(reason) => Ok(Arc::new(DisabledScorer::new(reason))),
            }
        }
        "stub" => Ok(Arc::new(StubScorer)),
        other => bail!("Unknown scorer provider: {}", other),
    }
}

fn load_api_key(env_var: &str) -> Result<SecretString, String> {
    if env_var.trim().is_empty() {
        return Err("No API key env var configured".to_string());
    }

    match std::env::var(env_var) {
        Ok(key) if !key.trim().is_empty() => Ok(SecretString::new(key.into())),
        _ => Err(format!("API key env var {} is not set", env_var)),
    }
}

fn print_result(result: &AnalysisResult, json: bool) -> Result<()> {
    if json {
        let out = serde_json::to_string_pretty(result).context("Failed to serialize result")?;
        println!("{}", out);
    } else {
        println!("Quality score: {}", result.quality_score);
        println!("Category:      {}", result.category);
        if let Some(ref reasoning) = result.reasoning {
            println!("Reasoning:     {}", reasoning);
        }
    }
    Ok(())
}

fn get_input_text(args: &AnalyzeArgs) -> Result<String> {
    if let Some(ref text) = args.text {
        return Ok(text.clone());
    }

    if let Some(ref path) = args.file {
        if path.as_os_str() == "-" {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read from stdin")?;
            return Ok(text);
        }

        return std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()));
    }

    // Default to stdin if no input specified
    let mut text = String::new();
    io::stdin()
        .read_to_string(&mut text)
        .context("Failed to read from stdin")?;
    Ok(text)
}
