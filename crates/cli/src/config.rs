//! Configuration loading and management

use anyhow::{Context, Result};
use castscore_domain::usecases::{AnalyzerConfig, BatchConfig, ExtractConfig};
use castscore_domain::{AdjustmentConfig, HeuristicConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub scorer: ScorerSection,

    #[serde(default)]
    pub hub: HubConfig,

    #[serde(default)]
    pub article: ArticleConfig,

    #[serde(default)]
    pub heuristics: HeuristicsSection,

    #[serde(default)]
    pub batch: BatchSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScorerSection {
    /// openai_compat or stub
    #[serde(default = "default_provider")]
    pub provider: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_scorer_base_url")]
    pub base_url: String,

    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_temperature")]
    pub temperature: f64,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubConfig {
    #[serde(default = "default_hub_base_url")]
    pub base_url: String,

    #[serde(default = "default_hub_api_key_env")]
    pub api_key_env: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleConfig {
    #[serde(default = "default_article_base_url")]
    pub base_url: String,

    /// Hosts treated as long-form article sources
    #[serde(default)]
    pub hosts: Vec<String>,
}

/// Scoring thresholds, all overridable
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeuristicsSection {
    #[serde(default = "default_symbol_only_cap")]
    pub symbol_only_cap: u8,

    #[serde(default = "default_greeting_cap")]
    pub greeting_cap: u8,

    #[serde(default = "default_short_text_cap")]
    pub short_text_cap: u8,

    #[serde(default = "default_short_text_max_words")]
    pub short_text_max_words: usize,

    #[serde(default = "default_short_text_max_chars")]
    pub short_text_max_chars: usize,

    #[serde(default = "default_neutral_score")]
    pub neutral_score: u8,

    #[serde(default = "default_min_content_chars")]
    pub min_content_chars: usize,

    #[serde(default = "default_quoted_text_max_chars")]
    pub quoted_text_max_chars: usize,

    #[serde(default = "default_article_body_max_chars")]
    pub article_body_max_chars: usize,

    #[serde(default = "default_empty_commentary_score")]
    pub empty_commentary_score: u8,

    #[serde(default = "default_symbol_commentary_score")]
    pub symbol_commentary_score: u8,

    #[serde(default = "default_short_commentary_score")]
    pub short_commentary_score: u8,

    #[serde(default = "default_commentary_max_words")]
    pub commentary_max_words: usize,

    #[serde(default = "default_commentary_max_chars")]
    pub commentary_max_chars: usize,

    #[serde(default = "default_base_adjustment")]
    pub base_adjustment: i32,

    #[serde(default = "default_adjustment_min")]
    pub adjustment_min: i32,

    #[serde(default = "default_adjustment_max")]
    pub adjustment_max: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSection {
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
}

// Default value functions
fn default_db_path() -> PathBuf {
    PathBuf::from("./castscore.sqlite")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_provider() -> String {
    "openai_compat".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_scorer_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_api_key_env() -> String {
    "CASTSCORE_API_KEY".to_string()
}

fn default_temperature() -> f64 {
    0.3
}

fn default_max_tokens() -> u32 {
    500
}

fn default_timeout() -> u64 {
    45
}

fn default_hub_base_url() -> String {
    "https://hub.example.com".to_string()
}

fn default_hub_api_key_env() -> String {
    "CASTSCORE_HUB_API_KEY".to_string()
}

fn default_article_base_url() -> String {
    "https://paragraph.xyz/api".to_string()
}

fn default_symbol_only_cap() -> u8 {
    5
}

fn default_greeting_cap() -> u8 {
    5
}

fn default_short_text_cap() -> u8 {
    20
}

fn default_short_text_max_words() -> usize {
    3
}

fn default_short_text_max_chars() -> usize {
    30
}

fn default_neutral_score() -> u8 {
    50
}

fn default_min_content_chars() -> usize {
    10
}

fn default_quoted_text_max_chars() -> usize {
    500
}

fn default_article_body_max_chars() -> usize {
    2000
}

fn default_empty_commentary_score() -> u8 {
    0
}

fn default_symbol_commentary_score() -> u8 {
    5
}

fn default_short_commentary_score() -> u8 {
    10
}

fn default_commentary_max_words() -> usize {
    2
}

fn default_commentary_max_chars() -> usize {
    30
}

fn default_base_adjustment() -> i32 {
    -10
}

fn default_adjustment_min() -> i32 {
    -30
}

fn default_adjustment_max() -> i32 {
    10
}

fn default_batch_size() -> usize {
    5
}

fn default_delay_ms() -> u64 {
    1000
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            log_level: default_log_level(),
        }
    }
}

impl Default for ScorerSection {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            base_url: default_scorer_base_url(),
            api_key_env: default_api_key_env(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout(),
        }
    }
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            base_url: default_hub_base_url(),
            api_key_env: default_hub_api_key_env(),
        }
    }
}

impl Default for ArticleConfig {
    fn default() -> Self {
        Self {
            base_url: default_article_base_url(),
            hosts: vec![],
        }
    }
}

impl Default for HeuristicsSection {
    fn default() -> Self {
        Self {
            symbol_only_cap: default_symbol_only_cap(),
            greeting_cap: default_greeting_cap(),
            short_text_cap: default_short_text_cap(),
            short_text_max_words: default_short_text_max_words(),
            short_text_max_chars: default_short_text_max_chars(),
            neutral_score: default_neutral_score(),
            min_content_chars: default_min_content_chars(),
            quoted_text_max_chars: default_quoted_text_max_chars(),
            article_body_max_chars: default_article_body_max_chars(),
            empty_commentary_score: default_empty_commentary_score(),
            symbol_commentary_score: default_symbol_commentary_score(),
            short_commentary_score: default_short_commentary_score(),
            commentary_max_words: default_commentary_max_words(),
            commentary_max_chars: default_commentary_max_chars(),
            base_adjustment: default_base_adjustment(),
            adjustment_min: default_adjustment_min(),
            adjustment_max: default_adjustment_max(),
        }
    }
}

impl Default for BatchSection {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            delay_ms: default_delay_ms(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        // Try default config path if none specified
        let default_path = PathBuf::from("./config.toml");
        let path = config_path.unwrap_or(&default_path);

        if path.exists() {
            builder = builder.add_source(config::File::from(path));
        } else if config_path.is_some() {
            // User specified a path that doesn't exist
            anyhow::bail!("Config file not found: {}", path.display());
        }

        // Add environment variable overrides
        builder = builder.add_source(
            config::Environment::with_prefix("CASTSCORE")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Map config sections into the analyzer's tuning bundle
    pub fn analyzer_config(&self) -> AnalyzerConfig {
        let h = &self.heuristics;

        let adjustment = AdjustmentConfig {
            empty_commentary_score: h.empty_commentary_score,
            symbol_commentary_score: h.symbol_commentary_score,
            short_commentary_score: h.short_commentary_score,
            commentary_max_words: h.commentary_max_words,
            commentary_max_chars: h.commentary_max_chars,
            base_adjustment: h.base_adjustment,
            adjustment_min: h.adjustment_min,
            adjustment_max: h.adjustment_max,
        };

        AnalyzerConfig {
            extract: ExtractConfig {
                quoted_text_max_chars: h.quoted_text_max_chars,
                article_body_max_chars: h.article_body_max_chars,
            },
            heuristics: HeuristicConfig {
                symbol_only_cap: h.symbol_only_cap,
                greeting_cap: h.greeting_cap,
                short_text_cap: h.short_text_cap,
                short_text_max_words: h.short_text_max_words,
                short_text_max_chars: h.short_text_max_chars,
                neutral_score: h.neutral_score,
                min_content_chars: h.min_content_chars,
            },
            adjustment,
        }
    }

    pub fn batch_config(&self) -> BatchConfig {
        BatchConfig {
            batch_size: self.batch.batch_size,
            delay_between_batches: Duration::from_millis(self.batch.delay_ms),
        }
    }

    /// Generate example configuration as TOML string
    pub fn example_toml() -> String {
        r#"# castscore configuration

[general]
db_path = "./castscore.sqlite"
log_level = "info"

[scorer]
provider = "openai_compat"  # openai_compat, stub
model = "gpt-4o-mini"
base_url = "https://api.openai.com/v1"
api_key_env = "CASTSCORE_API_KEY"
temperature = 0.3
max_tokens = 500
timeout_secs = 45

[hub]
base_url = "https://hub.example.com"
api_key_env = "CASTSCORE_HUB_API_KEY"

[article]
base_url = "https://paragraph.xyz/api"
# hosts = ["paragraph.xyz", "mirror.xyz"]

[heuristics]
symbol_only_cap = 5
greeting_cap = 5
short_text_cap = 20
short_text_max_words = 3
short_text_max_chars = 30
neutral_score = 50
min_content_chars = 10
quoted_text_max_chars = 500
article_body_max_chars = 2000
empty_commentary_score = 0
symbol_commentary_score = 5
short_commentary_score = 10
commentary_max_words = 2
commentary_max_chars = 30
base_adjustment = -10
adjustment_min = -30
adjustment_max = 10

[batch]
batch_size = 5
delay_ms = 1000
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_example_toml_parses_back_to_defaults() {
        let parsed: AppConfig = toml::from_str(&AppConfig::example_toml()).unwrap();
        assert_eq!(parsed.scorer.provider, "openai_compat");
        assert_eq!(parsed.batch.batch_size, 5);
        assert_eq!(parsed.heuristics.greeting_cap, 5);
    }

    #[test]
    fn test_analyzer_config_carries_overrides() {
        let mut config = AppConfig::default();
        config.heuristics.short_text_cap = 25;
        config.heuristics.adjustment_min = -20;

        let analyzer = config.analyzer_config();
        assert_eq!(analyzer.heuristics.short_text_cap, 25);
        assert_eq!(analyzer.adjustment.adjustment_min, -20);
    }
}
