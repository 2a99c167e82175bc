//! Heuristic pre-filter: deterministic caps for trivially low-effort content
//!
//! These rules run before the external scorer (to skip the call entirely)
//! and again afterwards (to clamp whatever the scorer returned). They are
//! clamps, never raises: trivial content cannot score high regardless of
//! model output.

use crate::model::Category;

/// Named, overridable heuristic thresholds.
///
/// The numeric values are product-tuning constants carried over from the
/// original deployment; they have no documented derivation and are kept
/// configurable rather than baked in.
#[derive(Debug, Clone)]
pub struct HeuristicConfig {
    /// Cap for text with no letters or digits at all
    pub symbol_only_cap: u8,
    /// Cap for stock greeting casts ("gm" and friends)
    pub greeting_cap: u8,
    /// Cap for very short text
    pub short_text_cap: u8,
    /// Word count at or under which text counts as very short
    pub short_text_max_words: usize,
    /// Character count at or under which text counts as very short
    pub short_text_max_chars: usize,
    /// Neutral default when there is nothing to evaluate
    pub neutral_score: u8,
    /// Minimum composed content length worth analyzing
    pub min_content_chars: usize,
}

impl Default for HeuristicConfig {
    fn default() -> Self {
        Self {
            symbol_only_cap: 5,
            greeting_cap: 5,
            short_text_cap: 20,
            short_text_max_words: 3,
            short_text_max_chars: 30,
            neutral_score: 50,
            min_content_chars: 10,
        }
    }
}

/// Stock low-effort greetings common on the network
const TRIVIAL_GREETINGS: [&str; 5] = ["gm", "gn", "gmgm", "lfg", "wagmi"];

impl HeuristicConfig {
    /// Score cap for the cast's raw text, if one of the trivial-content
    /// rules applies. Rules only ever lower scores.
    pub fn score_cap(&self, text: &str) -> Option<u8> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }

        if !trimmed.chars().any(|c| c.is_alphanumeric()) {
            return Some(self.symbol_only_cap);
        }

        let words: Vec<&str> = trimmed.split_whitespace().collect();
        let all_greetings = words
            .iter()
            .all(|w| TRIVIAL_GREETINGS.contains(&w.to_lowercase().trim_matches('!')));
        if all_greetings {
            return Some(self.greeting_cap);
        }

        if words.len() <= self.short_text_max_words && trimmed.len() <= self.short_text_max_chars {
            return Some(self.short_text_cap);
        }

        None
    }

    /// Clamp a scorer-returned score against the applicable cap
    pub fn clamp(&self, text: &str, score: u8) -> u8 {
        match self.score_cap(text) {
            Some(cap) => score.min(cap),
            None => score,
        }
    }

    /// Fixed neutral result for content too thin to evaluate
    pub fn neutral_result(&self) -> crate::model::AnalysisResult {
        crate::model::AnalysisResult::new(self.neutral_score, Category::Other)
    }
}

/// Thresholds for scoring the commentary a quote adds, plus the
/// adjustment math for quotes of unrelated casts.
#[derive(Debug, Clone)]
pub struct AdjustmentConfig {
    /// Score for a parent-quote with no commentary at all
    pub empty_commentary_score: u8,
    /// Score for commentary with no letters or digits
    pub symbol_commentary_score: u8,
    /// Score for very short commentary
    pub short_commentary_score: u8,
    /// Word count at or under which commentary counts as trivial
    pub commentary_max_words: usize,
    /// Character count at or under which commentary counts as trivial
    pub commentary_max_chars: usize,
    /// Base adjustment applied to every unrelated-cast quote
    pub base_adjustment: i32,
    /// Lower clamp on the scorer's adjustment delta
    pub adjustment_min: i32,
    /// Upper clamp on the scorer's adjustment delta
    pub adjustment_max: i32,
}

impl Default for AdjustmentConfig {
    fn default() -> Self {
        Self {
            empty_commentary_score: 0,
            symbol_commentary_score: 5,
            short_commentary_score: 10,
            commentary_max_words: 2,
            commentary_max_chars: 30,
            base_adjustment: -10,
            adjustment_min: -30,
            adjustment_max: 10,
        }
    }
}

impl AdjustmentConfig {
    /// Fixed commentary score if one of the triviality rules applies
    pub fn trivial_commentary_score(&self, commentary: &str) -> Option<u8> {
        let trimmed = commentary.trim();
        if trimmed.is_empty() {
            return Some(self.empty_commentary_score);
        }
        if !trimmed.chars().any(|c| c.is_alphanumeric()) {
            return Some(self.symbol_commentary_score);
        }
        let words = trimmed.split_whitespace().count();
        if words <= self.commentary_max_words && trimmed.len() <= self.commentary_max_chars {
            return Some(self.short_commentary_score);
        }
        None
    }

    /// Whether commentary is below the thresholds that justify a scorer call
    pub fn is_trivial_commentary(&self, commentary: &str) -> bool {
        self.trivial_commentary_score(commentary).is_some()
    }

    /// Clamp a scorer-returned adjustment delta to the allowed range
    pub fn clamp_delta(&self, delta: i32) -> i32 {
        delta.clamp(self.adjustment_min, self.adjustment_max)
    }

    /// Combine the referenced cast's score with the total adjustment
    pub fn apply(&self, referenced_score: u8, delta: i32) -> u8 {
        let total = self.base_adjustment + delta;
        let adjusted = i32::from(referenced_score) + total;
        adjusted.clamp(0, 100) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_only_cap() {
        let config = HeuristicConfig::default();
        assert_eq!(config.score_cap("🔥🔥🔥"), Some(5));
        assert_eq!(config.score_cap("!!! ???"), Some(5));
    }

    #[test]
    fn test_greeting_cap() {
        let config = HeuristicConfig::default();
        assert_eq!(config.score_cap("gm"), Some(5));
        assert_eq!(config.score_cap("GM!"), Some(5));
        assert_eq!(config.score_cap("gm gm"), Some(5));
        assert_eq!(config.score_cap("wagmi"), Some(5));
    }

    #[test]
    fn test_short_text_cap() {
        let config = HeuristicConfig::default();
        assert_eq!(config.score_cap("nice work anon"), Some(20));
        // Four words exceeds the word threshold
        assert_eq!(config.score_cap("this is pretty good stuff today"), None);
        // Three words but over 30 chars
        assert_eq!(
            config.score_cap("extraordinarily magnificent considerations"),
            None
        );
    }

    #[test]
    fn test_empty_text_no_cap() {
        let config = HeuristicConfig::default();
        assert_eq!(config.score_cap(""), None);
        assert_eq!(config.score_cap("   "), None);
    }

    #[test]
    fn test_clamp_never_raises() {
        let config = HeuristicConfig::default();
        assert_eq!(config.clamp("gm", 90), 5);
        assert_eq!(config.clamp("gm", 3), 3);
        assert_eq!(config.clamp("a thoughtful longer piece of writing", 90), 90);
    }

    #[test]
    fn test_trivial_commentary_ladder() {
        let config = AdjustmentConfig::default();
        assert_eq!(config.trivial_commentary_score(""), Some(0));
        assert_eq!(config.trivial_commentary_score("   "), Some(0));
        assert_eq!(config.trivial_commentary_score("!!!"), Some(5));
        assert_eq!(config.trivial_commentary_score("so true"), Some(10));
        assert_eq!(
            config.trivial_commentary_score("this adds a real counterpoint"),
            None
        );
    }

    #[test]
    fn test_adjustment_clamping() {
        let config = AdjustmentConfig::default();
        assert_eq!(config.clamp_delta(50), 10);
        assert_eq!(config.clamp_delta(-100), -30);
        assert_eq!(config.clamp_delta(0), 0);
    }

    #[test]
    fn test_apply_adjustment_floors_at_zero() {
        let config = AdjustmentConfig::default();
        // 70 - 10 (base) + 0 = 60
        assert_eq!(config.apply(70, 0), 60);
        // 5 - 10 - 30 floors at 0
        assert_eq!(config.apply(5, -30), 0);
        // Best case: base -10 + max delta +10 = no change
        assert_eq!(config.apply(70, 10), 70);
    }
}
