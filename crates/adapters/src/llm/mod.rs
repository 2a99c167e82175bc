//! External scorer adapters
//!
//! Prompt construction and response parsing for the text-scoring API,
//! plus the concrete clients.

pub mod disabled;
pub mod openai_compat;
pub mod stub;

pub use disabled::DisabledScorer;
pub use openai_compat::OpenAiCompatScorer;
pub use stub::StubScorer;

use castscore_domain::{AnalysisResult, Category};
use serde::{Deserialize, Serialize};

/// System instruction sent with every scoring call
pub const SYSTEM_INSTRUCTION: &str =
    "You are a content quality analyst for a social network. Output only valid JSON.";

/// Common scorer client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScorerConfig {
    /// Model name/ID
    pub model: String,
    /// Temperature (0.0-1.0)
    pub temperature: f64,
    /// Maximum output tokens
    pub max_tokens: u32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.3,
            max_tokens: 500,
            timeout_secs: 45,
        }
    }
}

/// Build the full-rubric content scoring prompt
pub fn build_content_prompt(text: &str, image_only: bool) -> String {
    let mut prompt = String::new();

    prompt.push_str(
        "Assess the quality of the following social post on a 0-100 scale.\n\
         High scores require original insight, depth, or craft; low scores \
         go to low-effort, throwaway, or engagement-bait content.\n\n",
    );

    prompt.push_str("## Post Content\n");
    prompt.push_str(text);
    prompt.push_str("\n\n");

    if image_only {
        prompt.push_str(
            "Note: this post is image-only with no text. Unless the image \
             description suggests exceptional original work, score it in \
             the 5-30 range.\n\n",
        );
    }

    prompt.push_str("## Categories\nPick exactly one:\n");
    for category in Category::ALL {
        prompt.push_str("- ");
        prompt.push_str(category.as_str());
        prompt.push('\n');
    }

    prompt.push_str(
        r#"
## Output Format
Respond with ONLY a JSON object matching this exact schema:
{
  "qualityScore": 0 to 100,
  "category": "one of the listed categories",
  "reasoning": "one sentence explaining the score"
}
"#,
    );

    prompt
}

/// Build the parent-quote commentary prompt (0-100 direct)
pub fn build_commentary_prompt(commentary: &str, quoted_text: &str) -> String {
    format!(
        "A user quoted their own conversation parent and added commentary.\n\
         Score ONLY the added commentary on a 0-100 scale: does it add \
         value, is it neutral, or is it noise?\n\n\
         ## Quoted Post\n{quoted_text}\n\n\
         ## Added Commentary\n{commentary}\n\n\
         ## Output Format\n\
         Respond with ONLY a JSON object:\n\
         {{\"qualityScore\": 0 to 100, \"reasoning\": \"one sentence\"}}\n"
    )
}

/// Build the unrelated-quote adjustment prompt (signed delta)
pub fn build_adjustment_prompt(commentary: &str, quoted_text: &str) -> String {
    format!(
        "A user quoted another post and added commentary. Rate how the \
         commentary changes the value of sharing the quoted post, as a \
         signed adjustment between -30 (detracts badly) and +10 (adds \
         real value). Neutral commentary is 0.\n\n\
         ## Quoted Post\n{quoted_text}\n\n\
         ## Added Commentary\n{commentary}\n\n\
         ## Output Format\n\
         Respond with ONLY a JSON object:\n\
         {{\"adjustment\": -30 to 10, \"reasoning\": \"one sentence\"}}\n"
    )
}

/// Parse a full-rubric scoring response.
///
/// Coercion rules: `qualityScore` becomes an integer clamped to [0,100]
/// (0 on missing/invalid); `category` is normalized into the closed set
/// (`other` on missing/unmatched); `reasoning` is optional.
pub fn parse_score_response(response: &str) -> Result<AnalysisResult, String> {
    let value = parse_json_payload(response)?;

    let quality_score = coerce_score(value.get("qualityScore"));
    let category = value
        .get("category")
        .and_then(|v| v.as_str())
        .map(Category::parse)
        .unwrap_or_default();
    let reasoning = value
        .get("reasoning")
        .and_then(|v| v.as_str())
        .map(str::to_string);

    Ok(AnalysisResult {
        quality_score,
        category,
        reasoning,
    })
}

/// Parse a commentary scoring response into a 0-100 score
pub fn parse_commentary_response(response: &str) -> Result<u8, String> {
    let value = parse_json_payload(response)?;
    Ok(coerce_score(value.get("qualityScore")))
}

/// Parse an adjustment response into a signed delta (0 on missing/invalid)
pub fn parse_adjustment_response(response: &str) -> Result<i32, String> {
    let value = parse_json_payload(response)?;
    let delta = match value.get("adjustment") {
        Some(v) => v
            .as_i64()
            .or_else(|| v.as_f64().map(|f| f.round() as i64))
            .or_else(|| v.as_str().and_then(|s| s.trim().parse::<i64>().ok()))
            .unwrap_or(0),
        None => 0,
    };
    Ok(delta.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32)
}

fn parse_json_payload(response: &str) -> Result<serde_json::Value, String> {
    let json_str = extract_json(response);
    serde_json::from_str(json_str).map_err(|e| format!("Failed to parse JSON: {e}"))
}

fn coerce_score(value: Option<&serde_json::Value>) -> u8 {
    let score = match value {
        Some(v) => v
            .as_i64()
            .or_else(|| v.as_f64().map(|f| f.round() as i64))
            .or_else(|| v.as_str().and_then(|s| s.trim().parse::<i64>().ok()))
            .unwrap_or(0),
        None => 0,
    };
    score.clamp(0, 100) as u8
}

/// Extract JSON from response (handles markdown code blocks)
fn extract_json(response: &str) -> &str {
    let trimmed = response.trim();

    // Check for ```json ... ``` blocks
    if let Some(start) = trimmed.find("```json") {
        if let Some(end) = trimmed[start + 7..].find("```") {
            return trimmed[start + 7..start + 7 + end].trim();
        }
    }

    // Check for ``` ... ``` blocks
    if let Some(start) = trimmed.find("```") {
        if let Some(end) = trimmed[start + 3..].find("```") {
            let content = trimmed[start + 3..start + 3 + end].trim();
            // Skip language identifier if present
            if let Some(newline) = content.find('\n') {
                let first_line = &content[..newline];
                if !first_line.starts_with('{') {
                    return content[newline + 1..].trim();
                }
            }
            return content;
        }
    }

    // Assume raw JSON
    trimmed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_raw() {
        let input = r#"{"qualityScore": 70, "category": "playful"}"#;
        assert_eq!(extract_json(input), input);
    }

    #[test]
    fn test_extract_json_code_block() {
        let input = "```json\n{\"qualityScore\": 70}\n```";
        assert_eq!(extract_json(input), r#"{"qualityScore": 70}"#);
    }

    #[test]
    fn test_extract_json_bare_code_block() {
        let input = "```\n{\"qualityScore\": 70}\n```";
        assert_eq!(extract_json(input), r#"{"qualityScore": 70}"#);
    }

    #[test]
    fn test_parse_valid_response() {
        let json = r#"{
            "qualityScore": 72,
            "category": "creator-economy",
            "reasoning": "Original analysis with specifics"
        }"#;

        let result = parse_score_response(json).unwrap();
        assert_eq!(result.quality_score, 72);
        assert_eq!(result.category, Category::CreatorEconomy);
        assert!(result.reasoning.is_some());
    }

    #[test]
    fn test_parse_clamps_out_of_range_score() {
        let json = r#"{"qualityScore": 150, "category": "Crypto Critique"}"#;
        let result = parse_score_response(json).unwrap();
        assert_eq!(result.quality_score, 100);
        assert_eq!(result.category, Category::CryptoCritique);
    }

    #[test]
    fn test_parse_missing_fields_default() {
        let result = parse_score_response("{}").unwrap();
        assert_eq!(result.quality_score, 0);
        assert_eq!(result.category, Category::Other);
        assert!(result.reasoning.is_none());
    }

    #[test]
    fn test_parse_string_score_coerced() {
        let json = r#"{"qualityScore": "64", "category": "playful"}"#;
        let result = parse_score_response(json).unwrap();
        assert_eq!(result.quality_score, 64);
    }

    #[test]
    fn test_parse_non_json_is_error() {
        assert!(parse_score_response("the post is pretty good").is_err());
    }

    #[test]
    fn test_parse_adjustment() {
        assert_eq!(
            parse_adjustment_response(r#"{"adjustment": -15}"#).unwrap(),
            -15
        );
        assert_eq!(parse_adjustment_response(r#"{}"#).unwrap(), 0);
        assert_eq!(
            parse_adjustment_response("```json\n{\"adjustment\": 8}\n```").unwrap(),
            8
        );
    }

    #[test]
    fn test_content_prompt_lists_categories() {
        let prompt = build_content_prompt("some cast text", false);
        for category in Category::ALL {
            assert!(prompt.contains(category.as_str()));
        }
        assert!(!prompt.contains("image-only"));
    }

    #[test]
    fn test_content_prompt_image_only_bias() {
        let prompt = build_content_prompt("Image: [no description]", true);
        assert!(prompt.contains("5-30"));
    }
}
