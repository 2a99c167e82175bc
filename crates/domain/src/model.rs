//! Domain models and value objects

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// A cast (post) from the Farcaster network
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cast {
    /// Cast hash (opaque content identifier)
    pub hash: String,
    /// Raw cast text
    pub text: String,
    /// Ordered embeds attached to the cast
    #[serde(default)]
    pub embeds: Vec<Embed>,
    /// Hash of the cast this one replies to, if any
    pub parent_hash: Option<String>,
    /// Author's Farcaster ID
    pub author_fid: Option<i64>,
}

impl Cast {
    /// First quote embed's referenced hash, if the cast quotes another cast
    pub fn quoted_reference(&self) -> Option<&str> {
        self.embeds.iter().find_map(|e| match e {
            Embed::Quote { cast_hash, .. } => Some(cast_hash.as_str()),
            _ => None,
        })
    }

    /// Whether the cast quotes the cast it replies to
    pub fn quotes_own_parent(&self) -> bool {
        match (self.quoted_reference(), self.parent_hash.as_deref()) {
            (Some(quoted), Some(parent)) => quoted == parent,
            _ => false,
        }
    }
}

/// Non-text material attached to a cast
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Embed {
    /// A quoted cast, referenced by hash
    Quote {
        cast_hash: String,
        #[serde(default)]
        text: String,
    },
    /// A plain link with optional open-graph metadata
    Link {
        url: String,
        title: Option<String>,
        description: Option<String>,
    },
    /// An image attachment
    Image { alt_text: Option<String> },
    /// A long-form article on a known publishing platform
    Article {
        url: String,
        title: Option<String>,
        markdown: Option<String>,
    },
}

/// Closed set of topic categories a cast can be filed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    CryptoCritique,
    PlatformAnalysis,
    CreatorEconomy,
    ArtCulture,
    AiPhilosophy,
    CommunityCulture,
    LifeReflection,
    MarketNews,
    Playful,
    #[default]
    Other,
}

impl Category {
    pub const ALL: [Category; 10] = [
        Category::CryptoCritique,
        Category::PlatformAnalysis,
        Category::CreatorEconomy,
        Category::ArtCulture,
        Category::AiPhilosophy,
        Category::CommunityCulture,
        Category::LifeReflection,
        Category::MarketNews,
        Category::Playful,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::CryptoCritique => "crypto-critique",
            Category::PlatformAnalysis => "platform-analysis",
            Category::CreatorEconomy => "creator-economy",
            Category::ArtCulture => "art-culture",
            Category::AiPhilosophy => "ai-philosophy",
            Category::CommunityCulture => "community-culture",
            Category::LifeReflection => "life-reflection",
            Category::MarketNews => "market-news",
            Category::Playful => "playful",
            Category::Other => "other",
        }
    }

    /// Normalize free-text model output down to a member of the closed set.
    ///
    /// Lower-cases, trims, collapses whitespace to hyphens, then tries an
    /// exact slug match followed by substring matching in both directions.
    /// Anything unmatched becomes `Other`.
    pub fn parse(raw: &str) -> Category {
        let normalized = raw.trim().to_lowercase().replace(char::is_whitespace, "-");
        if normalized.is_empty() {
            return Category::Other;
        }

        for category in Category::ALL {
            if category.as_str() == normalized {
                return category;
            }
        }

        for category in Category::ALL {
            if category == Category::Other {
                continue;
            }
            let slug = category.as_str();
            if normalized.contains(slug) || slug.contains(normalized.as_str()) {
                return category;
            }
        }

        Category::Other
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one analysis pass over a cast.
///
/// Ephemeral: the pipeline returns it, persistence is the caller's job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Quality score, 0-100 inclusive
    pub quality_score: u8,
    /// Topic category (closed set)
    pub category: Category,
    /// Model-supplied reasoning, when available
    pub reasoning: Option<String>,
}

impl AnalysisResult {
    pub fn new(quality_score: u8, category: Category) -> Self {
        Self {
            quality_score,
            category,
            reasoning: None,
        }
    }

    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = Some(reasoning.into());
        self
    }
}

/// A cast as held by a score store, together with its score record.
///
/// `analyzed_at == None` means the cast is stored but not yet analyzed.
#[derive(Debug, Clone)]
pub struct StoredCast {
    pub cast: Cast,
    pub score: Option<u8>,
    pub category: Option<Category>,
    pub analyzed_at: Option<OffsetDateTime>,
}

impl StoredCast {
    /// Whether this record already carries a completed analysis
    pub fn is_scored(&self) -> bool {
        self.analyzed_at.is_some() && self.score.is_some()
    }
}

/// Recursion bound for quote-chain resolution.
///
/// `ResolvingReference` analyses never resolve quotes themselves, which
/// bounds quote-chain recursion to a single level by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisDepth {
    /// Ordinary caller-initiated analysis; quotes are resolved.
    TopLevel,
    /// Analysis of a quoted cast during resolution; quotes are not resolved.
    ResolvingReference,
}

/// Composed analyzable text plus metadata about what extraction found
#[derive(Debug, Clone, Default)]
pub struct ExtractedContent {
    /// Composed text blob handed to the scorer prompt
    pub text: String,
    /// Cast had non-empty primary text
    pub has_text: bool,
    /// Cast carried at least one image embed
    pub has_image_embeds: bool,
    /// Number of quoted-cast texts contributed
    pub quoted_texts: usize,
    /// Number of plain links contributed
    pub links: usize,
    /// Number of long-form articles contributed
    pub articles: usize,
    /// Number of image alt texts contributed
    pub image_alt_texts: usize,
}

impl ExtractedContent {
    /// Image-only content: no text and nothing but images attached
    pub fn is_image_only(&self) -> bool {
        !self.has_text
            && self.has_image_embeds
            && self.quoted_texts == 0
            && self.links == 0
            && self.articles == 0
    }
}

/// A fetched long-form article
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Article {
    pub title: Option<String>,
    pub markdown: Option<String>,
}
