//! Content extraction use case
//!
//! Pulls analyzable text out of a raw cast: primary text, quoted-cast
//! text, link metadata, image alt text, and the bodies of linked
//! long-form articles.

use std::sync::{Arc, LazyLock};

use futures::future::join_all;
use regex::Regex;

use crate::{
    model::{Cast, Embed, ExtractedContent},
    ports::ArticleFetcher,
};

static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://[^\s]+").expect("valid URL pattern")
});

/// Configuration for content extraction
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Prompt budget for each quoted cast's text
    pub quoted_text_max_chars: usize,
    /// Prompt budget for each article body
    pub article_body_max_chars: usize,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            quoted_text_max_chars: 500,
            article_body_max_chars: 2000,
        }
    }
}

/// Use case for composing a cast's analyzable content
pub struct ContentExtractor<F: ?Sized> {
    article_fetcher: Arc<F>,
    config: ExtractConfig,
}

impl<F: ArticleFetcher + ?Sized> ContentExtractor<F> {
    pub fn new(article_fetcher: Arc<F>, config: ExtractConfig) -> Self {
        Self {
            article_fetcher,
            config,
        }
    }

    /// Compose the analyzable text blob and metadata for a cast.
    ///
    /// Article fetches run concurrently; a failed fetch degrades to that
    /// embed contributing nothing.
    pub async fn extract(&self, cast: &Cast) -> ExtractedContent {
        let text = cast.text.trim();
        let mut content = ExtractedContent {
            has_text: !text.is_empty(),
            ..Default::default()
        };

        let mut parts: Vec<String> = Vec::new();
        if !text.is_empty() {
            parts.push(text.to_string());
        }

        let mut article_urls: Vec<String> = Vec::new();

        for embed in &cast.embeds {
            match embed {
                Embed::Quote { text, .. } => {
                    content.quoted_texts += 1;
                    let quoted = truncate_chars(text.trim(), self.config.quoted_text_max_chars);
                    if !quoted.is_empty() {
                        parts.push(format!("Quoted cast: \"{quoted}\""));
                    }
                }
                Embed::Link {
                    url,
                    title,
                    description,
                } => {
                    if self.article_fetcher.is_article_url(url) {
                        article_urls.push(url.clone());
                    } else {
                        content.links += 1;
                        let mut line = format!("Link: {url}");
                        if let Some(title) = title {
                            line.push_str(&format!(" | {title}"));
                        }
                        if let Some(description) = description {
                            line.push_str(&format!(" | {description}"));
                        }
                        parts.push(line);
                    }
                }
                Embed::Image { alt_text } => {
                    content.has_image_embeds = true;
                    match alt_text.as_deref().map(str::trim) {
                        Some(alt) if !alt.is_empty() => {
                            content.image_alt_texts += 1;
                            parts.push(format!("Image: {alt}"));
                        }
                        _ => parts.push("Image: [no description]".to_string()),
                    }
                }
                Embed::Article {
                    url,
                    title,
                    markdown,
                } => match markdown {
                    // Body already present, no fetch needed
                    Some(body) => {
                        content.articles += 1;
                        parts.push(self.compose_article(title.as_deref(), body));
                    }
                    None => article_urls.push(url.clone()),
                },
            }
        }

        // URLs in the raw text may be article links even when not embedded
        for found in URL_PATTERN.find_iter(&cast.text) {
            let url = found.as_str().trim_end_matches(['.', ',', ')']);
            if self.article_fetcher.is_article_url(url)
                && !article_urls.iter().any(|u| u == url)
            {
                article_urls.push(url.to_string());
            }
        }

        let fetches = article_urls
            .iter()
            .map(|url| self.article_fetcher.fetch_article(url));
        for (url, fetched) in article_urls.iter().zip(join_all(fetches).await) {
            match fetched {
                Ok(Some(article)) => {
                    content.articles += 1;
                    parts.push(self.compose_article(
                        article.title.as_deref(),
                        article.markdown.as_deref().unwrap_or_default(),
                    ));
                }
                Ok(None) => {
                    tracing::debug!(url = %url, "Article not found");
                }
                Err(error) => {
                    tracing::warn!(url = %url, error = %error, "Article fetch failed");
                }
            }
        }

        content.text = parts.join("\n\n");
        content
    }

    fn compose_article(&self, title: Option<&str>, body: &str) -> String {
        let body = truncate_chars(body.trim(), self.config.article_body_max_chars);
        match title {
            Some(title) if !title.is_empty() => format!("Article: {title}\n{body}"),
            _ => format!("Article:\n{body}"),
        }
    }
}

/// UTF-8-safe truncation to a maximum number of characters
fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((index, _)) => &s[..index],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Article;
    use crate::ports::ArticleError;
    use async_trait::async_trait;

    struct FakeArticleFetcher {
        article: Option<Article>,
        fail: bool,
    }

    #[async_trait]
    impl ArticleFetcher for FakeArticleFetcher {
        fn is_article_url(&self, url: &str) -> bool {
            url.contains("paragraph.xyz") || url.contains("mirror.xyz")
        }

        async fn fetch_article(&self, _url: &str) -> Result<Option<Article>, ArticleError> {
            if self.fail {
                return Err(ArticleError::Fetch("boom".to_string()));
            }
            Ok(self.article.clone())
        }
    }

    fn extractor(fetcher: FakeArticleFetcher) -> ContentExtractor<FakeArticleFetcher> {
        ContentExtractor::new(Arc::new(fetcher), ExtractConfig::default())
    }

    fn cast_with(text: &str, embeds: Vec<Embed>) -> Cast {
        Cast {
            hash: "0xabc".to_string(),
            text: text.to_string(),
            embeds,
            parent_hash: None,
            author_fid: None,
        }
    }

    #[tokio::test]
    async fn test_extracts_primary_text() {
        let extractor = extractor(FakeArticleFetcher {
            article: None,
            fail: false,
        });
        let content = extractor
            .extract(&cast_with("hello world, a real thought", vec![]))
            .await;

        assert!(content.has_text);
        assert_eq!(content.text, "hello world, a real thought");
    }

    #[tokio::test]
    async fn test_quoted_text_truncated() {
        let extractor = ContentExtractor::new(
            Arc::new(FakeArticleFetcher {
                article: None,
                fail: false,
            }),
            ExtractConfig {
                quoted_text_max_chars: 10,
                ..Default::default()
            },
        );

        let content = extractor
            .extract(&cast_with(
                "interesting",
                vec![Embed::Quote {
                    cast_hash: "0xdef".to_string(),
                    text: "a very long quoted cast body".to_string(),
                }],
            ))
            .await;

        assert_eq!(content.quoted_texts, 1);
        assert!(content.text.contains("Quoted cast: \"a very lon\""));
    }

    #[tokio::test]
    async fn test_article_link_fetches_body() {
        let extractor = extractor(FakeArticleFetcher {
            article: Some(Article {
                title: Some("Deep Dive".to_string()),
                markdown: Some("The full article body.".to_string()),
            }),
            fail: false,
        });

        let content = extractor
            .extract(&cast_with(
                "worth a read",
                vec![Embed::Link {
                    url: "https://paragraph.xyz/@author/post".to_string(),
                    title: None,
                    description: None,
                }],
            ))
            .await;

        assert_eq!(content.articles, 1);
        assert_eq!(content.links, 0);
        assert!(content.text.contains("Article: Deep Dive"));
        assert!(content.text.contains("The full article body."));
    }

    #[tokio::test]
    async fn test_article_fetch_failure_degrades() {
        let extractor = extractor(FakeArticleFetcher {
            article: None,
            fail: true,
        });

        let content = extractor
            .extract(&cast_with(
                "worth a read anyway",
                vec![Embed::Link {
                    url: "https://paragraph.xyz/@author/post".to_string(),
                    title: None,
                    description: None,
                }],
            ))
            .await;

        assert_eq!(content.articles, 0);
        assert_eq!(content.text, "worth a read anyway");
    }

    #[tokio::test]
    async fn test_url_in_raw_text_detected_as_article() {
        let extractor = extractor(FakeArticleFetcher {
            article: Some(Article {
                title: Some("Essay".to_string()),
                markdown: Some("Body text.".to_string()),
            }),
            fail: false,
        });

        let content = extractor
            .extract(&cast_with(
                "new essay up at https://mirror.xyz/author/essay-slug",
                vec![],
            ))
            .await;

        assert_eq!(content.articles, 1);
        assert!(content.text.contains("Article: Essay"));
    }

    #[tokio::test]
    async fn test_plain_link_contributes_metadata_only() {
        let extractor = extractor(FakeArticleFetcher {
            article: None,
            fail: false,
        });

        let content = extractor
            .extract(&cast_with(
                "check this",
                vec![Embed::Link {
                    url: "https://example.com/page".to_string(),
                    title: Some("Example Page".to_string()),
                    description: Some("A page".to_string()),
                }],
            ))
            .await;

        assert_eq!(content.links, 1);
        assert!(content.text.contains("Link: https://example.com/page | Example Page | A page"));
    }

    #[tokio::test]
    async fn test_image_alt_text_and_placeholder() {
        let extractor = extractor(FakeArticleFetcher {
            article: None,
            fail: false,
        });

        let content = extractor
            .extract(&cast_with(
                "",
                vec![
                    Embed::Image {
                        alt_text: Some("a sunset over the bay".to_string()),
                    },
                    Embed::Image { alt_text: None },
                ],
            ))
            .await;

        assert!(!content.has_text);
        assert!(content.has_image_embeds);
        assert_eq!(content.image_alt_texts, 1);
        assert!(content.text.contains("Image: a sunset over the bay"));
        assert!(content.text.contains("Image: [no description]"));
    }
}
