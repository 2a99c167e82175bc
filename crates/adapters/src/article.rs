//! Long-form article fetcher
//!
//! Detects links to known long-form publishing platforms by host and
//! fetches their content through a metadata endpoint returning
//! `{title?, staticHtml?, markdown?}`.

use async_trait::async_trait;
use castscore_domain::{Article, ArticleError, ArticleFetcher};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

/// Hosts treated as long-form platforms by default
pub const DEFAULT_ARTICLE_HOSTS: [&str; 2] = ["paragraph.xyz", "mirror.xyz"];

/// HTTP article fetcher backed by a content-metadata service
pub struct HttpArticleFetcher {
    client: Client,
    base_url: String,
    hosts: Vec<String>,
}

impl HttpArticleFetcher {
    pub fn new(base_url: String) -> Self {
        Self::with_hosts(
            base_url,
            DEFAULT_ARTICLE_HOSTS.iter().map(|h| h.to_string()).collect(),
        )
    }

    pub fn with_hosts(base_url: String, hosts: Vec<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url,
            hosts,
        }
    }
}

#[derive(Deserialize)]
struct MetadataResponse {
    title: Option<String>,
    #[serde(rename = "staticHtml")]
    static_html: Option<String>,
    markdown: Option<String>,
}

#[async_trait]
impl ArticleFetcher for HttpArticleFetcher {
    fn is_article_url(&self, url: &str) -> bool {
        let Some(host) = host_of(url) else {
            return false;
        };
        self.hosts
            .iter()
            .any(|h| host == *h || host.ends_with(&format!(".{h}")))
    }

    async fn fetch_article(&self, url: &str) -> Result<Option<Article>, ArticleError> {
        let request_url = format!("{}/metadata", self.base_url);

        let response = self
            .client
            .get(&request_url)
            .query(&[("url", url)])
            .send()
            .await
            .map_err(|e| ArticleError::Fetch(e.to_string()))?;

        if response.status() == 404 {
            return Ok(None);
        }

        if !response.status().is_success() {
            return Err(ArticleError::Fetch(format!(
                "Metadata endpoint returned {}",
                response.status()
            )));
        }

        let metadata: MetadataResponse = response
            .json()
            .await
            .map_err(|e| ArticleError::InvalidPayload(e.to_string()))?;

        // Prefer markdown; fall back to the static HTML body
        let body = metadata.markdown.or(metadata.static_html);
        if metadata.title.is_none() && body.is_none() {
            return Ok(None);
        }

        Ok(Some(Article {
            title: metadata.title,
            markdown: body,
        }))
    }
}

fn host_of(url: &str) -> Option<&str> {
    let rest = url.strip_prefix("https://").or_else(|| url.strip_prefix("http://"))?;
    let end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    let host = &rest[..end];
    if host.is_empty() { None } else { Some(host) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_article_url_detection() {
        let fetcher = HttpArticleFetcher::new("http://localhost".to_string());

        assert!(fetcher.is_article_url("https://paragraph.xyz/@author/slug"));
        assert!(fetcher.is_article_url("https://mirror.xyz/author.eth/abc"));
        assert!(fetcher.is_article_url("https://blog.paragraph.xyz/post"));
        assert!(!fetcher.is_article_url("https://example.com/paragraph.xyz"));
        assert!(!fetcher.is_article_url("https://warpcast.com/~/cast/0xabc"));
        assert!(!fetcher.is_article_url("not a url"));
    }

    #[tokio::test]
    async fn test_fetch_article_prefers_markdown() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/metadata"))
            .and(query_param("url", "https://paragraph.xyz/@a/post"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "title": "On Feeds",
                "staticHtml": "<p>html body</p>",
                "markdown": "markdown body"
            })))
            .mount(&server)
            .await;

        let fetcher = HttpArticleFetcher::new(server.uri());
        let article = fetcher
            .fetch_article("https://paragraph.xyz/@a/post")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(article.title.as_deref(), Some("On Feeds"));
        assert_eq!(article.markdown.as_deref(), Some("markdown body"));
    }

    #[tokio::test]
    async fn test_fetch_article_404_is_none() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/metadata"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let fetcher = HttpArticleFetcher::new(server.uri());
        let article = fetcher
            .fetch_article("https://paragraph.xyz/@a/missing")
            .await
            .unwrap();

        assert!(article.is_none());
    }

    #[tokio::test]
    async fn test_fetch_article_server_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/metadata"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let fetcher = HttpArticleFetcher::new(server.uri());
        let result = fetcher.fetch_article("https://paragraph.xyz/@a/post").await;

        assert!(matches!(result, Err(ArticleError::Fetch(_))));
    }
}
