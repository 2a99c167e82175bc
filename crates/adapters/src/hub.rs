//! Cast source adapter against a Farcaster indexer HTTP API
//!
//! Used only when neither score store already holds a quoted cast.

use async_trait::async_trait;
use castscore_domain::{Cast, CastSource, CastSourceError, Embed};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;

/// HTTP cast source for lookup-by-hash
pub struct HttpCastSource {
    client: Client,
    base_url: String,
    api_key: Option<SecretString>,
}

impl HttpCastSource {
    pub fn new(base_url: String, api_key: Option<SecretString>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url,
            api_key,
        }
    }
}

#[derive(Deserialize)]
struct CastResponse {
    hash: String,
    #[serde(default)]
    text: String,
    #[serde(default)]
    embeds: Vec<EmbedPayload>,
    #[serde(rename = "parentHash")]
    parent_hash: Option<String>,
    #[serde(rename = "authorFid")]
    author_fid: Option<i64>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum EmbedPayload {
    Quote {
        #[serde(rename = "castHash")]
        cast_hash: String,
        #[serde(default)]
        text: String,
    },
    Link {
        url: String,
        title: Option<String>,
        description: Option<String>,
    },
    Image {
        #[serde(rename = "altText")]
        alt_text: Option<String>,
    },
}

impl From<EmbedPayload> for Embed {
    fn from(payload: EmbedPayload) -> Self {
        match payload {
            EmbedPayload::Quote { cast_hash, text } => Embed::Quote { cast_hash, text },
            EmbedPayload::Link {
                url,
                title,
                description,
            } => Embed::Link {
                url,
                title,
                description,
            },
            EmbedPayload::Image { alt_text } => Embed::Image { alt_text },
        }
    }
}

impl From<CastResponse> for Cast {
    fn from(response: CastResponse) -> Self {
        Cast {
            hash: response.hash,
            text: response.text,
            embeds: response.embeds.into_iter().map(Embed::from).collect(),
            parent_hash: response.parent_hash,
            author_fid: response.author_fid,
        }
    }
}

#[async_trait]
impl CastSource for HttpCastSource {
    async fn fetch_cast(&self, cast_hash: &str) -> Result<Option<Cast>, CastSourceError> {
        let url = format!("{}/v1/casts/{}", self.base_url, cast_hash);

        let mut request = self.client.get(&url);
        if let Some(api_key) = &self.api_key {
            request = request.header("x-api-key", api_key.expose_secret());
        }

        let response = request
            .send()
            .await
            .map_err(|e| CastSourceError::Network(e.to_string()))?;

        if response.status() == 404 {
            return Ok(None);
        }

        if response.status() == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .map(Duration::from_secs);
            return Err(CastSourceError::RateLimited(retry_after));
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CastSourceError::Api(format!(
                "Cast lookup returned {status}: {body}"
            )));
        }

        let payload: CastResponse = response
            .json()
            .await
            .map_err(|e| CastSourceError::Api(e.to_string()))?;

        Ok(Some(payload.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_fetch_cast_maps_payload() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/casts/0xabc"))
            .and(header("x-api-key", "k"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "hash": "0xabc",
                "text": "quoting this",
                "parentHash": "0xparent",
                "authorFid": 99,
                "embeds": [
                    {"type": "quote", "castHash": "0xq", "text": "the original"},
                    {"type": "image", "altText": "chart"}
                ]
            })))
            .mount(&server)
            .await;

        let source = HttpCastSource::new(server.uri(), Some(SecretString::from("k")));
        let cast = source.fetch_cast("0xabc").await.unwrap().unwrap();

        assert_eq!(cast.hash, "0xabc");
        assert_eq!(cast.parent_hash.as_deref(), Some("0xparent"));
        assert_eq!(cast.author_fid, Some(99));
        assert_eq!(cast.quoted_reference(), Some("0xq"));
        assert_eq!(cast.embeds.len(), 2);
    }

    #[tokio::test]
    async fn test_fetch_cast_404_is_none() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/casts/0xmissing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let source = HttpCastSource::new(server.uri(), None);
        assert!(source.fetch_cast("0xmissing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_fetch_cast_rate_limited() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/casts/0xabc"))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "30"))
            .mount(&server)
            .await;

        let source = HttpCastSource::new(server.uri(), None);
        let error = source.fetch_cast("0xabc").await.unwrap_err();

        match error {
            CastSourceError::RateLimited(after) => {
                assert_eq!(after, Some(Duration::from_secs(30)));
            }
            other => panic!("expected rate limited, got {other:?}"),
        }
    }
}
