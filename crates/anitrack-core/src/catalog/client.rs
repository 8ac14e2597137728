//! Top-anime API client
//!
//! Fetches the ranked list from a Jikan-compatible endpoint. The response
//! is a JSON object with a `data` array; each element carries `mal_id`,
//! `title` and `images.jpg.image_url`.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{CatalogError, CatalogSource};
use crate::models::CatalogItem;

const USER_AGENT: &str = concat!("anitrack/", env!("CARGO_PKG_VERSION"));

/// HTTP client for the top-anime endpoint
#[derive(Debug, Clone)]
pub struct RemoteCatalogClient {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct TopAnimeResponse {
    data: Vec<ApiAnime>,
}

#[derive(Debug, Deserialize)]
struct ApiAnime {
    mal_id: i64,
    title: String,
    #[serde(default)]
    images: Option<ApiImages>,
    #[serde(default)]
    rank: Option<u32>,
    #[serde(default)]
    score: Option<f64>,
    #[serde(default)]
    episodes: Option<u32>,
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiImages {
    #[serde(default)]
    jpg: Option<ApiImage>,
}

#[derive(Debug, Deserialize)]
struct ApiImage {
    #[serde(default)]
    image_url: Option<String>,
}

impl From<ApiAnime> for CatalogItem {
    fn from(anime: ApiAnime) -> Self {
        let image_url = anime
            .images
            .and_then(|i| i.jpg)
            .and_then(|j| j.image_url)
            .unwrap_or_default();

        Self {
            mal_id: anime.mal_id,
            title: anime.title,
            image_url,
            rank: anime.rank,
            score: anime.score,
            episodes: anime.episodes,
            url: anime.url,
        }
    }
}

impl RemoteCatalogClient {
    /// Create a client for `url`
    pub fn new(url: &str, timeout: Duration) -> Result<Self, CatalogError> {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(CatalogError::InvalidUrl(url.to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| CatalogError::Request(e.to_string()))?;

        Ok(Self {
            client,
            url: url.to_string(),
            timeout,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Map request errors to user-friendly messages
    fn map_request_error(&self, error: reqwest::Error) -> CatalogError {
        if error.is_timeout() {
            CatalogError::Timeout(self.timeout.as_secs())
        } else if error.is_connect() {
            CatalogError::Connect(self.url.clone())
        } else {
            CatalogError::Request(error.to_string())
        }
    }
}

#[async_trait]
impl CatalogSource for RemoteCatalogClient {
    async fn fetch_top(&self) -> Result<Vec<CatalogItem>, CatalogError> {
        debug!("Fetching catalog from {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        let status = response.status();
        if !status.is_success() {
            warn!("Catalog request returned HTTP {}", status.as_u16());
            return Err(CatalogError::Status(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| self.map_request_error(e))?;

        let items = parse_top_anime(&body)?;
        debug!("Fetched {} catalog items", items.len());
        Ok(items)
    }
}

/// Parse a top-anime response body, keeping API order
pub fn parse_top_anime(body: &str) -> Result<Vec<CatalogItem>, CatalogError> {
    let response: TopAnimeResponse =
        serde_json::from_str(body).map_err(|e| CatalogError::Parse(e.to_string()))?;

    Ok(response.data.into_iter().map(CatalogItem::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "pagination": {"last_visible_page": 1, "has_next_page": false},
        "data": [
            {
                "mal_id": 52991,
                "url": "https://myanimelist.net/anime/52991/Sousou_no_Frieren",
                "images": {"jpg": {"image_url": "https://cdn.example/frieren.jpg"}},
                "title": "Sousou no Frieren",
                "episodes": 28,
                "score": 9.3,
                "rank": 1
            },
            {
                "mal_id": 1,
                "images": {"jpg": {"image_url": "x"}},
                "title": "Naruto"
            },
            {
                "mal_id": 7,
                "title": "No Poster",
                "images": {}
            }
        ]
    }"#;

    #[test]
    fn test_parse_keeps_order_and_fields() {
        let items = parse_top_anime(SAMPLE).unwrap();
        assert_eq!(items.len(), 3);

        assert_eq!(items[0].mal_id, 52991);
        assert_eq!(items[0].title, "Sousou no Frieren");
        assert_eq!(items[0].image_url, "https://cdn.example/frieren.jpg");
        assert_eq!(items[0].rank, Some(1));
        assert_eq!(items[0].episodes, Some(28));

        assert_eq!(items[1].title, "Naruto");
        assert_eq!(items[1].image_url, "x");
        assert!(items[1].rank.is_none());
    }

    #[test]
    fn test_parse_missing_image_is_empty() {
        let items = parse_top_anime(SAMPLE).unwrap();
        assert_eq!(items[2].image_url, "");
    }

    #[test]
    fn test_parse_rejects_missing_data() {
        let err = parse_top_anime(r#"{"status": 429}"#).unwrap_err();
        assert!(matches!(err, CatalogError::Parse(_)));
    }

    #[test]
    fn test_parse_empty_data() {
        assert!(parse_top_anime(r#"{"data": []}"#).unwrap().is_empty());
    }

    #[test]
    fn test_reject_non_http_url() {
        let err = RemoteCatalogClient::new("ftp://example.com", Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidUrl(_)));

        assert!(RemoteCatalogClient::new("https://api.jikan.moe/v4/top/anime", Duration::from_secs(1)).is_ok());
    }
}
