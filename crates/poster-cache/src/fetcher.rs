//! Image host fetching

use crate::error::{CacheError, Result};
use crate::key::CacheKey;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

/// Source of poster bytes for cache misses
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    /// URL the payload for `key` is fetched from, recorded in its metadata
    fn source_url(&self, key: &CacheKey) -> String;

    /// Fetch the raw bytes for `key`. Any non-2xx status or transport error
    /// is a [`CacheError::UnavailableSource`].
    async fn fetch(&self, key: &CacheKey) -> Result<Vec<u8>>;
}

/// Image host location and request bound
#[derive(Debug, Clone)]
pub struct ImageHostConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for ImageHostConfig {
    fn default() -> Self {
        Self {
            base_url: "https://image.tmdb.org/t/p".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Fetches `GET <base_url>/<size>/<path>` over HTTP
pub struct HttpImageFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl HttpImageFetcher {
    pub fn new(config: ImageHostConfig) -> std::result::Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    fn source_url(&self, key: &CacheKey) -> String {
        format!("{}/{}", self.base_url, key.relative())
    }

    async fn fetch(&self, key: &CacheKey) -> Result<Vec<u8>> {
        let url = self.source_url(key);
        debug!(url = %url, "Fetching poster from image host");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| CacheError::unavailable(&url, e.to_string()))?;

        if !response.status().is_success() {
            warn!(status = %response.status(), url = %url, "Image host returned an error");
            return Err(CacheError::unavailable(
                &url,
                format!("HTTP {}", response.status().as_u16()),
            ));
        }

        let data = response
            .bytes()
            .await
            .map_err(|e| CacheError::unavailable(&url, e.to_string()))?;

        debug!(url = %url, size = data.len(), "Fetched poster");
        Ok(data.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::PosterSize;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher_for(server: &MockServer) -> HttpImageFetcher {
        HttpImageFetcher::new(ImageHostConfig {
            base_url: format!("{}/t/p/", server.uri()),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = ImageHostConfig::default();
        assert_eq!(config.base_url, "https://image.tmdb.org/t/p");
        assert_eq!(config.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_source_url() {
        let fetcher = HttpImageFetcher::new(ImageHostConfig::default()).unwrap();
        let key = CacheKey::new(PosterSize::W500, "/abc.jpg").unwrap();
        assert_eq!(
            fetcher.source_url(&key),
            "https://image.tmdb.org/t/p/w500/abc.jpg"
        );
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/t/p/w185/abc.jpg"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"jpeg-bytes".to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        let key = CacheKey::new(PosterSize::W185, "/abc.jpg").unwrap();
        let data = fetcher_for(&server).fetch(&key).await.unwrap();
        assert_eq!(data, b"jpeg-bytes");
    }

    #[tokio::test]
    async fn test_fetch_non_success_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/t/p/w500/missing.jpg"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let key = CacheKey::new(PosterSize::W500, "/missing.jpg").unwrap();
        let err = fetcher_for(&server).fetch(&key).await.unwrap_err();
        match err {
            CacheError::UnavailableSource { url, reason } => {
                assert!(url.ends_with("/t/p/w500/missing.jpg"));
                assert_eq!(reason, "HTTP 404");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_transport_error_is_unavailable() {
        let fetcher = HttpImageFetcher::new(ImageHostConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            timeout: Duration::from_secs(2),
        })
        .unwrap();

        let key = CacheKey::new(PosterSize::W500, "/abc.jpg").unwrap();
        let err = fetcher.fetch(&key).await.unwrap_err();
        assert!(matches!(err, CacheError::UnavailableSource { .. }));
    }
}
