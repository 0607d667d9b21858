//! TMDB API HTTP client

use crate::error::{Result, TmdbError};
use crate::types::*;
use moka::future::Cache;
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Connection settings for [`TmdbClient`]
#[derive(Debug, Clone)]
pub struct TmdbConfig {
    pub base_url: String,
    /// v4 read access token, sent as a bearer token
    pub api_key: String,
    pub timeout: Duration,
    /// How long successful responses are reused
    pub cache_ttl: Duration,
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            base_url: TmdbClient::DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
            timeout: Duration::from_secs(30),
            cache_ttl: Duration::from_secs(600),
        }
    }
}

/// Client for the TMDB v3 API
pub struct TmdbClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    cache: Cache<String, Value>,
}

impl TmdbClient {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.themoviedb.org/3";

    pub fn new(config: TmdbConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            warn!("TMDB API key is not set; requests will be rejected by the API");
        }

        let http = reqwest::Client::builder().timeout(config.timeout).build()?;

        let cache = Cache::builder()
            .max_capacity(1_000)
            .time_to_live(config.cache_ttl)
            .build();

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
            cache,
        })
    }

    fn url(&self, endpoint: &str, params: &[(&str, String)]) -> String {
        let mut url = format!("{}{}", self.base_url, endpoint);
        for (i, (name, value)) in params.iter().enumerate() {
            url.push(if i == 0 { '?' } else { '&' });
            url.push_str(name);
            url.push('=');
            url.push_str(&urlencoding::encode(value));
        }
        url
    }

    async fn fetch_json(&self, url: &str) -> Result<Value> {
        debug!(url = %url, "TMDB request");

        let response = self
            .http
            .get(url)
            .bearer_auth(&self.api_key)
            .header(CONTENT_TYPE, "application/json;charset=utf-8")
            .send()
            .await
            .map_err(|e| {
                error!(url = %url, error = %e, "TMDB request failed");
                TmdbError::Http(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .ok()
                .and_then(|b| b.status_message)
                .unwrap_or(body);
            error!(url = %url, status = status.as_u16(), message = %message, "TMDB returned an error");
            return Err(TmdbError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }

    /// GET an endpoint, reusing a cached body when one is fresh
    async fn get<T: DeserializeOwned>(&self, endpoint: &str, params: &[(&str, String)]) -> Result<T> {
        let url = self.url(endpoint, params);

        let value = match self.cache.get(&url).await {
            Some(value) => value,
            None => {
                let value = self.fetch_json(&url).await?;
                self.cache.insert(url, value.clone()).await;
                value
            }
        };

        Ok(serde_json::from_value(value)?)
    }

    /// Check that the API is reachable and the key is accepted.
    ///
    /// Never cached; failures are reported in the status rather than as errors.
    pub async fn test_connection(&self) -> ConnectionStatus {
        let url = self.url("/configuration", &[]);
        let configuration = match self.fetch_json(&url).await {
            Ok(value) => serde_json::from_value::<ApiConfiguration>(value).ok(),
            Err(_) => None,
        };

        match configuration.and_then(|c| c.images) {
            Some(images) => ConnectionStatus {
                success: true,
                message: "Successfully connected to TMDB API".to_string(),
                images: Some(images),
            },
            None => ConnectionStatus {
                success: false,
                message: "Failed to connect to TMDB API. Check your API key and connection."
                    .to_string(),
                images: None,
            },
        }
    }

    // Movies

    pub async fn search_movies(&self, query: &str, page: u32) -> Result<Paged<Movie>> {
        self.get(
            "/search/movie",
            &[("query", query.to_string()), ("page", page.to_string())],
        )
        .await
    }

    pub async fn get_movie_details(&self, movie_id: u64) -> Result<Movie> {
        self.get(&format!("/movie/{}", movie_id), &[]).await
    }

    pub async fn get_popular_movies(&self, page: u32) -> Result<Paged<Movie>> {
        self.get("/movie/popular", &[("page", page.to_string())])
            .await
    }

    pub async fn get_movie_credits(&self, movie_id: u64) -> Result<Credits> {
        self.get(&format!("/movie/{}/credits", movie_id), &[]).await
    }

    pub async fn get_similar_movies(&self, movie_id: u64, page: u32) -> Result<Paged<Movie>> {
        self.get(
            &format!("/movie/{}/similar", movie_id),
            &[("page", page.to_string())],
        )
        .await
    }

    // TV shows

    pub async fn search_tv_shows(&self, query: &str, page: u32) -> Result<Paged<TvShow>> {
        self.get(
            "/search/tv",
            &[("query", query.to_string()), ("page", page.to_string())],
        )
        .await
    }

    pub async fn get_tv_show_details(&self, tv_id: u64) -> Result<TvShow> {
        self.get(&format!("/tv/{}", tv_id), &[]).await
    }

    pub async fn get_popular_tv_shows(&self, page: u32) -> Result<Paged<TvShow>> {
        self.get("/tv/popular", &[("page", page.to_string())]).await
    }

    pub async fn get_tv_show_credits(&self, tv_id: u64) -> Result<Credits> {
        self.get(&format!("/tv/{}/credits", tv_id), &[]).await
    }

    pub async fn get_similar_tv_shows(&self, tv_id: u64, page: u32) -> Result<Paged<TvShow>> {
        self.get(
            &format!("/tv/{}/similar", tv_id),
            &[("page", page.to_string())],
        )
        .await
    }

    /// Season summaries embedded in the show details
    pub async fn get_tv_show_seasons(&self, tv_id: u64) -> Result<Vec<Season>> {
        Ok(self.get_tv_show_details(tv_id).await?.seasons)
    }

    pub async fn get_season_details(&self, tv_id: u64, season_number: u32) -> Result<Season> {
        self.get(&format!("/tv/{}/season/{}", tv_id, season_number), &[])
            .await
    }

    pub async fn get_episode_details(
        &self,
        tv_id: u64,
        season_number: u32,
        episode_number: u32,
    ) -> Result<Episode> {
        self.get(
            &format!(
                "/tv/{}/season/{}/episode/{}",
                tv_id, season_number, episode_number
            ),
            &[],
        )
        .await
    }
}
