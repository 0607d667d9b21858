//! Rust client for The Movie Database (TMDB) v3 API
//!
//! Wraps the movie and TV endpoints the application browses, and converts
//! responses into flat records for storage.
//!
//! # Example
//!
//! ```no_run
//! use tmdb_client::{format_movie, TmdbClient, TmdbConfig};
//!
//! # async fn example() -> Result<(), tmdb_client::TmdbError> {
//! let client = TmdbClient::new(TmdbConfig {
//!     api_key: std::env::var("TMDB_API_KEY").unwrap_or_default(),
//!     ..TmdbConfig::default()
//! })?;
//!
//! let popular = client.get_popular_movies(1).await?;
//! for movie in &popular.results {
//!     let record = format_movie(movie);
//!     println!("{} ({:?})", record.title, record.release_date);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # API Coverage
//!
//! - `GET /configuration`
//! - `GET /search/movie`, `/movie/{id}`, `/movie/popular`, `/movie/{id}/credits`,
//!   `/movie/{id}/similar`
//! - `GET /search/tv`, `/tv/{id}`, `/tv/popular`, `/tv/{id}/credits`,
//!   `/tv/{id}/similar`, `/tv/{id}/season/{n}`, `/tv/{id}/season/{n}/episode/{e}`

mod client;
mod error;
mod format;
mod types;

pub use client::{TmdbClient, TmdbConfig};
pub use error::{Result, TmdbError};
pub use format::{
    format_episode, format_movie, format_season, format_tv_show, parse_date, EpisodeRecord,
    MovieRecord, SeasonRecord, TvShowRecord,
};
pub use types::{
    CastMember, ConnectionStatus, Credits, CrewMember, Episode, Genre, ImagesConfiguration, Movie,
    Paged, Season, TvShow,
};
