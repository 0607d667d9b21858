//! Data types for TMDB API responses
//!
//! Fields mirror the v3 API. Most are optional because list endpoints return
//! a subset of what detail endpoints do.

use serde::{Deserialize, Serialize};

/// Paginated list response (`/search/*`, `/movie/popular`, `/similar`, ...)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paged<T> {
    #[serde(default)]
    pub page: u32,
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Genre {
    pub id: u64,
    pub name: String,
}

/// A movie from `/movie/{id}` or any movie list endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Movie {
    pub id: u64,
    pub title: Option<String>,
    pub original_title: Option<String>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub release_date: Option<String>,
    pub vote_average: Option<f64>,
    pub vote_count: Option<u64>,
    pub popularity: Option<f64>,
    // Detail-only fields
    pub runtime: Option<u32>,
    pub tagline: Option<String>,
    pub status: Option<String>,
    pub imdb_id: Option<String>,
    #[serde(default)]
    pub genres: Vec<Genre>,
}

/// A TV show from `/tv/{id}` or any TV list endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TvShow {
    pub id: u64,
    pub name: Option<String>,
    pub original_name: Option<String>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub first_air_date: Option<String>,
    pub vote_average: Option<f64>,
    pub vote_count: Option<u64>,
    pub popularity: Option<f64>,
    // Detail-only fields
    pub number_of_seasons: Option<u32>,
    pub number_of_episodes: Option<u32>,
    pub status: Option<String>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub seasons: Vec<Season>,
}

/// A season, either as embedded in `/tv/{id}` or from
/// `/tv/{id}/season/{n}` (which adds `episodes`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Season {
    pub id: u64,
    pub name: Option<String>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub season_number: Option<u32>,
    pub air_date: Option<String>,
    pub episode_count: Option<u32>,
    #[serde(default)]
    pub episodes: Vec<Episode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Episode {
    pub id: u64,
    pub name: Option<String>,
    pub overview: Option<String>,
    pub still_path: Option<String>,
    pub episode_number: Option<u32>,
    pub season_number: Option<u32>,
    pub air_date: Option<String>,
    pub vote_average: Option<f64>,
    pub vote_count: Option<u64>,
    pub runtime: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CastMember {
    pub id: u64,
    pub name: Option<String>,
    pub character: Option<String>,
    pub profile_path: Option<String>,
    pub order: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrewMember {
    pub id: u64,
    pub name: Option<String>,
    pub job: Option<String>,
    pub department: Option<String>,
    pub profile_path: Option<String>,
}

/// Cast and crew from `/movie/{id}/credits` and `/tv/{id}/credits`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Credits {
    pub id: Option<u64>,
    #[serde(default)]
    pub cast: Vec<CastMember>,
    #[serde(default)]
    pub crew: Vec<CrewMember>,
}

/// Image host details from `/configuration`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImagesConfiguration {
    pub base_url: Option<String>,
    pub secure_base_url: Option<String>,
    #[serde(default)]
    pub poster_sizes: Vec<String>,
    #[serde(default)]
    pub backdrop_sizes: Vec<String>,
    #[serde(default)]
    pub still_sizes: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiConfiguration {
    pub images: Option<ImagesConfiguration>,
}

/// Outcome of [`crate::TmdbClient::test_connection`]
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionStatus {
    pub success: bool,
    pub message: String,
    pub images: Option<ImagesConfiguration>,
}

/// Error body returned by the API alongside non-2xx statuses
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub status_message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movie_list_deserialization() {
        let json = r#"{
            "page": 1,
            "results": [
                {
                    "id": 603,
                    "title": "The Matrix",
                    "original_title": "The Matrix",
                    "overview": "Set in the 22nd century...",
                    "poster_path": "/f89U3ADr1oiB1s9GkdPOEpXUk5H.jpg",
                    "backdrop_path": null,
                    "release_date": "1999-03-30",
                    "vote_average": 8.2,
                    "vote_count": 24000,
                    "popularity": 70.5,
                    "genre_ids": [28, 878]
                }
            ],
            "total_pages": 1,
            "total_results": 1
        }"#;

        let page: Paged<Movie> = serde_json::from_str(json).unwrap();
        assert_eq!(page.results.len(), 1);
        let movie = &page.results[0];
        assert_eq!(movie.id, 603);
        assert_eq!(movie.title.as_deref(), Some("The Matrix"));
        assert!(movie.backdrop_path.is_none());
        assert!(movie.genres.is_empty());
    }

    #[test]
    fn test_tv_details_with_seasons() {
        let json = r#"{
            "id": 1399,
            "name": "Game of Thrones",
            "first_air_date": "2011-04-17",
            "number_of_seasons": 8,
            "number_of_episodes": 73,
            "status": "Ended",
            "genres": [{"id": 18, "name": "Drama"}],
            "seasons": [
                {"id": 3624, "name": "Season 1", "season_number": 1, "episode_count": 10, "air_date": "2011-04-17", "poster_path": "/s1.jpg"}
            ]
        }"#;

        let show: TvShow = serde_json::from_str(json).unwrap();
        assert_eq!(show.number_of_seasons, Some(8));
        assert_eq!(show.seasons.len(), 1);
        assert_eq!(show.seasons[0].episode_count, Some(10));
        assert!(show.seasons[0].episodes.is_empty());
    }

    #[test]
    fn test_empty_page_defaults() {
        let page: Paged<Movie> = serde_json::from_str("{}").unwrap();
        assert_eq!(page.page, 0);
        assert!(page.results.is_empty());
    }

    #[test]
    fn test_credits_deserialization() {
        let json = r#"{
            "id": 603,
            "cast": [{"id": 6384, "name": "Keanu Reeves", "character": "Neo", "order": 0}],
            "crew": [{"id": 9339, "name": "Lilly Wachowski", "job": "Director", "department": "Directing"}]
        }"#;

        let credits: Credits = serde_json::from_str(json).unwrap();
        assert_eq!(credits.cast[0].character.as_deref(), Some("Neo"));
        assert_eq!(credits.crew[0].job.as_deref(), Some("Director"));
    }
}
