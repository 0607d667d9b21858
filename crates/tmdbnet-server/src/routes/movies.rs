use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Serialize;
use tmdb_client::{format_movie, Credits, Movie, MovieRecord, Paged};
use tracing::warn;

use super::{ListResponse, PageParams, SearchParams};
use crate::error::AppError;
use crate::state::{AppState, SharedState};

/// Number of popular movies shown on the home page
const POPULAR_LIMIT: usize = 12;

#[derive(Serialize)]
pub struct MovieView {
    #[serde(flatten)]
    pub movie: MovieRecord,
    pub poster_url: Option<String>,
}

#[derive(Serialize)]
pub struct MovieDetail {
    #[serde(flatten)]
    pub movie: MovieView,
    pub runtime: Option<u32>,
    pub tagline: Option<String>,
    pub genres: Vec<String>,
    pub credits: Credits,
    pub similar: Vec<MovieView>,
}

fn movie_view(state: &AppState, movie: &Movie) -> MovieView {
    MovieView {
        movie: format_movie(movie),
        poster_url: state.poster_url(movie.poster_path.as_deref()),
    }
}

fn movie_list(state: &AppState, page: Paged<Movie>, limit: usize) -> ListResponse<MovieView> {
    ListResponse {
        page: page.page,
        total_pages: page.total_pages,
        total_results: page.total_results,
        results: page
            .results
            .iter()
            .take(limit)
            .map(|movie| movie_view(state, movie))
            .collect(),
    }
}

pub async fn popular(
    State(state): State<SharedState>,
    Query(params): Query<PageParams>,
) -> Result<Json<ListResponse<MovieView>>, AppError> {
    let page = state.tmdb.get_popular_movies(params.page()).await?;
    Ok(Json(movie_list(&state, page, POPULAR_LIMIT)))
}

pub async fn search(
    State(state): State<SharedState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<ListResponse<MovieView>>, AppError> {
    let query = params.query()?;
    let page = state.tmdb.search_movies(query, params.page()).await?;
    Ok(Json(movie_list(&state, page, usize::MAX)))
}

/// Movie details with cast, crew and similar titles.
///
/// Only the details lookup is required; credits and similar titles are
/// left empty when they fail.
pub async fn detail(
    State(state): State<SharedState>,
    Path(id): Path<u64>,
) -> Result<Json<MovieDetail>, AppError> {
    let (movie, credits, similar) = tokio::join!(
        state.tmdb.get_movie_details(id),
        state.tmdb.get_movie_credits(id),
        state.tmdb.get_similar_movies(id, 1),
    );
    let movie = movie?;

    let credits = credits.unwrap_or_else(|e| {
        warn!(movie_id = id, error = %e, "Failed to fetch movie credits");
        Credits::default()
    });
    let similar = match similar {
        Ok(page) => page
            .results
            .iter()
            .map(|m| movie_view(&state, m))
            .collect(),
        Err(e) => {
            warn!(movie_id = id, error = %e, "Failed to fetch similar movies");
            Vec::new()
        }
    };

    Ok(Json(MovieDetail {
        movie: movie_view(&state, &movie),
        runtime: movie.runtime,
        tagline: movie.tagline.clone(),
        genres: movie.genres.iter().map(|g| g.name.clone()).collect(),
        credits,
        similar,
    }))
}
