use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Serialize;
use tmdb_client::{
    format_episode, format_season, format_tv_show, Credits, Episode, EpisodeRecord, Paged, Season,
    SeasonRecord, TvShow, TvShowRecord,
};
use tracing::warn;

use super::{ListResponse, PageParams, SearchParams};
use crate::error::AppError;
use crate::state::{AppState, SharedState};

const POPULAR_LIMIT: usize = 12;

#[derive(Serialize)]
pub struct TvShowView {
    #[serde(flatten)]
    pub show: TvShowRecord,
    pub poster_url: Option<String>,
}

#[derive(Serialize)]
pub struct SeasonView {
    #[serde(flatten)]
    pub season: SeasonRecord,
    pub poster_url: Option<String>,
}

#[derive(Serialize)]
pub struct EpisodeView {
    #[serde(flatten)]
    pub episode: EpisodeRecord,
    pub still_url: Option<String>,
}

#[derive(Serialize)]
pub struct TvShowDetail {
    #[serde(flatten)]
    pub show: TvShowView,
    pub genres: Vec<String>,
    pub seasons: Vec<SeasonView>,
    pub credits: Credits,
    pub similar: Vec<TvShowView>,
}

#[derive(Serialize)]
pub struct SeasonDetail {
    #[serde(flatten)]
    pub season: SeasonView,
    pub episodes: Vec<EpisodeView>,
}

fn show_view(state: &AppState, show: &TvShow) -> TvShowView {
    TvShowView {
        show: format_tv_show(show),
        poster_url: state.poster_url(show.poster_path.as_deref()),
    }
}

fn season_view(state: &AppState, season: &Season, tv_show_id: u64) -> SeasonView {
    SeasonView {
        season: format_season(season, tv_show_id),
        poster_url: state.poster_url(season.poster_path.as_deref()),
    }
}

fn episode_view(state: &AppState, episode: &Episode, tv_show_id: u64, season_id: u64) -> EpisodeView {
    EpisodeView {
        episode: format_episode(episode, tv_show_id, season_id),
        still_url: state.poster_url(episode.still_path.as_deref()),
    }
}

fn show_list(state: &AppState, page: Paged<TvShow>, limit: usize) -> ListResponse<TvShowView> {
    ListResponse {
        page: page.page,
        total_pages: page.total_pages,
        total_results: page.total_results,
        results: page
            .results
            .iter()
            .take(limit)
            .map(|show| show_view(state, show))
            .collect(),
    }
}

pub async fn popular(
    State(state): State<SharedState>,
    Query(params): Query<PageParams>,
) -> Result<Json<ListResponse<TvShowView>>, AppError> {
    let page = state.tmdb.get_popular_tv_shows(params.page()).await?;
    Ok(Json(show_list(&state, page, POPULAR_LIMIT)))
}

pub async fn search(
    State(state): State<SharedState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<ListResponse<TvShowView>>, AppError> {
    let query = params.query()?;
    let page = state.tmdb.search_tv_shows(query, params.page()).await?;
    Ok(Json(show_list(&state, page, usize::MAX)))
}

/// Show details with seasons, cast and similar shows. Credits and similar
/// shows are left empty when they fail.
pub async fn detail(
    State(state): State<SharedState>,
    Path(id): Path<u64>,
) -> Result<Json<TvShowDetail>, AppError> {
    let (show, credits, similar) = tokio::join!(
        state.tmdb.get_tv_show_details(id),
        state.tmdb.get_tv_show_credits(id),
        state.tmdb.get_similar_tv_shows(id, 1),
    );
    let show = show?;

    let credits = credits.unwrap_or_else(|e| {
        warn!(tv_id = id, error = %e, "Failed to fetch TV show credits");
        Credits::default()
    });

    let similar = match similar {
        Ok(page) => page
            .results
            .iter()
            .map(|similar| show_view(&state, similar))
            .collect(),
        Err(e) => {
            warn!(tv_id = id, error = %e, "Failed to fetch similar TV shows");
            Vec::new()
        }
    };

    Ok(Json(TvShowDetail {
        show: show_view(&state, &show),
        genres: show.genres.iter().map(|g| g.name.clone()).collect(),
        seasons: show
            .seasons
            .iter()
            .map(|season| season_view(&state, season, id))
            .collect(),
        credits,
        similar,
    }))
}

pub async fn season(
    State(state): State<SharedState>,
    Path((id, season_number)): Path<(u64, u32)>,
) -> Result<Json<SeasonDetail>, AppError> {
    let season = state.tmdb.get_season_details(id, season_number).await?;

    Ok(Json(SeasonDetail {
        season: season_view(&state, &season, id),
        episodes: season
            .episodes
            .iter()
            .map(|episode| episode_view(&state, episode, id, season.id))
            .collect(),
    }))
}

pub async fn episode(
    State(state): State<SharedState>,
    Path((id, season_number, episode_number)): Path<(u64, u32, u32)>,
) -> Result<Json<EpisodeView>, AppError> {
    // The episode record references its season by id
    let (season, episode) = tokio::join!(
        state.tmdb.get_season_details(id, season_number),
        state
            .tmdb
            .get_episode_details(id, season_number, episode_number),
    );
    let season = season?;
    let episode = episode?;

    Ok(Json(episode_view(&state, &episode, id, season.id)))
}
