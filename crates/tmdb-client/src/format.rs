//! Conversion from API responses to application records

use crate::types::{Episode, Movie, Season, TvShow};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieRecord {
    pub tmdb_id: u64,
    pub title: String,
    pub overview: String,
    pub poster_path: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub vote_average: f64,
    pub vote_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TvShowRecord {
    pub tmdb_id: u64,
    pub name: String,
    pub overview: String,
    pub poster_path: Option<String>,
    pub first_air_date: Option<NaiveDate>,
    pub vote_average: f64,
    pub vote_count: u64,
    pub number_of_seasons: u32,
    pub number_of_episodes: u32,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonRecord {
    pub tmdb_id: u64,
    pub tv_show_id: u64,
    pub name: String,
    pub overview: String,
    pub poster_path: Option<String>,
    pub season_number: u32,
    pub air_date: Option<NaiveDate>,
    pub episode_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeRecord {
    pub tmdb_id: u64,
    pub tv_show_id: u64,
    pub season_id: u64,
    pub name: String,
    pub overview: String,
    pub still_path: Option<String>,
    pub episode_number: u32,
    pub season_number: u32,
    pub air_date: Option<NaiveDate>,
    pub vote_average: f64,
    pub vote_count: u64,
}

/// `YYYY-MM-DD`, anything else (including the empty string) is `None`
pub fn parse_date(raw: Option<&str>) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw?, "%Y-%m-%d").ok()
}

fn non_empty(path: &Option<String>) -> Option<String> {
    path.as_ref().filter(|p| !p.is_empty()).cloned()
}

pub fn format_movie(movie: &Movie) -> MovieRecord {
    MovieRecord {
        tmdb_id: movie.id,
        title: movie.title.clone().unwrap_or_default(),
        overview: movie.overview.clone().unwrap_or_default(),
        poster_path: non_empty(&movie.poster_path),
        release_date: parse_date(movie.release_date.as_deref()),
        vote_average: movie.vote_average.unwrap_or(0.0),
        vote_count: movie.vote_count.unwrap_or(0),
    }
}

pub fn format_tv_show(show: &TvShow) -> TvShowRecord {
    TvShowRecord {
        tmdb_id: show.id,
        name: show.name.clone().unwrap_or_default(),
        overview: show.overview.clone().unwrap_or_default(),
        poster_path: non_empty(&show.poster_path),
        first_air_date: parse_date(show.first_air_date.as_deref()),
        vote_average: show.vote_average.unwrap_or(0.0),
        vote_count: show.vote_count.unwrap_or(0),
        number_of_seasons: show.number_of_seasons.unwrap_or(0),
        number_of_episodes: show.number_of_episodes.unwrap_or(0),
        status: show.status.clone().unwrap_or_default(),
    }
}

pub fn format_season(season: &Season, tv_show_id: u64) -> SeasonRecord {
    // Season detail responses list episodes instead of carrying a count
    let episode_count = season
        .episode_count
        .unwrap_or(season.episodes.len() as u32);

    SeasonRecord {
        tmdb_id: season.id,
        tv_show_id,
        name: season.name.clone().unwrap_or_default(),
        overview: season.overview.clone().unwrap_or_default(),
        poster_path: non_empty(&season.poster_path),
        season_number: season.season_number.unwrap_or(0),
        air_date: parse_date(season.air_date.as_deref()),
        episode_count,
    }
}

pub fn format_episode(episode: &Episode, tv_show_id: u64, season_id: u64) -> EpisodeRecord {
    EpisodeRecord {
        tmdb_id: episode.id,
        tv_show_id,
        season_id,
        name: episode.name.clone().unwrap_or_default(),
        overview: episode.overview.clone().unwrap_or_default(),
        still_path: non_empty(&episode.still_path),
        episode_number: episode.episode_number.unwrap_or(0),
        season_number: episode.season_number.unwrap_or(0),
        air_date: parse_date(episode.air_date.as_deref()),
        vote_average: episode.vote_average.unwrap_or(0.0),
        vote_count: episode.vote_count.unwrap_or(0),
    }
}
