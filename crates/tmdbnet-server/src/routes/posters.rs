use axum::extract::{Path, State};
use axum::http::{header, HeaderName};
use axum::response::{IntoResponse, Response};
use poster_cache::{PosterSize, Resolution};
use tracing::warn;

use crate::error::AppError;
use crate::state::SharedState;

static X_CACHE: HeaderName = HeaderName::from_static("x-cache");

/// Serve a poster, fetching it into the cache on a miss.
///
/// Anything short of a servable payload is a 404 so pages fall back to
/// their placeholder.
pub async fn get_poster(
    State(state): State<SharedState>,
    Path((size, path)): Path<(String, String)>,
) -> Result<Response, AppError> {
    let size: PosterSize = size
        .parse()
        .map_err(|_| AppError::BadRequest(format!("Unknown poster size: {}", size)))?;

    let resolution = state
        .cache
        .resolve(Some(&path), size, state.poster_max_age)
        .await;

    let cache_header = if resolution.is_hit() { "HIT" } else { "MISS" };
    let locator = match resolution {
        Resolution::Hit(locator) | Resolution::Fetched(locator) => locator,
        Resolution::NoImage => return Err(AppError::NotFound("No poster for this path".into())),
        Resolution::Unavailable(e) => {
            warn!(path = %path, size = %size, error = %e, "Poster unavailable");
            return Err(AppError::NotFound("Poster unavailable".into()));
        }
    };

    let data = tokio::fs::read(&locator.path).await.map_err(|e| {
        warn!(path = ?locator.path, error = %e, "Failed to read cached poster");
        AppError::NotFound("Poster unavailable".into())
    })?;

    Ok((
        [
            (header::CONTENT_TYPE, content_type_for(&path)),
            (header::CACHE_CONTROL, "public, max-age=86400"),
            (X_CACHE.clone(), cache_header),
        ],
        data,
    )
        .into_response())
}

fn content_type_for(path: &str) -> &'static str {
    let extension = path
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}
