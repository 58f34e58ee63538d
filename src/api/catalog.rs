use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, Query},
};

use crate::{
    management::{Page, PageRequest},
    server::AppState,
    store::{HydratedArtist, HydratedTrack},
};

use super::ApiError;

pub async fn get_artist(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<HydratedArtist>, ApiError> {
    Ok(Json(state.artists.get(&id).await?))
}

pub async fn artist_tracks(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<HydratedTrack>>, ApiError> {
    Ok(Json(state.tracks.by_artist(&id, page).await?))
}

pub async fn play_track(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<HydratedTrack>, ApiError> {
    Ok(Json(state.tracks.play(&id).await?))
}
