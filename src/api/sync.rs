use std::sync::Arc;

use axum::{Extension, Json, extract::Path};
use serde::Deserialize;
use tracing::info;

use crate::{server::AppState, store::Artist, types::SpotifyArtist};

use super::ApiError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRequest {
    pub artist_ids: Vec<String>,
}

pub async fn sync_artists(
    Extension(state): Extension<Arc<AppState>>,
    Json(request): Json<SyncRequest>,
) -> Result<Json<Vec<Artist>>, ApiError> {
    info!("Sync requested for {} artists", request.artist_ids.len());
    let artists = state.engine.sync_artists(&request.artist_ids).await?;
    Ok(Json(artists))
}

pub async fn lookup_artist(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SpotifyArtist>, ApiError> {
    Ok(Json(state.catalog.get_artist(&id).await?))
}
