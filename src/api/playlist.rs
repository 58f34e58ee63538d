use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, Query},
    http::StatusCode,
};
use serde::Deserialize;

use crate::{
    management::{DEFAULT_PAGE_LIMIT, Page, PageRequest},
    server::AppState,
    store::{HydratedTrack, NewPlaylist, Playlist},
};

use super::ApiError;

fn default_limit() -> usize {
    DEFAULT_PAGE_LIMIT
}

fn public_by_default() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlaylistRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub owner: String,
    #[serde(default = "public_by_default")]
    pub is_public: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackChange {
    pub track_id: String,
    pub user: String,
}

/// Acting user of a write that carries no body.
#[derive(Debug, Deserialize)]
pub struct ActingUser {
    pub user: String,
}

#[derive(Debug, Deserialize)]
pub struct OwnerListing {
    pub owner: String,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub skip: usize,
}

pub async fn user_playlists(
    Extension(state): Extension<Arc<AppState>>,
    Query(listing): Query<OwnerListing>,
) -> Result<Json<Page<Playlist>>, ApiError> {
    let page = PageRequest::new(listing.limit, listing.skip);
    Ok(Json(state.playlists.owned_by(&listing.owner, page).await?))
}

pub async fn create_playlist(
    Extension(state): Extension<Arc<AppState>>,
    Json(request): Json<CreatePlaylistRequest>,
) -> Result<(StatusCode, Json<Playlist>), ApiError> {
    let playlist = state
        .playlists
        .create(NewPlaylist {
            name: request.name,
            description: request.description,
            owner: request.owner,
            is_public: request.is_public,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(playlist)))
}

pub async fn playlist_by_slug(
    Extension(state): Extension<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Json<Playlist>, ApiError> {
    Ok(Json(state.playlists.by_slug(&slug).await?))
}

pub async fn delete_playlist(
    Extension(state): Extension<Arc<AppState>>,
    Path(playlist_id): Path<String>,
    Query(acting): Query<ActingUser>,
) -> Result<Json<Playlist>, ApiError> {
    Ok(Json(state.playlists.delete(&playlist_id, &acting.user).await?))
}

pub async fn playlist_tracks(
    Extension(state): Extension<Arc<AppState>>,
    Path(slug): Path<String>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<HydratedTrack>>, ApiError> {
    Ok(Json(state.playlists.tracks(&slug, page).await?))
}

pub async fn add_playlist_track(
    Extension(state): Extension<Arc<AppState>>,
    Path(playlist_id): Path<String>,
    Json(change): Json<TrackChange>,
) -> Result<Json<Playlist>, ApiError> {
    let playlist = state
        .playlists
        .add_track(&playlist_id, &change.track_id, &change.user)
        .await?;
    Ok(Json(playlist))
}

pub async fn remove_playlist_track(
    Extension(state): Extension<Arc<AppState>>,
    Path((playlist_id, track_id)): Path<(String, String)>,
    Query(acting): Query<ActingUser>,
) -> Result<Json<Playlist>, ApiError> {
    let playlist = state
        .playlists
        .remove_track(&playlist_id, &track_id, &acting.user)
        .await?;
    Ok(Json(playlist))
}
