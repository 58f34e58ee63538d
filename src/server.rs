use std::{net::SocketAddr, str::FromStr, sync::Arc};

use axum::{
    Extension, Router,
    routing::{delete, get, post},
};
use tracing::info;

use crate::{
    api,
    management::{ArtistManager, PlaylistManager, ReconciliationEngine, TrackManager},
    spotify::CatalogClient,
};

/// Shared handles the HTTP handlers work with.
pub struct AppState {
    pub catalog: Arc<CatalogClient>,
    pub engine: Arc<ReconciliationEngine>,
    pub playlists: PlaylistManager,
    pub artists: ArtistManager,
    pub tracks: TrackManager,
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route("/admin/spotify/artist/{id}", get(api::lookup_artist))
        .route("/admin/sync", post(api::sync_artists))
        .route(
            "/playlists",
            get(api::user_playlists).post(api::create_playlist),
        )
        .route(
            "/playlists/{playlist}",
            get(api::playlist_by_slug).delete(api::delete_playlist),
        )
        .route(
            "/playlists/{playlist}/tracks",
            get(api::playlist_tracks).post(api::add_playlist_track),
        )
        .route(
            "/playlists/{playlist}/tracks/{track}",
            delete(api::remove_playlist_track),
        )
        .route("/artists/{id}", get(api::get_artist))
        .route("/artists/{id}/tracks", get(api::artist_tracks))
        .route("/tracks/{id}", get(api::play_track))
        .layer(Extension(state))
}

/// Binds `address` and serves the API until the process is stopped.
pub async fn start_api_server(address: &str, state: Arc<AppState>) -> crate::Res<()> {
    let addr = SocketAddr::from_str(address)?;
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, build_router(state)).await?;
    Ok(())
}
