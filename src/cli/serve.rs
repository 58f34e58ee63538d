use std::sync::Arc;

use crate::{
    error, info,
    server::{self, AppState},
};

use super::Services;

pub async fn serve(services: Services) {
    let address = services.config.server_address.clone();
    let state = Arc::new(AppState {
        catalog: services.catalog,
        engine: services.engine,
        playlists: services.playlists,
        artists: services.artists,
        tracks: services.tracks,
    });

    info!("Starting tunesync server on {}", address);
    if let Err(e) = server::start_api_server(&address, state).await {
        error!("Server stopped. Err: {}", e);
    }
}
