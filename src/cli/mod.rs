//! Command implementations behind the `tunesync` binary.
//!
//! Every command receives the [`Services`] built once from [`Config`] and
//! reports to the terminal with the crate's colored output macros.

mod lookup;
mod playlist;
mod serve;
mod sync;
mod track;

use std::{sync::Arc, time::Duration};

use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;

use crate::{
    Res,
    config::Config,
    management::{
        ArtistManager, PlaylistManager, ReconciliationEngine, TokenManager, TrackManager,
    },
    spotify::CatalogClient,
    store::{CatalogStore, SqliteCatalogStore},
};

pub use lookup::lookup;
pub use playlist::{
    add_playlist_track, create_playlist, delete_playlist, list_playlist_tracks, list_playlists,
    remove_playlist_track, show_playlist,
};
pub use serve::serve;
pub use sync::sync;
pub use track::{delete_track, show_track};

/// Long-lived components wired from the configuration.
pub struct Services {
    pub config: Config,
    pub store: Arc<dyn CatalogStore>,
    pub catalog: Arc<CatalogClient>,
    pub engine: Arc<ReconciliationEngine>,
    pub playlists: PlaylistManager,
    pub artists: ArtistManager,
    pub tracks: TrackManager,
}

impl Services {
    pub async fn from_config(config: Config) -> Res<Self> {
        if let Some(parent) = config.db_path.parent() {
            async_fs::create_dir_all(parent).await?;
        }
        let store: Arc<dyn CatalogStore> = Arc::new(SqliteCatalogStore::open(&config.db_path)?);

        let http = Client::new();
        let tokens = Arc::new(TokenManager::new(http.clone(), &config.spotify));
        let catalog = Arc::new(CatalogClient::new(
            http,
            config.spotify.api_url.clone(),
            tokens,
        ));
        let engine = Arc::new(ReconciliationEngine::new(
            Arc::clone(&catalog),
            Arc::clone(&store),
            config.sync,
            config.spotify.market.clone(),
        ));

        Ok(Services {
            playlists: PlaylistManager::new(Arc::clone(&store)),
            tracks: TrackManager::new(Arc::clone(&store)),
            artists: ArtistManager::new(Arc::clone(&store)),
            config,
            store,
            catalog,
            engine,
        })
    }
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }
    pb
}
