use std::sync::Arc;

use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::{
    error::SyncError,
    management::TokenManager,
    types::{ArtistsResponse, Paging, SpotifyAlbum, SpotifyArtist, SpotifyTrack},
};

/// Upper bound of ids accepted by the several-artists endpoint.
pub const MAX_IDS_PER_REQUEST: usize = 50;

/// Read-only accessor for the artist, artist-albums and album-tracks
/// endpoints. Every request carries a bearer token from the shared
/// [`TokenManager`].
pub struct CatalogClient {
    http: Client,
    api_url: String,
    tokens: Arc<TokenManager>,
}

impl CatalogClient {
    pub fn new(http: Client, api_url: impl Into<String>, tokens: Arc<TokenManager>) -> Self {
        let api_url: String = api_url.into();
        CatalogClient {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
            tokens,
        }
    }

    pub async fn get_artist(&self, id: &str) -> Result<SpotifyArtist, SyncError> {
        self.get_json(&format!("/artists/{id}"), &[]).await
    }

    /// Fetches artists in batches of [`MAX_IDS_PER_REQUEST`].
    ///
    /// Ids unknown upstream come back as `null` and are skipped; the result
    /// keeps the order of `ids` otherwise.
    pub async fn get_artists(&self, ids: &[String]) -> Result<Vec<SpotifyArtist>, SyncError> {
        let mut artists = Vec::with_capacity(ids.len());

        for chunk in ids.chunks(MAX_IDS_PER_REQUEST) {
            let res: ArtistsResponse = self
                .get_json("/artists", &[("ids", chunk.join(","))])
                .await?;

            for (id, artist) in chunk.iter().zip(res.artists) {
                match artist {
                    Some(artist) => artists.push(artist),
                    None => warn!("Artist {} is unknown upstream, skipping", id),
                }
            }
        }

        Ok(artists)
    }

    pub async fn get_artist_albums(
        &self,
        artist_id: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Paging<SpotifyAlbum>, SyncError> {
        self.get_json(
            &format!("/artists/{artist_id}/albums"),
            &[("limit", limit.to_string()), ("offset", offset.to_string())],
        )
        .await
    }

    pub async fn get_album_tracks(
        &self,
        album_id: &str,
        limit: u32,
        offset: u32,
        market: &str,
    ) -> Result<Paging<SpotifyTrack>, SyncError> {
        self.get_json(
            &format!("/albums/{album_id}/tracks"),
            &[
                ("limit", limit.to_string()),
                ("offset", offset.to_string()),
                ("market", market.to_string()),
            ],
        )
        .await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, SyncError> {
        let token = self.tokens.get_valid_token().await?;
        let url = format!("{}{}", self.api_url, path);
        debug!("GET {}", url);

        let transport = |source| SyncError::Transport {
            endpoint: path.to_string(),
            source,
        };

        let res = self
            .http
            .get(&url)
            .bearer_auth(token)
            .query(query)
            .send()
            .await
            .map_err(transport)?;

        let status = res.status();
        if !status.is_success() {
            return Err(SyncError::ExternalApi {
                endpoint: path.to_string(),
                status: status.as_u16(),
            });
        }

        res.json::<T>().await.map_err(transport)
    }
}
