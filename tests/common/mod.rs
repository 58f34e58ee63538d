#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicU64, AtomicUsize, Ordering},
    },
    time::Duration,
};

use axum::{
    Form, Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use reqwest::Client;
use serde_json::{Value, json};
use tunesync::{
    config::{SpotifyConfig, SyncConfig},
    error::StoreError,
    management::{ReconciliationEngine, TokenManager},
    spotify::CatalogClient,
    store::{
        Album, AlbumFields, Artist, ArtistFields, CatalogCounts, CatalogStore, Genre, NewPlaylist,
        Playlist, SqliteCatalogStore, Track, TrackFields,
    },
};

/// Canned upstream catalog plus the knobs tests turn.
#[derive(Default)]
pub struct FakeState {
    artists: Mutex<HashMap<String, Value>>,
    albums: Mutex<HashMap<String, Vec<Value>>>,
    tracks: Mutex<HashMap<String, Vec<Value>>>,
    grants: AtomicUsize,
    expires_in: AtomicU64,
    grant_delay_ms: AtomicU64,
    grant_status: Mutex<Option<u16>>,
    tracks_status: Mutex<Option<u16>>,
    album_queries: Mutex<Vec<(u32, u32)>>,
    track_markets: Mutex<Vec<String>>,
}

/// A fake Spotify Web API listening on an ephemeral local port.
pub struct FakeSpotify {
    pub base_url: String,
    state: Arc<FakeState>,
}

impl FakeSpotify {
    pub async fn start() -> Self {
        let state = Arc::new(FakeState::default());
        state.expires_in.store(3600, Ordering::SeqCst);

        let app = Router::new()
            .route("/api/token", post(grant))
            .route("/v1/artists", get(several_artists))
            .route("/v1/artists/{id}", get(single_artist))
            .route("/v1/artists/{id}/albums", get(artist_albums))
            .route("/v1/albums/{id}/tracks", get(album_tracks))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        FakeSpotify {
            base_url: format!("http://{addr}"),
            state,
        }
    }

    // Catalog content

    pub fn add_artist(&self, id: &str, name: &str, genres: &[&str]) {
        self.state
            .artists
            .lock()
            .unwrap()
            .insert(id.to_string(), artist_json(id, name, genres));
    }

    pub fn add_album(&self, artist_id: &str, album_id: &str, name: &str, artist_ids: &[&str]) {
        self.state
            .albums
            .lock()
            .unwrap()
            .entry(artist_id.to_string())
            .or_default()
            .push(album_json(album_id, name, artist_ids));
    }

    pub fn add_track(&self, album_id: &str, track_id: &str, name: &str, artist_ids: &[&str]) {
        let mut tracks = self.state.tracks.lock().unwrap();
        let list = tracks.entry(album_id.to_string()).or_default();
        let number = list.len() as u32 + 1;
        list.push(track_json(track_id, name, artist_ids, number));
    }

    pub fn rename_artist(&self, id: &str, name: &str) {
        if let Some(artist) = self.state.artists.lock().unwrap().get_mut(id) {
            artist["name"] = json!(name);
        }
    }

    // Failure injection and timing

    pub fn set_expires_in(&self, seconds: u64) {
        self.state.expires_in.store(seconds, Ordering::SeqCst);
    }

    pub fn set_grant_delay(&self, delay: Duration) {
        self.state
            .grant_delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn fail_grants_with(&self, status: u16) {
        *self.state.grant_status.lock().unwrap() = Some(status);
    }

    pub fn fail_tracks_with(&self, status: u16) {
        *self.state.tracks_status.lock().unwrap() = Some(status);
    }

    // Observations

    pub fn grant_count(&self) -> usize {
        self.state.grants.load(Ordering::SeqCst)
    }

    pub fn album_queries(&self) -> Vec<(u32, u32)> {
        self.state.album_queries.lock().unwrap().clone()
    }

    pub fn track_markets(&self) -> Vec<String> {
        self.state.track_markets.lock().unwrap().clone()
    }

    // Wiring

    pub fn spotify_config(&self) -> SpotifyConfig {
        SpotifyConfig {
            client_id: "test-client".to_string(),
            client_secret: "test-secret".to_string(),
            api_url: format!("{}/v1", self.base_url),
            token_url: format!("{}/api/token", self.base_url),
            market: "TH".to_string(),
        }
    }

    pub fn token_manager(&self) -> Arc<TokenManager> {
        Arc::new(TokenManager::new(Client::new(), &self.spotify_config()))
    }

    pub fn catalog_client(&self) -> Arc<CatalogClient> {
        let config = self.spotify_config();
        Arc::new(CatalogClient::new(
            Client::new(),
            config.api_url,
            self.token_manager(),
        ))
    }

    pub fn engine(&self, store: Arc<dyn CatalogStore>) -> ReconciliationEngine {
        ReconciliationEngine::new(self.catalog_client(), store, SyncConfig::default(), "TH")
    }
}

pub fn memory_store() -> Arc<SqliteCatalogStore> {
    Arc::new(SqliteCatalogStore::open_in_memory().unwrap())
}

pub fn ids(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

// Upstream object builders

pub fn artist_json(id: &str, name: &str, genres: &[&str]) -> Value {
    json!({
        "id": id,
        "name": name,
        "genres": genres,
        "popularity": 50,
        "followers": { "href": null, "total": 1000 },
        "images": [{ "url": format!("https://i.scdn.co/image/{id}"), "height": 640, "width": 640 }],
        "uri": format!("spotify:artist:{id}"),
        "external_urls": { "spotify": format!("https://open.spotify.com/artist/{id}") },
        "type": "artist",
    })
}

fn artist_refs(artist_ids: &[&str]) -> Vec<Value> {
    artist_ids
        .iter()
        .map(|id| json!({ "id": id, "name": format!("Artist {id}"), "type": "artist" }))
        .collect()
}

pub fn album_json(id: &str, name: &str, artist_ids: &[&str]) -> Value {
    json!({
        "id": id,
        "name": name,
        "album_type": "album",
        "total_tracks": 2,
        "release_date": "2020-01-01",
        "release_date_precision": "day",
        "images": [],
        "uri": format!("spotify:album:{id}"),
        "artists": artist_refs(artist_ids),
    })
}

pub fn track_json(id: &str, name: &str, artist_ids: &[&str], track_number: u32) -> Value {
    json!({
        "id": id,
        "name": name,
        "artists": artist_refs(artist_ids),
        "disc_number": 1,
        "track_number": track_number,
        "duration_ms": 180000,
        "explicit": false,
        "preview_url": null,
        "uri": format!("spotify:track:{id}"),
    })
}

// Handlers

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("Bearer token-"))
}

fn paging(items: &[Value], query: &HashMap<String, String>) -> Value {
    let limit: usize = query.get("limit").and_then(|v| v.parse().ok()).unwrap_or(20);
    let offset: usize = query.get("offset").and_then(|v| v.parse().ok()).unwrap_or(0);
    let page: Vec<Value> = items.iter().skip(offset).take(limit).cloned().collect();
    json!({
        "href": "",
        "items": page,
        "total": items.len(),
        "limit": limit,
        "offset": offset,
        "next": null,
        "previous": null,
    })
}

async fn grant(
    State(state): State<Arc<FakeState>>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    let n = state.grants.fetch_add(1, Ordering::SeqCst) + 1;

    let delay = state.grant_delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }

    let status = *state.grant_status.lock().unwrap();
    if let Some(status) = status {
        let code = StatusCode::from_u16(status).unwrap();
        return (code, Json(json!({ "error": "invalid_client" }))).into_response();
    }

    if form.get("grant_type").map(String::as_str) != Some("client_credentials")
        || form.get("client_id").map(String::as_str) != Some("test-client")
        || form.get("client_secret").map(String::as_str) != Some("test-secret")
    {
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": "invalid_request" })))
            .into_response();
    }

    Json(json!({
        "access_token": format!("token-{n}"),
        "token_type": "Bearer",
        "expires_in": state.expires_in.load(Ordering::SeqCst),
    }))
    .into_response()
}

async fn several_artists(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let artists = state.artists.lock().unwrap();
    let found: Vec<Value> = query
        .get("ids")
        .map(String::as_str)
        .unwrap_or_default()
        .split(',')
        .filter(|id| !id.is_empty())
        .map(|id| artists.get(id).cloned().unwrap_or(Value::Null))
        .collect();
    Json(json!({ "artists": found })).into_response()
}

async fn single_artist(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let artist = state.artists.lock().unwrap().get(&id).cloned();
    match artist {
        Some(artist) => Json(artist).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn artist_albums(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let limit = query.get("limit").and_then(|v| v.parse().ok()).unwrap_or(0);
    let offset = query.get("offset").and_then(|v| v.parse().ok()).unwrap_or(0);
    state.album_queries.lock().unwrap().push((limit, offset));

    let albums = state.albums.lock().unwrap();
    let items = albums.get(&id).cloned().unwrap_or_default();
    Json(paging(&items, &query)).into_response()
}

async fn album_tracks(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let status = *state.tracks_status.lock().unwrap();
    if let Some(status) = status {
        return StatusCode::from_u16(status).unwrap().into_response();
    }
    if let Some(market) = query.get("market") {
        state.track_markets.lock().unwrap().push(market.clone());
    }

    let tracks = state.tracks.lock().unwrap();
    let items = tracks.get(&id).cloned().unwrap_or_default();
    Json(paging(&items, &query)).into_response()
}

/// Store wrapper whose genre inserts lose a race: a "parallel" creator
/// inserts the same genre right before the real insert runs.
pub struct GenreRaceStore {
    pub inner: Arc<SqliteCatalogStore>,
    pub contested: String,
}

#[async_trait::async_trait]
impl CatalogStore for GenreRaceStore {
    async fn find_genres_by_names(&self, names: &[String]) -> Result<Vec<Genre>, StoreError> {
        self.inner.find_genres_by_names(names).await
    }
    async fn find_genre_by_name(&self, name: &str) -> Result<Option<Genre>, StoreError> {
        self.inner.find_genre_by_name(name).await
    }
    async fn find_genres_by_ids(&self, ids: &[String]) -> Result<Vec<Genre>, StoreError> {
        self.inner.find_genres_by_ids(ids).await
    }
    async fn insert_genre(&self, name: &str, slug: &str) -> Result<Genre, StoreError> {
        if name == self.contested {
            self.inner.insert_genre(name, slug).await?;
        }
        self.inner.insert_genre(name, slug).await
    }
    async fn find_artist_by_external_id(&self, id: &str) -> Result<Option<Artist>, StoreError> {
        self.inner.find_artist_by_external_id(id).await
    }
    async fn find_artists_by_external_ids(&self, ids: &[String]) -> Result<Vec<Artist>, StoreError> {
        self.inner.find_artists_by_external_ids(ids).await
    }
    async fn find_artist(&self, id: &str) -> Result<Option<Artist>, StoreError> {
        self.inner.find_artist(id).await
    }
    async fn find_artists_by_ids(&self, ids: &[String]) -> Result<Vec<Artist>, StoreError> {
        self.inner.find_artists_by_ids(ids).await
    }
    async fn insert_artist(&self, fields: &ArtistFields) -> Result<Artist, StoreError> {
        self.inner.insert_artist(fields).await
    }
    async fn update_artist(&self, fields: &ArtistFields) -> Result<Option<Artist>, StoreError> {
        self.inner.update_artist(fields).await
    }
    async fn find_album_by_external_id(&self, id: &str) -> Result<Option<Album>, StoreError> {
        self.inner.find_album_by_external_id(id).await
    }
    async fn find_albums_by_ids(&self, ids: &[String]) -> Result<Vec<Album>, StoreError> {
        self.inner.find_albums_by_ids(ids).await
    }
    async fn insert_album(&self, fields: &AlbumFields) -> Result<Album, StoreError> {
        self.inner.insert_album(fields).await
    }
    async fn update_album(&self, fields: &AlbumFields) -> Result<Option<Album>, StoreError> {
        self.inner.update_album(fields).await
    }
    async fn find_track_by_external_id(&self, id: &str) -> Result<Option<Track>, StoreError> {
        self.inner.find_track_by_external_id(id).await
    }
    async fn find_track(&self, id: &str) -> Result<Option<Track>, StoreError> {
        self.inner.find_track(id).await
    }
    async fn find_tracks_by_ids(&self, ids: &[String]) -> Result<Vec<Track>, StoreError> {
        self.inner.find_tracks_by_ids(ids).await
    }
    async fn find_tracks_by_artist(
        &self,
        artist_id: &str,
        skip: usize,
        limit: usize,
    ) -> Result<(Vec<Track>, u64), StoreError> {
        self.inner.find_tracks_by_artist(artist_id, skip, limit).await
    }
    async fn insert_track(&self, fields: &TrackFields) -> Result<Track, StoreError> {
        self.inner.insert_track(fields).await
    }
    async fn update_track(&self, fields: &TrackFields) -> Result<Option<Track>, StoreError> {
        self.inner.update_track(fields).await
    }
    async fn increment_play_count(&self, id: &str) -> Result<Option<Track>, StoreError> {
        self.inner.increment_play_count(id).await
    }
    async fn soft_delete_track(&self, id: &str) -> Result<Option<Track>, StoreError> {
        self.inner.soft_delete_track(id).await
    }
    async fn insert_playlist(&self, p: &NewPlaylist, slug: &str) -> Result<Playlist, StoreError> {
        self.inner.insert_playlist(p, slug).await
    }
    async fn find_playlist(&self, id: &str) -> Result<Option<Playlist>, StoreError> {
        self.inner.find_playlist(id).await
    }
    async fn find_playlist_by_slug(&self, slug: &str) -> Result<Option<Playlist>, StoreError> {
        self.inner.find_playlist_by_slug(slug).await
    }
    async fn find_playlists_by_owner(
        &self,
        owner: &str,
        skip: usize,
        limit: usize,
    ) -> Result<(Vec<Playlist>, u64), StoreError> {
        self.inner.find_playlists_by_owner(owner, skip, limit).await
    }
    async fn find_playlist_track_ids(&self, slug: &str) -> Result<Option<Vec<String>>, StoreError> {
        self.inner.find_playlist_track_ids(slug).await
    }
    async fn append_playlist_track(
        &self,
        id: &str,
        track_id: &str,
    ) -> Result<Option<Playlist>, StoreError> {
        self.inner.append_playlist_track(id, track_id).await
    }
    async fn remove_playlist_track(
        &self,
        id: &str,
        track_id: &str,
    ) -> Result<Option<Playlist>, StoreError> {
        self.inner.remove_playlist_track(id, track_id).await
    }
    async fn soft_delete_playlist(&self, id: &str) -> Result<Option<Playlist>, StoreError> {
        self.inner.soft_delete_playlist(id).await
    }
    async fn counts(&self) -> Result<CatalogCounts, StoreError> {
        self.inner.counts().await
    }
}
