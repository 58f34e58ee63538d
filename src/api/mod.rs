//! # API Module
//!
//! HTTP handlers of the tunesync server. The handlers are thin: they decode
//! the request, call into [`crate::management`] and encode the result.
//!
//! ## Endpoints
//!
//! - [`health`] - `GET /health`, status and version for monitoring
//! - [`lookup_artist`] - `GET /admin/spotify/artist/{id}`, the upstream artist
//! - [`sync_artists`] - `POST /admin/sync`, runs a sync for `{"artistIds": [..]}`
//! - [`user_playlists`] - `GET /playlists?owner&limit&skip`, the owner's playlists
//! - [`create_playlist`] - `POST /playlists`
//! - [`playlist_by_slug`] - `GET /playlists/{slug}`, playlist metadata
//! - [`delete_playlist`] - `DELETE /playlists/{id}?user`
//! - [`playlist_tracks`] - `GET /playlists/{slug}/tracks?limit&skip`, one ordered page
//! - [`add_playlist_track`] - `POST /playlists/{id}/tracks` with `{"trackId", "user"}`
//! - [`remove_playlist_track`] - `DELETE /playlists/{id}/tracks/{track_id}?user`
//! - [`get_artist`] - `GET /artists/{id}`, the local artist with its genres
//! - [`artist_tracks`] - `GET /artists/{id}/tracks?limit&skip`, most played first
//! - [`play_track`] - `GET /tracks/{id}`, the hydrated track; counts a play
//!
//! Playlists are read by slug and written by id, so the second path segment
//! means either depending on the method.
//!
//! ## Errors
//!
//! Failures are rendered by [`ApiError`] as `{"error": .., "stage": ..}` with
//! a status derived from the failure: upstream problems map to 502, lost
//! races to 409, missing documents to 404 and store failures to 500.

mod catalog;
mod error;
mod health;
mod playlist;
mod sync;

pub use catalog::{artist_tracks, get_artist, play_track};
pub use error::ApiError;
pub use health::health;
pub use playlist::{
    ActingUser, CreatePlaylistRequest, OwnerListing, TrackChange, add_playlist_track,
    create_playlist, delete_playlist, playlist_by_slug, playlist_tracks, remove_playlist_track,
    user_playlists,
};
pub use sync::{SyncRequest, lookup_artist, sync_artists};
