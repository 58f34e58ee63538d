//! Documents persisted in the local catalog.
//!
//! Every document is keyed by an internal id. Cross-entity references always
//! hold internal ids; Spotify ids only appear in `external_id`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::Image;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Genre {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artist {
    pub id: String,
    pub external_id: String,
    pub name: String,
    pub genre_refs: Vec<String>,
    pub popularity: u32,
    pub followers: u64,
    pub images: Vec<Image>,
    pub uri: String,
    pub external_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    pub id: String,
    pub external_id: String,
    pub name: String,
    pub album_type: String,
    pub total_tracks: u32,
    pub release_date: String,
    pub release_date_precision: String,
    pub images: Vec<Image>,
    pub uri: String,
    pub artist_refs: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: String,
    pub external_id: String,
    pub name: String,
    pub artist_refs: Vec<String>,
    pub album_ref: Option<String>,
    pub disc_number: u32,
    pub track_number: u32,
    pub duration_ms: u64,
    pub explicit: bool,
    pub preview_url: Option<String>,
    pub uri: String,
    pub play_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    pub id: String,
    pub name: String,
    pub description: String,
    pub slug: String,
    pub owner: String,
    /// Track ids in the order chosen by the owner.
    pub tracks: Vec<String>,
    pub is_public: bool,
    pub play_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Artist fields written by a sync. Everything else is owned by the store.
#[derive(Debug, Clone)]
pub struct ArtistFields {
    pub external_id: String,
    pub name: String,
    pub genre_refs: Vec<String>,
    pub popularity: u32,
    pub followers: u64,
    pub images: Vec<Image>,
    pub uri: String,
    pub external_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AlbumFields {
    pub external_id: String,
    pub name: String,
    pub album_type: String,
    pub total_tracks: u32,
    pub release_date: String,
    pub release_date_precision: String,
    pub images: Vec<Image>,
    pub uri: String,
    pub artist_refs: Vec<String>,
}

/// Track fields written by a sync. `play_count` is deliberately absent.
#[derive(Debug, Clone)]
pub struct TrackFields {
    pub external_id: String,
    pub name: String,
    pub artist_refs: Vec<String>,
    pub album_ref: Option<String>,
    pub disc_number: u32,
    pub track_number: u32,
    pub duration_ms: u64,
    pub explicit: bool,
    pub preview_url: Option<String>,
    pub uri: String,
}

#[derive(Debug, Clone)]
pub struct NewPlaylist {
    pub name: String,
    pub description: String,
    pub owner: String,
    pub is_public: bool,
}

/// A track with its references replaced by the referenced documents.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HydratedTrack {
    #[serde(flatten)]
    pub track: Track,
    pub artists: Vec<Artist>,
    pub album: Option<Album>,
}

/// An artist with its genre references replaced by the genres.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HydratedArtist {
    #[serde(flatten)]
    pub artist: Artist,
    pub genres: Vec<Genre>,
}

/// Document counts per entity type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CatalogCounts {
    pub genres: u64,
    pub artists: u64,
    pub albums: u64,
    pub tracks: u64,
    pub playlists: u64,
}
