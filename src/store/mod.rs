//! Local catalog store.
//!
//! [`CatalogStore`] abstracts the document operations the sync pipeline and
//! the playlist paths need. [`SqliteCatalogStore`] is the production backend;
//! natural keys (`external_id`, genre `name`, slugs) are enforced unique by
//! the database and conflicts surface as [`StoreError::DuplicateKey`].

mod models;
mod schema;
mod sqlite;

use async_trait::async_trait;

pub use models::*;
pub use sqlite::SqliteCatalogStore;

use crate::error::StoreError;

#[async_trait]
pub trait CatalogStore: Send + Sync {
    // Genres

    /// Returns the genres whose name is in `names`, in no particular order.
    async fn find_genres_by_names(&self, names: &[String]) -> Result<Vec<Genre>, StoreError>;

    async fn find_genre_by_name(&self, name: &str) -> Result<Option<Genre>, StoreError>;

    async fn find_genres_by_ids(&self, ids: &[String]) -> Result<Vec<Genre>, StoreError>;

    /// Inserts a genre. Fails with `DuplicateKey` if the name or slug exists.
    async fn insert_genre(&self, name: &str, slug: &str) -> Result<Genre, StoreError>;

    // Artists

    async fn find_artist_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<Artist>, StoreError>;

    /// Returns the artists whose external id is in `external_ids`, in no
    /// particular order. Unknown ids are ignored.
    async fn find_artists_by_external_ids(
        &self,
        external_ids: &[String],
    ) -> Result<Vec<Artist>, StoreError>;

    async fn find_artist(&self, id: &str) -> Result<Option<Artist>, StoreError>;

    async fn find_artists_by_ids(&self, ids: &[String]) -> Result<Vec<Artist>, StoreError>;

    async fn insert_artist(&self, fields: &ArtistFields) -> Result<Artist, StoreError>;

    /// Overwrites the artist matching `fields.external_id`. Returns `None`
    /// when no row matched.
    async fn update_artist(&self, fields: &ArtistFields) -> Result<Option<Artist>, StoreError>;

    // Albums

    async fn find_album_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<Album>, StoreError>;

    async fn find_albums_by_ids(&self, ids: &[String]) -> Result<Vec<Album>, StoreError>;

    async fn insert_album(&self, fields: &AlbumFields) -> Result<Album, StoreError>;

    async fn update_album(&self, fields: &AlbumFields) -> Result<Option<Album>, StoreError>;

    // Tracks

    async fn find_track_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<Track>, StoreError>;

    async fn find_track(&self, id: &str) -> Result<Option<Track>, StoreError>;

    /// Returns the live (not soft-deleted) tracks among `ids`, in no
    /// particular order.
    async fn find_tracks_by_ids(&self, ids: &[String]) -> Result<Vec<Track>, StoreError>;

    /// One slice of the live tracks referencing `artist_id`, most played
    /// first, together with the number of such tracks.
    async fn find_tracks_by_artist(
        &self,
        artist_id: &str,
        skip: usize,
        limit: usize,
    ) -> Result<(Vec<Track>, u64), StoreError>;

    async fn insert_track(&self, fields: &TrackFields) -> Result<Track, StoreError>;

    async fn update_track(&self, fields: &TrackFields) -> Result<Option<Track>, StoreError>;

    /// Bumps the play counter and returns the updated track.
    async fn increment_play_count(&self, id: &str) -> Result<Option<Track>, StoreError>;

    async fn soft_delete_track(&self, id: &str) -> Result<Option<Track>, StoreError>;

    // Playlists

    async fn insert_playlist(
        &self,
        playlist: &NewPlaylist,
        slug: &str,
    ) -> Result<Playlist, StoreError>;

    async fn find_playlist(&self, id: &str) -> Result<Option<Playlist>, StoreError>;

    async fn find_playlist_by_slug(&self, slug: &str) -> Result<Option<Playlist>, StoreError>;

    /// One slice of the owner's live playlists, newest first, together with
    /// the number of such playlists.
    async fn find_playlists_by_owner(
        &self,
        owner: &str,
        skip: usize,
        limit: usize,
    ) -> Result<(Vec<Playlist>, u64), StoreError>;

    /// Reads only the ordered track array of a live playlist.
    async fn find_playlist_track_ids(&self, slug: &str)
    -> Result<Option<Vec<String>>, StoreError>;

    /// Appends `track_id` to the playlist's array unless it is already there.
    /// The check and the write are one atomic step. Returns `None` when no
    /// live playlist has this id.
    async fn append_playlist_track(
        &self,
        id: &str,
        track_id: &str,
    ) -> Result<Option<Playlist>, StoreError>;

    /// Drops every occurrence of `track_id` from the playlist's array, as one
    /// atomic step. Returns `None` when no live playlist has this id.
    async fn remove_playlist_track(
        &self,
        id: &str,
        track_id: &str,
    ) -> Result<Option<Playlist>, StoreError>;

    async fn soft_delete_playlist(&self, id: &str) -> Result<Option<Playlist>, StoreError>;

    // Stats

    async fn counts(&self) -> Result<CatalogCounts, StoreError>;
}
