use std::sync::Arc;

use tracing::{debug, info};

use crate::{
    error::{EntityKind, PlaylistError, StoreError},
    store::{CatalogStore, HydratedTrack, NewPlaylist, Playlist},
    utils,
};

use super::ordered_join::{OrderedJoinResolver, Page, PageRequest};

/// Playlist write path. Keeps the ordered track array of each playlist and
/// checks ownership on every change.
pub struct PlaylistManager {
    store: Arc<dyn CatalogStore>,
    resolver: OrderedJoinResolver,
}

impl PlaylistManager {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        PlaylistManager {
            resolver: OrderedJoinResolver::new(Arc::clone(&store)),
            store,
        }
    }

    /// Creates an empty playlist whose slug is derived from its name.
    pub async fn create(&self, playlist: NewPlaylist) -> Result<Playlist, PlaylistError> {
        let slug = utils::slugify(&playlist.name);
        let created = self.store.insert_playlist(&playlist, &slug).await?;
        info!("Created playlist '{}' ({})", created.name, created.slug);
        Ok(created)
    }

    /// Appends a track. Adding a track that is already present changes
    /// nothing.
    pub async fn add_track(
        &self,
        playlist_id: &str,
        track_id: &str,
        user: &str,
    ) -> Result<Playlist, PlaylistError> {
        let playlist = self.owned(playlist_id, user).await?;
        if playlist.tracks.iter().any(|id| id == track_id) {
            return Ok(playlist);
        }

        self.store
            .find_track(track_id)
            .await?
            .filter(|t| t.deleted_at.is_none())
            .ok_or_else(|| StoreError::not_found(EntityKind::Track, track_id))?;

        debug!("Adding track {} to playlist {}", track_id, playlist_id);
        Ok(self
            .store
            .append_playlist_track(playlist_id, track_id)
            .await?
            .ok_or_else(|| StoreError::not_found(EntityKind::Playlist, playlist_id))?)
    }

    /// Removes every occurrence of a track. Removing an absent track changes
    /// nothing.
    pub async fn remove_track(
        &self,
        playlist_id: &str,
        track_id: &str,
        user: &str,
    ) -> Result<Playlist, PlaylistError> {
        let playlist = self.owned(playlist_id, user).await?;
        if !playlist.tracks.iter().any(|id| id == track_id) {
            return Ok(playlist);
        }

        debug!("Removing track {} from playlist {}", track_id, playlist_id);
        Ok(self
            .store
            .remove_playlist_track(playlist_id, track_id)
            .await?
            .ok_or_else(|| StoreError::not_found(EntityKind::Playlist, playlist_id))?)
    }

    pub async fn delete(&self, playlist_id: &str, user: &str) -> Result<Playlist, PlaylistError> {
        self.owned(playlist_id, user).await?;
        let deleted = self
            .store
            .soft_delete_playlist(playlist_id)
            .await?
            .ok_or_else(|| StoreError::not_found(EntityKind::Playlist, playlist_id))?;
        info!("Deleted playlist '{}'", deleted.slug);
        Ok(deleted)
    }

    /// Live playlist metadata by slug. The track array holds ids only.
    pub async fn by_slug(&self, slug: &str) -> Result<Playlist, PlaylistError> {
        Ok(self
            .store
            .find_playlist_by_slug(slug)
            .await?
            .ok_or_else(|| StoreError::not_found(EntityKind::Playlist, slug))?)
    }

    /// The owner's live playlists, newest first.
    pub async fn owned_by(
        &self,
        owner: &str,
        page: PageRequest,
    ) -> Result<Page<Playlist>, PlaylistError> {
        let (playlists, total) = self
            .store
            .find_playlists_by_owner(owner, page.skip, page.limit)
            .await?;
        Ok(Page::from_slice(playlists, total as usize, page))
    }

    pub async fn tracks(
        &self,
        slug: &str,
        page: PageRequest,
    ) -> Result<Page<HydratedTrack>, PlaylistError> {
        self.resolver.playlist_tracks(slug, page).await
    }

    async fn owned(&self, playlist_id: &str, user: &str) -> Result<Playlist, PlaylistError> {
        let playlist = self
            .store
            .find_playlist(playlist_id)
            .await?
            .ok_or_else(|| StoreError::not_found(EntityKind::Playlist, playlist_id))?;

        if playlist.owner != user {
            return Err(PlaylistError::NotOwner {
                playlist: playlist.id,
                user: user.to_string(),
            });
        }
        Ok(playlist)
    }
}
