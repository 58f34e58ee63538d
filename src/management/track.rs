use std::sync::Arc;

use tracing::debug;

use crate::{
    error::{EntityKind, StoreError},
    store::{CatalogStore, HydratedTrack, Track},
};

use super::ordered_join::{OrderedJoinResolver, Page, PageRequest};

/// Single-track reads and the track soft delete.
pub struct TrackManager {
    store: Arc<dyn CatalogStore>,
    resolver: OrderedJoinResolver,
}

impl TrackManager {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        TrackManager {
            resolver: OrderedJoinResolver::new(Arc::clone(&store)),
            store,
        }
    }

    /// Returns the hydrated track and counts the read as a play.
    pub async fn play(&self, id: &str) -> Result<HydratedTrack, StoreError> {
        let track = self
            .store
            .increment_play_count(id)
            .await?
            .ok_or_else(|| StoreError::not_found(EntityKind::Track, id))?;
        debug!("Track {} played {} times", track.id, track.play_count);

        self.resolver
            .hydrate(vec![track])
            .await?
            .pop()
            .ok_or_else(|| StoreError::not_found(EntityKind::Track, id))
    }

    /// Live tracks credited to the artist with internal id `artist_id`,
    /// most played first.
    pub async fn by_artist(
        &self,
        artist_id: &str,
        page: PageRequest,
    ) -> Result<Page<HydratedTrack>, StoreError> {
        let (tracks, total) = self
            .store
            .find_tracks_by_artist(artist_id, page.skip, page.limit)
            .await?;
        let items = self.resolver.hydrate(tracks).await?;
        Ok(Page::from_slice(items, total as usize, page))
    }

    /// Marks the track deleted. It stops appearing in playlist pages but
    /// stays referenced by them.
    pub async fn delete(&self, id: &str) -> Result<Track, StoreError> {
        self.store
            .soft_delete_track(id)
            .await?
            .ok_or_else(|| StoreError::not_found(EntityKind::Track, id))
    }
}
