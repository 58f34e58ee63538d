use std::sync::Arc;

use crate::{
    error::{EntityKind, StoreError},
    store::{CatalogStore, HydratedArtist},
};

use super::ordered_join::order_by_ids;

/// Read side of the local artists.
#[derive(Clone)]
pub struct ArtistManager {
    store: Arc<dyn CatalogStore>,
}

impl ArtistManager {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        ArtistManager { store }
    }

    /// The stored artist with its genres, in the artist's genre order.
    pub async fn get(&self, id: &str) -> Result<HydratedArtist, StoreError> {
        let artist = self
            .store
            .find_artist(id)
            .await?
            .ok_or_else(|| StoreError::not_found(EntityKind::Artist, id))?;

        let genres = self.store.find_genres_by_ids(&artist.genre_refs).await?;
        Ok(HydratedArtist {
            genres: order_by_ids(&artist.genre_refs, genres, |g| g.id.as_str()),
            artist,
        })
    }
}
