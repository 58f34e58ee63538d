use std::{collections::HashMap, ops::Range, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::{
    error::{EntityKind, PlaylistError, StoreError},
    store::{Album, Artist, CatalogStore, HydratedTrack, Track},
    utils,
};

pub const DEFAULT_PAGE_LIMIT: usize = 10;

fn default_limit() -> usize {
    DEFAULT_PAGE_LIMIT
}

/// Window into an ordered reference array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PageRequest {
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub skip: usize,
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest {
            limit: DEFAULT_PAGE_LIMIT,
            skip: 0,
        }
    }
}

impl PageRequest {
    pub fn new(limit: usize, skip: usize) -> Self {
        PageRequest { limit, skip }
    }

    /// Index range of this page inside an array of `total` ids.
    pub fn window(&self, total: usize) -> Range<usize> {
        let start = self.skip.min(total);
        let end = self.skip.saturating_add(self.limit).min(total);
        start..end
    }

    pub fn has_next(&self, total: usize) -> bool {
        self.skip.saturating_add(self.limit) < total
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Length of the full reference array, dangling ids included.
    pub total: usize,
    pub has_next: bool,
    pub limit: usize,
    pub skip: usize,
}

impl<T> Page<T> {
    /// Wraps one already-sliced window of a listing with `total` entries.
    pub fn from_slice(items: Vec<T>, total: usize, page: PageRequest) -> Self {
        Page {
            items,
            total,
            has_next: page.has_next(total),
            limit: page.limit,
            skip: page.skip,
        }
    }
}

/// Arranges `docs` in the order of `ids`.
///
/// Ids without a matching document are dropped. A repeated id yields the
/// document once per occurrence.
pub fn order_by_ids<T, F>(ids: &[String], docs: Vec<T>, key: F) -> Vec<T>
where
    T: Clone,
    F: Fn(&T) -> &str,
{
    let by_id: HashMap<String, T> = docs
        .into_iter()
        .map(|doc| (key(&doc).to_string(), doc))
        .collect();

    ids.iter().filter_map(|id| by_id.get(id).cloned()).collect()
}

/// Rebuilds ordered, paginated, hydrated track lists from id arrays.
///
/// Only the ids of the requested page are read from the store, so the cost
/// of a page does not depend on the length of the array.
#[derive(Clone)]
pub struct OrderedJoinResolver {
    store: Arc<dyn CatalogStore>,
}

impl OrderedJoinResolver {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        OrderedJoinResolver { store }
    }

    /// Returns the `page` of `ordered_ids` as hydrated tracks, in array order.
    ///
    /// Ids with no live track are skipped silently; `total` still counts
    /// them.
    pub async fn resolve_ordered_page(
        &self,
        ordered_ids: &[String],
        page: PageRequest,
    ) -> Result<Page<HydratedTrack>, StoreError> {
        let total = ordered_ids.len();
        let page_ids = &ordered_ids[page.window(total)];

        let tracks = if page_ids.is_empty() {
            Vec::new()
        } else {
            self.store
                .find_tracks_by_ids(&utils::distinct(page_ids))
                .await?
        };

        let ordered = order_by_ids(page_ids, tracks, |t| t.id.as_str());

        Ok(Page::from_slice(self.hydrate(ordered).await?, total, page))
    }

    /// Ordered page of a live playlist's tracks, looked up by slug.
    pub async fn playlist_tracks(
        &self,
        slug: &str,
        page: PageRequest,
    ) -> Result<Page<HydratedTrack>, PlaylistError> {
        let ids = self
            .store
            .find_playlist_track_ids(slug)
            .await?
            .ok_or_else(|| StoreError::not_found(EntityKind::Playlist, slug))?;

        Ok(self.resolve_ordered_page(&ids, page).await?)
    }

    /// Replaces artist and album references with the referenced documents.
    pub async fn hydrate(&self, tracks: Vec<Track>) -> Result<Vec<HydratedTrack>, StoreError> {
        if tracks.is_empty() {
            return Ok(Vec::new());
        }

        let artist_ids = utils::distinct(tracks.iter().flat_map(|t| t.artist_refs.iter()));
        let album_ids = utils::distinct(tracks.iter().filter_map(|t| t.album_ref.as_deref()));

        let artists: HashMap<String, Artist> = self
            .store
            .find_artists_by_ids(&artist_ids)
            .await?
            .into_iter()
            .map(|a| (a.id.clone(), a))
            .collect();
        let albums: HashMap<String, Album> = self
            .store
            .find_albums_by_ids(&album_ids)
            .await?
            .into_iter()
            .map(|a| (a.id.clone(), a))
            .collect();

        Ok(tracks
            .into_iter()
            .map(|track| HydratedTrack {
                artists: track
                    .artist_refs
                    .iter()
                    .filter_map(|id| artists.get(id).cloned())
                    .collect(),
                album: track.album_ref.as_ref().and_then(|id| albums.get(id).cloned()),
                track,
            })
            .collect())
    }
}
