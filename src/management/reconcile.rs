use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use tracing::{debug, info, warn};

use crate::{
    config::SyncConfig,
    error::{EntityKind, StoreError, SyncError},
    spotify::CatalogClient,
    store::{Album, AlbumFields, Artist, ArtistFields, CatalogStore, TrackFields},
    types::{ArtistRef, SpotifyAlbum, SpotifyArtist, SpotifyTrack},
    utils,
};

/// Slugs tried per genre name before the genre is given up on.
const MAX_SLUG_ATTEMPTS: usize = 20;

/// Slug of a genre name. Names without any slug characters share a fallback
/// base, told apart by numbering.
fn genre_slug(name: &str) -> String {
    match utils::slugify(name) {
        slug if slug.is_empty() => "genre".to_string(),
        slug => slug,
    }
}

/// Per-run counters, logged once the run finishes.
#[derive(Debug, Default, Clone, Copy)]
struct SyncStats {
    genres_created: usize,
    artists_created: usize,
    artists_updated: usize,
    albums_created: usize,
    albums_updated: usize,
    tracks_created: usize,
    tracks_updated: usize,
}

/// Mirrors upstream artists, their albums and the albums' tracks into the
/// local catalog.
///
/// Every document is upserted by its `external_id`: looked up first, then
/// updated in place or inserted. Reference fields only ever point at
/// documents that are already in the store when the reference is resolved.
/// Nothing is deleted and the run is not transactional: whatever was written
/// before a failure stays written.
pub struct ReconciliationEngine {
    catalog: Arc<CatalogClient>,
    store: Arc<dyn CatalogStore>,
    sync: SyncConfig,
    market: String,
}

impl ReconciliationEngine {
    pub fn new(
        catalog: Arc<CatalogClient>,
        store: Arc<dyn CatalogStore>,
        sync: SyncConfig,
        market: impl Into<String>,
    ) -> Self {
        ReconciliationEngine {
            catalog,
            store,
            sync,
            market: market.into(),
        }
    }

    /// Runs a sync pass for the given upstream artist ids and returns the
    /// local artist documents, in upstream order.
    ///
    /// Genres are created first for the whole batch. Then each artist is
    /// upserted followed by one page of its albums, each album followed by
    /// one page of its tracks, before moving on to the next artist.
    ///
    /// # Errors
    ///
    /// - [`SyncError::AuthFailure`] / [`SyncError::ExternalApi`] when an
    ///   upstream call fails; later steps are skipped.
    /// - [`SyncError::ReconciliationFailure`] when a document vanished between
    ///   lookup and update, or a parallel run inserted it first.
    pub async fn sync_artists(&self, external_ids: &[String]) -> Result<Vec<Artist>, SyncError> {
        let mut stats = SyncStats::default();

        let fetched = self.catalog.get_artists(external_ids).await?;
        info!(
            "Fetched {} of {} requested artists",
            fetched.len(),
            external_ids.len()
        );

        let genre_names = utils::distinct(fetched.iter().flat_map(|a| a.genres.iter()));
        self.ensure_genres(&genre_names, &mut stats).await?;

        let mut synced = Vec::with_capacity(fetched.len());
        for spotify_artist in &fetched {
            let artist = self.upsert_artist(spotify_artist, &mut stats).await?;
            self.sync_albums(&artist.external_id, &mut stats).await?;
            synced.push(artist);
        }

        info!(
            "Sync finished: {} genres created, artists {}/{}, albums {}/{}, tracks {}/{} (created/updated)",
            stats.genres_created,
            stats.artists_created,
            stats.artists_updated,
            stats.albums_created,
            stats.albums_updated,
            stats.tracks_created,
            stats.tracks_updated,
        );

        Ok(synced)
    }

    /// Creates every genre in `names` that is not in the store yet.
    ///
    /// Losing an insert race to another creator is not an error.
    async fn ensure_genres(&self, names: &[String], stats: &mut SyncStats) -> Result<(), SyncError> {
        if names.is_empty() {
            return Ok(());
        }

        let existing: HashSet<String> = self
            .store
            .find_genres_by_names(names)
            .await?
            .into_iter()
            .map(|g| g.name)
            .collect();

        for name in names.iter().filter(|n| !existing.contains(*n)) {
            if self.create_genre(name).await? {
                stats.genres_created += 1;
            }
        }

        Ok(())
    }

    /// Inserts one genre, numbering the slug when another name already holds
    /// it. Returns whether this call created the document.
    async fn create_genre(&self, name: &str) -> Result<bool, SyncError> {
        let base = genre_slug(name);
        for attempt in 1..=MAX_SLUG_ATTEMPTS {
            let slug = match attempt {
                1 => base.clone(),
                n => format!("{base}-{n}"),
            };
            match self.store.insert_genre(name, &slug).await {
                Ok(genre) => {
                    debug!("Created genre '{}' as {} ({})", genre.name, genre.id, genre.slug);
                    return Ok(true);
                }
                Err(StoreError::DuplicateKey { .. }) => {
                    if let Some(genre) = self.store.find_genre_by_name(name).await? {
                        debug!("Genre '{}' already created as {}", name, genre.id);
                        return Ok(false);
                    }
                    debug!("Slug '{}' is taken, genre '{}' needs another", slug, name);
                }
                Err(e) => return Err(e.into()),
            }
        }

        warn!(
            "Genre '{}' still conflicts after {} slugs, skipping",
            name, MAX_SLUG_ATTEMPTS
        );
        Ok(false)
    }

    /// Internal ids of the artist's genres, in the artist's genre order.
    async fn resolve_genre_refs(&self, genres: &[String]) -> Result<Vec<String>, SyncError> {
        let names = utils::distinct(genres);
        if names.is_empty() {
            return Ok(Vec::new());
        }

        let by_name: HashMap<String, String> = self
            .store
            .find_genres_by_names(&names)
            .await?
            .into_iter()
            .map(|g| (g.name, g.id))
            .collect();

        Ok(names
            .iter()
            .filter_map(|name| by_name.get(name).cloned())
            .collect())
    }

    /// Internal ids of the listed artists that are already stored, in listing
    /// order. Artists not synced yet are left out.
    async fn resolve_artist_refs(&self, artists: &[ArtistRef]) -> Result<Vec<String>, SyncError> {
        let external_ids = utils::distinct(artists.iter().map(|a| a.id.as_str()));
        if external_ids.is_empty() {
            return Ok(Vec::new());
        }

        let by_external_id: HashMap<String, String> = self
            .store
            .find_artists_by_external_ids(&external_ids)
            .await?
            .into_iter()
            .map(|a| (a.external_id, a.id))
            .collect();

        Ok(external_ids
            .iter()
            .filter_map(|id| by_external_id.get(id).cloned())
            .collect())
    }

    async fn upsert_artist(
        &self,
        artist: &SpotifyArtist,
        stats: &mut SyncStats,
    ) -> Result<Artist, SyncError> {
        let fields = ArtistFields {
            external_id: artist.id.clone(),
            name: artist.name.clone(),
            genre_refs: self.resolve_genre_refs(&artist.genres).await?,
            popularity: artist.popularity,
            followers: artist.followers.total,
            images: artist.images.clone(),
            uri: artist.uri.clone(),
            external_url: artist.external_urls.spotify.clone(),
        };

        if self
            .store
            .find_artist_by_external_id(&artist.id)
            .await?
            .is_some()
        {
            let updated = self
                .store
                .update_artist(&fields)
                .await?
                .ok_or_else(|| vanished(EntityKind::Artist, &artist.id))?;
            debug!("Updated artist '{}' ({})", updated.name, updated.id);
            stats.artists_updated += 1;
            Ok(updated)
        } else {
            let created = self
                .store
                .insert_artist(&fields)
                .await
                .map_err(|e| insert_failure(e, EntityKind::Artist, &artist.id))?;
            debug!("Created artist '{}' ({})", created.name, created.id);
            stats.artists_created += 1;
            Ok(created)
        }
    }

    async fn sync_albums(
        &self,
        artist_external_id: &str,
        stats: &mut SyncStats,
    ) -> Result<(), SyncError> {
        let page = self
            .catalog
            .get_artist_albums(artist_external_id, self.sync.album_page_size, 0)
            .await?;

        if page.total > page.items.len() as u64 {
            debug!(
                "Artist {} lists {} albums, syncing the first {}",
                artist_external_id,
                page.total,
                page.items.len()
            );
        }

        for spotify_album in &page.items {
            let album = self.upsert_album(spotify_album, stats).await?;
            self.sync_tracks(&spotify_album.id, &album.id, stats).await?;
        }

        Ok(())
    }

    async fn upsert_album(
        &self,
        album: &SpotifyAlbum,
        stats: &mut SyncStats,
    ) -> Result<Album, SyncError> {
        let fields = AlbumFields {
            external_id: album.id.clone(),
            name: album.name.clone(),
            album_type: album.album_type.clone(),
            total_tracks: album.total_tracks,
            release_date: album.release_date.clone(),
            release_date_precision: album.release_date_precision.clone(),
            images: album.images.clone(),
            uri: album.uri.clone(),
            artist_refs: self.resolve_artist_refs(&album.artists).await?,
        };

        if self
            .store
            .find_album_by_external_id(&album.id)
            .await?
            .is_some()
        {
            let updated = self
                .store
                .update_album(&fields)
                .await?
                .ok_or_else(|| vanished(EntityKind::Album, &album.id))?;
            debug!("Updated album '{}' ({})", updated.name, updated.id);
            stats.albums_updated += 1;
            Ok(updated)
        } else {
            let created = self
                .store
                .insert_album(&fields)
                .await
                .map_err(|e| insert_failure(e, EntityKind::Album, &album.id))?;
            debug!("Created album '{}' ({})", created.name, created.id);
            stats.albums_created += 1;
            Ok(created)
        }
    }

    async fn sync_tracks(
        &self,
        album_external_id: &str,
        album_id: &str,
        stats: &mut SyncStats,
    ) -> Result<(), SyncError> {
        let page = self
            .catalog
            .get_album_tracks(
                album_external_id,
                self.sync.track_page_size,
                0,
                &self.market,
            )
            .await?;

        for spotify_track in &page.items {
            self.upsert_track(spotify_track, album_id, stats).await?;
        }

        Ok(())
    }

    async fn upsert_track(
        &self,
        track: &SpotifyTrack,
        album_id: &str,
        stats: &mut SyncStats,
    ) -> Result<(), SyncError> {
        let fields = TrackFields {
            external_id: track.id.clone(),
            name: track.name.clone(),
            artist_refs: self.resolve_artist_refs(&track.artists).await?,
            album_ref: Some(album_id.to_string()),
            disc_number: track.disc_number,
            track_number: track.track_number,
            duration_ms: track.duration_ms,
            explicit: track.explicit,
            preview_url: track.preview_url.clone(),
            uri: track.uri.clone(),
        };

        if self
            .store
            .find_track_by_external_id(&track.id)
            .await?
            .is_some()
        {
            self.store
                .update_track(&fields)
                .await?
                .ok_or_else(|| vanished(EntityKind::Track, &track.id))?;
            stats.tracks_updated += 1;
        } else {
            self.store
                .insert_track(&fields)
                .await
                .map_err(|e| insert_failure(e, EntityKind::Track, &track.id))?;
            stats.tracks_created += 1;
        }

        debug!("Upserted track '{}' ({})", track.name, track.id);
        Ok(())
    }
}

fn vanished(entity: EntityKind, external_id: &str) -> SyncError {
    SyncError::ReconciliationFailure {
        entity,
        external_id: external_id.to_string(),
    }
}

/// A unique-key conflict on insert means a parallel run created the document
/// first.
fn insert_failure(err: StoreError, entity: EntityKind, external_id: &str) -> SyncError {
    match err {
        StoreError::DuplicateKey { .. } => vanished(entity, external_id),
        other => SyncError::Store(other),
    }
}
