//! SQLite-backed implementation of [`CatalogStore`].

use std::{
    path::Path,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{
    Connection, OptionalExtension, Row, Transaction, TransactionBehavior, params,
    params_from_iter, types::Type,
};
use serde::de::DeserializeOwned;
use tracing::info;

use super::{
    CatalogStore,
    models::*,
    schema::{CREATE_SCHEMA, SCHEMA_VERSION},
};
use crate::{
    error::{EntityKind, StoreError},
    utils,
};

/// Bound parameters per `IN (..)` lookup; longer key lists are split.
const MAX_KEYS_PER_QUERY: usize = 500;

const GENRE_COLUMNS: &str = "id, name, slug, description, created_at, updated_at";
const ARTIST_COLUMNS: &str = "id, external_id, name, genre_refs, popularity, followers, images, uri, external_url, created_at, updated_at, deleted_at";
const ALBUM_COLUMNS: &str = "id, external_id, name, album_type, total_tracks, release_date, release_date_precision, images, uri, artist_refs, created_at, updated_at, deleted_at";
const TRACK_COLUMNS: &str = "id, external_id, name, artist_refs, album_ref, disc_number, track_number, duration_ms, explicit, preview_url, uri, play_count, created_at, updated_at, deleted_at";
const PLAYLIST_COLUMNS: &str = "id, name, description, slug, owner, tracks, is_public, play_count, created_at, updated_at, deleted_at";

/// Catalog store on a single SQLite connection.
///
/// Statements run on the blocking thread pool; the connection is shared
/// behind a mutex, so clones of the store are cheap handles to the same
/// database.
#[derive(Clone)]
pub struct SqliteCatalogStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteCatalogStore {
    /// Opens (or creates) the catalog database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path.as_ref())?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Self::init(conn)
    }

    /// Opens a private in-memory catalog.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.execute_batch(CREATE_SCHEMA)?;

        let version: i64 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;
        if version < SCHEMA_VERSION {
            info!("Creating catalog db schema at version {}", SCHEMA_VERSION);
            conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
        }

        let counts = read_counts(&conn)?;
        info!(
            "Opened catalog: {} genres, {} artists, {} albums, {} tracks, {} playlists",
            counts.genres, counts.artists, counts.albums, counts.tracks, counts.playlists
        );

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    async fn run<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            // a panic while holding the lock leaves the connection itself usable
            let guard = conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            f(&guard)
        })
        .await?
    }

    /// Applies `edit` to a live playlist's track array inside one immediate
    /// transaction. The array is written back only when `edit` reports a
    /// change.
    async fn edit_playlist_tracks<E>(
        &self,
        id: &str,
        edit: E,
    ) -> Result<Option<Playlist>, StoreError>
    where
        E: FnOnce(&mut Vec<String>) -> bool + Send + 'static,
    {
        let id = id.to_string();
        self.run(move |conn| {
            let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
            let Some(mut tracks) = tx
                .query_row(
                    "SELECT tracks FROM playlists WHERE id = ?1 AND deleted_at IS NULL",
                    params![id],
                    |row| json_column::<Vec<String>>(row, 0),
                )
                .optional()?
            else {
                return Ok(None);
            };

            if edit(&mut tracks) {
                tx.execute(
                    "UPDATE playlists SET tracks = ?2, updated_at = ?3 WHERE id = ?1",
                    params![id, serde_json::to_string(&tracks)?, millis(Utc::now())],
                )?;
            }
            let playlist =
                select_one(&tx, PLAYLIST_COLUMNS, "playlists", "id", &id, playlist_from_row)?;
            tx.commit()?;
            Ok(playlist)
        })
        .await
    }
}

// =========================================================================
// Row mapping
// =========================================================================

fn millis(ts: DateTime<Utc>) -> i64 {
    ts.timestamp_millis()
}

fn timestamp(row: &Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let ms: i64 = row.get(idx)?;
    DateTime::from_timestamp_millis(ms).ok_or(rusqlite::Error::IntegralValueOutOfRange(idx, ms))
}

fn optional_timestamp(row: &Row, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    match row.get::<_, Option<i64>>(idx)? {
        Some(ms) => DateTime::from_timestamp_millis(ms)
            .map(Some)
            .ok_or(rusqlite::Error::IntegralValueOutOfRange(idx, ms)),
        None => Ok(None),
    }
}

fn json_column<T: DeserializeOwned>(row: &Row, idx: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn genre_from_row(row: &Row) -> rusqlite::Result<Genre> {
    Ok(Genre {
        id: row.get(0)?,
        name: row.get(1)?,
        slug: row.get(2)?,
        description: row.get(3)?,
        created_at: timestamp(row, 4)?,
        updated_at: timestamp(row, 5)?,
    })
}

fn artist_from_row(row: &Row) -> rusqlite::Result<Artist> {
    Ok(Artist {
        id: row.get(0)?,
        external_id: row.get(1)?,
        name: row.get(2)?,
        genre_refs: json_column(row, 3)?,
        popularity: row.get(4)?,
        followers: row.get::<_, i64>(5)? as u64,
        images: json_column(row, 6)?,
        uri: row.get(7)?,
        external_url: row.get(8)?,
        created_at: timestamp(row, 9)?,
        updated_at: timestamp(row, 10)?,
        deleted_at: optional_timestamp(row, 11)?,
    })
}

fn album_from_row(row: &Row) -> rusqlite::Result<Album> {
    Ok(Album {
        id: row.get(0)?,
        external_id: row.get(1)?,
        name: row.get(2)?,
        album_type: row.get(3)?,
        total_tracks: row.get(4)?,
        release_date: row.get(5)?,
        release_date_precision: row.get(6)?,
        images: json_column(row, 7)?,
        uri: row.get(8)?,
        artist_refs: json_column(row, 9)?,
        created_at: timestamp(row, 10)?,
        updated_at: timestamp(row, 11)?,
        deleted_at: optional_timestamp(row, 12)?,
    })
}

fn track_from_row(row: &Row) -> rusqlite::Result<Track> {
    Ok(Track {
        id: row.get(0)?,
        external_id: row.get(1)?,
        name: row.get(2)?,
        artist_refs: json_column(row, 3)?,
        album_ref: row.get(4)?,
        disc_number: row.get(5)?,
        track_number: row.get(6)?,
        duration_ms: row.get::<_, i64>(7)? as u64,
        explicit: row.get(8)?,
        preview_url: row.get(9)?,
        uri: row.get(10)?,
        play_count: row.get::<_, i64>(11)? as u64,
        created_at: timestamp(row, 12)?,
        updated_at: timestamp(row, 13)?,
        deleted_at: optional_timestamp(row, 14)?,
    })
}

fn playlist_from_row(row: &Row) -> rusqlite::Result<Playlist> {
    Ok(Playlist {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        slug: row.get(3)?,
        owner: row.get(4)?,
        tracks: json_column(row, 5)?,
        is_public: row.get(6)?,
        play_count: row.get::<_, i64>(7)? as u64,
        created_at: timestamp(row, 8)?,
        updated_at: timestamp(row, 9)?,
        deleted_at: optional_timestamp(row, 10)?,
    })
}

// =========================================================================
// Query helpers
// =========================================================================

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(e, _) => {
            e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                || e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
        }
        _ => false,
    }
}

/// Maps a unique-constraint failure to `DuplicateKey`, anything else to `Sqlite`.
fn insert_error(err: rusqlite::Error, entity: EntityKind, key: &str) -> StoreError {
    if is_unique_violation(&err) {
        StoreError::DuplicateKey {
            entity,
            key: key.to_string(),
        }
    } else {
        StoreError::Sqlite(err)
    }
}

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

fn select_one<T>(
    conn: &Connection,
    columns: &str,
    table: &str,
    key_column: &str,
    key: &str,
    map: fn(&Row) -> rusqlite::Result<T>,
) -> Result<Option<T>, StoreError> {
    let sql = format!("SELECT {columns} FROM {table} WHERE {key_column} = ?1");
    Ok(conn.query_row(&sql, params![key], map).optional()?)
}

fn select_in<T>(
    conn: &Connection,
    sql_prefix: &str,
    keys: &[String],
    map: fn(&Row) -> rusqlite::Result<T>,
) -> Result<Vec<T>, StoreError> {
    let mut found = Vec::new();
    for chunk in keys.chunks(MAX_KEYS_PER_QUERY) {
        let sql = format!("{sql_prefix} ({})", placeholders(chunk.len()));
        let mut stmt = conn.prepare_cached(&sql)?;
        let rows = stmt.query_map(params_from_iter(chunk.iter()), map)?;
        for row in rows {
            found.push(row?);
        }
    }
    Ok(found)
}

/// SQLite binds LIMIT and OFFSET as i64.
fn sql_bound(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

fn count(conn: &Connection, table: &str) -> Result<u64, StoreError> {
    let n: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))?;
    Ok(n as u64)
}

fn read_counts(conn: &Connection) -> Result<CatalogCounts, StoreError> {
    Ok(CatalogCounts {
        genres: count(conn, "genres")?,
        artists: count(conn, "artists")?,
        albums: count(conn, "albums")?,
        tracks: count(conn, "tracks")?,
        playlists: count(conn, "playlists")?,
    })
}

// =========================================================================
// CatalogStore
// =========================================================================

#[async_trait]
impl CatalogStore for SqliteCatalogStore {
    async fn find_genres_by_names(&self, names: &[String]) -> Result<Vec<Genre>, StoreError> {
        let names = names.to_vec();
        self.run(move |conn| {
            let prefix = format!("SELECT {GENRE_COLUMNS} FROM genres WHERE name IN");
            select_in(conn, &prefix, &names, genre_from_row)
        })
        .await
    }

    async fn find_genre_by_name(&self, name: &str) -> Result<Option<Genre>, StoreError> {
        let name = name.to_string();
        self.run(move |conn| select_one(conn, GENRE_COLUMNS, "genres", "name", &name, genre_from_row))
            .await
    }

    async fn find_genres_by_ids(&self, ids: &[String]) -> Result<Vec<Genre>, StoreError> {
        let ids = ids.to_vec();
        self.run(move |conn| {
            let prefix = format!("SELECT {GENRE_COLUMNS} FROM genres WHERE id IN");
            select_in(conn, &prefix, &ids, genre_from_row)
        })
        .await
    }

    async fn insert_genre(&self, name: &str, slug: &str) -> Result<Genre, StoreError> {
        let name = name.to_string();
        let slug = slug.to_string();
        self.run(move |conn| {
            let id = utils::generate_id();
            let now = millis(Utc::now());
            conn.execute(
                "INSERT INTO genres (id, name, slug, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?4)",
                params![id, name, slug, now],
            )
            .map_err(|e| insert_error(e, EntityKind::Genre, &name))?;
            select_one(conn, GENRE_COLUMNS, "genres", "id", &id, genre_from_row)?
                .ok_or_else(|| StoreError::not_found(EntityKind::Genre, id))
        })
        .await
    }

    async fn find_artist_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<Artist>, StoreError> {
        let key = external_id.to_string();
        self.run(move |conn| {
            select_one(conn, ARTIST_COLUMNS, "artists", "external_id", &key, artist_from_row)
        })
        .await
    }

    async fn find_artists_by_external_ids(
        &self,
        external_ids: &[String],
    ) -> Result<Vec<Artist>, StoreError> {
        let keys = external_ids.to_vec();
        self.run(move |conn| {
            let prefix = format!("SELECT {ARTIST_COLUMNS} FROM artists WHERE external_id IN");
            select_in(conn, &prefix, &keys, artist_from_row)
        })
        .await
    }

    async fn find_artist(&self, id: &str) -> Result<Option<Artist>, StoreError> {
        let id = id.to_string();
        self.run(move |conn| select_one(conn, ARTIST_COLUMNS, "artists", "id", &id, artist_from_row))
            .await
    }

    async fn find_artists_by_ids(&self, ids: &[String]) -> Result<Vec<Artist>, StoreError> {
        let ids = ids.to_vec();
        self.run(move |conn| {
            let prefix = format!("SELECT {ARTIST_COLUMNS} FROM artists WHERE id IN");
            select_in(conn, &prefix, &ids, artist_from_row)
        })
        .await
    }

    async fn insert_artist(&self, fields: &ArtistFields) -> Result<Artist, StoreError> {
        let f = fields.clone();
        self.run(move |conn| {
            let id = utils::generate_id();
            let now = millis(Utc::now());
            conn.execute(
                "INSERT INTO artists (id, external_id, name, genre_refs, popularity, followers, images, uri, external_url, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)",
                params![
                    id,
                    f.external_id,
                    f.name,
                    serde_json::to_string(&f.genre_refs)?,
                    f.popularity,
                    f.followers as i64,
                    serde_json::to_string(&f.images)?,
                    f.uri,
                    f.external_url,
                    now,
                ],
            )
            .map_err(|e| insert_error(e, EntityKind::Artist, &f.external_id))?;
            select_one(conn, ARTIST_COLUMNS, "artists", "id", &id, artist_from_row)?
                .ok_or_else(|| StoreError::not_found(EntityKind::Artist, id))
        })
        .await
    }

    async fn update_artist(&self, fields: &ArtistFields) -> Result<Option<Artist>, StoreError> {
        let f = fields.clone();
        self.run(move |conn| {
            let changed = conn.execute(
                "UPDATE artists SET name = ?2, genre_refs = ?3, popularity = ?4, followers = ?5, images = ?6, uri = ?7, external_url = ?8, updated_at = ?9
                 WHERE external_id = ?1",
                params![
                    f.external_id,
                    f.name,
                    serde_json::to_string(&f.genre_refs)?,
                    f.popularity,
                    f.followers as i64,
                    serde_json::to_string(&f.images)?,
                    f.uri,
                    f.external_url,
                    millis(Utc::now()),
                ],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            select_one(conn, ARTIST_COLUMNS, "artists", "external_id", &f.external_id, artist_from_row)
        })
        .await
    }

    async fn find_album_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<Album>, StoreError> {
        let key = external_id.to_string();
        self.run(move |conn| {
            select_one(conn, ALBUM_COLUMNS, "albums", "external_id", &key, album_from_row)
        })
        .await
    }

    async fn find_albums_by_ids(&self, ids: &[String]) -> Result<Vec<Album>, StoreError> {
        let ids = ids.to_vec();
        self.run(move |conn| {
            let prefix = format!("SELECT {ALBUM_COLUMNS} FROM albums WHERE id IN");
            select_in(conn, &prefix, &ids, album_from_row)
        })
        .await
    }

    async fn insert_album(&self, fields: &AlbumFields) -> Result<Album, StoreError> {
        let f = fields.clone();
        self.run(move |conn| {
            let id = utils::generate_id();
            let now = millis(Utc::now());
            conn.execute(
                "INSERT INTO albums (id, external_id, name, album_type, total_tracks, release_date, release_date_precision, images, uri, artist_refs, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11)",
                params![
                    id,
                    f.external_id,
                    f.name,
                    f.album_type,
                    f.total_tracks,
                    f.release_date,
                    f.release_date_precision,
                    serde_json::to_string(&f.images)?,
                    f.uri,
                    serde_json::to_string(&f.artist_refs)?,
                    now,
                ],
            )
            .map_err(|e| insert_error(e, EntityKind::Album, &f.external_id))?;
            select_one(conn, ALBUM_COLUMNS, "albums", "id", &id, album_from_row)?
                .ok_or_else(|| StoreError::not_found(EntityKind::Album, id))
        })
        .await
    }

    async fn update_album(&self, fields: &AlbumFields) -> Result<Option<Album>, StoreError> {
        let f = fields.clone();
        self.run(move |conn| {
            let changed = conn.execute(
                "UPDATE albums SET name = ?2, album_type = ?3, total_tracks = ?4, release_date = ?5, release_date_precision = ?6, images = ?7, uri = ?8, artist_refs = ?9, updated_at = ?10
                 WHERE external_id = ?1",
                params![
                    f.external_id,
                    f.name,
                    f.album_type,
                    f.total_tracks,
                    f.release_date,
                    f.release_date_precision,
                    serde_json::to_string(&f.images)?,
                    f.uri,
                    serde_json::to_string(&f.artist_refs)?,
                    millis(Utc::now()),
                ],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            select_one(conn, ALBUM_COLUMNS, "albums", "external_id", &f.external_id, album_from_row)
        })
        .await
    }

    async fn find_track_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<Track>, StoreError> {
        let key = external_id.to_string();
        self.run(move |conn| {
            select_one(conn, TRACK_COLUMNS, "tracks", "external_id", &key, track_from_row)
        })
        .await
    }

    async fn find_track(&self, id: &str) -> Result<Option<Track>, StoreError> {
        let id = id.to_string();
        self.run(move |conn| select_one(conn, TRACK_COLUMNS, "tracks", "id", &id, track_from_row))
            .await
    }

    async fn find_tracks_by_ids(&self, ids: &[String]) -> Result<Vec<Track>, StoreError> {
        let ids = ids.to_vec();
        self.run(move |conn| {
            let prefix =
                format!("SELECT {TRACK_COLUMNS} FROM tracks WHERE deleted_at IS NULL AND id IN");
            select_in(conn, &prefix, &ids, track_from_row)
        })
        .await
    }

    async fn find_tracks_by_artist(
        &self,
        artist_id: &str,
        skip: usize,
        limit: usize,
    ) -> Result<(Vec<Track>, u64), StoreError> {
        let artist_id = artist_id.to_string();
        self.run(move |conn| {
            const BY_ARTIST: &str = "FROM tracks WHERE deleted_at IS NULL
                 AND EXISTS (SELECT 1 FROM json_each(tracks.artist_refs) WHERE json_each.value = ?1)";

            let sql = format!(
                "SELECT {TRACK_COLUMNS} {BY_ARTIST} ORDER BY play_count DESC, updated_at DESC LIMIT ?2 OFFSET ?3"
            );
            let mut stmt = conn.prepare(&sql)?;
            let tracks = stmt
                .query_map(
                    params![artist_id, sql_bound(limit), sql_bound(skip)],
                    track_from_row,
                )?
                .collect::<rusqlite::Result<Vec<Track>>>()?;

            let total: i64 = conn.query_row(
                &format!("SELECT COUNT(*) {BY_ARTIST}"),
                params![artist_id],
                |r| r.get(0),
            )?;
            Ok((tracks, total as u64))
        })
        .await
    }

    async fn insert_track(&self, fields: &TrackFields) -> Result<Track, StoreError> {
        let f = fields.clone();
        self.run(move |conn| {
            let id = utils::generate_id();
            let now = millis(Utc::now());
            conn.execute(
                "INSERT INTO tracks (id, external_id, name, artist_refs, album_ref, disc_number, track_number, duration_ms, explicit, preview_url, uri, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?12)",
                params![
                    id,
                    f.external_id,
                    f.name,
                    serde_json::to_string(&f.artist_refs)?,
                    f.album_ref,
                    f.disc_number,
                    f.track_number,
                    f.duration_ms as i64,
                    f.explicit,
                    f.preview_url,
                    f.uri,
                    now,
                ],
            )
            .map_err(|e| insert_error(e, EntityKind::Track, &f.external_id))?;
            select_one(conn, TRACK_COLUMNS, "tracks", "id", &id, track_from_row)?
                .ok_or_else(|| StoreError::not_found(EntityKind::Track, id))
        })
        .await
    }

    async fn update_track(&self, fields: &TrackFields) -> Result<Option<Track>, StoreError> {
        let f = fields.clone();
        self.run(move |conn| {
            let changed = conn.execute(
                "UPDATE tracks SET name = ?2, artist_refs = ?3, album_ref = ?4, disc_number = ?5, track_number = ?6, duration_ms = ?7, explicit = ?8, preview_url = ?9, uri = ?10, updated_at = ?11
                 WHERE external_id = ?1",
                params![
                    f.external_id,
                    f.name,
                    serde_json::to_string(&f.artist_refs)?,
                    f.album_ref,
                    f.disc_number,
                    f.track_number,
                    f.duration_ms as i64,
                    f.explicit,
                    f.preview_url,
                    f.uri,
                    millis(Utc::now()),
                ],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            select_one(conn, TRACK_COLUMNS, "tracks", "external_id", &f.external_id, track_from_row)
        })
        .await
    }

    async fn increment_play_count(&self, id: &str) -> Result<Option<Track>, StoreError> {
        let id = id.to_string();
        self.run(move |conn| {
            let changed = conn.execute(
                "UPDATE tracks SET play_count = play_count + 1 WHERE id = ?1 AND deleted_at IS NULL",
                params![id],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            select_one(conn, TRACK_COLUMNS, "tracks", "id", &id, track_from_row)
        })
        .await
    }

    async fn soft_delete_track(&self, id: &str) -> Result<Option<Track>, StoreError> {
        let id = id.to_string();
        self.run(move |conn| {
            let changed = conn.execute(
                "UPDATE tracks SET deleted_at = ?2 WHERE id = ?1 AND deleted_at IS NULL",
                params![id, millis(Utc::now())],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            select_one(conn, TRACK_COLUMNS, "tracks", "id", &id, track_from_row)
        })
        .await
    }

    async fn insert_playlist(
        &self,
        playlist: &NewPlaylist,
        slug: &str,
    ) -> Result<Playlist, StoreError> {
        let p = playlist.clone();
        let slug = slug.to_string();
        self.run(move |conn| {
            let id = utils::generate_id();
            let now = millis(Utc::now());
            conn.execute(
                "INSERT INTO playlists (id, name, description, slug, owner, is_public, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
                params![id, p.name, p.description, slug, p.owner, p.is_public, now],
            )
            .map_err(|e| insert_error(e, EntityKind::Playlist, &slug))?;
            select_one(conn, PLAYLIST_COLUMNS, "playlists", "id", &id, playlist_from_row)?
                .ok_or_else(|| StoreError::not_found(EntityKind::Playlist, id))
        })
        .await
    }

    async fn find_playlist(&self, id: &str) -> Result<Option<Playlist>, StoreError> {
        let id = id.to_string();
        self.run(move |conn| {
            let playlist =
                select_one(conn, PLAYLIST_COLUMNS, "playlists", "id", &id, playlist_from_row)?;
            Ok(playlist.filter(|p| p.deleted_at.is_none()))
        })
        .await
    }

    async fn find_playlist_by_slug(&self, slug: &str) -> Result<Option<Playlist>, StoreError> {
        let slug = slug.to_string();
        self.run(move |conn| {
            let playlist =
                select_one(conn, PLAYLIST_COLUMNS, "playlists", "slug", &slug, playlist_from_row)?;
            Ok(playlist.filter(|p| p.deleted_at.is_none()))
        })
        .await
    }

    async fn find_playlists_by_owner(
        &self,
        owner: &str,
        skip: usize,
        limit: usize,
    ) -> Result<(Vec<Playlist>, u64), StoreError> {
        let owner = owner.to_string();
        self.run(move |conn| {
            let sql = format!(
                "SELECT {PLAYLIST_COLUMNS} FROM playlists WHERE owner = ?1 AND deleted_at IS NULL
                 ORDER BY created_at DESC, id LIMIT ?2 OFFSET ?3"
            );
            let mut stmt = conn.prepare(&sql)?;
            let playlists = stmt
                .query_map(
                    params![owner, sql_bound(limit), sql_bound(skip)],
                    playlist_from_row,
                )?
                .collect::<rusqlite::Result<Vec<Playlist>>>()?;

            let total: i64 = conn.query_row(
                "SELECT COUNT(*) FROM playlists WHERE owner = ?1 AND deleted_at IS NULL",
                params![owner],
                |r| r.get(0),
            )?;
            Ok((playlists, total as u64))
        })
        .await
    }

    async fn find_playlist_track_ids(
        &self,
        slug: &str,
    ) -> Result<Option<Vec<String>>, StoreError> {
        let slug = slug.to_string();
        self.run(move |conn| {
            let tracks = conn
                .query_row(
                    "SELECT tracks FROM playlists WHERE slug = ?1 AND deleted_at IS NULL",
                    params![slug],
                    |row| json_column::<Vec<String>>(row, 0),
                )
                .optional()?;
            Ok(tracks)
        })
        .await
    }

    async fn append_playlist_track(
        &self,
        id: &str,
        track_id: &str,
    ) -> Result<Option<Playlist>, StoreError> {
        let track_id = track_id.to_string();
        self.edit_playlist_tracks(id, move |tracks| {
            if tracks.contains(&track_id) {
                return false;
            }
            tracks.push(track_id);
            true
        })
        .await
    }

    async fn remove_playlist_track(
        &self,
        id: &str,
        track_id: &str,
    ) -> Result<Option<Playlist>, StoreError> {
        let track_id = track_id.to_string();
        self.edit_playlist_tracks(id, move |tracks| {
            let before = tracks.len();
            tracks.retain(|t| *t != track_id);
            tracks.len() != before
        })
        .await
    }

    async fn soft_delete_playlist(&self, id: &str) -> Result<Option<Playlist>, StoreError> {
        let id = id.to_string();
        self.run(move |conn| {
            let changed = conn.execute(
                "UPDATE playlists SET deleted_at = ?2 WHERE id = ?1 AND deleted_at IS NULL",
                params![id, millis(Utc::now())],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            select_one(conn, PLAYLIST_COLUMNS, "playlists", "id", &id, playlist_from_row)
        })
        .await
    }

    async fn counts(&self) -> Result<CatalogCounts, StoreError> {
        self.run(read_counts).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artist_fields(external_id: &str, name: &str) -> ArtistFields {
        ArtistFields {
            external_id: external_id.to_string(),
            name: name.to_string(),
            genre_refs: vec!["g1".to_string(), "g2".to_string()],
            popularity: 61,
            followers: 120_000,
            images: Vec::new(),
            uri: format!("spotify:artist:{external_id}"),
            external_url: None,
        }
    }

    #[tokio::test]
    async fn genre_name_is_a_unique_key() {
        let store = SqliteCatalogStore::open_in_memory().unwrap();
        store.insert_genre("house", "house").await.unwrap();

        let err = store.insert_genre("house", "house-2").await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::DuplicateKey {
                entity: EntityKind::Genre,
                ..
            }
        ));
        assert_eq!(store.counts().await.unwrap().genres, 1);
    }

    #[tokio::test]
    async fn update_matches_on_external_id_and_keeps_internal_id() {
        let store = SqliteCatalogStore::open_in_memory().unwrap();
        let created = store.insert_artist(&artist_fields("A1", "Old")).await.unwrap();

        let mut fields = artist_fields("A1", "New");
        fields.genre_refs = vec!["g3".to_string()];
        let updated = store.update_artist(&fields).await.unwrap().unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.name, "New");
        assert_eq!(updated.genre_refs, vec!["g3".to_string()]);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn update_of_unknown_artist_reports_no_match() {
        let store = SqliteCatalogStore::open_in_memory().unwrap();
        let result = store.update_artist(&artist_fields("missing", "x")).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn duplicate_external_id_is_rejected() {
        let store = SqliteCatalogStore::open_in_memory().unwrap();
        store.insert_artist(&artist_fields("A1", "One")).await.unwrap();
        let err = store.insert_artist(&artist_fields("A1", "Two")).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey { .. }));
    }

    #[tokio::test]
    async fn soft_deleted_tracks_are_not_hydrated() {
        let store = SqliteCatalogStore::open_in_memory().unwrap();
        let track = store
            .insert_track(&TrackFields {
                external_id: "T1".to_string(),
                name: "Intro".to_string(),
                artist_refs: Vec::new(),
                album_ref: None,
                disc_number: 1,
                track_number: 1,
                duration_ms: 61_000,
                explicit: false,
                preview_url: None,
                uri: "spotify:track:T1".to_string(),
            })
            .await
            .unwrap();

        store.soft_delete_track(&track.id).await.unwrap().unwrap();

        let found = store.find_tracks_by_ids(&[track.id.clone()]).await.unwrap();
        assert!(found.is_empty());
        // the document itself is still there
        assert!(store.find_track(&track.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn playlist_track_array_round_trips_in_order() {
        let store = SqliteCatalogStore::open_in_memory().unwrap();
        let playlist = store
            .insert_playlist(
                &NewPlaylist {
                    name: "Late Night".to_string(),
                    description: String::new(),
                    owner: "u1".to_string(),
                    is_public: true,
                },
                "late-night",
            )
            .await
            .unwrap();

        for id in ["c", "a", "b", "a"] {
            store.append_playlist_track(&playlist.id, id).await.unwrap();
        }

        let ids = store.find_playlist_track_ids("late-night").await.unwrap();
        assert_eq!(ids, Some(vec!["c".to_string(), "a".to_string(), "b".to_string()]));

        let updated = store
            .remove_playlist_track(&playlist.id, "a")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.tracks, vec!["c".to_string(), "b".to_string()]);
    }

    #[tokio::test]
    async fn long_key_lists_are_split() {
        let store = SqliteCatalogStore::open_in_memory().unwrap();
        let created = store.insert_artist(&artist_fields("A1", "One")).await.unwrap();

        let mut ids: Vec<String> = (0..40_000).map(|i| format!("missing-{i}")).collect();
        ids.push(created.id.clone());

        let found = store.find_artists_by_ids(&ids).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, created.id);
    }
}
