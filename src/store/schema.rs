//! SQLite schema of the local catalog.
//!
//! Natural keys carry `UNIQUE` constraints so that conflicting inserts fail at
//! the database rather than in application code. Reference lists and images
//! are JSON arrays stored in TEXT columns; timestamps are epoch milliseconds.

pub const SCHEMA_VERSION: i64 = 1;

pub const CREATE_SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS genres (
    id          TEXT PRIMARY KEY,
    name        TEXT NOT NULL UNIQUE,
    slug        TEXT NOT NULL UNIQUE,
    description TEXT,
    created_at  INTEGER NOT NULL,
    updated_at  INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS artists (
    id           TEXT PRIMARY KEY,
    external_id  TEXT NOT NULL UNIQUE,
    name         TEXT NOT NULL,
    genre_refs   TEXT NOT NULL DEFAULT '[]',
    popularity   INTEGER NOT NULL DEFAULT 0,
    followers    INTEGER NOT NULL DEFAULT 0,
    images       TEXT NOT NULL DEFAULT '[]',
    uri          TEXT NOT NULL DEFAULT '',
    external_url TEXT,
    created_at   INTEGER NOT NULL,
    updated_at   INTEGER NOT NULL,
    deleted_at   INTEGER
);

CREATE TABLE IF NOT EXISTS albums (
    id                     TEXT PRIMARY KEY,
    external_id            TEXT NOT NULL UNIQUE,
    name                   TEXT NOT NULL,
    album_type             TEXT NOT NULL DEFAULT '',
    total_tracks           INTEGER NOT NULL DEFAULT 0,
    release_date           TEXT NOT NULL DEFAULT '',
    release_date_precision TEXT NOT NULL DEFAULT '',
    images                 TEXT NOT NULL DEFAULT '[]',
    uri                    TEXT NOT NULL DEFAULT '',
    artist_refs            TEXT NOT NULL DEFAULT '[]',
    created_at             INTEGER NOT NULL,
    updated_at             INTEGER NOT NULL,
    deleted_at             INTEGER
);

CREATE TABLE IF NOT EXISTS tracks (
    id           TEXT PRIMARY KEY,
    external_id  TEXT NOT NULL UNIQUE,
    name         TEXT NOT NULL,
    artist_refs  TEXT NOT NULL DEFAULT '[]',
    album_ref    TEXT,
    disc_number  INTEGER NOT NULL DEFAULT 0,
    track_number INTEGER NOT NULL DEFAULT 0,
    duration_ms  INTEGER NOT NULL DEFAULT 0,
    explicit     INTEGER NOT NULL DEFAULT 0,
    preview_url  TEXT,
    uri          TEXT NOT NULL DEFAULT '',
    play_count   INTEGER NOT NULL DEFAULT 0,
    created_at   INTEGER NOT NULL,
    updated_at   INTEGER NOT NULL,
    deleted_at   INTEGER
);

CREATE INDEX IF NOT EXISTS idx_tracks_album_ref ON tracks (album_ref);
CREATE INDEX IF NOT EXISTS idx_tracks_play_count ON tracks (play_count DESC);

CREATE TABLE IF NOT EXISTS playlists (
    id          TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    slug        TEXT NOT NULL UNIQUE,
    owner       TEXT NOT NULL,
    tracks      TEXT NOT NULL DEFAULT '[]',
    is_public   INTEGER NOT NULL DEFAULT 1,
    play_count  INTEGER NOT NULL DEFAULT 0,
    created_at  INTEGER NOT NULL,
    updated_at  INTEGER NOT NULL,
    deleted_at  INTEGER
);

CREATE INDEX IF NOT EXISTS idx_playlists_owner ON playlists (owner, created_at DESC);
";
