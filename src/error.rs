//! Error types for the sync pipeline, the catalog store and configuration.

use std::fmt;

use thiserror::Error;

/// The kind of catalog document an error or a reference refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Genre,
    Artist,
    Album,
    Track,
    Playlist,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Genre => "genre",
            EntityKind::Artist => "artist",
            EntityKind::Album => "album",
            EntityKind::Track => "track",
            EntityKind::Playlist => "playlist",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique natural key (external id, genre name, slug) already exists.
    #[error("duplicate {entity} key '{key}'")]
    DuplicateKey { entity: EntityKind, key: String },

    #[error("{entity} '{id}' not found")]
    NotFound { entity: EntityKind, id: String },

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("malformed document field: {0}")]
    Json(#[from] serde_json::Error),

    #[error("store task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl StoreError {
    pub fn not_found(entity: EntityKind, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            entity,
            id: id.into(),
        }
    }
}

/// Failures surfaced by the token manager, the catalog client and the
/// reconciliation engine.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("credential grant rejected with status {status}")]
    AuthFailure { status: u16 },

    #[error("catalog request {endpoint} failed with status {status}")]
    ExternalApi { endpoint: String, status: u16 },

    #[error("request {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{entity} {external_id} changed underneath the sync")]
    ReconciliationFailure {
        entity: EntityKind,
        external_id: String,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl SyncError {
    /// Name of the pipeline stage that produced this error.
    pub fn stage(&self) -> &'static str {
        match self {
            SyncError::AuthFailure { .. } => "authentication",
            SyncError::ExternalApi { endpoint, .. } | SyncError::Transport { endpoint, .. } => {
                stage_for_endpoint(endpoint)
            }
            SyncError::ReconciliationFailure { entity, .. } => match entity {
                EntityKind::Artist => "upsert artist",
                EntityKind::Album => "upsert album",
                EntityKind::Track => "upsert track",
                EntityKind::Genre => "upsert genre",
                EntityKind::Playlist => "store",
            },
            SyncError::Store(_) => "store",
        }
    }
}

fn stage_for_endpoint(endpoint: &str) -> &'static str {
    if endpoint.ends_with("/tracks") {
        "fetch tracks"
    } else if endpoint.ends_with("/albums") {
        "fetch albums"
    } else if endpoint.contains("/artists") {
        "fetch artists"
    } else {
        "authentication"
    }
}

/// Failures of the playlist write and read paths.
#[derive(Debug, Error)]
pub enum PlaylistError {
    #[error("playlist '{playlist}' does not belong to '{user}'")]
    NotOwner { playlist: String, user: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl PlaylistError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, PlaylistError::Store(StoreError::NotFound { .. }))
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} has an invalid value '{value}'")]
    Invalid { key: &'static str, value: String },

    #[error("cannot prepare config directory: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_follows_the_failing_endpoint() {
        let err = SyncError::ExternalApi {
            endpoint: "/albums/abc/tracks".to_string(),
            status: 500,
        };
        assert_eq!(err.stage(), "fetch tracks");

        let err = SyncError::ExternalApi {
            endpoint: "/artists/abc/albums".to_string(),
            status: 404,
        };
        assert_eq!(err.stage(), "fetch albums");

        let err = SyncError::ExternalApi {
            endpoint: "/artists".to_string(),
            status: 429,
        };
        assert_eq!(err.stage(), "fetch artists");
    }

    #[test]
    fn reconciliation_failure_names_entity_and_key() {
        let err = SyncError::ReconciliationFailure {
            entity: EntityKind::Album,
            external_id: "4aawyAB9vmqN3uQ7FjRGTy".to_string(),
        };
        assert_eq!(err.stage(), "upsert album");
        assert_eq!(
            err.to_string(),
            "album 4aawyAB9vmqN3uQ7FjRGTy changed underneath the sync"
        );
    }
}
