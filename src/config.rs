//! Configuration management for tunesync.
//!
//! Configuration comes from environment variables, optionally seeded from a
//! `.env` file in the local data directory:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults (where applicable)

use std::{env, path::PathBuf};

use crate::error::ConfigError;

pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_MARKET: &str = "TH";
pub const DEFAULT_PAGE_SIZE: u32 = 50;
pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:3000";

/// Loads environment variables from a `.env` file in the local data directory.
///
/// The file lives under `tunesync/.env`:
/// - Linux: `~/.local/share/tunesync/.env`
/// - macOS: `~/Library/Application Support/tunesync/.env`
/// - Windows: `%LOCALAPPDATA%/tunesync/.env`
///
/// A missing file is not an error; variables may come from the process
/// environment alone. Variables already set in the environment are not
/// overridden.
pub async fn load_env() -> Result<(), ConfigError> {
    let path = data_dir().join(".env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent).await?;
    }

    if path.is_file() {
        dotenv::from_path(&path).map_err(|_| ConfigError::Invalid {
            key: "env file",
            value: path.display().to_string(),
        })?;
    }
    Ok(())
}

/// Returns the platform-specific data directory used by tunesync.
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("tunesync");
    path
}

/// Credentials and endpoints of the upstream catalog API.
#[derive(Debug, Clone)]
pub struct SpotifyConfig {
    pub client_id: String,
    pub client_secret: String,
    pub api_url: String,
    pub token_url: String,
    pub market: String,
}

/// Page sizes used by a sync pass. Only the first page is fetched.
#[derive(Debug, Clone, Copy)]
pub struct SyncConfig {
    pub album_page_size: u32,
    pub track_page_size: u32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            album_page_size: DEFAULT_PAGE_SIZE,
            track_page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub spotify: SpotifyConfig,
    pub sync: SyncConfig,
    pub db_path: PathBuf,
    pub server_address: String,
}

impl Config {
    /// Reads the full configuration from the environment.
    ///
    /// # Errors
    ///
    /// Fails when `SPOTIFY_CLIENT_ID` or `SPOTIFY_CLIENT_SECRET` is missing,
    /// or when a page size is not a positive integer.
    pub fn from_env() -> Result<Self, ConfigError> {
        let spotify = SpotifyConfig {
            client_id: required("SPOTIFY_CLIENT_ID")?,
            client_secret: required("SPOTIFY_CLIENT_SECRET")?,
            api_url: optional("SPOTIFY_API_URL", DEFAULT_API_URL),
            token_url: optional("SPOTIFY_API_TOKEN_URL", DEFAULT_TOKEN_URL),
            market: optional("SPOTIFY_MARKET", DEFAULT_MARKET),
        };

        let sync = SyncConfig {
            album_page_size: page_size("SYNC_ALBUM_PAGE_SIZE")?,
            track_page_size: page_size("SYNC_TRACK_PAGE_SIZE")?,
        };

        let db_path = env::var("CATALOG_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_dir().join("catalog.db"));

        Ok(Self {
            spotify,
            sync,
            db_path,
            server_address: optional("SERVER_ADDRESS", DEFAULT_SERVER_ADDRESS),
        })
    }
}

fn required(key: &'static str) -> Result<String, ConfigError> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(key)),
    }
}

fn optional(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn page_size(key: &'static str) -> Result<u32, ConfigError> {
    let Ok(raw) = env::var(key) else {
        return Ok(DEFAULT_PAGE_SIZE);
    };
    parse_page_size(key, &raw)
}

fn parse_page_size(key: &'static str, raw: &str) -> Result<u32, ConfigError> {
    // upstream list endpoints accept 1..=50
    match raw.trim().parse::<u32>() {
        Ok(size) if (1..=50).contains(&size) => Ok(size),
        _ => Err(ConfigError::Invalid {
            key,
            value: raw.to_string(),
        }),
    }
}
