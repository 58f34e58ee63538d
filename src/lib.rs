//! Spotify Catalog Synchronization Library
//!
//! This library ingests artist, album, track and genre metadata from the Spotify
//! Web API into a local SQLite catalog, reconciling Spotify identifiers against
//! local records so playlists and other features can rely on stable internal
//! references.
//!
//! # Modules
//!
//! - `api` - HTTP handlers for the administrative and playlist endpoints
//! - `cli` - Command-line interface implementations
//! - `config` - Configuration management and environment variables
//! - `error` - Error types shared by the sync pipeline and the store
//! - `management` - Token lifecycle, reconciliation and playlist management
//! - `server` - HTTP server wiring
//! - `spotify` - Spotify Web API client implementation
//! - `store` - Local catalog store (trait and SQLite implementation)
//! - `types` - Spotify wire types and table rows
//! - `utils` - Utility functions and helpers
//!
//! # Example
//!
//! ```
//! use tunesync::{cli::Services, config::{self, Config}};
//!
//! #[tokio::main]
//! async fn main() -> tunesync::Res<()> {
//!     config::load_env().await?;
//!     let services = Services::from_config(Config::from_env()?).await?;
//!     let artists = services
//!         .engine
//!         .sync_artists(&["4tZwfgrHOc3mvqYlEYSvVi".to_string()])
//!         .await?;
//!     println!("synced {} artists", artists.len());
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod management;
pub mod server;
pub mod spotify;
pub mod store;
pub mod types;
pub mod utils;

/// A convenient Result type alias for the command-line layer.
///
/// Library code returns typed errors from [`error`]; the CLI collapses them
/// into a boxed error so different failures can be reported uniformly.
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints an informational message with a blue bullet point.
///
/// # Example
///
/// ```
/// info!("Syncing {} artists...", count);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
///
/// # Example
///
/// ```
/// success!("Synced {} artists", count);
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Only for fatal errors at the top of a command; library code returns errors
/// instead.
///
/// # Example
///
/// ```
/// error!("Failed to open catalog: {}", e);
/// // Program exits here - code after this will not execute
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// # Example
///
/// ```
/// warning!("Track {} is no longer in the catalog", id);
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
