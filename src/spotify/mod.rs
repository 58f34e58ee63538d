//! # Spotify Integration Module
//!
//! Read-only access to the Spotify Web API catalog. Authentication lives in
//! [`crate::management::TokenManager`]; this module only issues the
//! authenticated `GET` requests the sync pipeline needs.
//!
//! ## API Coverage
//!
//! - `GET /artists/{id}` - single artist, used by the admin lookup
//! - `GET /artists?ids=..` - several artists, batched by 50 ids
//! - `GET /artists/{id}/albums` - one page of an artist's discography
//! - `GET /albums/{id}/tracks` - one page of an album's tracks for a market
//!
//! ## Error Handling
//!
//! Any non-2xx response becomes [`crate::error::SyncError::ExternalApi`]
//! carrying the endpoint path and status. Connection and decoding failures
//! become [`crate::error::SyncError::Transport`]. Nothing is retried.

pub mod catalog;

pub use catalog::CatalogClient;
