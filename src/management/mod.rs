//! Catalog management: tokens, sync and the local read and write paths.

mod artist;
mod auth;
mod ordered_join;
mod playlist;
mod reconcile;
mod track;

pub use artist::ArtistManager;
pub use auth::{CachedToken, EXPIRY_BUFFER_MS, TokenManager};
pub use ordered_join::{DEFAULT_PAGE_LIMIT, OrderedJoinResolver, Page, PageRequest, order_by_ids};
pub use playlist::PlaylistManager;
pub use reconcile::ReconciliationEngine;
pub use track::TrackManager;
