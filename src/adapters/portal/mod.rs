//! Transfer Portal Feed Adapter
//!
//! Implements the `PortalFeed` port by scraping the On3 transfer-portal
//! rankings pages.
//!
//! Sub-modules:
//! - `client`: HTTP client, season fallback and concurrent paging
//! - `next_data`: `__NEXT_DATA__` extraction and pagination
//! - `transform`: raw player JSON to `PlayerRecord`
//! - `types`: raw page payload types

pub mod client;
pub mod next_data;
pub mod transform;
pub mod types;

pub use client::On3Feed;
