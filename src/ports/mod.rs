//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) that the use-case layer requires
//! from the outside world. Adapters implement these traits.
//!
//! Port categories:
//! - `PortalFeed`: Current transfer-portal player list
//! - `DocumentStore`: Snapshots, events, votes and sync metadata

pub mod document_store;
pub mod portal_feed;
