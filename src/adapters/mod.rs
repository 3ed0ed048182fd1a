//! Adapters Layer - Hexagonal Architecture Outer Ring
//!
//! Implements the port traits defined in `crate::ports` with concrete
//! external dependencies (HTTP scraping, file I/O) and exposes the
//! service over HTTP. Each sub-module groups adapters by
//! infrastructure concern.
//!
//! Adapter categories:
//! - `http`: axum API (events, votes, players, sync trigger, probes)
//! - `metrics`: Prometheus registry for sync and vote metrics
//! - `persistence`: JSON-file and in-memory document stores
//! - `portal`: On3 transfer-portal rankings scraper

pub mod http;
pub mod metrics;
pub mod persistence;
pub mod portal;
