//! Domain layer - Core transfer-portal models and change detection.
//!
//! Pure logic only (hexagonal architecture inner ring): no network,
//! no storage. All types are serializable and testable in isolation.

pub mod comment;
pub mod detector;
pub mod event;
pub mod player;
pub mod roster;
pub mod vote;

// Re-export core types for convenience
pub use comment::{Comment, CommentId, NewComment};
pub use detector::{ChangeDetector, Detection, DetectorThresholds};
pub use event::{EventKind, PortalEvent};
pub use player::{PlayerId, PlayerRecord, PlayerSnapshot, School};
pub use roster::RosterQuery;
pub use vote::{VoteDirection, VoteTally};
