//! Use Cases Layer - Application Business Logic
//!
//! Orchestrates domain logic with port interfaces to implement the
//! tracker's workflows.
//!
//! Use cases:
//! - `PortalSync`: fetch, detect and commit one sync run
//! - `VoteService`: cast and read community votes
//! - `CommentService`: post, list and vote on fan comments
//! - `SyncScheduler`: periodic sync loop with graceful shutdown

pub mod comments;
pub mod scheduler;
pub mod sync;
pub mod votes;

pub use comments::CommentService;
pub use scheduler::SyncScheduler;
pub use sync::{PortalSync, SyncReport};
pub use votes::VoteService;
