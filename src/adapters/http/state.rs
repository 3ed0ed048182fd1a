//! Shared state handed to every handler.

use std::sync::Arc;

use tokio::sync::watch;

use crate::adapters::metrics::MetricsRegistry;
use crate::ports::document_store::DocumentStore;
use crate::ports::portal_feed::PortalFeed;
use crate::usecases::{CommentService, PortalSync, VoteService};

pub struct AppState<F: PortalFeed, S: DocumentStore> {
    pub store: Arc<S>,
    pub sync: Arc<PortalSync<F, S>>,
    pub votes: Arc<VoteService<S>>,
    pub comments: Arc<CommentService<S>>,
    pub metrics: Arc<MetricsRegistry>,
    /// Bearer token required by `POST /sync`; `None` leaves it open.
    pub cron_secret: Option<Arc<str>>,
    /// Process shutdown signal, passed to API-triggered syncs.
    pub shutdown: watch::Receiver<bool>,
}

// Manual impl: a derive would require `F: Clone` and `S: Clone`.
impl<F: PortalFeed, S: DocumentStore> Clone for AppState<F, S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            sync: Arc::clone(&self.sync),
            votes: Arc::clone(&self.votes),
            comments: Arc::clone(&self.comments),
            metrics: Arc::clone(&self.metrics),
            cron_secret: self.cron_secret.clone(),
            shutdown: self.shutdown.clone(),
        }
    }
}
