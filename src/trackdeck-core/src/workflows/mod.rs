//! User-triggered mutations: create, edit and delete.
//!
//! Each workflow calls the gateway, keeps playback consistent and refreshes the
//! collection once a write commits. Failures are returned as values describing
//! which phase failed; nothing here panics or leaves the UI without an answer.
//! Workflows are not queued against each other, and concurrent edits of the same
//! track are not locked: the last write to commit wins.

mod create;
mod delete;
mod edit;

pub use create::{CreateError, CreateWorkflow};
pub use delete::{DeleteError, DeleteWorkflow};
pub use edit::{AudioChange, EditError, EditOutcome, EditWorkflow};

use crate::collection::CollectionController;
use crate::gateway::{GatewayError, TrackGateway};
use crate::playback::PlaybackCoordinator;
use std::sync::Arc;

/// Collaborators shared by every workflow.
#[derive(Clone)]
pub struct WorkflowContext {
    pub gateway: Arc<dyn TrackGateway>,
    pub collection: Arc<CollectionController>,
    pub playback: Arc<PlaybackCoordinator>,
}

impl WorkflowContext {
    pub fn new(
        collection: Arc<CollectionController>,
        playback: Arc<PlaybackCoordinator>,
    ) -> Self {
        Self {
            gateway: collection.gateway().clone(),
            collection,
            playback,
        }
    }

    /// Logs the failure and refreshes when the target vanished server-side.
    async fn handle_failure(&self, operation: &'static str, err: &GatewayError) {
        err.log(operation);
        if err.requires_refresh() {
            self.collection.refresh().await;
        }
    }
}

impl std::fmt::Debug for WorkflowContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowContext")
            .field("gateway", &self.gateway.id())
            .finish_non_exhaustive()
    }
}
