use super::WorkflowContext;
use crate::gateway::GatewayError;
use crate::models::TrackId;
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeleteError {
    #[error("no deletion is awaiting confirmation")]
    NothingPending,
    #[error("a deletion is already in progress")]
    InFlight,
    #[error("failed to delete track: {0}")]
    Remove(GatewayError),
}

#[derive(Debug, Default)]
struct DeleteState {
    pending: Option<TrackId>,
    deleting: bool,
}

/// Request, confirm, then remove.
///
/// Only one removal runs at a time; a second confirmation while one is in
/// flight is refused without contacting the gateway.
#[derive(Debug)]
pub struct DeleteWorkflow {
    ctx: WorkflowContext,
    state: Mutex<DeleteState>,
}

impl DeleteWorkflow {
    pub fn new(ctx: WorkflowContext) -> Self {
        Self {
            ctx,
            state: Mutex::new(DeleteState::default()),
        }
    }

    /// Marks `id` as awaiting confirmation. Refused while a removal is running.
    pub fn request(&self, id: TrackId) -> bool {
        let mut state = self.lock();
        if state.deleting {
            return false;
        }
        state.pending = Some(id);
        true
    }

    pub fn cancel(&self) {
        let mut state = self.lock();
        if !state.deleting {
            state.pending = None;
        }
    }

    pub fn pending(&self) -> Option<TrackId> {
        self.lock().pending.clone()
    }

    pub fn is_deleting(&self) -> bool {
        self.lock().deleting
    }

    /// Removes the pending track.
    ///
    /// On success playback of the track is stopped and the collection refreshed.
    /// On failure the listing is left as it was unless the track had already
    /// vanished server-side.
    pub async fn confirm(&self) -> Result<TrackId, DeleteError> {
        let id = {
            let mut state = self.lock();
            if state.deleting {
                return Err(DeleteError::InFlight);
            }
            let id = state.pending.clone().ok_or(DeleteError::NothingPending)?;
            state.deleting = true;
            id
        };

        let result = self.ctx.gateway.remove(&id).await;
        {
            let mut state = self.lock();
            state.deleting = false;
            state.pending = None;
        }

        match result {
            Ok(()) => {
                tracing::info!(track = %id, "track deleted");
                if self.ctx.playback.stop_all(&id) {
                    tracing::debug!(track = %id, "stopped playback of deleted track");
                }
                self.ctx.collection.refresh().await;
                Ok(id)
            }
            Err(err) => {
                self.ctx.handle_failure("remove", &err).await;
                Err(DeleteError::Remove(err))
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, DeleteState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
