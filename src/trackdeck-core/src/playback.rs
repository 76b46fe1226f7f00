use crate::models::{Track, TrackId};
use thiserror::Error;
use tokio::sync::watch;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    #[error("track {id} has no audio file")]
    NoAudio { id: TrackId },
}

/// Single source of truth for which track is playing.
///
/// At most one id is marked at a time. Every transition goes through this type so
/// that explicit pauses, end-of-media callbacks, deletions and audio replacements
/// all use compare-and-clear semantics. Media elements subscribe and follow the
/// id; the coordinator never touches audio itself.
#[derive(Debug)]
pub struct PlaybackCoordinator {
    playing: watch::Sender<Option<TrackId>>,
}

impl Default for PlaybackCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackCoordinator {
    pub fn new() -> Self {
        let (playing, _) = watch::channel(None);
        Self { playing }
    }

    pub fn playing(&self) -> Option<TrackId> {
        self.playing.borrow().clone()
    }

    pub fn is_playing(&self, id: &TrackId) -> bool {
        self.playing.borrow().as_ref() == Some(id)
    }

    /// Receiver notified on every change of the playing id.
    pub fn subscribe(&self) -> watch::Receiver<Option<TrackId>> {
        self.playing.subscribe()
    }

    /// Marks `track` as playing, evicting whatever played before.
    ///
    /// Returns the evicted id so the caller can pause that media element.
    pub fn play(&self, track: &Track) -> Result<Option<TrackId>, PlaybackError> {
        if !track.has_audio() {
            return Err(PlaybackError::NoAudio {
                id: track.id.clone(),
            });
        }
        let mut evicted = None;
        self.playing.send_if_modified(|current| {
            if current.as_ref() == Some(&track.id) {
                return false;
            }
            evicted = current.replace(track.id.clone());
            true
        });
        tracing::debug!(track = %track.id, evicted = ?evicted, "playback started");
        Ok(evicted)
    }

    /// Clears the playing id only if it still belongs to `id`.
    ///
    /// A pause from a player that is no longer active is ignored.
    pub fn pause(&self, id: &TrackId) -> bool {
        self.clear_if(id, "paused")
    }

    /// End-of-media callback; same compare-and-clear rule as [`pause`](Self::pause).
    pub fn media_ended(&self, id: &TrackId) -> bool {
        self.clear_if(id, "ended")
    }

    /// Stops playback of a track that was deleted or had its audio changed.
    pub fn stop_all(&self, id: &TrackId) -> bool {
        self.clear_if(id, "stopped")
    }

    /// Play if idle or playing something else, pause if `track` is the one playing.
    pub fn toggle(&self, track: &Track) -> Result<bool, PlaybackError> {
        if self.is_playing(&track.id) {
            self.pause(&track.id);
            Ok(false)
        } else {
            self.play(track)?;
            Ok(true)
        }
    }

    fn clear_if(&self, id: &TrackId, reason: &'static str) -> bool {
        let cleared = self.playing.send_if_modified(|current| {
            if current.as_ref() == Some(id) {
                *current = None;
                true
            } else {
                false
            }
        });
        if cleared {
            tracing::debug!(track = %id, reason, "playback cleared");
        } else {
            tracing::trace!(track = %id, reason, "ignored stale playback transition");
        }
        cleared
    }
}
