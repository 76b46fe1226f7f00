//! Keeps the audio engine in step with the playback coordinator.
//!
//! The coordinator decides which track is playing; this view fetches that
//! track's audio, plays it, stops it when the coordinator moves on, and
//! reports the end of the media back.

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::sync::watch;
use trackdeck_audio::{AudioEngine, AudioHandle, AudioSource, AudioState};
use trackdeck_core::{PlaybackCoordinator, StreamUrl, Track, TrackGateway, TrackId};

#[derive(Debug)]
enum PlayerEvent {
    Started { id: TrackId, handle: AudioHandle },
    Failed { id: TrackId, message: String },
}

pub(crate) struct AudioPlayer {
    engine: Arc<dyn AudioEngine>,
    playback: Arc<PlaybackCoordinator>,
    gateway: Arc<dyn TrackGateway>,
    runtime: Handle,
    following: watch::Receiver<Option<TrackId>>,
    events_tx: UnboundedSender<PlayerEvent>,
    events_rx: UnboundedReceiver<PlayerEvent>,
    current: Option<(TrackId, AudioHandle)>,
    loading: Option<TrackId>,
}

impl AudioPlayer {
    pub(crate) fn new(
        engine: Arc<dyn AudioEngine>,
        playback: Arc<PlaybackCoordinator>,
        gateway: Arc<dyn TrackGateway>,
        runtime: Handle,
    ) -> Self {
        let following = playback.subscribe();
        let (events_tx, events_rx) = unbounded_channel();
        Self {
            engine,
            playback,
            gateway,
            runtime,
            following,
            events_tx,
            events_rx,
            current: None,
            loading: None,
        }
    }

    /// Fetches and starts `track` in the background. Call after the
    /// coordinator has switched to it.
    pub(crate) fn start(&mut self, track: &Track) -> Result<(), String> {
        let url = self
            .gateway
            .stream_url(track)
            .ok_or_else(|| format!("'{}' has no audio to play", track.title))?;
        self.stop_current();
        self.loading = Some(track.id.clone());

        let id = track.id.clone();
        let gateway = self.gateway.clone();
        let engine = self.engine.clone();
        let tx = self.events_tx.clone();
        self.runtime.spawn(async move {
            let event = match gateway.fetch_audio(&url).await {
                Ok(bytes) => {
                    let source = AudioSource::Memory {
                        bytes,
                        extension: extension_of(&url),
                    };
                    match tokio::task::spawn_blocking(move || engine.play(source)).await {
                        Ok(Ok(handle)) => PlayerEvent::Started { id, handle },
                        Ok(Err(err)) => PlayerEvent::Failed {
                            id,
                            message: format!("Cannot play audio: {err}"),
                        },
                        Err(err) => PlayerEvent::Failed {
                            id,
                            message: format!("Audio task failed: {err}"),
                        },
                    }
                }
                Err(err) => {
                    err.log("fetch_audio");
                    PlayerEvent::Failed {
                        id,
                        message: format!("Cannot load audio: {err}"),
                    }
                }
            };
            let _ = tx.send(event);
        });
        Ok(())
    }

    /// Reconciles the engine with the coordinator. Returns a message worth
    /// showing when something went wrong.
    pub(crate) fn sync(&mut self) -> Option<String> {
        let mut message = None;

        while let Ok(event) = self.events_rx.try_recv() {
            match event {
                PlayerEvent::Started { id, handle } => {
                    if self.loading.as_ref() == Some(&id) && self.wanted().as_ref() == Some(&id) {
                        tracing::info!(track = %id, "audio started");
                        self.loading = None;
                        self.stop_current();
                        self.current = Some((id, handle));
                    } else {
                        handle.stop();
                    }
                }
                PlayerEvent::Failed { id, message: text } => {
                    if self.loading.as_ref() == Some(&id) {
                        tracing::warn!(track = %id, error = %text, "audio did not start");
                        self.loading = None;
                        self.playback.pause(&id);
                        message = Some(text);
                    }
                }
            }
        }

        let wanted = self.wanted();
        let current = self
            .current
            .as_ref()
            .map(|(id, handle)| (id.clone(), handle.state()));
        if let Some((id, state)) = current {
            let still_wanted = wanted.as_ref() == Some(&id);
            match state {
                AudioState::Completed if still_wanted => {
                    tracing::debug!(track = %id, "audio finished");
                    self.playback.media_ended(&id);
                }
                AudioState::Error => {
                    self.playback.pause(&id);
                    message = Some("Audio output failed".to_string());
                }
                _ => {}
            }
            if state != AudioState::Playing || !still_wanted {
                self.stop_current();
            }
        }

        if self.loading.is_some() && self.loading != self.wanted() {
            self.loading = None;
        }
        message
    }

    /// Track whose audio is being fetched or opened.
    pub(crate) fn loading(&self) -> Option<&TrackId> {
        self.loading.as_ref()
    }

    fn wanted(&self) -> Option<TrackId> {
        self.following.borrow().clone()
    }

    fn stop_current(&mut self) {
        if let Some((_, handle)) = self.current.take() {
            handle.stop();
        }
    }
}

fn extension_of(url: &StreamUrl) -> Option<String> {
    let path = url.0.split(['?', '#']).next()?;
    let name = path.rsplit('/').next()?;
    name.rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
}
