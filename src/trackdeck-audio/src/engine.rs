use std::{
    fmt,
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, MutexGuard,
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("audio backend unavailable: {0}")]
    Backend(String),
    #[error("cannot decode audio: {0}")]
    Decode(String),
    #[error("io error: {0}")]
    Io(String),
}

pub type AudioResult<T> = Result<T, AudioError>;

/// What to play.
#[derive(Clone)]
pub enum AudioSource {
    /// Bytes already fetched from the track service.
    Memory {
        bytes: Vec<u8>,
        /// File extension used as a format hint, e.g. "mp3".
        extension: Option<String>,
    },
    File(PathBuf),
}

impl fmt::Debug for AudioSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioSource::Memory { bytes, extension } => f
                .debug_struct("Memory")
                .field("len", &bytes.len())
                .field("extension", extension)
                .finish(),
            AudioSource::File(path) => f.debug_tuple("File").field(path).finish(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioState {
    Playing,
    /// The source ran out.
    Completed,
    /// Stopped by the caller before the end.
    Stopped,
    Error,
}

/// One playback in progress. Dropping the handle stops it.
pub struct AudioHandle {
    state: Arc<Mutex<AudioState>>,
    stop_flag: Arc<AtomicBool>,
    join: Option<JoinHandle<()>>,
}

impl fmt::Debug for AudioHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioHandle")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl AudioHandle {
    pub(crate) fn from_parts(
        state: Arc<Mutex<AudioState>>,
        stop_flag: Arc<AtomicBool>,
        join: JoinHandle<()>,
    ) -> Self {
        Self {
            state,
            stop_flag,
            join: Some(join),
        }
    }

    pub(crate) fn spawn_simulated(duration: Duration) -> Self {
        let state = Arc::new(Mutex::new(AudioState::Playing));
        let stop_flag = Arc::new(AtomicBool::new(false));

        let join = thread::spawn({
            let state = state.clone();
            let stop_flag = stop_flag.clone();
            move || {
                let tick = Duration::from_millis(10);
                let mut elapsed = Duration::ZERO;
                while elapsed < duration && !stop_flag.load(Ordering::SeqCst) {
                    thread::sleep(tick);
                    elapsed += tick;
                }
                let mut guard = lock_state(&state);
                *guard = if stop_flag.load(Ordering::SeqCst) {
                    AudioState::Stopped
                } else {
                    AudioState::Completed
                };
            }
        });

        Self::from_parts(state, stop_flag, join)
    }

    pub fn state(&self) -> AudioState {
        *lock_state(&self.state)
    }

    /// Stops playback and waits for the output thread to wind down.
    pub fn stop(mut self) {
        self.stop_flag.store(true, Ordering::SeqCst);
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

impl Drop for AudioHandle {
    fn drop(&mut self) {
        self.stop_flag.store(true, Ordering::SeqCst);
    }
}

pub(crate) fn lock_state(state: &Mutex<AudioState>) -> MutexGuard<'_, AudioState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Audio backend interface.
///
/// `play` may block while the source is opened; call it off the async runtime.
pub trait AudioEngine: Send + Sync + fmt::Debug {
    fn play(&self, source: AudioSource) -> AudioResult<AudioHandle>;
}

/// Engine that produces no sound and reports completion after a fixed time.
#[derive(Debug, Clone)]
pub struct NullAudioEngine {
    duration: Duration,
}

impl Default for NullAudioEngine {
    fn default() -> Self {
        Self::with_duration(Duration::from_secs(30))
    }
}

impl NullAudioEngine {
    pub fn with_duration(duration: Duration) -> Self {
        Self { duration }
    }
}

impl AudioEngine for NullAudioEngine {
    fn play(&self, source: AudioSource) -> AudioResult<AudioHandle> {
        tracing::debug!(?source, duration = ?self.duration, "simulating playback");
        Ok(AudioHandle::spawn_simulated(self.duration))
    }
}
