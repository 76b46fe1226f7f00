//! Audio output for trackdeck.
//!
//! The default build carries [`NullAudioEngine`], which keeps time without a
//! sound device. Enable `cpal-backend` for real output.

use std::sync::Arc;

mod engine;
mod frames;
#[cfg(feature = "cpal-backend")]
mod real;

pub use engine::{
    AudioEngine, AudioError, AudioHandle, AudioResult, AudioSource, AudioState, NullAudioEngine,
};
#[cfg(feature = "cpal-backend")]
pub use real::CpalAudioEngine;

/// The engine this build plays through.
pub fn default_engine() -> Arc<dyn AudioEngine> {
    #[cfg(feature = "cpal-backend")]
    {
        Arc::new(CpalAudioEngine)
    }
    #[cfg(not(feature = "cpal-backend"))]
    {
        tracing::info!("built without cpal-backend; playback is simulated");
        Arc::new(NullAudioEngine::default())
    }
}
