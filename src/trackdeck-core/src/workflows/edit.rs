use super::WorkflowContext;
use crate::gateway::GatewayError;
use crate::models::{Track, TrackPatch};
use crate::validation::{AudioFileError, AudioUpload, FormErrors, TrackForm};
use thiserror::Error;

/// What to do with the track's audio during an edit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AudioChange {
    #[default]
    Keep,
    Replace(AudioUpload),
    Remove,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// Nothing differed from the original; the gateway was not contacted.
    Unchanged,
    Saved(Track),
}

#[derive(Debug, Error)]
pub enum EditError {
    #[error("form is invalid: {0}")]
    Invalid(FormErrors),
    #[error("audio file rejected: {0}")]
    AudioFile(AudioFileError),
    #[error("failed to update track: {0}")]
    Update(GatewayError),
    /// Metadata changes (if any) were saved; only the audio step failed.
    #[error("track '{}' was saved but the audio change failed: {source}", .track.title)]
    Audio { track: Track, source: GatewayError },
}

/// Metadata update followed by an optional audio replacement or removal.
#[derive(Debug, Clone)]
pub struct EditWorkflow {
    ctx: WorkflowContext,
}

impl EditWorkflow {
    pub fn new(ctx: WorkflowContext) -> Self {
        Self { ctx }
    }

    /// Applies `form` and `audio` to `original`.
    ///
    /// If the audio reference changes while the track is playing, playback of it is
    /// stopped before the collection refresh is issued.
    pub async fn submit(
        &self,
        original: &Track,
        form: &TrackForm,
        audio: AudioChange,
    ) -> Result<EditOutcome, EditError> {
        let draft = form.validate(false).map_err(|errors| {
            tracing::debug!(track = %original.id, %errors, "edit form rejected");
            EditError::Invalid(errors)
        })?;
        if let AudioChange::Replace(file) = &audio {
            file.check().map_err(EditError::AudioFile)?;
        }

        let patch = TrackPatch::between(original, &draft);
        let audio = match audio {
            AudioChange::Remove if !original.has_audio() => AudioChange::Keep,
            other => other,
        };
        if patch.is_empty() && audio == AudioChange::Keep {
            return Ok(EditOutcome::Unchanged);
        }

        let mut track = original.clone();
        if !patch.is_empty() {
            track = match self.ctx.gateway.update(&original.id, &patch).await {
                Ok(updated) => updated,
                Err(err) => {
                    self.ctx.handle_failure("update", &err).await;
                    return Err(EditError::Update(err));
                }
            };
            tracing::info!(track = %track.id, "track metadata updated");
        }

        let audio_result = match &audio {
            AudioChange::Keep => Ok(()),
            AudioChange::Replace(file) => self
                .ctx
                .gateway
                .upload_audio(&original.id, file)
                .await
                .map(|()| track.audio_file = Some(file.file_name.clone())),
            AudioChange::Remove => self
                .ctx
                .gateway
                .remove_audio(&original.id)
                .await
                .map(|()| track.audio_file = None),
        };

        if let Err(err) = audio_result {
            err.log("audio_change");
            if !patch.is_empty() || err.requires_refresh() {
                self.ctx.collection.refresh().await;
            }
            return Err(EditError::Audio { track, source: err });
        }

        let audio_changed = audio != AudioChange::Keep || track.audio_file != original.audio_file;
        if audio_changed && self.ctx.playback.stop_all(&original.id) {
            tracing::info!(track = %original.id, "stopped playback of replaced audio");
        }

        self.ctx.collection.refresh().await;
        let saved = self.ctx.collection.find(&original.id).unwrap_or(track);
        Ok(EditOutcome::Saved(saved))
    }
}
