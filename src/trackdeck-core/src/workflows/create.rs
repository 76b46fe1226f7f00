use super::WorkflowContext;
use crate::gateway::GatewayError;
use crate::models::Track;
use crate::validation::{AudioFileError, AudioUpload, FormErrors, TrackForm};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CreateError {
    #[error("form is invalid: {0}")]
    Invalid(FormErrors),
    #[error("audio file rejected: {0}")]
    AudioFile(AudioFileError),
    #[error("failed to create track: {0}")]
    Create(GatewayError),
    /// The track exists, but without audio. It can be fixed through an edit.
    #[error("track '{}' was created but the audio upload failed: {source}", .track.title)]
    Upload { track: Track, source: GatewayError },
}

/// Two-phase create: metadata first, then the optional audio upload.
///
/// A failed upload does not roll back the created track.
#[derive(Debug, Clone)]
pub struct CreateWorkflow {
    ctx: WorkflowContext,
}

impl CreateWorkflow {
    pub fn new(ctx: WorkflowContext) -> Self {
        Self { ctx }
    }

    pub async fn submit(
        &self,
        form: &TrackForm,
        audio: Option<AudioUpload>,
    ) -> Result<Track, CreateError> {
        let draft = form.validate(true).map_err(|errors| {
            tracing::debug!(%errors, "create form rejected");
            CreateError::Invalid(errors)
        })?;
        if let Some(file) = &audio {
            file.check().map_err(CreateError::AudioFile)?;
        }

        let track = match self.ctx.gateway.create(&draft).await {
            Ok(track) => track,
            Err(err) => {
                self.ctx.handle_failure("create", &err).await;
                return Err(CreateError::Create(err));
            }
        };
        tracing::info!(track = %track.id, title = %track.title, "track created");

        if let Some(file) = audio {
            if let Err(err) = self.ctx.gateway.upload_audio(&track.id, &file).await {
                err.log("upload_audio");
                self.ctx.collection.refresh().await;
                return Err(CreateError::Upload { track, source: err });
            }
            tracing::info!(track = %track.id, file = %file.file_name, "audio uploaded");
        }

        self.ctx.collection.refresh().await;
        Ok(track)
    }
}
