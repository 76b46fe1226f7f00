use crate::models::{PageResult, Query, StreamUrl, Track, TrackDraft, TrackId, TrackPatch};
use crate::validation::AudioUpload;
use thiserror::Error;

/// Failure kinds surfaced by the remote track store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("validation error: {message}")]
    Validation { message: String },
    #[error("unsupported media type: {content_type}")]
    UnsupportedMedia { content_type: String },
    #[error("payload too large: {size} bytes exceeds limit of {limit} bytes")]
    PayloadTooLarge { size: u64, limit: u64 },
    #[error("entity not found: {entity}")]
    NotFound { entity: String },
    #[error("network error: {message}")]
    Network { message: String },
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },
}

/// Where a failure should be presented to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSurface {
    /// Inline, next to the offending form field.
    Field,
    /// Next to the audio file control.
    FileControl,
    /// Dismissible notification; the list keeps its previous contents.
    Notification,
}

impl GatewayError {
    pub fn surface(&self) -> ErrorSurface {
        match self {
            GatewayError::Validation { .. } => ErrorSurface::Field,
            GatewayError::UnsupportedMedia { .. } | GatewayError::PayloadTooLarge { .. } => {
                ErrorSurface::FileControl
            }
            GatewayError::NotFound { .. }
            | GatewayError::Network { .. }
            | GatewayError::Server { .. } => ErrorSurface::Notification,
        }
    }

    /// The entity vanished between listing and acting on it.
    pub fn requires_refresh(&self) -> bool {
        matches!(self, GatewayError::NotFound { .. })
    }

    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            GatewayError::Network { .. } | GatewayError::Server { .. }
        )
    }

    /// Logs at a level matching the failure's nature: client mistakes are not faults.
    pub fn log(&self, operation: &str) {
        if self.is_transient() {
            tracing::warn!(operation, error = %self, "gateway call failed");
        } else {
            tracing::debug!(operation, error = %self, "gateway rejected request");
        }
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Remote track store consumed by the collection controller and the workflows.
///
/// Implementations never partially populate a list result: either the whole page
/// arrives or the call fails.
#[async_trait::async_trait]
pub trait TrackGateway: Send + Sync {
    /// Stable identifier for logs (e.g. "rest" or "memory").
    fn id(&self) -> &str;

    async fn list(&self, query: &Query) -> GatewayResult<PageResult>;

    async fn create(&self, draft: &TrackDraft) -> GatewayResult<Track>;

    /// Attaches (or replaces) the audio file of an existing track.
    async fn upload_audio(&self, id: &TrackId, file: &AudioUpload) -> GatewayResult<()>;

    async fn update(&self, id: &TrackId, patch: &TrackPatch) -> GatewayResult<Track>;

    async fn remove(&self, id: &TrackId) -> GatewayResult<()>;

    /// Detaches the audio file, leaving the metadata in place.
    async fn remove_audio(&self, id: &TrackId) -> GatewayResult<()>;

    async fn genres(&self) -> GatewayResult<Vec<String>>;

    /// Resolves the track's audio reference to a fetchable URL.
    fn stream_url(&self, track: &Track) -> Option<StreamUrl>;

    /// Downloads the audio behind a URL from [`TrackGateway::stream_url`].
    async fn fetch_audio(&self, url: &StreamUrl) -> GatewayResult<Vec<u8>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surfaces_follow_error_kind() {
        let validation = GatewayError::Validation {
            message: "title".into(),
        };
        let too_large = GatewayError::PayloadTooLarge {
            size: 11,
            limit: 10,
        };
        let network = GatewayError::Network {
            message: "offline".into(),
        };
        assert_eq!(validation.surface(), ErrorSurface::Field);
        assert_eq!(too_large.surface(), ErrorSurface::FileControl);
        assert_eq!(network.surface(), ErrorSurface::Notification);
        assert!(network.is_transient());
        assert!(!validation.is_transient());
    }

    #[test]
    fn only_not_found_requires_refresh() {
        let missing = GatewayError::NotFound {
            entity: "t1".into(),
        };
        let server = GatewayError::Server {
            status: 500,
            message: "boom".into(),
        };
        assert!(missing.requires_refresh());
        assert!(!server.requires_refresh());
    }
}
