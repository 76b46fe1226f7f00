use crate::gateway::{GatewayError, TrackGateway};
use crate::models::{Query, TrackDraft, TrackId, TrackPatch};
use crate::validation::{AudioUpload, AUDIO_CONTENT_TYPE};
use thiserror::Error;

/// Fixtures supplied by a gateway implementation to run the shared contract suite.
#[derive(Debug, Clone)]
pub struct GatewayContractExpectations {
    /// Query used to verify paging.
    pub query: Query,
    /// Metadata for the track the suite creates.
    pub draft: TrackDraft,
    /// An id the backing store is known not to contain.
    pub missing_id: TrackId,
}

impl Default for GatewayContractExpectations {
    fn default() -> Self {
        Self {
            query: Query::first_page(10),
            draft: TrackDraft {
                title: "Contract Track".into(),
                artist: "Contract Artist".into(),
                album: "Contract Album".into(),
                genres: vec!["Rock".into()],
                cover_image: None,
            },
            missing_id: TrackId::new("does-not-exist"),
        }
    }
}

/// Errors surfaced by the gateway contract harness.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GatewayContractError {
    #[error("list returned {returned} tracks for a page size of {limit}")]
    PageOverflow { returned: usize, limit: u32 },
    #[error("list returned tracks but reported {total_pages} total pages")]
    InconsistentTotalPages { total_pages: u32 },
    #[error("create returned a track without an id")]
    MissingId,
    #[error("create did not echo the submitted title: expected {expected:?}, got {actual:?}")]
    CreateMismatch { expected: String, actual: String },
    #[error("update did not apply the patch: expected title {expected:?}, got {actual:?}")]
    UpdateMismatch { expected: String, actual: String },
    #[error("gateway accepted an upload with content type {content_type}")]
    UnsupportedMediaAccepted { content_type: String },
    #[error("expected {expected} for {operation}, got {actual:?}")]
    UnexpectedOutcome {
        operation: &'static str,
        expected: &'static str,
        actual: Option<GatewayError>,
    },
    #[error("gateway error while running contract: {0}")]
    GatewayFailure(String),
}

/// Runs the shared contract suite against a gateway implementation.
///
/// The suite creates one track, uploads audio to it, patches and finally
/// removes it, then checks the not-found paths against `missing_id`.
pub async fn run_gateway_contract<G: TrackGateway + ?Sized>(
    gateway: &G,
    expectations: &GatewayContractExpectations,
) -> Result<(), GatewayContractError> {
    verify_list(gateway, expectations).await?;
    let id = verify_create(gateway, expectations).await?;
    verify_upload(gateway, &id).await?;
    verify_update(gateway, &id, expectations).await?;
    verify_remove(gateway, &id).await?;
    verify_missing(gateway, expectations).await?;
    Ok(())
}

fn failure(err: GatewayError) -> GatewayContractError {
    GatewayContractError::GatewayFailure(err.to_string())
}

async fn verify_list<G: TrackGateway + ?Sized>(
    gateway: &G,
    expectations: &GatewayContractExpectations,
) -> Result<(), GatewayContractError> {
    let page = gateway.list(&expectations.query).await.map_err(failure)?;
    if page.tracks.len() > expectations.query.limit as usize {
        return Err(GatewayContractError::PageOverflow {
            returned: page.tracks.len(),
            limit: expectations.query.limit,
        });
    }
    if !page.tracks.is_empty() && page.total_pages == 0 {
        return Err(GatewayContractError::InconsistentTotalPages {
            total_pages: page.total_pages,
        });
    }
    Ok(())
}

async fn verify_create<G: TrackGateway + ?Sized>(
    gateway: &G,
    expectations: &GatewayContractExpectations,
) -> Result<TrackId, GatewayContractError> {
    let track = gateway
        .create(&expectations.draft)
        .await
        .map_err(failure)?;
    if track.id.as_ref().is_empty() {
        return Err(GatewayContractError::MissingId);
    }
    if track.title != expectations.draft.title {
        return Err(GatewayContractError::CreateMismatch {
            expected: expectations.draft.title.clone(),
            actual: track.title,
        });
    }
    Ok(track.id)
}

async fn verify_upload<G: TrackGateway + ?Sized>(
    gateway: &G,
    id: &TrackId,
) -> Result<(), GatewayContractError> {
    let wav = AudioUpload::new("contract.wav", "audio/wav", vec![0; 8]);
    match gateway.upload_audio(id, &wav).await {
        Err(GatewayError::UnsupportedMedia { .. }) => {}
        Ok(()) => {
            return Err(GatewayContractError::UnsupportedMediaAccepted {
                content_type: wav.content_type,
            })
        }
        Err(other) => {
            return Err(GatewayContractError::UnexpectedOutcome {
                operation: "upload_audio",
                expected: "UnsupportedMedia",
                actual: Some(other),
            })
        }
    }

    let mp3 = AudioUpload::new("contract.mp3", AUDIO_CONTENT_TYPE, b"ID3".to_vec());
    gateway.upload_audio(id, &mp3).await.map_err(failure)
}

async fn verify_update<G: TrackGateway + ?Sized>(
    gateway: &G,
    id: &TrackId,
    expectations: &GatewayContractExpectations,
) -> Result<(), GatewayContractError> {
    let expected = format!("{} (edited)", expectations.draft.title);
    let patch = TrackPatch {
        title: Some(expected.clone()),
        ..TrackPatch::default()
    };
    let updated = gateway.update(id, &patch).await.map_err(failure)?;
    if updated.title != expected {
        return Err(GatewayContractError::UpdateMismatch {
            expected,
            actual: updated.title,
        });
    }
    Ok(())
}

async fn verify_remove<G: TrackGateway + ?Sized>(
    gateway: &G,
    id: &TrackId,
) -> Result<(), GatewayContractError> {
    gateway.remove(id).await.map_err(failure)
}

async fn verify_missing<G: TrackGateway + ?Sized>(
    gateway: &G,
    expectations: &GatewayContractExpectations,
) -> Result<(), GatewayContractError> {
    let missing = &expectations.missing_id;

    match gateway.update(missing, &TrackPatch::default()).await {
        Err(GatewayError::NotFound { .. }) => {}
        other => {
            return Err(GatewayContractError::UnexpectedOutcome {
                operation: "update",
                expected: "NotFound",
                actual: other.err(),
            })
        }
    }

    match gateway.remove(missing).await {
        Err(GatewayError::NotFound { .. }) => Ok(()),
        other => Err(GatewayContractError::UnexpectedOutcome {
            operation: "remove",
            expected: "NotFound",
            actual: other.err(),
        }),
    }
}
