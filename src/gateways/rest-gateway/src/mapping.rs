use crate::models::{CreateTrackRequest, ErrorBody, UpdateTrackRequest, WireTrack};
use reqwest::StatusCode;
use trackdeck_core::models::{Track, TrackDraft, TrackId, TrackPatch};
use trackdeck_core::validation::MAX_AUDIO_BYTES;
use trackdeck_core::{AudioUpload, GatewayError};

pub fn map_track(track: WireTrack) -> Track {
    Track {
        id: TrackId::new(track.id.into_string()),
        title: track.title,
        artist: track.artist,
        album: track.album,
        genres: track.genres,
        cover_image: track.cover_image.filter(|c| !c.trim().is_empty()),
        audio_file: track.audio_file.filter(|f| !f.trim().is_empty()),
        created_at: track.created_at,
        updated_at: track.updated_at,
    }
}

pub fn create_request(draft: &TrackDraft) -> CreateTrackRequest<'_> {
    CreateTrackRequest {
        title: &draft.title,
        artist: &draft.artist,
        album: &draft.album,
        genres: &draft.genres,
        cover_image: draft.cover_image.as_deref(),
    }
}

pub fn update_request(patch: &TrackPatch) -> UpdateTrackRequest<'_> {
    UpdateTrackRequest {
        title: patch.title.as_deref(),
        artist: patch.artist.as_deref(),
        album: patch.album.as_deref(),
        genres: patch.genres.as_deref(),
        cover_image: patch.cover_image.as_deref(),
    }
}

/// What a failed request was acting on, for error messages.
#[derive(Debug, Clone, Copy)]
pub struct Target<'a> {
    pub entity: &'a str,
    pub upload: Option<&'a AudioUpload>,
}

impl<'a> Target<'a> {
    pub fn collection() -> Self {
        Self {
            entity: "tracks",
            upload: None,
        }
    }

    pub fn track(id: &'a TrackId) -> Self {
        Self {
            entity: id.as_ref(),
            upload: None,
        }
    }

    pub fn upload(id: &'a TrackId, file: &'a AudioUpload) -> Self {
        Self {
            entity: id.as_ref(),
            upload: Some(file),
        }
    }
}

/// Extracts a human-readable message from an error response body.
pub fn error_message(status: StatusCode, body: &str) -> String {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    parsed
        .error
        .or(parsed.message)
        .filter(|m| !m.trim().is_empty())
        .or_else(|| (!body.trim().is_empty()).then(|| body.trim().to_string()))
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        })
}

pub fn map_status(status: StatusCode, message: String, target: Target<'_>) -> GatewayError {
    match status {
        StatusCode::BAD_REQUEST | StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => {
            GatewayError::Validation { message }
        }
        StatusCode::NOT_FOUND => GatewayError::NotFound {
            entity: target.entity.to_string(),
        },
        StatusCode::PAYLOAD_TOO_LARGE => GatewayError::PayloadTooLarge {
            size: target.upload.map(AudioUpload::size).unwrap_or_default(),
            limit: MAX_AUDIO_BYTES,
        },
        StatusCode::UNSUPPORTED_MEDIA_TYPE => GatewayError::UnsupportedMedia {
            content_type: target
                .upload
                .map(|file| file.content_type.clone())
                .unwrap_or(message),
        },
        other => GatewayError::Server {
            status: other.as_u16(),
            message,
        },
    }
}

pub fn map_transport(err: reqwest::Error) -> GatewayError {
    GatewayError::Network {
        message: err.to_string(),
    }
}

pub fn map_decode(err: reqwest::Error) -> GatewayError {
    GatewayError::Server {
        status: err.status().map(|s| s.as_u16()).unwrap_or(200),
        message: format!("malformed response: {err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_meta_only_needs_total_pages() {
        let body: crate::models::TrackPagedResponse = serde_json::from_str(
            r#"{"data": [], "meta": {"total": 7, "page": 2, "limit": 5, "totalPages": 2}}"#,
        )
        .expect("decode");
        assert_eq!(body.meta.total_pages, Some(2));

        let bare: crate::models::TrackPagedResponse =
            serde_json::from_str(r#"{"data": []}"#).expect("decode without meta");
        assert_eq!(bare.meta.total_pages, None);
    }

    #[test]
    fn numeric_ids_become_strings() {
        let wire: WireTrack = serde_json::from_str(
            r#"{"id": 42, "title": "T", "artist": "A", "album": "B", "audioFile": ""}"#,
        )
        .expect("decode");
        let track = map_track(wire);
        assert_eq!(track.id, TrackId::new("42"));
        assert!(track.audio_file.is_none());
    }

    #[test]
    fn status_mapping_follows_error_taxonomy() {
        let id = TrackId::new("7");
        let file = AudioUpload::new("a.mp3", "audio/mpeg", vec![0; 4]);
        assert!(matches!(
            map_status(StatusCode::NOT_FOUND, String::new(), Target::track(&id)),
            GatewayError::NotFound { entity } if entity == "7"
        ));
        assert!(matches!(
            map_status(StatusCode::UNPROCESSABLE_ENTITY, "bad".into(), Target::collection()),
            GatewayError::Validation { .. }
        ));
        assert_eq!(
            map_status(StatusCode::PAYLOAD_TOO_LARGE, String::new(), Target::upload(&id, &file)),
            GatewayError::PayloadTooLarge {
                size: 4,
                limit: MAX_AUDIO_BYTES
            }
        );
        assert!(matches!(
            map_status(StatusCode::BAD_GATEWAY, "down".into(), Target::collection()),
            GatewayError::Server { status: 502, .. }
        ));
    }

    #[test]
    fn error_message_prefers_json_fields() {
        assert_eq!(
            error_message(StatusCode::BAD_REQUEST, r#"{"error":"title taken"}"#),
            "title taken"
        );
        assert_eq!(error_message(StatusCode::BAD_REQUEST, "plain"), "plain");
        assert_eq!(
            error_message(StatusCode::INTERNAL_SERVER_ERROR, ""),
            "Internal Server Error"
        );
    }

    #[test]
    fn patch_body_omits_untouched_fields() {
        let patch = TrackPatch {
            title: Some("New".into()),
            cover_image: Some(String::new()),
            ..TrackPatch::default()
        };
        let body = serde_json::to_value(update_request(&patch)).expect("encode");
        assert_eq!(body, serde_json::json!({"title": "New", "coverImage": ""}));
    }
}
