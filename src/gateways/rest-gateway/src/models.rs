use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct TrackPagedResponse {
    pub data: Vec<WireTrack>,
    #[serde(default)]
    pub meta: PaginationMetadata,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMetadata {
    #[serde(default)]
    pub total_pages: Option<u32>,
}

/// Ids arrive either as JSON strings or numbers depending on the backend.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum WireId {
    Text(String),
    Number(serde_json::Number),
}

impl WireId {
    pub fn into_string(self) -> String {
        match self {
            WireId::Text(text) => text,
            WireId::Number(number) => number.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireTrack {
    pub id: WireId,
    pub title: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub album: String,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub audio_file: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTrackRequest<'a> {
    pub title: &'a str,
    pub artist: &'a str,
    pub album: &'a str,
    pub genres: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTrackRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub album: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genres: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<&'a str>,
}

/// Error payloads seen in the wild: `{"error": ..}` or `{"message": ..}`.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}
