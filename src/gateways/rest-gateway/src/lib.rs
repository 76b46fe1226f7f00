//! HTTP implementation of [`TrackGateway`] for the track service's JSON API.

mod mapping;
pub mod models;

use mapping::{map_decode, map_status, map_track, map_transport, Target};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use trackdeck_core::models::{
    PageResult, Query, StreamUrl, Track, TrackDraft, TrackId, TrackPatch,
};
use trackdeck_core::{AudioUpload, GatewayConfig, GatewayError, GatewayResult, TrackGateway};
use url::Url;

#[derive(Debug, Clone)]
pub struct RestGatewayConfig {
    pub base_url: String,
    /// Prefix joined with a track's `audioFile`. Defaults to `<base_url>/uploads/`.
    pub audio_base_url: Option<String>,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl RestGatewayConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            audio_base_url: None,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(20),
        }
    }
}

impl From<&GatewayConfig> for RestGatewayConfig {
    fn from(config: &GatewayConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            audio_base_url: Some(config.resolved_audio_base_url()),
            connect_timeout: config.connect_timeout(),
            request_timeout: config.request_timeout(),
        }
    }
}

#[derive(Debug, Error)]
pub enum RestGatewayError {
    #[error("invalid {field}: {source}")]
    InvalidUrl {
        field: &'static str,
        source: url::ParseError,
    },
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

#[derive(Debug, Clone)]
pub struct RestGateway {
    client: Client,
    base_url: Url,
    audio_base_url: Url,
}

impl RestGateway {
    pub fn new(config: RestGatewayConfig) -> Result<Self, RestGatewayError> {
        let base_url = parse_dir_url("base_url", &config.base_url)?;
        let audio_base_url = match &config.audio_base_url {
            Some(url) => parse_dir_url("audio_base_url", url)?,
            None => base_url
                .join("uploads/")
                .map_err(|source| RestGatewayError::InvalidUrl {
                    field: "audio_base_url",
                    source,
                })?,
        };
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            client,
            base_url,
            audio_base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> GatewayResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| GatewayError::Validation {
                message: format!("invalid request path {path}: {e}"),
            })
    }

    fn track_endpoint(&self, id: &TrackId, suffix: &str) -> GatewayResult<Url> {
        let mut url = self.endpoint("api/tracks/")?;
        url.path_segments_mut()
            .map_err(|()| GatewayError::Validation {
                message: "base_url cannot carry a path".into(),
            })?
            .pop_if_empty()
            .push(id.as_ref())
            .extend(suffix.split('/').filter(|s| !s.is_empty()));
        Ok(url)
    }

    /// Sends the request and turns non-success statuses into gateway errors.
    async fn send(&self, request: RequestBuilder, target: Target<'_>) -> GatewayResult<Response> {
        let resp = request.send().await.map_err(map_transport)?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        let message = mapping::error_message(status, &body);
        Err(map_status(status, message, target))
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        target: Target<'_>,
    ) -> GatewayResult<T> {
        self.send(request, target)
            .await?
            .json()
            .await
            .map_err(map_decode)
    }
}

fn parse_dir_url(field: &'static str, raw: &str) -> Result<Url, RestGatewayError> {
    let mut normalized = raw.trim().to_string();
    if !normalized.ends_with('/') {
        normalized.push('/');
    }
    Url::parse(&normalized).map_err(|source| RestGatewayError::InvalidUrl { field, source })
}

fn list_params(query: &Query) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("page", query.page.max(1).to_string()),
        ("limit", query.limit.max(1).to_string()),
        ("sort", query.sort.as_param().to_string()),
    ];
    for (key, value) in [
        ("search", &query.search),
        ("genre", &query.genre),
        ("artist", &query.artist),
    ] {
        let value = value.trim();
        if !value.is_empty() {
            params.push((key, value.to_string()));
        }
    }
    params
}

#[async_trait::async_trait]
impl TrackGateway for RestGateway {
    fn id(&self) -> &str {
        "rest"
    }

    async fn list(&self, query: &Query) -> GatewayResult<PageResult> {
        let url = self.endpoint("api/tracks")?;
        let request = self.client.get(url).query(&list_params(query));
        let body: models::TrackPagedResponse =
            self.send_json(request, Target::collection()).await?;

        let tracks: Vec<Track> = body.data.into_iter().map(map_track).collect();
        let total_pages = body
            .meta
            .total_pages
            .unwrap_or_else(|| u32::from(!tracks.is_empty()));
        tracing::debug!(
            page = query.page,
            returned = tracks.len(),
            total_pages,
            "listed tracks"
        );
        Ok(PageResult {
            tracks,
            total_pages,
        })
    }

    async fn create(&self, draft: &TrackDraft) -> GatewayResult<Track> {
        let url = self.endpoint("api/tracks")?;
        let request = self.client.post(url).json(&mapping::create_request(draft));
        let track: models::WireTrack = self.send_json(request, Target::collection()).await?;
        Ok(map_track(track))
    }

    async fn upload_audio(&self, id: &TrackId, file: &AudioUpload) -> GatewayResult<()> {
        let url = self.track_endpoint(id, "upload")?;
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str(&file.content_type)
            .map_err(|_| GatewayError::UnsupportedMedia {
                content_type: file.content_type.clone(),
            })?;
        let request = self
            .client
            .post(url)
            .multipart(Form::new().part("file", part));
        self.send(request, Target::upload(id, file)).await?;
        Ok(())
    }

    async fn update(&self, id: &TrackId, patch: &TrackPatch) -> GatewayResult<Track> {
        let url = self.track_endpoint(id, "")?;
        let request = self.client.put(url).json(&mapping::update_request(patch));
        let track: models::WireTrack = self.send_json(request, Target::track(id)).await?;
        Ok(map_track(track))
    }

    async fn remove(&self, id: &TrackId) -> GatewayResult<()> {
        let url = self.track_endpoint(id, "")?;
        self.send(self.client.delete(url), Target::track(id)).await?;
        Ok(())
    }

    async fn remove_audio(&self, id: &TrackId) -> GatewayResult<()> {
        let url = self.track_endpoint(id, "file")?;
        self.send(self.client.delete(url), Target::track(id)).await?;
        Ok(())
    }

    async fn genres(&self) -> GatewayResult<Vec<String>> {
        let url = self.endpoint("api/genres")?;
        self.send_json(self.client.get(url), Target::collection())
            .await
    }

    fn stream_url(&self, track: &Track) -> Option<StreamUrl> {
        if !track.has_audio() {
            return None;
        }
        let file = track.audio_file.as_deref()?.trim();
        if let Ok(absolute) = Url::parse(file) {
            return Some(StreamUrl::new(absolute.to_string()));
        }
        self.audio_base_url
            .join(file.trim_start_matches('/'))
            .ok()
            .map(|url| StreamUrl::new(url.to_string()))
    }

    async fn fetch_audio(&self, url: &StreamUrl) -> GatewayResult<Vec<u8>> {
        let parsed = Url::parse(url.as_ref()).map_err(|e| GatewayError::Validation {
            message: format!("invalid stream url {}: {e}", url.0),
        })?;
        let target = Target {
            entity: url.as_ref(),
            upload: None,
        };
        let resp = self.send(self.client.get(parsed), target).await?;
        let bytes = resp.bytes().await.map_err(map_transport)?;
        tracing::debug!(url = %url.0, len = bytes.len(), "fetched audio");
        Ok(bytes.to_vec())
    }
}
