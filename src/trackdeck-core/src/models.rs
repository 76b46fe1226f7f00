use serde::{Deserialize, Serialize};
use std::fmt;

/// Server-assigned track identifier.
///
/// Treated as opaque and case-sensitive; the client never derives meaning from it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Hash)]
pub struct TrackId(pub String);

impl TrackId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl AsRef<str> for TrackId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TrackId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for TrackId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A catalog entry as returned by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: TrackId,
    pub title: String,
    pub artist: String,
    pub album: String,
    /// Display order is preserved; storage treats these as a set.
    pub genres: Vec<String>,
    pub cover_image: Option<String>,
    /// Opaque reference (usually a file name) resolved to a URL by the gateway.
    pub audio_file: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl Track {
    /// Tracks without audio never take part in playback.
    pub fn has_audio(&self) -> bool {
        self.audio_file
            .as_deref()
            .map(|f| !f.trim().is_empty())
            .unwrap_or(false)
    }
}

/// Metadata submitted when creating a track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackDraft {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub genres: Vec<String>,
    pub cover_image: Option<String>,
}

/// Partial update; `None` fields are left untouched by the gateway.
///
/// An empty `cover_image` string clears the cover.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackPatch {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub genres: Option<Vec<String>>,
    pub cover_image: Option<String>,
}

impl TrackPatch {
    /// Builds the minimal patch turning `original` into `draft`.
    pub fn between(original: &Track, draft: &TrackDraft) -> Self {
        let changed = |old: &str, new: &str| (old != new).then(|| new.to_string());
        let genres_changed = {
            let mut old = original.genres.clone();
            let mut new = draft.genres.clone();
            old.sort();
            new.sort();
            old != new
        };
        let cover_image = match (&original.cover_image, &draft.cover_image) {
            (old, Some(new)) if old.as_deref() != Some(new.as_str()) => Some(new.clone()),
            (Some(_), None) => Some(String::new()),
            _ => None,
        };

        Self {
            title: changed(&original.title, &draft.title),
            artist: changed(&original.artist, &draft.artist),
            album: changed(&original.album, &draft.album),
            genres: genres_changed.then(|| draft.genres.clone()),
            cover_image,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.artist.is_none()
            && self.album.is_none()
            && self.genres.is_none()
            && self.cover_image.is_none()
    }

    /// Applies the patch to a local copy, mirroring what the gateway does.
    pub fn apply_to(&self, track: &mut Track) {
        if let Some(title) = &self.title {
            track.title = title.clone();
        }
        if let Some(artist) = &self.artist {
            track.artist = artist.clone();
        }
        if let Some(album) = &self.album {
            track.album = album.clone();
        }
        if let Some(genres) = &self.genres {
            track.genres = genres.clone();
        }
        if let Some(cover) = &self.cover_image {
            track.cover_image = (!cover.is_empty()).then(|| cover.clone());
        }
    }
}

/// Sort order offered by the list endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Title,
    Artist,
}

impl SortKey {
    pub fn as_param(&self) -> &'static str {
        match self {
            SortKey::Title => "title",
            SortKey::Artist => "artist",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            SortKey::Title => SortKey::Artist,
            SortKey::Artist => SortKey::Title,
        }
    }
}

/// Pagination, sort and filter parameters for a list fetch.
///
/// `page` is 1-based. Empty `search`, `genre` and `artist` mean "no filter".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub page: u32,
    pub limit: u32,
    pub sort: SortKey,
    pub search: String,
    pub genre: String,
    pub artist: String,
}

impl Query {
    pub fn first_page(limit: u32) -> Self {
        Self {
            page: 1,
            limit: limit.max(1),
            sort: SortKey::default(),
            search: String::new(),
            genre: String::new(),
            artist: String::new(),
        }
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    pub fn with_sort(mut self, sort: SortKey) -> Self {
        self.sort = sort;
        self
    }
}

/// One page of the collection. Replaced wholesale on every successful fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageResult {
    pub tracks: Vec<Track>,
    pub total_pages: u32,
}

impl PageResult {
    pub fn empty() -> Self {
        Self {
            tracks: Vec::new(),
            total_pages: 0,
        }
    }

    pub fn find(&self, id: &TrackId) -> Option<&Track> {
        self.tracks.iter().find(|t| &t.id == id)
    }
}

/// Playable URL for a track's audio.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamUrl(pub String);

impl StreamUrl {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }
}

impl AsRef<str> for StreamUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
