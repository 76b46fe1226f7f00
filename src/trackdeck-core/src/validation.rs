//! Client-side checks run before any gateway call.
//!
//! Form fields are validated together so every offending field can be reported at
//! once. Audio files are pre-checked against the accepted content type and size
//! ceiling; the server enforces the same limits again.

use crate::models::TrackDraft;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

/// The only content type accepted for uploads.
pub const AUDIO_CONTENT_TYPE: &str = "audio/mpeg";

/// Upload ceiling (10MB).
pub const MAX_AUDIO_BYTES: u64 = 10 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    Title,
    Artist,
    Album,
    Genres,
    CoverImage,
}

impl FormField {
    pub fn label(&self) -> &'static str {
        match self {
            FormField::Title => "Title",
            FormField::Artist => "Artist",
            FormField::Album => "Album",
            FormField::Genres => "Genres",
            FormField::CoverImage => "Cover image",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: FormField,
    pub message: String,
}

/// All field errors found in one validation pass.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct FormErrors(pub Vec<FieldError>);

impl FormErrors {
    pub fn for_field(&self, field: FormField) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|e| format!("{}: {}", e.field.label(), e.message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

/// Raw authoring input, as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackForm {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub genres: Vec<String>,
    /// Empty means "no cover".
    pub cover_image: String,
}

impl TrackForm {
    /// Validates the form and produces the trimmed payload.
    ///
    /// `require_genre` is set by the create surface, which insists on at least one tag.
    pub fn validate(&self, require_genre: bool) -> Result<TrackDraft, FormErrors> {
        let mut errors = Vec::new();
        let mut required = |field: FormField, value: &str| {
            if value.trim().is_empty() {
                errors.push(FieldError {
                    field,
                    message: format!("{} is required", field.label()),
                });
            }
        };
        required(FormField::Title, &self.title);
        required(FormField::Artist, &self.artist);
        required(FormField::Album, &self.album);

        let genres = normalize_genres(&self.genres);
        if require_genre && genres.is_empty() {
            errors.push(FieldError {
                field: FormField::Genres,
                message: "At least one genre required".into(),
            });
        }

        let cover = self.cover_image.trim();
        if !cover.is_empty() && !is_well_formed_url(cover) {
            errors.push(FieldError {
                field: FormField::CoverImage,
                message: "Cover image must be a valid URL".into(),
            });
        }

        if !errors.is_empty() {
            return Err(FormErrors(errors));
        }

        Ok(TrackDraft {
            title: self.title.trim().to_string(),
            artist: self.artist.trim().to_string(),
            album: self.album.trim().to_string(),
            genres,
            cover_image: (!cover.is_empty()).then(|| cover.to_string()),
        })
    }
}

/// Trims tags and drops blanks and duplicates, keeping first-seen order.
pub fn normalize_genres(genres: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for genre in genres {
        let genre = genre.trim();
        if !genre.is_empty() && !out.iter().any(|g| g == genre) {
            out.push(genre.to_string());
        }
    }
    out
}

fn is_well_formed_url(value: &str) -> bool {
    Url::parse(value)
        .map(|url| url.has_host() && matches!(url.scheme(), "http" | "https"))
        .unwrap_or(false)
}

#[derive(Debug, Error)]
pub enum AudioFileError {
    #[error("failed to read audio file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{file_name} has type {content_type}; only audio/mpeg is accepted")]
    UnsupportedType {
        file_name: String,
        content_type: String,
    },
    #[error("{file_name} is {size} bytes; the limit is {limit} bytes")]
    TooLarge {
        file_name: String,
        size: u64,
        limit: u64,
    },
}

/// An audio file staged for upload.
#[derive(Clone, PartialEq, Eq)]
pub struct AudioUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for AudioUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioUpload")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl AudioUpload {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Reads a file from disk, refusing oversized files before loading them.
    pub fn from_path(path: &Path) -> Result<Self, AudioFileError> {
        let io_err = |source: std::io::Error| AudioFileError::Io {
            path: path.to_path_buf(),
            source,
        };
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let size = fs::metadata(path).map_err(io_err)?.len();
        if size > MAX_AUDIO_BYTES {
            return Err(AudioFileError::TooLarge {
                file_name,
                size,
                limit: MAX_AUDIO_BYTES,
            });
        }
        let bytes = fs::read(path).map_err(io_err)?;
        Ok(Self {
            content_type: content_type_for(path).to_string(),
            file_name,
            bytes,
        })
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Fast-fail check mirroring the server's limits.
    pub fn check(&self) -> Result<(), AudioFileError> {
        if self.content_type != AUDIO_CONTENT_TYPE {
            return Err(AudioFileError::UnsupportedType {
                file_name: self.file_name.clone(),
                content_type: self.content_type.clone(),
            });
        }
        if self.size() > MAX_AUDIO_BYTES {
            return Err(AudioFileError::TooLarge {
                file_name: self.file_name.clone(),
                size: self.size(),
                limit: MAX_AUDIO_BYTES,
            });
        }
        Ok(())
    }
}

fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "mp3" => AUDIO_CONTENT_TYPE,
        "wav" => "audio/wav",
        "ogg" => "audio/ogg",
        "flac" => "audio/flac",
        "m4a" => "audio/mp4",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn filled() -> TrackForm {
        TrackForm {
            title: " Song ".into(),
            artist: "Band".into(),
            album: "Record".into(),
            genres: vec!["Rock".into()],
            cover_image: String::new(),
        }
    }

    #[test]
    fn empty_form_reports_every_required_field() {
        let errors = TrackForm::default()
            .validate(true)
            .expect_err("empty form must fail");
        assert!(errors.for_field(FormField::Title).is_some());
        assert!(errors.for_field(FormField::Artist).is_some());
        assert!(errors.for_field(FormField::Album).is_some());
        assert!(errors.for_field(FormField::Genres).is_some());
        assert!(errors.for_field(FormField::CoverImage).is_none());
    }

    #[test]
    fn genre_only_required_when_asked() {
        let mut form = filled();
        form.genres.clear();
        assert!(form.validate(true).is_err());
        assert!(form.validate(false).is_ok());
    }

    #[test]
    fn valid_form_is_trimmed() {
        let draft = filled().validate(true).expect("valid form");
        assert_eq!(draft.title, "Song");
        assert_eq!(draft.cover_image, None);
    }

    #[test]
    fn cover_image_must_be_a_url() {
        let mut form = filled();
        form.cover_image = "not a url".into();
        let errors = form.validate(false).expect_err("bad url");
        assert_eq!(errors.0.len(), 1);
        assert_eq!(errors.0[0].field, FormField::CoverImage);

        form.cover_image = "https://img.example/cover.jpg".into();
        let draft = form.validate(false).expect("good url");
        assert_eq!(
            draft.cover_image.as_deref(),
            Some("https://img.example/cover.jpg")
        );
    }

    #[test]
    fn genres_are_deduplicated_in_order() {
        let genres = vec![
            "Rock".to_string(),
            " Jazz ".to_string(),
            "Rock".to_string(),
            "".to_string(),
        ];
        assert_eq!(normalize_genres(&genres), vec!["Rock", "Jazz"]);
    }

    #[test]
    fn upload_check_enforces_type_and_size() {
        let ok = AudioUpload::new("a.mp3", AUDIO_CONTENT_TYPE, vec![0; 16]);
        assert!(ok.check().is_ok());

        let wav = AudioUpload::new("a.wav", "audio/wav", vec![0; 16]);
        assert!(matches!(
            wav.check(),
            Err(AudioFileError::UnsupportedType { .. })
        ));

        let big = AudioUpload::new(
            "big.mp3",
            AUDIO_CONTENT_TYPE,
            vec![0; (MAX_AUDIO_BYTES + 1) as usize],
        );
        assert!(matches!(big.check(), Err(AudioFileError::TooLarge { .. })));
    }

    #[test]
    fn from_path_infers_content_type() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("track.MP3");
        let mut file = fs::File::create(&path).expect("create");
        file.write_all(b"ID3").expect("write");

        let upload = AudioUpload::from_path(&path).expect("readable");
        assert_eq!(upload.file_name, "track.MP3");
        assert_eq!(upload.content_type, AUDIO_CONTENT_TYPE);
        assert_eq!(upload.bytes, b"ID3");

        let missing = AudioUpload::from_path(&dir.path().join("nope.mp3"));
        assert!(matches!(missing, Err(AudioFileError::Io { .. })));
    }
}
