//! Editable state behind the create and edit overlays.

use std::path::Path;
use trackdeck_core::validation::normalize_genres;
use trackdeck_core::{
    AudioChange, AudioFileError, AudioUpload, FormErrors, FormField, Track, TrackForm,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputField {
    Title,
    Artist,
    Album,
    Genres,
    CoverImage,
    AudioPath,
}

impl InputField {
    pub const ALL: [InputField; 6] = [
        InputField::Title,
        InputField::Artist,
        InputField::Album,
        InputField::Genres,
        InputField::CoverImage,
        InputField::AudioPath,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            InputField::Title => "Title",
            InputField::Artist => "Artist",
            InputField::Album => "Album",
            InputField::Genres => "Genres (comma separated)",
            InputField::CoverImage => "Cover image URL",
            InputField::AudioPath => "Audio file (.mp3 path)",
        }
    }

    fn form_field(&self) -> Option<FormField> {
        match self {
            InputField::Title => Some(FormField::Title),
            InputField::Artist => Some(FormField::Artist),
            InputField::Album => Some(FormField::Album),
            InputField::Genres => Some(FormField::Genres),
            InputField::CoverImage => Some(FormField::CoverImage),
            InputField::AudioPath => None,
        }
    }

    fn index(&self) -> usize {
        InputField::ALL
            .iter()
            .position(|f| f == self)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(Track),
}

#[derive(Debug, Clone)]
pub struct FormState {
    mode: FormMode,
    values: [String; 6],
    focus: usize,
    remove_audio: bool,
    errors: Option<FormErrors>,
    file_error: Option<String>,
    notice: Option<String>,
    submitting: bool,
}

impl FormState {
    pub fn create() -> Self {
        Self::with_values(FormMode::Create, Default::default())
    }

    pub fn edit(track: &Track) -> Self {
        let values = [
            track.title.clone(),
            track.artist.clone(),
            track.album.clone(),
            track.genres.join(", "),
            track.cover_image.clone().unwrap_or_default(),
            String::new(),
        ];
        Self::with_values(FormMode::Edit(track.clone()), values)
    }

    fn with_values(mode: FormMode, values: [String; 6]) -> Self {
        Self {
            mode,
            values,
            focus: 0,
            remove_audio: false,
            errors: None,
            file_error: None,
            notice: None,
            submitting: false,
        }
    }

    pub fn mode(&self) -> &FormMode {
        &self.mode
    }

    pub fn heading(&self) -> String {
        match &self.mode {
            FormMode::Create => "New track".to_string(),
            FormMode::Edit(track) => format!("Edit: {}", track.title),
        }
    }

    pub fn focus(&self) -> InputField {
        InputField::ALL[self.focus]
    }

    pub fn value(&self, field: InputField) -> &str {
        &self.values[field.index()]
    }

    pub fn next_field(&mut self) {
        self.focus = (self.focus + 1) % InputField::ALL.len();
    }

    pub fn previous_field(&mut self) {
        self.focus = self
            .focus
            .checked_sub(1)
            .unwrap_or(InputField::ALL.len() - 1);
    }

    pub fn input(&mut self, c: char) {
        if self.focus() == InputField::AudioPath {
            self.remove_audio = false;
        }
        self.values[self.focus].push(c);
    }

    pub fn backspace(&mut self) {
        self.values[self.focus].pop();
    }

    /// Marks the existing audio for removal. Only meaningful when editing a
    /// track that has audio; clears any staged replacement path.
    pub fn toggle_remove_audio(&mut self) -> bool {
        let has_audio = matches!(&self.mode, FormMode::Edit(track) if track.has_audio());
        if !has_audio {
            return false;
        }
        self.remove_audio = !self.remove_audio;
        if self.remove_audio {
            self.values[InputField::AudioPath.index()].clear();
        }
        true
    }

    pub fn removes_audio(&self) -> bool {
        self.remove_audio
    }

    pub fn track_form(&self) -> TrackForm {
        let genres: Vec<String> = self
            .value(InputField::Genres)
            .split(',')
            .map(str::to_string)
            .collect();
        TrackForm {
            title: self.value(InputField::Title).to_string(),
            artist: self.value(InputField::Artist).to_string(),
            album: self.value(InputField::Album).to_string(),
            genres: normalize_genres(&genres),
            cover_image: self.value(InputField::CoverImage).to_string(),
        }
    }

    /// Loads the staged audio file, if any.
    pub fn audio_upload(&self) -> Result<Option<AudioUpload>, AudioFileError> {
        let path = self.value(InputField::AudioPath).trim();
        if path.is_empty() {
            return Ok(None);
        }
        AudioUpload::from_path(Path::new(path)).map(Some)
    }

    pub fn audio_change(&self) -> Result<AudioChange, AudioFileError> {
        if self.remove_audio {
            return Ok(AudioChange::Remove);
        }
        Ok(self
            .audio_upload()?
            .map(AudioChange::Replace)
            .unwrap_or_default())
    }

    pub fn field_error(&self, field: InputField) -> Option<&str> {
        match field.form_field() {
            Some(form_field) => self.errors.as_ref()?.for_field(form_field),
            None => self.file_error.as_deref(),
        }
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn begin_submit(&mut self) {
        self.submitting = true;
        self.errors = None;
        self.file_error = None;
        self.notice = None;
    }

    pub fn reject_fields(&mut self, errors: FormErrors) {
        self.submitting = false;
        self.errors = Some(errors);
    }

    pub fn reject_file(&mut self, message: impl Into<String>) {
        self.submitting = false;
        self.file_error = Some(message.into());
    }

    pub fn reject(&mut self, message: impl Into<String>) {
        self.submitting = false;
        self.notice = Some(message.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trackdeck_core::{TrackId, AUDIO_CONTENT_TYPE};

    fn track(audio: Option<&str>) -> Track {
        Track {
            id: TrackId::new("1"),
            title: "Teardrop".into(),
            artist: "Massive Attack".into(),
            album: "Mezzanine".into(),
            genres: vec!["Trip-Hop".into(), "Electronic".into()],
            cover_image: Some("https://img.example/t.jpg".into()),
            audio_file: audio.map(str::to_string),
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn edit_form_round_trips_unchanged_values() {
        let original = track(None);
        let form = FormState::edit(&original);
        assert_eq!(form.value(InputField::Genres), "Trip-Hop, Electronic");

        let draft = form.track_form().validate(false).expect("valid");
        assert_eq!(draft.genres, original.genres);
        assert_eq!(draft.cover_image, original.cover_image);
        assert_eq!(form.audio_change().expect("no file"), AudioChange::Keep);
    }

    #[test]
    fn typing_targets_focused_field() {
        let mut form = FormState::create();
        for c in "Song".chars() {
            form.input(c);
        }
        form.next_field();
        form.input('A');
        form.backspace();
        form.previous_field();
        form.backspace();

        assert_eq!(form.value(InputField::Title), "Son");
        assert_eq!(form.value(InputField::Artist), "");
        form.previous_field();
        assert_eq!(form.focus(), InputField::AudioPath);
    }

    #[test]
    fn remove_audio_only_for_tracks_with_audio() {
        let mut create = FormState::create();
        assert!(!create.toggle_remove_audio());

        let mut edit = FormState::edit(&track(Some("t.mp3")));
        assert!(edit.toggle_remove_audio());
        assert_eq!(edit.audio_change().expect("remove"), AudioChange::Remove);
    }

    #[test]
    fn audio_path_loads_mp3() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("song.mp3");
        std::fs::write(&path, b"ID3").expect("write");

        let mut form = FormState::edit(&track(Some("old.mp3")));
        form.toggle_remove_audio();
        for _ in 0..5 {
            form.next_field();
        }
        for c in path.display().to_string().chars() {
            form.input(c);
        }
        assert!(!form.removes_audio());

        match form.audio_change().expect("loads") {
            AudioChange::Replace(upload) => {
                assert_eq!(upload.file_name, "song.mp3");
                assert_eq!(upload.content_type, AUDIO_CONTENT_TYPE);
            }
            other => panic!("expected replacement, got {other:?}"),
        }
    }

    #[test]
    fn rejections_are_shown_per_field() {
        let mut form = FormState::create();
        form.begin_submit();
        let errors = form.track_form().validate(true).expect_err("empty");
        form.reject_fields(errors);
        form.reject_file("too big");

        assert!(!form.is_submitting());
        assert_eq!(form.field_error(InputField::Title), Some("Title is required"));
        assert_eq!(
            form.field_error(InputField::Genres),
            Some("At least one genre required")
        );
        assert_eq!(form.field_error(InputField::AudioPath), Some("too big"));
        assert_eq!(form.field_error(InputField::CoverImage), None);
    }
}
