//! In-process gateway used for demo mode and tests.
//!
//! Applies the same rules the remote service does: case-insensitive search over
//! title/artist/album, exact genre and artist filters, sorting, paging and
//! server-side enforcement of the upload limits.

use crate::gateway::{GatewayError, GatewayResult, TrackGateway};
use crate::models::{PageResult, Query, SortKey, StreamUrl, Track, TrackDraft, TrackId, TrackPatch};
use crate::validation::{AudioUpload, AUDIO_CONTENT_TYPE, MAX_AUDIO_BYTES};
use std::collections::{BTreeSet, HashMap};
use std::f32::consts::TAU;
use std::sync::{Mutex, MutexGuard};

const DEFAULT_AUDIO_BASE: &str = "memory://";

#[derive(Debug, Default)]
struct Store {
    tracks: Vec<Track>,
    next_id: u64,
    list_calls: Vec<Query>,
    /// Uploaded audio keyed by the track's `audio_file`.
    audio: HashMap<String, Vec<u8>>,
}

#[derive(Debug, Default)]
pub struct MemoryGateway {
    store: Mutex<Store>,
    audio_base: Option<String>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Audio references resolve to `<base><audio_file>`.
    pub fn with_audio_base(mut self, base: impl Into<String>) -> Self {
        self.audio_base = Some(base.into());
        self
    }

    /// A small catalog for trying the client without a server.
    pub fn demo() -> Self {
        let gateway = Self::new().with_audio_base("memory://uploads/");
        let seed = [
            ("Blue in Green", "Miles Davis", "Kind of Blue", "Jazz", true),
            ("So What", "Miles Davis", "Kind of Blue", "Jazz", true),
            ("Paranoid Android", "Radiohead", "OK Computer", "Rock", true),
            ("Karma Police", "Radiohead", "OK Computer", "Rock", false),
            ("Teardrop", "Massive Attack", "Mezzanine", "Electronic", true),
            ("Angel", "Massive Attack", "Mezzanine", "Electronic", false),
            ("Hoppípolla", "Sigur Rós", "Takk...", "Post-Rock", true),
            ("Windowlicker", "Aphex Twin", "Windowlicker", "Electronic", true),
            ("Clair de Lune", "Claude Debussy", "Suite bergamasque", "Classical", true),
            ("Gymnopédie No.1", "Erik Satie", "Gymnopédies", "Classical", false),
            ("Heroes", "David Bowie", "Heroes", "Rock", true),
            ("Ready or Not", "Fugees", "The Score", "Hip-Hop", true),
        ];
        for (title, artist, album, genre, has_audio) in seed {
            let draft = TrackDraft {
                title: title.into(),
                artist: artist.into(),
                album: album.into(),
                genres: vec![genre.into()],
                cover_image: None,
            };
            let mut track = gateway.create_direct(&draft);
            if has_audio {
                let file = format!("{}.wav", track.id);
                let pitch = 220.0 + 40.0 * gateway.len() as f32;
                gateway.lock().audio.insert(file.clone(), tone_wav(pitch, 3));
                track.audio_file = Some(file);
                gateway.insert(track);
            }
        }
        gateway
    }

    /// Inserts or replaces a track as-is, bypassing validation.
    pub fn insert(&self, track: Track) {
        let mut store = self.lock();
        match store.tracks.iter_mut().find(|t| t.id == track.id) {
            Some(existing) => *existing = track,
            None => store.tracks.push(track),
        }
    }

    pub fn remove_direct(&self, id: &TrackId) -> Option<Track> {
        let mut store = self.lock();
        let idx = store.tracks.iter().position(|t| &t.id == id)?;
        Some(store.tracks.remove(idx))
    }

    pub fn get(&self, id: &TrackId) -> Option<Track> {
        self.lock().tracks.iter().find(|t| &t.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every query received by `list`, oldest first.
    pub fn list_calls(&self) -> Vec<Query> {
        self.lock().list_calls.clone()
    }

    fn create_direct(&self, draft: &TrackDraft) -> Track {
        let mut store = self.lock();
        store.next_id += 1;
        let track = Track {
            id: TrackId::new(store.next_id.to_string()),
            title: draft.title.clone(),
            artist: draft.artist.clone(),
            album: draft.album.clone(),
            genres: draft.genres.clone(),
            cover_image: draft.cover_image.clone(),
            audio_file: None,
            created_at: None,
            updated_at: None,
        };
        store.tracks.push(track.clone());
        track
    }

    fn with_track<T>(
        &self,
        id: &TrackId,
        f: impl FnOnce(&mut Track) -> GatewayResult<T>,
    ) -> GatewayResult<T> {
        let mut store = self.lock();
        let track = store
            .tracks
            .iter_mut()
            .find(|t| &t.id == id)
            .ok_or_else(|| GatewayError::NotFound {
                entity: id.to_string(),
            })?;
        f(track)
    }

    fn lock(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn audio_base(&self) -> &str {
        self.audio_base.as_deref().unwrap_or(DEFAULT_AUDIO_BASE)
    }
}

/// A mono 16-bit PCM WAV sine tone, so demo tracks have something to play.
fn tone_wav(pitch: f32, seconds: u32) -> Vec<u8> {
    const RATE: u32 = 8_000;
    let samples = RATE * seconds;
    let data_len = samples * 2;

    let mut wav = Vec::with_capacity(44 + data_len as usize);
    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&(36 + data_len).to_le_bytes());
    wav.extend_from_slice(b"WAVEfmt ");
    wav.extend_from_slice(&16u32.to_le_bytes());
    wav.extend_from_slice(&1u16.to_le_bytes()); // PCM
    wav.extend_from_slice(&1u16.to_le_bytes()); // mono
    wav.extend_from_slice(&RATE.to_le_bytes());
    wav.extend_from_slice(&(RATE * 2).to_le_bytes());
    wav.extend_from_slice(&2u16.to_le_bytes());
    wav.extend_from_slice(&16u16.to_le_bytes());
    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&data_len.to_le_bytes());
    for n in 0..samples {
        let t = n as f32 / RATE as f32;
        let sample = (TAU * pitch * t).sin() * 0.3 * f32::from(i16::MAX);
        wav.extend_from_slice(&(sample as i16).to_le_bytes());
    }
    wav
}

fn query_matches(track: &Track, query: &Query) -> bool {
    let needle = query.search.trim().to_lowercase();
    let search_ok = needle.is_empty()
        || [&track.title, &track.artist, &track.album]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle));
    let genre_ok = query.genre.is_empty() || track.genres.iter().any(|g| g == &query.genre);
    let artist_ok = query.artist.is_empty() || track.artist == query.artist;
    search_ok && genre_ok && artist_ok
}

fn validate_draft(draft: &TrackDraft) -> GatewayResult<()> {
    if draft.title.trim().is_empty() || draft.artist.trim().is_empty() {
        return Err(GatewayError::Validation {
            message: "title and artist are required".into(),
        });
    }
    Ok(())
}

#[async_trait::async_trait]
impl TrackGateway for MemoryGateway {
    fn id(&self) -> &str {
        "memory"
    }

    async fn list(&self, query: &Query) -> GatewayResult<PageResult> {
        let mut store = self.lock();
        store.list_calls.push(query.clone());

        let mut hits: Vec<Track> = store
            .tracks
            .iter()
            .filter(|t| query_matches(t, query))
            .cloned()
            .collect();
        match query.sort {
            SortKey::Title => hits.sort_by_key(|t| t.title.to_lowercase()),
            SortKey::Artist => hits.sort_by_key(|t| t.artist.to_lowercase()),
        }

        let limit = query.limit.max(1) as usize;
        let total_pages = hits.len().div_ceil(limit) as u32;
        let start = (query.page.max(1) as usize - 1) * limit;
        let tracks = hits.into_iter().skip(start).take(limit).collect();
        Ok(PageResult {
            tracks,
            total_pages,
        })
    }

    async fn create(&self, draft: &TrackDraft) -> GatewayResult<Track> {
        validate_draft(draft)?;
        let duplicate = self
            .lock()
            .tracks
            .iter()
            .any(|t| t.title == draft.title && t.artist == draft.artist);
        if duplicate {
            return Err(GatewayError::Validation {
                message: format!("track '{}' already exists", draft.title),
            });
        }
        Ok(self.create_direct(draft))
    }

    async fn upload_audio(&self, id: &TrackId, file: &AudioUpload) -> GatewayResult<()> {
        if file.content_type != AUDIO_CONTENT_TYPE {
            return Err(GatewayError::UnsupportedMedia {
                content_type: file.content_type.clone(),
            });
        }
        if file.size() > MAX_AUDIO_BYTES {
            return Err(GatewayError::PayloadTooLarge {
                size: file.size(),
                limit: MAX_AUDIO_BYTES,
            });
        }
        let name = self.with_track(id, |track| {
            let name = format!("{}-{}", track.id, file.file_name);
            track.audio_file = Some(name.clone());
            Ok(name)
        })?;
        self.lock().audio.insert(name, file.bytes.clone());
        Ok(())
    }

    async fn update(&self, id: &TrackId, patch: &TrackPatch) -> GatewayResult<Track> {
        if matches!(&patch.title, Some(t) if t.trim().is_empty()) {
            return Err(GatewayError::Validation {
                message: "title cannot be empty".into(),
            });
        }
        self.with_track(id, |track| {
            patch.apply_to(track);
            Ok(track.clone())
        })
    }

    async fn remove(&self, id: &TrackId) -> GatewayResult<()> {
        self.remove_direct(id)
            .map(|_| ())
            .ok_or_else(|| GatewayError::NotFound {
                entity: id.to_string(),
            })
    }

    async fn remove_audio(&self, id: &TrackId) -> GatewayResult<()> {
        let removed = self.with_track(id, |track| Ok(track.audio_file.take()))?;
        if let Some(name) = removed {
            self.lock().audio.remove(&name);
        }
        Ok(())
    }

    async fn genres(&self) -> GatewayResult<Vec<String>> {
        let genres: BTreeSet<String> = self
            .lock()
            .tracks
            .iter()
            .flat_map(|t| t.genres.iter().cloned())
            .collect();
        Ok(genres.into_iter().collect())
    }

    fn stream_url(&self, track: &Track) -> Option<StreamUrl> {
        if !track.has_audio() {
            return None;
        }
        let file = track.audio_file.as_deref()?;
        Some(StreamUrl::new(format!("{}{file}", self.audio_base())))
    }

    async fn fetch_audio(&self, url: &StreamUrl) -> GatewayResult<Vec<u8>> {
        let not_found = || GatewayError::NotFound {
            entity: url.0.clone(),
        };
        let name = url.0.strip_prefix(self.audio_base()).ok_or_else(not_found)?;
        self.lock().audio.get(name).cloned().ok_or_else(not_found)
    }
}
