//! Fixtures and fake gateways shared by the unit tests.

use crate::collection::CollectionController;
use crate::gateway::{GatewayError, GatewayResult, TrackGateway};
use crate::memory::MemoryGateway;
use crate::models::{PageResult, Query, StreamUrl, Track, TrackDraft, TrackId, TrackPatch};
use crate::playback::PlaybackCoordinator;
use crate::query::QueryState;
use crate::validation::{AudioUpload, TrackForm, AUDIO_CONTENT_TYPE};
use crate::workflows::WorkflowContext;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::{oneshot, Semaphore};

pub(crate) fn sample_track(id: &str, audio: Option<&str>) -> Track {
    Track {
        id: TrackId::new(id),
        title: id.to_uppercase(),
        artist: "artist".into(),
        album: "album".into(),
        genres: vec!["Rock".into()],
        cover_image: None,
        audio_file: audio.map(str::to_string),
        created_at: None,
        updated_at: None,
    }
}

pub(crate) fn filled_form(title: &str) -> TrackForm {
    TrackForm {
        title: title.into(),
        artist: "Artist".into(),
        album: "Album".into(),
        genres: vec!["Rock".into()],
        cover_image: String::new(),
    }
}

pub(crate) fn form_from(track: &Track) -> TrackForm {
    TrackForm {
        title: track.title.clone(),
        artist: track.artist.clone(),
        album: track.album.clone(),
        genres: track.genres.clone(),
        cover_image: track.cover_image.clone().unwrap_or_default(),
    }
}

pub(crate) fn mp3(name: &str) -> AudioUpload {
    AudioUpload::new(name, AUDIO_CONTENT_TYPE, b"ID3\x04\x00".to_vec())
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn unscripted() -> GatewayError {
    GatewayError::Server {
        status: 501,
        message: "not scripted".into(),
    }
}

type Responder = oneshot::Sender<GatewayResult<PageResult>>;

#[derive(Default)]
struct Script {
    queued: VecDeque<GatewayResult<PageResult>>,
    pending: Vec<Option<Responder>>,
}

/// A gateway whose `list` responses are supplied by the test.
///
/// Queued responses are returned immediately. Otherwise each call parks until
/// [`ScriptedGateway::resolve`] answers it, which lets tests complete fetches
/// in any order.
#[derive(Default)]
pub(crate) struct ScriptedGateway {
    script: Mutex<Script>,
}

impl ScriptedGateway {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn respond_next(&self, result: GatewayResult<PageResult>) {
        lock(&self.script).queued.push_back(result);
    }

    /// Yields until at least `count` list calls are parked.
    pub(crate) async fn wait_for_pending(&self, count: usize) {
        while lock(&self.script).pending.len() < count {
            tokio::task::yield_now().await;
        }
    }

    /// Answers the parked call with index `index` (in arrival order).
    pub(crate) fn resolve(&self, index: usize, result: GatewayResult<PageResult>) {
        let responder = lock(&self.script)
            .pending
            .get_mut(index)
            .and_then(Option::take);
        match responder {
            Some(tx) => {
                let _ = tx.send(result);
            }
            None => panic!("no parked list call at index {index}"),
        }
    }
}

#[async_trait::async_trait]
impl TrackGateway for ScriptedGateway {
    fn id(&self) -> &str {
        "scripted"
    }

    async fn list(&self, _query: &Query) -> GatewayResult<PageResult> {
        let rx = {
            let mut script = lock(&self.script);
            if let Some(result) = script.queued.pop_front() {
                return result;
            }
            let (tx, rx) = oneshot::channel();
            script.pending.push(Some(tx));
            rx
        };
        rx.await.unwrap_or_else(|_| {
            Err(GatewayError::Network {
                message: "responder dropped".into(),
            })
        })
    }

    async fn create(&self, _draft: &TrackDraft) -> GatewayResult<Track> {
        Err(unscripted())
    }

    async fn upload_audio(&self, _id: &TrackId, _file: &AudioUpload) -> GatewayResult<()> {
        Err(unscripted())
    }

    async fn update(&self, _id: &TrackId, _patch: &TrackPatch) -> GatewayResult<Track> {
        Err(unscripted())
    }

    async fn remove(&self, _id: &TrackId) -> GatewayResult<()> {
        Err(unscripted())
    }

    async fn remove_audio(&self, _id: &TrackId) -> GatewayResult<()> {
        Err(unscripted())
    }

    async fn genres(&self) -> GatewayResult<Vec<String>> {
        Ok(Vec::new())
    }

    fn stream_url(&self, _track: &Track) -> Option<StreamUrl> {
        None
    }

    async fn fetch_audio(&self, _url: &StreamUrl) -> GatewayResult<Vec<u8>> {
        Err(unscripted())
    }
}

/// Releases removals parked by [`FaultyGateway::hold_removes`].
pub(crate) struct RemoveGate(Arc<Semaphore>);

impl RemoveGate {
    pub(crate) fn open(&self) {
        self.0.add_permits(1024);
    }
}

type ListHook = Arc<dyn Fn() + Send + Sync>;

#[derive(Default)]
struct Faults {
    upload: Option<GatewayError>,
    remove: Option<GatewayError>,
    remove_gate: Option<Arc<Semaphore>>,
    remove_calls: usize,
    last_patch: Option<TrackPatch>,
    on_list: Option<ListHook>,
}

/// Wraps a [`MemoryGateway`] with fault injection and call recording.
pub(crate) struct FaultyGateway {
    inner: Arc<MemoryGateway>,
    faults: Mutex<Faults>,
}

impl FaultyGateway {
    pub(crate) fn new(inner: Arc<MemoryGateway>) -> Self {
        Self {
            inner,
            faults: Mutex::new(Faults::default()),
        }
    }

    pub(crate) fn fail_uploads(&self, err: GatewayError) {
        lock(&self.faults).upload = Some(err);
    }

    pub(crate) fn fail_removes(&self, err: GatewayError) {
        lock(&self.faults).remove = Some(err);
    }

    /// Parks every `remove` until the returned gate is opened.
    pub(crate) fn hold_removes(&self) -> RemoveGate {
        let semaphore = Arc::new(Semaphore::new(0));
        lock(&self.faults).remove_gate = Some(semaphore.clone());
        RemoveGate(semaphore)
    }

    pub(crate) fn remove_calls(&self) -> usize {
        lock(&self.faults).remove_calls
    }

    pub(crate) fn last_patch(&self) -> Option<TrackPatch> {
        lock(&self.faults).last_patch.clone()
    }

    /// Runs `hook` at the start of every `list` call.
    pub(crate) fn on_list(&self, hook: impl Fn() + Send + Sync + 'static) {
        lock(&self.faults).on_list = Some(Arc::new(hook));
    }
}

#[async_trait::async_trait]
impl TrackGateway for FaultyGateway {
    fn id(&self) -> &str {
        "faulty"
    }

    async fn list(&self, query: &Query) -> GatewayResult<PageResult> {
        let hook = lock(&self.faults).on_list.clone();
        if let Some(hook) = hook {
            hook();
        }
        self.inner.list(query).await
    }

    async fn create(&self, draft: &TrackDraft) -> GatewayResult<Track> {
        self.inner.create(draft).await
    }

    async fn upload_audio(&self, id: &TrackId, file: &AudioUpload) -> GatewayResult<()> {
        let fault = lock(&self.faults).upload.clone();
        match fault {
            Some(err) => Err(err),
            None => self.inner.upload_audio(id, file).await,
        }
    }

    async fn update(&self, id: &TrackId, patch: &TrackPatch) -> GatewayResult<Track> {
        lock(&self.faults).last_patch = Some(patch.clone());
        self.inner.update(id, patch).await
    }

    async fn remove(&self, id: &TrackId) -> GatewayResult<()> {
        let (fault, gate) = {
            let mut faults = lock(&self.faults);
            faults.remove_calls += 1;
            (faults.remove.clone(), faults.remove_gate.clone())
        };
        if let Some(gate) = gate {
            let _permit = gate.acquire().await;
        }
        match fault {
            Some(err) => Err(err),
            None => self.inner.remove(id).await,
        }
    }

    async fn remove_audio(&self, id: &TrackId) -> GatewayResult<()> {
        self.inner.remove_audio(id).await
    }

    async fn genres(&self) -> GatewayResult<Vec<String>> {
        self.inner.genres().await
    }

    fn stream_url(&self, track: &Track) -> Option<StreamUrl> {
        self.inner.stream_url(track)
    }

    async fn fetch_audio(&self, url: &StreamUrl) -> GatewayResult<Vec<u8>> {
        self.inner.fetch_audio(url).await
    }
}

/// A collection controller and playback coordinator wired over a
/// [`FaultyGateway`] around an empty [`MemoryGateway`].
pub(crate) struct Harness {
    pub memory: Arc<MemoryGateway>,
    pub faulty: Arc<FaultyGateway>,
    pub collection: Arc<CollectionController>,
    pub playback: Arc<PlaybackCoordinator>,
}

impl Harness {
    pub(crate) fn new() -> Self {
        let memory = Arc::new(MemoryGateway::new().with_audio_base("memory://uploads/"));
        let faulty = Arc::new(FaultyGateway::new(memory.clone()));
        let collection = Arc::new(CollectionController::new(
            faulty.clone(),
            QueryState::default(),
        ));
        Self {
            memory,
            faulty,
            collection,
            playback: Arc::new(PlaybackCoordinator::new()),
        }
    }

    pub(crate) fn ctx(&self) -> WorkflowContext {
        WorkflowContext::new(self.collection.clone(), self.playback.clone())
    }

    pub(crate) fn seed(&self, track: Track) -> Track {
        self.memory.insert(track.clone());
        track
    }

    pub(crate) fn fail_uploads(&self, err: GatewayError) {
        self.faulty.fail_uploads(err);
    }
}
