//! Paginated view of the remote collection.
//!
//! The controller owns the [`QueryState`] and the last page it displayed. Every
//! fetch is tagged with a sequence number when issued; a response is applied only
//! if no newer response has landed yet, so a slow answer to a superseded query can
//! never overwrite a fresher page. In-flight requests are never aborted.
//!
//! On failure the previous page stays visible and the error is held until the next
//! successful fetch or an explicit dismissal.

use crate::gateway::{GatewayError, TrackGateway};
use crate::models::{PageResult, Query, SortKey, Track, TrackId};
use crate::query::QueryState;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    Error,
}

/// What happened to one fetch once it settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied,
    /// A newer response had already landed; this one was dropped.
    Superseded,
    Failed(GatewayError),
}

/// Copy of the controller state for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionSnapshot {
    pub query: Query,
    pub pending_search: Option<String>,
    pub status: LoadStatus,
    pub page: Option<PageResult>,
    pub error: Option<GatewayError>,
}

impl CollectionSnapshot {
    pub fn tracks(&self) -> &[Track] {
        self.page.as_ref().map(|p| p.tracks.as_slice()).unwrap_or(&[])
    }

    pub fn total_pages(&self) -> u32 {
        self.page.as_ref().map(|p| p.total_pages).unwrap_or(0)
    }

    /// "Page X of Y"; an empty collection still reports one page.
    pub fn page_label(&self) -> String {
        format!(
            "Page {} of {}",
            self.query.page,
            self.total_pages().max(1)
        )
    }
}

#[derive(Debug)]
struct State {
    query: QueryState,
    status: LoadStatus,
    page: Option<PageResult>,
    error: Option<GatewayError>,
    issued: u64,
    applied: u64,
}

pub struct CollectionController {
    gateway: Arc<dyn TrackGateway>,
    state: Mutex<State>,
}

impl std::fmt::Debug for CollectionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectionController")
            .field("gateway", &self.gateway.id())
            .field("state", &*self.lock())
            .finish()
    }
}

impl CollectionController {
    pub fn new(gateway: Arc<dyn TrackGateway>, query: QueryState) -> Self {
        Self {
            gateway,
            state: Mutex::new(State {
                query,
                status: LoadStatus::Idle,
                page: None,
                error: None,
                issued: 0,
                applied: 0,
            }),
        }
    }

    pub fn gateway(&self) -> &Arc<dyn TrackGateway> {
        &self.gateway
    }

    pub fn snapshot(&self) -> CollectionSnapshot {
        let state = self.lock();
        CollectionSnapshot {
            query: state.query.query().clone(),
            pending_search: state.query.pending_search().map(str::to_string),
            status: state.status,
            page: state.page.clone(),
            error: state.error.clone(),
        }
    }

    pub fn query(&self) -> Query {
        self.lock().query.query().clone()
    }

    pub fn status(&self) -> LoadStatus {
        self.lock().status
    }

    /// Looks a track up in the currently displayed page.
    pub fn find(&self, id: &TrackId) -> Option<Track> {
        self.lock().page.as_ref().and_then(|p| p.find(id)).cloned()
    }

    pub fn dismiss_error(&self) {
        self.lock().error = None;
    }

    /// Re-fetches the current query. Called after every committed mutation.
    pub async fn refresh(&self) -> FetchOutcome {
        loop {
            let (seq, query) = self.issue();
            let result = self.gateway.list(&query).await;
            let (outcome, clamped) = self.settle(seq, &query, result);
            if !clamped {
                return outcome;
            }
            tracing::debug!(page = query.page, "page out of range; fetching last page");
        }
    }

    pub async fn set_page(&self, page: u32) -> Option<FetchOutcome> {
        self.update_query(|q| q.set_page(page)).await
    }

    /// Moves forward unless the last known page is already displayed.
    pub async fn next_page(&self) -> Option<FetchOutcome> {
        let target = {
            let state = self.lock();
            let current = state.query.query().page;
            let total = state.page.as_ref().map(|p| p.total_pages).unwrap_or(0);
            if current >= total {
                return None;
            }
            current + 1
        };
        self.set_page(target).await
    }

    pub async fn previous_page(&self) -> Option<FetchOutcome> {
        let current = self.query().page;
        if current <= 1 {
            return None;
        }
        self.set_page(current - 1).await
    }

    pub async fn set_sort(&self, sort: SortKey) -> Option<FetchOutcome> {
        self.update_query(|q| q.set_sort(sort)).await
    }

    pub async fn set_genre(&self, genre: impl Into<String>) -> Option<FetchOutcome> {
        let genre = genre.into();
        self.update_query(move |q| q.set_genre(genre)).await
    }

    pub async fn set_artist(&self, artist: impl Into<String>) -> Option<FetchOutcome> {
        let artist = artist.into();
        self.update_query(move |q| q.set_artist(artist)).await
    }

    /// Records typed search text without fetching.
    pub fn input_search(&self, text: impl Into<String>) {
        self.lock().query.input_search(text, Instant::now());
    }

    /// When the typed-but-unapplied search becomes due.
    pub fn search_deadline(&self) -> Option<Instant> {
        self.lock().query.search_deadline()
    }

    /// Applies the pending search if its debounce delay has elapsed, then fetches.
    pub async fn poll_search(&self) -> Option<FetchOutcome> {
        self.update_query(|q| q.poll_search(Instant::now())).await
    }

    /// Applies the pending search right away.
    pub async fn flush_search(&self) -> Option<FetchOutcome> {
        self.update_query(QueryState::flush_search).await
    }

    /// Keystroke followed by the debounce wait. Only the call whose text was
    /// still current when its quiet period ended triggers a fetch.
    pub async fn search(&self, text: impl Into<String>) -> Option<FetchOutcome> {
        let delay = {
            let mut state = self.lock();
            state.query.input_search(text, Instant::now());
            state.query.debounce()
        };
        tokio::time::sleep(delay).await;
        self.poll_search().await
    }

    async fn update_query<F>(&self, change: F) -> Option<FetchOutcome>
    where
        F: FnOnce(&mut QueryState) -> bool,
    {
        let changed = change(&mut self.lock().query);
        if !changed {
            return None;
        }
        Some(self.refresh().await)
    }

    fn issue(&self) -> (u64, Query) {
        let mut state = self.lock();
        state.issued += 1;
        state.status = LoadStatus::Loading;
        let query = state.query.query().clone();
        tracing::debug!(seq = state.issued, ?query, "fetching page");
        (state.issued, query)
    }

    /// Applies a settled fetch. The second value asks the caller to fetch again
    /// because the page was clamped into range.
    fn settle(
        &self,
        seq: u64,
        query: &Query,
        result: Result<PageResult, GatewayError>,
    ) -> (FetchOutcome, bool) {
        let mut state = self.lock();
        if seq <= state.applied {
            tracing::debug!(seq, applied = state.applied, "discarding stale response");
            return (FetchOutcome::Superseded, false);
        }
        state.applied = seq;
        let newest = seq == state.issued;

        match result {
            Ok(page) => {
                let clamped = newest
                    && state.query.query() == query
                    && state.query.clamp_page(page.total_pages);
                tracing::debug!(
                    seq,
                    tracks = page.tracks.len(),
                    total_pages = page.total_pages,
                    "page applied"
                );
                state.page = Some(page);
                state.error = None;
                if newest {
                    state.status = LoadStatus::Ready;
                }
                (FetchOutcome::Applied, clamped)
            }
            Err(err) => {
                err.log("list");
                state.error = Some(err.clone());
                if newest {
                    state.status = LoadStatus::Error;
                }
                (FetchOutcome::Failed(err), false)
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
