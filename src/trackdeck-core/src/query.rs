use crate::models::{Query, SortKey};
use std::time::Duration;
use tokio::time::Instant;

/// Default quiet period before typed search text is applied.
pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(400);

#[derive(Debug, Clone)]
struct PendingSearch {
    text: String,
    deadline: Instant,
}

/// Owns the live [`Query`] and debounces search input.
///
/// Pure state: callers pass the current instant and decide what to do when a
/// setter reports a change. Changing search, genre, artist or sort returns to the
/// first page; changing the page alone leaves the filters alone.
#[derive(Debug, Clone)]
pub struct QueryState {
    query: Query,
    debounce: Duration,
    pending_search: Option<PendingSearch>,
}

impl QueryState {
    pub fn new(limit: u32, debounce: Duration) -> Self {
        Self::from_query(Query::first_page(limit), debounce)
    }

    pub fn from_query(query: Query, debounce: Duration) -> Self {
        Self {
            query,
            debounce,
            pending_search: None,
        }
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    /// Returns `true` when the page actually moved.
    pub fn set_page(&mut self, page: u32) -> bool {
        let page = page.max(1);
        if self.query.page == page {
            return false;
        }
        self.query.page = page;
        true
    }

    pub fn set_sort(&mut self, sort: SortKey) -> bool {
        if self.query.sort == sort {
            return false;
        }
        self.query.sort = sort;
        self.query.page = 1;
        true
    }

    pub fn set_genre(&mut self, genre: impl Into<String>) -> bool {
        let genre = genre.into();
        if self.query.genre == genre {
            return false;
        }
        self.query.genre = genre;
        self.query.page = 1;
        true
    }

    pub fn set_artist(&mut self, artist: impl Into<String>) -> bool {
        let artist = artist.into();
        if self.query.artist == artist {
            return false;
        }
        self.query.artist = artist;
        self.query.page = 1;
        true
    }

    /// Records a keystroke. Nothing reaches the live query until the text has
    /// been stable for the full debounce delay.
    pub fn input_search(&mut self, text: impl Into<String>, now: Instant) {
        self.pending_search = Some(PendingSearch {
            text: text.into(),
            deadline: now + self.debounce,
        });
    }

    /// Text typed but not yet applied.
    pub fn pending_search(&self) -> Option<&str> {
        self.pending_search.as_ref().map(|p| p.text.as_str())
    }

    /// The instant at which the pending search becomes due, if any.
    pub fn search_deadline(&self) -> Option<Instant> {
        self.pending_search.as_ref().map(|p| p.deadline)
    }

    /// Applies the pending search if its quiet period elapsed.
    ///
    /// Returns `true` only when the live query changed.
    pub fn poll_search(&mut self, now: Instant) -> bool {
        match &self.pending_search {
            Some(pending) if now >= pending.deadline => self.flush_search(),
            _ => false,
        }
    }

    /// Applies the pending search immediately (e.g. on Enter).
    pub fn flush_search(&mut self) -> bool {
        let Some(pending) = self.pending_search.take() else {
            return false;
        };
        if self.query.search == pending.text {
            return false;
        }
        self.query.search = pending.text;
        self.query.page = 1;
        true
    }

    /// Pulls the page back inside `[1, total_pages]` after the result set shrank.
    pub fn clamp_page(&mut self, total_pages: u32) -> bool {
        let upper = total_pages.max(1);
        if self.query.page <= upper {
            return false;
        }
        self.query.page = upper;
        true
    }
}

impl Default for QueryState {
    fn default() -> Self {
        Self::new(10, DEFAULT_SEARCH_DEBOUNCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_on_page(page: u32) -> QueryState {
        let mut state = QueryState::default();
        state.set_page(page);
        state
    }

    #[test]
    fn filter_changes_reset_page() {
        let mut state = state_on_page(3);
        assert!(state.set_sort(SortKey::Artist));
        assert_eq!(state.query().page, 1);

        state.set_page(3);
        assert!(state.set_genre("Rock"));
        assert_eq!(state.query().page, 1);

        state.set_page(3);
        assert!(state.set_artist("Band"));
        assert_eq!(state.query().page, 1);

        state.set_page(3);
        state.input_search("abc", Instant::now());
        assert!(state.flush_search());
        assert_eq!(state.query().page, 1);
        assert_eq!(state.query().search, "abc");
    }

    #[test]
    fn page_change_keeps_filters() {
        let mut state = QueryState::default();
        state.set_genre("Jazz");
        state.set_sort(SortKey::Artist);
        assert!(state.set_page(2));
        assert_eq!(state.query().genre, "Jazz");
        assert_eq!(state.query().sort, SortKey::Artist);
    }

    #[test]
    fn unchanged_values_report_no_change() {
        let mut state = state_on_page(2);
        assert!(!state.set_sort(SortKey::Title));
        assert!(!state.set_genre(""));
        assert!(!state.set_page(2));
        assert_eq!(state.query().page, 2);
    }

    #[test]
    fn page_never_drops_below_one() {
        let mut state = state_on_page(2);
        assert!(state.set_page(0));
        assert_eq!(state.query().page, 1);
    }

    #[test]
    fn rapid_keystrokes_apply_only_the_last_value() {
        let mut state = QueryState::default();
        let start = Instant::now();
        let step = Duration::from_millis(100);

        let mut applied = Vec::new();
        for (i, text) in ["r", "ro", "roc", "rock"].iter().enumerate() {
            let now = start + step * i as u32;
            state.input_search(*text, now);
            if state.poll_search(now + Duration::from_millis(50)) {
                applied.push(state.query().search.clone());
            }
        }
        let settled = start + step * 3 + DEFAULT_SEARCH_DEBOUNCE;
        if state.poll_search(settled) {
            applied.push(state.query().search.clone());
        }

        assert_eq!(applied, vec!["rock".to_string()]);
        assert!(state.pending_search().is_none());
    }

    #[test]
    fn search_is_not_applied_before_deadline() {
        let mut state = QueryState::default();
        let now = Instant::now();
        state.input_search("jazz", now);
        assert!(!state.poll_search(now + Duration::from_millis(399)));
        assert_eq!(state.pending_search(), Some("jazz"));
        assert!(state.poll_search(now + DEFAULT_SEARCH_DEBOUNCE));
        assert_eq!(state.query().search, "jazz");
    }

    #[test]
    fn clamp_only_moves_down() {
        let mut state = state_on_page(5);
        assert!(state.clamp_page(3));
        assert_eq!(state.query().page, 3);
        assert!(!state.clamp_page(4));
        assert!(state.clamp_page(0));
        assert_eq!(state.query().page, 1);
    }
}
