//! Debounced location search.
//!
//! Each edit restarts a fixed delay; only when input has been quiet for the
//! whole delay is a request issued, carrying the final query. An empty query
//! clears results at once. Responses are sequenced so only the newest request
//! can update the result list.

use foundation::location::Location;
use foundation::time::{Millis, TimeRange};
use runtime::sequence::{RequestSeq, Sequencer};
use runtime::timers::{TimerId, TimerQueue};

use crate::error::DataError;
use crate::protocol::SEARCH_LIMIT;

pub const SEARCH_DEBOUNCE_MS: u64 = 300;

#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub seq: RequestSeq,
    pub query: String,
    pub time_range: TimeRange,
    pub limit: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Applied { results: usize },
    Failed(DataError),
    Stale,
}

#[derive(Debug)]
pub struct SearchController {
    query: String,
    results: Vec<Location>,
    loading: bool,
    show_results: bool,
    debounce_ms: u64,
    limit: usize,
    timers: TimerQueue<String>,
    pending: Option<TimerId>,
    seq: Sequencer,
}

impl Default for SearchController {
    fn default() -> Self {
        Self::new(SEARCH_DEBOUNCE_MS, SEARCH_LIMIT)
    }
}

impl SearchController {
    pub fn new(debounce_ms: u64, limit: usize) -> Self {
        Self {
            query: String::new(),
            results: Vec::new(),
            loading: false,
            show_results: false,
            debounce_ms,
            limit,
            timers: TimerQueue::new(),
            pending: None,
            seq: Sequencer::new(),
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn results(&self) -> &[Location] {
        &self.results
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn show_results(&self) -> bool {
        self.show_results
    }

    /// Results the dropdown should list right now.
    pub fn visible_results(&self) -> &[Location] {
        if self.show_results {
            &self.results
        } else {
            &[]
        }
    }

    /// The "No locations found" condition.
    pub fn no_results(&self) -> bool {
        self.show_results && !self.query.is_empty() && self.results.is_empty() && !self.loading
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn next_deadline(&self) -> Option<Millis> {
        self.timers.next_deadline()
    }

    /// Records an edit of the search box at `now`.
    pub fn set_query(&mut self, now: Millis, query: impl Into<String>) {
        self.query = query.into();
        if let Some(id) = self.pending.take() {
            self.timers.cancel(id);
            tracing::trace!("pending search superseded");
        }

        if self.query.trim().is_empty() {
            self.results.clear();
            self.seq.invalidate();
            self.loading = false;
            return;
        }

        let deadline = now.after(self.debounce_ms);
        self.pending = Some(self.timers.schedule(deadline, self.query.clone()));
    }

    /// Issues the debounced request once its delay has elapsed.
    pub fn poll(&mut self, now: Millis, time_range: TimeRange) -> Option<SearchRequest> {
        let mut issued = None;
        while let Some((id, query)) = self.timers.pop_due(now) {
            if self.pending != Some(id) {
                continue;
            }
            self.pending = None;
            self.loading = true;
            let request = SearchRequest {
                seq: self.seq.issue(),
                query,
                time_range,
                limit: self.limit,
            };
            tracing::debug!(seq = request.seq.0, query = %request.query, "search issued");
            issued = Some(request);
        }
        issued
    }

    pub fn complete(
        &mut self,
        seq: RequestSeq,
        result: Result<Vec<Location>, DataError>,
    ) -> SearchOutcome {
        if !self.seq.accept(seq) {
            return SearchOutcome::Stale;
        }
        self.loading = false;
        match result {
            Ok(results) => {
                let count = results.len();
                self.results = results;
                self.show_results = true;
                SearchOutcome::Applied { results: count }
            }
            Err(err) => {
                tracing::warn!(%err, "search failed");
                SearchOutcome::Failed(err)
            }
        }
    }

    /// Search box gained focus.
    pub fn focus(&mut self) {
        if !self.query.is_empty() {
            self.show_results = true;
        }
    }

    /// Click outside the search box.
    pub fn dismiss(&mut self) {
        self.show_results = false;
    }

    /// A result was picked: the box empties and nothing in flight may
    /// reopen the list.
    pub fn pick(&mut self) {
        self.cancel_all();
        self.query.clear();
        self.results.clear();
        self.show_results = false;
    }

    /// Empties the result list, leaving the query as typed. A search still
    /// waiting on its debounce is dropped too.
    pub fn clear_results(&mut self) {
        if let Some(id) = self.pending.take() {
            self.timers.cancel(id);
            tracing::trace!("pending search dropped by selection");
        }
        self.results.clear();
        self.show_results = false;
        self.seq.invalidate();
        self.loading = false;
    }

    /// Cancels the debounce timer and any request in flight.
    pub fn cancel_all(&mut self) {
        let dropped = self.timers.clear();
        if dropped > 0 {
            tracing::debug!(dropped, "search timers cancelled");
        }
        self.pending = None;
        self.seq.invalidate();
        self.loading = false;
    }
}
