//! Debounced incremental search.
//!
//! Each non-blank [`SearchController::set_query`] rearms a single trailing
//! timer; when it fires the query is sent to the backend. Results replace the
//! previous list wholesale. Only one request is in flight at a time: a timer
//! that fires during a request marks a rerun, which is dispatched as soon as
//! the request settles if the query has changed meanwhile. Answers therefore
//! apply in dispatch order and a superseded answer is never the final one.

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use rand::seq::SliceRandom;
use shared::protocol::SearchResult;
use tokio::{sync::watch, task::JoinHandle};
use tracing::{debug, error};

use crate::{
    api::SearchApi,
    error::{RequestError, SearchError},
};

pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(750);

const EXAMPLE_QUERIES: &[&str] = &[
    "What does the paper say about climate change?",
    "Making a cappuccino at home",
    "Benefits of eating mangoes",
    "How to plan a wedding on a budget",
    "Appointment with Dr. Makinde on 12th August",
    "Class notes lecture 3 on quantum mechanics",
    "Painting concepts for acrylics",
    "Abstract from the paper attention is all you need",
    "Climbing Everest without oxygen",
    "Solving a rubik's cube in 30 seconds",
    "Facts about the planet Mars",
    "How to make a website using React",
    "Fish at the bottom of the ocean",
    "Fish farming Kenya 2021",
    "How to make a cake without an oven",
    "Installing a solar panel at home",
];

/// A natural-language query suggestion for an empty search box.
pub fn example_query() -> &'static str {
    EXAMPLE_QUERIES
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or_default()
}

/// View state of the search page.
///
/// `results` is `None` until a search has succeeded; `Some(vec![])` means the
/// last search matched nothing. `focused` is always `None` or a member of
/// `results`. `pending` is set while a debounce timer is armed and `error`
/// holds the reason the last request failed, cleared by the next success.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchState {
    pub query: String,
    pub results: Option<Vec<SearchResult>>,
    pub loading: bool,
    pub focused: Option<SearchResult>,
    pub pending: bool,
    pub error: Option<String>,
}

impl SearchState {
    fn contains(&self, result: &SearchResult) -> bool {
        self.results
            .as_ref()
            .is_some_and(|results| results.iter().any(|r| r.corpus_id == result.corpus_id))
    }

    /// No timer armed and no request in flight.
    pub fn is_settled(&self) -> bool {
        !self.pending && !self.loading
    }
}

struct SearchInner {
    api: Arc<dyn SearchApi>,
    state: watch::Sender<SearchState>,
    // Only touched while the watch lock is held.
    rerun_pending: AtomicBool,
}

impl SearchInner {
    async fn run(self: Arc<Self>, from_timer: bool) {
        let Some(mut query) = self.begin(from_timer) else {
            return;
        };
        loop {
            debug!(query, "dispatching search");
            let outcome = self.api.search(&query).await;
            match self.finish(&query, outcome) {
                Some(next) => query = next,
                None => return,
            }
        }
    }

    /// Marks the search as loading and returns the query to send, or `None`
    /// when a request is already in flight or the query is blank.
    fn begin(&self, from_timer: bool) -> Option<String> {
        let mut dispatched = None;
        self.state.send_if_modified(|state| {
            let fired = from_timer && std::mem::take(&mut state.pending);
            if state.loading {
                self.rerun_pending.store(true, Ordering::Release);
                return fired;
            }
            if state.query.trim().is_empty() {
                return fired;
            }
            state.loading = true;
            dispatched = Some(state.query.clone());
            true
        });
        dispatched
    }

    /// Publishes the answer for `query`. Returns the next query to send when
    /// the text changed while the request was in flight; `loading` then stays
    /// set so observers never see the superseded answer as final.
    fn finish(
        &self,
        query: &str,
        outcome: Result<Vec<SearchResult>, RequestError>,
    ) -> Option<String> {
        let outcome = match outcome {
            Ok(results) => {
                debug!(query, hits = results.len(), "search completed");
                Ok(results)
            }
            Err(err) => {
                error!(query, error = %err, "search failed");
                Err(err.to_string())
            }
        };

        let mut next = None;
        self.state.send_modify(|state| {
            match outcome {
                Ok(results) => {
                    let keep_focus = state.focused.as_ref().is_some_and(|focused| {
                        results.iter().any(|r| r.corpus_id == focused.corpus_id)
                    });
                    if !keep_focus {
                        state.focused = None;
                    }
                    state.results = Some(results);
                    state.error = None;
                }
                Err(reason) => state.error = Some(reason),
            }

            let rerun = self.rerun_pending.swap(false, Ordering::AcqRel);
            if rerun && state.query != query && !state.query.trim().is_empty() {
                next = Some(state.query.clone());
            } else {
                state.loading = false;
            }
        });
        next
    }
}

/// Owns the search state and the pending debounce timer. Must be used from
/// within a tokio runtime. Dropping the controller cancels a timer that has
/// not fired yet; requests already sent are left to complete.
pub struct SearchController {
    inner: Arc<SearchInner>,
    debounce: Duration,
    timer: Option<JoinHandle<()>>,
}

impl SearchController {
    pub fn new(api: Arc<dyn SearchApi>) -> Self {
        Self::with_debounce(api, SEARCH_DEBOUNCE)
    }

    pub fn with_debounce(api: Arc<dyn SearchApi>, debounce: Duration) -> Self {
        let (state, _) = watch::channel(SearchState::default());
        Self {
            inner: Arc::new(SearchInner {
                api,
                state,
                rerun_pending: AtomicBool::new(false),
            }),
            debounce,
            timer: None,
        }
    }

    pub fn state(&self) -> SearchState {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.inner.state.subscribe()
    }

    /// Whether a debounce timer is armed and has not fired yet.
    pub fn has_pending_search(&self) -> bool {
        self.timer.as_ref().is_some_and(|timer| !timer.is_finished())
    }

    /// Stores the query text. Blank text only cancels a pending timer; any
    /// other text drops the focused result immediately and rearms the
    /// debounce timer.
    pub fn set_query(&mut self, text: impl Into<String>) {
        let text = text.into();
        let blank = text.trim().is_empty();

        self.cancel_timer();
        self.inner.state.send_modify(|state| {
            state.query = text;
            if !blank {
                state.focused = None;
                state.pending = true;
            }
        });
        if !blank {
            self.arm_timer();
        }
    }

    /// Runs a search for the current query right away, subject to the same
    /// in-flight and blank-query guards as a debounced search.
    pub async fn search(&self) {
        Arc::clone(&self.inner).run(false).await;
    }

    /// Waits until the controller is settled and reports how the last search
    /// ended: its results, or the reason it failed.
    pub async fn outcome(&self) -> Result<Vec<SearchResult>, SearchError> {
        let mut rx = self.subscribe();
        let state = match rx.wait_for(SearchState::is_settled).await {
            Ok(state) => state.clone(),
            Err(_) => self.state(),
        };
        match state.error {
            Some(reason) => Err(SearchError::Failed(reason)),
            None => Ok(state.results.unwrap_or_default()),
        }
    }

    pub fn set_focused(&self, result: Option<SearchResult>) -> Result<(), SearchError> {
        let mut outcome = Ok(());
        self.inner.state.send_if_modified(|state| match result {
            None => state.focused.take().is_some(),
            Some(result) => {
                if !state.contains(&result) {
                    outcome = Err(SearchError::UnknownResult(result.corpus_id));
                    return false;
                }
                state.focused = Some(result);
                true
            }
        });
        outcome
    }

    /// Cancels a timer that has not fired yet. Requests already sent are
    /// left to complete.
    pub fn shutdown(&mut self) {
        self.cancel_timer();
    }

    fn arm_timer(&mut self) {
        let inner = Arc::clone(&self.inner);
        let delay = self.debounce;
        self.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Detached: rearming must not abort a request that already left.
            tokio::spawn(inner.run(true));
        }));
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
            self.inner
                .state
                .send_if_modified(|state| std::mem::take(&mut state.pending));
        }
    }
}

impl Drop for SearchController {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}

#[cfg(test)]
#[path = "tests/search_tests.rs"]
mod tests;
