//! Debounced place search
//!
//! One `SearchController` per search field. Keystrokes go through
//! `on_query_change`; lookups start 300ms after the last keystroke and only
//! the response for the most recent query is ever applied.
//!
//! Complete postal codes go to the postal lookup, everything else to place
//! search. Lookup failures surface as an empty result, never as an error.

pub mod target;

pub use target::{FormFields, FormLocation, SelectionTarget};

use crate::config::SearchConfig;
use crate::error::Result;
use crate::geo::{PlaceSearch, PostalLookup};
use crate::place::{classify_query, Place, QueryKind};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Visible state of one search field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchState {
    /// Nothing to show (short query, or a selection was just made)
    Idle,
    /// A lookup for `query` is in flight
    Searching { query: String },
    /// Candidates for `query`
    Results { query: String, candidates: Vec<Place> },
    /// Nothing found for `query`
    Empty { query: String },
    /// `query` was an exact postal code and `place` was committed for it
    Selected { query: String, place: Place },
}

impl SearchState {
    /// Candidates currently shown
    pub fn candidates(&self) -> &[Place] {
        match self {
            SearchState::Results { candidates, .. } => candidates,
            _ => &[],
        }
    }
}

/// Per-surface search behavior
#[derive(Debug, Clone, Copy)]
pub struct SearchOptions {
    pub debounce: Duration,
    pub min_query_len: usize,
    /// Commit an exact postal-code hit without showing it as a candidate
    pub auto_select: bool,
}

impl SearchOptions {
    pub fn from_config(config: &SearchConfig) -> Self {
        Self {
            debounce: config.debounce(),
            min_query_len: config.min_query_len,
            auto_select: false,
        }
    }

    pub fn with_auto_select(mut self, auto_select: bool) -> Self {
        self.auto_select = auto_select;
        self
    }
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self::from_config(&SearchConfig::default())
    }
}

/// Sequence number of the latest keystroke and its pending debounce timer
#[derive(Debug, Default)]
struct Control {
    seq: u64,
    timer: Option<JoinHandle<()>>,
}

struct Inner<P, S, T> {
    postal: P,
    search: S,
    target: T,
    options: SearchOptions,
    control: Mutex<Control>,
    state: watch::Sender<SearchState>,
}

/// Debounced, staleness-aware search for one input field
pub struct SearchController<P, S, T> {
    inner: Arc<Inner<P, S, T>>,
}

impl<P, S, T> Clone for SearchController<P, S, T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P, S, T> SearchController<P, S, T>
where
    P: PostalLookup + 'static,
    S: PlaceSearch + 'static,
    T: SelectionTarget + 'static,
{
    pub fn new(postal: P, search: S, target: T, options: SearchOptions) -> Self {
        let (state, _) = watch::channel(SearchState::Idle);
        Self {
            inner: Arc::new(Inner {
                postal,
                search,
                target,
                options,
                control: Mutex::new(Control::default()),
                state,
            }),
        }
    }

    /// Current state
    pub fn state(&self) -> SearchState {
        self.inner.state.borrow().clone()
    }

    /// Watch for state changes
    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.inner.state.subscribe()
    }

    /// The selection target this field writes to
    pub fn target(&self) -> &T {
        &self.inner.target
    }

    /// Handle a keystroke
    ///
    /// Must be called from within a tokio runtime.
    pub fn on_query_change(&self, query: &str) {
        let mut control = self.inner.lock_control();
        let seq = control.advance();

        if query.chars().count() < self.inner.options.min_query_len {
            self.inner.state.send_replace(SearchState::Idle);
            return;
        }

        let inner = Arc::clone(&self.inner);
        let query = query.to_string();
        control.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(inner.options.debounce).await;
            if !inner.is_current(seq) {
                return;
            }
            // The lookup runs detached: later keystrokes cancel timers, not requests
            tokio::spawn(inner.run_lookup(seq, query));
        }));
    }

    /// Commit a candidate and clear the result list
    pub fn select(&self, place: Place) -> Result<()> {
        let mut control = self.inner.lock_control();
        control.advance();
        self.inner.state.send_replace(SearchState::Idle);
        self.inner.target.commit(place)
    }
}

impl Control {
    /// Invalidate everything in flight and cancel the pending timer
    fn advance(&mut self) -> u64 {
        self.seq += 1;
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        self.seq
    }
}

impl<P, S, T> Inner<P, S, T>
where
    P: PostalLookup,
    S: PlaceSearch,
    T: SelectionTarget,
{
    fn lock_control(&self) -> MutexGuard<'_, Control> {
        self.control.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_current(&self, seq: u64) -> bool {
        self.lock_control().seq == seq
    }

    async fn lookup(&self, kind: &QueryKind) -> Vec<Place> {
        match kind {
            QueryKind::PostalCode(code) => {
                self.postal.lookup(&code.digits()).await.into_iter().collect()
            }
            QueryKind::FreeText(text) => self.search.search(text).await,
        }
    }

    async fn run_lookup(self: Arc<Self>, seq: u64, query: String) {
        {
            let control = self.lock_control();
            if control.seq != seq {
                return;
            }
            self.state.send_replace(SearchState::Searching {
                query: query.clone(),
            });
        }

        let kind = classify_query(&query);
        let candidates = self.lookup(&kind).await;

        let control = self.lock_control();
        if control.seq != seq {
            debug!("Discarding stale results for {:?}", query);
            return;
        }

        let exact_hit = matches!(kind, QueryKind::PostalCode(_)) && candidates.len() == 1;
        if exact_hit && self.options.auto_select {
            if let Some(place) = candidates.into_iter().next() {
                debug!("Auto-selecting {} for {:?}", place, query);
                match self.target.commit(place.clone()) {
                    Ok(()) => {
                        self.state.send_replace(SearchState::Selected { query, place });
                    }
                    Err(e) => {
                        warn!("Failed to apply selected location: {}", e);
                        self.state.send_replace(SearchState::Empty { query });
                    }
                }
            }
        } else if candidates.is_empty() {
            self.state.send_replace(SearchState::Empty { query });
        } else {
            self.state.send_replace(SearchState::Results { query, candidates });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::LocationCache;
    use crate::context::LocationContext;
    use std::collections::HashMap;

    /// Records every call; answers after a per-query delay
    #[derive(Default)]
    struct MockSearch {
        results: HashMap<String, Vec<Place>>,
        delays: HashMap<String, Duration>,
        calls: Mutex<Vec<String>>,
    }

    impl PlaceSearch for MockSearch {
        async fn search(&self, query: &str) -> Vec<Place> {
            self.calls.lock().unwrap().push(query.to_string());
            if let Some(delay) = self.delays.get(query) {
                tokio::time::sleep(*delay).await;
            }
            self.results.get(query).cloned().unwrap_or_default()
        }
    }

    #[derive(Default)]
    struct MockPostal {
        places: HashMap<String, Place>,
        calls: Mutex<Vec<String>>,
    }

    impl PostalLookup for MockPostal {
        async fn lookup(&self, postal_code: &str) -> Option<Place> {
            self.calls.lock().unwrap().push(postal_code.to_string());
            self.places.get(postal_code).cloned()
        }
    }

    fn city(name: &str, state: &str) -> Place {
        Place::new(name, state, None, None)
    }

    fn guaira() -> Place {
        Place::new("Guaíra", "SP", Some("14790-000"), Some("Centro".to_string()))
    }

    fn postal() -> MockPostal {
        MockPostal {
            places: HashMap::from([("14790000".to_string(), guaira())]),
            ..Default::default()
        }
    }

    fn context() -> Arc<LocationContext> {
        Arc::new(LocationContext::new(LocationCache::without_storage()))
    }

    /// Let spawned timers and lookups run to completion
    async fn settle() {
        tokio::time::sleep(Duration::from_secs(2)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_short_query_is_idle_without_lookup() {
        let controller =
            SearchController::new(postal(), MockSearch::default(), context(), SearchOptions::default());

        controller.on_query_change("Gu");
        assert_eq!(controller.state(), SearchState::Idle);
        settle().await;

        assert!(controller.inner.search.calls.lock().unwrap().is_empty());
        assert!(controller.inner.postal.calls.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounce_collapses_keystrokes() {
        let search = MockSearch {
            results: HashMap::from([(
                "Guaíra".to_string(),
                vec![city("Guaíra", "SP"), city("Guaíra", "PR")],
            )]),
            ..Default::default()
        };
        let controller =
            SearchController::new(postal(), search, context(), SearchOptions::default());

        for q in ["Gua", "Guaí", "Guaír", "Guaíra", "Guaíra"] {
            controller.on_query_change(q);
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        settle().await;

        assert_eq!(
            *controller.inner.search.calls.lock().unwrap(),
            vec!["Guaíra".to_string()]
        );
        assert_eq!(controller.state().candidates().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shortening_query_clears_results() {
        let search = MockSearch {
            results: HashMap::from([("Barretos".to_string(), vec![city("Barretos", "SP")])]),
            ..Default::default()
        };
        let controller =
            SearchController::new(postal(), search, context(), SearchOptions::default());

        controller.on_query_change("Barretos");
        settle().await;
        assert_eq!(controller.state().candidates().len(), 1);

        controller.on_query_change("Ba");
        assert_eq!(controller.state(), SearchState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_response_discarded() {
        let search = MockSearch {
            results: HashMap::from([
                ("Sao Pau".to_string(), vec![city("São Paulo de Olivença", "AM")]),
                ("São Paulo".to_string(), vec![city("São Paulo", "SP")]),
            ]),
            delays: HashMap::from([
                ("Sao Pau".to_string(), Duration::from_millis(1000)),
                ("São Paulo".to_string(), Duration::from_millis(10)),
            ]),
            ..Default::default()
        };
        let controller =
            SearchController::new(postal(), search, context(), SearchOptions::default());

        controller.on_query_change("Sao Pau");
        // Past the debounce: the slow lookup is now in flight
        tokio::time::sleep(Duration::from_millis(350)).await;
        assert_eq!(
            controller.state(),
            SearchState::Searching { query: "Sao Pau".to_string() }
        );

        controller.on_query_change("São Paulo");
        settle().await;

        assert_eq!(controller.inner.search.calls.lock().unwrap().len(), 2);
        assert_eq!(
            controller.state(),
            SearchState::Results {
                query: "São Paulo".to_string(),
                candidates: vec![city("São Paulo", "SP")],
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_postal_code_auto_selects() {
        let ctx = context();
        let options = SearchOptions::default().with_auto_select(true);
        let controller =
            SearchController::new(postal(), MockSearch::default(), Arc::clone(&ctx), options);

        controller.on_query_change("14790000");
        settle().await;

        assert_eq!(
            *controller.inner.postal.calls.lock().unwrap(),
            vec!["14790000".to_string()]
        );
        assert!(controller.inner.search.calls.lock().unwrap().is_empty());
        assert_eq!(
            controller.state(),
            SearchState::Selected {
                query: "14790000".to_string(),
                place: guaira(),
            }
        );
        assert!(controller.state().candidates().is_empty());
        assert_eq!(ctx.place(), Some(guaira()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_postal_code_without_auto_select() {
        let ctx = context();
        let controller =
            SearchController::new(postal(), MockSearch::default(), Arc::clone(&ctx), SearchOptions::default());

        controller.on_query_change("14790-000");
        settle().await;

        assert_eq!(controller.state().candidates(), &[guaira()]);
        assert!(ctx.place().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_partial_postal_code_goes_to_search() {
        let controller =
            SearchController::new(postal(), MockSearch::default(), context(), SearchOptions::default());

        controller.on_query_change("14790-0");
        settle().await;

        assert!(controller.inner.postal.calls.lock().unwrap().is_empty());
        assert_eq!(
            *controller.inner.search.calls.lock().unwrap(),
            vec!["14790-0".to_string()]
        );
        assert_eq!(
            controller.state(),
            SearchState::Empty { query: "14790-0".to_string() }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_postal_code_is_empty() {
        let options = SearchOptions::default().with_auto_select(true);
        let controller =
            SearchController::new(postal(), MockSearch::default(), context(), options);

        controller.on_query_change("99999-999");
        settle().await;

        assert_eq!(
            controller.state(),
            SearchState::Empty { query: "99999-999".to_string() }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_select_into_form() {
        let search = MockSearch {
            results: HashMap::from([("Barretos".to_string(), vec![city("Barretos", "SP")])]),
            ..Default::default()
        };
        let ctx = context();
        ctx.set_place(guaira()).unwrap();
        let form = FormLocation::from_place(ctx.place().as_ref());
        let controller = SearchController::new(postal(), search, form, SearchOptions::default());

        controller.on_query_change("Barretos");
        settle().await;
        let candidate = controller.state().candidates()[0].clone();
        controller.select(candidate).unwrap();

        assert_eq!(controller.state(), SearchState::Idle);
        let fields = controller.target().fields();
        assert_eq!(fields.city, "Barretos");
        assert_eq!(fields.postal_code, "14790-000");
        // The session location is a different consumer
        assert_eq!(ctx.place(), Some(guaira()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_select_discards_in_flight() {
        let search = MockSearch {
            results: HashMap::from([("Olímpia".to_string(), vec![city("Olímpia", "SP")])]),
            delays: HashMap::from([("Olímpia".to_string(), Duration::from_millis(500))]),
            ..Default::default()
        };
        let ctx = context();
        let controller =
            SearchController::new(postal(), search, Arc::clone(&ctx), SearchOptions::default());

        controller.on_query_change("Olímpia");
        tokio::time::sleep(Duration::from_millis(350)).await;
        controller.select(guaira()).unwrap();
        settle().await;

        assert_eq!(controller.state(), SearchState::Idle);
        assert_eq!(ctx.place(), Some(guaira()));
    }
}
