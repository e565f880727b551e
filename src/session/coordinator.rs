use std::{
    any::Any,
    panic::AssertUnwindSafe,
    sync::{
        atomic::{AtomicU64, AtomicUsize, Ordering},
        Arc,
    },
};

use futures::FutureExt;
use tokio::sync::{OnceCell, RwLock};
use tracing::{debug, error, info, warn};

use super::{geolocation::Geolocator, results_view::ResultsView};
use crate::{
    services::places_ai::PlacesAi,
    types::{place::SearchResult, user_location::UserLocation},
};

pub const SEARCH_FAILED_MESSAGE: &str =
    "Failed to fetch results. Please check your API key and connection.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    Applied,
    Failed,
    /// A newer search started before this one finished; its answer was dropped.
    Stale,
    Rejected,
}

#[derive(Default)]
struct CoordinatorState {
    result: Option<SearchResult>,
    error: Option<String>,
}

/// Decrements the in-flight count however the search future ends, including
/// when it is dropped mid-await.
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn begin(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        InFlight(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

pub struct Coordinator {
    places_ai: Arc<dyn PlacesAi>,
    location: OnceCell<UserLocation>,
    state: RwLock<CoordinatorState>,
    in_flight: AtomicUsize,
    latest_search: AtomicU64,
}

impl Coordinator {
    pub fn new(places_ai: Arc<dyn PlacesAi>) -> Self {
        Self {
            places_ai,
            location: OnceCell::new(),
            state: RwLock::new(CoordinatorState::default()),
            in_flight: AtomicUsize::new(0),
            latest_search: AtomicU64::new(0),
        }
    }

    /// Best-effort position read. Failures are only logged.
    pub async fn acquire_location(&self, geolocator: &dyn Geolocator) {
        match geolocator.current_position().await {
            Ok(location) => match self.location.set(location) {
                Ok(()) => info!(
                    "Using location {}, {}",
                    location.latitude, location.longitude
                ),
                Err(_) => debug!("Location already known, ignoring new position"),
            },
            Err(e) => warn!("Geolocation not available or permission denied: {}", e),
        }
    }

    pub fn location(&self) -> Option<UserLocation> {
        self.location.get().copied()
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    pub async fn search(&self, query: &str) -> SearchOutcome {
        let query = query.trim();
        if query.is_empty() {
            warn!("Refusing to search for a blank query");
            return SearchOutcome::Rejected;
        }

        let _in_flight = InFlight::begin(&self.in_flight);
        let token = self.latest_search.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.write().await.error = None;

        info!("Searching for {:?}", query);
        let outcome = AssertUnwindSafe(self.places_ai.search_places(query, self.location()))
            .catch_unwind()
            .await;

        let mut state = self.state.write().await;
        if self.latest_search.load(Ordering::SeqCst) != token {
            debug!("Discarding stale results for {:?}", query);
            return SearchOutcome::Stale;
        }

        match outcome {
            Ok(result) => {
                state.result = Some(result);
                SearchOutcome::Applied
            }
            Err(panic) => {
                error!("Search for {:?} failed: {}", query, panic_message(&*panic));
                state.error = Some(SEARCH_FAILED_MESSAGE.to_string());
                SearchOutcome::Failed
            }
        }
    }

    pub async fn view(&self) -> ResultsView {
        let state = self.state.read().await;
        ResultsView::select(
            state.result.as_ref(),
            self.is_loading(),
            state.error.as_deref(),
        )
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    panic
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}
