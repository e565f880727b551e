use std::{sync::Arc, time::Duration};

use serde::{Deserialize, Serialize};
use tokio::{sync::Mutex, task::JoinHandle};
use tracing::debug;

use crate::{services::places_ai::PlacesAi, types::user_location::UserLocation};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(400);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTarget {
    Inside,
    Outside,
}

#[derive(Default)]
struct InputState {
    query: String,
    suggestions: Vec<String>,
    show_suggestions: bool,
    // Bumped on every edit; a debounce task may only write while its value is current.
    generation: u64,
}

impl InputState {
    fn discard_suggestions(&mut self) {
        self.generation += 1;
        self.suggestions.clear();
        self.show_suggestions = false;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchInputSnapshot {
    pub query: String,
    pub suggestions: Vec<String>,
    pub show_suggestions: bool,
    pub submit_enabled: bool,
}

/// Query box with debounced suggestions.
///
/// At most one debounce task is pending at a time: scheduling a new one aborts
/// the previous task, so a burst of keystrokes issues a single suggestion
/// request for the final text.
pub struct SearchInput {
    places_ai: Arc<dyn PlacesAi>,
    debounce: Duration,
    state: Arc<Mutex<InputState>>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl SearchInput {
    pub fn new(places_ai: Arc<dyn PlacesAi>, debounce: Duration) -> Self {
        Self {
            places_ai,
            debounce,
            state: Arc::new(Mutex::new(InputState::default())),
            pending: Mutex::new(None),
        }
    }

    pub async fn type_text(&self, text: &str, location: Option<UserLocation>) {
        let mut pending = self.pending.lock().await;
        if let Some(previous) = pending.take() {
            previous.abort();
        }

        let generation = {
            let mut state = self.state.lock().await;
            state.query = text.to_string();
            state.generation += 1;
            state.generation
        };

        let places_ai = self.places_ai.clone();
        let state = self.state.clone();
        let debounce = self.debounce;
        let query = text.to_string();

        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;

            let suggestions = if query.trim().chars().count() > 1 {
                places_ai.get_suggestions(&query, location).await
            } else {
                Vec::new()
            };

            let mut state = state.lock().await;
            if state.generation != generation {
                debug!("Dropping suggestions for outdated query {:?}", query);
                return;
            }
            state.show_suggestions = !suggestions.is_empty();
            state.suggestions = suggestions;
        }));
    }

    pub async fn pointer_down(&self, target: PointerTarget) {
        if target == PointerTarget::Outside {
            let mut state = self.state.lock().await;
            state.suggestions.clear();
            state.show_suggestions = false;
        }
    }

    /// Returns the trimmed query to search for, or `None` when the submit
    /// control is disabled or the query is blank. The query text is kept.
    pub async fn submit(&self, is_loading: bool) -> Option<String> {
        if is_loading {
            debug!("Ignoring submit while a search is in flight");
            return None;
        }

        // Same lock order as `type_text`: pending slot first, then state.
        let mut pending = self.pending.lock().await;
        let mut state = self.state.lock().await;
        let query = state.query.trim().to_string();
        if query.is_empty() {
            return None;
        }
        state.discard_suggestions();
        if let Some(previous) = pending.take() {
            previous.abort();
        }

        Some(query)
    }

    /// Picks a visible suggestion, copying it into the query box.
    pub async fn select_suggestion(&self, index: usize) -> Option<String> {
        let mut pending = self.pending.lock().await;
        let mut state = self.state.lock().await;
        if !state.show_suggestions {
            return None;
        }
        let selected = state.suggestions.get(index)?.clone();
        state.query = selected.clone();
        state.discard_suggestions();
        if let Some(previous) = pending.take() {
            previous.abort();
        }

        Some(selected)
    }

    pub async fn snapshot(&self, is_loading: bool) -> SearchInputSnapshot {
        let state = self.state.lock().await;
        SearchInputSnapshot {
            query: state.query.clone(),
            suggestions: state.suggestions.clone(),
            show_suggestions: state.show_suggestions,
            submit_enabled: !is_loading,
        }
    }
}
