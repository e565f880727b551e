use std::sync::Arc;

use crate::{
    services::places_ai::PlacesAi,
    session::{coordinator::Coordinator, search_input::SearchInput},
};

#[derive(Clone)]
pub struct AppState {
    pub places_ai: Arc<dyn PlacesAi>,
    pub coordinator: Arc<Coordinator>,
    pub search_input: Arc<SearchInput>,
}
