use async_trait::async_trait;

use crate::types::{place::SearchResult, user_location::UserLocation};

/// The AI-backed place lookups the rest of the app depends on.
///
/// Both calls always resolve: failures degrade to an empty suggestion list or a
/// placeholder [`SearchResult`] inside the implementation.
#[async_trait]
pub trait PlacesAi: Send + Sync {
    async fn get_suggestions(&self, query: &str, location: Option<UserLocation>) -> Vec<String>;

    async fn search_places(&self, query: &str, location: Option<UserLocation>) -> SearchResult;
}
