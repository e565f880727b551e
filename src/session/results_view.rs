use serde::{Deserialize, Serialize};

use crate::types::place::{Place, SearchResult};

pub const IDLE_TITLE: &str = "Ready to explore?";
pub const IDLE_MESSAGE: &str = "Search for any destination, restaurant, or point of interest to see grounded results from Google Maps.";
pub const EMPTY_PLACES_MESSAGE: &str =
    "No specific map markers found, but check the summary above for more information.";
pub const LOADING_PLACEHOLDERS: usize = 3;

const PLACE_BADGE: &str = "Place";
const PLACE_LINK_LABEL: &str = "View on Maps";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceCard {
    /// `{uri}-{position}`, unique even when the service repeats a link.
    pub key: String,
    pub title: String,
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote: Option<String>,
    pub badge: String,
    pub link_label: String,
}

impl PlaceCard {
    fn new(position: usize, place: &Place) -> Self {
        PlaceCard {
            key: format!("{}-{}", place.uri, position),
            title: place.title.clone(),
            uri: place.uri.clone(),
            quote: place.snippet.as_ref().map(|s| format!("\"{}\"", s)),
            badge: PLACE_BADGE.to_string(),
            link_label: PLACE_LINK_LABEL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ResultsView {
    Idle {
        title: String,
        message: String,
    },
    Loading {
        placeholders: usize,
    },
    Error {
        message: String,
    },
    Success {
        summary: String,
        cards: Vec<PlaceCard>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        empty_message: Option<String>,
    },
}

impl ResultsView {
    /// Picks the single state to present. Loading wins over an error, and an
    /// error wins over a previous result.
    pub fn select(result: Option<&SearchResult>, loading: bool, error: Option<&str>) -> Self {
        if loading {
            return ResultsView::Loading {
                placeholders: LOADING_PLACEHOLDERS,
            };
        }

        if let Some(message) = error {
            return ResultsView::Error {
                message: message.to_string(),
            };
        }

        match result {
            Some(result) => {
                let cards: Vec<PlaceCard> = result
                    .places
                    .iter()
                    .enumerate()
                    .map(|(position, place)| PlaceCard::new(position, place))
                    .collect();
                let empty_message = cards
                    .is_empty()
                    .then(|| EMPTY_PLACES_MESSAGE.to_string());

                ResultsView::Success {
                    summary: result.text.clone(),
                    cards,
                    empty_message,
                }
            }
            None => ResultsView::Idle {
                title: IDLE_TITLE.to_string(),
                message: IDLE_MESSAGE.to_string(),
            },
        }
    }
}
