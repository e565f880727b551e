use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, error};
use urlencoding::encode;

use super::types::{
    gemini_service_error::GeminiServiceError,
    generate_content_request::{
        Content, GenerateContentRequest, GenerationConfig, GoogleMapsTool, LatLng,
        RetrievalConfig, Tool, ToolConfig,
    },
    generate_content_response::{GenerateContentResponse, GroundingChunk},
};
use crate::{
    services::places_ai::PlacesAi,
    types::{
        place::{Place, SearchResult},
        user_location::UserLocation,
    },
};

pub const DEFAULT_GEMINI_HOST: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

pub const MAX_SUGGESTIONS: usize = 5;
pub const MIN_SUGGESTION_QUERY_LEN: usize = 2;

pub const NO_RESULTS_TEXT: &str = "No results found.";
pub const SEARCH_ERROR_TEXT: &str = "An error occurred while searching. Please try again.";
const UNNAMED_PLACE: &str = "Unnamed place";

const SUGGESTION_SYSTEM_INSTRUCTION: &str = "You are a helpful assistant providing search suggestions for a maps application. Keep suggestions concise and relevant.";
const SUGGESTION_TEMPERATURE: f32 = 0.1;

static LIST_NUMBERING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\.\s*").expect("numbering pattern is valid"));

#[derive(Clone)]
pub struct GeminiServiceConfig {
    pub api_key: String,
    pub host: String,
    pub model: String,
}

#[derive(Clone)]
pub struct GeminiService {
    config: GeminiServiceConfig,
    client: reqwest::Client,
}

impl GeminiService {
    pub fn new(config: GeminiServiceConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    pub async fn generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GeminiServiceError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.host,
            encode(&self.config.model)
        );

        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| GeminiServiceError::Request(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(GeminiServiceError::Status(status.as_u16(), body));
        }

        resp.json::<GenerateContentResponse>()
            .await
            .map_err(|e| GeminiServiceError::Decode(e.to_string()))
    }

    pub async fn get_suggestions(
        &self,
        query: &str,
        location: Option<UserLocation>,
    ) -> Vec<String> {
        let query = query.trim();
        if query.chars().count() < MIN_SUGGESTION_QUERY_LEN {
            return Vec::new();
        }

        let mut prompt = format!(
            "Suggest {} specific and real place names or categories starting with or matching \"{}\" for a Google Maps search. Return only the names as a list.",
            MAX_SUGGESTIONS, query
        );
        if let Some(location) = location {
            prompt.push_str(&format!(
                " Prefer places near {}, {}.",
                location.latitude, location.longitude
            ));
        }

        let request = GenerateContentRequest {
            contents: vec![Content::user(&prompt)],
            system_instruction: Some(Content::instruction(SUGGESTION_SYSTEM_INSTRUCTION)),
            generation_config: Some(GenerationConfig {
                temperature: SUGGESTION_TEMPERATURE,
            }),
            tools: None,
            tool_config: None,
        };

        match self.generate_content(&request).await {
            Ok(response) => parse_suggestions(&response.text().unwrap_or_default()),
            Err(e) => {
                error!("Error fetching suggestions: {}", e);
                Vec::new()
            }
        }
    }

    pub async fn search_places(
        &self,
        query: &str,
        location: Option<UserLocation>,
    ) -> SearchResult {
        let request = GenerateContentRequest {
            contents: vec![Content::user(&format!(
                "Search for \"{}\" on Google Maps. Provide a summary and list specific places.",
                query.trim()
            ))],
            system_instruction: None,
            generation_config: None,
            tools: Some(vec![Tool {
                google_maps: GoogleMapsTool::default(),
            }]),
            tool_config: location.map(|l| ToolConfig {
                retrieval_config: RetrievalConfig {
                    lat_lng: LatLng {
                        latitude: l.latitude,
                        longitude: l.longitude,
                    },
                },
            }),
        };

        match self.generate_content(&request).await {
            Ok(response) => {
                let places = places_from_chunks(response.grounding_chunks());
                debug!("Search for {:?} grounded {} places", query, places.len());

                SearchResult {
                    text: response.text().unwrap_or_else(|| NO_RESULTS_TEXT.to_string()),
                    places,
                }
            }
            Err(e) => {
                error!("Error searching places: {}", e);
                SearchResult {
                    text: SEARCH_ERROR_TEXT.to_string(),
                    places: Vec::new(),
                }
            }
        }
    }
}

#[async_trait]
impl PlacesAi for GeminiService {
    async fn get_suggestions(&self, query: &str, location: Option<UserLocation>) -> Vec<String> {
        GeminiService::get_suggestions(self, query, location).await
    }

    async fn search_places(&self, query: &str, location: Option<UserLocation>) -> SearchResult {
        GeminiService::search_places(self, query, location).await
    }
}

/// Turns a free-form list reply into at most [`MAX_SUGGESTIONS`] clean entries.
pub fn parse_suggestions(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| LIST_NUMBERING.replace(line.trim(), "").trim().to_string())
        .filter(|line| !line.is_empty())
        .take(MAX_SUGGESTIONS)
        .collect()
}

pub fn places_from_chunks(chunks: &[GroundingChunk]) -> Vec<Place> {
    chunks
        .iter()
        .filter_map(|chunk| match chunk {
            GroundingChunk::Maps(maps) => Some(maps),
            GroundingChunk::Other => None,
        })
        .filter_map(|maps| {
            let uri = maps.uri.as_deref().map(str::trim).filter(|u| !u.is_empty())?;
            let title = maps
                .title
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .unwrap_or(UNNAMED_PLACE);

            Some(Place {
                title: title.to_string(),
                uri: uri.to_string(),
                snippet: maps.first_review_excerpt(),
                description: None,
                rating: None,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use mockito::Matcher;
    use serde_json::json;
    use tracing_test::traced_test;

    use super::*;

    const GENERATE_PATH: &str = "/v1beta/models/gemini-2.5-flash:generateContent";

    fn service_for(server: &mockito::ServerGuard) -> GeminiService {
        GeminiService::new(GeminiServiceConfig {
            api_key: "key".to_string(),
            host: server.url(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
        })
    }

    fn text_reply(text: &str) -> String {
        json!({
            "candidates": [{ "content": { "role": "model", "parts": [{ "text": text }] } }]
        })
        .to_string()
    }

    #[test]
    fn parse_suggestions_strips_numbering_and_blank_lines() {
        let parsed = parse_suggestions("1. Blue Bottle Coffee\n\n2.Philz Coffee\n  3.   Sightglass  \nRitual\n");

        assert_eq!(
            parsed,
            vec!["Blue Bottle Coffee", "Philz Coffee", "Sightglass", "Ritual"]
        );
    }

    #[test]
    fn parse_suggestions_caps_at_five() {
        let parsed = parse_suggestions("1. a\n2. b\n3. c\n4. d\n5. e\n6. f\n7. g");

        assert_eq!(parsed.len(), MAX_SUGGESTIONS);
        assert_eq!(parsed.last().map(String::as_str), Some("e"));
    }

    #[test]
    fn parse_suggestions_keeps_numbers_that_are_not_list_markers() {
        assert_eq!(parse_suggestions("7 Eleven"), vec!["7 Eleven"]);
    }

    #[tokio::test]
    async fn short_queries_skip_the_network() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", GENERATE_PATH)
            .expect(0)
            .create_async()
            .await;

        let service = service_for(&server);

        assert!(service.get_suggestions("", None).await.is_empty());
        assert!(service.get_suggestions("c", None).await.is_empty());
        assert!(service.get_suggestions("  c  ", None).await.is_empty());

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn get_suggestions_parses_reply() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", GENERATE_PATH)
            .match_header("x-goog-api-key", "key")
            .match_body(Matcher::PartialJson(json!({
                "generationConfig": { "temperature": 0.1 },
                "systemInstruction": { "parts": [{ "text": SUGGESTION_SYSTEM_INSTRUCTION }] }
            })))
            .with_header("content-type", "application/json")
            .with_body(text_reply(
                "1. Coffee shops\n2. Coffee roasters\n3. Coffee Bar\n4. Coffee Cultures\n5. Coffee Mission\n6. Coffee Extra",
            ))
            .create_async()
            .await;

        let suggestions = service_for(&server).get_suggestions("cof", None).await;

        mock.assert_async().await;
        assert_eq!(suggestions.len(), 5);
        assert_eq!(suggestions[0], "Coffee shops");
        assert!(suggestions.iter().all(|s| !s.trim().is_empty()));
    }

    #[tokio::test]
    #[traced_test]
    async fn get_suggestions_swallows_service_errors() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", GENERATE_PATH)
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let suggestions = service_for(&server).get_suggestions("coffee", None).await;

        assert!(suggestions.is_empty());
        assert!(logs_contain("Error fetching suggestions"));
    }

    #[tokio::test]
    async fn search_places_returns_placeholder_on_failure() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", GENERATE_PATH)
            .with_status(503)
            .create_async()
            .await;

        let result = service_for(&server).search_places("coffee", None).await;

        assert_eq!(
            result,
            SearchResult {
                text: SEARCH_ERROR_TEXT.to_string(),
                places: vec![],
            }
        );
    }

    #[tokio::test]
    async fn search_places_returns_placeholder_on_garbage_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", GENERATE_PATH)
            .with_header("content-type", "application/json")
            .with_body("not json")
            .create_async()
            .await;

        let result = service_for(&server).search_places("coffee", None).await;

        assert_eq!(result.text, SEARCH_ERROR_TEXT);
        assert!(result.places.is_empty());
    }

    #[tokio::test]
    async fn search_places_without_chunks_has_no_places() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", GENERATE_PATH)
            .with_header("content-type", "application/json")
            .with_body(text_reply("Nothing grounded here"))
            .create_async()
            .await;

        let result = service_for(&server).search_places("coffee", None).await;

        assert_eq!(
            result,
            SearchResult {
                text: "Nothing grounded here".to_string(),
                places: vec![],
            }
        );
    }

    #[tokio::test]
    async fn search_places_falls_back_when_text_missing() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", GENERATE_PATH)
            .with_header("content-type", "application/json")
            .with_body(json!({ "candidates": [] }).to_string())
            .create_async()
            .await;

        let result = service_for(&server).search_places("coffee", None).await;

        assert_eq!(result.text, NO_RESULTS_TEXT);
        assert!(result.places.is_empty());
    }

    #[tokio::test]
    async fn search_places_keeps_only_maps_chunks_in_order() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", GENERATE_PATH)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "candidates": [{
                        "content": { "parts": [{ "text": "Some parks" }] },
                        "groundingMetadata": { "groundingChunks": [
                            { "maps": { "uri": "https://maps/a", "title": "Alpha Park" } },
                            { "web": { "uri": "https://web/x", "title": "Web page" } },
                            { "maps": {
                                "uri": "https://maps/b",
                                "title": "Beta Park",
                                "placeAnswerSources": { "reviewSnippets": [{ "review": "Lovely lawns" }] }
                            } },
                            { "maps": { "title": "No link" } },
                            { "maps": { "uri": "https://maps/c" } }
                        ] }
                    }]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let result = service_for(&server).search_places("parks", None).await;

        let titles: Vec<&str> = result.places.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["Alpha Park", "Beta Park", UNNAMED_PLACE]);
        assert_eq!(result.places[0].snippet, None);
        assert_eq!(result.places[1].snippet.as_deref(), Some("Lovely lawns"));
        assert_eq!(result.places[2].uri, "https://maps/c");
    }

    #[tokio::test]
    async fn search_places_sends_location_hint_only_when_known() {
        let mut server = mockito::Server::new_async().await;
        let with_location = server
            .mock("POST", GENERATE_PATH)
            .match_body(Matcher::PartialJson(json!({
                "tools": [{ "googleMaps": {} }],
                "toolConfig": { "retrievalConfig": { "latLng": { "latitude": 37.77, "longitude": -122.41 } } }
            })))
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "candidates": [{
                        "content": { "parts": [{ "text": "Found 3 cafes" }] },
                        "groundingMetadata": { "groundingChunks": [
                            { "maps": { "uri": "https://maps/1", "title": "Cafe One" } },
                            { "maps": { "uri": "https://maps/2", "title": "Cafe Two" } }
                        ] }
                    }]
                })
                .to_string(),
            )
            .expect(1)
            .create_async()
            .await;

        let service = service_for(&server);
        let result = service
            .search_places("coffee near me", UserLocation::new(37.77, -122.41))
            .await;

        with_location.assert_async().await;
        assert_eq!(result.text, "Found 3 cafes");
        assert_eq!(result.places.len(), 2);

        let request = GenerateContentRequest {
            contents: vec![Content::user("q")],
            system_instruction: None,
            generation_config: None,
            tools: Some(vec![Tool {
                google_maps: GoogleMapsTool::default(),
            }]),
            tool_config: None,
        };
        let body = serde_json::to_value(&request).unwrap();
        assert!(body.get("toolConfig").is_none());
    }
}
