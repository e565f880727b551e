use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::location_from_query;
use crate::{
    types::{app_state::AppState, place::SearchResult},
    utils::{app_error::AppError, validated::ValidatedQuery},
};

#[derive(Validate, Deserialize)]
pub struct GetSearchPayload {
    #[validate(length(min = 1, message = "Must be at least 1 character"))]
    pub query: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

#[derive(Serialize, Deserialize)]
pub struct GetSearchResponse {
    pub data: SearchResult,
}

pub async fn get_search(
    State(state): State<AppState>,
    ValidatedQuery(GetSearchPayload { query, lat, lon }): ValidatedQuery<GetSearchPayload>,
) -> Result<Response, AppError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(AppError::bad_request("Invalid query: query must not be blank"));
    }

    let location = location_from_query(lat, lon)?;
    let result = state.places_ai.search_places(query, location).await;

    Ok((StatusCode::OK, Json(GetSearchResponse { data: result })).into_response())
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::Request,
    };
    use mockito::Matcher;
    use serde_json::json;
    use tower::ServiceExt;

    use super::*;
    use crate::app::gen_mock_app;

    #[tokio::test]
    async fn test_search_with_location() {
        let mut mock_app = gen_mock_app().await;

        let mock_server = mock_app
            .gemini_server
            .mock("POST", Matcher::Regex(":generateContent$".to_string()))
            .match_body(Matcher::PartialJson(json!({
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
            .create_async()
            .await;

        let response = mock_app
            .app
            .oneshot(
                Request::builder()
                    .uri("/search?query=coffee%20near%20me&lat=37.77&lon=-122.41")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        mock_server.assert_async().await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: GetSearchResponse = serde_json::from_slice(&body).unwrap();

        assert_eq!(body.data.text, "Found 3 cafes");
        assert_eq!(body.data.places.len(), 2);
        assert_eq!(body.data.places[1].title, "Cafe Two");
    }

    #[tokio::test]
    async fn blank_query_is_rejected() {
        let mock_app = gen_mock_app().await;

        let response = mock_app
            .app
            .oneshot(
                Request::builder()
                    .uri("/search?query=%20%20")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn half_a_location_is_rejected() {
        let mock_app = gen_mock_app().await;

        let response = mock_app
            .app
            .oneshot(
                Request::builder()
                    .uri("/search?query=coffee&lat=37.77")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
