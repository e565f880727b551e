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
    types::app_state::AppState,
    utils::{app_error::AppError, validated::ValidatedQuery},
};

#[derive(Validate, Deserialize)]
pub struct GetSuggestionsPayload {
    pub query: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

#[derive(Serialize, Deserialize)]
pub struct GetSuggestionsResponseData {
    pub suggestions: Vec<String>,
}

#[derive(Serialize, Deserialize)]
pub struct GetSuggestionsResponse {
    pub data: GetSuggestionsResponseData,
}

pub async fn get_suggestions(
    State(state): State<AppState>,
    ValidatedQuery(GetSuggestionsPayload { query, lat, lon }): ValidatedQuery<
        GetSuggestionsPayload,
    >,
) -> Result<Response, AppError> {
    let location = location_from_query(lat, lon)?;
    let suggestions = state.places_ai.get_suggestions(&query, location).await;

    Ok((
        StatusCode::OK,
        Json(GetSuggestionsResponse {
            data: GetSuggestionsResponseData { suggestions },
        }),
    )
        .into_response())
}
