use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    session::{
        results_view::ResultsView,
        search_input::{PointerTarget, SearchInputSnapshot},
    },
    types::{app_state::AppState, user_location::UserLocation},
    utils::{app_error::AppError, validated::ValidatedJson},
};

#[derive(Validate, Deserialize)]
pub struct PutSessionQueryPayload {
    pub text: String,
}

#[derive(Serialize, Deserialize)]
pub struct SessionResponseData {
    pub input: SearchInputSnapshot,
    pub loading: bool,
    pub location: Option<UserLocation>,
    pub view: ResultsView,
}

#[derive(Serialize, Deserialize)]
pub struct SessionResponse {
    pub data: SessionResponseData,
}

async fn session_response(state: &AppState) -> Response {
    let loading = state.coordinator.is_loading();

    (
        StatusCode::OK,
        Json(SessionResponse {
            data: SessionResponseData {
                input: state.search_input.snapshot(loading).await,
                loading,
                location: state.coordinator.location(),
                view: state.coordinator.view().await,
            },
        }),
    )
        .into_response()
}

pub async fn get_session(State(state): State<AppState>) -> Result<Response, AppError> {
    Ok(session_response(&state).await)
}

pub async fn put_session_query(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<PutSessionQueryPayload>,
) -> Result<Response, AppError> {
    state
        .search_input
        .type_text(&payload.text, state.coordinator.location())
        .await;

    Ok(session_response(&state).await)
}

pub async fn post_session_submit(State(state): State<AppState>) -> Result<Response, AppError> {
    if let Some(query) = state
        .search_input
        .submit(state.coordinator.is_loading())
        .await
    {
        state.coordinator.search(&query).await;
    }

    Ok(session_response(&state).await)
}

pub async fn post_session_suggestion(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> Result<Response, AppError> {
    let selected = state
        .search_input
        .select_suggestion(index)
        .await
        .ok_or_else(|| AppError::not_found("No such suggestion"))?;

    state.coordinator.search(&selected).await;

    Ok(session_response(&state).await)
}

pub async fn post_session_dismiss(State(state): State<AppState>) -> Result<Response, AppError> {
    state.search_input.pointer_down(PointerTarget::Outside).await;

    Ok(session_response(&state).await)
}
