use axum::{
    routing::{get, post, put},
    Router,
};

use crate::{
    types::{app_state::AppState, user_location::UserLocation},
    utils::app_error::AppError,
};

mod get_search;
mod get_suggestions;
mod session;

pub fn apply_routes(app: Router<AppState>) -> Router<AppState> {
    app.route("/suggestions", get(get_suggestions::get_suggestions))
        .route("/search", get(get_search::get_search))
        .route("/session", get(session::get_session))
        .route("/session/query", put(session::put_session_query))
        .route("/session/submit", post(session::post_session_submit))
        .route(
            "/session/suggestions/:index",
            post(session::post_session_suggestion),
        )
        .route("/session/dismiss", post(session::post_session_dismiss))
}

/// `lat` and `lon` must come together and be in range.
pub(crate) fn location_from_query(
    lat: Option<f64>,
    lon: Option<f64>,
) -> Result<Option<UserLocation>, AppError> {
    match (lat, lon) {
        (None, None) => Ok(None),
        (Some(lat), Some(lon)) => UserLocation::new(lat, lon)
            .map(Some)
            .ok_or_else(|| AppError::bad_request("Invalid query: coordinates out of range")),
        _ => Err(AppError::bad_request(
            "Invalid query: lat and lon must be given together",
        )),
    }
}
