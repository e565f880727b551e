use std::error::Error;

use axum::{
    async_trait,
    extract::{FromRequest, Json, Query, Request},
};
use serde::de::DeserializeOwned;
use validator::Validate;

use super::app_error::AppError;

pub struct ValidatedQuery<T>(pub T);

pub struct ValidatedJson<T>(pub T);

fn rejection(kind: &str, source: Option<&(dyn Error + 'static)>, body_text: String) -> AppError {
    match source {
        Some(source) => AppError::bad_request(&format!("Invalid {}: {}", kind, source)),
        None => AppError::bad_request(&body_text),
    }
}

fn validated<T: Validate>(kind: &str, data: T) -> Result<T, AppError> {
    data.validate()
        .map_err(|e| AppError::bad_request(&format!("Invalid {}: {}", kind, e)))?;
    Ok(data)
}

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedQuery<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Query(data) = Query::<T>::from_request(req, state)
            .await
            .map_err(|e| rejection("query", e.source(), e.body_text()))?;

        validated("query", data).map(ValidatedQuery)
    }
}

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| rejection("body", e.source(), e.body_text()))?;

        validated("body", data).map(ValidatedJson)
    }
}
