//! Route handlers

pub mod filter;
pub mod health;
pub mod task;

use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use taskkit_core::Error;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

/// Map a core error onto the status code the client sees
pub fn api_error(e: Error) -> ApiError {
    let status = match &e {
        Error::Validation(_) | Error::IndexOutOfRange { .. } | Error::InvalidFilter(_) => {
            StatusCode::BAD_REQUEST
        }
        Error::TaskNotFound(_) => StatusCode::NOT_FOUND,
        Error::DuplicateTask(_) => StatusCode::CONFLICT,
        Error::Io(_) | Error::Serialization(_) | Error::Storage(_) => {
            tracing::error!("Request failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    (
        status,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
}

/// JSON body extractor whose rejections use the `{error}` shape with a 400
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                tracing::debug!("Rejected request body: {}", rejection.body_text());
                Err((
                    StatusCode::BAD_REQUEST,
                    Json(ErrorResponse {
                        error: rejection.body_text(),
                    }),
                ))
            }
        }
    }
}
