//! API route handlers

pub mod chains;
pub mod health;
pub mod pages;
pub mod selection;
pub mod tokens;
pub mod wallet;

use axum::{http::StatusCode, response::Redirect, routing::get, Json, Router};
use xlend_core::Error;

use crate::dto::ApiError;
use crate::AppState;

pub(crate) type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

/// Create the API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health::health_check))
        .merge(chains::router())
        .nest("/wallet", wallet::router())
        .merge(tokens::router())
        .nest("/selection", selection::router())
        .merge(pages::router())
        .with_state(state)
}

/// GET / - The lend page is the landing page
async fn root() -> Redirect {
    Redirect::temporary("/lend")
}

/// Convert a core error to an API error response
pub(crate) fn error_response(error: &Error) -> (StatusCode, Json<ApiError>) {
    let status =
        StatusCode::from_u16(error.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        tracing::error!(code = error.error_code(), error = %error, "Request failed");
    } else {
        tracing::warn!(code = error.error_code(), error = %error, "Request rejected");
    }
    (status, Json(ApiError::from(error)))
}
