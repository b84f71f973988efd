//! Token and amount selection shared by all pages

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use lending::Selection;
use xlend_core::FlowError;

use crate::dto::{SelectTokenRequest, SetAmountRequest};
use crate::routes::tokens::active_chain;
use crate::routes::{error_response, ApiResult};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_selection))
        .route("/token", post(select_token))
        .route("/amount", post(set_amount))
}

/// GET /selection
async fn get_selection(State(state): State<AppState>) -> Json<Selection> {
    Json(state.selection().await)
}

/// POST /selection/token - Select one of the active chain's tokens
async fn select_token(
    State(state): State<AppState>,
    Json(request): Json<SelectTokenRequest>,
) -> ApiResult<Selection> {
    let chain = active_chain(&state).await.map_err(|e| error_response(&e))?;
    let tokens = state.tokens(chain).await.map_err(|e| error_response(&e))?;

    let token = tokens
        .into_iter()
        .find(|t| t.address == request.address)
        .ok_or_else(|| {
            error_response(
                &FlowError::UnknownToken {
                    address: request.address.to_string(),
                }
                .into(),
            )
        })?;

    tracing::debug!(token = %token, "Token selected");
    Ok(Json(state.update_selection(|s| s.select_token(token)).await))
}

/// POST /selection/amount - Amount as typed; validated on submit
async fn set_amount(
    State(state): State<AppState>,
    Json(request): Json<SetAmountRequest>,
) -> Json<Selection> {
    Json(state.update_selection(|s| s.set_amount(request.amount)).await)
}
