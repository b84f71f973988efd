//! Supported tokens of the active chain

use axum::{extract::State, routing::get, Json, Router};
use xlend_core::{Chain, Error, FlowError};

use crate::dto::{TokenInfo, TokensResponse};
use crate::routes::{error_response, ApiResult};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/tokens", get(get_tokens))
}

pub(crate) async fn active_chain(state: &AppState) -> Result<&'static Chain, Error> {
    state
        .chain()
        .active_chain()
        .await
        .ok_or_else(|| FlowError::NoActiveChain.into())
}

/// GET /tokens - Tokens the lending contract supports on the active chain
async fn get_tokens(State(state): State<AppState>) -> ApiResult<TokensResponse> {
    let chain = active_chain(&state).await.map_err(|e| error_response(&e))?;
    let tokens = state.tokens(chain).await.map_err(|e| error_response(&e))?;

    Ok(Json(TokensResponse {
        chain_id: chain.id(),
        tokens: tokens.iter().map(TokenInfo::from).collect(),
    }))
}
