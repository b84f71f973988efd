//! Wallet connection and active chain
//!
//! - GET /wallet - Connection status
//! - POST /wallet/connect - Connect an account
//! - POST /wallet/disconnect - Disconnect
//! - POST /wallet/chain - Switch the active chain

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};

use crate::dto::{ChainInfo, ConnectRequest, SwitchChainRequest, WalletResponse};
use crate::routes::{error_response, ApiResult};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_wallet))
        .route("/connect", post(connect))
        .route("/disconnect", post(disconnect))
        .route("/chain", post(switch_chain))
}

async fn wallet_response(state: &AppState) -> WalletResponse {
    let account = state.chain().account().await;
    WalletResponse {
        connected: account.is_some(),
        account,
        chain: state
            .chain()
            .active_chain()
            .await
            .map(|chain| ChainInfo::new(chain, true)),
    }
}

/// GET /wallet
async fn get_wallet(State(state): State<AppState>) -> Json<WalletResponse> {
    Json(wallet_response(&state).await)
}

/// POST /wallet/connect
async fn connect(
    State(state): State<AppState>,
    request: Option<Json<ConnectRequest>>,
) -> ApiResult<WalletResponse> {
    let account = request.and_then(|Json(r)| r.account);
    state
        .chain()
        .connect(account)
        .await
        .map_err(|e| error_response(&e))?;
    Ok(Json(wallet_response(&state).await))
}

/// POST /wallet/disconnect
async fn disconnect(State(state): State<AppState>) -> Json<WalletResponse> {
    state.chain().disconnect().await;
    Json(wallet_response(&state).await)
}

/// POST /wallet/chain - Switch chain, then reload the token list for it.
///
/// The previous token and amount selection is dropped.
async fn switch_chain(
    State(state): State<AppState>,
    Json(request): Json<SwitchChainRequest>,
) -> ApiResult<WalletResponse> {
    let chain = state
        .chain()
        .switch_chain(request.chain_id)
        .await
        .map_err(|e| error_response(&e))?;

    state.chain_switched(chain).await;

    Ok(Json(wallet_response(&state).await))
}
