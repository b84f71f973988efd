//! Static chain list

use axum::{extract::State, routing::get, Json, Router};
use xlend_core::supported_chains;

use crate::dto::ChainInfo;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/chains", get(get_chains))
}

/// GET /chains - Configured chains, flagging the active one
async fn get_chains(State(state): State<AppState>) -> Json<Vec<ChainInfo>> {
    let active = state.chain().active_chain().await.map(|c| c.id());
    Json(
        supported_chains()
            .iter()
            .map(|chain| ChainInfo::new(chain, Some(chain.id()) == active))
            .collect(),
    )
}
