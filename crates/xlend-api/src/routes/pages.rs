//! Action pages
//!
//! One resource per lending action:
//! - GET /{action} - Page model
//! - POST /{action}/approve - ERC-20 approval (lend, repay)
//! - POST /{action}/submit - Run the action, relaying any emitted message

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use lending::{FlowReport, Selection};
use xlend_core::{Error, FlowError, LendingAction};

use crate::dto::{ApiError, ApproveResponse, ChainInfo, PageModel};
use crate::routes::{error_response, ApiResult};
use crate::state::Button;
use crate::AppState;

pub fn router() -> Router<AppState> {
    let mut router = Router::new();
    for action in LendingAction::ALL {
        let base = format!("/{}", action.as_str());
        router = router
            .route(
                &base,
                get(move |State(state): State<AppState>| page_model(state, action)),
            )
            .route(
                &format!("{}/submit", base),
                post(move |State(state): State<AppState>| submit(state, action)),
            );
        if action.requires_approval() {
            router = router.route(
                &format!("{}/approve", base),
                post(move |State(state): State<AppState>| approve(state, action)),
            );
        }
    }
    router
}

async fn page_model(state: AppState, action: LendingAction) -> Json<PageModel> {
    let selection = state.selection().await;
    Json(PageModel {
        action,
        title: action.label().to_string(),
        chain: state
            .chain()
            .active_chain()
            .await
            .map(|chain| ChainInfo::new(chain, true)),
        account: state.chain().account().await,
        show_approve: selection.shows_approve(action),
        approve_loading: state.is_busy(action, Button::Approve),
        submit_loading: state.is_busy(action, Button::Submit),
        selection,
    })
}

async fn validated(state: &AppState) -> Result<(Selection, lending::ActionInput), Error> {
    let selection = state.selection().await;
    let input = lending::validate(
        state.chain().account().await,
        &selection,
        state.chain().active_chain().await,
    )?;
    Ok((selection, input))
}

/// POST /{action}/approve
async fn approve(state: AppState, action: LendingAction) -> ApiResult<ApproveResponse> {
    let _busy = state
        .begin(action, Button::Approve)
        .map_err(|e| error_response(&e.into()))?;

    let (_, input) = validated(&state).await.map_err(|e| error_response(&e))?;
    let tx_hash = lending::approve(state.chain(), &input)
        .await
        .map_err(|e| error_response(&e))?;

    // Only flag the token that was approved; the selection may have moved on
    let selection = state
        .update_selection(|s| {
            if s.token.as_ref().map(|t| t.address) == Some(input.token.address) {
                s.mark_approved();
            }
        })
        .await;

    Ok(Json(ApproveResponse {
        tx_hash,
        approved: selection.approved,
    }))
}

/// POST /{action}/submit
async fn submit(state: AppState, action: LendingAction) -> ApiResult<FlowReport> {
    let _busy = state
        .begin(action, Button::Submit)
        .map_err(|e| error_response(&e.into()))?;

    let (selection, input) = validated(&state).await.map_err(|e| error_response(&e))?;

    // Checked before the messaging client is created
    if action.requires_approval() && !selection.approved && !selection.has_native_token() {
        return Err(error_response(&FlowError::NotApproved.into()));
    }

    let source = input.chain;
    let proofs = state.proofs().await;
    let outcome =
        lending::submit_action(state.chain(), proofs.as_ref(), action, input, selection.approved)
            .await;

    // A relay leaves the wallet on the destination chain
    if let Some(active) = state.chain().active_chain().await {
        if active.id() != source.id() {
            state.chain_switched(active).await;
        }
    }

    match outcome {
        Ok(report) => {
            tracing::info!(
                flow_id = %report.flow_id,
                action = %action,
                relayed = report.is_relayed(),
                "Flow completed"
            );
            Ok(Json(report))
        }
        Err(failure) => {
            let (status, Json(mut body)): (StatusCode, Json<ApiError>) =
                error_response(&failure.error);
            body.flow = failure.report.map(|r| *r);
            Err((status, Json(body)))
        }
    }
}
