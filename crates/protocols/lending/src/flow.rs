//! Lending flows
//!
//! Every action follows the same sequence: quote the router fee, submit the
//! lending contract call, wait for confirmation. When the receipt carries a
//! `MessageSendRequested` event the message is relayed: block timestamp,
//! proof, switch to the destination chain, deliver, confirm. Borrow must
//! produce a message; the other actions relay only when one is present.
//!
//! Steps run strictly in order with no retry. A failure after submission
//! returns the partial [`FlowReport`] so the source transaction can be
//! followed up by hand.

use alloy_primitives::Address;
use evm_tx::{approve_tx, deliver_tx, find_sent_message, lending_action_tx, scale_amount, SentMessage, UnitsError};
use tracing::Instrument;
use xlend_core::{
    chain_by_selector, is_native_token, Chain, Error, FlowError, LendingAction, Result, TxHash,
};

use crate::fetch::fetch_router_fee;
use crate::ports::{ChainAdapter, ProofProvider};
use crate::state::{ActionInput, FlowReport, FlowStep, Selection};

/// A flow that failed, with whatever it completed before failing
#[derive(Debug, thiserror::Error)]
#[error("{error}")]
pub struct FlowFailure {
    #[source]
    pub error: Error,
    pub report: Option<Box<FlowReport>>,
}

impl From<Error> for FlowFailure {
    fn from(error: Error) -> Self {
        Self {
            error,
            report: None,
        }
    }
}

impl From<FlowError> for FlowFailure {
    fn from(error: FlowError) -> Self {
        Error::from(error).into()
    }
}

/// Check preconditions in order: account, token, amount, active chain.
///
/// Pure: nothing here touches the network.
pub fn validate(
    account: Option<Address>,
    selection: &Selection,
    active_chain: Option<&'static Chain>,
) -> Result<ActionInput> {
    let account = account.ok_or(FlowError::NoAccount)?;
    let token = selection.token.clone().ok_or(FlowError::NoTokenSelected)?;
    let raw_amount = selection.amount.as_deref().ok_or(FlowError::NoAmountSelected)?;
    let amount = match scale_amount(raw_amount, token.decimals) {
        Ok(amount) if amount.is_zero() => return Err(FlowError::NoAmountSelected.into()),
        Ok(amount) => amount,
        Err(UnitsError::Empty) => return Err(FlowError::NoAmountSelected.into()),
        Err(e) => {
            return Err(FlowError::InvalidAmount {
                message: e.to_string(),
            }
            .into())
        }
    };
    let chain = active_chain.ok_or(FlowError::NoActiveChain)?;

    Ok(ActionInput {
        account,
        chain,
        token,
        amount,
    })
}

/// Approve the lending contract to spend the selected token.
///
/// Only meaningful for ERC-20 tokens. Succeeds only on a successful receipt.
pub async fn approve<C>(adapter: &C, input: &ActionInput) -> Result<TxHash>
where
    C: ChainAdapter + ?Sized,
{
    if is_native_token(&input.token.address) {
        return Err(FlowError::ApprovalNotRequired.into());
    }

    let tx = approve_tx(input.chain, input.account, input.token.address, input.amount);
    let tx_hash = adapter.send_transaction(&tx).await?;
    let receipt = adapter.wait_for_receipt(input.chain.id(), tx_hash).await?;
    if !receipt.is_success() {
        tracing::warn!(tx_hash = %tx_hash, token = %input.token.address, "Approval reverted");
        return Err(FlowError::ApproveFailed.into());
    }

    tracing::info!(
        chain_id = input.chain.id(),
        tx_hash = %tx_hash,
        token = %input.token.symbol,
        amount = %input.amount,
        "Approval confirmed"
    );
    Ok(tx_hash)
}

/// Run a lending action end to end.
///
/// `approved` is the session approval flag; actions that spend an ERC-20
/// token refuse to run without it.
pub async fn submit_action<C, P>(
    adapter: &C,
    proofs: &P,
    action: LendingAction,
    input: ActionInput,
    approved: bool,
) -> std::result::Result<FlowReport, FlowFailure>
where
    C: ChainAdapter + ?Sized,
    P: ProofProvider + ?Sized,
{
    if action.requires_approval() && !is_native_token(&input.token.address) && !approved {
        return Err(FlowError::NotApproved.into());
    }

    let mut report = FlowReport::new(action, &input);
    let span = tracing::info_span!(
        "flow",
        flow_id = %report.flow_id,
        action = %action,
        chain_id = input.chain.id()
    );

    let outcome = run_action(adapter, proofs, action, &input, &mut report)
        .instrument(span)
        .await;

    match outcome {
        Ok(()) => Ok(report),
        Err(error) => {
            tracing::error!(
                flow_id = %report.flow_id,
                action = %action,
                steps = ?report.steps,
                error = %error,
                "Flow failed"
            );
            report.error = Some(error.to_string());
            Err(FlowFailure {
                error,
                report: Some(Box::new(report)),
            })
        }
    }
}

async fn run_action<C, P>(
    adapter: &C,
    proofs: &P,
    action: LendingAction,
    input: &ActionInput,
    report: &mut FlowReport,
) -> Result<()>
where
    C: ChainAdapter + ?Sized,
    P: ProofProvider + ?Sized,
{
    let chain = input.chain;

    // 1. Router fee
    let fee = fetch_router_fee(adapter, chain).await?;
    report.fee = Some(fee);
    report.steps.push(FlowStep::FeeQuoted);

    // 2. Lending contract call
    let tx = lending_action_tx(chain, input.account, action, input.token.address, input.amount, fee);
    report.value = Some(tx.value);
    let tx_hash = adapter.send_transaction(&tx).await?;
    report.tx_hash = Some(tx_hash);
    report.steps.push(FlowStep::Submitted);
    tracing::info!(tx_hash = %tx_hash, value = %tx.value, "Action submitted");

    // 3. Confirmation
    let receipt = adapter.wait_for_receipt(chain.id(), tx_hash).await?;
    if !receipt.is_success() {
        return Err(FlowError::TransactionFailed {
            tx_hash: Some(tx_hash.to_string()),
        }
        .into());
    }
    report.steps.push(FlowStep::Confirmed);

    // 4. Emitted message
    let sent = match find_sent_message(&receipt) {
        Some(sent) => sent,
        None if action.requires_relay() => {
            return Err(FlowError::MissingMessageEvent {
                tx_hash: tx_hash.to_string(),
            }
            .into())
        }
        None => {
            tracing::info!(tx_hash = %tx_hash, "Action confirmed, no message to relay");
            return Ok(());
        }
    };
    report.steps.push(FlowStep::MessageParsed);

    relay(adapter, proofs, chain, receipt.block_number(), &sent, report).await
}

/// Steps 5 to 9: prove the message and deliver it on its destination chain
async fn relay<C, P>(
    adapter: &C,
    proofs: &P,
    source: &Chain,
    block_number: u64,
    sent: &SentMessage,
    report: &mut FlowReport,
) -> Result<()>
where
    C: ChainAdapter + ?Sized,
    P: ProofProvider + ?Sized,
{
    let message_hash = sent.message.hash();
    report.message_hash = Some(message_hash);

    let selector = sent
        .message
        .destination_selector()
        .ok_or(FlowError::NoChainFound)?;
    let destination = chain_by_selector(selector).ok_or(FlowError::UnknownDestination { selector })?;
    report.destination_chain_id = Some(destination.id());

    // 5. Source block timestamp
    let block = adapter.block_by_number(source.id(), block_number).await?;
    report.steps.push(FlowStep::TimestampFetched);

    // 6. Proof
    let proof = proofs
        .request_proof(selector, block.timestamp_millis(), message_hash)
        .await?;
    report.steps.push(FlowStep::ProofReceived);
    tracing::info!(
        message_hash = %message_hash,
        destination = %destination,
        proof_len = proof.len(),
        "Proof received"
    );

    // Delivery is sent from whichever account is connected now
    let account = adapter.account().await.ok_or(FlowError::NoWalletAccount)?;

    // 7-9. Switch, deliver, confirm. Any failure here is a failed delivery.
    let delivery = async {
        adapter.switch_chain(destination.id()).await?;
        report.steps.push(FlowStep::ChainSwitched);

        let tx = deliver_tx(destination, account, sent, proof);
        let tx_hash = adapter.send_transaction(&tx).await?;
        report.delivery_tx_hash = Some(tx_hash);

        let receipt = adapter.wait_for_receipt(destination.id(), tx_hash).await?;
        if !receipt.is_success() {
            return Err(Error::from(FlowError::TransactionFailed {
                tx_hash: Some(tx_hash.to_string()),
            }));
        }
        report.steps.push(FlowStep::Delivered);
        Ok::<TxHash, Error>(tx_hash)
    };
    let outcome = delivery.await;

    match outcome {
        Ok(tx_hash) => {
            tracing::info!(tx_hash = %tx_hash, destination = %destination, "Message delivered");
            Ok(())
        }
        Err(Error::Flow(e @ FlowError::TransactionFailed { .. })) => Err(e.into()),
        Err(e) => {
            tracing::error!(error = %e, destination = %destination, "Delivery failed");
            Err(FlowError::TransactionFailed {
                tx_hash: report.delivery_tx_hash.map(|h| h.to_string()),
            }
            .into())
        }
    }
}

/// Scale and validate, then run; the common path for the API
pub async fn validate_and_submit<C, P>(
    adapter: &C,
    proofs: &P,
    action: LendingAction,
    selection: &Selection,
) -> std::result::Result<FlowReport, FlowFailure>
where
    C: ChainAdapter + ?Sized,
    P: ProofProvider + ?Sized,
{
    let input = validate(adapter.account().await, selection, adapter.active_chain().await)?;
    submit_action(adapter, proofs, action, input, selection.approved).await
}
