//! Contract reads: router fee and supported token metadata

use alloy_primitives::{Address, U256};
use alloy_sol_types::SolCall;
use evm_tx::abi::{decimalsCall, getFeeCall, getSupportedAssetsCall, nameCall, symbolCall};
use evm_tx::{
    decode_return, fee_quote_call, supported_assets_call, token_decimals_call, token_name_call,
    token_symbol_call, CallRequest,
};
use futures::future::try_join_all;
use xlend_core::{is_native_token, Chain, Result, Token};

use crate::ports::ChainAdapter;

async fn read<F, C>(adapter: &C, request: CallRequest) -> Result<F::Return>
where
    F: SolCall,
    C: ChainAdapter + ?Sized,
{
    let output = adapter.call(&request).await?;
    Ok(decode_return::<F>(&output)?)
}

/// Router fee for a message sent by the chain's lending contract
pub async fn fetch_router_fee<C>(adapter: &C, chain: &Chain) -> Result<U256>
where
    C: ChainAdapter + ?Sized,
{
    let fee = read::<getFeeCall, _>(adapter, fee_quote_call(chain)).await?;
    tracing::debug!(chain_id = chain.id(), %fee, "Router fee");
    Ok(fee)
}

/// Metadata for one token. The native-token sentinel resolves from the
/// chain definition; anything else takes three concurrent reads.
pub async fn fetch_token<C>(adapter: &C, chain: &Chain, address: Address) -> Result<Token>
where
    C: ChainAdapter + ?Sized,
{
    if is_native_token(&address) {
        return Ok(chain.native_token());
    }

    let chain_id = chain.id();
    let (name, symbol, decimals) = futures::try_join!(
        read::<nameCall, _>(adapter, token_name_call(chain_id, address)),
        read::<symbolCall, _>(adapter, token_symbol_call(chain_id, address)),
        read::<decimalsCall, _>(adapter, token_decimals_call(chain_id, address)),
    )?;

    Ok(Token {
        name,
        symbol,
        decimals,
        address,
    })
}

/// Tokens the lending contract supports on a chain, in contract order
pub async fn fetch_supported_tokens<C>(adapter: &C, chain: &Chain) -> Result<Vec<Token>>
where
    C: ChainAdapter + ?Sized,
{
    let assets = read::<getSupportedAssetsCall, _>(adapter, supported_assets_call(chain)).await?;
    tracing::debug!(chain_id = chain.id(), count = assets.len(), "Supported assets");

    try_join_all(
        assets
            .into_iter()
            .map(|address| fetch_token(adapter, chain, address)),
    )
    .await
}
