//! Application state shared across API handlers

use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, Mutex};

use equito_client::EquitoClient;
use evm_client::EvmClient;
use lending::{fetch_supported_tokens, ChainAdapter, ProofProvider, Selection};
use serde::Serialize;
use tokio::sync::RwLock;
use xlend_core::{AppConfig, Chain, ChainId, FlowError, LendingAction, Result, Token};

/// Page button with its own loading flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Button {
    Approve,
    Submit,
}

impl fmt::Display for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Approve => write!(f, "approve"),
            Self::Submit => write!(f, "submit"),
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    chain: Arc<dyn ChainAdapter>,
    proofs: RwLock<Option<Arc<dyn ProofProvider>>>,
    selection: RwLock<Selection>,
    /// Supported tokens of the chain they were fetched for
    tokens: RwLock<Option<(ChainId, Vec<Token>)>>,
    busy: Mutex<HashSet<(LendingAction, Button)>>,
}

impl AppState {
    /// State backed by the network clients. The messaging client is created
    /// on first use.
    pub fn new(config: AppConfig) -> Self {
        let chain = Arc::new(EvmClient::new(&config.rpc, config.receipt));
        Self::with_ports(config, chain, None)
    }

    /// State over arbitrary ports
    pub fn with_ports(
        config: AppConfig,
        chain: Arc<dyn ChainAdapter>,
        proofs: Option<Arc<dyn ProofProvider>>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                chain,
                proofs: RwLock::new(proofs),
                selection: RwLock::new(Selection::default()),
                tokens: RwLock::new(None),
                busy: Mutex::new(HashSet::new()),
            }),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    /// Wallet/chain port
    pub fn chain(&self) -> &dyn ChainAdapter {
        self.inner.chain.as_ref()
    }

    /// Get or create the messaging client
    pub async fn proofs(&self) -> Arc<dyn ProofProvider> {
        {
            let proofs = self.inner.proofs.read().await;
            if let Some(ref p) = *proofs {
                return p.clone();
            }
        }

        let mut proofs = self.inner.proofs.write().await;

        // Double-check after acquiring write lock
        if let Some(ref p) = *proofs {
            return p.clone();
        }

        let messaging = &self.inner.config.messaging;
        tracing::info!(
            primary = %messaging.ws_endpoint,
            archive = %messaging.archive_ws_endpoint,
            "Creating Equito client"
        );
        let client: Arc<dyn ProofProvider> = Arc::new(EquitoClient::new(messaging));
        *proofs = Some(client.clone());
        client
    }

    // =========================================================================
    // Selection
    // =========================================================================

    pub async fn selection(&self) -> Selection {
        self.inner.selection.read().await.clone()
    }

    /// Apply a change to the selection and return the result
    pub async fn update_selection<F>(&self, f: F) -> Selection
    where
        F: FnOnce(&mut Selection),
    {
        let mut selection = self.inner.selection.write().await;
        f(&mut selection);
        selection.clone()
    }

    /// Forget the selection and token list after a chain switch
    pub async fn reset_for_chain(&self) {
        self.inner.selection.write().await.clear();
        *self.inner.tokens.write().await = None;
    }

    /// Reset for a newly active chain and load its token list. A failed
    /// fetch is retried on the next token request.
    pub async fn chain_switched(&self, chain: &'static Chain) {
        self.reset_for_chain().await;
        if let Err(e) = self.tokens(chain).await {
            tracing::warn!(chain = %chain, error = %e, "Failed to prefetch tokens");
        }
    }

    // =========================================================================
    // Tokens
    // =========================================================================

    /// Supported tokens for a chain, fetched once per chain
    pub async fn tokens(&self, chain: &'static Chain) -> Result<Vec<Token>> {
        {
            let cache = self.inner.tokens.read().await;
            if let Some((chain_id, tokens)) = cache.as_ref() {
                if *chain_id == chain.id() {
                    return Ok(tokens.clone());
                }
            }
        }

        let tokens = fetch_supported_tokens(self.chain(), chain).await?;
        tracing::info!(chain = %chain, count = tokens.len(), "Fetched supported tokens");
        *self.inner.tokens.write().await = Some((chain.id(), tokens.clone()));
        Ok(tokens)
    }

    // =========================================================================
    // Loading flags
    // =========================================================================

    /// Mark a button as loading. Fails while that button's previous request
    /// is still running; the flag clears when the guard drops.
    pub fn begin(&self, action: LendingAction, button: Button) -> std::result::Result<BusyGuard, FlowError> {
        let mut busy = self.inner.busy.lock().unwrap_or_else(|e| e.into_inner());
        if !busy.insert((action, button)) {
            return Err(FlowError::InProgress {
                action: format!("{} {}", action.label(), button),
            });
        }
        Ok(BusyGuard {
            state: self.clone(),
            key: (action, button),
        })
    }

    pub fn is_busy(&self, action: LendingAction, button: Button) -> bool {
        self.inner
            .busy
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(&(action, button))
    }
}

/// Clears a loading flag on drop
pub struct BusyGuard {
    state: AppState,
    key: (LendingAction, Button),
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.state
            .inner
            .busy
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_busy_flag_per_button() {
        let state = AppState::new(AppConfig::default());

        let guard = state.begin(LendingAction::Lend, Button::Submit).unwrap();
        assert!(state.is_busy(LendingAction::Lend, Button::Submit));

        // Same button rejects re-entry, others are independent
        let err = state.begin(LendingAction::Lend, Button::Submit).err().unwrap();
        assert_eq!(err.to_string(), "Lend submit is already in progress");
        assert!(state.begin(LendingAction::Lend, Button::Approve).is_ok());
        assert!(state.begin(LendingAction::Borrow, Button::Submit).is_ok());

        drop(guard);
        assert!(!state.is_busy(LendingAction::Lend, Button::Submit));
        assert!(state.begin(LendingAction::Lend, Button::Submit).is_ok());
    }
}
