use std::fmt;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::{error, info};

use crate::{
    config::NodeConfig,
    core::{
        notification::{Notifier, Severity},
        store::DappStore,
        util::AsyncHttpClient,
    },
    node::NodeClient,
    utils::truncate_with_ellipsis,
};

/// Number of address characters kept on screen.
pub const ADDRESS_DISPLAY_LEN: usize = 10;

pub const WALLET_LOCKED: &str = "Wallet is Locked";
pub const WALLET_LOCKED_MESSAGE: &str =
    "Your wallet is locked. Please unlock it to interact with the dapp.";
pub const WALLET_NOT_INSTALLED: &str = "Wallet not installed";
pub const WALLET_NOT_INSTALLED_MESSAGE: &str =
    "You don't have the Xian Wallet extension installed. Please install it to interact with the dapp.";
pub const TRANSACTION_SUCCEEDED_MESSAGE: &str = "Transaction succeeded";

/// Wallet state reported by the extension on connect and on status changes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WalletInfo {
    pub address: String,
    #[serde(default)]
    pub locked: bool,
}

/// The `errors` field of a rejected transaction, rendered the way the wallet's host runtime
/// stringifies it: strings verbatim, arrays joined with `,`, anything else as JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionErrors(pub Value);

impl fmt::Display for TransactionErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_loose(&self.0, f)
    }
}

fn write_loose(value: &Value, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match value {
        Value::Null => Ok(()),
        Value::String(s) => f.write_str(s),
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    f.write_str(",")?;
                }
                write_loose(item, f)?;
            }
            Ok(())
        }
        other => write!(f, "{other}"),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Result of a transaction submission that reached the node.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub enum TransactionResult {
    /// The response carried an `errors` field.
    Rejected(TransactionErrors),
    /// Opaque success payload.
    Accepted(Value),
}

impl From<Value> for TransactionResult {
    fn from(value: Value) -> Self {
        match value.get("errors") {
            Some(errors) if is_truthy(errors) => Self::Rejected(TransactionErrors(errors.clone())),
            _ => Self::Accepted(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TransactionOutcome {
    Rejected(TransactionErrors),
    /// The counter value read by the refresh that followed the transaction.
    Accepted { counter: i64 },
}

/// Everything the wallet integration can report, for hosts that forward events through one
/// channel.
#[derive(Debug, Clone, PartialEq)]
pub enum DappEvent {
    WalletInfo(WalletInfo),
    WalletError(Value),
    Transaction(TransactionResult),
    TransactionError(String),
}

/// Reactions to wallet and transaction events.
///
/// Implementors provide the UI state, the notifier and the node client; every handler is a
/// provided method.
#[async_trait]
pub trait Dapp: Sync {
    type HttpClient: AsyncHttpClient + Send + Sync;
    type Notifier: Notifier + Sync;

    fn store(&self) -> &DappStore;
    fn notifier(&self) -> &Self::Notifier;
    fn node(&self) -> &NodeClient<Self::HttpClient>;

    fn handle_wallet_info(&self, info: &WalletInfo) {
        let address = &self.store().wallet_address;
        address.set(truncate_with_ellipsis(&info.address, ADDRESS_DISPLAY_LEN));
        if info.locked {
            address.set(WALLET_LOCKED.to_owned());
            self.notifier().show(WALLET_LOCKED_MESSAGE, Severity::Warning);
        }
    }

    /// Every wallet error is reported as a missing extension; the error itself is not inspected.
    fn handle_wallet_error<E: ?Sized>(&self, _error: &E) {
        self.notifier().show(WALLET_NOT_INSTALLED_MESSAGE, Severity::Danger);
        self.store()
            .wallet_address
            .set(WALLET_NOT_INSTALLED.to_owned());
    }

    /// Report a transaction result and, when accepted, refresh the counter once.
    ///
    /// The success toast is raised before the refresh, so a refresh failure is only visible in
    /// the returned error.
    async fn handle_transaction(&self, response: TransactionResult) -> Result<TransactionOutcome> {
        let payload = match response {
            TransactionResult::Rejected(errors) => {
                error!(%errors, "transaction failed");
                self.notifier()
                    .show(format!("Transaction failed: {errors}"), Severity::Danger);
                return Ok(TransactionOutcome::Rejected(errors));
            }
            TransactionResult::Accepted(payload) => payload,
        };

        info!(%payload, "transaction succeeded");
        self.notifier().show(TRANSACTION_SUCCEEDED_MESSAGE, Severity::Success);

        let counter = self
            .node()
            .refresh_counter(&self.store().counter)
            .await
            .context("unable to refresh counter after transaction")?;

        Ok(TransactionOutcome::Accepted { counter })
    }

    /// Report a transaction that could not be submitted.
    fn handle_transaction_error<E: fmt::Display + ?Sized>(&self, error: &E) {
        error!(%error, "transaction error");
        self.notifier()
            .show(format!("Transaction error: {error}"), Severity::Danger);
    }

    async fn handle_event(&self, event: DappEvent) -> Result<()> {
        match event {
            DappEvent::WalletInfo(info) => self.handle_wallet_info(&info),
            DappEvent::WalletError(error) => self.handle_wallet_error(&error),
            DappEvent::Transaction(response) => {
                self.handle_transaction(response).await?;
            }
            DappEvent::TransactionError(error) => self.handle_transaction_error(error.as_str()),
        }
        Ok(())
    }
}

/// The counter dapp: one store, one notifier, one node.
#[derive(Debug)]
pub struct CounterDapp<C, N> {
    store: DappStore,
    notifier: N,
    node: NodeClient<C>,
}

impl<C, N> CounterDapp<C, N>
where
    C: AsyncHttpClient + Send + Sync,
    N: Notifier + Sync,
{
    pub fn new(config: NodeConfig, http_client: C, notifier: N) -> Self {
        Self::with_store(DappStore::new(), NodeClient::new(config, http_client), notifier)
    }

    /// Use a store shared with the rest of the UI.
    pub fn with_store(store: DappStore, node: NodeClient<C>, notifier: N) -> Self {
        Self {
            store,
            notifier,
            node,
        }
    }
}

impl<C, N> Dapp for CounterDapp<C, N>
where
    C: AsyncHttpClient + Send + Sync,
    N: Notifier + Sync,
{
    type HttpClient = C;
    type Notifier = N;

    fn store(&self) -> &DappStore {
        &self.store
    }

    fn notifier(&self) -> &N {
        &self.notifier
    }

    fn node(&self) -> &NodeClient<C> {
        &self.node
    }
}
