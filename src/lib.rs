//! Client-side glue for a dapp built on the [Xian] network and the Xian Wallet browser
//! extension.
//!
//! [Xian]: <https://xian.org>
//!
//! # Usage
//!
//! The host application forwards wallet callbacks to a [`Dapp`] and renders the cells of its
//! [`DappStore`]:
//!
//! ```ignore
//! use xian_dapp::{
//!     config::NodeConfig,
//!     core::{notification::LogNotifier, util::ReqwestClient},
//!     wallet::{CounterDapp, Dapp, TransactionResult},
//! };
//!
//! let config = NodeConfig::new("https://testnet.xian.org")?;
//! let dapp = CounterDapp::new(config, ReqwestClient::new()?, LogNotifier);
//!
//! let mut address = dapp.store().wallet_address.subscribe();
//!
//! // Wallet callbacks.
//! dapp.handle_wallet_info(&serde_json::from_value(wallet_info)?);
//! dapp.handle_wallet_error(&wallet_error);
//!
//! // Transaction callbacks. An accepted transaction refreshes the counter.
//! let outcome = dapp
//!     .handle_transaction(TransactionResult::from(response))
//!     .await?;
//! dapp.handle_transaction_error(&submission_error);
//! ```
//!
//! The notifier can be replaced by implementing [`Notifier`], and the transport by
//! implementing [`AsyncHttpClient`].
//!
//! [`Dapp`]: crate::wallet::Dapp
//! [`DappStore`]: crate::core::store::DappStore
//! [`Notifier`]: crate::core::notification::Notifier
//! [`AsyncHttpClient`]: crate::core::util::AsyncHttpClient
//!
//! # Counter Queries
//!
//! [`NodeClient`] reads the counter contract's state through the node's `abci_query`
//! endpoint. The value arrives base64-encoded; anything that does not decode to an integer
//! reads as `0`.
//!
//! [`NodeClient`]: crate::node::NodeClient

pub mod config;
pub mod core;
pub mod node;
pub mod utils;
pub mod wallet;
