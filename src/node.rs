use anyhow::{Context, Result};
use base64::{
    alphabet,
    engine::{
        general_purpose::{GeneralPurpose, GeneralPurposeConfig},
        DecodePaddingMode,
    },
    Engine,
};
use http::StatusCode;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::{
    config::NodeConfig,
    core::{
        store::Observable,
        util::{base_request, AsyncHttpClient},
    },
    utils::parse_int_prefix,
};

/// State path of the counter contract's `counter` variable.
pub const COUNTER_PATH: &str = "/get/con_counter.counter";

/// Standard alphabet, padding optional.
const VALUE_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

#[derive(Debug, thiserror::Error)]
pub enum AbciQueryError {
    #[error("abci query was unsuccessful (status: {status}): {body}")]
    Unsuccessful { status: StatusCode, body: String },

    #[error("abci query response has no `result.response` object")]
    MissingResponse,
}

#[derive(Debug, Deserialize)]
struct QueryEnvelope {
    result: Option<QueryResult>,
}

#[derive(Debug, Deserialize)]
struct QueryResult {
    response: Option<QueryResponse>,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    value: Option<String>,
}

/// Read-only client for a node's `abci_query` endpoint.
#[derive(Debug)]
pub struct NodeClient<C> {
    config: NodeConfig,
    http_client: C,
}

impl<C: AsyncHttpClient + Send + Sync> NodeClient<C> {
    pub fn new(config: NodeConfig, http_client: C) -> Self {
        Self {
            config,
            http_client,
        }
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn http_client(&self) -> &C {
        &self.http_client
    }

    /// `{nodeUrl}/abci_query?path="<path>"`, with the quotes percent-encoded.
    pub fn abci_query_url(&self, path: &str) -> Result<Url> {
        self.config
            .node_url
            .join(&format!("abci_query?path=%22{path}%22"))
            .context("unable to build abci_query url")
    }

    /// Query `path` and return the base64 `result.response.value`, if the node reported one.
    pub async fn abci_query(&self, path: &str) -> Result<Option<String>> {
        let url = self.abci_query_url(path)?;
        let request = base_request()
            .method("GET")
            .uri(url.as_str())
            .body(vec![])
            .context("failed to construct abci_query request")?;

        let response = self
            .http_client
            .execute(request)
            .await
            .context("failed to make abci_query request")?;

        let status = response.status();
        if !status.is_success() {
            let body = String::from_utf8_lossy(response.body()).into_owned();
            return Err(AbciQueryError::Unsuccessful { status, body }.into());
        }

        let envelope: QueryEnvelope = serde_json::from_slice(response.body())
            .context("failed to parse abci_query response as JSON")?;

        let response = envelope
            .result
            .and_then(|result| result.response)
            .ok_or(AbciQueryError::MissingResponse)?;

        Ok(response.value)
    }

    /// Read the current on-chain counter. Values that do not decode to an integer read as 0.
    pub async fn query_counter(&self) -> Result<i64> {
        let value = self.abci_query(COUNTER_PATH).await?;
        debug!(?value, "counter query returned");
        Ok(value.as_deref().map(decode_counter_value).unwrap_or(0))
    }

    /// Query the counter and write it into `cell`.
    ///
    /// Refreshes of the same cell are ordered by issuance: a refresh that completes after a
    /// later-issued refresh of that cell has already written it returns its value without
    /// writing.
    pub async fn refresh_counter(&self, cell: &Observable<i64>) -> Result<i64> {
        let ticket = cell.ticket();
        let value = self.query_counter().await?;

        if !cell.set_in_order(ticket, value) {
            debug!(?ticket, value, "discarding stale counter refresh");
        }

        Ok(value)
    }
}

/// Decode a base64 ASCII-decimal counter value, silently falling back to 0.
pub fn decode_counter_value(value: &str) -> i64 {
    let Ok(bytes) = VALUE_ENGINE.decode(value.trim()) else {
        return 0;
    };

    parse_int_prefix(&String::from_utf8_lossy(&bytes)).unwrap_or(0)
}
