use serde::Deserialize;
use url::Url;

/// Static node configuration, loaded and validated by the host application.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NodeConfig {
    pub node_url: BaseUrl,
}

impl NodeConfig {
    pub fn new(node_url: impl Into<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            node_url: BaseUrl::try_from(node_url.into())?,
        })
    }

    /// Parse a config document such as `{ "nodeUrl": "http://127.0.0.1:26657" }`.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(ConfigError::Json)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid node url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("invalid config document: {0}")]
    Json(#[source] serde_json::Error),
}

/// A url that is always a base (can be safely join()'ed with further path elements without
/// mangling).
#[derive(Deserialize, Debug, Clone, Hash, PartialEq, Eq)]
#[serde(try_from = "String")]
pub struct BaseUrl(Url);

impl std::ops::Deref for BaseUrl {
    type Target = Url;

    fn deref(&self) -> &Url {
        &self.0
    }
}

impl TryFrom<String> for BaseUrl {
    type Error = url::ParseError;

    fn try_from(mut url: String) -> Result<Self, Self::Error> {
        // Make URL a base.
        if !url.ends_with('/') {
            url += "/"
        }
        url.parse().map(Self)
    }
}
