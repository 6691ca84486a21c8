//! Push backend talking to a full node's JSON-RPC interface.

use std::time::Duration;

use async_trait::async_trait;
use log::{error, info};
use serde::Deserialize;
use serde_json::{Value, json};

use super::PushBackend;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for a node's RPC endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct BitcoindConfig {
    /// Host name or address of the node.
    pub host: String,
    /// RPC port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// RPC user name.
    pub user: String,
    /// RPC password.
    pub pass: String,
}

const fn default_port() -> u16 { 8332 }

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcError>,
}

/// Broadcasts through `sendrawtransaction`.
#[derive(Debug)]
pub struct BitcoindBackend {
    name: String,
    url: String,
    config: BitcoindConfig,
    client: reqwest::Client,
}

impl BitcoindBackend {
    /// Create a backend for the node described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(name: impl Into<String>, config: BitcoindConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        let url = format!("http://{}:{}/", config.host, config.port);
        Ok(Self {
            name: name.into(),
            url,
            config,
            client,
        })
    }

    async fn send_raw_transaction(&self, raw_tx: &str) -> Result<RpcResponse, reqwest::Error> {
        let body = json!({
            "jsonrpc": "1.0",
            "id": "txrelay",
            "method": "sendrawtransaction",
            "params": [raw_tx],
        });
        self.client
            .post(&self.url)
            .basic_auth(&self.config.user, Some(&self.config.pass))
            .json(&body)
            .send()
            .await?
            .json()
            .await
    }
}

#[async_trait]
impl PushBackend for BitcoindBackend {
    fn name(&self) -> &str { &self.name }

    async fn push(&self, raw_tx: &str) -> bool {
        info!("trying to push transaction: backend={}", self.name);
        match self.send_raw_transaction(raw_tx).await {
            Ok(RpcResponse {
                error: Some(RpcError { code, message }),
                ..
            }) => {
                error!(
                    "node rejected transaction: backend={}, code={code}, message={message}",
                    self.name
                );
                false
            }
            Ok(RpcResponse {
                result: Some(Value::String(txid)),
                ..
            }) => {
                info!("pushed transaction: backend={}, txid={txid}", self.name);
                true
            }
            Ok(response) => {
                error!(
                    "unexpected node response: backend={}, response={response:?}",
                    self.name
                );
                false
            }
            Err(err) => {
                error!("failed to reach node: backend={}, error={err}", self.name);
                false
            }
        }
    }
}
