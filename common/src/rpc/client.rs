use std::time::Duration;

use log::{debug, trace};
use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use url::Url;

use super::{JsonRpcRequest, JsonRpcResponse, RpcError};

#[derive(Debug, Clone)]
pub struct RpcClientConfig {
    pub request_timeout: Duration,
    pub connection_timeout: Duration,
}

impl Default for RpcClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            connection_timeout: Duration::from_secs(10),
        }
    }
}

// JSON-RPC 2.0 client over HTTP.
// Each call is sent exactly once, retrying is left to the caller.
#[derive(Debug, Clone)]
pub struct JsonRpcClient {
    client: Client,
    url: Url,
    config: RpcClientConfig,
}

impl JsonRpcClient {
    pub fn new(address: &str) -> Result<Self, RpcError> {
        Self::with_config(address, RpcClientConfig::default())
    }

    pub fn with_config(address: &str, config: RpcClientConfig) -> Result<Self, RpcError> {
        let url = if address.starts_with("http://") || address.starts_with("https://") {
            Url::parse(address)
        } else {
            Url::parse(&format!("http://{}", address))
        }
        .map_err(|e| RpcError::InvalidAddress(address.to_owned(), e))?;

        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connection_timeout)
            .build()
            .map_err(RpcError::ClientBuild)?;

        Ok(Self {
            client,
            url,
            config,
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn config(&self) -> &RpcClientConfig {
        &self.config
    }

    // Call `method` with positional params and decode its result
    pub async fn call<P, R>(&self, method: &str, params: P) -> Result<R, RpcError>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        let request = JsonRpcRequest::new(rand::random(), method, params);
        if log::log_enabled!(log::Level::Trace) {
            trace!("JSON-RPC request {} to {}", method, self.url);
        }

        let response = self
            .client
            .post(self.url.clone())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    RpcError::Timeout(self.config.request_timeout)
                } else if e.is_connect() {
                    RpcError::Connect(e)
                } else {
                    RpcError::Transport(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RpcError::Http {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown error").to_owned(),
            });
        }

        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                RpcError::Timeout(self.config.request_timeout)
            } else {
                RpcError::Transport(e)
            }
        })?;

        let response: JsonRpcResponse = serde_json::from_slice(&body)?;
        if let Some(error) = response.error {
            debug!("JSON-RPC {} rejected: {} ({})", method, error.message, error.code);
            return Err(RpcError::Rpc(error));
        }

        let result = response.result.ok_or(RpcError::MissingResult)?;
        Ok(serde_json::from_value(result)?)
    }
}
