//! HTTP client for upstream node APIs.
//!
//! # Responsibilities
//! - Issue JSON-RPC calls (execution clients, op-node)
//! - Issue REST GETs (beacon API)
//! - Convert every fault into a `CheckError`: transport, non-200 status,
//!   JSON-RPC error object, unparseable body
//!
//! No timeouts here: the aggregator bounds each check and drops the future
//! on expiry, which cancels the request in flight.

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use url::Url;

use crate::blockchain::types::{BlockchainError, BlockchainResult};
use crate::health::CheckError;

#[derive(Debug, Deserialize)]
struct RpcResponse<R> {
    result: Option<R>,
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// Client bound to one upstream base URL.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    base_url: Url,
}

impl UpstreamClient {
    /// Create a client for `base_url`, sharing the connection pool of `http`.
    pub fn new(http: reqwest::Client, upstream: &'static str, base_url: &str) -> BlockchainResult<Self> {
        let mut url = Url::parse(base_url).map_err(|e| BlockchainError::InvalidBaseUrl {
            upstream,
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        // Joined paths must extend the base path rather than replace its
        // last segment.
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }

        Ok(Self { http, base_url: url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Call a JSON-RPC method on the base URL.
    pub async fn rpc_call<R: DeserializeOwned>(&self, method: &str, params: Value) -> Result<R, CheckError> {
        let request = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 0,
        });

        let builder = self
            .http
            .post(self.base_url.clone())
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .json(&request);
        let body = send(builder).await?;

        let response: RpcResponse<R> = decode(&body)?;
        match response {
            RpcResponse {
                error: Some(error), ..
            } => Err(CheckError::Rpc {
                code: error.code,
                message: error.message,
            }),
            RpcResponse {
                result: Some(result),
                ..
            } => Ok(result),
            RpcResponse { result: None, .. } => Err(CheckError::Malformed {
                body,
                reason: format!("no result for '{}'", method),
            }),
        }
    }

    /// GET a JSON document at `path`, relative to the base URL.
    pub async fn get_json<R: DeserializeOwned>(&self, path: &str) -> Result<R, CheckError> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| CheckError::Transport(format!("invalid url for '{}': {}", path, e)))?;

        let builder = self.http.get(url).header(ACCEPT, "application/json");
        let body = send(builder).await?;
        decode(&body)
    }
}

async fn send(builder: reqwest::RequestBuilder) -> Result<String, CheckError> {
    let response = builder
        .send()
        .await
        .map_err(|e| CheckError::Transport(e.to_string()))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| CheckError::Transport(e.to_string()))?;

    if status != StatusCode::OK {
        return Err(CheckError::UnexpectedStatus {
            status: status.as_u16(),
            body,
        });
    }
    Ok(body)
}

fn decode<R: DeserializeOwned>(body: &str) -> Result<R, CheckError> {
    serde_json::from_str(body).map_err(|e| CheckError::Malformed {
        body: body.to_string(),
        reason: e.to_string(),
    })
}
