// Book marketplace client for EVM smart contracts
//
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not use this file except
// in compliance with the License. You may obtain a copy of the License at
//
//        http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software distributed under the License
// is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express
// or implied. See the License for the specific language governing permissions and limitations under
// the License.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::{Address, Bytes, TxHash, U64};
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::provider::{ProviderError, RpcError, TxReceipt, WalletProvider};

#[derive(Deserialize)]
#[serde(crate = "serde_crate")]
struct Response {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcError>,
}

/// Wallet provider speaking JSON-RPC 2.0 over HTTP.
///
/// Works with any signer exposing the EIP-1193 method set over HTTP (a desktop wallet bridge or a
/// development node holding unlocked accounts).
#[derive(Clone, Debug)]
pub struct JsonRpcProvider {
    url: String,
    client: Client,
    next_id: Arc<AtomicU64>,
}

impl JsonRpcProvider {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| ProviderError::Transport(err.to_string()))?;
        Ok(JsonRpcProvider {
            url: url.to_owned(),
            client,
            next_id: default!(),
        })
    }

    /// Connects to the provider and checks that it answers, returning the chain id it serves.
    pub fn detect(url: &str, timeout: Duration) -> Result<(Self, u64), ProviderError> {
        let provider = Self::new(url, timeout)?;
        let chain_id = provider.chain_id()?;
        info!("Wallet provider at {url} serves chain {chain_id}");
        Ok((provider, chain_id))
    }

    #[inline]
    pub fn url(&self) -> &str { &self.url }

    pub fn chain_id(&self) -> Result<u64, ProviderError> {
        let id: U64 = self.request("eth_chainId", json!([]))?;
        u64::try_from(id)
            .map_err(|_| ProviderError::Protocol(format!("chain id {id} is out of range")))
    }

    fn request<R: DeserializeOwned>(&self, method: &str, params: Value) -> Result<R, ProviderError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        trace!("JSON-RPC request #{id} {method} {params}");
        let body = json!({ "jsonrpc": "2.0", "id": id, "method": method, "params": params });
        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .map_err(|err| {
                if err.is_connect() || err.is_timeout() {
                    ProviderError::Unreachable(self.url.clone())
                } else {
                    ProviderError::Transport(err.to_string())
                }
            })?;
        let status = response.status();
        let text = response
            .text()
            .map_err(|err| ProviderError::Transport(err.to_string()))?;
        trace!("JSON-RPC response #{id} ({status}): {text}");
        parse_response(&text).map_err(|err| match err {
            ProviderError::Protocol(_) if !status.is_success() => {
                ProviderError::Transport(format!("HTTP status {status}"))
            }
            err => err,
        })
    }
}

fn parse_response<R: DeserializeOwned>(text: &str) -> Result<R, ProviderError> {
    let response: Response =
        serde_json::from_str(text).map_err(|err| ProviderError::Protocol(err.to_string()))?;
    if let Some(err) = response.error {
        return Err(err.into());
    }
    serde_json::from_value(response.result.unwrap_or(Value::Null))
        .map_err(|err| ProviderError::Protocol(err.to_string()))
}

impl WalletProvider for JsonRpcProvider {
    fn request_accounts(&self) -> Result<Vec<Address>, ProviderError> {
        self.request("eth_requestAccounts", json!([]))
    }

    fn call(&self, to: Address, data: Bytes) -> Result<Bytes, ProviderError> {
        self.request("eth_call", json!([{ "to": to, "data": data }, "latest"]))
    }

    fn send_transaction(
        &self,
        from: Address,
        to: Address,
        data: Bytes,
    ) -> Result<TxHash, ProviderError> {
        self.request("eth_sendTransaction", json!([{ "from": from, "to": to, "data": data }]))
    }

    fn transaction_receipt(&self, hash: TxHash) -> Result<Option<TxReceipt>, ProviderError> {
        self.request("eth_getTransactionReceipt", json!([hash]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_result() {
        let accounts: Vec<Address> = parse_response(
            r#"{"jsonrpc":"2.0","id":1,"result":["0x00000000000000000000000000000000000000a1"]}"#,
        )
        .unwrap();
        assert_eq!(accounts.len(), 1);

        let data: Bytes =
            parse_response(r#"{"jsonrpc":"2.0","id":2,"result":"0x0102"}"#).unwrap();
        assert_eq!(data.as_ref(), &[1u8, 2]);
    }

    #[test]
    fn pending_receipt_is_none() {
        let receipt: Option<TxReceipt> =
            parse_response(r#"{"jsonrpc":"2.0","id":3,"result":null}"#).unwrap();
        assert!(receipt.is_none());
    }

    #[test]
    fn parses_error() {
        let err = parse_response::<Vec<Address>>(
            r#"{"jsonrpc":"2.0","id":4,"error":{"code":4001,"message":"User rejected the request."}}"#,
        )
        .unwrap_err();
        assert!(err.is_user_rejection());
    }

    #[test]
    fn malformed_is_protocol_error() {
        let err = parse_response::<Bytes>("<html>bad gateway</html>").unwrap_err();
        assert!(matches!(err, ProviderError::Protocol(_)));
        let err = parse_response::<Bytes>(r#"{"jsonrpc":"2.0","id":5,"result":42}"#).unwrap_err();
        assert!(matches!(err, ProviderError::Protocol(_)));
    }

    #[test]
    fn unreachable_endpoint() {
        // port 9 (discard) is reserved and never serves JSON-RPC
        let provider =
            JsonRpcProvider::new("http://127.0.0.1:9", Duration::from_millis(500)).unwrap();
        let err = provider.request_accounts().unwrap_err();
        assert!(err.is_network(), "{err}");
    }
}
