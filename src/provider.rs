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

//! Wallet provider boundary.
//!
//! A wallet provider is anything able to authorize the application, list the accounts it may act
//! for, run read-only contract calls and submit transactions signed on behalf of an account. The
//! crate ships a JSON-RPC implementation ([`crate::JsonRpcProvider`]); tests and embedders may
//! plug in their own.

use alloy_primitives::{Address, Bytes, TxHash, U64};
use serde_json::Value;

/// EIP-1193 error code for a request the user declined in the wallet.
pub const USER_REJECTED: i64 = 4001;
/// EIP-1193 error code for a request from an origin the wallet has not authorized.
pub const UNAUTHORIZED: i64 = 4100;
/// JSON-RPC error codes nodes use for failed contract execution (`3` is geth's "execution
/// reverted" with revert data).
pub const EXECUTION_FAILED: [i64; 3] = [3, -32000, -32603];

pub trait WalletProvider: Send + Sync {
    /// Asks the wallet to authorize the application and returns the accounts it was granted.
    fn request_accounts(&self) -> Result<Vec<Address>, ProviderError>;

    /// Executes a read-only contract call against the latest block.
    fn call(&self, to: Address, data: Bytes) -> Result<Bytes, ProviderError>;

    /// Submits a transaction from `from`; the wallet takes care of gas, nonce and signing.
    fn send_transaction(
        &self,
        from: Address,
        to: Address,
        data: Bytes,
    ) -> Result<TxHash, ProviderError>;

    /// Returns the receipt of a mined transaction, or `None` while it is pending.
    fn transaction_receipt(&self, hash: TxHash) -> Result<Option<TxReceipt>, ProviderError>;
}

impl<P: WalletProvider + ?Sized> WalletProvider for Box<P> {
    fn request_accounts(&self) -> Result<Vec<Address>, ProviderError> {
        (**self).request_accounts()
    }
    fn call(&self, to: Address, data: Bytes) -> Result<Bytes, ProviderError> {
        (**self).call(to, data)
    }
    fn send_transaction(
        &self,
        from: Address,
        to: Address,
        data: Bytes,
    ) -> Result<TxHash, ProviderError> {
        (**self).send_transaction(from, to, data)
    }
    fn transaction_receipt(&self, hash: TxHash) -> Result<Option<TxReceipt>, ProviderError> {
        (**self).transaction_receipt(hash)
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
#[derive(Serialize, Deserialize)]
#[serde(crate = "serde_crate", rename_all = "camelCase")]
pub struct TxReceipt {
    pub transaction_hash: TxHash,
    #[serde(default)]
    pub block_number: Option<U64>,
    /// Post-Byzantium status: `1` for success, `0` for a reverted transaction.
    #[serde(default)]
    pub status: Option<U64>,
}

impl TxReceipt {
    pub fn succeeded(&self) -> bool { self.status.map_or(true, |status| !status.is_zero()) }
}

#[derive(Clone, PartialEq, Debug, Display)]
#[derive(Serialize, Deserialize)]
#[serde(crate = "serde_crate")]
#[display("{message} (code {code})")]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl RpcError {
    pub fn new(code: i64, message: impl ToString) -> Self {
        RpcError { code, message: message.to_string(), data: None }
    }

    pub fn is_user_rejection(&self) -> bool {
        self.code == USER_REJECTED || self.code == UNAUTHORIZED
    }

    #[inline]
    pub fn is_execution_failure(&self) -> bool { EXECUTION_FAILED.contains(&self.code) }
}

#[derive(Clone, PartialEq, Debug, Display, Error, From)]
#[display(doc_comments)]
pub enum ProviderError {
    /// wallet provider is not reachable at {0}.
    Unreachable(String),

    /// transport failure while talking to the wallet provider: {0}
    Transport(String),

    /// the wallet provider returned an error: {0}
    #[from]
    Rpc(RpcError),

    /// the wallet provider response is malformed: {0}
    Protocol(String),
}

impl ProviderError {
    pub fn is_user_rejection(&self) -> bool {
        matches!(self, ProviderError::Rpc(err) if err.is_user_rejection())
    }

    pub fn is_execution_failure(&self) -> bool {
        matches!(self, ProviderError::Rpc(err) if err.is_execution_failure())
    }

    pub fn is_network(&self) -> bool {
        matches!(self, ProviderError::Unreachable(_) | ProviderError::Transport(_))
    }
}
