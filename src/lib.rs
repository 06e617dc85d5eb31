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

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

#[macro_use]
extern crate amplify;
#[macro_use]
extern crate log;
#[macro_use]
extern crate serde_crate as serde;

pub mod abi;
mod book;
mod config;
mod contract;
mod error;
mod notify;
pub mod provider;
pub mod render;
mod rpc;
mod session;
mod units;

pub use alloy_primitives::{Address, TxHash};
pub use book::{Book, BookIndex, BookIndexError};
pub use config::{
    Config, ConfigError, CONFIG_FILE, DEFAULT_EXPLORER, DEFAULT_MARKETPLACE, DEFAULT_TOKEN,
};
pub use contract::{MarketplaceContract, TokenContract};
pub use error::{ClientError, ErrorCategory, TxError};
pub use notify::{Banner, Notice, Notifier, Silent};
pub use provider::{ProviderError, RpcError, TxReceipt, WalletProvider};
pub use rpc::JsonRpcProvider;
pub use session::{ReceiptPolicy, Session, SessionOptions, WriteOutcome, MAX_PARALLEL_READS};
pub use units::{AmountError, TokenAmount, DECIMALS};
