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

use alloy_primitives::TxHash;

use crate::provider::ProviderError;
use crate::{AmountError, BookIndex, ConfigError};

/// Coarse classification of client failures, used to pick the user-facing wording independently
/// from the error origin.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Display)]
pub enum ErrorCategory {
    #[display("wallet provider is absent")]
    ProviderAbsent,

    #[display("authorization denied")]
    AuthorizationDenied,

    #[display("contract read failed")]
    Read,

    #[display("transaction rejected")]
    Rejected,

    #[display("transaction reverted")]
    Reverted,

    #[display("network failure")]
    Network,

    #[display("wallet provider error")]
    Provider,

    #[display("invalid input")]
    InvalidInput,

    #[display("configuration error")]
    Config,
}

#[derive(Clone, PartialEq, Debug, Display, Error)]
#[display(doc_comments)]
pub enum TxError {
    /// the transaction was rejected in the wallet.
    Rejected,

    /// transaction {0} was reverted by the contract.
    Reverted(TxHash),

    /// transaction {0} was not confirmed in time.
    Unconfirmed(TxHash),

    /// {0}
    Provider(ProviderError),
}

impl From<ProviderError> for TxError {
    fn from(err: ProviderError) -> Self {
        if err.is_user_rejection() {
            TxError::Rejected
        } else {
            TxError::Provider(err)
        }
    }
}

impl TxError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            TxError::Rejected => ErrorCategory::Rejected,
            TxError::Reverted(_) => ErrorCategory::Reverted,
            TxError::Unconfirmed(_) => ErrorCategory::Network,
            TxError::Provider(err) if err.is_network() => ErrorCategory::Network,
            // a node refusing to estimate gas is how reverts surface before mining
            TxError::Provider(err) if err.is_execution_failure() => ErrorCategory::Reverted,
            TxError::Provider(_) => ErrorCategory::Provider,
        }
    }
}

#[derive(Debug, Display, Error, From)]
#[display(doc_comments)]
pub enum ClientError {
    /// no wallet provider found; please install and start a wallet, then point the client to it
    /// with `--provider`.
    ProviderAbsent,

    /// the wallet did not authorize this application: {0}
    AuthorizationDenied(ProviderError),

    /// the wallet did not expose any account to this application.
    NoAccounts,

    /// unable to read {0} from the contract: {1}
    Read(&'static str, ProviderError),

    /// unable to load book #{0}: {1}
    BookRead(BookIndex, ProviderError),

    #[from]
    #[display(inner)]
    Transaction(TxError),

    #[from]
    #[display(inner)]
    Amount(AmountError),

    /// {0}
    InvalidInput(String),

    /// there is no book #{0} in the current listing.
    UnknownBook(BookIndex),

    /// book #{0} was replaced by another listing after a previous write; reload the listing and
    /// try again.
    StaleIndex(BookIndex),

    #[from]
    #[display(inner)]
    Config(ConfigError),
}

impl ClientError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ClientError::ProviderAbsent => ErrorCategory::ProviderAbsent,
            ClientError::AuthorizationDenied(_) | ClientError::NoAccounts => {
                ErrorCategory::AuthorizationDenied
            }
            ClientError::Read(_, err) | ClientError::BookRead(_, err) if err.is_network() => {
                ErrorCategory::Network
            }
            ClientError::Read(..) | ClientError::BookRead(..) => ErrorCategory::Read,
            ClientError::Transaction(err) => err.category(),
            ClientError::Amount(_) |
            ClientError::InvalidInput(_) |
            ClientError::UnknownBook(_) |
            ClientError::StaleIndex(_) => ErrorCategory::InvalidInput,
            ClientError::Config(_) => ErrorCategory::Config,
        }
    }
}
