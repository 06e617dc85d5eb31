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

use std::sync::Arc;

use alloy_primitives::{Address, TxHash};
use alloy_sol_types::SolCall;

use crate::abi::{IBookLibrary, IERC20};
use crate::provider::{ProviderError, WalletProvider};
use crate::{Book, BookIndex, TokenAmount};

/// Contract address bound to the wallet provider used to reach it.
struct Bound<P: WalletProvider> {
    provider: Arc<P>,
    address: Address,
}

impl<P: WalletProvider> Clone for Bound<P> {
    fn clone(&self) -> Self { Bound { provider: self.provider.clone(), address: self.address } }
}

impl<P: WalletProvider> Bound<P> {
    fn call<C: SolCall>(&self, call: C) -> Result<C::Return, ProviderError> {
        trace!("Calling {} on {}", C::SIGNATURE, self.address);
        let data = self.provider.call(self.address, call.abi_encode().into())?;
        C::abi_decode_returns(&data, true).map_err(|err| {
            ProviderError::Protocol(format!("undecodable {} result: {err}", C::SIGNATURE))
        })
    }

    fn send<C: SolCall>(&self, from: Address, call: C) -> Result<TxHash, ProviderError> {
        debug!("Submitting {} to {} from {from}", C::SIGNATURE, self.address);
        let hash = self
            .provider
            .send_transaction(from, self.address, call.abi_encode().into())?;
        debug!("Transaction {hash} submitted");
        Ok(hash)
    }
}

/// Handle of the `BookLibrary` marketplace contract.
pub struct MarketplaceContract<P: WalletProvider>(Bound<P>);

impl<P: WalletProvider> Clone for MarketplaceContract<P> {
    fn clone(&self) -> Self { MarketplaceContract(self.0.clone()) }
}

impl<P: WalletProvider> MarketplaceContract<P> {
    pub fn new(provider: Arc<P>, address: Address) -> Self {
        MarketplaceContract(Bound { provider, address })
    }

    #[inline]
    pub fn address(&self) -> Address { self.0.address }

    pub fn books_length(&self) -> Result<u64, ProviderError> {
        let len = self.0.call(IBookLibrary::getBooksLengthCall {})?._0;
        u64::try_from(len)
            .map_err(|_| ProviderError::Protocol(format!("book count {len} exceeds 64 bits")))
    }

    pub fn book(&self, index: BookIndex) -> Result<Book, ProviderError> {
        let raw = self.0.call(IBookLibrary::getBookCall { index: index.into() })?;
        Book::decode(index, raw)
    }

    pub fn add_book(
        &self,
        from: Address,
        title: &str,
        author: &str,
        image: &str,
        price: TokenAmount,
    ) -> Result<TxHash, ProviderError> {
        self.0.send(from, IBookLibrary::addBookCall {
            title: title.to_owned(),
            author: author.to_owned(),
            image: image.to_owned(),
            price: price.units(),
        })
    }

    pub fn buy_book(&self, from: Address, index: BookIndex) -> Result<TxHash, ProviderError> {
        self.0
            .send(from, IBookLibrary::buyBookCall { index: index.into() })
    }

    pub fn remove_book(&self, from: Address, index: BookIndex) -> Result<TxHash, ProviderError> {
        self.0
            .send(from, IBookLibrary::removeBookCall { index: index.into() })
    }

    pub fn mark_as_read(&self, from: Address, index: BookIndex) -> Result<TxHash, ProviderError> {
        self.0
            .send(from, IBookLibrary::markAsReadCall { index: index.into() })
    }

    pub fn mark_as_unread(&self, from: Address, index: BookIndex) -> Result<TxHash, ProviderError> {
        self.0
            .send(from, IBookLibrary::markAsUnreadCall { index: index.into() })
    }
}

/// Handle of the ERC-20 token used for payments.
pub struct TokenContract<P: WalletProvider>(Bound<P>);

impl<P: WalletProvider> TokenContract<P> {
    pub fn new(provider: Arc<P>, address: Address) -> Self {
        TokenContract(Bound { provider, address })
    }

    #[inline]
    pub fn address(&self) -> Address { self.0.address }

    pub fn balance_of(&self, owner: Address) -> Result<TokenAmount, ProviderError> {
        let balance = self.0.call(IERC20::balanceOfCall { owner })?.balance;
        Ok(TokenAmount::from_units(balance))
    }

    /// Allows `spender` to withdraw up to `amount` from the `from` account.
    pub fn approve(
        &self,
        from: Address,
        spender: Address,
        amount: TokenAmount,
    ) -> Result<TxHash, ProviderError> {
        self.0
            .send(from, IERC20::approveCall { spender, amount: amount.units() })
    }
}
