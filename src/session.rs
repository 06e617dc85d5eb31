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

use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::thread;
use std::time::Duration;

use alloy_primitives::{Address, TxHash};

use crate::config::{DEFAULT_MARKETPLACE, DEFAULT_TOKEN};
use crate::provider::{ProviderError, WalletProvider};
use crate::{
    Book, BookIndex, ClientError, MarketplaceContract, Notice, Notifier, TokenAmount,
    TokenContract, TxError,
};

/// Upper bound on the number of listing reads in flight at once.
pub const MAX_PARALLEL_READS: usize = 64;

/// How long to wait for a submitted transaction to be mined.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct ReceiptPolicy {
    /// Number of receipt queries; zero disables waiting for receipts.
    pub attempts: u32,
    pub interval: Duration,
}

impl Default for ReceiptPolicy {
    fn default() -> Self { ReceiptPolicy { attempts: 60, interval: Duration::from_secs(1) } }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct SessionOptions {
    pub marketplace: Address,
    pub token: Address,
    pub receipts: ReceiptPolicy,
}

impl Default for SessionOptions {
    fn default() -> Self {
        SessionOptions {
            marketplace: DEFAULT_MARKETPLACE,
            token: DEFAULT_TOKEN,
            receipts: default!(),
        }
    }
}

/// Result of a write operation.
///
/// The listing is always refetched after a write, whether the transaction succeeded or not, so
/// the outcome carries both results.
#[derive(Debug)]
pub struct WriteOutcome {
    pub tx: Result<TxHash, TxError>,
    pub refresh: Result<Arc<[Book]>, ClientError>,
}

impl WriteOutcome {
    #[inline]
    pub fn is_success(&self) -> bool { self.tx.is_ok() }

    /// Collapses the outcome into the transaction result. A refetch failure is reported only if
    /// the transaction itself went through.
    pub fn into_result(self) -> Result<TxHash, ClientError> {
        let hash = self.tx?;
        self.refresh?;
        Ok(hash)
    }
}

/// Client context of an authorized wallet session.
///
/// Holds the authorized account, the marketplace contract handle and the latest listing snapshot.
/// The snapshot is replaced wholesale by each fetch; write operations are serialized.
pub struct Session<P: WalletProvider, N: Notifier> {
    provider: Arc<P>,
    notifier: N,
    account: Address,
    marketplace: MarketplaceContract<P>,
    token: Address,
    receipts: ReceiptPolicy,
    books: RwLock<Arc<[Book]>>,
    write_lock: Mutex<()>,
}

impl<P: WalletProvider, N: Notifier> Session<P, N> {
    /// Authorizes the application with the wallet provider and binds the contract handles.
    ///
    /// `None` as a provider means no wallet is available; this is reported to the user and
    /// returned as [`ClientError::ProviderAbsent`].
    pub fn establish(
        provider: Option<P>,
        notifier: N,
        options: SessionOptions,
    ) -> Result<Self, ClientError> {
        let Some(provider) = provider else {
            notifier.show(Notice::Failure(s!(
                "Please install a wallet provider and connect this client to it."
            )));
            return Err(ClientError::ProviderAbsent);
        };

        notifier.show(Notice::Attention(s!("Please approve this application to use it.")));
        let accounts = match provider.request_accounts() {
            Ok(accounts) => accounts,
            Err(ProviderError::Unreachable(url)) => {
                warn!("Wallet provider at {url} is not reachable");
                notifier.show(Notice::Failure(s!(
                    "Please install a wallet provider and connect this client to it."
                )));
                return Err(ClientError::ProviderAbsent);
            }
            Err(err) => {
                notifier.show(Notice::Failure(format!("{}.", err)));
                return Err(ClientError::AuthorizationDenied(err));
            }
        };
        notifier.hide();

        let Some(account) = accounts.first().copied() else {
            notifier.show(Notice::Failure(s!("The wallet did not share any account.")));
            return Err(ClientError::NoAccounts);
        };
        info!("Authorized account {account}");

        let provider = Arc::new(provider);
        let marketplace = MarketplaceContract::new(provider.clone(), options.marketplace);
        Ok(Session {
            provider,
            notifier,
            account,
            marketplace,
            token: options.token,
            receipts: options.receipts,
            books: RwLock::new(Arc::from(Vec::new())),
            write_lock: Mutex::new(()),
        })
    }

    /// Full start-up sequence: authorization, balance query and listing fetch, with the loading
    /// notice visible for the whole duration.
    pub fn start(
        provider: Option<P>,
        notifier: N,
        options: SessionOptions,
    ) -> Result<Self, ClientError> {
        notifier.show(Notice::Pending(s!("Loading...")));
        let session = Self::establish(provider, notifier, options)?;
        session.balance()?;
        session.fetch_books().map_err(|err| {
            session
                .notifier
                .show(Notice::Failure(format!("Unable to load books ({}).", err.category())));
            err
        })?;
        session.notifier.hide();
        Ok(session)
    }

    #[inline]
    pub fn account(&self) -> Address { self.account }

    #[inline]
    pub fn notifier(&self) -> &N { &self.notifier }

    #[inline]
    pub fn provider(&self) -> &P { &self.provider }

    #[inline]
    pub fn marketplace(&self) -> &MarketplaceContract<P> { &self.marketplace }

    /// Token contract handle. Constructed anew on each use.
    pub fn token(&self) -> TokenContract<P> { TokenContract::new(self.provider.clone(), self.token) }

    /// Current listing snapshot.
    pub fn books(&self) -> Arc<[Book]> {
        self.books
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn book(&self, index: BookIndex) -> Result<Book, ClientError> {
        self.books()
            .get(index.to_usize())
            .filter(|book| book.index == index)
            .cloned()
            .ok_or(ClientError::UnknownBook(index))
    }

    /// Queries the spendable token balance of the session account and updates the balance
    /// display.
    pub fn balance(&self) -> Result<TokenAmount, ClientError> {
        let balance = self
            .token()
            .balance_of(self.account)
            .map_err(|err| ClientError::Read("token balance", err))?;
        self.notifier.balance(&balance.to_string());
        Ok(balance)
    }

    /// Reads the complete listing from the contract and replaces the snapshot with it.
    ///
    /// All book reads are issued concurrently. If any of them fails the whole fetch fails and the
    /// previous snapshot stays in place.
    pub fn fetch_books(&self) -> Result<Arc<[Book]>, ClientError> {
        let len = self
            .marketplace
            .books_length()
            .map_err(|err| ClientError::Read("book count", err))?;
        debug!("Contract lists {len} books");

        let mut books = Vec::new();
        let mut start = 0u64;
        while start < len {
            let end = len.min(start.saturating_add(MAX_PARALLEL_READS as u64));
            let results = thread::scope(|scope| {
                let handles = (start..end)
                    .map(BookIndex::from)
                    .map(|index| (index, scope.spawn(move || self.marketplace.book(index))))
                    .collect::<Vec<_>>();
                handles
                    .into_iter()
                    .map(|(index, handle)| {
                        let res = handle
                            .join()
                            .unwrap_or_else(|panic| std::panic::resume_unwind(panic));
                        (index, res)
                    })
                    .collect::<Vec<_>>()
            });
            for (index, res) in results {
                books.push(res.map_err(|err| ClientError::BookRead(index, err))?);
            }
            start = end;
        }

        let books = Arc::<[Book]>::from(books);
        *self.books.write().unwrap_or_else(PoisonError::into_inner) = books.clone();
        trace!("Listing snapshot replaced with {} books", books.len());
        Ok(books)
    }

    /// Lists a new book for sale. `price` is given in human-readable token units.
    pub fn add_book(
        &self,
        title: &str,
        author: &str,
        image: &str,
        price: &str,
    ) -> Result<WriteOutcome, ClientError> {
        let (title, author, image) = (title.trim(), author.trim(), image.trim());
        for (name, value) in [("title", title), ("author", author), ("image URL", image)] {
            if value.is_empty() {
                return Err(ClientError::InvalidInput(format!("book {name} must not be empty")));
            }
        }
        let price = TokenAmount::parse_decimal(price)?;

        let _guard = self.write_guard();
        self.notifier
            .show(Notice::Pending(format!("Adding \"{title}\"...")));
        let tx = self.confirm(
            self.marketplace
                .add_book(self.account, title, author, image, price),
        );
        self.report(
            &tx,
            format!("You successfully added \"{title}\"."),
            |category| format!("Unable to add \"{title}\" ({category})."),
        );
        Ok(WriteOutcome { tx, refresh: self.fetch_books() })
    }

    /// Buys a book: approves the marketplace to spend the book price and then submits the
    /// purchase. The purchase is not submitted if the approval fails.
    pub fn buy_book(&self, index: BookIndex) -> Result<WriteOutcome, ClientError> {
        let seen = self.book(index)?;
        let _guard = self.write_guard();
        let book = self.locked_book(&seen)?;

        self.notifier
            .show(Notice::Pending(s!("Waiting for payment approval...")));
        let approval = self.confirm(self.token().approve(
            self.account,
            self.marketplace.address(),
            book.price,
        ));
        let tx = match approval {
            Ok(hash) => {
                debug!("Spending of {} approved in {hash}", book.price);
                self.notifier.show(Notice::Pending(format!(
                    "Awaiting payment for \"{}\"...",
                    book.title
                )));
                self.confirm(self.marketplace.buy_book(self.account, index))
            }
            Err(err) => Err(err),
        };
        self.report(
            &tx,
            format!("You successfully bought \"{}\".", book.title),
            |category| format!("Unable to purchase \"{}\" ({category}).", book.title),
        );
        let refresh = self.fetch_books();
        if tx.is_ok() {
            if let Err(err) = self.balance() {
                warn!("Unable to refresh balance: {err}");
            }
        }
        Ok(WriteOutcome { tx, refresh })
    }

    /// Removes a book from the marketplace. Only the book owner is allowed to do that by the
    /// contract.
    pub fn delete_book(&self, index: BookIndex) -> Result<WriteOutcome, ClientError> {
        let seen = self.book(index)?;
        let _guard = self.write_guard();
        let book = self.locked_book(&seen)?;

        self.notifier
            .show(Notice::Pending(format!("Waiting to delete \"{}\"...", book.title)));
        let tx = self.confirm(self.marketplace.remove_book(self.account, index));
        self.report(
            &tx,
            format!("You successfully deleted \"{}\".", book.title),
            |category| {
                format!(
                    "Failed to delete \"{}\" ({category}); only the owner may delete a book.",
                    book.title
                )
            },
        );
        Ok(WriteOutcome { tx, refresh: self.fetch_books() })
    }

    /// Flips the read status of a book, based on the status in the snapshot current once the
    /// write lock is taken.
    pub fn toggle_read(&self, index: BookIndex) -> Result<WriteOutcome, ClientError> {
        let seen = self.book(index)?;
        let _guard = self.write_guard();
        let book = self.locked_book(&seen)?;
        let target = if book.is_read { "Unread" } else { "Read" };

        self.notifier
            .show(Notice::Pending(format!("Waiting to mark \"{}\" as {target}...", book.title)));
        let tx = if book.is_read {
            self.marketplace.mark_as_unread(self.account, index)
        } else {
            self.marketplace.mark_as_read(self.account, index)
        };
        let tx = self.confirm(tx);
        self.report(
            &tx,
            format!("You successfully marked \"{}\" as {target}.", book.title),
            |category| format!("Failed to mark \"{}\" as {target} ({category}).", book.title),
        );
        Ok(WriteOutcome { tx, refresh: self.fetch_books() })
    }

    /// Re-reads a book from the snapshot left by the previous write. Must be called with the
    /// write lock held.
    ///
    /// Fails with [`ClientError::StaleIndex`] if the index now points to a different listing than
    /// the one the caller saw, which happens when an earlier write shifted the listing.
    fn locked_book(&self, seen: &Book) -> Result<Book, ClientError> {
        let current = self.book(seen.index)?;
        if !current.is_same_listing(seen) {
            warn!(
                "Book #{} changed from \"{}\" to \"{}\" while waiting for a pending write",
                seen.index, seen.title, current.title
            );
            return Err(ClientError::StaleIndex(seen.index));
        }
        Ok(current)
    }

    fn write_guard(&self) -> std::sync::MutexGuard<'_, ()> {
        self.write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Waits for the transaction to be mined according to the receipt policy.
    fn confirm(&self, submitted: Result<TxHash, ProviderError>) -> Result<TxHash, TxError> {
        let hash = submitted?;
        if self.receipts.attempts == 0 {
            return Ok(hash);
        }
        for attempt in 1..=self.receipts.attempts {
            match self.provider.transaction_receipt(hash)? {
                Some(receipt) if receipt.succeeded() => {
                    debug!("Transaction {hash} mined");
                    return Ok(hash);
                }
                Some(_) => return Err(TxError::Reverted(hash)),
                None if attempt < self.receipts.attempts => {
                    trace!("Transaction {hash} is pending (attempt {attempt})");
                    thread::sleep(self.receipts.interval);
                }
                None => {}
            }
        }
        Err(TxError::Unconfirmed(hash))
    }

    fn report(
        &self,
        tx: &Result<TxHash, TxError>,
        success: String,
        failure: impl FnOnce(crate::ErrorCategory) -> String,
    ) {
        match tx {
            Ok(hash) => {
                info!("Transaction {hash} succeeded");
                self.notifier.show(Notice::Success(success));
            }
            Err(err) => {
                warn!("Transaction failed: {err}");
                self.notifier.show(Notice::Failure(failure(err.category())));
            }
        }
    }
}
