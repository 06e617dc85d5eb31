//! In-memory wallet provider hosting a `BookLibrary` marketplace and an ERC-20 token.

#![allow(dead_code)]

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use alloy_primitives::{address, keccak256, Address, Bytes, TxHash, U256, U64};
use alloy_sol_types::{SolCall, SolInterface};
use amplify::Display;
use bookmarket::abi::IBookLibrary::{self, IBookLibraryCalls};
use bookmarket::abi::IERC20::{self, IERC20Calls};
use bookmarket::{
    Notice, Notifier, ProviderError, ReceiptPolicy, RpcError, SessionOptions, TxReceipt,
    WalletProvider,
};

pub const ALICE: Address = address!("00000000000000000000000000000000000000a1");
pub const BOB: Address = address!("00000000000000000000000000000000000000b0");
pub const MARKETPLACE: Address = address!("0000000000000000000000000000000000001000");
pub const TOKEN: Address = address!("0000000000000000000000000000000000002000");

pub const ONE: u128 = 1_000_000_000_000_000_000;

/// Contract calls a test may make fail.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
#[display(lowercase)]
pub enum Method {
    AddBook,
    BuyBook,
    RemoveBook,
    MarkAsRead,
    MarkAsUnread,
    Approve,
}

#[derive(Clone, Debug)]
pub struct Listing {
    pub owner: Address,
    pub title: String,
    pub author: String,
    pub image: String,
    pub price: U256,
    pub sold: U256,
    pub is_read: bool,
}

impl Listing {
    pub fn new(owner: Address, title: &str, price: u128, sold: u64, is_read: bool) -> Self {
        Listing {
            owner,
            title: title.to_owned(),
            author: format!("Author of {title}"),
            image: format!("https://img.example/{title}.png"),
            price: U256::from(price),
            sold: U256::from(sold),
            is_read,
        }
    }
}

#[derive(Default)]
pub struct Chain {
    pub books: Vec<Listing>,
    pub balances: HashMap<Address, U256>,
    pub allowances: HashMap<(Address, Address), U256>,
    pub receipts: HashMap<TxHash, bool>,
    /// Submitted transactions in submission order, including reverted ones.
    pub submitted: Vec<Method>,
    nonce: u64,
}

#[derive(Default)]
pub struct Faults {
    pub deny_authorization: bool,
    pub no_accounts: bool,
    pub unreachable: bool,
    pub failing_book: Option<u64>,
    pub rejected: BTreeSet<Method>,
    pub reverted: BTreeSet<Method>,
    /// Number of receipt queries answering "pending" before the receipt shows up.
    pub pending_receipts: usize,
}

pub struct MockWallet {
    pub account: Address,
    chain: Mutex<Chain>,
    faults: Mutex<Faults>,
    read_delay: Option<Duration>,
    reads_in_flight: AtomicUsize,
    peak_reads: AtomicUsize,
    receipt_queries: AtomicUsize,
    length_queries: AtomicUsize,
    gate: Gate,
}

/// Holds submitted transactions until opened.
#[derive(Default)]
struct Gate {
    closed: Mutex<bool>,
    changed: Condvar,
    waiting: AtomicUsize,
}

impl MockWallet {
    pub fn new(account: Address, books: Vec<Listing>) -> Self {
        let mut chain = Chain { books, ..Chain::default() };
        chain.balances.insert(ALICE, U256::from(10 * ONE));
        chain.balances.insert(BOB, U256::from(10 * ONE));
        MockWallet {
            account,
            chain: Mutex::new(chain),
            faults: default!(),
            read_delay: None,
            reads_in_flight: AtomicUsize::new(0),
            peak_reads: AtomicUsize::new(0),
            receipt_queries: AtomicUsize::new(0),
            length_queries: AtomicUsize::new(0),
            gate: default!(),
        }
    }

    /// Two listings: one by Alice, unread, priced 1 cUSD with 3 sales; one by Bob, read, priced
    /// 2 cUSD without sales.
    pub fn two_books(account: Address) -> Self {
        Self::new(account, vec![
            Listing::new(ALICE, "T1", ONE, 3, false),
            Listing::new(BOB, "T2", 2 * ONE, 0, true),
        ])
    }

    /// Slows down every book read so that later indexes complete first.
    pub fn with_read_delay(mut self, delay: Duration) -> Self {
        self.read_delay = Some(delay);
        self
    }

    pub fn chain(&self) -> MutexGuard<'_, Chain> { self.chain.lock().unwrap() }

    pub fn faults(&self) -> MutexGuard<'_, Faults> { self.faults.lock().unwrap() }

    pub fn peak_reads(&self) -> usize { self.peak_reads.load(Ordering::SeqCst) }

    pub fn receipt_queries(&self) -> usize { self.receipt_queries.load(Ordering::SeqCst) }

    /// Number of `getBooksLength` calls, one per listing fetch.
    pub fn length_queries(&self) -> usize { self.length_queries.load(Ordering::SeqCst) }

    /// Makes every following transaction submission block until [`Self::open_gate`].
    pub fn close_gate(&self) { *self.gate.closed.lock().unwrap() = true; }

    pub fn open_gate(&self) {
        *self.gate.closed.lock().unwrap() = false;
        self.gate.changed.notify_all();
    }

    /// Blocks until `count` submissions are held at the gate.
    pub fn wait_at_gate(&self, count: usize) {
        while self.gate.waiting.load(Ordering::SeqCst) < count {
            thread::sleep(Duration::from_millis(1));
        }
    }

    fn pass_gate(&self) {
        let mut closed = self.gate.closed.lock().unwrap();
        if !*closed {
            return;
        }
        self.gate.waiting.fetch_add(1, Ordering::SeqCst);
        while *closed {
            closed = self.gate.changed.wait(closed).unwrap();
        }
        self.gate.waiting.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn balance_of(&self, owner: Address) -> U256 {
        self.chain()
            .balances
            .get(&owner)
            .copied()
            .unwrap_or_default()
    }

    fn reverted(reason: &str) -> ProviderError {
        ProviderError::Rpc(RpcError::new(-32000, format!("execution reverted: {reason}")))
    }

    fn read_book(&self, index: U256) -> Result<Bytes, ProviderError> {
        let in_flight = self.reads_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_reads.fetch_max(in_flight, Ordering::SeqCst);
        let (len, listing) = {
            let chain = self.chain();
            let listing = usize::try_from(index)
                .ok()
                .and_then(|index| chain.books.get(index))
                .cloned();
            (chain.books.len(), listing)
        };
        if let Some(delay) = self.read_delay {
            let index = usize::try_from(index).unwrap_or(len);
            thread::sleep(delay * (len.saturating_sub(index)) as u32);
        }
        self.reads_in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.faults().failing_book == Some(index.to::<u64>()) {
            return Err(ProviderError::Transport(s!("connection reset")));
        }
        let listing = listing.ok_or_else(|| Self::reverted("no such book"))?;
        let data = IBookLibrary::getBookCall::abi_encode_returns(&(
            listing.owner,
            listing.title,
            listing.author,
            listing.image,
            listing.price,
            listing.sold,
            listing.is_read,
        ));
        Ok(data.into())
    }

    fn execute_marketplace(
        chain: &mut Chain,
        from: Address,
        call: IBookLibraryCalls,
    ) -> Result<Method, ProviderError> {
        fn listing(chain: &mut Chain, index: U256) -> Result<&mut Listing, ProviderError> {
            usize::try_from(index)
                .ok()
                .and_then(|index| chain.books.get_mut(index))
                .ok_or_else(|| MockWallet::reverted("no such book"))
        }

        Ok(match call {
            IBookLibraryCalls::addBook(call) => {
                chain.books.push(Listing {
                    owner: from,
                    title: call.title,
                    author: call.author,
                    image: call.image,
                    price: call.price,
                    sold: U256::ZERO,
                    is_read: false,
                });
                Method::AddBook
            }
            IBookLibraryCalls::buyBook(call) => {
                let (owner, price) = {
                    let book = listing(chain, call.index)?;
                    (book.owner, book.price)
                };
                let allowance = chain
                    .allowances
                    .get(&(from, MARKETPLACE))
                    .copied()
                    .unwrap_or_default();
                let balance = chain.balances.get(&from).copied().unwrap_or_default();
                if allowance < price || balance < price {
                    return Err(Self::reverted("transfer failed"));
                }
                chain.allowances.insert((from, MARKETPLACE), allowance - price);
                chain.balances.insert(from, balance - price);
                *chain.balances.entry(owner).or_default() += price;
                listing(chain, call.index)?.sold += U256::from(1);
                Method::BuyBook
            }
            IBookLibraryCalls::removeBook(call) => {
                if listing(chain, call.index)?.owner != from {
                    return Err(Self::reverted("only the owner can remove a book"));
                }
                chain.books.remove(call.index.to::<usize>());
                Method::RemoveBook
            }
            IBookLibraryCalls::markAsRead(call) => {
                listing(chain, call.index)?.is_read = true;
                Method::MarkAsRead
            }
            IBookLibraryCalls::markAsUnread(call) => {
                listing(chain, call.index)?.is_read = false;
                Method::MarkAsUnread
            }
            _ => return Err(Self::reverted("not a transaction")),
        })
    }

    fn submit(&self, method: Method, chain: &mut Chain) -> TxHash {
        chain.nonce += 1;
        let hash = keccak256(chain.nonce.to_be_bytes());
        chain.submitted.push(method);
        hash
    }
}

impl WalletProvider for MockWallet {
    fn request_accounts(&self) -> Result<Vec<Address>, ProviderError> {
        let faults = self.faults();
        if faults.unreachable {
            return Err(ProviderError::Unreachable(s!("http://127.0.0.1:8545")));
        }
        if faults.deny_authorization {
            return Err(RpcError::new(4001, "User rejected the request.").into());
        }
        if faults.no_accounts {
            return Ok(vec![]);
        }
        Ok(vec![self.account])
    }

    fn call(&self, to: Address, data: Bytes) -> Result<Bytes, ProviderError> {
        if to == TOKEN {
            let call = IERC20Calls::abi_decode(&data, true)
                .map_err(|err| ProviderError::Protocol(err.to_string()))?;
            return match call {
                IERC20Calls::balanceOf(call) => {
                    let balance = self.balance_of(call.owner);
                    Ok(IERC20::balanceOfCall::abi_encode_returns(&(balance,)).into())
                }
                _ => Err(Self::reverted("not a view")),
            };
        }
        assert_eq!(to, MARKETPLACE, "call to unknown contract");
        let call = IBookLibraryCalls::abi_decode(&data, true)
            .map_err(|err| ProviderError::Protocol(err.to_string()))?;
        match call {
            IBookLibraryCalls::getBooksLength(_) => {
                self.length_queries.fetch_add(1, Ordering::SeqCst);
                let len = U256::from(self.chain().books.len());
                Ok(IBookLibrary::getBooksLengthCall::abi_encode_returns(&(len,)).into())
            }
            IBookLibraryCalls::getBook(call) => self.read_book(call.index),
            _ => Err(Self::reverted("not a view")),
        }
    }

    fn send_transaction(
        &self,
        from: Address,
        to: Address,
        data: Bytes,
    ) -> Result<TxHash, ProviderError> {
        assert_eq!(from, self.account, "transaction from an unauthorized account");
        self.pass_gate();
        let mut chain = self.chain();
        if to == TOKEN {
            let IERC20Calls::approve(call) = IERC20Calls::abi_decode(&data, true)
                .map_err(|err| ProviderError::Protocol(err.to_string()))?
            else {
                return Err(Self::reverted("unsupported token call"));
            };
            let faults = self.faults();
            if faults.rejected.contains(&Method::Approve) {
                return Err(RpcError::new(4001, "User denied transaction signature.").into());
            }
            let succeeded = !faults.reverted.contains(&Method::Approve);
            if succeeded {
                chain.allowances.insert((from, call.spender), call.amount);
            }
            let hash = self.submit(Method::Approve, &mut chain);
            chain.receipts.insert(hash, succeeded);
            return Ok(hash);
        }

        assert_eq!(to, MARKETPLACE, "transaction to unknown contract");
        let call = IBookLibraryCalls::abi_decode(&data, true)
            .map_err(|err| ProviderError::Protocol(err.to_string()))?;
        let method = match &call {
            IBookLibraryCalls::addBook(_) => Method::AddBook,
            IBookLibraryCalls::buyBook(_) => Method::BuyBook,
            IBookLibraryCalls::removeBook(_) => Method::RemoveBook,
            IBookLibraryCalls::markAsRead(_) => Method::MarkAsRead,
            IBookLibraryCalls::markAsUnread(_) => Method::MarkAsUnread,
            _ => return Err(Self::reverted("not a transaction")),
        };
        let faults = self.faults();
        if faults.rejected.contains(&method) {
            return Err(RpcError::new(4001, "User denied transaction signature.").into());
        }
        let succeeded = !faults.reverted.contains(&method) &&
            Self::execute_marketplace(&mut chain, from, call).is_ok();
        let hash = self.submit(method, &mut chain);
        chain.receipts.insert(hash, succeeded);
        Ok(hash)
    }

    fn transaction_receipt(&self, hash: TxHash) -> Result<Option<TxReceipt>, ProviderError> {
        let queries = self.receipt_queries.fetch_add(1, Ordering::SeqCst);
        if queries < self.faults().pending_receipts {
            return Ok(None);
        }
        Ok(self
            .chain()
            .receipts
            .get(&hash)
            .map(|succeeded| TxReceipt {
                transaction_hash: hash,
                block_number: Some(U64::from(1)),
                status: Some(U64::from(*succeeded as u8)),
            }))
    }
}

/// Notifier recording every notice it was asked to show.
#[derive(Default)]
pub struct Recorder {
    pub notices: Mutex<Vec<Notice>>,
    pub balances: Mutex<Vec<String>>,
    pub hidden: AtomicUsize,
}

impl Recorder {
    pub fn notices(&self) -> Vec<Notice> { self.notices.lock().unwrap().clone() }

    pub fn last(&self) -> Option<Notice> { self.notices.lock().unwrap().last().cloned() }

    pub fn failures(&self) -> Vec<String> {
        self.notices()
            .into_iter()
            .filter(Notice::is_failure)
            .map(|notice| notice.text().to_owned())
            .collect()
    }

    pub fn last_balance(&self) -> Option<String> { self.balances.lock().unwrap().last().cloned() }
}

impl Notifier for Recorder {
    fn show(&self, notice: Notice) { self.notices.lock().unwrap().push(notice); }

    fn hide(&self) { self.hidden.fetch_add(1, Ordering::SeqCst); }

    fn balance(&self, formatted: &str) { self.balances.lock().unwrap().push(formatted.to_owned()); }
}

pub fn options() -> SessionOptions {
    SessionOptions {
        marketplace: MARKETPLACE,
        token: TOKEN,
        receipts: ReceiptPolicy { attempts: 3, interval: Duration::from_millis(1) },
    }
}
