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

use core::num::ParseIntError;
use core::str::FromStr;

use alloy_primitives::{Address, U256};

use crate::abi::IBookLibrary::getBookReturn;
use crate::provider::ProviderError;
use crate::TokenAmount;

/// Position of a book in the contract listing array.
///
/// The index is only meaningful inside the fetch cycle which produced it: removals on the
/// contract side may shift the listing.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Display, From)]
#[derive(Serialize)]
#[serde(crate = "serde_crate", transparent)]
#[display(inner)]
pub struct BookIndex(#[from] u64);

#[derive(Clone, PartialEq, Eq, Debug, Display, Error, From)]
#[display("invalid book index: {0}")]
pub struct BookIndexError(#[from] ParseIntError);

impl FromStr for BookIndex {
    type Err = BookIndexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> { Ok(BookIndex(s.trim().parse()?)) }
}

impl From<BookIndex> for U256 {
    fn from(index: BookIndex) -> Self { U256::from(index.0) }
}

impl BookIndex {
    #[inline]
    pub fn to_u64(self) -> u64 { self.0 }
    #[inline]
    pub fn to_usize(self) -> usize { self.0 as usize }
}

/// Book listing as reported by the marketplace contract.
#[derive(Clone, PartialEq, Eq, Debug)]
#[derive(Serialize)]
#[serde(crate = "serde_crate", rename_all = "camelCase")]
pub struct Book {
    pub index: BookIndex,
    pub owner: Address,
    pub title: String,
    pub author: String,
    pub image: String,
    pub price: TokenAmount,
    pub sold: u64,
    pub is_read: bool,
}

impl Book {
    pub fn decode(index: BookIndex, raw: getBookReturn) -> Result<Self, ProviderError> {
        let sold = u64::try_from(raw.sold).map_err(|_| {
            ProviderError::Protocol(format!("sale counter of book #{index} exceeds 64 bits"))
        })?;
        Ok(Book {
            index,
            owner: raw.owner,
            title: raw.title,
            author: raw.author,
            image: raw.image,
            price: TokenAmount::from_units(raw.price),
            sold,
            is_read: raw.isRead,
        })
    }

    /// Whether both records describe the same listing. Sale counter and read status are ignored
    /// since they change during the life of a listing.
    pub fn is_same_listing(&self, other: &Book) -> bool {
        self.index == other.index &&
            self.owner == other.owner &&
            self.title == other.title &&
            self.author == other.author &&
            self.image == other.image &&
            self.price == other.price
    }

    #[inline]
    pub fn is_owned_by(&self, account: Address) -> bool { self.owner == account }

    pub fn read_status(&self) -> &'static str {
        if self.is_read {
            "Read"
        } else {
            "Not Read"
        }
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::address;

    use super::*;

    fn raw(sold: U256) -> getBookReturn {
        getBookReturn {
            owner: address!("00000000000000000000000000000000000000a1"),
            title: s!("T1"),
            author: s!("Au1"),
            image: s!("img1"),
            price: U256::from(1_000_000_000_000_000_000u64),
            sold,
            isRead: false,
        }
    }

    #[test]
    fn decode_tuple() {
        let book = Book::decode(BookIndex::from(3u64), raw(U256::from(7u8))).unwrap();
        assert_eq!(book.index, BookIndex::from(3u64));
        assert_eq!(book.title, "T1");
        assert_eq!(book.author, "Au1");
        assert_eq!(book.image, "img1");
        assert_eq!(book.sold, 7);
        assert_eq!(book.price.to_string(), "1.00");
        assert_eq!(book.read_status(), "Not Read");
        assert!(book.is_owned_by(address!("00000000000000000000000000000000000000a1")));
    }

    #[test]
    fn decode_rejects_huge_counter() {
        let err = Book::decode(BookIndex::from(0u64), raw(U256::MAX)).unwrap_err();
        assert!(matches!(err, ProviderError::Protocol(_)));
    }

    #[test]
    fn same_listing_ignores_mutable_fields() {
        let book = Book::decode(BookIndex::from(0u64), raw(U256::from(1u8))).unwrap();
        let mut sold = book.clone();
        sold.sold += 1;
        sold.is_read = true;
        assert!(book.is_same_listing(&sold));

        let mut other = book.clone();
        other.title = s!("T2");
        assert!(!book.is_same_listing(&other));

        let mut shifted = book.clone();
        shifted.index = BookIndex::from(1u64);
        assert!(!book.is_same_listing(&shifted));
    }

    #[test]
    fn index_from_str() {
        assert_eq!("12".parse::<BookIndex>().unwrap(), BookIndex::from(12u64));
        assert!("-1".parse::<BookIndex>().is_err());
        assert!("one".parse::<BookIndex>().is_err());
    }
}
