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

use core::fmt::{self, Display, Formatter};
use core::str::FromStr;

use alloy_primitives::U256;
use serde::{Serialize, Serializer};

/// Number of decimals used by the payment token (cUSD and any other ERC-20 following the same
/// convention).
pub const DECIMALS: u8 = 18;

/// Number of fraction digits shown to the user.
pub const DISPLAY_DIGITS: u8 = 2;

#[derive(Clone, PartialEq, Eq, Debug, Display, Error)]
#[display(doc_comments)]
pub enum AmountError {
    /// empty token amount.
    Empty,

    /// '{0}' is not a valid decimal token amount.
    Malformed(String),

    /// token amount '{0}' has more than 18 fraction digits.
    TooPrecise(String),

    /// token amount '{0}' does not fit into 256 bits.
    Overflow(String),
}

/// Token amount kept in the smallest indivisible units of the token.
///
/// Amounts are never converted into floating point: the decimal representation is produced from
/// the integer units with round-half-up semantics.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct TokenAmount(U256);

impl From<U256> for TokenAmount {
    fn from(units: U256) -> Self { Self(units) }
}

impl From<TokenAmount> for U256 {
    fn from(amount: TokenAmount) -> Self { amount.0 }
}

impl TokenAmount {
    pub const ZERO: Self = TokenAmount(U256::ZERO);

    #[inline]
    pub fn from_units(units: U256) -> Self { Self(units) }

    #[inline]
    pub fn units(&self) -> U256 { self.0 }

    #[inline]
    pub fn is_zero(&self) -> bool { self.0.is_zero() }

    /// Parses an amount given in human-readable token units (like `"1.5"`) and scales it up by
    /// [`DECIMALS`].
    pub fn parse_decimal(s: &str) -> Result<Self, AmountError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(AmountError::Empty);
        }
        let (int, frac) = s.split_once('.').unwrap_or((s, ""));
        if int.is_empty() && frac.is_empty() {
            return Err(AmountError::Malformed(s.to_owned()));
        }
        if !int.bytes().chain(frac.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(AmountError::Malformed(s.to_owned()));
        }
        // trailing zeros in the fraction carry no precision
        let frac = frac.trim_end_matches('0');
        if frac.len() > DECIMALS as usize {
            return Err(AmountError::TooPrecise(s.to_owned()));
        }

        let overflow = || AmountError::Overflow(s.to_owned());
        let int = if int.is_empty() {
            U256::ZERO
        } else {
            U256::from_str_radix(int, 10).map_err(|_| overflow())?
        };
        let frac = if frac.is_empty() {
            U256::ZERO
        } else {
            U256::from_str_radix(frac, 10).map_err(|_| overflow())?
                * pow10(DECIMALS - frac.len() as u8)
        };
        int.checked_mul(pow10(DECIMALS))
            .and_then(|units| units.checked_add(frac))
            .map(Self)
            .ok_or_else(overflow)
    }

    /// Formats the amount in token units with exactly `digits` fraction digits, rounding half up.
    pub fn to_fixed(&self, digits: u8) -> String {
        let digits = digits.min(DECIMALS);
        let scale = pow10(DECIMALS - digits);
        let mut scaled = self.0 / scale;
        let rem = self.0 % scale;
        if scale > U256::from(1u8) && rem >= scale - rem {
            scaled = scaled.saturating_add(U256::from(1u8));
        }
        if digits == 0 {
            return scaled.to_string();
        }
        let unit = pow10(digits);
        let int = scaled / unit;
        let frac = (scaled % unit).to_string();
        format!("{int}.{frac:0>width$}", width = digits as usize)
    }
}

fn pow10(exp: u8) -> U256 { U256::from(10u8).pow(U256::from(exp)) }

impl FromStr for TokenAmount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> { Self::parse_decimal(s) }
}

impl Display for TokenAmount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_fixed(DISPLAY_DIGITS))
    }
}

impl Serialize for TokenAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}
