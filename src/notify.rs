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

use std::sync::{Mutex, PoisonError};

#[derive(Clone, PartialEq, Eq, Hash, Debug, Display)]
pub enum Notice {
    #[display("⌛ {0}")]
    Pending(String),

    #[display("🎉 {0}")]
    Success(String),

    #[display("⚠️ {0}")]
    Failure(String),

    /// Request for the user to act in the wallet.
    #[display("⚠️ {0}")]
    Attention(String),

    #[display(inner)]
    Info(String),
}

impl Notice {
    pub fn text(&self) -> &str {
        match self {
            Notice::Pending(text)
            | Notice::Success(text)
            | Notice::Failure(text)
            | Notice::Attention(text)
            | Notice::Info(text) => text,
        }
    }

    #[inline]
    pub fn is_failure(&self) -> bool { matches!(self, Notice::Failure(_)) }
}

/// User-facing notification surface.
///
/// There is a single banner: every `show` replaces the previous notice.
pub trait Notifier: Send + Sync {
    fn show(&self, notice: Notice);

    fn hide(&self);

    /// Updates the displayed account balance.
    fn balance(&self, _formatted: &str) {}
}

impl<N: Notifier + ?Sized> Notifier for Box<N> {
    fn show(&self, notice: Notice) { (**self).show(notice) }
    fn hide(&self) { (**self).hide() }
    fn balance(&self, formatted: &str) { (**self).balance(formatted) }
}

/// Terminal banner printing notices to `stderr`.
#[derive(Debug, Default)]
pub struct Banner {
    current: Mutex<Option<Notice>>,
    balance: Mutex<Option<String>>,
}

impl Banner {
    pub fn new() -> Self { Banner::default() }

    /// Notice currently visible, if any.
    pub fn current(&self) -> Option<Notice> {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn displayed_balance(&self) -> Option<String> {
        self.balance
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Notifier for Banner {
    fn show(&self, notice: Notice) {
        match &notice {
            Notice::Failure(_) | Notice::Attention(_) => warn!("{notice}"),
            _ => info!("{notice}"),
        }
        eprintln!("{notice}");
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = Some(notice);
    }

    fn hide(&self) {
        if let Some(notice) = self
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            trace!("Notice '{notice}' dismissed");
        }
    }

    fn balance(&self, formatted: &str) {
        debug!("Balance: {formatted}");
        *self.balance.lock().unwrap_or_else(PoisonError::into_inner) = Some(formatted.to_owned());
    }
}

/// Notifier which only logs.
#[derive(Copy, Clone, Debug, Default)]
pub struct Silent;

impl Notifier for Silent {
    fn show(&self, notice: Notice) { debug!("{notice}") }
    fn hide(&self) {}
}
