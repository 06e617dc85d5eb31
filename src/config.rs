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

use std::fs;
use std::io::{self, ErrorKind};
use std::path::Path;
use std::time::Duration;

use alloy_primitives::{address, Address};
use amplify::IoError;

use crate::{ReceiptPolicy, SessionOptions};

pub const CONFIG_FILE: &str = "config.toml";

/// `BookLibrary` deployment on the Celo Alfajores testnet.
pub const DEFAULT_MARKETPLACE: Address = address!("8dc37A19cCeF8699BbA6e0Ac582aD31774AdbfF5");
/// cUSD token on the Celo Alfajores testnet.
pub const DEFAULT_TOKEN: Address = address!("874069Fa1Eb16D44d622F2e0Ca25eeA172369bC1");
pub const DEFAULT_EXPLORER: &str = "https://alfajores-blockscout.celo-testnet.org";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Display, Error, From)]
#[display(doc_comments)]
pub enum ConfigError {
    /// unable to access configuration file: {0}
    #[from]
    #[from(io::Error)]
    Io(IoError),

    /// configuration file is invalid: {0}
    #[from]
    Parse(toml::de::Error),

    /// unable to serialize configuration: {0}
    #[from]
    Serialize(toml::ser::Error),
}

#[derive(Clone, PartialEq, Eq, Debug)]
#[derive(Serialize, Deserialize)]
#[serde(crate = "serde_crate", rename_all = "kebab-case", default)]
pub struct Config {
    /// JSON-RPC endpoint of the wallet provider. No provider means the client cannot talk to the
    /// contracts at all.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    pub marketplace: Address,
    pub token: Address,
    /// Block explorer used for owner links on rendered cards.
    pub explorer: String,
    pub timeout_secs: u64,
    pub receipt_attempts: u32,
    pub receipt_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        let receipts = ReceiptPolicy::default();
        Config {
            provider: None,
            marketplace: DEFAULT_MARKETPLACE,
            token: DEFAULT_TOKEN,
            explorer: DEFAULT_EXPLORER.to_owned(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            receipt_attempts: receipts.attempts,
            receipt_interval_ms: receipts.interval.as_millis() as u64,
        }
    }
}

impl Config {
    /// Loads configuration from `path`; an absent file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(text) => {
                debug!("Loading configuration from '{}'", path.display());
                Ok(toml::from_str(&text)?)
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("No configuration at '{}', using defaults", path.display());
                Ok(Config::default())
            }
            Err(err) => Err(err.into()),
        }
    }

    pub fn store(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> { Ok(toml::to_string_pretty(self)?) }

    #[inline]
    pub fn timeout(&self) -> Duration { Duration::from_secs(self.timeout_secs) }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            marketplace: self.marketplace,
            token: self.token,
            receipts: ReceiptPolicy {
                attempts: self.receipt_attempts,
                interval: Duration::from_millis(self.receipt_interval_ms),
            },
        }
    }
}
