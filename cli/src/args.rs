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

use std::path::PathBuf;

use anyhow::Context;
use bookmarket::{
    Banner, Config, JsonRpcProvider, ProviderError, Session, CONFIG_FILE,
};
use clap::ValueHint;

use crate::cmd::Cmd;

pub const BOOKLIB_DATA_DIR_ENV: &str = "BOOKLIB_DATA_DIR";
pub const BOOKLIB_PROVIDER_ENV: &str = "BOOKLIB_PROVIDER";

#[cfg(any(
    target_os = "linux",
    target_os = "freebsd",
    target_os = "openbsd",
    target_os = "netbsd"
))]
pub const BOOKLIB_DATA_DIR: &str = "~/.booklib";
#[cfg(target_os = "macos")]
pub const BOOKLIB_DATA_DIR: &str = "~/Library/Application Support/BookLibrary";
#[cfg(target_os = "windows")]
pub const BOOKLIB_DATA_DIR: &str = "~\\AppData\\Local\\BookLibrary";
#[cfg(not(any(
    target_os = "linux",
    target_os = "freebsd",
    target_os = "openbsd",
    target_os = "netbsd",
    target_os = "macos",
    target_os = "windows"
)))]
pub const BOOKLIB_DATA_DIR: &str = ".";

pub type CliSession = Session<JsonRpcProvider, Banner>;

#[derive(Parser, Clone, PartialEq, Eq, Debug)]
#[command(author, version, about)]
pub struct Args {
    /// Set verbosity level.
    ///
    /// Can be used multiple times to increase verbosity.
    #[clap(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Location of the data directory holding the configuration file
    #[clap(
        short,
        long,
        global = true,
        default_value = BOOKLIB_DATA_DIR,
        env = BOOKLIB_DATA_DIR_ENV,
        value_hint = ValueHint::DirPath
    )]
    pub data_dir: PathBuf,

    /// JSON-RPC endpoint of the wallet provider; overrides the configuration file
    #[clap(short, long, global = true, env = BOOKLIB_PROVIDER_ENV, value_hint = ValueHint::Url)]
    pub provider: Option<String>,

    /// Command to execute
    #[clap(subcommand)]
    pub command: Cmd,
}

impl Args {
    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.data_dir.display().to_string()).to_string())
    }

    pub fn config_path(&self) -> PathBuf { self.data_dir().join(CONFIG_FILE) }

    /// Configuration file contents with command-line overrides applied.
    pub fn config(&self) -> anyhow::Result<Config> {
        let path = self.config_path();
        let mut config = Config::load(&path)
            .with_context(|| format!("Unable to load configuration from '{}'", path.display()))?;
        if let Some(provider) = &self.provider {
            config.provider = Some(provider.clone());
        }
        Ok(config)
    }

    /// Connects to the configured wallet provider. An endpoint which does not answer is treated
    /// as an absent provider.
    pub fn provider(&self, config: &Config) -> anyhow::Result<Option<JsonRpcProvider>> {
        let Some(url) = &config.provider else {
            debug!("No wallet provider configured");
            return Ok(None);
        };
        match JsonRpcProvider::detect(url, config.timeout()) {
            Ok((provider, _)) => Ok(Some(provider)),
            Err(ProviderError::Unreachable(url)) => {
                warn!("Wallet provider at {url} does not respond");
                Ok(None)
            }
            Err(err) => {
                Err(err).with_context(|| format!("Unable to connect to wallet provider at {url}"))
            }
        }
    }

    /// Authorizes with the wallet and loads the balance and the listing.
    pub fn session(&self, config: &Config) -> anyhow::Result<CliSession> {
        let provider = self.provider(config)?;
        let session = Session::start(provider, Banner::new(), config.session_options())?;
        Ok(session)
    }
}
