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

use std::env;

use log::LevelFilter;

/// Logging verbosity selected with repeated `-v` flags.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Display)]
pub enum LogLevel {
    /// Only errors. Notices are still printed to `stderr` by the banner.
    #[display("error")]
    Error = 0,

    /// `-v`: failed operations and other warnings.
    #[display("warn")]
    Warn,

    /// `-vv`: notices, authorized account and submitted transactions.
    #[display("info")]
    Info,

    /// `-vvv`: contract calls and receipt polling.
    #[display("debug")]
    Debug,

    /// `-vvvv`: raw JSON-RPC traffic.
    #[display("trace")]
    Trace,
}

impl From<u8> for LogLevel {
    fn from(val: u8) -> Self { Self::from_verbosity_flag_count(val) }
}

impl LogLevel {
    pub fn from_verbosity_flag_count(level: u8) -> Self {
        match level {
            0 => LogLevel::Error,
            1 => LogLevel::Warn,
            2 => LogLevel::Info,
            3 => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }

    /// Initializes the logger. An explicit `RUST_LOG` takes precedence over the flag count.
    pub fn apply(&self) {
        log::set_max_level(LevelFilter::Trace);
        let filter = env::var("RUST_LOG").unwrap_or_else(|_| self.to_string());
        env_logger::Builder::new()
            .parse_filters(&filter)
            .format_timestamp(None)
            .init();
    }
}
