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

use bookmarket::BookIndex;
use clap::ValueHint;

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default, Display, ValueEnum)]
#[display(lowercase)]
pub enum Format {
    #[default]
    Table,
    Yaml,
    Json,
}

#[derive(Subcommand, Clone, PartialEq, Eq, Debug, Display)]
pub enum Cmd {
    /// Write the configuration file with default values
    #[display("init")]
    Init {
        /// Overwrite an existing configuration file
        #[clap(short, long)]
        force: bool,
    },

    /// Print the effective configuration
    #[display("config")]
    Config,

    /// Show the token balance of the authorized account
    #[display("balance")]
    Balance,

    /// List books offered on the marketplace
    #[display("books")]
    Books {
        /// Output format
        #[clap(short, long, default_value_t = Format::Table)]
        format: Format,
    },

    /// Render the listing as an HTML page
    #[display("render")]
    Render {
        /// File to write the page to; prints to STDOUT if omitted
        #[clap(value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
    },

    /// Offer a new book for sale
    #[display("add")]
    Add {
        /// Book title
        #[clap(long)]
        title: String,

        /// Book author
        #[clap(long)]
        author: String,

        /// URL of the cover image
        #[clap(long, value_hint = ValueHint::Url)]
        image: String,

        /// Price in cUSD, with up to 18 fractional digits
        #[clap(long)]
        price: String,
    },

    /// Buy a book, approving the payment first
    #[display("buy")]
    Buy {
        /// Index of the book in the listing
        index: BookIndex,
    },

    /// Remove one of your books from the marketplace
    #[display("delete")]
    Delete {
        /// Index of the book in the listing
        index: BookIndex,
    },

    /// Flip the read status of a book
    #[display("toggle-read")]
    ToggleRead {
        /// Index of the book in the listing
        index: BookIndex,
    },
}
