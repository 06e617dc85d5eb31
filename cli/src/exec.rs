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

use anyhow::Context;
use bookmarket::{render, Config, WriteOutcome};

use crate::args::Args;
use crate::cmd::{Cmd, Format};

impl Args {
    pub fn exec(&self) -> anyhow::Result<()> {
        match &self.command {
            Cmd::Init { force } => {
                let path = self.config_path();
                if path.exists() && !force {
                    anyhow::bail!(
                        "configuration file '{}' already exists; use `--force` to overwrite it",
                        path.display()
                    );
                }
                let config = Config { provider: self.provider.clone(), ..Config::default() };
                config
                    .store(&path)
                    .with_context(|| format!("Unable to write '{}'", path.display()))?;
                eprintln!("Configuration written to '{}'", path.display());
            }

            Cmd::Config => {
                print!("{}", self.config()?.to_toml()?);
            }

            Cmd::Balance => {
                let config = self.config()?;
                let session = self.session(&config)?;
                println!("{}", session.account());
                println!("{} {}", session.balance()?, render::TOKEN_SYMBOL);
            }

            Cmd::Books { format } => {
                let config = self.config()?;
                let session = self.session(&config)?;
                let books = session.books();
                match format {
                    Format::Table => print!("{}", render::table(&books, Some(session.account()))),
                    Format::Yaml => {
                        println!("---");
                        print!(
                            "{}",
                            serde_yaml::to_string(&*books).context("Unable to generate YAML")?
                        );
                    }
                    Format::Json => println!(
                        "{}",
                        serde_json::to_string_pretty(&*books).context("Unable to generate JSON")?
                    ),
                }
            }

            Cmd::Render { output } => {
                let config = self.config()?;
                let session = self.session(&config)?;
                let balance = session.notifier().displayed_balance();
                let html = render::page(
                    &session.books(),
                    Some(session.account()),
                    balance.as_deref(),
                    &config.explorer,
                );
                match output {
                    Some(path) => {
                        fs::write(path, html)
                            .with_context(|| format!("Unable to write '{}'", path.display()))?;
                        eprintln!("Listing rendered to '{}'", path.display());
                    }
                    None => print!("{html}"),
                }
            }

            Cmd::Add { title, author, image, price } => {
                let config = self.config()?;
                let session = self.session(&config)?;
                report(session.add_book(title, author, image, price)?)?;
            }

            Cmd::Buy { index } => {
                let config = self.config()?;
                let session = self.session(&config)?;
                report(session.buy_book(*index)?)?;
            }

            Cmd::Delete { index } => {
                let config = self.config()?;
                let session = self.session(&config)?;
                report(session.delete_book(*index)?)?;
            }

            Cmd::ToggleRead { index } => {
                let config = self.config()?;
                let session = self.session(&config)?;
                report(session.toggle_read(*index)?)?;
            }
        }

        Ok(())
    }
}

fn report(outcome: WriteOutcome) -> anyhow::Result<()> {
    if let Err(err) = &outcome.refresh {
        warn!("Listing was not refreshed: {err}");
    }
    let hash = outcome.into_result()?;
    println!("{hash}");
    Ok(())
}
