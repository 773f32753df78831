use anyhow::{Context, Result};
use clap::Subcommand;

use crate::config::Config;
use crate::draft::DraftStore;

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum DraftCommand {
    /// Print the saved draft
    Show,
    /// Delete the saved draft
    Clear,
}

pub fn run(command: DraftCommand, config: &Config) -> Result<()> {
    let store = config.draft_store()?;
    match command {
        DraftCommand::Show => match store.load()? {
            Some(envelope) => {
                let rendered =
                    serde_json::to_string_pretty(&envelope).context("failed to encode draft")?;
                println!("{rendered}");
            }
            None => println!("no draft saved at {}", store.path().display()),
        },
        DraftCommand::Clear => {
            if store.clear()? {
                println!("cleared draft {}", store.path().display());
            } else {
                println!("no draft saved at {}", store.path().display());
            }
        }
    }
    Ok(())
}
