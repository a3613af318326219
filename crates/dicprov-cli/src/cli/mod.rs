//! CLI for the dicprov dictionary provisioner.

mod commands;
mod context;

use anyhow::Result;
use clap::{Parser, Subcommand};
use dicprov_core::config;
use std::path::Path;

use commands::{run_checksum, run_fetch, run_list, run_path};
use context::AppContext;

/// Top-level CLI for the dicprov dictionary provisioner.
#[derive(Debug, Parser)]
#[command(name = "dicprov")]
#[command(about = "dicprov: provision builtin and downloadable keyboard dictionaries", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Provision the dictionary for a language, downloading it if needed.
    Fetch {
        /// Language identifier (e.g. nl, zh_TW).
        lang: String,
        /// Give up waiting for a download after this many seconds.
        #[arg(long, default_value = "300", value_name = "SECS")]
        timeout_secs: u64,
    },

    /// List catalog dictionaries and whether they are stored locally.
    List,

    /// Print the local path of a stored dictionary without downloading anything.
    Path {
        /// Language identifier.
        lang: String,
    },

    /// Compute SHA-256 of a file (e.g. to publish in the dictionary manifest).
    Checksum {
        /// Path to the file.
        path: String,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Fetch { lang, timeout_secs } => {
                let ctx = AppContext::from_config(&cfg)?;
                run_fetch(&ctx, &lang, timeout_secs).await?;
            }
            CliCommand::List => run_list(&AppContext::from_config(&cfg)?).await?,
            CliCommand::Path { lang } => run_path(&AppContext::from_config(&cfg)?, &lang).await?,
            CliCommand::Checksum { path } => run_checksum(Path::new(&path)).await?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
