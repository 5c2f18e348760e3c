use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::{Result, eyre::eyre};

#[derive(Parser)]
#[command(name = "vestibule", version, about = "Terminal client for account flows")]
pub struct Cli {
    /// Directory for accounts.json, codes.json and the log file.
    /// Defaults to the platform data directory.
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub cmd: Cmd,
}

#[derive(Subcommand)]
pub enum Cmd {
    /// Run the interactive TUI
    Run,
    /// Add a redeemable gift code (scripts/testing)
    Grant {
        code: String,
        #[arg(default_value = "100 coins")]
        reward: String,
    },
}

impl Cli {
    pub fn resolve_data_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        let dirs = directories::ProjectDirs::from("", "", "vestibule")
            .ok_or_else(|| eyre!("could not determine a data directory, pass --data-dir"))?;
        Ok(dirs.data_dir().to_path_buf())
    }
}
