mod action;
mod app;
mod cli;
mod components;
mod errors;
mod locale;
mod logging;
mod sfx;
mod shell;
mod style;
mod tui;
mod validate;

use clap::Parser;
use color_eyre::Result;

use crate::app::App;
use crate::cli::{Cli, Cmd};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    let data_dir = args.resolve_data_dir()?;
    crate::errors::init()?;
    crate::logging::init(&data_dir)?;

    match args.cmd {
        Cmd::Run => {
            let mut app = App::new(data_dir)?;
            app.run().await?;
        }
        Cmd::Grant { code, reward } => {
            let ledger = session::GiftCodeLedger::new(&data_dir);
            ledger.grant(&code, &reward)?;
            println!("granted gift code {code}");
        }
    }
    Ok(())
}
