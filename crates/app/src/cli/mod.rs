use std::{error::Error, io};

use clap::{Parser, Subcommand};
use sands_app::{
    config::{self, AppConfig},
    context::AppContext,
};

mod account;
mod cart;
mod catalog;
mod inventory;
mod orders;
mod review;

#[derive(Debug, Parser)]
#[command(
    name = "sands",
    about = "Sands & Souls loyalty points and inventory ledger",
    long_about = None
)]
pub(crate) struct Cli {
    #[command(flatten)]
    pub(crate) config: AppConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Loyalty accounts
    Account(account::AccountCommand),

    /// Products on sale
    Catalog,

    /// Stock levels
    Inventory(inventory::InventoryCommand),

    /// Price a cart without placing an order
    Quote(cart::CartArgs),

    /// Place an order
    Checkout(cart::CartArgs),

    /// Product reviews
    Review(review::ReviewCommand),

    /// Store-wide order log
    Orders(orders::OrdersCommand),
}

impl Cli {
    /// Parse the command line after loading `.env`, so its values can fill in flags.
    pub(crate) fn load() -> Self {
        config::load_dotenv();

        Self::parse()
    }

    pub(crate) async fn run(self) -> Result<(), String> {
        let context = AppContext::from_config(&self.config)
            .await
            .map_err(|error| describe("failed to open ledger", &error))?;

        let out = io::stdout().lock();

        match self.command {
            Commands::Account(command) => account::run(&context, command, out).await,
            Commands::Catalog => catalog::run(&context, out),
            Commands::Inventory(command) => inventory::run(&context, command, out).await,
            Commands::Quote(args) => cart::quote(&context, args, out).await,
            Commands::Checkout(args) => cart::checkout(&context, args, out).await,
            Commands::Review(command) => review::run(&context, command, out).await,
            Commands::Orders(command) => orders::run(&context, command, out).await,
        }
    }
}

/// `context: error: source: ...`, following the error's source chain.
pub(crate) fn describe(context: &str, error: &dyn Error) -> String {
    let mut message = format!("{context}: {error}");
    let mut source = error.source();

    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }

    message
}

pub(crate) fn write_failed(error: &io::Error) -> String {
    describe("failed to write output", error)
}
