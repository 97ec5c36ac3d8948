use std::io;

use clap::{Args, Subcommand};
use sands::accounts::AccountId;
use sands_app::{context::AppContext, domain::accounts::models::NewAccount, reports};

use super::{describe, write_failed};

#[derive(Debug, Args)]
pub(crate) struct AccountCommand {
    #[command(subcommand)]
    command: AccountSubcommand,
}

#[derive(Debug, Subcommand)]
enum AccountSubcommand {
    /// Open an account with no points
    Create(CreateAccountArgs),

    /// Show an account's points, tier and orders
    Show(AccountArgs),

    /// List every account
    List,

    /// Credit the referral bonus to an account
    Referral(AccountArgs),
}

#[derive(Debug, Args)]
struct CreateAccountArgs {
    /// Account identifier
    #[arg(long)]
    id: AccountId,

    /// Display name
    #[arg(long)]
    name: String,
}

#[derive(Debug, Args)]
struct AccountArgs {
    /// Account identifier
    #[arg(long)]
    id: AccountId,
}

pub(crate) async fn run(
    context: &AppContext,
    command: AccountCommand,
    mut out: impl io::Write,
) -> Result<(), String> {
    match command.command {
        AccountSubcommand::Create(args) => {
            let account = context
                .accounts
                .create_account(NewAccount {
                    id: args.id,
                    name: args.name,
                })
                .await
                .map_err(|error| describe("failed to create account", &error))?;

            writeln!(out, "Opened account {} for {}", account.id(), account.name())
                .map_err(|error| write_failed(&error))
        }
        AccountSubcommand::Show(args) => {
            let summary = context
                .accounts
                .summary(&args.id)
                .await
                .map_err(|error| describe("failed to load account", &error))?;

            reports::write_account(out, context.ledger.currency(), &summary)
                .map_err(|error| write_failed(&error))
        }
        AccountSubcommand::List => {
            let accounts = context
                .accounts
                .list_accounts()
                .await
                .map_err(|error| describe("failed to list accounts", &error))?;

            reports::write_accounts(out, &accounts).map_err(|error| write_failed(&error))
        }
        AccountSubcommand::Referral(args) => {
            let account = context
                .accounts
                .award_referral(&args.id)
                .await
                .map_err(|error| describe("failed to credit referral", &error))?;

            writeln!(
                out,
                "Referral credited: {} now has {} points ({})",
                account.id(),
                account.points(),
                account.tier()
            )
            .map_err(|error| write_failed(&error))
        }
    }
}
