use std::io;

use clap::{Args, Subcommand};
use sands::{accounts::AccountId, orders::OrderId};
use sands_app::{context::AppContext, reports};

use super::{describe, write_failed};

#[derive(Debug, Args)]
pub(crate) struct OrdersCommand {
    #[command(subcommand)]
    command: OrdersSubcommand,
}

#[derive(Debug, Subcommand)]
enum OrdersSubcommand {
    /// Every order, newest first
    List,

    /// Move an order to its next fulfilment status
    Advance(AdvanceOrderArgs),
}

#[derive(Debug, Args)]
struct AdvanceOrderArgs {
    /// Account that placed the order
    #[arg(long)]
    account: AccountId,

    /// Order identifier
    #[arg(long)]
    order: OrderId,
}

pub(crate) async fn run(
    context: &AppContext,
    command: OrdersCommand,
    mut out: impl io::Write,
) -> Result<(), String> {
    match command.command {
        OrdersSubcommand::List => {
            let records = context
                .orders
                .all_orders()
                .await
                .map_err(|error| describe("failed to read orders", &error))?;

            reports::write_orders(out, context.ledger.currency(), &records)
                .map_err(|error| write_failed(&error))
        }
        OrdersSubcommand::Advance(args) => {
            let record = context
                .orders
                .advance(&args.account, &args.order)
                .await
                .map_err(|error| describe("failed to advance order", &error))?;

            writeln!(out, "Order {} is now {}", record.order.id, record.order.status)
                .map_err(|error| write_failed(&error))
        }
    }
}
