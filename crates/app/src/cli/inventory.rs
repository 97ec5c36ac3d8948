use std::io;

use clap::{Args, Subcommand};
use sands::products::ProductId;
use sands_app::{context::AppContext, reports};

use super::{describe, write_failed};

#[derive(Debug, Args)]
pub(crate) struct InventoryCommand {
    #[command(subcommand)]
    command: InventorySubcommand,
}

#[derive(Debug, Subcommand)]
enum InventorySubcommand {
    /// Show stock for every product with a record
    List,

    /// Override a product's stock count
    Set(SetStockArgs),
}

#[derive(Debug, Args)]
struct SetStockArgs {
    /// Product identifier
    #[arg(long)]
    product: ProductId,

    /// New stock count
    #[arg(long, allow_negative_numbers = true)]
    stock: i64,
}

pub(crate) async fn run(
    context: &AppContext,
    command: InventoryCommand,
    mut out: impl io::Write,
) -> Result<(), String> {
    match command.command {
        InventorySubcommand::List => {
            let reports = context
                .inventory
                .stock_report()
                .await
                .map_err(|error| describe("failed to read inventory", &error))?;

            reports::write_inventory(out, &context.catalog, &reports)
                .map_err(|error| write_failed(&error))
        }
        InventorySubcommand::Set(args) => {
            if context.catalog.get(&args.product).is_none() {
                return Err(format!("unknown product {}", args.product));
            }

            let stock = context
                .inventory
                .set_stock(&args.product, args.stock)
                .await
                .map_err(|error| describe("failed to set stock", &error))?;

            writeln!(out, "Stock for product {} set to {stock}", args.product)
                .map_err(|error| write_failed(&error))
        }
    }
}
