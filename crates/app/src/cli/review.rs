use std::io;

use clap::{Args, Subcommand};
use sands::{accounts::AccountId, products::ProductId, reviews::Rating};
use sands_app::{context::AppContext, domain::reviews::models::NewReview, reports};

use super::{describe, write_failed};

#[derive(Debug, Args)]
pub(crate) struct ReviewCommand {
    #[command(subcommand)]
    command: ReviewSubcommand,
}

#[derive(Debug, Subcommand)]
enum ReviewSubcommand {
    /// Review a purchased product and earn the review bonus
    Submit(SubmitReviewArgs),

    /// Show a product's reviews
    List(ListReviewsArgs),
}

#[derive(Debug, Args)]
struct SubmitReviewArgs {
    /// Reviewing account
    #[arg(long)]
    account: AccountId,

    /// Reviewed product
    #[arg(long)]
    product: ProductId,

    /// Star rating from 1 to 5
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=5))]
    rating: u8,

    /// Review text
    #[arg(long, default_value = "")]
    comment: String,
}

#[derive(Debug, Args)]
struct ListReviewsArgs {
    /// Product identifier
    #[arg(long)]
    product: ProductId,
}

pub(crate) async fn run(
    context: &AppContext,
    command: ReviewCommand,
    mut out: impl io::Write,
) -> Result<(), String> {
    match command.command {
        ReviewSubcommand::Submit(args) => {
            let rating =
                Rating::try_from(args.rating).map_err(|error| describe("invalid rating", &error))?;

            let accepted = context
                .reviews
                .submit(
                    &args.account,
                    NewReview {
                        product_id: args.product,
                        rating,
                        comment: args.comment,
                    },
                )
                .await
                .map_err(|error| describe("review rejected", &error))?;

            writeln!(
                out,
                "Review {} accepted; {} now has {} points ({})",
                accepted.review.id,
                accepted.account.id(),
                accepted.account.points(),
                accepted.account.tier()
            )
            .map_err(|error| write_failed(&error))
        }
        ReviewSubcommand::List(args) => {
            let reviews = context
                .reviews
                .product_reviews(&args.product)
                .await
                .map_err(|error| describe("failed to read reviews", &error))?;

            reports::write_reviews(out, &context.catalog, &args.product, &reviews)
                .map_err(|error| write_failed(&error))
        }
    }
}
