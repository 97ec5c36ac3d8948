//! Reports
//!
//! Plain-text tables for the command line.

use std::io;

use rust_decimal::Decimal;
use rusty_money::iso::Currency;
use sands::{
    accounts::{Account, AccountId},
    catalog::Catalog,
    checkout::CheckoutPlan,
    inventory::StockLevel,
    orders::{LineItem, Order},
    products::ProductId,
};
use tabled::{
    builder::Builder,
    settings::{
        Alignment, Style,
        object::{Columns, Rows},
    },
};

use crate::domain::{
    accounts::models::AccountSummary,
    checkout::models::CheckoutReceipt,
    inventory::models::StockReport,
    orders::models::OrderRecord,
    reviews::models::ProductReviews,
};

/// Format minor units as a decimal amount with the currency code, e.g. `55.000 KWD`.
pub fn format_amount(minor: i128, currency: &Currency) -> String {
    let amount = Decimal::from_i128_with_scale(minor, currency.exponent);

    format!("{amount} {}", currency.iso_alpha_code)
}

fn format_stored(minor: u64, currency: &Currency) -> String {
    format_amount(i128::from(minor), currency)
}

fn product_name<'a>(catalog: &'a Catalog, id: &ProductId) -> &'a str {
    catalog
        .get(id)
        .map_or("(not in catalog)", |product| product.name.as_str())
}

fn stock_status(level: StockLevel) -> &'static str {
    match level {
        StockLevel::SoldOut => "sold out",
        StockLevel::Low(_) => "low stock",
        StockLevel::InStock(_) => "in stock",
    }
}

fn write_table(
    out: &mut impl io::Write,
    builder: Builder,
    numeric_columns: &[usize],
) -> io::Result<()> {
    let mut table = builder.build();

    table.with(Style::modern_rounded());

    for &column in numeric_columns {
        table.modify(Columns::one(column), Alignment::right());
    }

    table.modify(Rows::first(), Alignment::left());

    writeln!(out, "{table}")
}

/// Products on sale with their prices, followed by the sizes offered.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn write_catalog(mut out: impl io::Write, catalog: &Catalog) -> io::Result<()> {
    let mut builder = Builder::default();
    builder.push_record(["Product", "Name", "Brand", "Category", "Price"]);

    for product in catalog.products() {
        builder.push_record([
            product.id.to_string(),
            product.name.clone(),
            product.brand.clone(),
            product.category.to_string(),
            format_amount(
                i128::from(product.price.to_minor_units()),
                catalog.currency(),
            ),
        ]);
    }

    write_table(&mut out, builder, &[4])?;

    writeln!(out, "Sizes: {}", catalog.sizes().join(", "))
}

/// Every account with its tier and balance.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn write_accounts(mut out: impl io::Write, accounts: &[Account]) -> io::Result<()> {
    if accounts.is_empty() {
        return writeln!(out, "No accounts.");
    }

    let mut builder = Builder::default();
    builder.push_record(["Account", "Name", "Tier", "Points", "Orders"]);

    for account in accounts {
        builder.push_record([
            account.id().to_string(),
            account.name().to_owned(),
            account.tier().to_string(),
            account.points().to_string(),
            account.orders().len().to_string(),
        ]);
    }

    write_table(&mut out, builder, &[3, 4])
}

/// Stock of every product with a record, named from the catalog.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn write_inventory(
    mut out: impl io::Write,
    catalog: &Catalog,
    reports: &[StockReport],
) -> io::Result<()> {
    if reports.is_empty() {
        return writeln!(out, "No stock records.");
    }

    let mut builder = Builder::default();
    builder.push_record(["Product", "Name", "Stock", "Status"]);

    for report in reports {
        builder.push_record([
            report.product_id.to_string(),
            product_name(catalog, &report.product_id).to_owned(),
            report.stock.to_string(),
            stock_status(report.level).to_owned(),
        ]);
    }

    write_table(&mut out, builder, &[2])
}

/// An account's balance, tier progress and order history.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn write_account(
    mut out: impl io::Write,
    currency: &Currency,
    summary: &AccountSummary,
) -> io::Result<()> {
    let account = &summary.account;
    let progress = &summary.progress;

    writeln!(out, "{} ({})", account.name(), account.id())?;
    writeln!(out, "Tier:    {}", progress.tier)?;
    writeln!(out, "Points:  {}", account.points())?;

    match progress.next {
        Some(next) => writeln!(
            out,
            "Next:    {next} in {} points ({}% of the way)",
            progress.points_to_next, progress.percent
        )?,
        None => writeln!(out, "Next:    top tier reached")?,
    }

    writeln!(out)?;

    if account.orders().is_empty() {
        return writeln!(out, "No orders yet.");
    }

    write_order_rows(&mut out, currency, account.orders().iter().map(|order| (None, order)))
}

/// The store-wide order log.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn write_orders(
    mut out: impl io::Write,
    currency: &Currency,
    records: &[OrderRecord],
) -> io::Result<()> {
    if records.is_empty() {
        return writeln!(out, "No orders.");
    }

    write_order_rows(
        &mut out,
        currency,
        records
            .iter()
            .map(|record| (Some(&record.account_id), &record.order)),
    )
}

fn write_order_rows<'a>(
    out: &mut impl io::Write,
    currency: &Currency,
    orders: impl Iterator<Item = (Option<&'a AccountId>, &'a Order)>,
) -> io::Result<()> {
    let mut builder = Builder::default();
    builder.push_record([
        "Order", "Account", "Placed", "Status", "Items", "Total", "Discount", "Points",
    ]);

    for (account, order) in orders {
        builder.push_record([
            order.id.to_string(),
            account.map_or_else(String::new, ToString::to_string),
            order.created_at.strftime("%Y-%m-%d %H:%M").to_string(),
            order.status.to_string(),
            order.items.len().to_string(),
            format_stored(order.total, currency),
            format_stored(order.discount_applied, currency),
            format!("+{} / -{}", order.points_earned, order.points_redeemed),
        ]);
    }

    write_table(out, builder, &[4, 5, 6])
}

fn write_line_items(
    out: &mut impl io::Write,
    catalog: &Catalog,
    items: &[LineItem],
) -> io::Result<()> {
    let mut builder = Builder::default();
    builder.push_record(["Product", "Name", "Size", "Price"]);

    for item in items {
        builder.push_record([
            item.product_id.to_string(),
            product_name(catalog, &item.product_id).to_owned(),
            item.size.clone(),
            format_stored(item.unit_price, catalog.currency()),
        ]);
    }

    write_table(out, builder, &[3])
}

/// A priced cart: line items, discount, total and the points it earns.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn write_quote(
    mut out: impl io::Write,
    catalog: &Catalog,
    items: &[LineItem],
    plan: &CheckoutPlan<'_>,
) -> io::Result<()> {
    let currency = plan.subtotal().currency();
    let redemption = plan.redemption();

    write_line_items(&mut out, catalog, items)?;

    writeln!(
        out,
        "Subtotal:        {}",
        format_amount(i128::from(plan.subtotal().to_minor_units()), currency)
    )?;
    writeln!(
        out,
        "Points discount: {} ({} points)",
        format_amount(i128::from(redemption.discount().to_minor_units()), currency),
        redemption.points_consumed()
    )?;
    writeln!(
        out,
        "Total:           {}",
        format_amount(i128::from(plan.total().to_minor_units()), currency)
    )?;
    writeln!(out, "Points earned:   {}", plan.points_earned())
}

/// A completed checkout.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn write_receipt(
    mut out: impl io::Write,
    catalog: &Catalog,
    receipt: &CheckoutReceipt,
) -> io::Result<()> {
    let order = &receipt.order;
    let currency = catalog.currency();

    writeln!(out, "Order {} ({})", order.id, order.status)?;

    write_line_items(&mut out, catalog, &order.items)?;

    writeln!(out, "Discount:      {}", format_stored(order.discount_applied, currency))?;
    writeln!(out, "Total charged: {}", format_stored(order.total, currency))?;
    writeln!(out, "Points spent:  {}", order.points_redeemed)?;
    writeln!(out, "Points earned: {}", order.points_earned)?;
    writeln!(
        out,
        "Balance:       {} points ({})",
        receipt.account.points(),
        receipt.account.tier()
    )
}

/// Reviews of one product with the average rating.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn write_reviews(
    mut out: impl io::Write,
    catalog: &Catalog,
    product: &ProductId,
    reviews: &ProductReviews,
) -> io::Result<()> {
    writeln!(out, "{} ({product})", product_name(catalog, product))?;

    let Some(average) = reviews.average else {
        return writeln!(out, "No reviews yet.");
    };

    writeln!(
        out,
        "Average rating: {:.1} from {} reviews",
        average,
        reviews.reviews.len()
    )?;

    let mut builder = Builder::default();
    builder.push_record(["Rating", "Author", "Date", "Comment"]);

    for review in &reviews.reviews {
        builder.push_record([
            "★".repeat(usize::from(review.rating.stars())),
            review.author.clone(),
            review.created_at.strftime("%Y-%m-%d").to_string(),
            review.comment.clone(),
        ]);
    }

    write_table(&mut out, builder, &[])
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use rusty_money::iso::{KWD, USD};
    use sands::{
        ledger::Ledger,
        orders::{OrderId, OrderStatus},
        redemption::RedemptionChoice,
        reviews::{Rating, Review},
    };
    use testresult::TestResult;

    use super::*;

    fn render(write: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> Result<String, io::Error> {
        let mut out = Vec::new();
        write(&mut out)?;

        String::from_utf8(out).map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))
    }

    #[test]
    fn amounts_use_currency_exponent() {
        assert_eq!(format_amount(55_000, KWD), "55.000 KWD");
        assert_eq!(format_amount(299, USD), "2.99 USD");
    }

    #[test]
    fn catalog_lists_prices_and_sizes() -> TestResult {
        let catalog = Catalog::storefront()?;

        let output = render(|out| write_catalog(out, &catalog))?;

        assert!(output.contains("Yeezy Boost 350"));
        assert!(output.contains("42.000 KWD"));
        assert!(output.contains("Sizes: US 7, US 7.5"));

        Ok(())
    }

    #[test]
    fn accounts_table_shows_tier_and_balance() -> TestResult {
        let ledger = Ledger::default();
        let noor = ledger.award_points(&Account::new("u1", "Noor"), 650);
        let tier = noor.tier().to_string();
        let accounts = [noor, Account::new("u2", "Omar")];

        let output = render(|out| write_accounts(out, &accounts))?;

        assert!(output.contains("Noor"));
        assert!(output.contains("650"));
        assert!(output.contains(&tier));
        assert_eq!(render(|out| write_accounts(out, &[]))?, "No accounts.\n");

        Ok(())
    }

    #[test]
    fn inventory_table_names_products_and_flags_levels() -> TestResult {
        let catalog = Catalog::storefront()?;
        let reports = [
            StockReport {
                product_id: ProductId::from("2"),
                stock: 0,
                level: StockLevel::SoldOut,
            },
            StockReport {
                product_id: ProductId::from("7"),
                stock: 3,
                level: StockLevel::Low(3),
            },
        ];

        let output = render(|out| write_inventory(out, &catalog, &reports))?;

        assert!(output.contains("Yeezy Boost 350"));
        assert!(output.contains("sold out"));
        assert!(output.contains("low stock"));

        Ok(())
    }

    #[test]
    fn quote_shows_discount_and_points() -> TestResult {
        let catalog = Catalog::storefront()?;
        let ledger = Ledger::default();
        let account = ledger.award_points(&Account::new("u1", "Noor"), 200);
        let items = [catalog.line_item(&ProductId::from("3"), "US 10")?];

        let plan = ledger.plan_checkout(&account, &items, RedemptionChoice::Redeem)?;
        let output = render(|out| write_quote(out, &catalog, &items, &plan))?;

        assert!(output.contains("65.000 KWD"));
        assert!(output.contains("2.000 KWD (200 points)"));
        assert!(output.contains("63.000 KWD"));
        assert!(output.contains("Points earned:   630"));

        Ok(())
    }

    #[test]
    fn order_log_lists_account_and_status() -> TestResult {
        let record = OrderRecord {
            account_id: AccountId::from("u1"),
            order: Order {
                id: OrderId::from("ORD-1"),
                created_at: Timestamp::UNIX_EPOCH,
                status: OrderStatus::Shipped,
                total: 48_000,
                items: [LineItem::new("6", 50_000, "US 9")].into_iter().collect(),
                discount_applied: 2_000,
                points_redeemed: 200,
                points_earned: 480,
            },
        };

        let output = render(|out| write_orders(out, KWD, &[record]))?;

        assert!(output.contains("ORD-1"));
        assert!(output.contains("u1"));
        assert!(output.contains("1970-01-01 00:00"));
        assert!(output.contains("48.000 KWD"));
        assert!(output.contains("+480 / -200"));

        Ok(())
    }

    #[test]
    fn reviews_without_entries_say_so() -> TestResult {
        let catalog = Catalog::storefront()?;
        let empty = ProductReviews {
            reviews: Vec::new(),
            average: None,
        };

        let output = render(|out| write_reviews(out, &catalog, &ProductId::from("3"), &empty))?;

        assert!(output.contains("No reviews yet."));

        Ok(())
    }

    #[test]
    fn reviews_show_average() -> TestResult {
        let catalog = Catalog::storefront()?;
        let review = |id: &str, stars: u8| -> Result<Review, sands::reviews::ReviewError> {
            Ok(Review {
                id: id.to_owned(),
                product_id: ProductId::from("3"),
                account_id: AccountId::from(id),
                author: format!("Customer {id}"),
                rating: Rating::try_from(stars)?,
                comment: "Great fit".to_owned(),
                created_at: Timestamp::UNIX_EPOCH,
            })
        };
        let reviews = vec![review("a", 5)?, review("b", 4)?];
        let listing = ProductReviews {
            average: sands::reviews::average_rating(&reviews),
            reviews,
        };

        let output = render(|out| write_reviews(out, &catalog, &ProductId::from("3"), &listing))?;

        assert!(output.contains("Average rating: 4.5 from 2 reviews"));
        assert!(output.contains("Customer b"));

        Ok(())
    }
}
