use std::io;

use clap::Args;
use sands::{
    accounts::AccountId, catalog::Catalog, orders::LineItem, products::ProductId,
    redemption::RedemptionChoice,
};
use sands_app::{context::AppContext, domain::checkout::models::NewCheckout, reports};

use super::{describe, write_failed};

/// One unit of a product in a size, given as `PRODUCT:SIZE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CartItem {
    product: ProductId,
    size: String,
}

fn parse_item(value: &str) -> Result<CartItem, String> {
    let Some((product, size)) = value.split_once(':') else {
        return Err(format!("expected PRODUCT:SIZE, got {value:?}"));
    };

    let (product, size) = (product.trim(), size.trim());

    if product.is_empty() || size.is_empty() {
        return Err(format!("expected PRODUCT:SIZE, got {value:?}"));
    }

    Ok(CartItem {
        product: ProductId::from(product),
        size: size.to_owned(),
    })
}

#[derive(Debug, Args)]
pub(crate) struct CartArgs {
    /// Buying account
    #[arg(long)]
    account: AccountId,

    /// One unit as PRODUCT:SIZE, e.g. `3:US 10` or `3:10`; repeat for more units
    #[arg(long = "item", required = true, value_parser = parse_item)]
    items: Vec<CartItem>,

    /// Spend loyalty points against the subtotal
    #[arg(long)]
    redeem: bool,
}

impl CartArgs {
    fn into_checkout(self, catalog: &Catalog) -> Result<NewCheckout, String> {
        let items = self
            .items
            .iter()
            .map(|item| line_item(catalog, item))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(NewCheckout {
            account_id: self.account,
            items,
            redemption: RedemptionChoice::from(self.redeem),
        })
    }
}

/// Resolve a cart item against the catalog. Bare sizes such as `10` are read as `US 10`.
fn line_item(catalog: &Catalog, item: &CartItem) -> Result<LineItem, String> {
    let us_size = format!("US {}", item.size);
    let size = if catalog.sizes().contains(&item.size) {
        item.size.as_str()
    } else if catalog.sizes().contains(&us_size) {
        us_size.as_str()
    } else {
        item.size.as_str()
    };

    catalog
        .line_item(&item.product, size)
        .map_err(|error| describe("invalid cart item", &error))
}

pub(crate) async fn quote(
    context: &AppContext,
    args: CartArgs,
    out: impl io::Write,
) -> Result<(), String> {
    let cart = args.into_checkout(&context.catalog)?;

    let plan = context
        .checkout
        .quote(&cart)
        .await
        .map_err(|error| describe("failed to price cart", &error))?;

    reports::write_quote(out, &context.catalog, &cart.items, &plan)
        .map_err(|error| write_failed(&error))
}

pub(crate) async fn checkout(
    context: &AppContext,
    args: CartArgs,
    out: impl io::Write,
) -> Result<(), String> {
    let cart = args.into_checkout(&context.catalog)?;

    let receipt = context
        .checkout
        .checkout(cart)
        .await
        .map_err(|error| describe("checkout failed", &error))?;

    reports::write_receipt(out, &context.catalog, &receipt).map_err(|error| write_failed(&error))
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn items_parse_product_and_size() {
        assert_eq!(
            parse_item("3:US 10"),
            Ok(CartItem {
                product: ProductId::from("3"),
                size: "US 10".to_owned(),
            })
        );
        assert!(parse_item("3").is_err());
        assert!(parse_item(":US 10").is_err());
    }

    #[test]
    fn bare_sizes_resolve_to_us_sizes() -> TestResult {
        let catalog = Catalog::storefront()?;
        let resolve = |value: &str| parse_item(value).and_then(|item| line_item(&catalog, &item));

        assert_eq!(resolve("7:9"), Ok(LineItem::new("7", 42_000, "US 9")));
        assert_eq!(resolve("7:US 9"), Ok(LineItem::new("7", 42_000, "US 9")));
        assert!(resolve("7:US 15").is_err());

        Ok(())
    }
}
