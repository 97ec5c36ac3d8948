//! Catalog
//!
//! The products the storefront sells, their prices and the sizes a customer can pick. Catalogs
//! are loaded from YAML; the storefront's own catalog is embedded.

use std::{fmt, fs, path::Path};

use rust_decimal::{Decimal, prelude::ToPrimitive};
use rusty_money::{
    Money,
    iso::{self, Currency},
};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

use crate::{orders::LineItem, products::ProductId};

const STOREFRONT_CATALOG: &str = include_str!("../fixtures/catalog.yaml");

/// Errors raised while loading or reading a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// IO error reading the catalog file.
    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error.
    #[error("failed to parse catalog: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Price string is not `AMOUNT CURRENCY` with a non-negative amount.
    #[error("invalid price: {0}")]
    InvalidPrice(String),

    /// Currency code not recognised as an ISO currency.
    #[error("unknown currency code: {0}")]
    UnknownCurrency(String),

    /// A product is priced in a currency other than the catalog's.
    #[error("product {product} is priced in {found}, expected {expected}")]
    CurrencyMismatch {
        /// Offending product.
        product: ProductId,

        /// Catalog currency code.
        expected: &'static str,

        /// Product currency code.
        found: &'static str,
    },

    /// Two products share an identifier.
    #[error("duplicate product id {0}")]
    DuplicateProduct(ProductId),

    /// No product with the given identifier.
    #[error("unknown product {0}")]
    UnknownProduct(ProductId),

    /// The product is not sold in the requested size.
    #[error("product {product} is not available in size {size}")]
    UnknownSize {
        /// Requested product.
        product: ProductId,

        /// Requested size.
        size: String,
    },
}

/// Storefront department.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    /// Men's shoes.
    Men,

    /// Women's shoes.
    Women,

    /// Kids' shoes.
    Kids,

    /// Unisex shoes.
    Unisex,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Category::Men => "MEN",
            Category::Women => "WOMEN",
            Category::Kids => "KIDS",
            Category::Unisex => "UNISEX",
        };

        f.write_str(label)
    }
}

/// Wrapper for a catalog in YAML
#[derive(Debug, Deserialize)]
struct CatalogFixture {
    sizes: Vec<String>,
    products: Vec<ProductFixture>,
}

/// Product Fixture
#[derive(Debug, Deserialize)]
struct ProductFixture {
    id: String,
    name: String,
    brand: String,

    /// Product price (e.g., "55.000 KWD")
    price: String,
    category: Category,

    #[serde(default)]
    tags: Vec<String>,
}

/// A product on sale.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    /// Product identifier.
    pub id: ProductId,

    /// Product name.
    pub name: String,

    /// Brand.
    pub brand: String,

    /// Unit price.
    pub price: Money<'static, Currency>,

    /// Department.
    pub category: Category,

    /// Search tags.
    pub tags: SmallVec<[String; 3]>,
}

/// Products on sale, in catalog order.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    currency: &'static Currency,
    sizes: Vec<String>,
    products: Vec<Product>,
}

impl Catalog {
    /// The storefront's own catalog, priced in KWD.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if the embedded catalog fails to parse.
    pub fn storefront() -> Result<Self, CatalogError> {
        Self::from_yaml_str(STOREFRONT_CATALOG, iso::KWD)
    }

    /// Parse a catalog whose prices must all be in `currency`.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] for malformed YAML, unparsable prices, prices in another
    /// currency or duplicate product ids.
    pub fn from_yaml_str(yaml: &str, currency: &'static Currency) -> Result<Self, CatalogError> {
        let fixture: CatalogFixture = serde_norway::from_str(yaml)?;
        let mut products: Vec<Product> = Vec::with_capacity(fixture.products.len());

        for product in fixture.products {
            let id = ProductId::from(product.id);

            if products.iter().any(|existing| existing.id == id) {
                return Err(CatalogError::DuplicateProduct(id));
            }

            let (minor_units, priced_in) = parse_price(&product.price)?;

            if priced_in != currency {
                return Err(CatalogError::CurrencyMismatch {
                    product: id,
                    expected: currency.iso_alpha_code,
                    found: priced_in.iso_alpha_code,
                });
            }

            products.push(Product {
                id,
                name: product.name,
                brand: product.brand,
                price: Money::from_minor(minor_units, currency),
                category: product.category,
                tags: product.tags.into_iter().collect(),
            });
        }

        Ok(Self {
            currency,
            sizes: fixture.sizes,
            products,
        })
    }

    /// Read and parse a catalog file.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Io`] if the file cannot be read, otherwise see
    /// [`Catalog::from_yaml_str`].
    pub fn from_yaml_file(
        path: impl AsRef<Path>,
        currency: &'static Currency,
    ) -> Result<Self, CatalogError> {
        let yaml = fs::read_to_string(path)?;

        Self::from_yaml_str(&yaml, currency)
    }

    /// Catalog currency.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Sizes on offer.
    pub fn sizes(&self) -> &[String] {
        &self.sizes
    }

    /// All products, in catalog order.
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Look up a product.
    pub fn get(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|product| &product.id == id)
    }

    /// One unit of `product` in `size`, at the catalog price.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownProduct`] or [`CatalogError::UnknownSize`].
    pub fn line_item(&self, id: &ProductId, size: &str) -> Result<LineItem, CatalogError> {
        let product = self
            .get(id)
            .ok_or_else(|| CatalogError::UnknownProduct(id.clone()))?;

        if !self.sizes.iter().any(|offered| offered == size) {
            return Err(CatalogError::UnknownSize {
                product: id.clone(),
                size: size.to_owned(),
            });
        }

        let unit_price = u64::try_from(product.price.to_minor_units())
            .ok()
            .ok_or_else(|| CatalogError::InvalidPrice(product.price.to_string()))?;

        Ok(LineItem::new(id.clone(), unit_price, size))
    }
}

/// Parse price string (e.g., "55.000 KWD") into minor units and currency.
///
/// Amounts are scaled by the currency's exponent and rounded to the nearest minor unit.
///
/// # Errors
///
/// Returns [`CatalogError::InvalidPrice`] if the string is not `AMOUNT CURRENCY` or the amount
/// is negative, and [`CatalogError::UnknownCurrency`] for an unrecognised currency code.
pub fn parse_price(s: &str) -> Result<(i64, &'static Currency), CatalogError> {
    let mut parts = s.split_whitespace();

    let (Some(amount), Some(code), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(CatalogError::InvalidPrice(format!(
            "expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    let currency = iso::find(code).ok_or_else(|| CatalogError::UnknownCurrency(code.to_owned()))?;

    let amount = amount
        .parse::<Decimal>()
        .map_err(|_err| CatalogError::InvalidPrice(s.to_owned()))?;

    if amount.is_sign_negative() {
        return Err(CatalogError::InvalidPrice(s.to_owned()));
    }

    let minor_units = 10_i64
        .checked_pow(currency.exponent)
        .and_then(|scale| amount.checked_mul(Decimal::from(scale)))
        .and_then(|value| value.round_dp(0).to_i64())
        .ok_or_else(|| CatalogError::InvalidPrice(s.to_owned()))?;

    Ok((minor_units, currency))
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{KWD, USD};
    use testresult::TestResult;

    use super::*;

    #[test]
    fn storefront_catalog_loads() -> TestResult {
        let catalog = Catalog::storefront()?;

        assert_eq!(catalog.products().len(), 11);
        assert_eq!(catalog.currency(), KWD);
        assert_eq!(catalog.sizes().len(), 9);

        let yeezy = catalog.get(&ProductId::from("2")).ok_or("product 2")?;

        assert_eq!(yeezy.name, "Yeezy Boost 350");
        assert_eq!(yeezy.price, Money::from_minor(120_000, KWD));
        assert_eq!(yeezy.category, Category::Unisex);

        Ok(())
    }

    #[test]
    fn line_item_uses_catalog_price() -> TestResult {
        let catalog = Catalog::storefront()?;

        let item = catalog.line_item(&ProductId::from("7"), "US 9")?;

        assert_eq!(item, LineItem::new("7", 42_000, "US 9"));

        Ok(())
    }

    #[test]
    fn line_item_rejects_unknown_product_and_size() -> TestResult {
        let catalog = Catalog::storefront()?;

        assert!(matches!(
            catalog.line_item(&ProductId::from("99"), "US 9"),
            Err(CatalogError::UnknownProduct(_))
        ));
        assert!(matches!(
            catalog.line_item(&ProductId::from("1"), "US 15"),
            Err(CatalogError::UnknownSize { ref size, .. }) if size == "US 15"
        ));

        Ok(())
    }

    #[test]
    fn parse_price_scales_by_currency_exponent() -> TestResult {
        assert_eq!(parse_price("55.000 KWD")?, (55_000, KWD));
        assert_eq!(parse_price("2.99 USD")?, (299, USD));

        Ok(())
    }

    #[test]
    fn parse_price_rejects_invalid_format() {
        assert!(matches!(
            parse_price("55KWD"),
            Err(CatalogError::InvalidPrice(_))
        ));
        assert!(matches!(
            parse_price("-1.000 KWD"),
            Err(CatalogError::InvalidPrice(_))
        ));
    }

    #[test]
    fn parse_price_rejects_unknown_currency() {
        let result = parse_price("2.99 ABC");

        assert!(matches!(result, Err(CatalogError::UnknownCurrency(code)) if code == "ABC"));
    }

    #[test]
    fn mixed_currencies_are_rejected() {
        let yaml = "sizes: [US 9]
products:
  - id: \"1\"
    name: Samba OG
    brand: Adidas
    price: 32.00 USD
    category: UNISEX
";

        let result = Catalog::from_yaml_str(yaml, KWD);

        assert!(
            matches!(result, Err(CatalogError::CurrencyMismatch { expected: "KWD", found: "USD", .. })),
            "expected currency mismatch, got {result:?}"
        );
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let yaml = "sizes: [US 9]
products:
  - { id: \"1\", name: A, brand: B, price: 1.000 KWD, category: MEN }
  - { id: \"1\", name: C, brand: D, price: 2.000 KWD, category: MEN }
";

        assert!(matches!(
            Catalog::from_yaml_str(yaml, KWD),
            Err(CatalogError::DuplicateProduct(_))
        ));
    }
}
