//! End-to-end ledger scenarios against the storefront catalog

use jiff::Timestamp;
use rusty_money::{Money, iso::KWD};
use sands::{prelude::*, redemption::quote};
use testresult::TestResult;

fn checkout(items: Vec<LineItem>, redemption: RedemptionChoice) -> CheckoutRequest {
    CheckoutRequest {
        order_id: OrderId::from("ORD-1"),
        created_at: Timestamp::UNIX_EPOCH,
        items,
        redemption,
    }
}

#[test]
fn redemption_boundaries() -> TestResult {
    let ledger = Ledger::default();
    let rate = ledger.redemption_rate();

    let covered = quote(1_000, Money::from_minor(5_000, KWD), rate)?;

    assert_eq!(*covered.discount(), Money::from_minor(5_000, KWD));
    assert_eq!(covered.points_consumed(), 500);

    let partial = quote(200, Money::from_minor(50_000, KWD), rate)?;

    assert_eq!(*partial.discount(), Money::from_minor(2_000, KWD));
    assert_eq!(partial.points_consumed(), 200);

    Ok(())
}

#[test]
fn purchase_promotes_to_gold() -> TestResult {
    let ledger = Ledger::default();
    let account = ledger.award_points(&Account::new("u1", "Noor"), 450);
    let inventory: Inventory = [(ProductId::from("1"), 4)].into_iter().collect();

    let committed = ledger.commit_checkout(
        &account,
        &inventory,
        checkout(
            vec![LineItem::new("1", 6_000, "US 9")],
            RedemptionChoice::Decline,
        ),
    )?;

    assert_eq!(committed.account.points(), 510);
    assert_eq!(committed.account.tier(), Tier::Gold);

    Ok(())
}

#[test]
fn inventory_never_oversells() -> TestResult {
    let product = ProductId::from("7");
    let inventory: Inventory = [(product.clone(), 3)].into_iter().collect();

    let after_first = inventory.decrement(&product, 2)?;

    assert_eq!(after_first.stock(&product), 1);

    let second = after_first.decrement(&product, 2);

    assert!(
        matches!(second, Err(InventoryError::OutOfStock { available: 1, .. })),
        "expected out of stock, got {second:?}"
    );
    assert_eq!(after_first.stock(&product), 1);

    Ok(())
}

#[test]
fn review_requires_purchase() -> TestResult {
    let ledger = Ledger::default();
    let account = Account::new("u1", "Noor");
    let draft = ReviewDraft {
        id: "rev-1".to_owned(),
        product_id: ProductId::from("3"),
        rating: Rating::try_from(5_u8)?,
        comment: "Great fit".to_owned(),
        created_at: Timestamp::UNIX_EPOCH,
    };

    let result = ledger.submit_review(&account, draft, &[]);

    assert!(
        matches!(
            result,
            Err(ReviewError::IneligibleReview {
                reason: Ineligibility::NotPurchased,
                ..
            })
        ),
        "expected ineligible review, got {result:?}"
    );
    assert_eq!(account.points(), 0);

    Ok(())
}

#[test]
fn catalog_checkout_with_redemption_then_review() -> TestResult {
    let ledger = Ledger::default();
    let catalog = Catalog::storefront()?;
    let jordan = ProductId::from("3");
    let inventory: Inventory = [(jordan.clone(), 10)].into_iter().collect();
    let account = ledger.award_points(&Account::new("u1", "Noor"), 300);

    let items = vec![catalog.line_item(&jordan, "US 10")?];
    let plan = ledger.plan_checkout(&account, &items, RedemptionChoice::Redeem)?;

    // 300 points buy 3.000 KWD off 65.000 KWD.
    assert_eq!(*plan.total(), Money::from_minor(62_000, KWD));
    assert_eq!(plan.points_earned(), 620);

    let committed =
        ledger.commit_checkout(&account, &inventory, checkout(items, RedemptionChoice::Redeem))?;

    assert_eq!(committed.account.points(), 620);
    assert_eq!(committed.account.tier(), Tier::Gold);
    assert_eq!(committed.inventory.stock(&jordan), 9);

    let accepted = ledger.submit_review(
        &committed.account,
        ReviewDraft {
            id: "rev-1".to_owned(),
            product_id: jordan,
            rating: Rating::try_from(4_u8)?,
            comment: "Classic".to_owned(),
            created_at: Timestamp::UNIX_EPOCH,
        },
        &[],
    )?;

    assert_eq!(accepted.account.points(), 670);

    Ok(())
}
