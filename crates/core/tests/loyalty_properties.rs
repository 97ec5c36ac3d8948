//! Loyalty invariants over ranges of balances and award sequences

use sands::prelude::*;
use testresult::TestResult;

#[test]
fn tier_for_is_total_and_monotone() {
    let thresholds = TierThresholds::default();
    let mut previous = Tier::Silver;

    for points in (0..=3_000).chain([u64::MAX - 1, u64::MAX]) {
        let tier = thresholds.tier_for(points);

        assert!(tier >= previous, "tier dropped from {previous} to {tier} at {points}");

        previous = tier;
    }

    assert_eq!(thresholds.tier_for(u64::MAX), Tier::Platinum);
}

#[test]
fn tier_boundaries_are_half_open() {
    let thresholds = TierThresholds::default();

    assert_eq!(thresholds.tier_for(499), Tier::Silver);
    assert_eq!(thresholds.tier_for(500), Tier::Gold);
    assert_eq!(thresholds.tier_for(1_499), Tier::Gold);
    assert_eq!(thresholds.tier_for(1_500), Tier::Platinum);
}

#[test]
fn award_order_does_not_change_the_result() {
    let ledger = Ledger::default();
    let awards = [60_u64, 250, 50, 0, 1_200, 7];
    let start = Account::new("u1", "Noor");

    let forward = awards
        .iter()
        .fold(start.clone(), |account, amount| ledger.award_points(&account, *amount));
    let backward = awards
        .iter()
        .rev()
        .fold(start, |account, amount| ledger.award_points(&account, *amount));

    assert_eq!(forward.points(), backward.points());
    assert_eq!(forward.tier(), backward.tier());
    assert_eq!(forward.tier(), Tier::Platinum);
}

#[test]
fn tier_always_matches_points_after_mutation() -> TestResult {
    let ledger = Ledger::default();
    let mut account = Account::new("u1", "Noor");

    for amount in [120_u64, 400, 999, 3] {
        account = ledger.award_points(&account, amount);

        assert_eq!(account.tier(), ledger.tier_for(account.points()));
    }

    account = ledger.engine().redeem_points(&account, 1_000)?;

    assert_eq!(account.points(), 522);
    assert_eq!(account.tier(), Tier::Gold);

    Ok(())
}

#[test]
fn invalid_thresholds_are_rejected() {
    assert!(TierThresholds::new(0, 1_500).is_err());
    assert!(TierThresholds::new(500, 500).is_err());
    assert!(TierThresholds::new(500, 1_500).is_ok());
}
