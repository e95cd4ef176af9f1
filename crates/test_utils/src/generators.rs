//! Property-Based Test Generators
//!
//! Proptest strategies for ledger amounts and statuses.

use proptest::prelude::*;
use rust_decimal::Decimal;

use domain_credit::{Collectibility, CreditStatus};

/// Strategy for positive rupiah amounts with two decimal places
pub fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy for zero or positive amounts
pub fn non_negative_amount_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..100_000_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy for any credit status, Lunas included
pub fn credit_status_strategy() -> impl Strategy<Value = CreditStatus> {
    prop_oneof![
        Just(CreditStatus::Lancar),
        Just(CreditStatus::DalamPerhatianKhusus),
        Just(CreditStatus::KurangLancar),
        Just(CreditStatus::Diragukan),
        Just(CreditStatus::Macet),
        Just(CreditStatus::Lunas),
    ]
}

/// Strategy for collectibility tiers
pub fn collectibility_strategy() -> impl Strategy<Value = Collectibility> {
    prop_oneof![
        Just(Collectibility::Current),
        Just(Collectibility::SpecialMention),
        Just(Collectibility::Substandard),
        Just(Collectibility::Doubtful),
        Just(Collectibility::Loss),
    ]
}

/// Strategy for an amount and a principal/interest/penalty split that fits in it
pub fn breakdown_strategy() -> impl Strategy<Value = (Decimal, Decimal, Decimal, Decimal)> {
    (1i64..1_000_000_000i64, 0u32..=100, 0u32..=100)
        .prop_map(|(cents, principal_pct, interest_pct)| {
            let amount = Decimal::new(cents, 2);
            let principal = (amount * Decimal::from(principal_pct) / Decimal::from(100)).round_dp(2);
            let rest = amount - principal;
            let interest = (rest * Decimal::from(interest_pct) / Decimal::from(100)).round_dp(2);
            let penalty = (rest - interest).max(Decimal::ZERO);
            (amount, principal, interest, penalty)
        })
}
