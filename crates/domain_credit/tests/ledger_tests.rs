//! Tests for the ledger reconciler, bulk transitions and sequence numbering

use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{CreditId, PaymentId};
use domain_credit::memory::InMemoryLedger;
use domain_credit::{
    AllocationRequest, BulkStateTransitioner, Collectibility, Credit, CreditError, CreditPort,
    CreditStatus, LedgerReconciler, NumberingFormat, Payment, PaymentInput, PaymentValidationError,
    SequenceAllocator, SequencePort, StatusChange,
};
use test_utils::{
    amount_strategy, assert_outstanding, assert_paid_off, breakdown_strategy, collectibility_strategy,
    credit_status_strategy, non_negative_amount_strategy, AmountFixtures, CreditBuilder, DateFixtures,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn credit(contract: &str, outstanding: Decimal) -> Credit {
    CreditBuilder::new()
        .with_contract_number(contract)
        .with_plafond(AmountFixtures::plafond())
        .with_outstanding(outstanding)
        .build()
}

async fn ledger_with(credits: Vec<Credit>) -> (Arc<InMemoryLedger>, LedgerReconciler) {
    let store = Arc::new(InMemoryLedger::with_credits(credits).await);
    let ledger = LedgerReconciler::new(store.clone());
    (store, ledger)
}

// ============================================================================
// Ledger Reconciler
// ============================================================================

mod apply_tests {
    use super::*;

    #[tokio::test]
    async fn test_partial_payment_without_principal() {
        let credit = credit("KR-A", dec!(1000000));
        let id = credit.id;
        let (_, ledger) = ledger_with(vec![credit]).await;

        let receipt = ledger
            .apply(PaymentInput::new(id, dec!(400000), date(2024, 3, 15)))
            .await
            .unwrap();

        assert_eq!(receipt.credit.outstanding, dec!(600000));
        assert_eq!(receipt.credit.status, CreditStatus::Lancar);
        assert_eq!(receipt.credit.last_payment_date, Some(date(2024, 3, 15)));
        assert_eq!(receipt.payment.principal, None);
        assert_eq!(receipt.payment.credit_id, id);
    }

    #[tokio::test]
    async fn test_full_principal_pays_off() {
        let mut credit = credit("KR-B", dec!(400000));
        credit.set_status(CreditStatus::KurangLancar, None, None);
        credit.days_past_due = 120;
        let id = credit.id;
        let (_, ledger) = ledger_with(vec![credit]).await;

        let input = PaymentInput::new(id, dec!(450000), date(2024, 4, 1))
            .with_breakdown(Some(dec!(400000)), Some(dec!(40000)), Some(dec!(10000)));
        let receipt = ledger.apply(input).await.unwrap();

        assert_eq!(receipt.credit.outstanding, Decimal::ZERO);
        assert_eq!(receipt.credit.status, CreditStatus::Lunas);
        assert_eq!(receipt.credit.collectibility, Collectibility::Current);
        assert_eq!(receipt.credit.days_past_due, 0);
    }

    #[tokio::test]
    async fn test_rejected_payment_writes_nothing() {
        let credit = credit("KR-C", dec!(100000));
        let id = credit.id;
        let (store, ledger) = ledger_with(vec![credit.clone()]).await;

        let input = PaymentInput::new(id, dec!(100000), date(2024, 1, 2))
            .with_breakdown(Some(dec!(90000)), Some(dec!(20000)), None);
        let error = ledger.apply(input).await.unwrap_err();

        assert!(matches!(
            error,
            CreditError::PaymentRejected(PaymentValidationError::BreakdownExceedsAmount { .. })
        ));
        assert_eq!(store.get_credit(id).await.unwrap(), credit);
        assert_eq!(store.payment_count().await, 0);
    }

    #[tokio::test]
    async fn test_principal_above_outstanding_is_rejected() {
        let credit = credit("KR-D", dec!(50000));
        let id = credit.id;
        let (store, ledger) = ledger_with(vec![credit]).await;

        let error = ledger
            .apply(PaymentInput::new(id, dec!(50000.01), date(2024, 1, 2)))
            .await
            .unwrap_err();

        assert_eq!(error.field(), Some("principal"));
        assert_eq!(store.get_credit(id).await.unwrap().outstanding, dec!(50000));
    }

    #[tokio::test]
    async fn test_unknown_credit_is_not_found() {
        let (_, ledger) = ledger_with(vec![]).await;
        let error = ledger
            .apply(PaymentInput::new(CreditId::new(), dec!(1), date(2024, 1, 2)))
            .await
            .unwrap_err();
        assert!(error.is_not_found());
    }

    #[tokio::test]
    async fn test_deleted_credit_is_not_found() {
        let mut credit = credit("KR-E", dec!(0));
        credit.mark_paid_off();
        credit.soft_delete().unwrap();
        let id = credit.id;
        let (_, ledger) = ledger_with(vec![credit]).await;

        let error = ledger
            .apply(PaymentInput::new(id, dec!(1), date(2024, 1, 2)))
            .await
            .unwrap_err();
        assert!(error.is_not_found());
    }

    #[tokio::test]
    async fn test_stale_credit_write_is_conflict() {
        let credit = credit("KR-F", dec!(1000));
        let id = credit.id;
        let (store, ledger) = ledger_with(vec![credit]).await;

        let stale = store.get_credit(id).await.unwrap();
        ledger
            .apply(PaymentInput::new(id, dec!(300), date(2024, 2, 1)))
            .await
            .unwrap();

        let mut lost_update = stale.clone();
        lost_update.apply_principal(dec!(200), date(2024, 2, 1));
        let payment = Payment::from_input(&PaymentInput::new(id, dec!(200), date(2024, 2, 1)));
        let result = store.record_payment(&payment, &lost_update).await;

        assert!(result.unwrap_err().is_conflict());
        assert_eq!(store.get_credit(id).await.unwrap().outstanding, dec!(700));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_payments_never_lose_updates() {
        let credit = credit("KR-G", dec!(10000));
        let id = credit.id;
        let (store, ledger) = ledger_with(vec![credit]).await;

        let handles: Vec<_> = (0..20)
            .map(|_| {
                let ledger = ledger.clone();
                tokio::spawn(async move {
                    ledger.apply(PaymentInput::new(id, dec!(100), date(2024, 5, 1))).await
                })
            })
            .collect();

        let mut succeeded = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => succeeded += 1,
                Err(e) => assert!(e.is_conflict(), "unexpected error: {e}"),
            }
        }

        let stored = store.get_credit(id).await.unwrap();
        assert!(succeeded >= 1);
        assert_eq!(stored.outstanding, dec!(10000) - Decimal::from(succeeded * 100));
        assert_eq!(store.payment_count().await, succeeded);
    }
}

mod reverse_tests {
    use super::*;

    #[tokio::test]
    async fn test_apply_then_reverse_restores_outstanding() {
        let credit = credit("KR-R1", dec!(750000));
        let id = credit.id;
        let (store, ledger) = ledger_with(vec![credit]).await;

        let receipt = ledger
            .apply(
                PaymentInput::new(id, dec!(300000), date(2024, 6, 1))
                    .with_breakdown(Some(dec!(250000)), Some(dec!(50000)), None),
            )
            .await
            .unwrap();
        let restored = ledger.reverse(receipt.payment.id).await.unwrap();

        assert_eq!(restored.outstanding, dec!(750000));
        assert!(!store.get_payment(receipt.payment.id).await.unwrap().is_active);
        assert!(ledger.payments_for(id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reverse_keeps_lunas_status() {
        let credit = credit("KR-R2", dec!(400000));
        let id = credit.id;
        let (_, ledger) = ledger_with(vec![credit]).await;

        let receipt = ledger
            .apply(PaymentInput::new(id, dec!(400000), date(2024, 6, 1)))
            .await
            .unwrap();
        assert_eq!(receipt.credit.status, CreditStatus::Lunas);

        let restored = ledger.reverse(receipt.payment.id).await.unwrap();
        assert_eq!(restored.outstanding, dec!(400000));
        assert_eq!(restored.status, CreditStatus::Lunas);
        assert_eq!(restored.collectibility, Collectibility::Current);
    }

    #[tokio::test]
    async fn test_reverse_twice_is_invalid_state() {
        let credit = credit("KR-R3", dec!(1000));
        let id = credit.id;
        let (_, ledger) = ledger_with(vec![credit]).await;

        let receipt = ledger
            .apply(PaymentInput::new(id, dec!(10), date(2024, 6, 1)))
            .await
            .unwrap();
        ledger.reverse(receipt.payment.id).await.unwrap();

        let error = ledger.reverse(receipt.payment.id).await.unwrap_err();
        assert!(matches!(error, CreditError::InvalidState(_)));
    }

    #[tokio::test]
    async fn test_reverse_unknown_payment_is_not_found() {
        let (_, ledger) = ledger_with(vec![]).await;
        assert!(ledger.reverse(PaymentId::new()).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_payments_listed_newest_first() {
        let credit = credit("KR-R4", dec!(1000));
        let id = credit.id;
        let (_, ledger) = ledger_with(vec![credit]).await;

        for day in [3, 1, 2] {
            ledger
                .apply(PaymentInput::new(id, dec!(10), date(2024, 7, day)))
                .await
                .unwrap();
        }

        let dates: Vec<_> = ledger
            .payments_for(id)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.payment_date)
            .collect();
        assert_eq!(dates, vec![date(2024, 7, 3), date(2024, 7, 2), date(2024, 7, 1)]);
    }
}

// ============================================================================
// Bulk State Transitioner
// ============================================================================

mod transition_tests {
    use super::*;

    async fn setup(credits: Vec<Credit>) -> (Arc<InMemoryLedger>, BulkStateTransitioner) {
        let store = Arc::new(InMemoryLedger::with_credits(credits).await);
        (store.clone(), BulkStateTransitioner::new(store))
    }

    #[tokio::test]
    async fn test_lunas_transition_zeroes_balance() {
        let mut first = credit("KR-T1", dec!(900000));
        first.days_past_due = 45;
        let second = credit("KR-T2", dec!(12000));
        let ids = vec![first.id, second.id];
        let (store, transitioner) = setup(vec![first, second]).await;

        let outcome = transitioner
            .set_status(StatusChange {
                ids: ids.clone(),
                new_status: CreditStatus::Lunas,
                collectibility: None,
                last_payment_date: Some(date(2024, 8, 31)),
            })
            .await
            .unwrap();

        assert_eq!(outcome.updated_count, 2);
        assert_eq!(outcome.requested_count, 2);
        for id in ids {
            let stored = store.get_credit(id).await.unwrap();
            assert_eq!(stored.outstanding, Decimal::ZERO);
            assert_eq!(stored.days_past_due, 0);
            assert_eq!(stored.status, CreditStatus::Lunas);
            assert_eq!(stored.last_payment_date, Some(date(2024, 8, 31)));
        }
    }

    #[tokio::test]
    async fn test_non_terminal_transition_keeps_balance() {
        let credit = credit("KR-T3", dec!(5000));
        let id = credit.id;
        let (store, transitioner) = setup(vec![credit]).await;

        transitioner
            .set_status(StatusChange {
                ids: vec![id],
                new_status: CreditStatus::Macet,
                collectibility: None,
                last_payment_date: None,
            })
            .await
            .unwrap();

        let stored = store.get_credit(id).await.unwrap();
        assert_eq!(stored.status, CreditStatus::Macet);
        assert_eq!(stored.collectibility, Collectibility::Loss);
        assert_eq!(stored.outstanding, dec!(5000));
    }

    #[tokio::test]
    async fn test_missing_and_deleted_credits_are_not_counted() {
        let mut deleted = credit("KR-T4", dec!(0));
        deleted.mark_paid_off();
        deleted.soft_delete().unwrap();
        let active = credit("KR-T5", dec!(10));
        let ids = vec![deleted.id, active.id, CreditId::new(), active.id];
        let (_, transitioner) = setup(vec![deleted, active]).await;

        let outcome = transitioner
            .set_status(StatusChange {
                ids,
                new_status: CreditStatus::DalamPerhatianKhusus,
                collectibility: Some(Collectibility::SpecialMention),
                last_payment_date: None,
            })
            .await
            .unwrap();

        assert_eq!(outcome.updated_count, 1);
        assert_eq!(outcome.requested_count, 4);
    }

    #[tokio::test]
    async fn test_bulk_delete_only_removes_lunas() {
        let mut paid = credit("KR-D1", dec!(0));
        paid.mark_paid_off();
        let open = credit("KR-D2", dec!(100));
        let (paid_id, open_id) = (paid.id, open.id);
        let (store, transitioner) = setup(vec![paid, open]).await;

        let outcome = transitioner
            .bulk_delete(&[paid_id, open_id, CreditId::new()])
            .await
            .unwrap();

        assert_eq!(outcome.deleted_count, 1);
        assert_eq!(outcome.skipped_count, 2);
        assert_eq!(outcome.requested_count, 3);
        assert!(!store.get_credit(paid_id).await.unwrap().is_active);
        assert!(store.get_credit(open_id).await.unwrap().is_active);
    }

    #[tokio::test]
    async fn test_single_delete_requires_lunas() {
        let open = credit("KR-D3", dec!(100));
        let id = open.id;
        let (_, transitioner) = setup(vec![open]).await;

        let error = transitioner.delete(id).await.unwrap_err();
        assert!(matches!(error, CreditError::InvalidState(_)));
    }
}

// ============================================================================
// Sequence Allocator
// ============================================================================

mod sequence_tests {
    use super::*;

    fn request(category: &str, year: i32) -> AllocationRequest {
        AllocationRequest {
            category: category.to_string(),
            year,
            unit_label: "KREDIT".to_string(),
        }
    }

    #[tokio::test]
    async fn test_sequential_allocation_is_strictly_increasing() {
        let store = Arc::new(InMemoryLedger::new());
        let allocator = SequenceAllocator::new(store);
        let format = NumberingFormat::default();

        let mut previous = 0;
        for _ in 0..25 {
            let number = allocator.allocate(&request("SK", 2024), &format).await.unwrap();
            assert!(number.sequence > previous);
            previous = number.sequence;
        }

        let first_of_next_year = allocator.allocate(&request("SK", 2025), &format).await.unwrap();
        assert_eq!(first_of_next_year.sequence, 1);
        assert_eq!(first_of_next_year.formatted_number, "001/SK/KREDIT/2025");
    }

    #[tokio::test]
    async fn test_allocation_continues_seeded_partition() {
        let store = Arc::new(InMemoryLedger::new());
        store.seed_sequence("SK", 2024, 41).await;
        let allocator = SequenceAllocator::new(store);

        let number = allocator
            .allocate(&request("SK", 2024), &NumberingFormat::default())
            .await
            .unwrap();
        assert_eq!(number.sequence, 42);
        assert_eq!(number.year, 2024);
        assert_eq!(number.formatted_number, "042/SK/KREDIT/2024");
    }

    #[tokio::test]
    async fn test_blank_category_is_rejected() {
        let allocator = SequenceAllocator::new(Arc::new(InMemoryLedger::new()));
        let error = allocator
            .allocate(&request("  ", 2024), &NumberingFormat::default())
            .await
            .unwrap_err();
        assert_eq!(error.field(), Some("category"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_allocation_never_repeats() {
        let store = Arc::new(InMemoryLedger::new());
        let allocator = SequenceAllocator::new(store.clone());

        let handles: Vec<_> = (0..50)
            .map(|_| {
                let allocator = allocator.clone();
                tokio::spawn(async move {
                    allocator
                        .allocate(&request("SK", 2024), &NumberingFormat::default())
                        .await
                        .map(|n| n.sequence)
                })
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            assert!(seen.insert(handle.await.unwrap().unwrap()));
        }
        assert_eq!(seen, (1..=50).collect::<HashSet<u32>>());
        assert_eq!(store.next_sequence("SK", 2024).await.unwrap(), 51);
    }
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn valid_payment_reduces_outstanding_by_principal(
        outstanding in non_negative_amount_strategy(),
        principal_share in 0u32..=100,
        extra in non_negative_amount_strategy(),
    ) {
        let principal = (outstanding * Decimal::from(principal_share) / dec!(100)).round_dp(2);
        let amount = principal + extra;
        prop_assume!(amount > Decimal::ZERO);

        let breakdown = domain_credit::validate(amount, Some(principal), None, None, outstanding).unwrap();
        let mut credit = credit("KR-P", outstanding);
        credit.apply_principal(breakdown.principal, DateFixtures::payment());

        prop_assert_eq!(credit.outstanding, (outstanding - principal).max(Decimal::ZERO));
        prop_assert!(credit.outstanding >= Decimal::ZERO);
        prop_assert_eq!(credit.status == CreditStatus::Lunas, credit.outstanding.is_zero());
    }

    #[test]
    fn fitting_breakdown_is_accepted((amount, principal, interest, penalty) in breakdown_strategy()) {
        let breakdown = domain_credit::validate(amount, Some(principal), Some(interest), Some(penalty), principal);
        prop_assert!(breakdown.is_ok());
    }

    #[test]
    fn oversized_breakdown_is_always_rejected(
        (amount, principal, interest, penalty) in breakdown_strategy(),
        excess in amount_strategy(),
    ) {
        let result = domain_credit::validate(amount, Some(principal), Some(interest + excess), Some(penalty), principal);
        let is_breakdown_error = matches!(result, Err(PaymentValidationError::BreakdownExceedsAmount { .. }));
        prop_assert!(is_breakdown_error);
    }

    #[test]
    fn lunas_transition_always_clears_balance(
        outstanding in non_negative_amount_strategy(),
        days_past_due in 0u32..1000,
        status in credit_status_strategy(),
        tier in collectibility_strategy(),
    ) {
        let mut credit = CreditBuilder::new()
            .with_outstanding(outstanding)
            .with_days_past_due(days_past_due)
            .with_collectibility(tier)
            .build();
        credit.set_status(status, None, None);

        if status == CreditStatus::Lunas {
            assert_paid_off(&credit);
        } else {
            assert_outstanding(&credit, outstanding);
            prop_assert_eq!(credit.days_past_due, days_past_due);
            prop_assert_eq!(credit.collectibility, status.canonical_collectibility());
        }
    }
}
