//! PostgreSQL adapter tests
//!
//! These start a PostgreSQL container and are ignored by default:
//! `cargo test -p infra_db -- --ignored`

use rust_decimal_macros::dec;

use core_kernel::HealthCheckable;

use domain_credit::{
    BulkStateTransitioner, Counterparty, CounterpartyPort, Credit, CreditPort, CreditStatus,
    LedgerReconciler, SequencePort, StatusChange,
};
use infra_db::PostgresLedger;
use test_utils::{assert_outstanding, assert_paid_off, CreditBuilder, PaymentInputBuilder, TestDatabase};

async fn seed_credit(store: &PostgresLedger, builder: CreditBuilder) -> Credit {
    let counterparty = Counterparty::new(format!("CP-{}", uuid_suffix()), "PT Sumber Makmur");
    store.insert_counterparty(&counterparty).await.unwrap();
    store
        .insert_credit(&builder.with_counterparty(&counterparty).build())
        .await
        .unwrap()
}

fn uuid_suffix() -> String {
    core_kernel::CounterpartyId::new().as_uuid().simple().to_string()
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_credit_round_trips_and_checks_version() {
    let db = TestDatabase::new().await.unwrap();
    let store = db.ledger();
    let credit = seed_credit(
        &store,
        CreditBuilder::new()
            .with_contract_number("K-1")
            .with_outstanding(dec!(2500000.50))
            .with_status(CreditStatus::DalamPerhatianKhusus)
            .with_days_past_due(45),
    )
    .await;

    let loaded = store.find_credit_by_contract("K-1").await.unwrap().unwrap();
    assert_eq!(loaded, credit);
    assert_outstanding(&loaded, dec!(2500000.50));
    assert_eq!(loaded.days_past_due, 45);

    let saved = store.save_credit(&loaded).await.unwrap();
    assert_eq!(saved.version, loaded.version + 1);

    let stale = store.save_credit(&loaded).await.unwrap_err();
    assert!(stale.is_conflict());

    let duplicate = Credit::new("K-1", credit.counterparty_id, "KMK", dec!(1), dec!(1));
    assert!(store.insert_credit(&duplicate).await.unwrap_err().is_conflict());
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_missing_credit_is_not_found() {
    let db = TestDatabase::new().await.unwrap();
    let store = db.ledger();

    let ghost = CreditBuilder::new().build();
    assert!(store.get_credit(ghost.id).await.unwrap_err().is_not_found());
    assert!(store.save_credit(&ghost).await.unwrap_err().is_not_found());
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_duplicate_counterparty_code_is_conflict() {
    let db = TestDatabase::new().await.unwrap();
    let store = db.ledger();

    store.insert_counterparty(&Counterparty::new("C-1", "Ani")).await.unwrap();
    let error = store
        .insert_counterparty(&Counterparty::new("C-1", "Budi"))
        .await
        .unwrap_err();
    assert!(error.is_conflict());

    let stored = store.find_counterparty_by_code("C-1").await.unwrap().unwrap();
    assert_eq!(stored.name, "Ani");
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_payment_and_reversal_commit_with_credit() {
    let db = TestDatabase::new().await.unwrap();
    let store = db.ledger();
    let credit = seed_credit(&store, CreditBuilder::new().with_outstanding(dec!(1000000))).await;
    let ledger = LedgerReconciler::new(store.clone());

    let receipt = ledger
        .apply(PaymentInputBuilder::new(credit.id, dec!(1050000)).principal(dec!(1000000)).interest(dec!(50000)).build())
        .await
        .unwrap();
    assert_paid_off(&receipt.credit);
    assert_eq!(store.list_payments(credit.id).await.unwrap().len(), 1);
    let stored_payment = store.get_payment(receipt.payment.id).await.unwrap();
    assert_eq!(stored_payment.principal, Some(dec!(1000000)));
    assert_eq!(stored_payment.interest, Some(dec!(50000)));
    assert!(stored_payment.is_active);

    let reversed = ledger.reverse(receipt.payment.id).await.unwrap();
    assert_outstanding(&reversed, dec!(1000000));
    assert_eq!(reversed.status, CreditStatus::Lunas);
    assert!(store.list_payments(credit.id).await.unwrap().is_empty());
    assert!(!store.get_payment(receipt.payment.id).await.unwrap().is_active);

    assert!(ledger.reverse(receipt.payment.id).await.is_err());
    assert_outstanding(&store.get_credit(credit.id).await.unwrap(), dec!(1000000));
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_rejected_payment_writes_nothing() {
    let db = TestDatabase::new().await.unwrap();
    let store = db.ledger();
    let credit = seed_credit(&store, CreditBuilder::new().with_outstanding(dec!(100))).await;
    let ledger = LedgerReconciler::new(store.clone());

    let result = ledger
        .apply(PaymentInputBuilder::new(credit.id, dec!(500)).principal(dec!(200)).build())
        .await;
    assert!(result.is_err());
    assert_eq!(store.get_credit(credit.id).await.unwrap(), credit);
    assert!(store.list_payments(credit.id).await.unwrap().is_empty());
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_bulk_lunas_and_delete() {
    let db = TestDatabase::new().await.unwrap();
    let store = db.ledger();
    let macet = seed_credit(&store, CreditBuilder::new().with_status(CreditStatus::Macet).with_days_past_due(400)).await;
    let lancar = seed_credit(&store, CreditBuilder::new()).await;
    let transitions = BulkStateTransitioner::new(store.clone());

    let outcome = transitions
        .set_status(StatusChange {
            ids: vec![macet.id],
            new_status: CreditStatus::Lunas,
            collectibility: None,
            last_payment_date: None,
        })
        .await
        .unwrap();
    assert_eq!(outcome.updated_count, 1);
    assert_paid_off(&store.get_credit(macet.id).await.unwrap());

    let deleted = transitions.bulk_delete(&[macet.id, lancar.id]).await.unwrap();
    assert_eq!(deleted.deleted_count, 1);
    assert_eq!(deleted.skipped_count, 1);
    assert!(!store.get_credit(macet.id).await.unwrap().is_active);
    assert!(store.get_credit(lancar.id).await.unwrap().is_active);

    // The contract number is free again once the credit is deleted
    let reused = Credit::new(macet.contract_number.clone(), macet.counterparty_id, "KMK", dec!(5), dec!(5));
    store.insert_credit(&reused).await.unwrap();
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_sequence_is_seeded_from_documents() {
    let db = TestDatabase::new().await.unwrap();
    let store = db.ledger();

    sqlx::query(
        "INSERT INTO documents (document_id, category, year, sequence, formatted_number) \
         VALUES (gen_random_uuid(), 'SK', 2024, 41, '041/SK/KREDIT/2024')",
    )
    .execute(db.pool())
    .await
    .unwrap();

    assert_eq!(store.next_sequence("SK", 2024).await.unwrap(), 42);
    assert_eq!(store.next_sequence("SK", 2024).await.unwrap(), 43);
    assert_eq!(store.next_sequence("SK", 2025).await.unwrap(), 1);

    db.clear_data().await.unwrap();
    assert_eq!(store.next_sequence("SK", 2024).await.unwrap(), 1);
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_concurrent_sequences_are_unique() {
    let db = TestDatabase::new().await.unwrap();
    let store = db.ledger();

    let handles: Vec<_> = (0..20)
        .map(|_| {
            let store = store.clone();
            tokio::spawn(async move { store.next_sequence("SP", 2024).await.unwrap() })
        })
        .collect();

    let mut values = Vec::new();
    for handle in handles {
        values.push(handle.await.unwrap());
    }
    values.sort_unstable();
    assert_eq!(values, (1..=20).collect::<Vec<u32>>());
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_health_check() {
    let db = TestDatabase::new().await.unwrap();
    let result = db.ledger().health_check().await;
    assert!(result.is_healthy());
    assert_eq!(result.adapter_id, "postgres-ledger");
}
