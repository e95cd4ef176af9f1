//! Credit Domain Ports
//!
//! Port traits through which the ledger, the bulk transitioner, the sequence
//! allocator and the import pipeline reach storage. `infra_db` provides the
//! PostgreSQL adapter; [`memory::InMemoryLedger`] serves tests and local
//! runs.
//!
//! # Write contract
//!
//! Every credit write is a compare-and-swap on [`Credit::version`]: the
//! adapter stores the credit only if the stored version still equals the
//! version carried by the argument, bumps it by one, and returns the stored
//! copy. A stale version fails with `PortError::Conflict`. Payment writes
//! (`record_payment`, `reverse_payment`) commit the payment row and the
//! credit update together or not at all.

use async_trait::async_trait;

use core_kernel::{CreditId, DomainPort, HealthCheckable, PaymentId, PortError};

use crate::counterparty::Counterparty;
use crate::credit::Credit;
use crate::payment::Payment;

/// Storage of credits and their payments
#[async_trait]
pub trait CreditPort: DomainPort + HealthCheckable {
    /// Retrieves a credit by ID, active or not
    async fn get_credit(&self, id: CreditId) -> Result<Credit, PortError>;

    /// Finds the active credit with the given contract number
    async fn find_credit_by_contract(
        &self,
        contract_number: &str,
    ) -> Result<Option<Credit>, PortError>;

    /// Inserts a new credit
    ///
    /// Fails with `Conflict` if an active credit already uses the contract
    /// number.
    async fn insert_credit(&self, credit: &Credit) -> Result<Credit, PortError>;

    /// Writes a credit under the version check
    async fn save_credit(&self, credit: &Credit) -> Result<Credit, PortError>;

    /// Retrieves a payment by ID, active or not
    async fn get_payment(&self, id: PaymentId) -> Result<Payment, PortError>;

    /// Lists the active payments of a credit, newest payment date first
    async fn list_payments(&self, credit_id: CreditId) -> Result<Vec<Payment>, PortError>;

    /// Inserts a payment and writes its credit atomically
    async fn record_payment(&self, payment: &Payment, credit: &Credit) -> Result<Credit, PortError>;

    /// Deactivates a payment and writes its credit atomically
    ///
    /// Fails with `Conflict` if the payment is already inactive.
    async fn reverse_payment(
        &self,
        payment_id: PaymentId,
        credit: &Credit,
    ) -> Result<Credit, PortError>;
}

/// Counterparty lookup used while importing
#[async_trait]
pub trait CounterpartyPort: DomainPort {
    /// Finds a counterparty by its code
    async fn find_counterparty_by_code(&self, code: &str) -> Result<Option<Counterparty>, PortError>;

    /// Inserts a counterparty; fails with `Conflict` on a duplicate code
    async fn insert_counterparty(&self, counterparty: &Counterparty) -> Result<(), PortError>;
}

/// Per-(category, year) document counters
#[async_trait]
pub trait SequencePort: DomainPort {
    /// Atomically increments the partition counter and returns the new value
    ///
    /// The first call for a partition returns 1 unless the adapter seeds the
    /// counter from previously issued documents.
    async fn next_sequence(&self, category: &str, year: i32) -> Result<u32, PortError>;
}

/// In-memory adapter
///
/// All state sits behind one lock, so every port method is atomic with
/// respect to every other.
pub mod memory {
    use super::*;
    use chrono::Utc;
    use std::collections::HashMap;
    use tokio::sync::RwLock;

    use core_kernel::{AdapterHealth, HealthCheckResult};

    #[derive(Debug, Default)]
    struct LedgerState {
        credits: HashMap<CreditId, Credit>,
        payments: HashMap<PaymentId, Payment>,
        counterparties: HashMap<String, Counterparty>,
        sequences: HashMap<(String, i32), u32>,
    }

    impl LedgerState {
        fn check_version(&self, credit: &Credit) -> Result<(), PortError> {
            let stored = self
                .credits
                .get(&credit.id)
                .ok_or_else(|| PortError::not_found("Credit", credit.id))?;
            if stored.version != credit.version {
                return Err(PortError::conflict(format!(
                    "credit {} was modified concurrently (expected version {}, found {})",
                    credit.id, credit.version, stored.version
                )));
            }
            Ok(())
        }

        fn store(&mut self, credit: &Credit) -> Credit {
            let mut stored = credit.clone();
            stored.version += 1;
            self.credits.insert(stored.id, stored.clone());
            stored
        }
    }

    /// In-memory implementation of every credit-domain port
    #[derive(Debug, Default)]
    pub struct InMemoryLedger {
        state: RwLock<LedgerState>,
    }

    impl InMemoryLedger {
        /// Creates an empty store
        pub fn new() -> Self {
            Self::default()
        }

        /// Pre-populates with credits
        pub async fn with_credits(credits: Vec<Credit>) -> Self {
            let ledger = Self::new();
            {
                let mut state = ledger.state.write().await;
                for credit in credits {
                    state.credits.insert(credit.id, credit);
                }
            }
            ledger
        }

        /// Sets a partition counter, mirroring documents issued elsewhere
        pub async fn seed_sequence(&self, category: &str, year: i32, last_issued: u32) {
            self.state
                .write()
                .await
                .sequences
                .insert((category.to_string(), year), last_issued);
        }

        /// Number of stored counterparties
        pub async fn counterparty_count(&self) -> usize {
            self.state.read().await.counterparties.len()
        }

        /// Number of stored payments, active or not
        pub async fn payment_count(&self) -> usize {
            self.state.read().await.payments.len()
        }
    }

    impl DomainPort for InMemoryLedger {}

    #[async_trait]
    impl HealthCheckable for InMemoryLedger {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult {
                adapter_id: "in-memory-ledger".to_string(),
                status: AdapterHealth::Healthy,
                latency_ms: 0,
                message: Some("In-memory adapter always healthy".to_string()),
                checked_at: Utc::now(),
            }
        }
    }

    #[async_trait]
    impl CreditPort for InMemoryLedger {
        async fn get_credit(&self, id: CreditId) -> Result<Credit, PortError> {
            self.state
                .read()
                .await
                .credits
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Credit", id))
        }

        async fn find_credit_by_contract(
            &self,
            contract_number: &str,
        ) -> Result<Option<Credit>, PortError> {
            Ok(self
                .state
                .read()
                .await
                .credits
                .values()
                .find(|c| c.is_active && c.contract_number == contract_number)
                .cloned())
        }

        async fn insert_credit(&self, credit: &Credit) -> Result<Credit, PortError> {
            let mut state = self.state.write().await;
            let duplicate = state.credits.values().any(|c| {
                c.id == credit.id || (c.is_active && c.contract_number == credit.contract_number)
            });
            if duplicate {
                return Err(PortError::conflict(format!(
                    "credit with contract number '{}' already exists",
                    credit.contract_number
                )));
            }
            state.credits.insert(credit.id, credit.clone());
            Ok(credit.clone())
        }

        async fn save_credit(&self, credit: &Credit) -> Result<Credit, PortError> {
            let mut state = self.state.write().await;
            state.check_version(credit)?;
            Ok(state.store(credit))
        }

        async fn get_payment(&self, id: PaymentId) -> Result<Payment, PortError> {
            self.state
                .read()
                .await
                .payments
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Payment", id))
        }

        async fn list_payments(&self, credit_id: CreditId) -> Result<Vec<Payment>, PortError> {
            let state = self.state.read().await;
            let mut payments: Vec<_> = state
                .payments
                .values()
                .filter(|p| p.credit_id == credit_id && p.is_active)
                .cloned()
                .collect();
            payments.sort_by(|a, b| {
                b.payment_date
                    .cmp(&a.payment_date)
                    .then(b.created_at.cmp(&a.created_at))
            });
            Ok(payments)
        }

        async fn record_payment(&self, payment: &Payment, credit: &Credit) -> Result<Credit, PortError> {
            let mut state = self.state.write().await;
            state.check_version(credit)?;
            if state.payments.contains_key(&payment.id) {
                return Err(PortError::conflict(format!("payment {} already recorded", payment.id)));
            }
            state.payments.insert(payment.id, payment.clone());
            Ok(state.store(credit))
        }

        async fn reverse_payment(
            &self,
            payment_id: PaymentId,
            credit: &Credit,
        ) -> Result<Credit, PortError> {
            let mut state = self.state.write().await;
            state.check_version(credit)?;
            let payment = state
                .payments
                .get_mut(&payment_id)
                .ok_or_else(|| PortError::not_found("Payment", payment_id))?;
            if !payment.is_active {
                return Err(PortError::conflict(format!("payment {} is already reversed", payment_id)));
            }
            payment.is_active = false;
            Ok(state.store(credit))
        }
    }

    #[async_trait]
    impl CounterpartyPort for InMemoryLedger {
        async fn find_counterparty_by_code(&self, code: &str) -> Result<Option<Counterparty>, PortError> {
            Ok(self.state.read().await.counterparties.get(code).cloned())
        }

        async fn insert_counterparty(&self, counterparty: &Counterparty) -> Result<(), PortError> {
            let mut state = self.state.write().await;
            if state.counterparties.contains_key(&counterparty.code) {
                return Err(PortError::conflict(format!(
                    "counterparty with code '{}' already exists",
                    counterparty.code
                )));
            }
            state
                .counterparties
                .insert(counterparty.code.clone(), counterparty.clone());
            Ok(())
        }
    }

    #[async_trait]
    impl SequencePort for InMemoryLedger {
        async fn next_sequence(&self, category: &str, year: i32) -> Result<u32, PortError> {
            let mut state = self.state.write().await;
            let counter = state
                .sequences
                .entry((category.to_string(), year))
                .or_insert(0);
            *counter += 1;
            Ok(*counter)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::memory::InMemoryLedger;
    use super::*;
    use core_kernel::CounterpartyId;
    use rust_decimal_macros::dec;

    fn credit() -> Credit {
        Credit::new("KR-100", CounterpartyId::new(), "KUR", dec!(1000), dec!(1000))
    }

    #[tokio::test]
    async fn test_save_credit_bumps_version() {
        let ledger = InMemoryLedger::with_credits(vec![credit()]).await;
        let stored = ledger.find_credit_by_contract("KR-100").await.unwrap().unwrap();

        let saved = ledger.save_credit(&stored).await.unwrap();
        assert_eq!(saved.version, stored.version + 1);
    }

    #[tokio::test]
    async fn test_stale_write_is_conflict() {
        let ledger = InMemoryLedger::with_credits(vec![credit()]).await;
        let first = ledger.find_credit_by_contract("KR-100").await.unwrap().unwrap();
        let second = first.clone();

        ledger.save_credit(&first).await.unwrap();
        let result = ledger.save_credit(&second).await;
        assert!(result.unwrap_err().is_conflict());
    }

    #[tokio::test]
    async fn test_duplicate_contract_is_conflict() {
        let ledger = InMemoryLedger::with_credits(vec![credit()]).await;
        let result = ledger.insert_credit(&credit()).await;
        assert!(result.unwrap_err().is_conflict());
    }

    #[tokio::test]
    async fn test_sequence_counter_is_per_partition() {
        let ledger = InMemoryLedger::new();
        assert_eq!(ledger.next_sequence("SK", 2024).await.unwrap(), 1);
        assert_eq!(ledger.next_sequence("SK", 2024).await.unwrap(), 2);
        assert_eq!(ledger.next_sequence("SK", 2025).await.unwrap(), 1);
        assert_eq!(ledger.next_sequence("SP", 2024).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_health_check() {
        let ledger = InMemoryLedger::new();
        assert!(ledger.health_check().await.is_healthy());
    }
}
