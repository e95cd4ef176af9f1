//! PostgreSQL ledger adapter
//!
//! Implements [`CreditPort`], [`CounterpartyPort`] and [`SequencePort`].
//! Queries return `DatabaseError` internally; the trait impls translate it
//! into `PortError` at the boundary.
//!
//! # Error Handling
//!
//! - a lost version check becomes `PortError::Conflict`
//! - a duplicate contract number or counterparty code becomes `PortError::Conflict`
//! - a missing row becomes `PortError::NotFound`

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgConnection, PgPool};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use core_kernel::{
    AdapterHealth, CreditId, DomainPort, HealthCheckResult, HealthCheckable, PaymentId, PortError,
};
use domain_credit::{Counterparty, CounterpartyPort, Credit, CreditPort, Payment, SequencePort};

use super::rows::{
    counterparty_columns, credit_columns, days_to_db, payment_columns, CounterpartyRow, CreditRow,
    PaymentRow,
};
use crate::error::DatabaseError;

const ADAPTER_ID: &str = "postgres-ledger";

/// PostgreSQL-backed implementation of every credit-domain port
#[derive(Debug, Clone)]
pub struct PostgresLedger {
    pool: PgPool,
}

impl PostgresLedger {
    /// Creates an adapter over an existing pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns the underlying pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn fetch_credit(&self, id: CreditId) -> Result<Credit, DatabaseError> {
        let row = sqlx::query_as::<_, CreditRow>(concat!(
            "SELECT ",
            credit_columns!(),
            " FROM credits WHERE credit_id = $1"
        ))
        .bind(Uuid::from(id))
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Credit", id))?;

        Credit::try_from(row)
    }

    async fn fetch_credit_by_contract(
        &self,
        contract_number: &str,
    ) -> Result<Option<Credit>, DatabaseError> {
        sqlx::query_as::<_, CreditRow>(concat!(
            "SELECT ",
            credit_columns!(),
            " FROM credits WHERE contract_number = $1 AND is_active"
        ))
        .bind(contract_number)
        .fetch_optional(&self.pool)
        .await?
        .map(Credit::try_from)
        .transpose()
    }

    async fn create_credit(&self, credit: &Credit) -> Result<Credit, DatabaseError> {
        let row = sqlx::query_as::<_, CreditRow>(concat!(
            "INSERT INTO credits (credit_id, contract_number, counterparty_id, category, \
             plafond, outstanding, status, collectibility, disbursement_date, maturity_date, \
             last_payment_date, days_past_due, is_active, version, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16) \
             RETURNING ",
            credit_columns!()
        ))
        .bind(Uuid::from(credit.id))
        .bind(&credit.contract_number)
        .bind(Uuid::from(credit.counterparty_id))
        .bind(&credit.category)
        .bind(credit.plafond)
        .bind(credit.outstanding)
        .bind(credit.status.as_str())
        .bind(credit.collectibility.code())
        .bind(credit.disbursement_date)
        .bind(credit.maturity_date)
        .bind(credit.last_payment_date)
        .bind(days_to_db(credit.days_past_due)?)
        .bind(credit.is_active)
        .bind(credit.version)
        .bind(credit.created_at)
        .bind(credit.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Credit::try_from(row)
    }

    /// Writes a credit if the stored version still matches
    async fn update_credit(
        conn: &mut PgConnection,
        credit: &Credit,
    ) -> Result<Credit, DatabaseError> {
        let row = sqlx::query_as::<_, CreditRow>(concat!(
            "UPDATE credits SET contract_number = $3, counterparty_id = $4, category = $5, \
             plafond = $6, outstanding = $7, status = $8, collectibility = $9, \
             disbursement_date = $10, maturity_date = $11, last_payment_date = $12, \
             days_past_due = $13, is_active = $14, updated_at = $15, version = version + 1 \
             WHERE credit_id = $1 AND version = $2 RETURNING ",
            credit_columns!()
        ))
        .bind(Uuid::from(credit.id))
        .bind(credit.version)
        .bind(&credit.contract_number)
        .bind(Uuid::from(credit.counterparty_id))
        .bind(&credit.category)
        .bind(credit.plafond)
        .bind(credit.outstanding)
        .bind(credit.status.as_str())
        .bind(credit.collectibility.code())
        .bind(credit.disbursement_date)
        .bind(credit.maturity_date)
        .bind(credit.last_payment_date)
        .bind(days_to_db(credit.days_past_due)?)
        .bind(credit.is_active)
        .bind(credit.updated_at)
        .fetch_optional(&mut *conn)
        .await?;

        if let Some(row) = row {
            return Credit::try_from(row);
        }

        let stored: Option<i64> = sqlx::query_scalar("SELECT version FROM credits WHERE credit_id = $1")
            .bind(Uuid::from(credit.id))
            .fetch_optional(&mut *conn)
            .await?;

        match stored {
            Some(version) => {
                warn!(credit_id = %credit.id, expected = credit.version, found = version, "Version check failed");
                Err(DatabaseError::VersionConflict(format!(
                    "credit {} was modified concurrently (expected version {}, found {})",
                    credit.id, credit.version, version
                )))
            }
            None => Err(DatabaseError::not_found("Credit", credit.id)),
        }
    }

    async fn store_credit(&self, credit: &Credit) -> Result<Credit, DatabaseError> {
        let mut conn = self.pool.acquire().await?;
        Self::update_credit(&mut *conn, credit).await
    }

    async fn fetch_payment(&self, id: PaymentId) -> Result<Payment, DatabaseError> {
        let row = sqlx::query_as::<_, PaymentRow>(concat!(
            "SELECT ",
            payment_columns!(),
            " FROM payments WHERE payment_id = $1"
        ))
        .bind(Uuid::from(id))
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Payment", id))?;

        Ok(row.into())
    }

    async fn fetch_payments(&self, credit_id: CreditId) -> Result<Vec<Payment>, DatabaseError> {
        let rows = sqlx::query_as::<_, PaymentRow>(concat!(
            "SELECT ",
            payment_columns!(),
            " FROM payments WHERE credit_id = $1 AND is_active \
             ORDER BY payment_date DESC, created_at DESC"
        ))
        .bind(Uuid::from(credit_id))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Payment::from).collect())
    }

    async fn insert_payment_with_credit(
        &self,
        payment: &Payment,
        credit: &Credit,
    ) -> Result<Credit, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let stored = Self::update_credit(&mut *tx, credit).await?;

        sqlx::query(
            "INSERT INTO payments (payment_id, credit_id, amount, principal, interest, penalty, \
             payment_date, reference, is_active, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(Uuid::from(payment.id))
        .bind(Uuid::from(payment.credit_id))
        .bind(payment.amount)
        .bind(payment.principal)
        .bind(payment.interest)
        .bind(payment.penalty)
        .bind(payment.payment_date)
        .bind(&payment.reference)
        .bind(payment.is_active)
        .bind(payment.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(stored)
    }

    async fn deactivate_payment_with_credit(
        &self,
        payment_id: PaymentId,
        credit: &Credit,
    ) -> Result<Credit, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let stored = Self::update_credit(&mut *tx, credit).await?;

        let affected = sqlx::query(
            "UPDATE payments SET is_active = FALSE WHERE payment_id = $1 AND is_active",
        )
        .bind(Uuid::from(payment_id))
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if affected == 0 {
            // Dropping the transaction rolls back the credit update
            let exists: Option<bool> =
                sqlx::query_scalar("SELECT is_active FROM payments WHERE payment_id = $1")
                    .bind(Uuid::from(payment_id))
                    .fetch_optional(&mut *tx)
                    .await?;
            return Err(match exists {
                Some(_) => DatabaseError::VersionConflict(format!(
                    "payment {} is already reversed",
                    payment_id
                )),
                None => DatabaseError::not_found("Payment", payment_id),
            });
        }

        tx.commit().await?;
        Ok(stored)
    }

    async fn fetch_counterparty(&self, code: &str) -> Result<Option<Counterparty>, DatabaseError> {
        let row = sqlx::query_as::<_, CounterpartyRow>(concat!(
            "SELECT ",
            counterparty_columns!(),
            " FROM counterparties WHERE code = $1"
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Counterparty::from))
    }

    async fn create_counterparty(&self, counterparty: &Counterparty) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO counterparties (counterparty_id, code, name, is_active, created_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(Uuid::from(counterparty.id))
        .bind(&counterparty.code)
        .bind(&counterparty.name)
        .bind(counterparty.is_active)
        .bind(counterparty.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Increments the partition counter in a single statement
    ///
    /// A partition seen for the first time starts after the highest active
    /// sequence already present in `documents`.
    async fn increment_sequence(&self, category: &str, year: i32) -> Result<u32, DatabaseError> {
        let value: i32 = sqlx::query_scalar(
            "INSERT INTO sequence_counters (category, year, last_value, updated_at) \
             VALUES ($1, $2, COALESCE((SELECT MAX(sequence) FROM documents \
                     WHERE category = $1 AND year = $2 AND is_active), 0) + 1, NOW()) \
             ON CONFLICT (category, year) \
             DO UPDATE SET last_value = sequence_counters.last_value + 1, updated_at = NOW() \
             RETURNING last_value",
        )
        .bind(category)
        .bind(year)
        .fetch_one(&self.pool)
        .await?;

        u32::try_from(value).map_err(|_| DatabaseError::corrupt("last_value", value))
    }
}

impl DomainPort for PostgresLedger {}

#[async_trait]
impl HealthCheckable for PostgresLedger {
    async fn health_check(&self) -> HealthCheckResult {
        let start = std::time::Instant::now();

        let result = sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await;

        let latency_ms = start.elapsed().as_millis() as u64;

        let (status, message) = match result {
            Ok(_) => (AdapterHealth::Healthy, None),
            Err(e) => (AdapterHealth::Unhealthy, Some(format!("Database error: {}", e))),
        };

        HealthCheckResult {
            adapter_id: ADAPTER_ID.to_string(),
            status,
            latency_ms,
            message,
            checked_at: Utc::now(),
        }
    }
}

#[async_trait]
impl CreditPort for PostgresLedger {
    #[instrument(skip(self), fields(credit_id = %id))]
    async fn get_credit(&self, id: CreditId) -> Result<Credit, PortError> {
        debug!("Fetching credit");
        Ok(self.fetch_credit(id).await?)
    }

    #[instrument(skip(self))]
    async fn find_credit_by_contract(
        &self,
        contract_number: &str,
    ) -> Result<Option<Credit>, PortError> {
        Ok(self.fetch_credit_by_contract(contract_number).await?)
    }

    #[instrument(skip(self, credit), fields(contract_number = %credit.contract_number))]
    async fn insert_credit(&self, credit: &Credit) -> Result<Credit, PortError> {
        debug!("Inserting credit");
        Ok(self.create_credit(credit).await?)
    }

    #[instrument(skip(self, credit), fields(credit_id = %credit.id, version = credit.version))]
    async fn save_credit(&self, credit: &Credit) -> Result<Credit, PortError> {
        Ok(self.store_credit(credit).await?)
    }

    #[instrument(skip(self), fields(payment_id = %id))]
    async fn get_payment(&self, id: PaymentId) -> Result<Payment, PortError> {
        Ok(self.fetch_payment(id).await?)
    }

    #[instrument(skip(self), fields(credit_id = %credit_id))]
    async fn list_payments(&self, credit_id: CreditId) -> Result<Vec<Payment>, PortError> {
        Ok(self.fetch_payments(credit_id).await?)
    }

    #[instrument(skip(self, payment, credit), fields(payment_id = %payment.id, credit_id = %credit.id))]
    async fn record_payment(&self, payment: &Payment, credit: &Credit) -> Result<Credit, PortError> {
        debug!("Recording payment");
        Ok(self.insert_payment_with_credit(payment, credit).await?)
    }

    #[instrument(skip(self, credit), fields(payment_id = %payment_id, credit_id = %credit.id))]
    async fn reverse_payment(
        &self,
        payment_id: PaymentId,
        credit: &Credit,
    ) -> Result<Credit, PortError> {
        debug!("Reversing payment");
        Ok(self.deactivate_payment_with_credit(payment_id, credit).await?)
    }
}

#[async_trait]
impl CounterpartyPort for PostgresLedger {
    #[instrument(skip(self))]
    async fn find_counterparty_by_code(&self, code: &str) -> Result<Option<Counterparty>, PortError> {
        Ok(self.fetch_counterparty(code).await?)
    }

    #[instrument(skip(self, counterparty), fields(code = %counterparty.code))]
    async fn insert_counterparty(&self, counterparty: &Counterparty) -> Result<(), PortError> {
        Ok(self.create_counterparty(counterparty).await?)
    }
}

#[async_trait]
impl SequencePort for PostgresLedger {
    #[instrument(skip(self))]
    async fn next_sequence(&self, category: &str, year: i32) -> Result<u32, PortError> {
        let value = self.increment_sequence(category, year).await?;
        debug!(sequence = value, "Allocated sequence");
        Ok(value)
    }
}
