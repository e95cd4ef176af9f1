//! Row types and their mapping onto domain models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

use core_kernel::{CounterpartyId, CreditId, PaymentId};
use domain_credit::{Collectibility, Counterparty, Credit, CreditStatus, Payment};

use crate::error::DatabaseError;

/// Column list shared by every query that returns a credit row
macro_rules! credit_columns {
    () => {
        "credit_id, contract_number, counterparty_id, category, plafond, outstanding, \
         status, collectibility, disbursement_date, maturity_date, last_payment_date, \
         days_past_due, is_active, version, created_at, updated_at"
    };
}

macro_rules! payment_columns {
    () => {
        "payment_id, credit_id, amount, principal, interest, penalty, payment_date, \
         reference, is_active, created_at"
    };
}

macro_rules! counterparty_columns {
    () => {
        "counterparty_id, code, name, is_active, created_at"
    };
}

pub(crate) use {counterparty_columns, credit_columns, payment_columns};

#[derive(Debug, Clone, FromRow)]
pub(crate) struct CreditRow {
    pub credit_id: Uuid,
    pub contract_number: String,
    pub counterparty_id: Uuid,
    pub category: String,
    pub plafond: Decimal,
    pub outstanding: Decimal,
    pub status: String,
    pub collectibility: String,
    pub disbursement_date: Option<NaiveDate>,
    pub maturity_date: Option<NaiveDate>,
    pub last_payment_date: Option<NaiveDate>,
    pub days_past_due: i32,
    pub is_active: bool,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<CreditRow> for Credit {
    type Error = DatabaseError;

    fn try_from(row: CreditRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<CreditStatus>()
            .map_err(|_| DatabaseError::corrupt("status", &row.status))?;
        let collectibility = row
            .collectibility
            .parse::<Collectibility>()
            .map_err(|_| DatabaseError::corrupt("collectibility", &row.collectibility))?;
        let days_past_due = u32::try_from(row.days_past_due)
            .map_err(|_| DatabaseError::corrupt("days_past_due", row.days_past_due))?;

        Ok(Credit {
            id: CreditId::from_uuid(row.credit_id),
            contract_number: row.contract_number,
            counterparty_id: CounterpartyId::from_uuid(row.counterparty_id),
            category: row.category,
            plafond: row.plafond,
            outstanding: row.outstanding,
            status,
            collectibility,
            disbursement_date: row.disbursement_date,
            maturity_date: row.maturity_date,
            last_payment_date: row.last_payment_date,
            days_past_due,
            is_active: row.is_active,
            version: row.version,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub(crate) struct PaymentRow {
    pub payment_id: Uuid,
    pub credit_id: Uuid,
    pub amount: Decimal,
    pub principal: Option<Decimal>,
    pub interest: Option<Decimal>,
    pub penalty: Option<Decimal>,
    pub payment_date: NaiveDate,
    pub reference: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<PaymentRow> for Payment {
    fn from(row: PaymentRow) -> Self {
        Payment {
            id: PaymentId::from_uuid(row.payment_id),
            credit_id: CreditId::from_uuid(row.credit_id),
            amount: row.amount,
            principal: row.principal,
            interest: row.interest,
            penalty: row.penalty,
            payment_date: row.payment_date,
            reference: row.reference,
            is_active: row.is_active,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub(crate) struct CounterpartyRow {
    pub counterparty_id: Uuid,
    pub code: String,
    pub name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<CounterpartyRow> for Counterparty {
    fn from(row: CounterpartyRow) -> Self {
        Counterparty {
            id: CounterpartyId::from_uuid(row.counterparty_id),
            code: row.code,
            name: row.name,
            is_active: row.is_active,
            created_at: row.created_at,
        }
    }
}

/// Days past due as stored; the column is a signed INTEGER
pub(crate) fn days_to_db(days: u32) -> Result<i32, DatabaseError> {
    i32::try_from(days)
        .map_err(|_| DatabaseError::ConstraintViolation(format!("days past due {} is out of range", days)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(status: &str) -> CreditRow {
        let now = Utc::now();
        CreditRow {
            credit_id: Uuid::now_v7(),
            contract_number: "K-1".to_string(),
            counterparty_id: Uuid::now_v7(),
            category: "KMK".to_string(),
            plafond: Decimal::from(100),
            outstanding: Decimal::from(40),
            status: status.to_string(),
            collectibility: "2".to_string(),
            disbursement_date: None,
            maturity_date: None,
            last_payment_date: None,
            days_past_due: 12,
            is_active: true,
            version: 3,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_credit_row_maps_labels() {
        let credit = Credit::try_from(row("Dalam Perhatian Khusus")).unwrap();
        assert_eq!(credit.status, CreditStatus::DalamPerhatianKhusus);
        assert_eq!(credit.collectibility, Collectibility::SpecialMention);
        assert_eq!(credit.days_past_due, 12);
        assert_eq!(credit.version, 3);
    }

    #[test]
    fn test_unknown_status_is_corrupt() {
        let error = Credit::try_from(row("Restrukturisasi")).unwrap_err();
        assert!(matches!(error, DatabaseError::CorruptRow(_)));
    }

    #[test]
    fn test_negative_days_are_corrupt() {
        let mut bad = row("Lancar");
        bad.days_past_due = -1;
        assert!(Credit::try_from(bad).is_err());
    }
}
