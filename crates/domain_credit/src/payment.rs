//! Payment events against a credit

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{CreditId, PaymentId};

/// Caller-supplied payment event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInput {
    /// Credit being paid
    pub credit_id: CreditId,
    /// Total amount received
    pub amount: Decimal,
    /// Portion reducing the outstanding balance; defaults to `amount`
    #[serde(default)]
    pub principal: Option<Decimal>,
    #[serde(default)]
    pub interest: Option<Decimal>,
    #[serde(default)]
    pub penalty: Option<Decimal>,
    pub payment_date: NaiveDate,
    /// Free-text reference (bank reference, receipt number)
    #[serde(default)]
    pub reference: Option<String>,
}

impl PaymentInput {
    /// Creates an input with no breakdown
    pub fn new(credit_id: CreditId, amount: Decimal, payment_date: NaiveDate) -> Self {
        Self {
            credit_id,
            amount,
            principal: None,
            interest: None,
            penalty: None,
            payment_date,
            reference: None,
        }
    }

    /// Sets the principal/interest/penalty breakdown
    pub fn with_breakdown(
        mut self,
        principal: Option<Decimal>,
        interest: Option<Decimal>,
        penalty: Option<Decimal>,
    ) -> Self {
        self.principal = principal;
        self.interest = interest;
        self.penalty = penalty;
        self
    }

    /// Sets the reference text
    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }
}

/// A recorded payment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    /// Unique identifier
    pub id: PaymentId,
    /// Credit this payment was applied to
    pub credit_id: CreditId,
    pub amount: Decimal,
    /// Principal exactly as supplied; `None` means "the whole amount"
    pub principal: Option<Decimal>,
    pub interest: Option<Decimal>,
    pub penalty: Option<Decimal>,
    pub payment_date: NaiveDate,
    pub reference: Option<String>,
    /// False once the payment has been reversed
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Payment {
    /// Creates an active payment record from validated input
    pub fn from_input(input: &PaymentInput) -> Self {
        Self {
            id: PaymentId::new(),
            credit_id: input.credit_id,
            amount: input.amount,
            principal: input.principal,
            interest: input.interest,
            penalty: input.penalty,
            payment_date: input.payment_date,
            reference: input.reference.clone(),
            is_active: true,
            created_at: Utc::now(),
        }
    }

    /// Principal applied to the balance, falling back to the amount
    pub fn effective_principal(&self) -> Decimal {
        self.principal.unwrap_or(self.amount)
    }
}
