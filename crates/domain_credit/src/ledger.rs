//! Outstanding-balance ledger
//!
//! The reconciler validates payment events against a credit's outstanding
//! principal, records them, and reverses them when a payment is deleted.
//!
//! # Invariants
//!
//! - Outstanding never drops below zero
//! - A payment's principal never exceeds the outstanding balance it was
//!   applied to
//! - principal + interest + penalty never exceeds the payment amount
//! - Reaching zero outstanding moves the credit to Lunas; reversing a
//!   payment never moves it back

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use core_kernel::{CreditId, PaymentId};
use crate::credit::Credit;
use crate::error::{CreditError, PaymentValidationError};
use crate::payment::{Payment, PaymentInput};
use crate::ports::CreditPort;

/// Breakdown that passed validation, with defaults filled in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedBreakdown {
    pub principal: Decimal,
    pub interest: Decimal,
    pub penalty: Decimal,
}

/// Validates a payment against the current outstanding balance
///
/// An omitted principal defaults to the full amount; omitted interest and
/// penalty count as zero.
///
/// # Errors
///
/// The first violated rule, checked in this order: non-positive amount,
/// negative component, principal above outstanding, breakdown above amount.
pub fn validate(
    amount: Decimal,
    principal: Option<Decimal>,
    interest: Option<Decimal>,
    penalty: Option<Decimal>,
    current_outstanding: Decimal,
) -> Result<ValidatedBreakdown, PaymentValidationError> {
    if amount <= Decimal::ZERO {
        return Err(PaymentValidationError::InvalidAmount { amount });
    }

    let breakdown = ValidatedBreakdown {
        principal: principal.unwrap_or(amount),
        interest: interest.unwrap_or(Decimal::ZERO),
        penalty: penalty.unwrap_or(Decimal::ZERO),
    };

    for (field, value) in [
        ("principal", breakdown.principal),
        ("interest", breakdown.interest),
        ("penalty", breakdown.penalty),
    ] {
        if value < Decimal::ZERO {
            return Err(PaymentValidationError::NegativeComponent { field, value });
        }
    }

    if breakdown.principal > current_outstanding {
        return Err(PaymentValidationError::PrincipalExceedsOutstanding {
            principal: breakdown.principal,
            outstanding: current_outstanding,
        });
    }

    let total = breakdown.principal + breakdown.interest + breakdown.penalty;
    if total > amount {
        return Err(PaymentValidationError::BreakdownExceedsAmount { total, amount });
    }

    Ok(breakdown)
}

/// Result of applying a payment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentReceipt {
    /// The recorded payment
    pub payment: Payment,
    /// The credit after the payment was applied
    pub credit: Credit,
}

/// Applies and reverses payments
///
/// Each operation reads the credit, computes the new state, and hands both
/// the payment and the credit to [`CreditPort`] in one call so the write is
/// checked against the version that was read. A concurrent writer makes the
/// call fail with `CreditError::Conflict`; nothing is retried.
#[derive(Clone)]
pub struct LedgerReconciler {
    credits: Arc<dyn CreditPort>,
}

impl LedgerReconciler {
    /// Creates a reconciler over the given credit store
    pub fn new(credits: Arc<dyn CreditPort>) -> Self {
        Self { credits }
    }

    /// Validates and applies a payment
    ///
    /// # Errors
    ///
    /// - `NotFound` if the credit is missing or soft-deleted
    /// - `PaymentRejected` if validation fails; nothing is written
    /// - `Conflict` if the credit changed between read and write
    #[instrument(skip(self, input), fields(credit_id = %input.credit_id, amount = %input.amount))]
    pub async fn apply(&self, input: PaymentInput) -> Result<PaymentReceipt, CreditError> {
        let credit = self.credits.get_credit(input.credit_id).await?;
        if !credit.is_active {
            return Err(CreditError::not_found("Credit", input.credit_id));
        }

        let breakdown = validate(
            input.amount,
            input.principal,
            input.interest,
            input.penalty,
            credit.outstanding,
        )?;

        let payment = Payment::from_input(&input);
        let mut updated = credit;
        let paid_off = updated.apply_principal(breakdown.principal, input.payment_date);

        let saved = self.credits.record_payment(&payment, &updated).await?;

        info!(
            payment_id = %payment.id,
            principal = %breakdown.principal,
            outstanding = %saved.outstanding,
            paid_off,
            "Payment applied"
        );

        Ok(PaymentReceipt {
            payment,
            credit: saved,
        })
    }

    /// Reverses a payment's effect on its credit and deactivates it
    ///
    /// Only the outstanding balance is restored; a credit that this payment
    /// drove to Lunas stays Lunas.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the payment or its credit is missing
    /// - `InvalidState` if the payment was already reversed
    /// - `Conflict` if the credit changed between read and write
    #[instrument(skip(self), fields(payment_id = %payment_id))]
    pub async fn reverse(&self, payment_id: PaymentId) -> Result<Credit, CreditError> {
        let payment = self.credits.get_payment(payment_id).await?;
        if !payment.is_active {
            return Err(CreditError::invalid_state(format!(
                "payment {} is already reversed",
                payment_id
            )));
        }

        let mut credit = self.credits.get_credit(payment.credit_id).await?;
        credit.restore_principal(payment.effective_principal());

        let saved = self.credits.reverse_payment(payment_id, &credit).await?;

        if saved.is_paid_off() && !saved.outstanding.is_zero() {
            warn!(
                credit_id = %saved.id,
                outstanding = %saved.outstanding,
                "Credit keeps Lunas status after payment reversal"
            );
        }
        info!(credit_id = %saved.id, outstanding = %saved.outstanding, "Payment reversed");

        Ok(saved)
    }

    /// Active payments of a credit, newest first
    pub async fn payments_for(&self, credit_id: CreditId) -> Result<Vec<Payment>, CreditError> {
        Ok(self.credits.list_payments(credit_id).await?)
    }
}
