//! Payment DTOs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::{CreditId, PaymentId};
use domain_credit::{Payment, PaymentInput, PaymentReceipt};

use super::credits::CreditResponse;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ApplyPaymentRequest {
    pub credit_id: CreditId,
    pub amount: Decimal,
    #[serde(default)]
    pub principal: Option<Decimal>,
    #[serde(default)]
    pub interest: Option<Decimal>,
    #[serde(default)]
    pub penalty: Option<Decimal>,
    pub payment_date: NaiveDate,
    #[validate(length(max = 255))]
    #[serde(default)]
    pub reference: Option<String>,
}

impl From<ApplyPaymentRequest> for PaymentInput {
    fn from(request: ApplyPaymentRequest) -> Self {
        PaymentInput {
            credit_id: request.credit_id,
            amount: request.amount,
            principal: request.principal,
            interest: request.interest,
            penalty: request.penalty,
            payment_date: request.payment_date,
            reference: request.reference,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
    pub id: PaymentId,
    pub credit_id: CreditId,
    pub amount: Decimal,
    pub principal: Option<Decimal>,
    pub interest: Option<Decimal>,
    pub penalty: Option<Decimal>,
    pub payment_date: NaiveDate,
    pub reference: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Payment> for PaymentResponse {
    fn from(payment: Payment) -> Self {
        Self {
            id: payment.id,
            credit_id: payment.credit_id,
            amount: payment.amount,
            principal: payment.principal,
            interest: payment.interest,
            penalty: payment.penalty,
            payment_date: payment.payment_date,
            reference: payment.reference,
            is_active: payment.is_active,
            created_at: payment.created_at,
        }
    }
}

/// The recorded payment together with the credit it changed
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentReceiptResponse {
    pub payment: PaymentResponse,
    pub credit: CreditResponse,
}

impl From<PaymentReceipt> for PaymentReceiptResponse {
    fn from(receipt: PaymentReceipt) -> Self {
        Self {
            payment: receipt.payment.into(),
            credit: receipt.credit.into(),
        }
    }
}
