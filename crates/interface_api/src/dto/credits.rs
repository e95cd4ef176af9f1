//! Credit DTOs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::{CounterpartyId, CreditId};
use domain_credit::{Collectibility, Credit, CreditStatus, StatusChange};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditResponse {
    pub id: CreditId,
    pub contract_number: String,
    pub counterparty_id: CounterpartyId,
    pub category: String,
    pub plafond: Decimal,
    pub outstanding: Decimal,
    pub status: CreditStatus,
    pub collectibility: Collectibility,
    pub disbursement_date: Option<NaiveDate>,
    pub maturity_date: Option<NaiveDate>,
    pub last_payment_date: Option<NaiveDate>,
    pub days_past_due: u32,
    pub is_active: bool,
    pub version: i64,
    pub updated_at: DateTime<Utc>,
}

impl From<Credit> for CreditResponse {
    fn from(credit: Credit) -> Self {
        Self {
            id: credit.id,
            contract_number: credit.contract_number,
            counterparty_id: credit.counterparty_id,
            category: credit.category,
            plafond: credit.plafond,
            outstanding: credit.outstanding,
            status: credit.status,
            collectibility: credit.collectibility,
            disbursement_date: credit.disbursement_date,
            maturity_date: credit.maturity_date,
            last_payment_date: credit.last_payment_date,
            days_past_due: credit.days_past_due,
            is_active: credit.is_active,
            version: credit.version,
            updated_at: credit.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StatusChangeRequest {
    #[validate(length(min = 1, max = 1000))]
    pub ids: Vec<CreditId>,
    pub new_status: CreditStatus,
    #[serde(default)]
    pub collectibility: Option<Collectibility>,
    #[serde(default)]
    pub last_payment_date: Option<NaiveDate>,
}

impl From<StatusChangeRequest> for StatusChange {
    fn from(request: StatusChangeRequest) -> Self {
        StatusChange {
            ids: request.ids,
            new_status: request.new_status,
            collectibility: request.collectibility,
            last_payment_date: request.last_payment_date,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BulkDeleteRequest {
    #[validate(length(min = 1, max = 1000))]
    pub ids: Vec<CreditId>,
}
