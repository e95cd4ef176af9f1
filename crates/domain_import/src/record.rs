//! Layout-independent credit records
//!
//! Both layouts normalize into a [`CreditRecord`], which is what the
//! pipeline writes.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use core_kernel::CounterpartyId;
use domain_credit::{Collectibility, Credit, CreditStatus};

use crate::error::ImportError;
use crate::schema::{bank_export, legacy, CreditRow};

/// Counterparty as referenced by a row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterpartyRef {
    pub code: String,
    /// Checked against an existing counterparty when present
    pub name: Option<String>,
    /// Register the counterparty when the code is unknown
    pub create_if_missing: bool,
}

/// A validated credit row
#[derive(Debug, Clone, PartialEq)]
pub struct CreditRecord {
    pub contract_number: String,
    pub counterparty: CounterpartyRef,
    pub category: String,
    pub plafond: Decimal,
    pub outstanding: Decimal,
    pub status: CreditStatus,
    pub collectibility: Collectibility,
    pub disbursement_date: Option<NaiveDate>,
    pub maturity_date: Option<NaiveDate>,
    pub last_payment_date: Option<NaiveDate>,
    pub days_past_due: u32,
}

struct Columns {
    plafond: &'static str,
    outstanding: &'static str,
}

impl TryFrom<CreditRow> for CreditRecord {
    type Error = ImportError;

    fn try_from(row: CreditRow) -> Result<Self, Self::Error> {
        let (record, columns, explicit_status) = match row {
            CreditRow::Legacy(row) => (
                CreditRecord {
                    contract_number: row.contract_number,
                    counterparty: CounterpartyRef {
                        code: row.counterparty_code,
                        name: row.counterparty_name,
                        create_if_missing: false,
                    },
                    category: row.category,
                    plafond: row.plafond,
                    outstanding: row.outstanding,
                    status: CreditStatus::Lancar,
                    collectibility: row.collectibility.unwrap_or(Collectibility::BEST),
                    disbursement_date: row.disbursement_date,
                    maturity_date: row.maturity_date,
                    last_payment_date: row.last_payment_date,
                    days_past_due: row.days_past_due.unwrap_or(0),
                },
                Columns {
                    plafond: legacy::PLAFOND,
                    outstanding: legacy::OUTSTANDING,
                },
                row.status.map(|status| (status, row.collectibility)),
            ),
            CreditRow::BankExport(row) => (
                CreditRecord {
                    contract_number: row.account_number,
                    counterparty: CounterpartyRef {
                        code: row.cif,
                        name: Some(row.customer_name),
                        create_if_missing: true,
                    },
                    category: row.loan_type,
                    plafond: row.plafon,
                    outstanding: row.baki_debet,
                    status: CreditStatus::Lancar,
                    collectibility: row.collectibility.unwrap_or(Collectibility::BEST),
                    disbursement_date: row.realization_date,
                    maturity_date: row.maturity_date,
                    last_payment_date: row.last_payment_date,
                    days_past_due: row.arrears_days.unwrap_or(0),
                },
                Columns {
                    plafond: bank_export::PLAFON,
                    outstanding: bank_export::BAKI_DEBET,
                },
                None,
            ),
        };

        record.validated(&columns, explicit_status)
    }
}

impl CreditRecord {
    /// Checks amounts and resolves the final status
    ///
    /// Status comes from the explicit status column, then from
    /// collectibility, then defaults to Lancar. A zero balance without an
    /// explicit status is Lunas.
    fn validated(
        mut self,
        columns: &Columns,
        explicit_status: Option<(CreditStatus, Option<Collectibility>)>,
    ) -> Result<Self, ImportError> {
        if self.plafond < Decimal::ZERO {
            return Err(ImportError::invalid_value(columns.plafond, "must not be negative"));
        }
        if self.outstanding < Decimal::ZERO {
            return Err(ImportError::invalid_value(columns.outstanding, "must not be negative"));
        }
        if self.outstanding > self.plafond {
            return Err(ImportError::invalid_value(
                columns.outstanding,
                format!("{} exceeds plafond {}", self.outstanding, self.plafond),
            ));
        }

        match explicit_status {
            Some((CreditStatus::Lunas, _)) if !self.outstanding.is_zero() => {
                return Err(ImportError::invalid_value(
                    legacy::STATUS,
                    format!("Lunas requires zero outstanding, got {}", self.outstanding),
                ));
            }
            Some((status, collectibility)) => {
                self.status = status;
                self.collectibility =
                    collectibility.unwrap_or_else(|| status.canonical_collectibility());
            }
            None if self.outstanding.is_zero() => {
                self.status = CreditStatus::Lunas;
                self.collectibility = Collectibility::BEST;
            }
            None => {
                self.status = CreditStatus::from_collectibility(self.collectibility);
            }
        }

        if self.status.is_terminal() {
            self.days_past_due = 0;
        }
        Ok(self)
    }

    /// Builds a new credit for this record
    pub fn to_credit(&self, counterparty_id: CounterpartyId) -> Credit {
        let mut credit = Credit::new(
            self.contract_number.clone(),
            counterparty_id,
            self.category.clone(),
            self.plafond,
            self.outstanding,
        );
        self.apply_to(&mut credit, counterparty_id);
        credit
    }

    /// Overwrites an existing credit with this record's values
    ///
    /// The row's status wins, so a Lunas credit re-imported with a balance
    /// is reopened at the row's status.
    pub fn apply_to(&self, credit: &mut Credit, counterparty_id: CounterpartyId) {
        credit.counterparty_id = counterparty_id;
        credit.category = self.category.clone();
        credit.plafond = self.plafond;
        credit.outstanding = self.outstanding;
        credit.disbursement_date = self.disbursement_date.or(credit.disbursement_date);
        credit.maturity_date = self.maturity_date.or(credit.maturity_date);
        credit.days_past_due = self.days_past_due;
        credit.set_status(self.status, Some(self.collectibility), self.last_payment_date);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{BankExportRow, LegacyRow};

    fn legacy_row(outstanding: Decimal) -> LegacyRow {
        LegacyRow {
            contract_number: "K-1".to_string(),
            counterparty_code: "D-1".to_string(),
            counterparty_name: None,
            category: "KMK".to_string(),
            plafond: Decimal::from(1000),
            outstanding,
            disbursement_date: None,
            maturity_date: None,
            collectibility: None,
            status: None,
            days_past_due: Some(30),
            last_payment_date: None,
        }
    }

    #[test]
    fn test_defaults_to_lancar() {
        let record = CreditRecord::try_from(CreditRow::Legacy(legacy_row(Decimal::from(500)))).unwrap();
        assert_eq!(record.status, CreditStatus::Lancar);
        assert_eq!(record.collectibility, Collectibility::Current);
        assert!(!record.counterparty.create_if_missing);
    }

    #[test]
    fn test_zero_outstanding_is_lunas() {
        let record = CreditRecord::try_from(CreditRow::Legacy(legacy_row(Decimal::ZERO))).unwrap();
        assert_eq!(record.status, CreditStatus::Lunas);
        assert_eq!(record.days_past_due, 0);
    }

    #[test]
    fn test_explicit_status_wins_over_collectibility() {
        let mut row = legacy_row(Decimal::from(500));
        row.status = Some(CreditStatus::Macet);
        row.collectibility = Some(Collectibility::Substandard);
        let record = CreditRecord::try_from(CreditRow::Legacy(row)).unwrap();
        assert_eq!(record.status, CreditStatus::Macet);
        assert_eq!(record.collectibility, Collectibility::Substandard);
    }

    #[test]
    fn test_explicit_status_without_collectibility_uses_canonical_tier() {
        let mut row = legacy_row(Decimal::from(500));
        row.status = Some(CreditStatus::Diragukan);
        let record = CreditRecord::try_from(CreditRow::Legacy(row)).unwrap();
        assert_eq!(record.collectibility, Collectibility::Doubtful);
    }

    #[test]
    fn test_lunas_with_balance_is_rejected() {
        let mut row = legacy_row(Decimal::from(1));
        row.status = Some(CreditStatus::Lunas);
        let error = CreditRecord::try_from(CreditRow::Legacy(row)).unwrap_err();
        assert_eq!(error.field(), Some(legacy::STATUS));
    }

    #[test]
    fn test_outstanding_above_plafond_is_rejected() {
        let error = CreditRecord::try_from(CreditRow::Legacy(legacy_row(Decimal::from(1001)))).unwrap_err();
        assert_eq!(error.field(), Some(legacy::OUTSTANDING));
    }

    #[test]
    fn test_bank_export_status_follows_collectibility() {
        let row = BankExportRow {
            account_number: "001".to_string(),
            cif: "C-1".to_string(),
            customer_name: "Budi".to_string(),
            loan_type: "KUR".to_string(),
            plafon: Decimal::from(1000),
            baki_debet: Decimal::from(-5),
            realization_date: None,
            maturity_date: None,
            collectibility: Some(Collectibility::Loss),
            arrears_days: None,
            last_payment_date: None,
        };
        let error = CreditRecord::try_from(CreditRow::BankExport(row.clone())).unwrap_err();
        assert_eq!(error.field(), Some(bank_export::BAKI_DEBET));

        let record = CreditRecord::try_from(CreditRow::BankExport(BankExportRow {
            baki_debet: Decimal::from(800),
            ..row
        }))
        .unwrap();
        assert_eq!(record.status, CreditStatus::Macet);
        assert!(record.counterparty.create_if_missing);
        assert_eq!(record.counterparty.name.as_deref(), Some("Budi"));
    }
}
