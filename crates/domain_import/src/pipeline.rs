//! Import pipeline
//!
//! Rows are processed one at a time with no surrounding transaction. A
//! failing row is recorded in the report and the next row is attempted;
//! rows written before it stay written.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use core_kernel::CounterpartyId;
use domain_credit::{Counterparty, CounterpartyPort, CreditPort, LedgerReconciler, PaymentInput};

use crate::error::ImportError;
use crate::record::{CounterpartyRef, CreditRecord};
use crate::report::ImportReport;
use crate::schema::{CreditRow, Fields, ImportSchema, PaymentRow, RawRow};

/// What happened to an imported credit row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowOutcome {
    Created,
    Updated,
}

/// Imports credit and payment files
#[derive(Clone)]
pub struct ImportPipeline {
    credits: Arc<dyn CreditPort>,
    counterparties: Arc<dyn CounterpartyPort>,
    ledger: LedgerReconciler,
}

impl ImportPipeline {
    /// Creates a pipeline; payments go through a reconciler over `credits`
    pub fn new(credits: Arc<dyn CreditPort>, counterparties: Arc<dyn CounterpartyPort>) -> Self {
        let ledger = LedgerReconciler::new(credits.clone());
        Self {
            credits,
            counterparties,
            ledger,
        }
    }

    /// Imports credit rows, creating or updating credits by contract number
    ///
    /// # Errors
    ///
    /// Only `UnrecognizedSchema`, before any row is written. Row failures
    /// end up in the report.
    #[instrument(skip(self, rows), fields(rows = rows.len()))]
    pub async fn import_credits(&self, rows: &[RawRow]) -> Result<ImportReport, ImportError> {
        let parsed: Vec<(usize, &RawRow, Fields)> = rows
            .iter()
            .enumerate()
            .map(|(index, raw)| (index + 1, raw, Fields::from_raw(raw)))
            .filter(|(_, _, fields)| !fields.is_blank())
            .collect();

        let mut report = ImportReport::default();
        let Some((_, _, first)) = parsed.first() else {
            return Ok(report);
        };
        let schema = ImportSchema::detect(first)?;
        debug!(?schema, "Detected import layout");

        for (row, raw, fields) in &parsed {
            match self.import_credit_row(schema, fields).await {
                Ok(outcome) => {
                    debug!(row, ?outcome, "Credit row imported");
                    report.record_success();
                }
                Err(error) => {
                    warn!(row, error = %error, "Credit row rejected");
                    report.record_failure(*row, raw, &error);
                }
            }
        }

        info!(
            success_count = report.success_count,
            failed_count = report.failed_count,
            "Credit import finished"
        );
        Ok(report)
    }

    /// Imports payment rows through the ledger
    ///
    /// A row whose principal exceeds the credit's outstanding balance is
    /// rejected like any other invalid payment and the credit is untouched.
    #[instrument(skip(self, rows), fields(rows = rows.len()))]
    pub async fn import_payments(&self, rows: &[RawRow]) -> Result<ImportReport, ImportError> {
        let mut report = ImportReport::default();

        for (index, raw) in rows.iter().enumerate() {
            let fields = Fields::from_raw(raw);
            if fields.is_blank() {
                continue;
            }

            let row = index + 1;
            match self.import_payment_row(&fields).await {
                Ok(()) => report.record_success(),
                Err(error) => {
                    warn!(row, error = %error, "Payment row rejected");
                    report.record_failure(row, raw, &error);
                }
            }
        }

        info!(
            success_count = report.success_count,
            failed_count = report.failed_count,
            "Payment import finished"
        );
        Ok(report)
    }

    async fn import_credit_row(
        &self,
        schema: ImportSchema,
        fields: &Fields,
    ) -> Result<RowOutcome, ImportError> {
        let record = CreditRecord::try_from(CreditRow::parse(schema, fields)?)?;
        let counterparty_id = self.resolve_counterparty(&record.counterparty).await?;

        match self.credits.find_credit_by_contract(&record.contract_number).await? {
            Some(mut credit) => {
                record.apply_to(&mut credit, counterparty_id);
                self.credits.save_credit(&credit).await?;
                Ok(RowOutcome::Updated)
            }
            None => {
                self.credits.insert_credit(&record.to_credit(counterparty_id)).await?;
                Ok(RowOutcome::Created)
            }
        }
    }

    /// Finds the counterparty by code, registering it when the layout allows
    async fn resolve_counterparty(
        &self,
        reference: &CounterpartyRef,
    ) -> Result<CounterpartyId, ImportError> {
        let found = self
            .counterparties
            .find_counterparty_by_code(&reference.code)
            .await?;

        match (found, &reference.name) {
            (Some(existing), Some(name)) if !existing.name_matches(name) => {
                Err(ImportError::CounterpartyNameMismatch {
                    code: reference.code.clone(),
                    existing: existing.name,
                    supplied: name.clone(),
                })
            }
            (Some(existing), _) => Ok(existing.id),
            (None, Some(name)) if reference.create_if_missing => {
                let counterparty = Counterparty::new(reference.code.clone(), name.clone());
                self.counterparties.insert_counterparty(&counterparty).await?;
                info!(code = %counterparty.code, "Counterparty registered from import");
                Ok(counterparty.id)
            }
            (None, _) => Err(ImportError::CounterpartyNotFound {
                code: reference.code.clone(),
            }),
        }
    }

    async fn import_payment_row(&self, fields: &Fields) -> Result<(), ImportError> {
        let row = PaymentRow::parse(fields)?;

        let credit = self
            .credits
            .find_credit_by_contract(&row.contract_number)
            .await?
            .ok_or_else(|| ImportError::CreditNotFound {
                contract_number: row.contract_number.clone(),
            })?;

        let mut input = PaymentInput::new(credit.id, row.amount, row.payment_date)
            .with_breakdown(row.principal, row.interest, row.penalty);
        if let Some(note) = row.note {
            input = input.with_reference(note);
        }

        self.ledger.apply(input).await?;
        Ok(())
    }
}
