//! Import layouts
//!
//! Credit files arrive in one of two layouts: the application's own
//! (legacy) export, or a core-banking export with different column names
//! and a slightly different shape. The layout is detected once per file
//! from the first row and every row is then parsed into the matching
//! [`CreditRow`] variant.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use domain_credit::{Collectibility, CreditStatus};

use crate::error::ImportError;
use crate::parse::{parse_count, parse_date, parse_number};

/// One row as handed over by the spreadsheet reader
pub type RawRow = HashMap<String, String>;

/// Column names of the application's own export
pub mod legacy {
    pub const CONTRACT: &str = "no_kontrak";
    pub const COUNTERPARTY_CODE: &str = "kode_debitur";
    pub const COUNTERPARTY_NAME: &str = "nama_debitur";
    pub const CATEGORY: &str = "jenis_kredit";
    pub const PLAFOND: &str = "plafond";
    pub const OUTSTANDING: &str = "outstanding";
    pub const DISBURSEMENT_DATE: &str = "tanggal_akad";
    pub const MATURITY_DATE: &str = "tanggal_jatuh_tempo";
    pub const COLLECTIBILITY: &str = "kolektibilitas";
    pub const STATUS: &str = "status";
    pub const DAYS_PAST_DUE: &str = "hari_tunggakan";
    pub const LAST_PAYMENT_DATE: &str = "tanggal_bayar_terakhir";
}

/// Column names of the core-banking export
pub mod bank_export {
    pub const ACCOUNT: &str = "no_rekening";
    pub const CIF: &str = "cif";
    pub const CUSTOMER_NAME: &str = "nama_nasabah";
    pub const LOAN_TYPE: &str = "jenis_pinjaman";
    pub const PLAFON: &str = "plafon";
    pub const BAKI_DEBET: &str = "baki_debet";
    pub const REALIZATION_DATE: &str = "tgl_realisasi";
    pub const MATURITY_DATE: &str = "tgl_jatuh_tempo";
    pub const COLLECTIBILITY: &str = "kolektibilitas";
    pub const ARREARS_DAYS: &str = "tunggakan_hari";
    pub const LAST_PAYMENT_DATE: &str = "tgl_bayar_terakhir";
}

/// Column names of payment files
pub mod payment {
    pub const CONTRACT: &str = "no_kontrak";
    pub const CONTRACT_ALIAS: &str = "no_rekening";
    pub const DATE: &str = "tanggal_bayar";
    pub const AMOUNT: &str = "jumlah_bayar";
    pub const PRINCIPAL: &str = "pokok";
    pub const INTEREST: &str = "bunga";
    pub const PENALTY: &str = "denda";
    pub const NOTE: &str = "keterangan";
}

/// Normalizes a header: trimmed, lower-cased, runs of spaces, `-`, `.` and
/// `_` collapsed to a single `_`
///
/// `"No. Kontrak"`, `"no-kontrak"` and `"NO_KONTRAK"` all become
/// `no_kontrak`.
pub fn normalize_header(header: &str) -> String {
    let mut normalized = String::with_capacity(header.len());
    let mut pending_separator = false;

    for c in header.trim().chars() {
        if c.is_whitespace() || matches!(c, '-' | '.' | '_') {
            pending_separator = true;
            continue;
        }
        if pending_separator && !normalized.is_empty() {
            normalized.push('_');
        }
        pending_separator = false;
        normalized.extend(c.to_lowercase());
    }
    normalized
}

/// A row keyed by normalized header, with typed accessors
#[derive(Debug, Clone, Default)]
pub struct Fields {
    values: HashMap<String, String>,
}

impl Fields {
    /// Normalizes headers and trims values
    ///
    /// When two headers normalize to the same name, a non-empty value wins.
    pub fn from_raw(row: &RawRow) -> Self {
        let mut values: HashMap<String, String> = HashMap::with_capacity(row.len());
        for (header, value) in row {
            let key = normalize_header(header);
            let value = value.trim().to_string();
            match values.get(&key) {
                Some(existing) if !existing.is_empty() => {}
                _ => {
                    values.insert(key, value);
                }
            }
        }
        Self { values }
    }

    /// True when every cell is empty
    pub fn is_blank(&self) -> bool {
        self.values.values().all(|v| v.is_empty())
    }

    /// True when the column header is present, even with an empty cell
    pub fn has_column(&self, column: &str) -> bool {
        self.values.contains_key(column)
    }

    /// Sorted column names, for diagnostics
    pub fn columns(&self) -> Vec<&str> {
        let mut columns: Vec<&str> = self.values.keys().map(String::as_str).collect();
        columns.sort_unstable();
        columns
    }

    /// Non-empty cell value
    pub fn text(&self, column: &str) -> Option<&str> {
        self.values
            .get(column)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn required_text(&self, column: &'static str) -> Result<&str, ImportError> {
        self.text(column)
            .ok_or(ImportError::MissingField { field: column })
    }

    pub fn number(&self, column: &'static str) -> Result<Option<Decimal>, ImportError> {
        self.text(column)
            .map(|raw| {
                parse_number(raw).ok_or_else(|| ImportError::InvalidNumber {
                    field: column,
                    value: raw.to_string(),
                })
            })
            .transpose()
    }

    pub fn required_number(&self, column: &'static str) -> Result<Decimal, ImportError> {
        self.number(column)?
            .ok_or(ImportError::MissingField { field: column })
    }

    pub fn count(&self, column: &'static str) -> Result<Option<u32>, ImportError> {
        self.text(column)
            .map(|raw| {
                parse_count(raw).ok_or_else(|| ImportError::InvalidNumber {
                    field: column,
                    value: raw.to_string(),
                })
            })
            .transpose()
    }

    pub fn date(&self, column: &'static str) -> Result<Option<NaiveDate>, ImportError> {
        self.text(column)
            .map(|raw| {
                parse_date(raw).ok_or_else(|| ImportError::InvalidDate {
                    field: column,
                    value: raw.to_string(),
                })
            })
            .transpose()
    }

    pub fn required_date(&self, column: &'static str) -> Result<NaiveDate, ImportError> {
        self.date(column)?
            .ok_or(ImportError::MissingField { field: column })
    }

    pub fn collectibility(&self, column: &'static str) -> Result<Option<Collectibility>, ImportError> {
        self.text(column)
            .map(|raw| {
                raw.parse::<Collectibility>()
                    .map_err(|e| ImportError::invalid_value(column, e.to_string()))
            })
            .transpose()
    }

    pub fn status(&self, column: &'static str) -> Result<Option<CreditStatus>, ImportError> {
        self.text(column)
            .map(|raw| {
                raw.parse::<CreditStatus>()
                    .map_err(|e| ImportError::invalid_value(column, e.to_string()))
            })
            .transpose()
    }
}

/// The layout of a credit file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportSchema {
    /// The application's own export
    Legacy,
    /// Core-banking export; may create counterparties
    BankExport,
}

impl ImportSchema {
    /// Detects the layout from the first row's headers
    pub fn detect(first_row: &Fields) -> Result<Self, ImportError> {
        if first_row.has_column(bank_export::ACCOUNT) || first_row.has_column(bank_export::CIF) {
            Ok(ImportSchema::BankExport)
        } else if first_row.has_column(legacy::CONTRACT) {
            Ok(ImportSchema::Legacy)
        } else {
            Err(ImportError::UnrecognizedSchema {
                columns: first_row.columns().join(", "),
            })
        }
    }

    /// Whether an unknown counterparty code may be registered from the row
    pub fn creates_counterparties(&self) -> bool {
        matches!(self, ImportSchema::BankExport)
    }
}

/// A credit row in the application's own layout
#[derive(Debug, Clone, PartialEq)]
pub struct LegacyRow {
    pub contract_number: String,
    pub counterparty_code: String,
    pub counterparty_name: Option<String>,
    pub category: String,
    pub plafond: Decimal,
    pub outstanding: Decimal,
    pub disbursement_date: Option<NaiveDate>,
    pub maturity_date: Option<NaiveDate>,
    pub collectibility: Option<Collectibility>,
    pub status: Option<CreditStatus>,
    pub days_past_due: Option<u32>,
    pub last_payment_date: Option<NaiveDate>,
}

impl LegacyRow {
    fn parse(fields: &Fields) -> Result<Self, ImportError> {
        Ok(Self {
            contract_number: fields.required_text(legacy::CONTRACT)?.to_string(),
            counterparty_code: fields.required_text(legacy::COUNTERPARTY_CODE)?.to_string(),
            counterparty_name: fields.text(legacy::COUNTERPARTY_NAME).map(str::to_string),
            category: fields.required_text(legacy::CATEGORY)?.to_string(),
            plafond: fields.required_number(legacy::PLAFOND)?,
            outstanding: fields.required_number(legacy::OUTSTANDING)?,
            disbursement_date: fields.date(legacy::DISBURSEMENT_DATE)?,
            maturity_date: fields.date(legacy::MATURITY_DATE)?,
            collectibility: fields.collectibility(legacy::COLLECTIBILITY)?,
            status: fields.status(legacy::STATUS)?,
            days_past_due: fields.count(legacy::DAYS_PAST_DUE)?,
            last_payment_date: fields.date(legacy::LAST_PAYMENT_DATE)?,
        })
    }
}

/// A credit row in the core-banking layout
///
/// Carries no status column; status always follows collectibility.
#[derive(Debug, Clone, PartialEq)]
pub struct BankExportRow {
    pub account_number: String,
    pub cif: String,
    pub customer_name: String,
    pub loan_type: String,
    pub plafon: Decimal,
    pub baki_debet: Decimal,
    pub realization_date: Option<NaiveDate>,
    pub maturity_date: Option<NaiveDate>,
    pub collectibility: Option<Collectibility>,
    pub arrears_days: Option<u32>,
    pub last_payment_date: Option<NaiveDate>,
}

impl BankExportRow {
    fn parse(fields: &Fields) -> Result<Self, ImportError> {
        Ok(Self {
            account_number: fields.required_text(bank_export::ACCOUNT)?.to_string(),
            cif: fields.required_text(bank_export::CIF)?.to_string(),
            customer_name: fields.required_text(bank_export::CUSTOMER_NAME)?.to_string(),
            loan_type: fields.required_text(bank_export::LOAN_TYPE)?.to_string(),
            plafon: fields.required_number(bank_export::PLAFON)?,
            baki_debet: fields.required_number(bank_export::BAKI_DEBET)?,
            realization_date: fields.date(bank_export::REALIZATION_DATE)?,
            maturity_date: fields.date(bank_export::MATURITY_DATE)?,
            collectibility: fields.collectibility(bank_export::COLLECTIBILITY)?,
            arrears_days: fields.count(bank_export::ARREARS_DAYS)?,
            last_payment_date: fields.date(bank_export::LAST_PAYMENT_DATE)?,
        })
    }
}

/// A parsed credit row, tagged by layout
#[derive(Debug, Clone, PartialEq)]
pub enum CreditRow {
    Legacy(LegacyRow),
    BankExport(BankExportRow),
}

impl CreditRow {
    /// Parses a row according to the file's layout
    pub fn parse(schema: ImportSchema, fields: &Fields) -> Result<Self, ImportError> {
        match schema {
            ImportSchema::Legacy => LegacyRow::parse(fields).map(CreditRow::Legacy),
            ImportSchema::BankExport => BankExportRow::parse(fields).map(CreditRow::BankExport),
        }
    }

    /// Layout this row was parsed from
    pub fn schema(&self) -> ImportSchema {
        match self {
            CreditRow::Legacy(_) => ImportSchema::Legacy,
            CreditRow::BankExport(_) => ImportSchema::BankExport,
        }
    }
}

/// A parsed payment row
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentRow {
    pub contract_number: String,
    pub payment_date: NaiveDate,
    pub amount: Decimal,
    pub principal: Option<Decimal>,
    pub interest: Option<Decimal>,
    pub penalty: Option<Decimal>,
    pub note: Option<String>,
}

impl PaymentRow {
    /// Parses a payment row; the contract may be given as account number
    pub fn parse(fields: &Fields) -> Result<Self, ImportError> {
        let contract_number = fields
            .text(payment::CONTRACT)
            .or_else(|| fields.text(payment::CONTRACT_ALIAS))
            .ok_or(ImportError::MissingField {
                field: payment::CONTRACT,
            })?;

        Ok(Self {
            contract_number: contract_number.to_string(),
            payment_date: fields.required_date(payment::DATE)?,
            amount: fields.required_number(payment::AMOUNT)?,
            principal: fields.number(payment::PRINCIPAL)?,
            interest: fields.number(payment::INTEREST)?,
            penalty: fields.number(payment::PENALTY)?,
            note: fields.text(payment::NOTE).map(str::to_string),
        })
    }
}
