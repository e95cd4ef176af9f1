//! Import errors
//!
//! Everything except [`ImportError::UnrecognizedSchema`] is a row-level
//! failure: the pipeline records it against the row and moves on.

use thiserror::Error;

use core_kernel::PortError;
use domain_credit::CreditError;

/// Errors raised while importing tabular rows
#[derive(Debug, Error)]
pub enum ImportError {
    /// The first row carries none of the columns that identify a schema
    #[error("Unrecognized import layout; columns found: {columns}")]
    UnrecognizedSchema { columns: String },

    /// A required column is absent or empty
    #[error("Missing required column '{field}'")]
    MissingField { field: &'static str },

    /// A numeric column could not be parsed
    #[error("Column '{field}' is not a valid number: {value:?}")]
    InvalidNumber { field: &'static str, value: String },

    /// A date column matched none of the accepted layouts
    #[error("Column '{field}' is not a valid date (DD/MM/YYYY, YYYY-MM-DD or DD-MM-YYYY): {value:?}")]
    InvalidDate { field: &'static str, value: String },

    /// A value parsed but breaks a rule, e.g. outstanding above plafond
    #[error("Column '{field}': {message}")]
    InvalidValue { field: &'static str, message: String },

    /// An existing counterparty is registered under a different name
    #[error("Counterparty {code} is registered as '{existing}' but the row names '{supplied}'")]
    CounterpartyNameMismatch {
        code: String,
        existing: String,
        supplied: String,
    },

    /// Counterparty code is unknown and this layout may not create one
    #[error("Counterparty not found: {code}")]
    CounterpartyNotFound { code: String },

    /// No active credit carries the contract number
    #[error("Credit not found for contract {contract_number}")]
    CreditNotFound { contract_number: String },

    /// Failure from the credit domain or its storage
    #[error(transparent)]
    Credit(#[from] CreditError),
}

impl From<PortError> for ImportError {
    fn from(error: PortError) -> Self {
        ImportError::Credit(error.into())
    }
}

impl ImportError {
    /// Creates an InvalidValue error
    pub fn invalid_value(field: &'static str, message: impl Into<String>) -> Self {
        ImportError::InvalidValue {
            field,
            message: message.into(),
        }
    }

    /// Column responsible for the failure, when there is one
    pub fn field(&self) -> Option<&str> {
        match self {
            ImportError::MissingField { field }
            | ImportError::InvalidNumber { field, .. }
            | ImportError::InvalidDate { field, .. }
            | ImportError::InvalidValue { field, .. } => Some(field),
            ImportError::Credit(e) => e.field(),
            _ => None,
        }
    }

    /// Returns true for errors that stop the whole import
    pub fn is_file_level(&self) -> bool {
        matches!(self, ImportError::UnrecognizedSchema { .. })
    }
}
