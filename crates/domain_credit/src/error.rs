//! Credit domain errors

use rust_decimal::Decimal;
use thiserror::Error;

use core_kernel::PortError;

/// Reasons a payment is rejected before anything is persisted
///
/// Checks run in declaration order and the first violation wins.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentValidationError {
    /// Amount is zero or negative
    #[error("Payment amount must be greater than zero, got {amount}")]
    InvalidAmount { amount: Decimal },

    /// One of principal, interest or penalty is negative
    #[error("Payment {field} must not be negative, got {value}")]
    NegativeComponent { field: &'static str, value: Decimal },

    /// Principal would drive the outstanding balance below zero
    #[error("Principal {principal} exceeds outstanding balance {outstanding}")]
    PrincipalExceedsOutstanding {
        principal: Decimal,
        outstanding: Decimal,
    },

    /// Breakdown components add up to more than the payment amount
    #[error("Principal, interest and penalty total {total}, which exceeds the payment amount {amount}")]
    BreakdownExceedsAmount { total: Decimal, amount: Decimal },
}

impl PaymentValidationError {
    /// Name of the input field that violated the rule
    pub fn field(&self) -> &'static str {
        match self {
            PaymentValidationError::InvalidAmount { .. } => "amount",
            PaymentValidationError::NegativeComponent { field, .. } => *field,
            PaymentValidationError::PrincipalExceedsOutstanding { .. } => "principal",
            PaymentValidationError::BreakdownExceedsAmount { .. } => "amount",
        }
    }
}

/// Errors that can occur in the credit domain
#[derive(Debug, Error)]
pub enum CreditError {
    /// Payment failed validation
    #[error("{0}")]
    PaymentRejected(#[from] PaymentValidationError),

    /// Any other caller-fixable input problem
    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },

    /// Referenced credit, payment or counterparty does not exist
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Uniqueness violation or a concurrent write won the version check
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Operation is not allowed in the entity's current state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Storage failure passed through from the adapter
    #[error(transparent)]
    Persistence(PortError),
}

impl CreditError {
    /// Creates a Validation error for a named field
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        CreditError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates a NotFound error
    pub fn not_found(entity: impl Into<String>, id: impl std::fmt::Display) -> Self {
        CreditError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Creates an InvalidState error
    pub fn invalid_state(message: impl Into<String>) -> Self {
        CreditError::InvalidState(message.into())
    }

    /// Returns the offending field for validation failures
    pub fn field(&self) -> Option<&str> {
        match self {
            CreditError::PaymentRejected(e) => Some(e.field()),
            CreditError::Validation { field, .. } => Some(field),
            _ => None,
        }
    }

    /// Returns true for caller-fixable input errors
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            CreditError::PaymentRejected(_) | CreditError::Validation { .. }
        )
    }

    /// Returns true if a referenced entity was missing
    pub fn is_not_found(&self) -> bool {
        matches!(self, CreditError::NotFound { .. })
    }

    /// Returns true for uniqueness or version-check failures
    pub fn is_conflict(&self) -> bool {
        matches!(self, CreditError::Conflict(_))
    }
}

impl From<PortError> for CreditError {
    fn from(error: PortError) -> Self {
        match error {
            PortError::NotFound { entity_type, id } => CreditError::NotFound {
                entity: entity_type,
                id,
            },
            PortError::Conflict { message } => CreditError::Conflict(message),
            PortError::Validation { message, field } => CreditError::Validation {
                field: field.unwrap_or_else(|| "input".to_string()),
                message,
            },
            other => CreditError::Persistence(other),
        }
    }
}
