//! Test Utilities Crate
//!
//! Shared test infrastructure for the credit ledger test suite.
//!
//! # Modules
//!
//! - `fixtures`: Dates, amounts and spreadsheet rows used across tests
//! - `builders`: Builders for credits and payment inputs
//! - `database`: PostgreSQL test container with migrations applied
//! - `assertions`: Assertion helpers for ledger state and import reports
//! - `generators`: Proptest strategies for amounts and statuses

pub mod fixtures;
pub mod builders;
pub mod database;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use database::*;
pub use assertions::*;
pub use generators::*;
