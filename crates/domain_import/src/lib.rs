//! Credit and payment import
//!
//! Spreadsheet rows come from two historically different layouts (the
//! application's own export and a core-banking export) and use either
//! decimal convention. This crate:
//!
//! - parses cells tolerantly ([`parse`])
//! - detects the layout once per file and parses rows into a tagged
//!   [`CreditRow`] ([`schema`])
//! - normalizes rows into [`CreditRecord`]s and writes them, or drives the
//!   ledger for payment files ([`ImportPipeline`])
//!
//! Every row succeeds or fails on its own; failures are collected into an
//! [`ImportReport`].

pub mod parse;
pub mod schema;
pub mod record;
pub mod report;
pub mod pipeline;
pub mod error;

pub use schema::{CreditRow, Fields, ImportSchema, LegacyRow, BankExportRow, PaymentRow, RawRow, normalize_header};
pub use record::{CreditRecord, CounterpartyRef};
pub use report::{ImportReport, RowError};
pub use pipeline::{ImportPipeline, RowOutcome};
pub use error::ImportError;
