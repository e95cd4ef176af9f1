//! Port adapters
//!
//! [`PostgresLedger`] implements the credit-domain ports on top of the
//! connection pool. Row types live in `rows` and never leave this crate.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use domain_credit::{CreditPort, LedgerReconciler};
//! use infra_db::adapters::PostgresLedger;
//!
//! let store = Arc::new(PostgresLedger::new(pool));
//! let ledger = LedgerReconciler::new(store.clone());
//! ```

mod rows;
pub mod ledger;

pub use ledger::PostgresLedger;
