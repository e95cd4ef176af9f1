//! Infrastructure Database Layer
//!
//! PostgreSQL persistence for the credit ledger using SQLx: the connection
//! pool, the bundled schema migrations, and [`PostgresLedger`], which
//! implements every port declared in `domain_credit`.
//!
//! # Concurrency
//!
//! Credit updates are compare-and-swap on the `version` column, and
//! payment writes commit the payment row and the credit update in one
//! transaction. Sequence numbers come from a single
//! `INSERT ... ON CONFLICT DO UPDATE ... RETURNING` per allocation, so two
//! callers never observe the same value.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use infra_db::{create_pool, run_migrations, DatabaseConfig, PostgresLedger};
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/credit_ledger")).await?;
//! run_migrations(&pool).await?;
//! let ledger = Arc::new(PostgresLedger::new(pool));
//! ```

pub mod pool;
pub mod error;
pub mod adapters;

pub use pool::{DatabasePool, DatabaseConfig, create_pool, run_migrations};
pub use error::DatabaseError;
pub use adapters::PostgresLedger;
