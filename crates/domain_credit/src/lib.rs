//! Credit Domain - Outstanding-Balance Ledger and Document Numbering
//!
//! This crate holds the invariant-bearing core of the credit back office:
//!
//! - **Ledger Reconciler** ([`LedgerReconciler`]): validates payment events
//!   carrying a principal/interest/penalty breakdown, applies them to a
//!   credit's outstanding balance, and reverses them on deletion
//! - **Bulk State Transitioner** ([`BulkStateTransitioner`]): status and
//!   collectibility changes over batches of credits, including the Lunas
//!   (paid in full) transition, and bulk soft-deletion
//! - **Sequence Allocator** ([`SequenceAllocator`]): per (category, year)
//!   document numbers
//!
//! # Credit status
//!
//! Lancar, Dalam Perhatian Khusus, Kurang Lancar, Diragukan and Macet are
//! set freely by collectibility-driven updates. Lunas is reached when the
//! ledger drives outstanding to zero or through an explicit bulk
//! transition, and nothing moves a credit off it automatically.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use domain_credit::{LedgerReconciler, PaymentInput, memory::InMemoryLedger};
//!
//! let store = Arc::new(InMemoryLedger::with_credits(vec![credit]).await);
//! let ledger = LedgerReconciler::new(store);
//!
//! let receipt = ledger.apply(PaymentInput::new(credit_id, amount, date)).await?;
//! assert!(receipt.credit.outstanding >= Decimal::ZERO);
//! ```

pub mod credit;
pub mod payment;
pub mod counterparty;
pub mod ledger;
pub mod transition;
pub mod sequence;
pub mod ports;
pub mod error;

pub use credit::{Credit, CreditStatus, Collectibility};
pub use payment::{Payment, PaymentInput};
pub use counterparty::Counterparty;
pub use ledger::{LedgerReconciler, PaymentReceipt, ValidatedBreakdown, validate};
pub use transition::{BulkStateTransitioner, StatusChange, BulkUpdateOutcome, BulkDeleteOutcome};
pub use sequence::{SequenceAllocator, NumberingFormat, AllocationRequest, AllocatedNumber};
pub use ports::{CreditPort, CounterpartyPort, SequencePort, memory};
pub use error::{CreditError, PaymentValidationError};
