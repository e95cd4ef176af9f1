//! Core Kernel - Foundational types shared by the credit ledger crates
//!
//! This crate provides the building blocks every other crate depends on:
//! - Strongly-typed identifiers for credits, payments and counterparties
//! - The port error type and marker traits for the ports-and-adapters layout
//! - Adapter health reporting

pub mod identifiers;
pub mod ports;

pub use identifiers::{CreditId, PaymentId, CounterpartyId};
pub use ports::{
    PortError, DomainPort, AdapterHealth, HealthCheckResult, HealthCheckable,
};
