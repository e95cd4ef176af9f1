//! Request and response bodies
//!
//! All bodies use camelCase field names. Requests derive `Validate` for the
//! shape checks that do not need the store; business rules stay in the
//! domain crates.

pub mod credits;
pub mod imports;
pub mod payments;
pub mod sequences;
