//! Counterparties (debtors) referenced by credits

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::CounterpartyId;

/// A debtor, identified externally by its code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counterparty {
    pub id: CounterpartyId,
    /// Natural key (customer number / CIF)
    pub code: String,
    pub name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Counterparty {
    /// Creates an active counterparty
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: CounterpartyId::new(),
            code: code.into().trim().to_string(),
            name: name.into().trim().to_string(),
            is_active: true,
            created_at: Utc::now(),
        }
    }

    /// Case-insensitive, whitespace-tolerant name comparison
    pub fn name_matches(&self, name: &str) -> bool {
        normalize_name(&self.name) == normalize_name(name)
    }
}

fn normalize_name(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}
