//! Credit contracts and their regulatory status
//!
//! A credit carries the outstanding principal of one contract together with
//! its status and collectibility tier. "Lunas" (paid in full) is terminal:
//! nothing in this module moves a credit off it, and it is the only status
//! under which the credit itself may be soft-deleted.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{CounterpartyId, CreditId};
use crate::error::CreditError;

/// Regulatory collectibility tier, "1" (best) through "5" (worst)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Collectibility {
    /// "1" - performing
    #[serde(rename = "1")]
    Current,
    /// "2" - special mention
    #[serde(rename = "2")]
    SpecialMention,
    /// "3" - substandard
    #[serde(rename = "3")]
    Substandard,
    /// "4" - doubtful
    #[serde(rename = "4")]
    Doubtful,
    /// "5" - loss
    #[serde(rename = "5")]
    Loss,
}

impl Collectibility {
    /// The best tier, assigned when a credit is paid off
    pub const BEST: Collectibility = Collectibility::Current;

    /// Returns the numeric code as stored and displayed
    pub fn code(&self) -> &'static str {
        match self {
            Collectibility::Current => "1",
            Collectibility::SpecialMention => "2",
            Collectibility::Substandard => "3",
            Collectibility::Doubtful => "4",
            Collectibility::Loss => "5",
        }
    }
}

impl fmt::Display for Collectibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Collectibility {
    type Err = CreditError;

    /// Parses "1".."5"; trailing labels such as "2 - DPK" are ignored
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits: String = s.trim().chars().take_while(|c| c.is_ascii_digit()).collect();
        match digits.as_str() {
            "1" => Ok(Collectibility::Current),
            "2" => Ok(Collectibility::SpecialMention),
            "3" => Ok(Collectibility::Substandard),
            "4" => Ok(Collectibility::Doubtful),
            "5" => Ok(Collectibility::Loss),
            _ => Err(CreditError::validation(
                "collectibility",
                format!("expected a code from 1 to 5, got '{}'", s.trim()),
            )),
        }
    }
}

/// Credit status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CreditStatus {
    #[serde(rename = "Lancar")]
    Lancar,
    #[serde(rename = "Dalam Perhatian Khusus")]
    DalamPerhatianKhusus,
    #[serde(rename = "Kurang Lancar")]
    KurangLancar,
    #[serde(rename = "Diragukan")]
    Diragukan,
    #[serde(rename = "Macet")]
    Macet,
    /// Paid in full; terminal
    #[serde(rename = "Lunas")]
    Lunas,
}

impl CreditStatus {
    /// Display/storage label
    pub fn as_str(&self) -> &'static str {
        match self {
            CreditStatus::Lancar => "Lancar",
            CreditStatus::DalamPerhatianKhusus => "Dalam Perhatian Khusus",
            CreditStatus::KurangLancar => "Kurang Lancar",
            CreditStatus::Diragukan => "Diragukan",
            CreditStatus::Macet => "Macet",
            CreditStatus::Lunas => "Lunas",
        }
    }

    /// Returns true for the "fully paid" state
    pub fn is_terminal(&self) -> bool {
        matches!(self, CreditStatus::Lunas)
    }

    /// The collectibility tier that normally accompanies this status
    pub fn canonical_collectibility(&self) -> Collectibility {
        match self {
            CreditStatus::Lancar | CreditStatus::Lunas => Collectibility::Current,
            CreditStatus::DalamPerhatianKhusus => Collectibility::SpecialMention,
            CreditStatus::KurangLancar => Collectibility::Substandard,
            CreditStatus::Diragukan => Collectibility::Doubtful,
            CreditStatus::Macet => Collectibility::Loss,
        }
    }

    /// The non-terminal status implied by a collectibility tier
    pub fn from_collectibility(collectibility: Collectibility) -> Self {
        match collectibility {
            Collectibility::Current => CreditStatus::Lancar,
            Collectibility::SpecialMention => CreditStatus::DalamPerhatianKhusus,
            Collectibility::Substandard => CreditStatus::KurangLancar,
            Collectibility::Doubtful => CreditStatus::Diragukan,
            Collectibility::Loss => CreditStatus::Macet,
        }
    }
}

impl fmt::Display for CreditStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CreditStatus {
    type Err = CreditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
        match normalized.as_str() {
            "lancar" => Ok(CreditStatus::Lancar),
            "dalam perhatian khusus" | "dpk" => Ok(CreditStatus::DalamPerhatianKhusus),
            "kurang lancar" | "kl" => Ok(CreditStatus::KurangLancar),
            "diragukan" => Ok(CreditStatus::Diragukan),
            "macet" => Ok(CreditStatus::Macet),
            "lunas" => Ok(CreditStatus::Lunas),
            _ => Err(CreditError::validation(
                "status",
                format!("unknown credit status '{}'", s.trim()),
            )),
        }
    }
}

/// A credit contract
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credit {
    /// Unique identifier
    pub id: CreditId,
    /// Contract number; natural key used by imports
    pub contract_number: String,
    /// Debtor
    pub counterparty_id: CounterpartyId,
    /// Product type as named by the originating system
    pub category: String,
    /// Original principal
    pub plafond: Decimal,
    /// Remaining principal
    pub outstanding: Decimal,
    pub status: CreditStatus,
    pub collectibility: Collectibility,
    pub disbursement_date: Option<NaiveDate>,
    pub maturity_date: Option<NaiveDate>,
    pub last_payment_date: Option<NaiveDate>,
    pub days_past_due: u32,
    /// False once soft-deleted
    pub is_active: bool,
    /// Optimistic concurrency counter, bumped by every successful write
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Credit {
    /// Creates a performing credit
    ///
    /// # Arguments
    ///
    /// * `contract_number` - Natural key of the contract
    /// * `counterparty_id` - The debtor
    /// * `category` - Product type
    /// * `plafond` - Original principal
    /// * `outstanding` - Remaining principal
    pub fn new(
        contract_number: impl Into<String>,
        counterparty_id: CounterpartyId,
        category: impl Into<String>,
        plafond: Decimal,
        outstanding: Decimal,
    ) -> Self {
        let now = Utc::now();

        Self {
            id: CreditId::new(),
            contract_number: contract_number.into(),
            counterparty_id,
            category: category.into(),
            plafond,
            outstanding,
            status: CreditStatus::Lancar,
            collectibility: Collectibility::Current,
            disbursement_date: None,
            maturity_date: None,
            last_payment_date: None,
            days_past_due: 0,
            is_active: true,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns true once the credit is in the terminal state
    pub fn is_paid_off(&self) -> bool {
        self.status.is_terminal()
    }

    /// Reduces the outstanding balance by a payment's principal
    ///
    /// The balance is floored at zero. Reaching zero moves the credit to
    /// Lunas. Returns true if this call paid the credit off.
    pub fn apply_principal(&mut self, principal: Decimal, payment_date: NaiveDate) -> bool {
        self.outstanding = (self.outstanding - principal).max(Decimal::ZERO);
        self.last_payment_date = Some(payment_date);

        let paid_off = self.outstanding.is_zero();
        if paid_off {
            self.mark_paid_off();
        }
        self.touch();
        paid_off
    }

    /// Adds a reversed payment's principal back to the outstanding balance
    ///
    /// Status and collectibility are left alone, so a credit
    /// that was paid off by the reversed payment stays Lunas.
    pub fn restore_principal(&mut self, principal: Decimal) {
        self.outstanding += principal;
        self.touch();
    }

    /// Forces the terminal "fully paid" values
    pub fn mark_paid_off(&mut self) {
        self.outstanding = Decimal::ZERO;
        self.status = CreditStatus::Lunas;
        self.collectibility = Collectibility::BEST;
        self.days_past_due = 0;
        self.touch();
    }

    /// Applies a status change
    ///
    /// Without an explicit collectibility the status' canonical tier is used.
    /// Moving to Lunas also zeroes the balance and days past due.
    pub fn set_status(
        &mut self,
        status: CreditStatus,
        collectibility: Option<Collectibility>,
        last_payment_date: Option<NaiveDate>,
    ) {
        if let Some(date) = last_payment_date {
            self.last_payment_date = Some(date);
        }

        if status.is_terminal() {
            self.mark_paid_off();
            if let Some(collectibility) = collectibility {
                self.collectibility = collectibility;
            }
            return;
        }

        self.status = status;
        self.collectibility = collectibility.unwrap_or_else(|| status.canonical_collectibility());
        self.touch();
    }

    /// Soft-deletes the credit
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` unless the credit is active and Lunas
    pub fn soft_delete(&mut self) -> Result<(), CreditError> {
        if !self.is_active {
            return Err(CreditError::invalid_state(format!(
                "credit {} is already deleted",
                self.contract_number
            )));
        }
        if !self.is_paid_off() {
            return Err(CreditError::invalid_state(format!(
                "credit {} has status {}; only {} credits can be deleted",
                self.contract_number,
                self.status,
                CreditStatus::Lunas
            )));
        }

        self.is_active = false;
        self.touch();
        Ok(())
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
