//! Test Data Builders
//!
//! Builders with sensible defaults so tests only name the fields they care
//! about.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use core_kernel::{CounterpartyId, CreditId};
use domain_credit::{Collectibility, Counterparty, Credit, CreditStatus, PaymentInput};

use crate::fixtures::{AmountFixtures, DateFixtures};

/// Builder for credits
pub struct CreditBuilder {
    contract_number: String,
    counterparty_id: CounterpartyId,
    category: String,
    plafond: Decimal,
    outstanding: Decimal,
    status: CreditStatus,
    collectibility: Option<Collectibility>,
    days_past_due: u32,
    active: bool,
}

impl Default for CreditBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CreditBuilder {
    /// Creates a builder for a performing KMK credit
    pub fn new() -> Self {
        Self {
            contract_number: format!("KR-{}", CreditId::new().as_uuid().simple()),
            counterparty_id: CounterpartyId::new(),
            category: "KMK".to_string(),
            plafond: AmountFixtures::plafond(),
            outstanding: AmountFixtures::outstanding(),
            status: CreditStatus::Lancar,
            collectibility: None,
            days_past_due: 0,
            active: true,
        }
    }

    pub fn with_contract_number(mut self, contract_number: impl Into<String>) -> Self {
        self.contract_number = contract_number.into();
        self
    }

    pub fn with_counterparty(mut self, counterparty: &Counterparty) -> Self {
        self.counterparty_id = counterparty.id;
        self
    }

    pub fn with_plafond(mut self, plafond: Decimal) -> Self {
        self.plafond = plafond;
        self
    }

    pub fn with_outstanding(mut self, outstanding: Decimal) -> Self {
        self.outstanding = outstanding;
        self
    }

    /// Sets the status; the collectibility follows it unless set explicitly
    pub fn with_status(mut self, status: CreditStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_collectibility(mut self, collectibility: Collectibility) -> Self {
        self.collectibility = Some(collectibility);
        self
    }

    pub fn with_days_past_due(mut self, days: u32) -> Self {
        self.days_past_due = days;
        self
    }

    /// Marks the credit as soft-deleted
    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    /// Builds the credit
    ///
    /// A Lunas credit is built with the balance it was given, which lets
    /// tests set up credits that kept Lunas after a reversal.
    pub fn build(self) -> Credit {
        let mut credit = Credit::new(
            self.contract_number,
            self.counterparty_id,
            self.category,
            self.plafond,
            self.outstanding,
        );
        credit.status = self.status;
        credit.collectibility = self
            .collectibility
            .unwrap_or_else(|| self.status.canonical_collectibility());
        credit.days_past_due = self.days_past_due;
        credit.disbursement_date = Some(DateFixtures::disbursement());
        credit.maturity_date = Some(DateFixtures::maturity());
        credit.is_active = self.active;
        credit
    }
}

/// Builder for payment inputs
pub struct PaymentInputBuilder {
    input: PaymentInput,
}

impl PaymentInputBuilder {
    /// Creates an input of `amount` against `credit_id`, dated per the fixtures
    pub fn new(credit_id: CreditId, amount: Decimal) -> Self {
        Self {
            input: PaymentInput::new(credit_id, amount, DateFixtures::payment()),
        }
    }

    pub fn principal(mut self, principal: Decimal) -> Self {
        self.input.principal = Some(principal);
        self
    }

    pub fn interest(mut self, interest: Decimal) -> Self {
        self.input.interest = Some(interest);
        self
    }

    pub fn penalty(mut self, penalty: Decimal) -> Self {
        self.input.penalty = Some(penalty);
        self
    }

    pub fn on(mut self, date: NaiveDate) -> Self {
        self.input.payment_date = date;
        self
    }

    pub fn reference(mut self, reference: impl Into<String>) -> Self {
        self.input.reference = Some(reference.into());
        self
    }

    pub fn build(self) -> PaymentInput {
        self.input
    }
}
