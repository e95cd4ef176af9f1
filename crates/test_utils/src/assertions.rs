//! Custom Test Assertions
//!
//! Assertion helpers that print the whole credit or report on failure.

use rust_decimal::Decimal;

use domain_credit::{Collectibility, Credit, CreditStatus};
use domain_import::ImportReport;

/// Asserts the terminal "fully paid" values
pub fn assert_paid_off(credit: &Credit) {
    assert_eq!(credit.status, CreditStatus::Lunas, "Expected Lunas: {:?}", credit);
    assert_eq!(credit.outstanding, Decimal::ZERO, "Expected zero outstanding: {:?}", credit);
    assert_eq!(credit.collectibility, Collectibility::BEST, "Expected best tier: {:?}", credit);
    assert_eq!(credit.days_past_due, 0, "Expected no days past due: {:?}", credit);
}

/// Asserts the outstanding balance
pub fn assert_outstanding(credit: &Credit, expected: Decimal) {
    assert_eq!(
        credit.outstanding, expected,
        "Outstanding mismatch for {}: actual={}, expected={}",
        credit.contract_number, credit.outstanding, expected
    );
}

/// Asserts that `row` (1-based) failed with a message containing `needle`
pub fn assert_row_failed(report: &ImportReport, row: usize, needle: &str) {
    let error = report
        .errors
        .iter()
        .find(|e| e.row == row)
        .unwrap_or_else(|| panic!("Row {} did not fail; report: {:?}", row, report));
    assert!(
        error.error.contains(needle),
        "Row {} failed with '{}', expected it to mention '{}'",
        row,
        error.error,
        needle
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::CreditBuilder;
    use rust_decimal_macros::dec;

    #[test]
    fn test_assert_paid_off() {
        let mut credit = CreditBuilder::new().with_status(CreditStatus::Macet).build();
        credit.mark_paid_off();
        assert_paid_off(&credit);
    }

    #[test]
    #[should_panic(expected = "Outstanding mismatch")]
    fn test_assert_outstanding_panics() {
        let credit = CreditBuilder::new().with_outstanding(dec!(10)).build();
        assert_outstanding(&credit, dec!(11));
    }
}
