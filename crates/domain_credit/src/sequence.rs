//! Document sequence numbering
//!
//! Correspondence and other documents are numbered per (category, year)
//! partition, e.g. `007/SK/KREDIT/2024` is the seventh "SK" document of
//! 2024 issued by the KREDIT unit. The counter behind each partition is
//! advanced with a single atomic increment-and-read, so concurrent callers
//! never receive the same number.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::error::CreditError;
use crate::ports::SequencePort;

/// How allocated numbers are rendered
///
/// Passed explicitly into every allocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberingFormat {
    /// Placed between the parts of the label
    pub separator: String,
    /// Minimum digits of the sequence part, zero-padded
    pub pad_width: usize,
}

impl Default for NumberingFormat {
    fn default() -> Self {
        Self {
            separator: "/".to_string(),
            pad_width: 3,
        }
    }
}

impl NumberingFormat {
    /// Renders `sequence`, `category`, `unit_label`, `year` joined by the separator
    pub fn render(&self, sequence: u32, category: &str, unit_label: &str, year: i32) -> String {
        [
            format!("{:0width$}", sequence, width = self.pad_width),
            category.to_string(),
            unit_label.to_string(),
            year.to_string(),
        ]
        .join(&self.separator)
    }
}

/// Request for the next number in a partition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationRequest {
    /// Category code, e.g. "SK"
    pub category: String,
    pub year: i32,
    /// Issuing unit printed in the label
    pub unit_label: String,
}

/// An issued number
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocatedNumber {
    pub sequence: u32,
    pub year: i32,
    pub formatted_number: String,
}

/// Issues sequence numbers
#[derive(Clone)]
pub struct SequenceAllocator {
    sequences: Arc<dyn SequencePort>,
}

impl SequenceAllocator {
    /// Creates an allocator over the given counter store
    pub fn new(sequences: Arc<dyn SequencePort>) -> Self {
        Self { sequences }
    }

    /// Issues the next number of the request's partition
    ///
    /// # Errors
    ///
    /// - `Validation` for a blank category or unit label, or a year outside
    ///   1900..=9999
    /// - `Conflict` if storage reports a uniqueness violation; not retried
    #[instrument(skip(self, format), fields(category = %request.category, year = request.year))]
    pub async fn allocate(
        &self,
        request: &AllocationRequest,
        format: &NumberingFormat,
    ) -> Result<AllocatedNumber, CreditError> {
        let category = request.category.trim();
        let unit_label = request.unit_label.trim();

        if category.is_empty() {
            return Err(CreditError::validation("category", "must not be empty"));
        }
        if unit_label.is_empty() {
            return Err(CreditError::validation("unitLabel", "must not be empty"));
        }
        if !(1900..=9999).contains(&request.year) {
            return Err(CreditError::validation(
                "year",
                format!("{} is outside 1900..=9999", request.year),
            ));
        }

        let sequence = self.sequences.next_sequence(category, request.year).await?;
        let formatted_number = format.render(sequence, category, unit_label, request.year);

        info!(sequence, number = %formatted_number, "Sequence number allocated");

        Ok(AllocatedNumber {
            sequence,
            year: request.year,
            formatted_number,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_render() {
        let format = NumberingFormat::default();
        assert_eq!(format.render(7, "SK", "KREDIT", 2024), "007/SK/KREDIT/2024");
    }

    #[test]
    fn test_render_does_not_truncate_wide_sequences() {
        let format = NumberingFormat::default();
        assert_eq!(format.render(1234, "SK", "KREDIT", 2024), "1234/SK/KREDIT/2024");
    }

    #[test]
    fn test_custom_separator_and_width() {
        let format = NumberingFormat {
            separator: ".".to_string(),
            pad_width: 5,
        };
        assert_eq!(format.render(42, "SP", "LEGAL", 2025), "00042.SP.LEGAL.2025");
    }
}
