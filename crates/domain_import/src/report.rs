//! Import outcome

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ImportError;
use crate::schema::RawRow;

/// A row that failed, with the cells as received
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowError {
    /// 1-based position of the row in the input
    pub row: usize,
    pub data: BTreeMap<String, String>,
    pub error: String,
}

/// Summary of one import run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub success_count: usize,
    pub failed_count: usize,
    pub errors: Vec<RowError>,
}

impl ImportReport {
    pub(crate) fn record_success(&mut self) {
        self.success_count += 1;
    }

    pub(crate) fn record_failure(&mut self, row: usize, raw: &RawRow, error: &ImportError) {
        self.failed_count += 1;
        self.errors.push(RowError {
            row,
            data: raw.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            error: error.to_string(),
        });
    }

    /// Rows that were attempted, blank rows excluded
    pub fn total(&self) -> usize {
        self.success_count + self.failed_count
    }
}
