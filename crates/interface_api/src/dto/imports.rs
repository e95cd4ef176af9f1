//! Import DTOs

use std::collections::HashMap;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Number, Value};
use validator::Validate;

use domain_import::RawRow;

/// Spreadsheet rows as JSON objects keyed by column header
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ImportRequest {
    #[validate(length(max = 50000))]
    pub rows: Vec<HashMap<String, Value>>,
}

impl ImportRequest {
    /// Flattens every cell to the text the import parsers expect
    pub fn into_raw_rows(self) -> Vec<RawRow> {
        self.rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|(column, value)| (column, cell_text(value)))
                    .collect()
            })
            .collect()
    }
}

fn cell_text(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text,
        Value::Number(number) => number_text(&number),
        other => other.to_string(),
    }
}

/// Renders a JSON number so the cell parser reads it back unchanged
///
/// A lone `.` followed by exactly three digits reads as thousands grouping
/// (`2.125` would become 2125), so such values get a fourth fraction digit.
fn number_text(number: &Number) -> String {
    let raw = number.to_string();
    let Ok(value) = Decimal::from_str(&raw).or_else(|_| Decimal::from_scientific(&raw)) else {
        return raw;
    };

    let mut text = value.to_string();
    if text.split_once('.').is_some_and(|(_, fraction)| fraction.len() == 3) {
        text.push('0');
    }
    text
}
