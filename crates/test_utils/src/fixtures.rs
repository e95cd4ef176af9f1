//! Pre-built Test Fixtures

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use domain_import::RawRow;

/// Fixed dates, so assertions never depend on the clock
pub struct DateFixtures;

impl DateFixtures {
    pub fn disbursement() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 1, 2).unwrap()
    }

    pub fn maturity() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 2).unwrap()
    }

    pub fn payment() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }
}

/// Standard amounts in rupiah
pub struct AmountFixtures;

impl AmountFixtures {
    pub fn plafond() -> Decimal {
        dec!(10000000)
    }

    pub fn outstanding() -> Decimal {
        dec!(1000000)
    }
}

/// Spreadsheet rows as the import pipeline receives them
pub struct RowFixtures;

impl RowFixtures {
    /// Builds a row from header/value pairs
    pub fn row(pairs: &[(&str, &str)]) -> RawRow {
        pairs
            .iter()
            .map(|(column, value)| (column.to_string(), value.to_string()))
            .collect()
    }

    /// A core-banking export row with dotted thousands
    pub fn bank_export(account: &str, cif: &str, name: &str, baki_debet: &str) -> RawRow {
        Self::row(&[
            ("No Rekening", account),
            ("CIF", cif),
            ("Nama Nasabah", name),
            ("Jenis Pinjaman", "KUR Mikro"),
            ("Plafon", "50.000.000"),
            ("Baki Debet", baki_debet),
            ("Kolektibilitas", "1 - Lancar"),
            ("Tgl Realisasi", "02/01/2023"),
        ])
    }

    /// A legacy-layout row referencing an existing counterparty
    pub fn legacy(contract: &str, counterparty_code: &str, outstanding: &str) -> RawRow {
        Self::row(&[
            ("No. Kontrak", contract),
            ("Kode Debitur", counterparty_code),
            ("Jenis Kredit", "KMK"),
            ("Plafond", "100,000,000.00"),
            ("Outstanding", outstanding),
        ])
    }

    /// A payment row dated 2024-05-31
    pub fn payment(contract: &str, amount: &str, principal: &str) -> RawRow {
        Self::row(&[
            ("No Kontrak", contract),
            ("Tanggal Bayar", "31/05/2024"),
            ("Jumlah Bayar", amount),
            ("Pokok", principal),
        ])
    }
}
