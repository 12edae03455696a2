//! Implements the very simple `RowSource` trait using in-memory data for
//! testing purposes.
//!
//! Note: this is compiled even in the "production" version of this app so
//! that we can run the whole app, top-to-bottom, without using Google Sheets.

use crate::api::RowSource;
use crate::Result;
use std::io::Cursor;

/// An implementation of the `RowSource` trait that does not use Google
/// Sheets. It can hold any rows in memory and, by default, is seeded with
/// some existing data.
pub(crate) struct TestRowSource {
    rows: Vec<Vec<String>>,
}

impl TestRowSource {
    /// Create a new `TestRowSource` that will return `rows`.
    pub(crate) fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }
}

#[async_trait::async_trait]
impl RowSource for TestRowSource {
    async fn fetch(&mut self) -> Result<Vec<Vec<String>>> {
        Ok(self.rows.clone())
    }
}

impl Default for TestRowSource {
    /// Loads seed data from this module.
    fn default() -> Self {
        Self::new(load_csv(SPENDING_DATA).unwrap_or_default())
    }
}

/// Loads rows from a CSV-formatted string.
fn load_csv(csv_data: &str) -> Result<Vec<Vec<String>>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(Cursor::new(csv_data.as_bytes()));

    let mut rows: Vec<Vec<String>> = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let row: Vec<String> = record.iter().map(|field| field.to_string()).collect();
        rows.push(row);
    }
    Ok(rows)
}

/// Seed spending data: one month of per-category totals.
const SPENDING_DATA: &str = r##"Month,2025-07
Groceries,420
Coffee Shops,88
Gas & Fuel,150
Restaurants,260
Utilities,310
"##;
