use std::{io::Read, ops::RangeInclusive};

use rust_decimal::Decimal;
use serde::Deserialize;

/// Rules the directory enforces when opening accounts, plus a few
/// presentation knobs used by the session view.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BankConfig {
    pub minimum_opening_balance: Decimal,
    pub passcode_min_digits: usize,
    pub account_number_min: u32,
    pub account_number_max: u32,
    /// How many log entries [`crate::processor::session::SessionView`] shows.
    pub history_limit: usize,
}

impl BankConfig {
    /// Reads overrides from a single-record CSV, header row naming the fields
    /// to override. Fields that are absent keep their defaults.
    pub fn from_csv<R: Read>(source: R) -> Result<Self, csv::Error> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(source);
        match reader.deserialize().next() {
            Some(record) => record,
            None => Ok(Self::default()),
        }
    }

    pub fn account_number_range(&self) -> RangeInclusive<u32> {
        self.account_number_min..=self.account_number_max
    }

    /// Number of distinct account numbers the directory can hand out.
    pub fn account_number_capacity(&self) -> usize {
        if self.account_number_max < self.account_number_min {
            return 0;
        }
        (self.account_number_max - self.account_number_min) as usize + 1
    }
}

impl Default for BankConfig {
    fn default() -> Self {
        Self {
            minimum_opening_balance: Decimal::from(500),
            passcode_min_digits: 4,
            account_number_min: 10_000,
            account_number_max: 99_999,
            history_limit: 10,
        }
    }
}
