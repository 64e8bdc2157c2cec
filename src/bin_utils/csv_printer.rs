use std::io::Write;

use csv::WriterBuilder;
use serde::Serialize;

use crate::account::{Account, format_amount};

#[derive(Debug, Serialize)]
pub struct AccountRow {
    pub account: String,
    pub name: String,
    pub balance: String,
    pub transactions: usize,
}

impl From<&Account> for AccountRow {
    fn from(acc: &Account) -> Self {
        Self {
            account: acc.number().to_string(),
            name: acc.name().to_string(),
            balance: format_amount(acc.balance()),
            transactions: acc.transactions().len(),
        }
    }
}

pub fn print_accounts<W>(
    output: &mut W,
    accounts: impl Iterator<Item = AccountRow>,
) -> anyhow::Result<()>
where
    W: Write,
{
    // header is written by hand so it shows up even when no accounts are left
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(output);
    if let Err(err) = writer.write_record(["account", "name", "balance", "transactions"]) {
        anyhow::bail!("Failed to write to CSV: {err}")
    }
    for row in accounts {
        if let Err(err) = writer.serialize(row) {
            anyhow::bail!("Failed to write to CSV: {err}")
        }
    }
    // Ensure all data is flushed to the output
    if let Err(err) = writer.flush() {
        anyhow::bail!("Failed to flush CSV writer: {err}")
    }
    Ok(())
}
