use std::io::Read;

use crate::command::{OperationFields, OperationKind};
use csv::{DeserializeRecordsIntoIter, Trim};
use rust_decimal::Decimal;
use serde::Deserialize;

/// One scripted user action. Which columns matter depends on `type`:
/// `open` uses name/passcode/amount, `login` uses account/passcode,
/// `transfer` and `topup` use target/amount.
#[derive(Debug, Deserialize)]
pub struct OperationRow {
    #[serde(rename = "type")]
    pub kind: OperationKind,
    pub account: Option<String>,
    pub name: Option<String>,
    pub passcode: Option<String>,
    pub amount: Option<Decimal>,
    pub target: Option<String>,
}

impl OperationRow {
    pub fn fields(self) -> OperationFields {
        OperationFields {
            account: self.account,
            name: self.name,
            passcode: self.passcode,
            amount: self.amount,
            target: self.target,
        }
    }
}

/// Parses a script of user actions in CSV format. A malformed row is
/// yielded as an error and parsing carries on with the next one.
pub struct CsvOperationParser<R> {
    iter: DeserializeRecordsIntoIter<R, OperationRow>,
}

impl<R> CsvOperationParser<R>
where
    R: Read,
{
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(source);

        Self {
            iter: reader.into_deserialize(),
        }
    }
}

impl<R> Iterator for CsvOperationParser<R>
where
    R: Read,
{
    type Item = (u64, Result<OperationRow, csv::Error>);

    fn next(&mut self) -> Option<Self::Item> {
        let curr_line = self.iter.reader().position().line();
        self.iter.next().map(|row| (curr_line, row))
    }
}
