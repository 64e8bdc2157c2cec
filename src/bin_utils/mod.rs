//! This module could be a separate crate on its own, to drive [`tiny_bank`] from a binary,
//! but it lives here so the integration tests can replay scripts through it too.

use std::io::{Read, Write};

use crate::{
    command::Operation,
    config::BankConfig,
    directory::AccountDirectory,
    processor::{OperationProcessor, ProcessError, Session},
};
use anyhow::Result;
use csv_parser::CsvOperationParser;
use csv_printer::{AccountRow, print_accounts};
pub mod csv_parser;
pub mod csv_printer;

pub struct Service<'w, R, W: 'w> {
    pub input: R,
    pub output: &'w mut W,
    pub error_printer: Box<dyn FnMut(u64, ProcessError)>,
    pub config: BankConfig,
    /// Fixes the account number sequence, random otherwise.
    pub seed: Option<u64>,
}

impl<'w, R, W> Service<'w, R, W>
where
    R: Read,
    W: Write + 'w,
{
    pub fn run(mut self) -> Result<()> {
        let parser = CsvOperationParser::new(self.input);

        let directory = match self.seed {
            Some(seed) => AccountDirectory::with_seed(self.config, seed),
            None => AccountDirectory::new(self.config),
        };
        let mut session = Session::new(directory);

        for (line, row) in parser {
            let result = row
                .map_err(ProcessError::from)
                .and_then(|row| Operation::parse(row.kind, row.fields()).map_err(ProcessError::from))
                .and_then(|op| session.process_operation(op));
            match result {
                Ok(outcome) => tracing::debug!(line, ?outcome, "processed"),
                Err(err) => (self.error_printer)(line, err),
            }
        }

        print_accounts(
            self.output,
            session.directory().accounts().map(AccountRow::from),
        )
    }
}
