use rust_decimal::Decimal;
use thiserror::Error;

use crate::{
    account::AccountNumber,
    command::{Operation, OperationParseError},
};

pub use session::{Session, SessionError, SessionView};

pub mod session;

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("Malformed row: {0}")]
    CsvErr(#[from] csv::Error),
    #[error(transparent)]
    ParseErr(#[from] OperationParseError),
    #[error(transparent)]
    SessionErr(#[from] SessionError),
}

/// What a successfully processed operation produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Opened { account_number: AccountNumber },
    LoggedIn { account_number: AccountNumber },
    LoggedOut,
    Balance(Decimal),
    Closed { account_number: AccountNumber },
}

pub trait OperationProcessor {
    fn process_operation(&mut self, operation: Operation) -> Result<Outcome, ProcessError>;
}
