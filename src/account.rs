use std::fmt;

use rust_decimal::{Decimal, prelude::Zero};
use thiserror::Error;

pub type AccountNumber = String;

pub const CURRENCY: &str = "Nu.";

/// Renders an amount the way it appears in the transaction log, e.g. `Nu.200.00`.
pub fn format_amount(amount: Decimal) -> String {
    let mut rounded = amount.round_dp(2);
    rounded.rescale(2);
    format!("{CURRENCY}{rounded}")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountEventKind {
    Deposited,
    Withdrew,
    Sent { to: String },
    Received { from: String },
    MobileTopUp { destination: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountEvent {
    amount: Decimal,
    kind: AccountEventKind,
}

impl AccountEvent {
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn kind(&self) -> &AccountEventKind {
        &self.kind
    }
}

impl fmt::Display for AccountEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let amount = format_amount(self.amount);
        match &self.kind {
            AccountEventKind::Deposited => write!(f, "Deposited {amount}"),
            AccountEventKind::Withdrew => write!(f, "Withdrew {amount}"),
            AccountEventKind::Sent { to } => write!(f, "Sent {amount} to {to}"),
            AccountEventKind::Received { from } => write!(f, "Received {amount} from {from}"),
            AccountEventKind::MobileTopUp { destination } => {
                write!(f, "Mobile top-up {amount} to {destination}")
            }
        }
    }
}

/// Both halves of a transfer, computed before either account is touched.
#[derive(Debug, Clone)]
pub struct TransferEvents {
    pub debit: AccountEvent,
    pub credit: AccountEvent,
}

/// Classification shared by ledger and directory failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidAmount,
    InsufficientFunds,
    NotFound,
    BadCredentials,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("{0}")]
    InvalidAmount(&'static str),
    #[error("Not enough balance: requested {requested}, available {available}")]
    InsufficientFunds {
        requested: Decimal,
        available: Decimal,
    },
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::InvalidAmount(_) => ErrorKind::InvalidAmount,
            LedgerError::InsufficientFunds { .. } => ErrorKind::InsufficientFunds,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Account {
    number: AccountNumber,
    name: String,
    passcode: String,
    balance: Decimal,
    log: Vec<AccountEvent>,
}

impl Account {
    /// Builds an account as-is. Opening rules (minimum balance, passcode shape,
    /// unique name) are the directory's business.
    pub(crate) fn new(
        number: impl Into<AccountNumber>,
        name: impl Into<String>,
        passcode: impl Into<String>,
        balance: Decimal,
    ) -> Self {
        Self {
            number: number.into(),
            name: name.into(),
            passcode: passcode.into(),
            balance,
            log: Vec::new(),
        }
    }

    pub fn number(&self) -> &str {
        &self.number
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    pub fn passcode_matches(&self, passcode: &str) -> bool {
        self.passcode == passcode
    }

    /// Transaction log, oldest first. Calling it again yields the same entries
    /// until the next mutation.
    pub fn transactions(&self) -> std::slice::Iter<'_, AccountEvent> {
        self.log.iter()
    }

    /// The newest `limit` entries, newest first.
    pub fn recent_transactions(&self, limit: usize) -> impl Iterator<Item = &AccountEvent> {
        self.log.iter().rev().take(limit)
    }

    /// Only events produced by a `handle_*` call against the current state
    /// keep the balance non-negative.
    pub(crate) fn apply(&mut self, event: &AccountEvent) {
        match event.kind {
            AccountEventKind::Deposited | AccountEventKind::Received { .. } => {
                self.balance += event.amount;
            }
            AccountEventKind::Withdrew
            | AccountEventKind::Sent { .. }
            | AccountEventKind::MobileTopUp { .. } => {
                self.balance -= event.amount;
            }
        }
        tracing::debug!(account = %self.number, %event, balance = %self.balance, "applied");
        self.log.push(event.clone());
    }

    pub fn handle_deposit(&self, amount: Decimal) -> Result<AccountEvent, LedgerError> {
        ensure_positive(amount)?;
        self.ensure_can_credit(amount)?;
        Ok(AccountEvent {
            amount,
            kind: AccountEventKind::Deposited,
        })
    }

    pub fn handle_withdraw(&self, amount: Decimal) -> Result<AccountEvent, LedgerError> {
        self.ensure_can_debit(amount)?;
        Ok(AccountEvent {
            amount,
            kind: AccountEventKind::Withdrew,
        })
    }

    pub fn handle_transfer(
        &self,
        amount: Decimal,
        target: &Account,
    ) -> Result<TransferEvents, LedgerError> {
        ensure_positive(amount)?;
        if target.number == self.number {
            return Err(LedgerError::InvalidAmount("Cannot transfer to same account"));
        }
        self.ensure_can_debit(amount)?;
        target.ensure_can_credit(amount)?;
        Ok(TransferEvents {
            debit: AccountEvent {
                amount,
                kind: AccountEventKind::Sent {
                    to: target.name.clone(),
                },
            },
            credit: AccountEvent {
                amount,
                kind: AccountEventKind::Received {
                    from: self.name.clone(),
                },
            },
        })
    }

    pub fn handle_mobile_top_up(
        &self,
        amount: Decimal,
        destination: &str,
    ) -> Result<AccountEvent, LedgerError> {
        self.ensure_can_debit(amount)?;
        if destination.is_empty() {
            return Err(LedgerError::InvalidAmount("Mobile number must not be empty"));
        }
        Ok(AccountEvent {
            amount,
            kind: AccountEventKind::MobileTopUp {
                destination: destination.to_string(),
            },
        })
    }

    pub fn deposit(&mut self, amount: Decimal) -> Result<Decimal, LedgerError> {
        let evt = self.handle_deposit(amount)?;
        self.apply(&evt);
        Ok(self.balance)
    }

    pub fn withdraw(&mut self, amount: Decimal) -> Result<Decimal, LedgerError> {
        let evt = self.handle_withdraw(amount)?;
        self.apply(&evt);
        Ok(self.balance)
    }

    /// Moves `amount` to `target`. Both sides are validated first, so either
    /// both accounts change or neither does.
    pub fn transfer(
        &mut self,
        amount: Decimal,
        target: &mut Account,
    ) -> Result<Decimal, LedgerError> {
        let TransferEvents { debit, credit } = self.handle_transfer(amount, target)?;
        self.apply(&debit);
        target.apply(&credit);
        Ok(self.balance)
    }

    pub fn mobile_top_up(
        &mut self,
        amount: Decimal,
        destination: &str,
    ) -> Result<Decimal, LedgerError> {
        let evt = self.handle_mobile_top_up(amount, destination)?;
        self.apply(&evt);
        Ok(self.balance)
    }

    fn ensure_can_credit(&self, amount: Decimal) -> Result<(), LedgerError> {
        match self.balance.checked_add(amount) {
            Some(_) => Ok(()),
            None => Err(LedgerError::InvalidAmount("Amount would overflow the balance")),
        }
    }

    fn ensure_can_debit(&self, amount: Decimal) -> Result<(), LedgerError> {
        ensure_positive(amount)?;
        if amount > self.balance {
            return Err(LedgerError::InsufficientFunds {
                requested: amount,
                available: self.balance,
            });
        }
        Ok(())
    }
}

fn ensure_positive(amount: Decimal) -> Result<(), LedgerError> {
    if amount <= Decimal::zero() {
        Err(LedgerError::InvalidAmount("Amount must be positive"))
    } else {
        Ok(())
    }
}
